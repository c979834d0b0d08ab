use super::{Point, Vector};

const JOIN_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    /// Circular arc. Angles in degrees; a positive sweep runs clockwise on screen.
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        sweep_angle: f64,
    },
    Close,
}

impl PathSegment {
    fn translated(self, dx: f64, dy: f64) -> Self {
        match self {
            Self::MoveTo(p) => Self::MoveTo(p.translate(dx, dy)),
            Self::LineTo(p) => Self::LineTo(p.translate(dx, dy)),
            Self::Arc {
                center,
                radius,
                start_angle,
                sweep_angle,
            } => Self::Arc {
                center: center.translate(dx, dy),
                radius,
                start_angle,
                sweep_angle,
            },
            Self::Close => Self::Close,
        }
    }
}

fn arc_point(center: Point, radius: f64, degrees: f64) -> Point {
    let p = Point::polar(radius, degrees);
    center.translate(p.x, p.y)
}

/// Closed outline made of lines and circular arcs, renderer independent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RingPath {
    segments: Vec<PathSegment>,
    start: Option<Point>,
    current: Option<Point>,
}

impl RingPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    pub fn move_to(&mut self, p: Point) {
        self.segments.push(PathSegment::MoveTo(p));
        self.start = Some(p);
        self.current = Some(p);
    }

    pub fn line_to(&mut self, p: Point) {
        if self.current.is_none() {
            return self.move_to(p);
        }
        self.segments.push(PathSegment::LineTo(p));
        self.current = Some(p);
    }

    pub fn rel_line_to(&mut self, v: Vector) {
        let from = self.current.unwrap_or_default();
        self.line_to(from.offset(v));
    }

    /// Appends an arc, joining it to the current point with a straight line if needed.
    pub fn arc_to(&mut self, center: Point, radius: f64, start_angle: f64, sweep_angle: f64) {
        let from = arc_point(center, radius, start_angle);
        match self.current {
            None => self.move_to(from),
            Some(p) if p.distance(from) > JOIN_EPSILON => self.line_to(from),
            Some(_) => {}
        }
        self.segments.push(PathSegment::Arc {
            center,
            radius,
            start_angle,
            sweep_angle,
        });
        self.current = Some(arc_point(center, radius, start_angle + sweep_angle));
    }

    pub fn close(&mut self) {
        if self.current.is_some() {
            self.segments.push(PathSegment::Close);
            self.current = self.start;
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.segments.last(), Some(PathSegment::Close))
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            segments: self
                .segments
                .iter()
                .map(|s| s.translated(dx, dy))
                .collect(),
            start: self.start.map(|p| p.translate(dx, dy)),
            current: self.current.map(|p| p.translate(dx, dy)),
        }
    }

    /// Polygon approximation with arcs split into steps of at most `max_step` degrees.
    pub fn flatten(&self, max_step: f64) -> Vec<Point> {
        let max_step = max_step.max(0.1);
        let mut points = Vec::new();
        for segment in &self.segments {
            match *segment {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => points.push(p),
                PathSegment::Arc {
                    center,
                    radius,
                    start_angle,
                    sweep_angle,
                } => {
                    let steps = (sweep_angle.abs() / max_step).ceil().max(1.0) as usize;
                    points.extend((1..=steps).map(|i| {
                        let t = i as f64 / steps as f64;
                        arc_point(center, radius, start_angle + sweep_angle * t)
                    }));
                }
                PathSegment::Close => {}
            }
        }
        points.dedup_by(|a, b| a.distance(*b) <= JOIN_EPSILON);
        points
    }

    /// Signed shoelace area of the flattened outline; positive when the outline
    /// runs clockwise on screen.
    pub fn area(&self) -> f64 {
        let points = self.flatten(1.0);
        let n = points.len();
        if n < 3 {
            return 0.0;
        }
        (0..n)
            .map(|i| {
                let (a, b) = (points[i], points[(i + 1) % n]);
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>()
            / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_to_starts_or_joins() {
        let mut path = RingPath::new();
        path.arc_to(Point::default(), 10.0, 0.0, 90.0);

        assert_eq!(path.segments()[0], PathSegment::MoveTo(Point::new(10.0, 0.0)));
        let end = path.current_point().unwrap();
        assert!(end.distance(Point::new(0.0, 10.0)) < 1e-9);

        // continuing from the arc end does not add a join line
        path.arc_to(Point::default(), 10.0, 90.0, 90.0);
        assert_eq!(path.segments().len(), 3);

        // jumping to another radius does
        path.arc_to(Point::default(), 5.0, 180.0, -180.0);
        assert!(matches!(path.segments()[3], PathSegment::LineTo(_)));
        assert_eq!(path.segments().len(), 5);
    }

    #[test]
    fn test_close_returns_to_start() {
        let mut path = RingPath::new();
        path.move_to(Point::new(1.0, 1.0));
        path.rel_line_to(Vector::new(2.0, 0.0));
        path.rel_line_to(Vector::new(0.0, 2.0));
        assert_eq!(path.current_point(), Some(Point::new(3.0, 3.0)));

        path.close();
        assert!(path.is_closed());
        assert_eq!(path.current_point(), Some(Point::new(1.0, 1.0)));
        assert!((path.area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_translated_moves_every_segment() {
        let mut path = RingPath::new();
        path.arc_to(Point::default(), 10.0, 0.0, 180.0);
        path.close();

        let moved = path.translated(5.0, -5.0);
        match moved.segments()[1] {
            PathSegment::Arc { center, radius, .. } => {
                assert_eq!(center, Point::new(5.0, -5.0));
                assert_eq!(radius, 10.0);
            }
            other => panic!("unexpected segment {other:?}"),
        }
        assert!((moved.area() - path.area()).abs() < 1e-9);
    }
}
