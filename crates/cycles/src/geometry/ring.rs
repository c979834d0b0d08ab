use super::cap::{CapEdge, CapStyle, append_cap};
use super::path::RingPath;
use super::Point;
use crate::table::PHASE_COUNT;

/// Pixel dimensions of the ring, already multiplied by the host's scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingLayout {
    pub ring_width: f64,
    pub handle_outer_radius: f64,
    pub handle_inner_radius: f64,
    pub angle_offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandleGeometry {
    pub center: Point,
    pub outer_radius: f64,
    pub inner_radius: f64,
}

impl HandleGeometry {
    /// Square hit-box around the resting handle.
    pub fn contains(&self, p: Point) -> bool {
        (p.x - self.center.x).abs() <= self.outer_radius
            && (p.y - self.center.y).abs() <= self.outer_radius
    }
}

/// Everything needed to draw the wheel at one surface size. The arcs are not
/// rotated; the renderer turns them by [`GeometryFrame::ring_rotation`] about
/// `center`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryFrame {
    pub width: f64,
    pub height: f64,
    pub center: Point,
    pub outer_radius: f64,
    pub inner_radius: f64,
    pub ring_width: f64,
    pub angle_offset: f64,
    pub phase_angles: [(f64, f64); PHASE_COUNT],
    pub arcs: [RingPath; PHASE_COUNT],
    pub handle: HandleGeometry,
}

impl GeometryFrame {
    pub fn ring_rotation(&self, current_angle: f64) -> f64 {
        self.angle_offset + current_angle
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RingGeometryBuilder {
    pub width: f64,
    pub height: f64,
}

impl RingGeometryBuilder {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn build(
        &self,
        layout: &RingLayout,
        phase_angles: &[(f64, f64); PHASE_COUNT],
    ) -> GeometryFrame {
        let (width, height) = (self.width.max(0.0), self.height.max(0.0));

        // keep room for the part of the handle that overhangs the ring
        let overhang = (layout.handle_outer_radius - layout.ring_width / 2.0).max(0.0);
        let raw_radius = height / 2.0 - overhang;
        let outer_radius = raw_radius.max(0.0);
        let inner_radius = (outer_radius - layout.ring_width).max(0.0);
        if height > 0.0 && (raw_radius <= 0.0 || inner_radius == 0.0) {
            log::warn!(
                "Ring does not fit into {}x{} (outer radius {:.1}, width {:.1}); clamping",
                width,
                height,
                raw_radius,
                layout.ring_width
            );
        }
        let ring_width = outer_radius - inner_radius;

        // the ring sits in the square at the right edge of the surface
        let center = Point::new(width - height + height / 2.0, height / 2.0);

        let last = PHASE_COUNT - 1;
        let arcs = std::array::from_fn(|i| {
            let (start, sweep) = phase_angles[i];
            let start_cap = if i == 0 {
                CapStyle::AngleIn
            } else {
                CapStyle::RoundOut
            };
            let end_cap = if i == last {
                CapStyle::AngleOut
            } else {
                CapStyle::None
            };
            ring_segment(outer_radius, ring_width, start, sweep, start_cap, end_cap)
                .translated(center.x, center.y)
        });

        let rest = Point::polar(
            outer_radius - layout.handle_outer_radius / 2.0,
            layout.angle_offset,
        );

        GeometryFrame {
            width,
            height,
            center,
            outer_radius,
            inner_radius,
            ring_width,
            angle_offset: layout.angle_offset,
            phase_angles: *phase_angles,
            arcs,
            handle: HandleGeometry {
                center: rest.translate(center.x, center.y),
                outer_radius: layout.handle_outer_radius,
                inner_radius: layout.handle_inner_radius,
            },
        }
    }
}

/// Closed outline of one ring segment centered on the origin: outer arc, end cap,
/// inner arc back, start cap.
pub fn ring_segment(
    outer_radius: f64,
    ring_width: f64,
    start_angle: f64,
    sweep_angle: f64,
    start_cap: CapStyle,
    end_cap: CapStyle,
) -> RingPath {
    let origin = Point::default();
    let inner_radius = outer_radius - ring_width;
    let end_angle = start_angle + sweep_angle;

    let mut path = RingPath::new();
    path.arc_to(origin, outer_radius, start_angle, sweep_angle);
    append_cap(
        &mut path,
        end_cap,
        CapEdge::End,
        end_angle,
        outer_radius,
        ring_width,
    );
    path.arc_to(origin, inner_radius, end_angle, -sweep_angle);
    append_cap(
        &mut path,
        start_cap,
        CapEdge::Start,
        start_angle,
        outer_radius,
        ring_width,
    );
    path.close();
    path
}
