pub mod cap;
pub mod path;
pub mod ring;

pub use cap::{CapEdge, CapStyle};
pub use path::{PathSegment, RingPath};
pub use ring::{GeometryFrame, HandleGeometry, RingGeometryBuilder, RingLayout};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from the origin, `degrees` clockwise from the positive x axis
    /// (y grows downwards).
    pub fn polar(radius: f64, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(radius * cos, radius * sin)
    }

    pub fn offset(self, v: Vector) -> Self {
        Self::new(self.x + v.dx, self.y + v.dy)
    }

    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
}

impl Vector {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Maps a vector given in ring-local terms (`radial` away from the center,
    /// `tangential` in the direction of growing angle) to screen coordinates at
    /// `degrees` around the ring.
    pub fn rotated(radial: f64, tangential: f64, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(radial * cos - tangential * sin, radial * sin + tangential * cos)
    }

    pub fn dot(self, other: Vector) -> f64 {
        self.dx * other.dx + self.dy * other.dy
    }

    pub fn length(self) -> f64 {
        self.dx.hypot(self.dy)
    }
}
