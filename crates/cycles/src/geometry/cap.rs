use super::path::RingPath;
use super::{Point, Vector};
use strum::{Display, EnumIter};

/// Shape closing one end of a ring segment.
///
/// `Out` caps stick out of the segment (a rounded bulge or a pointed tip), `In`
/// caps cut into it (a rounded hollow or a V notch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum CapStyle {
    None,
    RoundIn,
    RoundOut,
    AngleIn,
    AngleOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum CapEdge {
    /// Drawn from the inner circle back out to the outer one.
    Start,
    /// Drawn from the outer circle down to the inner one.
    End,
}

impl CapStyle {
    fn bulge(self) -> f64 {
        match self {
            Self::RoundOut | Self::AngleOut => 1.0,
            Self::RoundIn | Self::AngleIn => -1.0,
            Self::None => 0.0,
        }
    }
}

impl CapEdge {
    /// Direction along the ring that points away from the segment.
    fn away(self) -> f64 {
        match self {
            Self::Start => -1.0,
            Self::End => 1.0,
        }
    }

    /// Radial direction travelled while drawing the cap.
    fn radial(self) -> f64 {
        match self {
            Self::Start => 1.0,
            Self::End => -1.0,
        }
    }
}

/// Appends the cap for the boundary at `angle` degrees. The path must currently sit
/// on the outer circle for [`CapEdge::End`] and on the inner circle for
/// [`CapEdge::Start`].
pub fn append_cap(
    path: &mut RingPath,
    style: CapStyle,
    edge: CapEdge,
    angle: f64,
    outer_radius: f64,
    ring_width: f64,
) {
    let half = ring_width / 2.0;
    match style {
        CapStyle::None => {}
        CapStyle::RoundIn | CapStyle::RoundOut => {
            let center = Point::polar(outer_radius - half, angle);
            let start = match edge {
                CapEdge::End => angle,
                CapEdge::Start => angle + 180.0,
            };
            path.arc_to(center, half, start, 180.0 * style.bulge());
        }
        CapStyle::AngleIn | CapStyle::AngleOut => {
            let (to_tip, from_tip) = mitre_legs(style, edge, angle, half);
            path.rel_line_to(to_tip);
            path.rel_line_to(from_tip);
        }
    }
}

/// The two legs of a mitred cap: each covers half the ring width radially and the
/// same distance along the ring, which puts the tip on the middle circle with a
/// right angle between the legs.
pub fn mitre_legs(style: CapStyle, edge: CapEdge, angle: f64, half: f64) -> (Vector, Vector) {
    let radial = edge.radial() * half;
    let along = style.bulge() * edge.away() * half;
    (
        Vector::rotated(radial, along, angle),
        Vector::rotated(radial, -along, angle),
    )
}
