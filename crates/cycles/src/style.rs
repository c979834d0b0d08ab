use crate::geometry::RingLayout;
use crate::table::{DURATION_RANGE, PHASE_COUNT};
use derive_more::{Deref, From, Into};
use palette::Srgba;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

/// sRGB color written as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Deref, From, Into, SerializeDisplay, DeserializeFromStr)]
pub struct RingColor(Srgba<f64>);

impl RingColor {
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(Srgba::new(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            f64::from(a) / 255.0,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color {0:?}, expected #rrggbb or #rrggbbaa")]
pub struct ParseColorError(String);

impl FromStr for RingColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        // from_str_radix alone would take a leading sign in each channel
        if !matches!(hex.len(), 6 | 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |i: usize| {
            hex.get(i..i + 2)
                .map_or(Ok(255), |c| u8::from_str_radix(c, 16))
                .map_err(|_| err())
        };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?))
    }
}

impl fmt::Display for RingColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = self.0.into_components();
        write!(f, "#{:02x}{:02x}{:02x}", byte(r), byte(g), byte(b))?;
        if byte(a) != 255 {
            write!(f, "{:02x}", byte(a))?;
        }
        Ok(())
    }
}

/// How far the ring turns per drag tick.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DragAdvance {
    /// A third of a day per tick in the drag direction.
    #[default]
    #[strum(serialize = "stepped", serialize = "step")]
    Stepped,
    /// A third of a day per tick, scaled by how far the handle is pulled.
    #[strum(serialize = "proportional", serialize = "prop")]
    Proportional,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleError {
    #[error("{name} must be a finite, non-negative length (got {value})")]
    Length { name: &'static str, value: f64 },
    #[error("handle inner radius {inner} exceeds outer radius {outer}")]
    HandleRadii { inner: f64, outer: f64 },
    #[error("initial duration {0} is outside of 20..=42")]
    Duration(u32),
    #[error("angle offset must be finite")]
    AngleOffset,
}

/// Styling options recognized by the wheel. Lengths are in density independent
/// units; [`WheelStyle::layout`] applies the host's scale factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelStyle {
    pub ring_width: f64,
    pub colors: [RingColor; PHASE_COUNT],
    pub handle_outer_radius: f64,
    pub handle_inner_radius: f64,
    pub handle_outer_color: RingColor,
    pub handle_inner_color: RingColor,
    pub angle_offset: f64,
    pub duration: u32,
    pub animation_ms: u64,
    pub drag_advance: DragAdvance,
}

impl Default for WheelStyle {
    fn default() -> Self {
        Self {
            ring_width: 40.0,
            colors: [
                RingColor::rgba(0xe5, 0x73, 0x73, 0xff),
                RingColor::rgba(0xff, 0xd5, 0x4f, 0xff),
                RingColor::rgba(0x64, 0xb5, 0xf6, 0xff),
                RingColor::rgba(0x81, 0xc7, 0x84, 0xff),
            ],
            handle_outer_radius: 60.0,
            handle_inner_radius: 8.0,
            handle_outer_color: RingColor::rgba(0, 0, 0, 0xce),
            handle_inner_color: RingColor::rgba(0xff, 0xff, 0xff, 0xff),
            angle_offset: -45.0,
            duration: 28,
            animation_ms: 500,
            drag_advance: DragAdvance::Stepped,
        }
    }
}

impl WheelStyle {
    pub fn validate(&self) -> Result<(), StyleError> {
        for (name, value) in [
            ("ring_width", self.ring_width),
            ("handle_outer_radius", self.handle_outer_radius),
            ("handle_inner_radius", self.handle_inner_radius),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(StyleError::Length { name, value });
            }
        }
        if self.handle_inner_radius > self.handle_outer_radius {
            return Err(StyleError::HandleRadii {
                inner: self.handle_inner_radius,
                outer: self.handle_outer_radius,
            });
        }
        if !self.angle_offset.is_finite() {
            return Err(StyleError::AngleOffset);
        }
        if !DURATION_RANGE.contains(&self.duration) {
            return Err(StyleError::Duration(self.duration));
        }
        Ok(())
    }

    pub fn layout(&self, scale_factor: f64) -> RingLayout {
        RingLayout {
            ring_width: self.ring_width * scale_factor,
            handle_outer_radius: self.handle_outer_radius * scale_factor,
            handle_inner_radius: self.handle_inner_radius * scale_factor,
            angle_offset: self.angle_offset,
        }
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    pub fn phase_color(&self, index: usize) -> RingColor {
        self.colors[index % PHASE_COUNT]
    }
}
