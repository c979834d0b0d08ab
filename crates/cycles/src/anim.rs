use std::time::Duration;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Easing {
    Linear,
    /// Material "decelerate" curve, `cubic-bezier(0, 0, 0.2, 1)`: fast start, slow finish.
    #[strum(serialize = "LinearOutSlowIn", serialize = "ease-out")]
    LinearOutSlowIn,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::LinearOutSlowIn => cubic_bezier(0.0, 0.0, 0.2, 1.0, t),
        }
    }
}

fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    let curve = |p1: f64, p2: f64, s: f64| {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
    };

    // x(s) is monotonic for control points inside the unit square
    let (mut lo, mut hi) = (0.0, 1.0);
    let mut s = x;
    for _ in 0..64 {
        let cx = curve(x1, x2, s);
        if (cx - x).abs() < 1e-12 {
            break;
        }
        if cx < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    curve(y1, y2, s)
}

/// Value moving from `from` to `to` over `duration`, sampled with host frame times.
///
/// The first sample fixes the start time, so the tween begins at whatever frame the
/// host happens to deliver first.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    duration: Duration,
    easing: Easing,
    started_at: Option<Duration>,
}

impl Tween {
    pub fn new(from: f64, to: f64, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
            started_at: None,
        }
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    /// Returns the value at `frame_time` and whether the tween has finished. The
    /// finishing sample is exactly `to`.
    pub fn sample(&mut self, frame_time: Duration) -> (f64, bool) {
        let start = *self.started_at.get_or_insert(frame_time);
        let elapsed = frame_time.saturating_sub(start);

        if self.duration.is_zero() || elapsed >= self.duration {
            return (self.to, true);
        }

        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let k = self.easing.apply(t);
        (self.from + (self.to - self.from) * k, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::LinearOutSlowIn] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9);
            assert_eq!(easing.apply(-1.0), 0.0);
        }
    }

    #[test]
    fn test_ease_out_is_fast_then_slow() {
        let e = Easing::LinearOutSlowIn;
        assert!(e.apply(0.25) > 0.25);
        assert!(e.apply(0.5) > 0.7);

        let samples: Vec<f64> = (0..=20).map(|i| e.apply(i as f64 / 20.0)).collect();
        for pair in samples.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        let first_step = samples[1] - samples[0];
        let last_step = samples[20] - samples[19];
        assert!(first_step > last_step);
    }

    #[test]
    fn test_easing_from_str() {
        let cases = vec![
            ("linear", Easing::Linear),
            ("Linear", Easing::Linear),
            ("ease-out", Easing::LinearOutSlowIn),
            ("linearoutslowin", Easing::LinearOutSlowIn),
        ];
        for (input, expected) in cases {
            assert_eq!(input.parse::<Easing>().unwrap(), expected);
        }
    }

    #[test]
    fn test_tween_starts_on_first_sample() {
        let mut tween = Tween::new(0.0, -90.0, Duration::from_millis(500), Easing::Linear);

        assert_eq!(tween.sample(Duration::from_secs(10)), (0.0, false));
        let (mid, done) = tween.sample(Duration::from_millis(10_250));
        assert!(!done);
        assert!((mid + 45.0).abs() < 1e-9);
        assert_eq!(tween.sample(Duration::from_millis(10_500)), (-90.0, true));
        assert_eq!(tween.sample(Duration::from_millis(10_900)), (-90.0, true));
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut tween = Tween::new(3.0, 7.0, Duration::ZERO, Easing::LinearOutSlowIn);
        assert_eq!(tween.sample(Duration::from_millis(1)), (7.0, true));
    }
}
