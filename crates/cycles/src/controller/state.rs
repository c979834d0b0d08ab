use crate::anim::{Easing, Tween};
use crate::cycle::{Cycle, angle_per_day, phase_angles};
use crate::events::WheelEvent;
use crate::geometry::{GeometryFrame, RingGeometryBuilder, RingLayout};
use crate::style::DragAdvance;
use std::sync::Arc;
use std::time::Duration;
use strum::Display;

/// Fraction of a day the ring turns per drag tick.
const DAY_FRACTION_PER_TICK: f64 = 1.0 / 3.0;
const DAY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum WheelMode {
    Idle,
    Dragging,
    AnimatingToDay,
    AnimatingResize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Drag {
    pub press_y: f64,
    pub shift: f64,
    pub sign: f64,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub(crate) enum Transition {
    ToDay(Tween),
    Resize {
        progress: Tween,
        target: Cycle,
        from_angle_per_day: f64,
        to_angle_per_day: f64,
        from_angle: f64,
        day: u32,
    },
}

/// Day shown under the handle for a ring turned by `angle` degrees.
pub fn day_for_angle(angle: f64, angle_per_day: f64, duration: u32) -> u32 {
    if angle_per_day <= 0.0 || !angle.is_finite() {
        return 1;
    }
    let whole_days = (angle.abs() / angle_per_day + DAY_EPSILON).floor();
    (1 + whole_days as u32).clamp(1, duration.max(1))
}

pub fn angle_for_day(day: u32, angle_per_day: f64) -> f64 {
    -f64::from(day.saturating_sub(1)) * angle_per_day
}

/// Mutable wheel state. Every change that the host has to hear about is queued in
/// `outbox` and posted before the state lock is released.
#[derive(Debug)]
pub(crate) struct WheelState {
    pub cycle: Cycle,
    pub angle_per_day: f64,
    pub angle: f64,
    pub day: u32,
    pub drag: Option<Drag>,
    pub transition: Option<Transition>,
    pub size: (f64, f64),
    pub layout: RingLayout,
    pub drag_advance: DragAdvance,
    pub animation: Duration,
    pub frame: Arc<GeometryFrame>,
    pub enabled: bool,
    pub generation: u64,
    pub outbox: Vec<WheelEvent>,
}

impl WheelState {
    pub fn new(
        cycle: Cycle,
        layout: RingLayout,
        drag_advance: DragAdvance,
        animation: Duration,
    ) -> Self {
        let mut state = Self {
            angle_per_day: angle_per_day(cycle.duration()),
            cycle,
            angle: 0.0,
            day: 1,
            drag: None,
            transition: None,
            size: (0.0, 0.0),
            layout,
            drag_advance,
            animation,
            frame: Arc::default(),
            enabled: true,
            generation: 0,
            outbox: Vec::new(),
        };
        state.rebuild_frame();
        state
    }

    pub fn mode(&self) -> WheelMode {
        match (&self.transition, &self.drag) {
            (Some(Transition::Resize { .. }), _) => WheelMode::AnimatingResize,
            (Some(Transition::ToDay(_)), _) => WheelMode::AnimatingToDay,
            (None, Some(_)) => WheelMode::Dragging,
            (None, None) => WheelMode::Idle,
        }
    }

    pub fn max_angle(&self) -> f64 {
        f64::from(self.cycle.duration()) * self.angle_per_day
    }

    fn geometry_cycle(&self) -> &Cycle {
        match &self.transition {
            Some(Transition::Resize { target, .. }) => target,
            _ => &self.cycle,
        }
    }

    pub fn rebuild_frame(&mut self) {
        let (width, height) = self.size;
        let angles = phase_angles(self.geometry_cycle(), self.angle_per_day);
        self.frame = Arc::new(RingGeometryBuilder::new(width, height).build(&self.layout, &angles));
    }

    pub fn redraw(&mut self) {
        if !self.outbox.contains(&WheelEvent::Redraw) {
            self.outbox.push(WheelEvent::Redraw);
        }
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle.clamp(-self.max_angle(), 0.0);
        self.sync_day();
    }

    /// Re-derives the day and queues a notification if it moved. Held back while a
    /// resize is in flight.
    pub fn sync_day(&mut self) {
        if matches!(self.transition, Some(Transition::Resize { .. })) {
            return;
        }
        let day = day_for_angle(self.angle, self.angle_per_day, self.cycle.duration());
        if day != self.day {
            self.day = day;
            self.outbox.push(WheelEvent::DayChanged {
                duration: self.cycle.duration(),
                day,
            });
        }
    }

    /// Swaps in `cycle` as the authoritative one and puts the selected day back
    /// under the handle, falling back to day 1 if it no longer exists.
    pub fn apply_cycle(&mut self, cycle: Cycle) {
        let duration_changed = cycle.duration() != self.cycle.duration();
        self.cycle = cycle;
        self.angle_per_day = angle_per_day(self.cycle.duration());

        let day = if self.cycle.contains_day(self.day) {
            self.day
        } else {
            1
        };
        self.angle = angle_for_day(day, self.angle_per_day);
        self.rebuild_frame();

        if duration_changed {
            log::debug!("Cycle duration is now {}", self.cycle.duration());
            self.outbox.push(WheelEvent::DurationChanged {
                duration: self.cycle.duration(),
                day,
            });
        }
        self.sync_day();
        self.redraw();
    }

    pub fn finish_resize(&mut self) {
        match self.transition.take() {
            Some(Transition::Resize { target, .. }) => {
                log::debug!("Resize to {} days completed", target.duration());
                self.apply_cycle(target);
            }
            other => self.transition = other,
        }
    }

    /// Makes room for direct input: a resize snaps to its end, a day animation
    /// stops where it is.
    pub fn interrupt_transition(&mut self) {
        match self.transition {
            Some(Transition::Resize { .. }) => self.finish_resize(),
            Some(Transition::ToDay(_)) => {
                log::debug!("Day animation interrupted at {:.2}°", self.angle);
                self.transition = None;
            }
            None => {}
        }
    }

    pub fn begin_drag(&mut self, press_y: f64) -> u64 {
        self.interrupt_transition();
        self.generation += 1;
        self.drag = Some(Drag {
            press_y,
            shift: 0.0,
            sign: 0.0,
            generation: self.generation,
        });
        log::debug!("Handle pressed at y={press_y:.1}");
        self.redraw();
        self.generation
    }

    pub fn update_drag(&mut self, y: f64) -> bool {
        let limit = self.frame.handle.outer_radius;
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        let delta = y - drag.press_y;
        drag.shift = delta.clamp(-limit, limit);
        drag.sign = if delta > 0.0 {
            1.0
        } else if delta < 0.0 {
            -1.0
        } else {
            0.0
        };
        self.redraw();
        true
    }

    pub fn end_drag(&mut self) -> bool {
        if self.drag.take().is_some() {
            log::debug!("Handle released on day {}", self.day);
            self.redraw();
            true
        } else {
            false
        }
    }

    /// One periodic drag step. Returns `false` once the drag identified by
    /// `generation` is over, which stops the ticker.
    pub fn drag_tick(&mut self, generation: u64) -> bool {
        let Some(drag) = self.drag.filter(|d| d.generation == generation) else {
            return false;
        };
        let base_step = self.angle_per_day * DAY_FRACTION_PER_TICK;
        let step = match self.drag_advance {
            DragAdvance::Stepped => drag.sign * base_step,
            DragAdvance::Proportional => {
                let limit = self.frame.handle.outer_radius;
                if limit > 0.0 {
                    base_step * drag.shift / limit
                } else {
                    drag.sign * base_step
                }
            }
        };
        if step != 0.0 {
            let before = self.angle;
            self.set_angle(self.angle - step);
            if self.angle != before {
                self.redraw();
            }
        }
        true
    }

    pub fn start_day_animation(&mut self, day: u32, duration: Duration) {
        let target = angle_for_day(day, self.angle_per_day);
        log::debug!("Animating to day {day} ({:.2}° -> {target:.2}°)", self.angle);
        self.transition = Some(Transition::ToDay(Tween::new(
            self.angle,
            target,
            duration,
            Easing::LinearOutSlowIn,
        )));
        self.outbox.push(WheelEvent::AnimationStarted);
    }

    pub fn start_resize(&mut self, target: Cycle, duration: Duration) {
        // start from the current filled arc spread over the new day count
        let filled = self.max_angle();
        let from = filled / f64::from(target.duration());
        let to = angle_per_day(target.duration());
        let day = if target.contains_day(self.day) {
            self.day
        } else {
            1
        };
        log::debug!(
            "Resizing {} -> {} days ({from:.3}°/day -> {to:.3}°/day)",
            self.cycle.duration(),
            target.duration()
        );

        self.transition = Some(Transition::Resize {
            progress: Tween::new(0.0, 1.0, duration, Easing::Linear),
            target,
            from_angle_per_day: from,
            to_angle_per_day: to,
            from_angle: self.angle,
            day,
        });
        self.apply_resize_progress(0.0);
        self.outbox.push(WheelEvent::AnimationStarted);
    }

    fn apply_resize_progress(&mut self, k: f64) {
        let Some(Transition::Resize {
            from_angle_per_day,
            to_angle_per_day,
            from_angle,
            day,
            ..
        }) = self.transition
        else {
            return;
        };
        // the ring turns from where it stood to the held day on the new cycle
        let to_angle = angle_for_day(day, to_angle_per_day);
        self.angle_per_day = from_angle_per_day + (to_angle_per_day - from_angle_per_day) * k;
        self.angle = from_angle + (to_angle - from_angle) * k;
        self.rebuild_frame();
        self.redraw();
    }

    /// Advances the running transition to `frame_time`. Returns whether it is still
    /// running afterwards.
    pub fn on_frame(&mut self, frame_time: Duration) -> bool {
        match &mut self.transition {
            None => false,
            Some(Transition::ToDay(tween)) => {
                let (angle, done) = tween.sample(frame_time);
                if done {
                    self.transition = None;
                }
                self.set_angle(angle);
                self.redraw();
                !done
            }
            Some(Transition::Resize { progress, .. }) => {
                let (k, done) = progress.sample(frame_time);
                self.apply_resize_progress(k);
                if done {
                    self.finish_resize();
                }
                !done
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::WheelStyle;
    use crate::table::{DURATION_RANGE, PhaseTable};

    fn state(duration: u32) -> WheelState {
        let cycle = Cycle::new(&PhaseTable::new(), duration).unwrap();
        let mut state = WheelState::new(
            cycle,
            WheelStyle::default().layout(1.0),
            DragAdvance::Stepped,
            Duration::from_millis(500),
        );
        state.size = (800.0, 600.0);
        state.rebuild_frame();
        state
    }

    #[test]
    fn test_day_for_angle_boundaries() {
        for duration in DURATION_RANGE {
            let per_day = angle_per_day(duration);
            for day in 1..=duration {
                let angle = angle_for_day(day, per_day);
                assert_eq!(day_for_angle(angle, per_day, duration), day);
                // just before the next boundary still belongs to this day
                let inside = angle - per_day * 0.999;
                assert_eq!(day_for_angle(inside, per_day, duration), day);
            }
            let max = f64::from(duration) * per_day;
            assert_eq!(day_for_angle(-max, per_day, duration), duration);
            assert_eq!(day_for_angle(0.0, per_day, duration), 1);
        }
        assert_eq!(day_for_angle(-10.0, 0.0, 28), 1);
        assert_eq!(day_for_angle(f64::NAN, 11.25, 28), 1);
    }

    #[test]
    fn test_drag_ticks_stay_clamped() {
        let mut s = state(28);
        let generation = s.begin_drag(100.0);

        // dragging up turns the ring back towards day 1, which is already the limit
        s.update_drag(40.0);
        for _ in 0..10 {
            assert!(s.drag_tick(generation));
            assert_eq!(s.angle, 0.0);
        }

        s.update_drag(160.0);
        for _ in 0..500 {
            s.drag_tick(generation);
            assert!(s.angle <= 0.0 && s.angle >= -s.max_angle());
        }
        assert_eq!(s.angle, -s.max_angle());
        assert_eq!(s.day, 28);
    }

    #[test]
    fn test_stepped_drag_moves_a_third_of_a_day() {
        let mut s = state(28);
        let generation = s.begin_drag(100.0);
        s.update_drag(101.0);
        s.drag_tick(generation);
        s.drag_tick(generation);
        s.drag_tick(generation);
        assert!((s.angle + s.angle_per_day).abs() < 1e-9);
        assert_eq!(s.day, 2);
        assert!(s.outbox.contains(&WheelEvent::DayChanged {
            duration: 28,
            day: 2
        }));
    }

    #[test]
    fn test_proportional_drag_scales_with_shift() {
        let mut s = state(28);
        s.drag_advance = DragAdvance::Proportional;
        let generation = s.begin_drag(100.0);
        // half of the 60px handle radius
        s.update_drag(130.0);
        s.drag_tick(generation);
        assert!((s.angle + s.angle_per_day / 6.0).abs() < 1e-9);

        // shift is clamped to the handle radius
        s.update_drag(1000.0);
        assert_eq!(s.drag.unwrap().shift, 60.0);
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let mut s = state(28);
        let old = s.begin_drag(0.0);
        s.update_drag(50.0);
        s.end_drag();
        assert!(!s.drag_tick(old));

        let new = s.begin_drag(0.0);
        s.update_drag(50.0);
        assert!(!s.drag_tick(old));
        assert!(s.drag_tick(new));
        assert_eq!(s.angle, -s.angle_per_day / 3.0);
    }

    #[test]
    fn test_day_changes_are_queued_once() {
        let mut s = state(28);
        s.outbox.clear();
        s.set_angle(-0.5);
        s.set_angle(-1.0);
        assert!(s.outbox.is_empty());

        s.set_angle(-s.angle_per_day);
        s.set_angle(-s.angle_per_day - 0.5);
        assert_eq!(
            s.outbox,
            vec![WheelEvent::DayChanged {
                duration: 28,
                day: 2
            }]
        );
    }

    #[test]
    fn test_resize_interpolates_and_holds_day() {
        let mut s = state(28);
        s.set_angle(angle_for_day(10, s.angle_per_day));
        s.outbox.clear();

        let before = s.angle;

        let target = Cycle::new(&PhaseTable::new(), 40).unwrap();
        s.start_resize(target, Duration::from_millis(400));
        assert_eq!(s.mode(), WheelMode::AnimatingResize);
        // the ring does not jump when the resize starts
        assert_eq!(s.angle, before);
        // filled arc is preserved at the start
        assert!((s.angle_per_day * 40.0 - 28.0 * 360.0 / 32.0).abs() < 1e-9);
        // the ring already shows the new phase split
        assert_eq!(s.frame.phase_angles[3].0, 29.0 * s.angle_per_day);

        assert!(s.on_frame(Duration::from_millis(1_000)));
        assert!(s.on_frame(Duration::from_millis(1_200)));
        let midway = (28.0 * 360.0 / 32.0 / 40.0 + 360.0 / 42.0) / 2.0;
        assert!((s.angle_per_day - midway).abs() < 1e-9);
        let halfway_turn = (before + angle_for_day(10, 360.0 / 42.0)) / 2.0;
        assert!((s.angle - halfway_turn).abs() < 1e-9);
        assert!(!s.outbox.iter().any(|e| matches!(
            e,
            WheelEvent::DayChanged { .. } | WheelEvent::DurationChanged { .. }
        )));

        assert!(!s.on_frame(Duration::from_millis(1_400)));
        assert_eq!(s.mode(), WheelMode::Idle);
        assert_eq!(s.cycle.duration(), 40);
        assert_eq!(s.angle_per_day, 360.0 / 42.0);
        assert_eq!(s.day, 10);
        assert!(s.outbox.contains(&WheelEvent::DurationChanged {
            duration: 40,
            day: 10
        }));
    }

    #[test]
    fn test_resize_below_selected_day_falls_back_to_day_one() {
        let mut s = state(40);
        s.set_angle(angle_for_day(35, s.angle_per_day));
        s.outbox.clear();

        let target = Cycle::new(&PhaseTable::new(), 25).unwrap();
        s.start_resize(target, Duration::ZERO);
        assert!(!s.on_frame(Duration::from_millis(5)));

        assert_eq!(s.cycle.duration(), 25);
        assert_eq!(s.day, 1);
        assert_eq!(s.angle, 0.0);
        assert_eq!(
            s.outbox
                .iter()
                .filter(|e| !matches!(e, WheelEvent::Redraw | WheelEvent::AnimationStarted))
                .cloned()
                .collect::<Vec<_>>(),
            vec![
                WheelEvent::DurationChanged {
                    duration: 25,
                    day: 1
                },
                WheelEvent::DayChanged {
                    duration: 25,
                    day: 1
                },
            ]
        );
    }

    #[test]
    fn test_interrupting_day_animation_keeps_angle() {
        let mut s = state(28);
        s.start_day_animation(15, Duration::from_millis(500));
        s.on_frame(Duration::from_millis(0));
        s.on_frame(Duration::from_millis(100));
        let reached = s.angle;
        assert!(reached < 0.0 && reached > angle_for_day(15, s.angle_per_day));

        s.begin_drag(0.0);
        assert_eq!(s.mode(), WheelMode::Dragging);
        assert_eq!(s.angle, reached);
    }
}
