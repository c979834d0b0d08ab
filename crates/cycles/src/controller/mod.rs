mod state;
mod ticker;

pub use state::{WheelMode, angle_for_day, day_for_angle};
pub use ticker::DRAG_TICK;

use crate::cycle::Cycle;
use crate::error::{CycleError, Result};
use crate::events::WheelEvent;
use crate::geometry::{GeometryFrame, Point};
use crate::phase::CyclePhase;
use crate::style::WheelStyle;
use crate::table::{PhaseTable, TableObserver};
use async_channel::Sender;
use parking_lot::Mutex;
use state::WheelState;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use ticker::DragTicker;
use tokio::runtime::Handle;

/// Posts notifications to the host. A closed channel means the host is gone.
#[derive(Debug, Clone)]
pub(crate) struct Notifier {
    tx: Sender<WheelEvent>,
}

impl Notifier {
    fn post(&self, event: WheelEvent) {
        if let Err(e) = self.tx.try_send(event) {
            log::debug!("Dropping wheel event: {e}");
        }
    }
}

#[derive(Debug)]
pub(crate) struct Shared {
    state: Mutex<WheelState>,
    notifier: Notifier,
}

impl Shared {
    /// Runs `f` under the state lock and posts whatever it queued before the
    /// lock is released, so events leave in the order the mutations happened.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut WheelState) -> R) -> R {
        let mut state = self.state.lock();
        let result = f(&mut state);
        for event in state.outbox.drain(..) {
            self.notifier.post(event);
        }
        result
    }
}

/// What the host needs to paint one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelSnapshot {
    pub frame: Arc<GeometryFrame>,
    pub angle: f64,
    pub handle_shift: f64,
    pub day: u32,
    pub duration: u32,
    pub mode: WheelMode,
}

impl WheelSnapshot {
    /// Rotation to apply to the ring about `frame.center`, in degrees.
    pub fn rotation(&self) -> f64 {
        self.frame.ring_rotation(self.angle)
    }

    /// Handle center, displaced by the current drag.
    pub fn handle_center(&self) -> Point {
        self.frame.handle.center.translate(0.0, self.handle_shift)
    }
}

/// Drives one wheel: pointer input, day selection, animated transitions and the
/// cycle length. Notifications go out through the `events` channel handed to
/// [`InteractionController::new`]; the host drains it on its main context.
pub struct InteractionController {
    table: PhaseTable,
    shared: Arc<Shared>,
    runtime: Handle,
    ticker: Mutex<Option<DragTicker>>,
    observer: Arc<dyn TableObserver>,
}

impl InteractionController {
    pub fn new(
        table: PhaseTable,
        style: &WheelStyle,
        scale_factor: f64,
        runtime: Handle,
        events: Sender<WheelEvent>,
    ) -> Result<Self> {
        let cycle = Cycle::new(&table, style.duration)?;
        let notifier = Notifier { tx: events };

        let observer: Arc<dyn TableObserver> = {
            let notifier = notifier.clone();
            Arc::new(move || notifier.post(WheelEvent::PhaseTableChanged))
        };
        table.add_observer(observer.clone());

        let state = WheelState::new(
            cycle,
            style.layout(scale_factor),
            style.drag_advance,
            style.animation_duration(),
        );
        log::debug!("Wheel created with a {} day cycle", style.duration);

        Ok(Self {
            table,
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                notifier,
            }),
            runtime,
            ticker: Mutex::new(None),
            observer,
        })
    }

    pub fn table(&self) -> &PhaseTable {
        &self.table
    }

    pub fn snapshot(&self) -> WheelSnapshot {
        let state = self.shared.state.lock();
        WheelSnapshot {
            frame: state.frame.clone(),
            angle: state.angle,
            handle_shift: state.drag.map_or(0.0, |d| d.shift),
            day: state.day,
            duration: state.cycle.duration(),
            mode: state.mode(),
        }
    }

    pub fn mode(&self) -> WheelMode {
        self.shared.state.lock().mode()
    }

    pub fn selected_day(&self) -> u32 {
        self.shared.state.lock().day
    }

    pub fn duration(&self) -> u32 {
        self.shared.state.lock().cycle.duration()
    }

    pub fn cycle(&self) -> Cycle {
        self.shared.state.lock().cycle.clone()
    }

    pub fn current_angle(&self) -> f64 {
        self.shared.state.lock().angle
    }

    pub fn handle_shift(&self) -> f64 {
        self.shared.state.lock().drag.map_or(0.0, |d| d.shift)
    }

    pub fn available_durations(&self) -> BTreeSet<u32> {
        self.table.available_durations()
    }

    pub fn phase_for_day(&self, day: u32) -> Result<CyclePhase> {
        self.shared.state.lock().cycle.phase_for_day(day).cloned()
    }

    pub fn on_size_changed(&self, width: f64, height: f64) {
        self.shared.with_state(|state| {
            if state.size == (width, height) {
                return;
            }
            log::debug!("Wheel surface is now {width}x{height}");
            state.size = (width, height);
            state.rebuild_frame();
            state.redraw();
        });
    }

    /// Picks up reloaded styling. The cycle length is left alone; it only sets the
    /// initial duration.
    pub fn apply_style(&self, style: &WheelStyle, scale_factor: f64) {
        self.shared.with_state(|state| {
            state.layout = style.layout(scale_factor);
            state.drag_advance = style.drag_advance;
            state.animation = style.animation_duration();
            state.rebuild_frame();
            state.redraw();
        });
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.state.lock().enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        let released = self.shared.with_state(|state| {
            state.enabled = enabled;
            !enabled && state.end_drag()
        });
        if released {
            self.stop_ticker();
        }
    }

    /// Returns whether the press landed on the handle and started a drag. The host
    /// should stop parent widgets from claiming the gesture when it did.
    pub fn on_pointer_down(&self, x: f64, y: f64) -> bool {
        let generation = self.shared.with_state(|state| {
            if !state.enabled || !state.frame.handle.contains(Point::new(x, y)) {
                return None;
            }
            Some(state.begin_drag(y))
        });
        let Some(generation) = generation else {
            return false;
        };

        let ticker = DragTicker::spawn(&self.runtime, self.shared.clone(), generation);
        // replacing the old ticker aborts it
        *self.ticker.lock() = Some(ticker);
        true
    }

    pub fn on_pointer_move(&self, _x: f64, y: f64) -> bool {
        self.shared.with_state(|state| state.update_drag(y))
    }

    pub fn on_pointer_up(&self) -> bool {
        let released = self.shared.with_state(WheelState::end_drag);
        self.stop_ticker();
        released
    }

    fn stop_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().take() {
            log::trace!("Stopping drag ticker (finished: {})", ticker.is_finished());
        }
    }

    /// Turns the ring straight to `day`.
    pub fn set_day(&self, day: u32) -> Result<()> {
        self.shared.with_state(|state| {
            state.finish_resize();
            check_day(&state.cycle, day)?;
            state.interrupt_transition();
            state.set_angle(angle_for_day(day, state.angle_per_day));
            state.redraw();
            Ok(())
        })
    }

    /// Animates the ring to `day` with the configured animation length.
    pub fn select_day(&self, day: u32) -> Result<()> {
        let duration = self.shared.state.lock().animation;
        self.select_day_over(day, duration)
    }

    /// Animates the ring to `day` over `duration`, superseding any running
    /// transition. The host feeds frames through [`InteractionController::on_frame`].
    pub fn select_day_over(&self, day: u32, duration: Duration) -> Result<()> {
        let released = self.shared.with_state(|state| {
            state.finish_resize();
            check_day(&state.cycle, day)?;
            state.interrupt_transition();
            let released = state.end_drag();
            state.start_day_animation(day, duration);
            Ok(released)
        })?;
        if released {
            self.stop_ticker();
        }
        Ok(())
    }

    /// Switches to a cycle of `duration` days, animated with the configured length
    /// or at once.
    pub fn resize_to(&self, duration: u32, animated: bool) -> Result<()> {
        let length = if animated {
            self.shared.state.lock().animation
        } else {
            Duration::ZERO
        };
        self.resize_over(duration, length)
    }

    pub fn set_duration(&self, duration: u32) -> Result<()> {
        self.resize_to(duration, false)
    }

    pub fn resize_over(&self, duration: u32, length: Duration) -> Result<()> {
        let target = Cycle::new(&self.table, duration)?;
        let released = self.shared.with_state(|state| {
            state.interrupt_transition();
            let released = state.end_drag();
            if length.is_zero() {
                state.apply_cycle(target);
            } else {
                state.start_resize(target, length);
            }
            released
        });
        if released {
            self.stop_ticker();
        }
        Ok(())
    }

    /// Advances the running animation to the host's `frame_time`. Returns whether
    /// more frames are needed.
    pub fn on_frame(&self, frame_time: Duration) -> bool {
        self.shared.with_state(|state| state.on_frame(frame_time))
    }

    /// Rebuilds the cycle from the replaced phase table. Keeps the current duration
    /// when it is still registered, otherwise falls back to the shortest one.
    pub fn on_phase_table_changed(&self) {
        let snapshot = self.table.snapshot();
        let released = self.shared.with_state(|state| {
            state.interrupt_transition();
            let current = state.cycle.duration();
            let duration = if snapshot.contains(current) {
                current
            } else {
                let Some(fallback) = snapshot.durations().first().copied() else {
                    log::error!("Phase table has no durations; keeping {current} days");
                    return false;
                };
                log::warn!("Duration {current} is gone from the phase table, using {fallback}");
                fallback
            };
            match Cycle::from_snapshot(&snapshot, duration) {
                Ok(cycle) => {
                    let released = state.end_drag();
                    state.apply_cycle(cycle);
                    released
                }
                Err(e) => {
                    log::error!("Failed to rebuild the cycle: {e}");
                    false
                }
            }
        });
        if released {
            self.stop_ticker();
        }
    }

    #[cfg(test)]
    fn tick_now(&self) -> bool {
        let generation = self.shared.state.lock().generation;
        self.shared.with_state(|state| state.drag_tick(generation))
    }
}

impl Drop for InteractionController {
    fn drop(&mut self) {
        self.ticker.get_mut().take();
        self.table.remove_observer(&self.observer);
    }
}

fn check_day(cycle: &Cycle, day: u32) -> Result<()> {
    if cycle.contains_day(day) {
        Ok(())
    } else {
        Err(CycleError::DayOutOfRange {
            day,
            duration: cycle.duration(),
        })
    }
}
