use super::Shared;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub const DRAG_TICK: Duration = Duration::from_millis(50);

/// Periodic task turning the ring while the handle is held. One ticker belongs to
/// one drag generation and stops by itself once that drag is over.
#[derive(Debug)]
pub(crate) struct DragTicker {
    task: JoinHandle<()>,
}

impl DragTicker {
    pub fn spawn(runtime: &Handle, shared: Arc<Shared>, generation: u64) -> Self {
        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + DRAG_TICK, DRAG_TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !shared.with_state(|state| state.drag_tick(generation)) {
                    break;
                }
            }
            log::trace!("Drag ticker {generation} stopped");
        });
        Self { task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for DragTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
