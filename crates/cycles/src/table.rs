use crate::error::{CycleError, Result};
use crate::phase::{CyclePhase, PhaseRange};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use std::sync::Arc;

pub const PHASE_COUNT: usize = 4;
pub const DURATION_RANGE: RangeInclusive<u32> = 20..=42;

pub type Phases = [CyclePhase; PHASE_COUNT];

const fn split(p1: u32, p2: u32, p3: u32, p4: u32) -> Phases {
    [
        CyclePhase::unnamed(PhaseRange::new_unchecked(1, p1)),
        CyclePhase::unnamed(PhaseRange::new_unchecked(p1 + 1, p2)),
        CyclePhase::unnamed(PhaseRange::new_unchecked(p2 + 1, p3)),
        CyclePhase::unnamed(PhaseRange::new_unchecked(p3 + 1, p4)),
    ]
}

// last day of each phase, per duration
pub(crate) const DEFAULT_PHASES: [(u32, Phases); 23] = [
    (20, split(3, 10, 13, 20)),
    (21, split(4, 11, 15, 21)),
    (22, split(4, 12, 16, 22)),
    (23, split(4, 12, 16, 23)),
    (24, split(4, 13, 17, 24)),
    (25, split(4, 13, 18, 25)),
    (26, split(5, 14, 19, 26)),
    (27, split(5, 15, 20, 27)),
    (28, split(5, 15, 20, 28)),
    (29, split(5, 16, 21, 29)),
    (30, split(5, 16, 21, 30)),
    (31, split(5, 16, 22, 31)),
    (32, split(6, 17, 23, 32)),
    (33, split(6, 18, 24, 33)),
    (34, split(6, 18, 24, 34)),
    (35, split(6, 19, 25, 35)),
    (36, split(6, 19, 26, 36)),
    (37, split(7, 20, 27, 37)),
    (38, split(7, 20, 27, 38)),
    (39, split(7, 21, 28, 39)),
    (40, split(7, 22, 29, 40)),
    (41, split(7, 22, 29, 41)),
    (42, split(7, 22, 29, 42)),
];

/// Receives a call after every wholesale replacement of a [`PhaseTable`].
///
/// Called on the thread that replaced the table, after every table lock has been
/// released, so implementations may read the table back.
pub trait TableObserver: Send + Sync {
    fn on_phase_table_changed(&self);
}

impl<F> TableObserver for F
where
    F: Fn() + Send + Sync,
{
    fn on_phase_table_changed(&self) {
        self()
    }
}

/// One immutable version of the duration → phases mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSnapshot {
    phases: BTreeMap<u32, Phases>,
    is_default: bool,
}

impl TableSnapshot {
    fn builtin() -> Self {
        Self {
            phases: DEFAULT_PHASES.into_iter().collect(),
            is_default: true,
        }
    }

    pub fn phases(&self, duration: u32) -> Result<Phases> {
        self.phases
            .get(&duration)
            .cloned()
            .ok_or(CycleError::InvalidDuration(duration))
    }

    pub fn durations(&self) -> BTreeSet<u32> {
        self.phases.keys().copied().collect()
    }

    pub fn contains(&self, duration: u32) -> bool {
        self.phases.contains_key(&duration)
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

struct Inner {
    snapshot: RwLock<Arc<TableSnapshot>>,
    observers: Mutex<Vec<Arc<dyn TableObserver>>>,
}

/// Shared, replace-only registry of phase splits keyed by cycle duration.
///
/// Cloning is cheap and every clone refers to the same table. Lookups read an
/// `Arc` snapshot, so a replacement racing with a lookup is seen either fully or
/// not at all.
#[derive(Clone)]
pub struct PhaseTable {
    inner: Arc<Inner>,
}

impl Default for PhaseTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PhaseTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseTable")
            .field("snapshot", &self.snapshot())
            .field("observers", &self.inner.observers.lock().len())
            .finish()
    }
}

impl PhaseTable {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                snapshot: RwLock::new(Arc::new(TableSnapshot::builtin())),
                observers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn snapshot(&self) -> Arc<TableSnapshot> {
        self.inner.snapshot.read().clone()
    }

    pub fn get_phases(&self, duration: u32) -> Result<Phases> {
        self.snapshot().phases(duration)
    }

    pub fn available_durations(&self) -> BTreeSet<u32> {
        self.snapshot().durations()
    }

    pub fn is_default(&self) -> bool {
        self.snapshot().is_default()
    }

    /// Replaces the whole table. Nothing changes and nobody is notified when any
    /// entry fails validation.
    pub fn set_durations(&self, table: BTreeMap<u32, Phases>) -> Result<()> {
        if table.is_empty() {
            return Err(CycleError::EmptyPhaseTable);
        }
        for (&duration, phases) in &table {
            validate_phases(duration, phases)?;
        }

        log::info!(
            "Phase table replaced ({} durations: {:?})",
            table.len(),
            table.keys().collect::<Vec<_>>()
        );
        self.swap(TableSnapshot {
            phases: table,
            is_default: false,
        });
        Ok(())
    }

    pub fn reset(&self) {
        log::info!("Phase table reset to built-in defaults");
        self.swap(TableSnapshot::builtin());
    }

    fn swap(&self, snapshot: TableSnapshot) {
        *self.inner.snapshot.write() = Arc::new(snapshot);
        self.notify_observers();
    }

    /// Returns `false` if this observer was already registered.
    pub fn add_observer(&self, observer: Arc<dyn TableObserver>) -> bool {
        let mut observers = self.inner.observers.lock();
        if observers.iter().any(|o| same_observer(o, &observer)) {
            return false;
        }
        observers.push(observer);
        true
    }

    /// Returns `false` if this observer was not registered.
    pub fn remove_observer(&self, observer: &Arc<dyn TableObserver>) -> bool {
        let mut observers = self.inner.observers.lock();
        let before = observers.len();
        observers.retain(|o| !same_observer(o, observer));
        observers.len() != before
    }

    fn notify_observers(&self) {
        let observers = self.inner.observers.lock().clone();
        for observer in observers {
            observer.on_phase_table_changed();
        }
    }
}

fn same_observer(a: &Arc<dyn TableObserver>, b: &Arc<dyn TableObserver>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Checks that `phases` partition `1..=duration` in order without gaps.
pub fn validate_phases(duration: u32, phases: &Phases) -> Result<()> {
    let invalid = |reason: String| CycleError::InvalidPhaseTable { duration, reason };

    if !DURATION_RANGE.contains(&duration) {
        return Err(invalid(format!(
            "duration must be in {}..={}",
            DURATION_RANGE.start(),
            DURATION_RANGE.end()
        )));
    }

    let mut expected_first = 1;
    for (i, phase) in phases.iter().enumerate() {
        if phase.first() != expected_first {
            return Err(invalid(format!(
                "phase {} starts at day {} instead of {}",
                i + 1,
                phase.first(),
                expected_first
            )));
        }
        expected_first = phase.last() + 1;
    }

    if expected_first != duration + 1 {
        return Err(invalid(format!(
            "phases end at day {} instead of {}",
            expected_first - 1,
            duration
        )));
    }
    Ok(())
}
