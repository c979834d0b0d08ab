use crate::error::{CycleError, Result};
use crate::phase::CyclePhase;
use crate::table::{DURATION_RANGE, PHASE_COUNT, PhaseTable, Phases, TableSnapshot};

/// Phases of a cycle of a given length, captured from a [`PhaseTable`] at
/// construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    duration: u32,
    phases: Phases,
}

impl Cycle {
    pub fn new(table: &PhaseTable, duration: u32) -> Result<Self> {
        Self::from_snapshot(&table.snapshot(), duration)
    }

    /// Builds the cycle from one already taken version of the table.
    pub fn from_snapshot(snapshot: &TableSnapshot, duration: u32) -> Result<Self> {
        if !DURATION_RANGE.contains(&duration) {
            return Err(CycleError::InvalidDuration(duration));
        }
        let phases = snapshot.phases(duration)?;
        Ok(Self { duration, phases })
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn phases(&self) -> &Phases {
        &self.phases
    }

    /// # Panics
    ///
    /// Panics if `index` is not below [`PHASE_COUNT`].
    pub fn phase_at(&self, index: usize) -> &CyclePhase {
        &self.phases[index]
    }

    pub fn contains_day(&self, day: u32) -> bool {
        (1..=self.duration).contains(&day)
    }

    pub fn phase_for_day(&self, day: u32) -> Result<&CyclePhase> {
        self.phase_index_for_day(day).map(|i| &self.phases[i])
    }

    pub fn phase_index_for_day(&self, day: u32) -> Result<usize> {
        let out_of_range = CycleError::DayOutOfRange {
            day,
            duration: self.duration,
        };
        if !self.contains_day(day) {
            return Err(out_of_range);
        }
        // a validated table always has a match; a miss means the table was malformed
        (0..PHASE_COUNT)
            .find(|&i| self.phases[i].contains(day))
            .ok_or_else(|| CycleError::InvalidPhaseTable {
                duration: self.duration,
                reason: format!("no phase covers day {day}"),
            })
    }
}

/// Degrees of ring per day. Short cycles are drawn on a 32-day ring and longer ones
/// get two spare days, so the ring never closes on itself.
pub fn angle_per_day(duration: u32) -> f64 {
    let length_in_days = if duration < 31 { 32 } else { duration + 2 };
    360.0 / f64::from(length_in_days)
}

/// `(start, sweep)` in degrees for each phase of `cycle` at `angle_per_day`.
pub fn phase_angles(cycle: &Cycle, angle_per_day: f64) -> [(f64, f64); PHASE_COUNT] {
    cycle.phases().each_ref().map(|p| {
        (
            f64::from(p.days_before()) * angle_per_day,
            f64::from(p.length()) * angle_per_day,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::phase::PhaseRange;

    fn range(first: u32, last: u32) -> CyclePhase {
        PhaseRange::new(first, last).unwrap().into()
    }

    #[test]
    fn test_default_28_day_cycle() {
        let cycle = Cycle::new(&PhaseTable::new(), 28).unwrap();
        assert_eq!(
            cycle.phases(),
            &[range(1, 5), range(6, 15), range(16, 20), range(21, 28)]
        );
        assert_eq!(cycle.phase_for_day(10).unwrap(), &range(6, 15));
        assert_eq!(cycle.phase_for_day(28).unwrap(), &range(21, 28));
    }

    #[test]
    fn test_default_20_day_cycle() {
        let cycle = Cycle::new(&PhaseTable::new(), 20).unwrap();
        assert_eq!(
            cycle.phases(),
            &[range(1, 3), range(4, 10), range(11, 13), range(14, 20)]
        );
        assert_eq!(cycle.phase_for_day(1).unwrap(), &range(1, 3));
        assert_eq!(cycle.phase_at(3), &range(14, 20));
    }

    #[test]
    fn test_every_day_resolves_to_its_phase() {
        let table = PhaseTable::new();
        for duration in DURATION_RANGE {
            let cycle = Cycle::new(&table, duration).unwrap();
            for day in 1..=duration {
                assert!(cycle.phase_for_day(day).unwrap().contains(day));
            }
            assert_eq!(
                cycle.phase_for_day(0),
                Err(CycleError::DayOutOfRange { day: 0, duration })
            );
            assert_eq!(
                cycle.phase_for_day(duration + 1),
                Err(CycleError::DayOutOfRange {
                    day: duration + 1,
                    duration
                })
            );
        }
    }

    #[test]
    fn test_construction_rejects_unknown_durations() {
        let table = PhaseTable::new();
        for duration in [0, 19, 43, 100] {
            assert_eq!(
                Cycle::new(&table, duration),
                Err(CycleError::InvalidDuration(duration))
            );
        }
    }

    #[test]
    fn test_cycle_keeps_its_snapshot() {
        let table = PhaseTable::new();
        let cycle = Cycle::new(&table, 30).unwrap();

        table
            .set_durations(
                [(
                    30,
                    [range(1, 6), range(7, 14), range(15, 20), range(21, 30)],
                )]
                .into(),
            )
            .unwrap();

        assert_eq!(cycle.phase_at(0), &range(1, 5));
        assert_eq!(Cycle::new(&table, 30).unwrap().phase_at(0), &range(1, 6));
        assert_eq!(
            Cycle::new(&table, 28),
            Err(CycleError::InvalidDuration(28))
        );
    }

    #[test]
    fn test_angle_per_day_leaves_a_gap() {
        assert_eq!(angle_per_day(20), 360.0 / 32.0);
        assert_eq!(angle_per_day(30), 360.0 / 32.0);
        assert_eq!(angle_per_day(31), 360.0 / 33.0);
        assert_eq!(angle_per_day(42), 360.0 / 44.0);

        for duration in DURATION_RANGE {
            assert!(f64::from(duration) * angle_per_day(duration) < 360.0);
        }
    }

    #[test]
    fn test_phase_angles_are_contiguous() {
        let cycle = Cycle::new(&PhaseTable::new(), 28).unwrap();
        let per_day = angle_per_day(28);
        let angles = phase_angles(&cycle, per_day);

        assert_eq!(angles[0], (0.0, 5.0 * per_day));
        for pair in angles.windows(2) {
            let (start, sweep) = pair[0];
            assert!((start + sweep - pair[1].0).abs() < 1e-9);
        }
        let (start, sweep) = angles[3];
        assert!((start + sweep - 28.0 * per_day).abs() < 1e-9);
    }

    #[test]
    fn test_from_snapshot_ignores_later_replacements() {
        let table = PhaseTable::new();
        let snapshot = table.snapshot();
        table
            .set_durations([(30, Cycle::new(&table, 30).unwrap().phases().clone())].into())
            .unwrap();

        assert_eq!(
            Cycle::new(&table, 28),
            Err(CycleError::InvalidDuration(28))
        );
        let cycle = Cycle::from_snapshot(&snapshot, 28).unwrap();
        assert_eq!(cycle.phase_at(3), &range(21, 28));
        assert_eq!(
            Cycle::from_snapshot(&snapshot, 43),
            Err(CycleError::InvalidDuration(43))
        );
    }

    #[test]
    fn test_phase_names_travel_with_the_cycle() {
        let table = PhaseTable::new();
        let names = ["Menstrual", "Follicular", "Ovulation", "Luteal"];
        let phases = Cycle::new(&table, 28).unwrap().phases().clone();
        let named = std::array::from_fn(|i| CyclePhase::named(phases[i].range(), names[i]));
        table.set_durations([(28, named)].into()).unwrap();

        let cycle = Cycle::new(&table, 28).unwrap();
        assert_eq!(cycle.phase_for_day(3).unwrap().name(), Some("Menstrual"));
        assert_eq!(cycle.phase_for_day(17).unwrap().name(), Some("Ovulation"));
        assert_eq!(cycle.phase_for_day(28).unwrap().to_string(), "Luteal (21-28)");
    }
}
