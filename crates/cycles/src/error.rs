use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    #[error("cycle duration {0} is not available")]
    InvalidDuration(u32),
    #[error("day {day} is outside of [1..{duration}]")]
    DayOutOfRange { day: u32, duration: u32 },
    #[error("phases for duration {duration} are malformed: {reason}")]
    InvalidPhaseTable { duration: u32, reason: String },
    #[error("phase table must register at least one duration")]
    EmptyPhaseTable,
}

pub type Result<T, E = CycleError> = std::result::Result<T, E>;
