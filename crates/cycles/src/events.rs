use crate::config::Config;

/// Notifications posted by the wheel to the host's main context.
#[derive(Debug, Clone, PartialEq)]
pub enum WheelEvent {
    Redraw,
    /// An animation is in flight; the host should keep delivering frames.
    AnimationStarted,
    DayChanged { duration: u32, day: u32 },
    DurationChanged { duration: u32, day: u32 },
    PhaseTableChanged,
    /// The config file changed; carries the already validated contents.
    ConfigReload(Box<Config>),
}
