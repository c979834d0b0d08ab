pub mod anim;
pub mod config;
pub mod controller;
pub mod cycle;
pub mod error;
pub mod events;
pub mod geometry;
pub mod phase;
pub mod style;
pub mod table;

pub use controller::{InteractionController, WheelMode, WheelSnapshot};
pub use cycle::Cycle;
pub use error::{CycleError, Result};
pub use events::WheelEvent;
pub use phase::{CyclePhase, PhaseRange};
pub use style::WheelStyle;
pub use table::PhaseTable;
