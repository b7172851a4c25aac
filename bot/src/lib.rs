//! Decision core of the bot.
//!
//! Each unit (healer, eater, haste, skinner) owns its own cooldown or timer and
//! decides whether to press its bound hotkey. Units never touch the screen or
//! the keyboard directly: readings come in through [`PerceptionSource`] and
//! key presses go out through [`ActionSink`].

mod binding;
pub use binding::{ActionBinding, ThresholdConfig};

mod cooldown;
pub use cooldown::CooldownGate;

mod error;
pub use error::BotError;

mod reading;
pub use reading::{PerceptionSource, StatusReading};

mod sink;
pub use sink::{ActionSink, SharedSink};

mod timer;
pub use timer::Deadline;

pub mod click;
pub mod eater;
pub mod haste;
pub mod healer;
pub mod orchestrator;
pub mod pool;
pub mod settings;
pub mod skinner;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use eater::IntervalEater;
pub use haste::IntervalCaster;
pub use healer::{HealKind, ThresholdHealer};
pub use orchestrator::{BotOrchestrator, Command, StatusSnapshot};
pub use settings::BotSettings;
pub use skinner::EventSkinner;
