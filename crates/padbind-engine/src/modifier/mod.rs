//! Stateful decorators wrapping child actions.

mod ball;
mod click;
mod deadzone;
mod doubleclick;
mod feedback;
mod hold;
mod mode;
mod rotate;
mod sensitivity;

pub use ball::{BallModifier, DEFAULT_FRICTION};
pub use click::ClickModifier;
pub use deadzone::{deadzone, DeadzoneModifier};
pub use doubleclick::DoubleclickModifier;
pub use feedback::FeedbackModifier;
pub use hold::HoldModifier;
pub use mode::ModeModifier;
pub use rotate::{rotate, RotateModifier};
pub use sensitivity::SensitivityModifier;

use std::time::Duration;

/// Default window of the time-based modifiers.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(200);
