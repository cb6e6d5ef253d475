//! Output vocabulary shared by the engine and the daemon, plus the backends
//! that turn it into real input: enigo for keyboard and pointer, and an
//! optional uinput virtual gamepad for axes.

mod axis;
mod key;
mod key_combo;
mod modifiers;
mod mouse;
#[cfg(feature = "enigo")]
mod performer;
#[cfg(all(feature = "virtual-pad", target_os = "linux"))]
mod virtual_pad;

pub use axis::{Axis, STICK_MAX, STICK_MIN, TRIGGER_MAX};
pub use key::Key;
pub use key_combo::KeyCombo;
pub use modifiers::{Modifier, Modifiers};
pub use mouse::MouseButton;
#[cfg(feature = "enigo")]
pub use performer::Performer;
#[cfg(all(feature = "virtual-pad", target_os = "linux"))]
pub use virtual_pad::VirtualPad;
