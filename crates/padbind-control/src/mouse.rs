use std::fmt;
use std::str::FromStr;

/// Pointer button that can be emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    #[cfg(feature = "enigo")]
    pub fn to_enigo(self) -> enigo::Button {
        match self {
            MouseButton::Left => enigo::Button::Left,
            MouseButton::Right => enigo::Button::Right,
            MouseButton::Middle => enigo::Button::Middle,
        }
    }
}

impl FromStr for MouseButton {
    type Err = String;

    /// Accepts `left`, `right`, `middle` and the uinput `BTN_*` names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "btn_left" | "mouse1" => Ok(MouseButton::Left),
            "right" | "btn_right" | "mouse2" => Ok(MouseButton::Right),
            "middle" | "btn_middle" | "mouse3" => Ok(MouseButton::Middle),
            other => Err(format!("Invalid mouse button: {other}")),
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MouseButton::Left => "BTN_LEFT",
            MouseButton::Right => "BTN_RIGHT",
            MouseButton::Middle => "BTN_MIDDLE",
        })
    }
}
