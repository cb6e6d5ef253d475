use std::path::PathBuf;
use std::time::Duration;

use padbind_control::{Axis, KeyCombo, MouseButton};

use crate::types::Source;

/// Side of the controller a haptic pulse is played on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HapticPosition {
    Left,
    Right,
    Both,
}

impl HapticPosition {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "LEFT" => Some(HapticPosition::Left),
            "RIGHT" => Some(HapticPosition::Right),
            "BOTH" => Some(HapticPosition::Both),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HapticEffect {
    pub position: HapticPosition,
    pub amplitude: u16,
    pub frequency: u16,
    pub period: u16,
    pub count: u16,
}

impl Default for HapticEffect {
    fn default() -> Self {
        Self {
            position: HapticPosition::Both,
            amplitude: 512,
            frequency: 4,
            period: 1024,
            count: 1,
        }
    }
}

/// How the OSD helper lays a menu out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MenuKind {
    #[default]
    List,
    Grid,
    Radial,
}

impl MenuKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "list" | "menu" => Some(MenuKind::List),
            "grid" | "gridmenu" => Some(MenuKind::Grid),
            "radial" | "radialmenu" => Some(MenuKind::Radial),
            _ => None,
        }
    }

    /// OSD helper command that shows this kind of menu.
    pub fn command(self) -> &'static str {
        match self {
            MenuKind::List => "menu",
            MenuKind::Grid => "gridmenu",
            MenuKind::Radial => "radialmenu",
        }
    }
}

/// Request to show a menu through the OSD helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRequest {
    /// Profile menu id, or a menu file name when it contains a `.`.
    pub menu: String,
    pub kind: MenuKind,
    pub control_with: Source,
    pub confirm_with: String,
    pub cancel_with: String,
    pub position: (i32, i32),
    pub use_cursor: bool,
}

/// Effect produced by an action. The engine never talks to the OS itself;
/// the daemon executes outputs.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    KeyPress(KeyCombo),
    KeyRelease(KeyCombo),
    MousePress(MouseButton),
    MouseRelease(MouseButton),
    MouseMove { dx: i32, dy: i32 },
    Scroll { h: i32, v: i32 },
    Axis { axis: Axis, value: i32 },
    Haptic(HapticEffect),
    Shell(String),
    Menu(MenuRequest),
    Osd { text: String, timeout: Duration },
    Keyboard,
    ChangeProfile(PathBuf),
    TurnOff,
}
