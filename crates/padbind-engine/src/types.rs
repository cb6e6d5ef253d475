use std::fmt;
use std::str::FromStr;

use padbind_bit_derive::Bit;
use padbind_bit_mask::{Bitable, Bitmask};

use crate::error::InterceptError;

pub const STICK_PAD_MIN: i32 = -32768;
pub const STICK_PAD_MAX: i32 = 32767;
pub const TRIGGER_MIN: u8 = 0;
pub const TRIGGER_HALF: u8 = 50;
pub const TRIGGER_CLICK: u8 = 254;
pub const TRIGGER_MAX: u8 = 255;

/// Digital state bits reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
pub enum Button {
    A,
    B,
    X,
    Y,
    Back,
    C,
    Start,
    LB,
    RB,
    /// Trigger pulled all the way.
    LT,
    RT,
    LGrip,
    RGrip,
    LPad,
    RPad,
    LPadTouch,
    RPadTouch,
    StickPress,
}

pub type Buttons = Bitmask<Button>;

impl Button {
    pub const fn name(self) -> &'static str {
        match self {
            Button::A => "A",
            Button::B => "B",
            Button::X => "X",
            Button::Y => "Y",
            Button::Back => "BACK",
            Button::C => "C",
            Button::Start => "START",
            Button::LB => "LB",
            Button::RB => "RB",
            Button::LT => "LT",
            Button::RT => "RT",
            Button::LGrip => "LGRIP",
            Button::RGrip => "RGRIP",
            Button::LPad => "LPAD",
            Button::RPad => "RPAD",
            Button::LPadTouch => "LPADTOUCH",
            Button::RPadTouch => "RPADTOUCH",
            Button::StickPress => "STICKPRESS",
        }
    }

    /// The source a press of this button is dispatched to, if any.
    pub const fn source(self) -> Option<Source> {
        Some(match self {
            Button::A => Source::A,
            Button::B => Source::B,
            Button::X => Source::X,
            Button::Y => Source::Y,
            Button::Back => Source::Back,
            Button::C => Source::C,
            Button::Start => Source::Start,
            Button::LB => Source::LB,
            Button::RB => Source::RB,
            Button::LGrip => Source::LGrip,
            Button::RGrip => Source::RGrip,
            Button::LPad => Source::LPad,
            Button::RPad => Source::RPad,
            Button::StickPress => Source::StickPress,
            Button::LT | Button::RT | Button::LPadTouch | Button::RPadTouch => {
                return None
            }
        })
    }
}

impl FromStr for Button {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        (0..Button::COUNT)
            .filter_map(Button::from_index)
            .find(|button| button.name() == upper)
            .ok_or_else(|| format!("unknown button: {s}"))
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One addressable input. Exactly one action is bound to each source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
pub enum Source {
    A,
    B,
    X,
    Y,
    Back,
    C,
    Start,
    LB,
    RB,
    LGrip,
    RGrip,
    LPad,
    RPad,
    StickPress,
    LeftPad,
    RightPad,
    Stick,
    LeftTrigger,
    RightTrigger,
}

pub type Sources = Bitmask<Source>;

/// How events reach a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Button,
    Position,
    Trigger,
}

impl Source {
    pub fn all() -> impl Iterator<Item = Source> {
        (0..Source::COUNT).filter_map(Source::from_index)
    }

    /// Wire name, as used by sessions and profiles.
    pub const fn name(self) -> &'static str {
        match self {
            Source::A => "A",
            Source::B => "B",
            Source::X => "X",
            Source::Y => "Y",
            Source::Back => "BACK",
            Source::C => "C",
            Source::Start => "START",
            Source::LB => "LB",
            Source::RB => "RB",
            Source::LGrip => "LGRIP",
            Source::RGrip => "RGRIP",
            Source::LPad => "LPAD",
            Source::RPad => "RPAD",
            Source::StickPress => "STICKPRESS",
            Source::LeftPad => "LEFT",
            Source::RightPad => "RIGHT",
            Source::Stick => "STICK",
            Source::LeftTrigger => "LT",
            Source::RightTrigger => "RT",
        }
    }

    pub const fn kind(self) -> SourceKind {
        match self {
            Source::LeftPad | Source::RightPad | Source::Stick => SourceKind::Position,
            Source::LeftTrigger | Source::RightTrigger => SourceKind::Trigger,
            _ => SourceKind::Button,
        }
    }

    /// Click bit of a positional source.
    pub const fn click_button(self) -> Option<Button> {
        match self {
            Source::LeftPad => Some(Button::LPad),
            Source::RightPad => Some(Button::RPad),
            Source::Stick => Some(Button::StickPress),
            _ => None,
        }
    }

    /// Finger-on-pad bit of a pad source.
    pub const fn touch_button(self) -> Option<Button> {
        match self {
            Source::LeftPad => Some(Button::LPadTouch),
            Source::RightPad => Some(Button::RPadTouch),
            _ => None,
        }
    }

    pub const fn is_pad(self) -> bool {
        matches!(self, Source::LeftPad | Source::RightPad)
    }
}

impl FromStr for Source {
    type Err = InterceptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Source::all()
            .find(|source| source.name() == name)
            .ok_or_else(|| InterceptError::UnknownSource(name.to_string()))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw input delivered by the device transport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PadEvent {
    Button { button: Button, pressed: bool },
    Trigger { source: Source, value: u8 },
    Position { source: Source, x: i32, y: i32 },
    /// Angular velocity in degrees per second.
    Gyro { pitch: f64, yaw: f64, roll: f64 },
}
