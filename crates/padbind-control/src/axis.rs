use std::fmt;
use std::str::FromStr;

/// Absolute axis of the virtual gamepad, named after the uinput codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
    RX,
    RY,
    RZ,
    Hat0X,
    Hat0Y,
}

pub const STICK_MIN: i32 = -32768;
pub const STICK_MAX: i32 = 32767;
pub const TRIGGER_MAX: i32 = 255;

impl Axis {
    pub const ALL: [Axis; 8] = [
        Axis::X,
        Axis::Y,
        Axis::Z,
        Axis::RX,
        Axis::RY,
        Axis::RZ,
        Axis::Hat0X,
        Axis::Hat0Y,
    ];

    /// Inclusive value range the axis reports.
    pub const fn range(self) -> (i32, i32) {
        match self {
            Axis::X | Axis::Y | Axis::RX | Axis::RY => (STICK_MIN, STICK_MAX),
            Axis::Z | Axis::RZ => (0, TRIGGER_MAX),
            Axis::Hat0X | Axis::Hat0Y => (-1, 1),
        }
    }

    /// Map a value from `from_min..=from_max` onto this axis range.
    pub fn map(self, value: i32, from_min: i32, from_max: i32) -> i32 {
        let (min, max) = self.range();
        if from_max <= from_min {
            return min;
        }
        let t = f64::from(value.clamp(from_min, from_max) - from_min)
            / f64::from(from_max - from_min);
        #[allow(clippy::cast_possible_truncation)]
        let mapped = (f64::from(min) + t * f64::from(max - min)).round() as i32;
        mapped
    }

    pub const fn name(self) -> &'static str {
        match self {
            Axis::X => "ABS_X",
            Axis::Y => "ABS_Y",
            Axis::Z => "ABS_Z",
            Axis::RX => "ABS_RX",
            Axis::RY => "ABS_RY",
            Axis::RZ => "ABS_RZ",
            Axis::Hat0X => "ABS_HAT0X",
            Axis::Hat0Y => "ABS_HAT0Y",
        }
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Axis::ALL
            .into_iter()
            .find(|axis| axis.name() == upper || axis.name()[4..] == upper)
            .ok_or_else(|| format!("Invalid axis: {s}"))
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
