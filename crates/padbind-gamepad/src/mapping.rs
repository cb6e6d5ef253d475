//! Translation of generic gamepad input into the engine's controller layout.
//!
//! The left stick is the stick, the d-pad drives the left pad and the right
//! stick drives the right pad. Pads report a touch bit while in use and
//! `(0, 0)` when released.

use padbind_engine::types::{STICK_PAD_MAX, STICK_PAD_MIN, TRIGGER_CLICK};
use padbind_engine::{Button, HapticEffect, HapticPosition, PadEvent, Source};
use smallvec::SmallVec;

/// Right stick deflection below which the right pad counts as untouched.
pub(crate) const RIGHT_PAD_TOUCH: i32 = 4000;

const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;

pub(crate) type Events = SmallVec<[PadEvent; 3]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DPad {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StickAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

/// Per-controller state needed to turn single-axis updates into positions.
#[derive(Debug, Default)]
pub(crate) struct PadState {
    stick: (i32, i32),
    right: (i32, i32),
    right_touched: bool,
    dpad: [bool; 4],
    triggers: [u8; 2],
}

impl PadState {
    pub fn button(&mut self, button: Button, pressed: bool) -> Events {
        let mut events = Events::new();
        events.push(PadEvent::Button { button, pressed });
        events
    }

    pub fn dpad(&mut self, direction: DPad, pressed: bool) -> Events {
        let was_touched = self.dpad.iter().any(|held| *held);
        self.dpad[direction as usize] = pressed;
        let touched = self.dpad.iter().any(|held| *held);

        let mut events = Events::new();
        if touched && !was_touched {
            events.push(PadEvent::Button {
                button: Button::LPadTouch,
                pressed: true,
            });
        }
        let (x, y) = self.dpad_position();
        events.push(PadEvent::Position {
            source: Source::LeftPad,
            x,
            y,
        });
        if !touched && was_touched {
            events.push(PadEvent::Button {
                button: Button::LPadTouch,
                pressed: false,
            });
        }
        events
    }

    fn dpad_position(&self) -> (i32, i32) {
        let [up, down, left, right] = self.dpad;
        let axis = |positive: bool, negative: bool| match (positive, negative) {
            (true, false) => STICK_PAD_MAX,
            (false, true) => STICK_PAD_MIN,
            _ => 0,
        };
        (axis(right, left), axis(up, down))
    }

    /// `raw` is the backend value, y growing downwards.
    pub fn stick_axis(&mut self, axis: StickAxis, raw: i16) -> Events {
        let value = i32::from(raw);
        let mut events = Events::new();
        match axis {
            StickAxis::LeftX => self.stick.0 = value,
            StickAxis::LeftY => self.stick.1 = invert(value),
            StickAxis::RightX => self.right.0 = value,
            StickAxis::RightY => self.right.1 = invert(value),
        }

        match axis {
            StickAxis::LeftX | StickAxis::LeftY => events.push(PadEvent::Position {
                source: Source::Stick,
                x: self.stick.0,
                y: self.stick.1,
            }),
            StickAxis::RightX | StickAxis::RightY => self.right_pad(&mut events),
        }
        events
    }

    fn right_pad(&mut self, events: &mut Events) {
        let (x, y) = self.right;
        let touched = f64::from(x).hypot(f64::from(y)) > f64::from(RIGHT_PAD_TOUCH);
        match (self.right_touched, touched) {
            (false, true) => {
                events.push(PadEvent::Button {
                    button: Button::RPadTouch,
                    pressed: true,
                });
                events.push(PadEvent::Position {
                    source: Source::RightPad,
                    x,
                    y,
                });
            }
            (true, true) => events.push(PadEvent::Position {
                source: Source::RightPad,
                x,
                y,
            }),
            (true, false) => {
                events.push(PadEvent::Position {
                    source: Source::RightPad,
                    x: 0,
                    y: 0,
                });
                events.push(PadEvent::Button {
                    button: Button::RPadTouch,
                    pressed: false,
                });
            }
            (false, false) => {}
        }
        self.right_touched = touched;
    }

    /// `raw` is the backend value in `0..=32767`.
    pub fn trigger(&mut self, source: Source, raw: i16) -> Events {
        let (slot, click) = match source {
            Source::LeftTrigger => (0, Button::LT),
            Source::RightTrigger => (1, Button::RT),
            _ => return Events::new(),
        };
        let value = trigger_value(raw);
        let old = std::mem::replace(&mut self.triggers[slot], value);

        let mut events = Events::new();
        if old == value {
            return events;
        }
        events.push(PadEvent::Trigger { source, value });
        match (old >= TRIGGER_CLICK, value >= TRIGGER_CLICK) {
            (false, true) => events.push(PadEvent::Button {
                button: click,
                pressed: true,
            }),
            (true, false) => events.push(PadEvent::Button {
                button: click,
                pressed: false,
            }),
            _ => {}
        }
        events
    }
}

fn invert(value: i32) -> i32 {
    (-value).clamp(STICK_PAD_MIN, STICK_PAD_MAX)
}

pub(crate) fn trigger_value(raw: i16) -> u8 {
    let scaled = i32::from(raw.max(0)) * 255 / i32::from(i16::MAX);
    scaled.clamp(0, 255) as u8
}

/// Gyroscope sample in rad/s to engine degrees per second.
pub(crate) fn gyro_event(data: [f32; 3]) -> PadEvent {
    PadEvent::Gyro {
        pitch: f64::from(data[0]) * RAD_TO_DEG,
        yaw: f64::from(data[1]) * RAD_TO_DEG,
        roll: f64::from(data[2]) * RAD_TO_DEG,
    }
}

/// Rumble motor strengths and duration for a haptic effect. Amplitude 1024
/// saturates a motor; one period of 1024 lasts 128 ms.
pub(crate) fn rumble_for(effect: &HapticEffect) -> (u16, u16, u32) {
    let strength = (u32::from(effect.amplitude) * 64).min(u32::from(u16::MAX)) as u16;
    let (low, high) = match effect.position {
        HapticPosition::Left => (strength, 0),
        HapticPosition::Right => (0, strength),
        HapticPosition::Both => (strength, strength),
    };
    let ms = (u32::from(effect.period) / 8 * u32::from(effect.count.max(1))).clamp(20, 2000);
    (low, high, ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggers_scale_and_click() {
        let mut pad = PadState::default();
        assert_eq!(
            pad.trigger(Source::LeftTrigger, 16384).as_slice(),
            &[PadEvent::Trigger {
                source: Source::LeftTrigger,
                value: 127
            }]
        );
        assert_eq!(
            pad.trigger(Source::LeftTrigger, i16::MAX).as_slice(),
            &[
                PadEvent::Trigger {
                    source: Source::LeftTrigger,
                    value: 255
                },
                PadEvent::Button {
                    button: Button::LT,
                    pressed: true
                },
            ]
        );
        assert!(pad.trigger(Source::LeftTrigger, i16::MAX).is_empty());
        assert_eq!(
            pad.trigger(Source::LeftTrigger, 0).as_slice(),
            &[
                PadEvent::Trigger {
                    source: Source::LeftTrigger,
                    value: 0
                },
                PadEvent::Button {
                    button: Button::LT,
                    pressed: false
                },
            ]
        );
    }

    #[test]
    fn stick_y_points_up() {
        let mut pad = PadState::default();
        pad.stick_axis(StickAxis::LeftX, 1000);
        let events = pad.stick_axis(StickAxis::LeftY, i16::MIN);
        assert_eq!(
            events.as_slice(),
            &[PadEvent::Position {
                source: Source::Stick,
                x: 1000,
                y: STICK_PAD_MAX
            }]
        );
    }

    #[test]
    fn dpad_drives_left_pad() {
        let mut pad = PadState::default();
        assert_eq!(
            pad.dpad(DPad::Up, true).as_slice(),
            &[
                PadEvent::Button {
                    button: Button::LPadTouch,
                    pressed: true
                },
                PadEvent::Position {
                    source: Source::LeftPad,
                    x: 0,
                    y: STICK_PAD_MAX
                },
            ]
        );
        assert_eq!(
            pad.dpad(DPad::Left, true).as_slice(),
            &[PadEvent::Position {
                source: Source::LeftPad,
                x: STICK_PAD_MIN,
                y: STICK_PAD_MAX
            }]
        );
        pad.dpad(DPad::Up, false);
        assert_eq!(
            pad.dpad(DPad::Left, false).as_slice(),
            &[
                PadEvent::Position {
                    source: Source::LeftPad,
                    x: 0,
                    y: 0
                },
                PadEvent::Button {
                    button: Button::LPadTouch,
                    pressed: false
                },
            ]
        );
    }

    #[test]
    fn right_stick_touches_right_pad() {
        let mut pad = PadState::default();
        assert!(pad.stick_axis(StickAxis::RightX, 100).is_empty());

        let events = pad.stick_axis(StickAxis::RightX, 10_000);
        assert_eq!(
            events[0],
            PadEvent::Button {
                button: Button::RPadTouch,
                pressed: true
            }
        );

        let events = pad.stick_axis(StickAxis::RightX, 0);
        assert_eq!(
            events.as_slice(),
            &[
                PadEvent::Position {
                    source: Source::RightPad,
                    x: 0,
                    y: 0
                },
                PadEvent::Button {
                    button: Button::RPadTouch,
                    pressed: false
                },
            ]
        );
    }

    #[test]
    fn haptic_maps_sides_to_motors() {
        let effect = HapticEffect {
            position: HapticPosition::Right,
            amplitude: 1024,
            frequency: 8,
            period: 2048,
            count: 1,
        };
        assert_eq!(rumble_for(&effect), (0, u16::MAX, 256));
        assert_eq!(rumble_for(&HapticEffect::default()), (32768, 32768, 128));
    }

    #[test]
    fn gyro_is_reported_in_degrees() {
        let PadEvent::Gyro { pitch, yaw, roll } = gyro_event([std::f32::consts::PI, 0.0, -1.0])
        else {
            panic!("expected gyro sample");
        };
        assert!((pitch - 180.0).abs() < 1e-4);
        assert_eq!(yaw, 0.0);
        assert!((roll + RAD_TO_DEG).abs() < 1e-4);
    }
}
