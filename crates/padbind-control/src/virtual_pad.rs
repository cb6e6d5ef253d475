use evdev::uinput::VirtualDevice;
use evdev::{AbsInfo, AbsoluteAxisCode, AttributeSet, EventType, InputEvent, KeyCode, UinputAbsSetup};

use crate::Axis;

const DEVICE_NAME: &str = "padbind virtual pad";

/// uinput gamepad that receives axis outputs.
pub struct VirtualPad {
    device: VirtualDevice,
}

impl VirtualPad {
    pub fn new() -> std::io::Result<Self> {
        let mut builder = VirtualDevice::builder()?.name(DEVICE_NAME);
        for axis in Axis::ALL {
            let (min, max) = axis.range();
            let (fuzz, flat) = match axis {
                Axis::X | Axis::Y | Axis::RX | Axis::RY => (16, 128),
                _ => (0, 0),
            };
            let info = AbsInfo::new(0, min, max, fuzz, flat, 0);
            builder = builder.with_absolute_axis(&UinputAbsSetup::new(code(axis), info))?;
        }

        // Without at least one gamepad button udev does not tag the device
        // as a joystick.
        let mut buttons: AttributeSet<KeyCode> = AttributeSet::default();
        buttons.insert(KeyCode::BTN_SOUTH);
        buttons.insert(KeyCode::BTN_EAST);
        builder = builder.with_keys(&buttons)?;

        Ok(Self {
            device: builder.build()?,
        })
    }

    /// Set one axis to `value`, clamped to the axis range.
    pub fn set_axis(&mut self, axis: Axis, value: i32) -> std::io::Result<()> {
        let (min, max) = axis.range();
        let event = InputEvent::new(EventType::ABSOLUTE.0, code(axis).0, value.clamp(min, max));
        self.device.emit(&[event])
    }

    /// Return every axis to its rest position.
    pub fn reset(&mut self) -> std::io::Result<()> {
        let events: Vec<InputEvent> = Axis::ALL
            .into_iter()
            .map(|axis| {
                let (min, _) = axis.range();
                let rest = if min < 0 { 0 } else { min };
                InputEvent::new(EventType::ABSOLUTE.0, code(axis).0, rest)
            })
            .collect();
        self.device.emit(&events)
    }
}

fn code(axis: Axis) -> AbsoluteAxisCode {
    match axis {
        Axis::X => AbsoluteAxisCode::ABS_X,
        Axis::Y => AbsoluteAxisCode::ABS_Y,
        Axis::Z => AbsoluteAxisCode::ABS_Z,
        Axis::RX => AbsoluteAxisCode::ABS_RX,
        Axis::RY => AbsoluteAxisCode::ABS_RY,
        Axis::RZ => AbsoluteAxisCode::ABS_RZ,
        Axis::Hat0X => AbsoluteAxisCode::ABS_HAT0X,
        Axis::Hat0Y => AbsoluteAxisCode::ABS_HAT0Y,
    }
}
