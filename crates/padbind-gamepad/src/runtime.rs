use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use ahash::AHashMap;
use colored::Colorize;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use padbind_engine::{Button, Source};
use sdl2::controller::{Axis as SdlAxis, Button as SdlButton, GameController};
use sdl2::event::Event;
use sdl2::sensor::SensorType;
use sdl2::{EventPump, GameControllerSubsystem};

use crate::command::Command;
use crate::events::ControllerEvent;
use crate::manager::{Inner, RETRY_DELAY};
use crate::mapping::{gyro_event, DPad, Events, PadState, StickAxis};
use crate::types::{ControllerId, ControllerInfo};
use crate::{Error, Result};

/// How long one wait for SDL events may block before commands are checked.
const EVENT_WAIT_MS: u32 = 10;

/// Starts the SDL2-backed runtime thread that drives device discovery and
/// events. A backend that fails to start is retried every [`RETRY_DELAY`].
pub(crate) fn start_runtime_thread(
    inner: Arc<Inner>,
    cmd_rx: Receiver<Command>,
    ready_tx: mpsc::Sender<()>,
) -> Result<()> {
    thread::Builder::new()
        .name("padbind-sdl".into())
        .spawn(move || {
            let mut ready_tx = Some(ready_tx);
            loop {
                match run_backend(&inner, &cmd_rx, &mut ready_tx) {
                    Ok(()) => return,
                    Err(e) => {
                        padbind_engine::print_error!("Controller backend failed: {e}");
                        forget_controllers(&inner);
                        inner.broadcast(ControllerEvent::BackendFailed(e.to_string()));
                        if let Some(tx) = ready_tx.take() {
                            let _ = tx.send(());
                        }
                        if !wait_for_retry(&cmd_rx) {
                            return;
                        }
                    }
                }
            }
        })
        .map(|_| ())
        .map_err(|e| Error::Backend(e.to_string()))
}

/// Sleeps through [`RETRY_DELAY`]. Returns `false` when asked to shut down.
fn wait_for_retry(cmd_rx: &Receiver<Command>) -> bool {
    let deadline = Instant::now() + RETRY_DELAY;
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return true;
        }
        match cmd_rx.recv_timeout(left) {
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => return false,
            // Gyro state lives in `Inner` and is applied on reconnect.
            Ok(_) => {}
            Err(RecvTimeoutError::Timeout) => return true,
        }
    }
}

fn forget_controllers(inner: &Inner) {
    let ids: Vec<ControllerId> = match inner.controllers_info.write() {
        Ok(mut map) => map.drain().map(|(id, _)| id).collect(),
        Err(_) => Vec::new(),
    };
    for id in ids {
        inner.broadcast(ControllerEvent::Disconnected(id));
    }
}

struct Device {
    controller: GameController,
    pad: PadState,
}

struct Backend<'a> {
    inner: &'a Inner,
    subsystem: GameControllerSubsystem,
    devices: AHashMap<ControllerId, Device>,
}

/// Runs one backend session. `Ok` means an orderly shutdown.
fn run_backend(
    inner: &Inner,
    cmd_rx: &Receiver<Command>,
    ready_tx: &mut Option<mpsc::Sender<()>>,
) -> Result<()> {
    // SDL must live entirely within this thread
    let sdl_ctx = sdl2::init().map_err(Error::BackendInit)?;
    let subsystem = sdl_ctx.game_controller().map_err(Error::BackendInit)?;
    let mut event_pump: EventPump = sdl_ctx.event_pump().map_err(Error::BackendInit)?;

    let mut backend = Backend {
        inner,
        subsystem,
        devices: AHashMap::new(),
    };
    inner.broadcast(ControllerEvent::BackendReady);

    // Devices present at start arrive as `ControllerDeviceAdded`.
    for event in event_pump.poll_iter() {
        backend.handle_event(event);
    }
    if let Some(tx) = ready_tx.take() {
        let _ = tx.send(());
    }

    loop {
        // Wait for an SDL event or timeout to reduce idle CPU usage
        if let Some(event) = event_pump.wait_event_timeout(EVENT_WAIT_MS) {
            backend.handle_event(event);
            // Drain any additional queued events quickly
            for event in event_pump.poll_iter() {
                backend.handle_event(event);
            }
        }

        while let Ok(cmd) = cmd_rx.try_recv() {
            if cmd == Command::Shutdown {
                return Ok(());
            }
            backend.handle_command(cmd);
        }
    }
}

impl Backend<'_> {
    fn handle_event(&mut self, event: Event) {
        match event {
            Event::ControllerDeviceAdded { which, .. } => self.add_device(which),
            Event::ControllerDeviceRemoved { which, .. } => self.remove_device(which),
            Event::ControllerButtonDown { which, button, .. } => {
                self.input(which, |pad| map_button(pad, button, true));
            }
            Event::ControllerButtonUp { which, button, .. } => {
                self.input(which, |pad| map_button(pad, button, false));
            }
            Event::ControllerAxisMotion {
                which, axis, value, ..
            } => {
                self.input(which, |pad| match axis {
                    SdlAxis::LeftX => pad.stick_axis(StickAxis::LeftX, value),
                    SdlAxis::LeftY => pad.stick_axis(StickAxis::LeftY, value),
                    SdlAxis::RightX => pad.stick_axis(StickAxis::RightX, value),
                    SdlAxis::RightY => pad.stick_axis(StickAxis::RightY, value),
                    SdlAxis::TriggerLeft => pad.trigger(Source::LeftTrigger, value),
                    SdlAxis::TriggerRight => pad.trigger(Source::RightTrigger, value),
                });
            }
            Event::ControllerSensorUpdated {
                which,
                sensor: SensorType::Gyroscope,
                data,
                ..
            } => {
                self.input(which, |_| {
                    let mut events = Events::new();
                    events.push(gyro_event(data));
                    events
                });
            }
            _ => {}
        }
    }

    fn input(&mut self, which: u32, f: impl FnOnce(&mut PadState) -> Events) {
        let Some(device) = self.devices.get_mut(&which) else {
            return;
        };
        for event in f(&mut device.pad) {
            self.inner.broadcast(ControllerEvent::Input { id: which, event });
        }
    }

    fn add_device(&mut self, index: u32) {
        let controller = match self.subsystem.open(index) {
            Ok(controller) => controller,
            Err(e) => {
                padbind_engine::print_warning!("Cannot open controller {index}: {e}");
                return;
            }
        };
        let id: ControllerId = controller.instance_id();
        if self.devices.contains_key(&id) {
            return;
        }

        let info = ControllerInfo {
            id,
            name: controller.name(),
            vendor_id: controller.vendor_id().unwrap_or(0),
            product_id: controller.product_id().unwrap_or(0),
            supports_rumble: controller.has_rumble(),
            supports_gyro: controller.has_sensor(SensorType::Gyroscope),
        };
        let device = Device {
            controller,
            pad: PadState::default(),
        };
        apply_gyro(&device.controller, self.inner.gyro_enabled.load(Ordering::Acquire));
        self.devices.insert(id, device);
        if let Ok(mut map) = self.inner.controllers_info.write() {
            map.insert(id, info.clone());
        }
        self.inner.broadcast(ControllerEvent::Connected(info));
    }

    fn remove_device(&mut self, id: ControllerId) {
        if self.devices.remove(&id).is_none() {
            return;
        }
        if let Ok(mut map) = self.inner.controllers_info.write() {
            map.remove(&id);
        }
        self.inner.broadcast(ControllerEvent::Disconnected(id));
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Rumble { low, high, ms } => {
                for device in self.devices.values_mut() {
                    if let Err(e) = device.controller.set_rumble(low, high, ms) {
                        padbind_engine::print_debug!("Failed to set rumble: {e}");
                    }
                }
            }
            Command::SyncGyro => {
                let enabled = self.inner.gyro_enabled.load(Ordering::Acquire);
                for device in self.devices.values() {
                    apply_gyro(&device.controller, enabled);
                }
            }
            Command::Shutdown => {}
        }
    }
}

fn apply_gyro(controller: &GameController, enabled: bool) {
    if !controller.has_sensor(SensorType::Gyroscope) {
        return;
    }
    if let Err(e) = controller.sensor_set_enabled(SensorType::Gyroscope, enabled) {
        padbind_engine::print_warning!("Cannot switch gyro of {}: {e}", controller.name());
    }
}

fn map_button(pad: &mut PadState, button: SdlButton, pressed: bool) -> Events {
    let dpad = match button {
        SdlButton::DPadUp => Some(DPad::Up),
        SdlButton::DPadDown => Some(DPad::Down),
        SdlButton::DPadLeft => Some(DPad::Left),
        SdlButton::DPadRight => Some(DPad::Right),
        _ => None,
    };
    if let Some(direction) = dpad {
        return pad.dpad(direction, pressed);
    }
    match map_sdl_button(button) {
        Some(button) => pad.button(button, pressed),
        None => Events::new(),
    }
}

fn map_sdl_button(button: SdlButton) -> Option<Button> {
    Some(match button {
        SdlButton::A => Button::A,
        SdlButton::B => Button::B,
        SdlButton::X => Button::X,
        SdlButton::Y => Button::Y,
        SdlButton::Back => Button::Back,
        SdlButton::Guide => Button::C,
        SdlButton::Start => Button::Start,
        SdlButton::LeftStick => Button::StickPress,
        SdlButton::RightStick => Button::RPad,
        SdlButton::Touchpad => Button::LPad,
        SdlButton::LeftShoulder => Button::LB,
        SdlButton::RightShoulder => Button::RB,
        SdlButton::Paddle1 => Button::RGrip,
        SdlButton::Paddle2 => Button::LGrip,
        _ => return None,
    })
}
