use std::time::{Duration, Instant};

use padbind_control::{Axis, KeyCombo, MouseButton};
use parking_lot::Mutex;

use super::{Action, Context};
use crate::output::Output;
use crate::types::{Source, STICK_PAD_MAX, STICK_PAD_MIN, TRIGGER_HALF, TRIGGER_MAX, TRIGGER_MIN};

/// Pointer pixels per pad unit.
pub const POINTER_SPEED: f64 = 0.02;
/// Wheel clicks per pad unit.
pub const WHEEL_SPEED: f64 = 0.0005;
/// Pointer pixels per second at full stick deflection.
const STICK_POINTER_SPEED: f64 = 900.0;
/// Pointer pixels per degree of rotation.
const GYRO_PIXELS_PER_DEGREE: f64 = 15.0;
/// Angular velocity mapped to full axis deflection, degrees per second.
const GYRO_FULL_DEFLECTION: f64 = 180.0;
/// Gaps longer than this between two samples are treated as a restart.
const MAX_SAMPLE_GAP: Duration = Duration::from_millis(100);

/// Bound to sources that should do nothing.
#[derive(Debug, Default)]
pub struct NoAction;

impl Action for NoAction {
    fn is_noop(&self) -> bool {
        true
    }
}

/// What a [`ButtonAction`] presses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Keys(KeyCombo),
    Mouse(MouseButton),
}

/// Presses a key combo or a mouse button.
#[derive(Debug)]
pub struct ButtonAction {
    target: Target,
    threshold: u8,
    held: Mutex<bool>,
}

impl ButtonAction {
    pub fn new(target: Target) -> Self {
        Self::with_threshold(target, TRIGGER_HALF)
    }

    /// Trigger position at which the target gets pressed.
    pub fn with_threshold(target: Target, threshold: u8) -> Self {
        Self {
            target,
            threshold,
            held: Mutex::new(false),
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    fn press(&self, ctx: &mut Context<'_>) {
        let mut held = self.held.lock();
        if *held {
            return;
        }
        *held = true;
        ctx.emit(match &self.target {
            Target::Keys(combo) => Output::KeyPress(combo.clone()),
            Target::Mouse(button) => Output::MousePress(*button),
        });
    }

    fn release(&self, ctx: &mut Context<'_>) {
        let mut held = self.held.lock();
        if !*held {
            return;
        }
        *held = false;
        ctx.emit(match &self.target {
            Target::Keys(combo) => Output::KeyRelease(combo.clone()),
            Target::Mouse(button) => Output::MouseRelease(*button),
        });
    }
}

impl Action for ButtonAction {
    fn trigger(&self, ctx: &mut Context<'_>, position: u8, old_position: u8) {
        if position >= self.threshold && old_position < self.threshold {
            self.press(ctx);
        } else if position < self.threshold && old_position >= self.threshold {
            self.release(ctx);
        }
    }

    fn button_press(&self, ctx: &mut Context<'_>) {
        self.press(ctx);
    }

    fn button_release(&self, ctx: &mut Context<'_>) {
        self.release(ctx);
    }
}

/// Drives one axis of the virtual gamepad.
#[derive(Debug)]
pub struct AxisAction {
    axis: Axis,
}

impl AxisAction {
    pub fn new(axis: Axis) -> Self {
        Self { axis }
    }

    fn rest(&self) -> i32 {
        let (min, _) = self.axis.range();
        min.max(0)
    }
}

impl Action for AxisAction {
    fn trigger(&self, ctx: &mut Context<'_>, position: u8, _old_position: u8) {
        let value = self
            .axis
            .map(i32::from(position), i32::from(TRIGGER_MIN), i32::from(TRIGGER_MAX));
        ctx.emit(Output::Axis {
            axis: self.axis,
            value,
        });
    }

    fn button_press(&self, ctx: &mut Context<'_>) {
        let (_, max) = self.axis.range();
        ctx.emit(Output::Axis {
            axis: self.axis,
            value: max,
        });
    }

    fn button_release(&self, ctx: &mut Context<'_>) {
        ctx.emit(Output::Axis {
            axis: self.axis,
            value: self.rest(),
        });
    }

    fn whole(&self, ctx: &mut Context<'_>, x: i32, _y: i32, _source: Source) {
        ctx.emit(Output::Axis {
            axis: self.axis,
            value: self.axis.map(x, STICK_PAD_MIN, STICK_PAD_MAX),
        });
    }
}

/// Drives a pair of axes from a 2-D position.
#[derive(Debug)]
pub struct AxesAction {
    x: AxisAction,
    y: AxisAction,
}

impl AxesAction {
    pub fn new(x: Axis, y: Axis) -> Self {
        Self {
            x: AxisAction::new(x),
            y: AxisAction::new(y),
        }
    }
}

impl Action for AxesAction {
    fn whole(&self, ctx: &mut Context<'_>, x: i32, y: i32, source: Source) {
        self.x.whole(ctx, x, 0, source);
        self.y.whole(ctx, y, 0, source);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseMode {
    Pointer,
    Wheel,
}

#[derive(Debug, Default)]
struct MouseState {
    /// Last pad position of the current stroke.
    last: Option<(i32, i32)>,
    residue: (f64, f64),
    /// Current stick deflection.
    stick: (i32, i32),
    last_tick: Option<Instant>,
    last_gyro: Option<Instant>,
}

/// Relative pointer or wheel motion.
///
/// Pads move the pointer by the finger's deltas. The stick moves it
/// continuously, proportionally to the deflection. Gyro samples turn yaw and
/// pitch into motion.
#[derive(Debug)]
pub struct MouseAction {
    mode: MouseMode,
    speed: (f64, f64),
    state: Mutex<MouseState>,
}

impl MouseAction {
    pub fn new(mode: MouseMode) -> Self {
        let speed = match mode {
            MouseMode::Pointer => POINTER_SPEED,
            MouseMode::Wheel => WHEEL_SPEED,
        };
        Self::with_speed(mode, speed, speed)
    }

    pub fn with_speed(mode: MouseMode, x: f64, y: f64) -> Self {
        Self {
            mode,
            speed: (x, y),
            state: Mutex::new(MouseState::default()),
        }
    }

    /// Accumulate a fractional motion and emit its whole part.
    fn add(&self, ctx: &mut Context<'_>, state: &mut MouseState, dx: f64, dy: f64) {
        state.residue.0 += dx;
        state.residue.1 += dy;
        let whole_x = state.residue.0.trunc();
        let whole_y = state.residue.1.trunc();
        state.residue.0 -= whole_x;
        state.residue.1 -= whole_y;

        #[allow(clippy::cast_possible_truncation)]
        let (dx, dy) = (whole_x as i32, whole_y as i32);
        if dx == 0 && dy == 0 {
            return;
        }
        match self.mode {
            MouseMode::Pointer => ctx.emit(Output::MouseMove { dx, dy }),
            MouseMode::Wheel => ctx.emit(Output::Scroll { h: dx, v: -dy }),
        }
    }
}

impl Action for MouseAction {
    fn whole(&self, ctx: &mut Context<'_>, x: i32, y: i32, source: Source) {
        let mut state = self.state.lock();
        if source == Source::Stick {
            state.stick = (x, y);
            return;
        }
        if (x, y) == (0, 0) {
            state.last = None;
            state.residue = (0.0, 0.0);
            return;
        }
        if let Some((last_x, last_y)) = state.last {
            let dx = f64::from(x - last_x) * self.speed.0;
            let dy = -f64::from(y - last_y) * self.speed.1;
            self.add(ctx, &mut state, dx, dy);
        }
        state.last = Some((x, y));
    }

    fn gyro(&self, ctx: &mut Context<'_>, pitch: f64, yaw: f64, _roll: f64) {
        let mut state = self.state.lock();
        let now = ctx.now();
        let previous = state.last_gyro.replace(now);
        let Some(dt) = previous.map(|previous| now.saturating_duration_since(previous)) else {
            return;
        };
        if dt > MAX_SAMPLE_GAP {
            return;
        }
        let dt = dt.as_secs_f64();
        let scale = GYRO_PIXELS_PER_DEGREE / POINTER_SPEED;
        let dx = -yaw * dt * self.speed.0 * scale;
        let dy = -pitch * dt * self.speed.1 * scale;
        self.add(ctx, &mut state, dx, dy);
    }

    fn tick(&self, ctx: &mut Context<'_>) {
        let mut state = self.state.lock();
        let now = ctx.now();
        let previous = state.last_tick.replace(now);
        if state.stick == (0, 0) {
            return;
        }
        let Some(dt) = previous.map(|previous| now.saturating_duration_since(previous)) else {
            return;
        };
        let step = STICK_POINTER_SPEED * dt.min(MAX_SAMPLE_GAP).as_secs_f64();
        let full = f64::from(STICK_PAD_MAX);
        let dx = f64::from(state.stick.0) / full * step * (self.speed.0 / POINTER_SPEED);
        let dy = -f64::from(state.stick.1) / full * step * (self.speed.1 / POINTER_SPEED);
        self.add(ctx, &mut state, dx, dy);
    }
}

/// Maps gyro components onto gamepad axes. Components without an axis are
/// ignored.
#[derive(Debug)]
pub struct GyroAxesAction {
    axes: [Option<Axis>; 3],
}

impl GyroAxesAction {
    pub fn new(pitch: Option<Axis>, yaw: Option<Axis>, roll: Option<Axis>) -> Self {
        Self {
            axes: [pitch, yaw, roll],
        }
    }
}

impl Action for GyroAxesAction {
    fn gyro(&self, ctx: &mut Context<'_>, pitch: f64, yaw: f64, roll: f64) {
        for (axis, component) in self.axes.iter().zip([pitch, yaw, roll]) {
            let Some(axis) = axis else { continue };
            let deflection = (component / GYRO_FULL_DEFLECTION * f64::from(STICK_PAD_MAX))
                .clamp(f64::from(STICK_PAD_MIN), f64::from(STICK_PAD_MAX));
            #[allow(clippy::cast_possible_truncation)]
            let deflection = deflection.round() as i32;
            ctx.emit(Output::Axis {
                axis: *axis,
                value: axis.map(deflection, STICK_PAD_MIN, STICK_PAD_MAX),
            });
        }
    }
}
