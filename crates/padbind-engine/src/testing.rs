//! Helpers shared by the unit tests.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::action::{Action, Context};
use crate::output::Output;
use crate::scheduler::Scheduler;
use crate::types::{Button, Buttons, Source};

/// Drives nodes directly, collecting what they emit.
pub struct Harness {
    pub now: Instant,
    pub buttons: Buttons,
    pub old_buttons: Buttons,
    pub scheduler: Scheduler,
    outputs: Vec<Output>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            now: Instant::now(),
            buttons: Buttons::empty(),
            old_buttons: Buttons::empty(),
            scheduler: Scheduler::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with<R>(&mut self, f: impl FnOnce(&mut Context<'_>) -> R) -> R {
        let outputs = &mut self.outputs;
        let mut sink = |output: Output| outputs.push(output);
        let mut ctx = Context::new(
            self.now,
            self.buttons,
            self.old_buttons,
            &mut sink,
            &mut self.scheduler,
        );
        f(&mut ctx)
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    pub fn press(&mut self, button: Button) {
        self.buttons.insert(button);
    }

    pub fn release(&mut self, button: Button) {
        self.buttons.remove(button);
    }

    /// Start a new poll frame: the current buttons become the previous ones.
    pub fn frame(&mut self) {
        self.old_buttons = self.buttons;
    }

    pub fn take(&mut self) -> Vec<Output> {
        std::mem::take(&mut self.outputs)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Trigger(u8, u8),
    Press,
    Release,
    Whole(i32, i32, Source),
    Gyro(f64, f64, f64),
}

/// Records every call it receives except ticks.
#[derive(Debug, Default)]
pub struct Probe {
    calls: Mutex<Vec<Call>>,
    ticks: Mutex<usize>,
}

impl Probe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock())
    }

    pub fn ticks(&self) -> usize {
        *self.ticks.lock()
    }
}

impl Action for Probe {
    fn trigger(&self, _ctx: &mut Context<'_>, position: u8, old_position: u8) {
        self.calls.lock().push(Call::Trigger(position, old_position));
    }

    fn button_press(&self, _ctx: &mut Context<'_>) {
        self.calls.lock().push(Call::Press);
    }

    fn button_release(&self, _ctx: &mut Context<'_>) {
        self.calls.lock().push(Call::Release);
    }

    fn whole(&self, _ctx: &mut Context<'_>, x: i32, y: i32, source: Source) {
        self.calls.lock().push(Call::Whole(x, y, source));
    }

    fn gyro(&self, _ctx: &mut Context<'_>, pitch: f64, yaw: f64, roll: f64) {
        self.calls.lock().push(Call::Gyro(pitch, yaw, roll));
    }

    fn tick(&self, _ctx: &mut Context<'_>) {
        *self.ticks.lock() += 1;
    }
}
