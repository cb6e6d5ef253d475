use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use colored::Colorize;
use padbind_control::{KeyCombo, MouseButton};

use crate::action::Context;
use crate::output::Output;
use crate::profile::Menu;
use crate::runtime::Runtime;
use crate::scheduler::{Scheduler, Task, RELEASE_DELAY};
use crate::types::{Buttons, PadEvent, Source};

/// Virtual keys and mouse buttons currently held down.
#[derive(Debug, Default)]
struct Held {
    keys: Vec<KeyCombo>,
    mouse: Vec<MouseButton>,
}

impl Held {
    fn track(&mut self, output: &Output) {
        match output {
            Output::KeyPress(combo) => self.keys.push(combo.clone()),
            Output::KeyRelease(combo) => {
                if let Some(index) = self.keys.iter().position(|held| held == combo) {
                    self.keys.remove(index);
                }
            }
            Output::MousePress(button) => self.mouse.push(*button),
            Output::MouseRelease(button) => {
                if let Some(index) = self.mouse.iter().position(|held| held == button) {
                    self.mouse.remove(index);
                }
            }
            _ => {}
        }
    }
}

/// Routes device events to the bound actions. Lives on the poll thread.
pub struct Dispatcher {
    runtime: Arc<Runtime>,
    scheduler: Scheduler,
    buttons: Buttons,
    /// Buttons as they were at the previous tick.
    old_buttons: Buttons,
    triggers: [u8; 2],
    held: Held,
}

impl Dispatcher {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self {
            runtime,
            scheduler: Scheduler::new(),
            buttons: Buttons::empty(),
            old_buttons: Buttons::empty(),
            triggers: [0; 2],
            held: Held::default(),
        }
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    pub fn buttons(&self) -> Buttons {
        self.buttons
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Earliest scheduled task, for sizing the poll timeout.
    pub fn next_due(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    pub fn handle(&mut self, event: PadEvent, now: Instant, sink: &mut dyn FnMut(Output)) {
        match event {
            PadEvent::Button { button, pressed } => {
                let changed = if pressed {
                    self.buttons.insert(button)
                } else {
                    self.buttons.remove(button)
                };
                let Some(source) = button.source().filter(|_| changed) else {
                    return;
                };
                let node = self.runtime.resolve(source);
                if pressed {
                    self.call(now, source.name(), sink, |ctx| node.button_press(ctx));
                } else {
                    self.call(now, source.name(), sink, |ctx| node.button_release(ctx));
                }
            }
            PadEvent::Trigger { source, value } => {
                let slot = match source {
                    Source::LeftTrigger => 0,
                    Source::RightTrigger => 1,
                    _ => return,
                };
                let old = std::mem::replace(&mut self.triggers[slot], value);
                if old == value {
                    return;
                }
                let node = self.runtime.resolve(source);
                self.call(now, source.name(), sink, |ctx| node.trigger(ctx, value, old));
            }
            PadEvent::Position { source, x, y } => {
                let node = self.runtime.resolve(source);
                self.call(now, source.name(), sink, |ctx| node.whole(ctx, x, y, source));
            }
            PadEvent::Gyro { pitch, yaw, roll } => {
                let profile = self.runtime.profile();
                let node = profile.gyro();
                self.call(now, "gyro", sink, |ctx| node.gyro(ctx, pitch, yaw, roll));
            }
        }
    }

    /// One poll tick: move queued requests into the scheduler, fire due
    /// tasks, then tick every bound action and every menu item action.
    pub fn tick(&mut self, now: Instant, sink: &mut dyn FnMut(Output)) {
        for task in self.runtime.take_inbox() {
            self.scheduler.schedule(now, task);
        }
        for task in self.scheduler.take_due(now) {
            self.fire(task, now, sink);
        }

        let profile = self.runtime.profile();
        for (source, node) in profile.roots() {
            if !node.is_noop() {
                self.call(now, source.name(), sink, |ctx| node.tick(ctx));
            }
        }
        let gyro = profile.gyro();
        self.call(now, "gyro", sink, |ctx| gyro.tick(ctx));

        for menu in profile.menus() {
            self.tick_menu(now, menu, sink);
        }
        for menu in self.runtime.file_menus() {
            self.tick_menu(now, &menu, sink);
        }

        self.old_buttons = self.buttons;
    }

    fn tick_menu(&mut self, now: Instant, menu: &Menu, sink: &mut dyn FnMut(Output)) {
        for item in &menu.items {
            if !item.action.is_noop() {
                self.call(now, &menu.id, sink, |ctx| item.action.tick(ctx));
            }
        }
    }

    /// Release every virtual key and mouse button still held.
    pub fn release_virtual_buttons(&mut self, sink: &mut dyn FnMut(Output)) {
        for combo in self.held.keys.drain(..).rev() {
            sink(Output::KeyRelease(combo));
        }
        for button in self.held.mouse.drain(..).rev() {
            sink(Output::MouseRelease(button));
        }
    }

    fn fire(&mut self, task: Task, now: Instant, sink: &mut dyn FnMut(Output)) {
        match task {
            Task::Click(source) => {
                let node = self.runtime.resolve(source);
                self.call(now, source.name(), sink, |ctx| {
                    node.button_press(ctx);
                    ctx.schedule(RELEASE_DELAY, Task::Release(source));
                });
            }
            Task::Release(source) => {
                let node = self.runtime.resolve(source);
                self.call(now, source.name(), sink, |ctx| node.button_release(ctx));
            }
            Task::MenuPress { menu, item } => {
                let Some(node) = self.runtime.menu_item_action(&menu, &item) else {
                    crate::print_warning!("menu item {menu}/{item} vanished before it was pressed");
                    return;
                };
                self.call(now, &menu, sink, |ctx| {
                    node.button_press(ctx);
                    ctx.schedule(
                        RELEASE_DELAY,
                        Task::MenuRelease {
                            menu: menu.clone(),
                            item: item.clone(),
                        },
                    );
                });
            }
            Task::MenuRelease { menu, item } => {
                let Some(node) = self.runtime.menu_item_action(&menu, &item) else {
                    crate::print_warning!("menu item {menu}/{item} vanished before it was released");
                    return;
                };
                self.call(now, &menu, sink, |ctx| node.button_release(ctx));
            }
            Task::ResetPad(source) => {
                if let Some(touch) = source.touch_button() {
                    self.buttons.remove(touch);
                }
                let node = self.runtime.resolve(source);
                self.call(now, source.name(), sink, |ctx| node.whole(ctx, 0, 0, source));
            }
        }
    }

    /// Run one action call. A panicking action is logged and the event is
    /// dropped.
    fn call(
        &mut self,
        now: Instant,
        label: &str,
        sink: &mut dyn FnMut(Output),
        f: impl FnOnce(&mut Context<'_>),
    ) {
        let held = &mut self.held;
        let mut track = |output: Output| {
            held.track(&output);
            sink(output);
        };
        let mut ctx = Context::new(
            now,
            self.buttons,
            self.old_buttons,
            &mut track,
            &mut self.scheduler,
        );
        if panic::catch_unwind(AssertUnwindSafe(|| f(&mut ctx))).is_err() {
            crate::print_error!("action bound to {label} panicked, event dropped");
        }
    }
}
