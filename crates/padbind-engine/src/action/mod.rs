//! Action nodes: the polymorphic units bound to sources.
//!
//! A node is either a leaf that emits [`Output`]s or a decorator that owns
//! child nodes and forwards a transformed or gated version of each call.
//! Nodes are shared as [`ActionRef`] and keep their private state behind
//! `parking_lot` locks, so they can be swapped between threads while the
//! poller is the only one calling into them.

mod leaf;
mod special;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use leaf::{AxesAction, AxisAction, ButtonAction, GyroAxesAction, MouseAction, MouseMode, NoAction, Target};
pub use special::{
    ChangeProfileAction, KeyboardAction, MenuAction, OsdAction, ShellAction, TurnOffAction,
    DEFAULT_MENU_POSITION, DEFAULT_OSD_TIMEOUT,
};

use crate::intercept::Interceptor;
use crate::output::Output;
use crate::scheduler::{Scheduler, Task};
use crate::types::{Button, Buttons, Source};

pub type ActionRef = Arc<dyn Action>;

/// Capability set of an action node. Every method defaults to doing nothing.
pub trait Action: Send + Sync + fmt::Debug {
    /// Continuous value changed from `old_position` to `position`.
    fn trigger(&self, _ctx: &mut Context<'_>, _position: u8, _old_position: u8) {}

    fn button_press(&self, _ctx: &mut Context<'_>) {}

    fn button_release(&self, _ctx: &mut Context<'_>) {}

    /// 2-D position of a pad or the stick. `(0, 0)` on a pad means the
    /// finger was lifted.
    fn whole(&self, _ctx: &mut Context<'_>, _x: i32, _y: i32, _source: Source) {}

    /// Angular velocity sample, degrees per second.
    fn gyro(&self, _ctx: &mut Context<'_>, _pitch: f64, _yaw: f64, _roll: f64) {}

    /// Called once per poll tick.
    fn tick(&self, _ctx: &mut Context<'_>) {}

    fn is_noop(&self) -> bool {
        false
    }

    fn as_interceptor(&self) -> Option<&Interceptor> {
        None
    }
}

/// Per-call environment handed to every node.
pub struct Context<'a> {
    now: Instant,
    buttons: Buttons,
    old_buttons: Buttons,
    sink: &'a mut dyn FnMut(Output),
    scheduler: &'a mut Scheduler,
}

impl<'a> Context<'a> {
    pub fn new(
        now: Instant,
        buttons: Buttons,
        old_buttons: Buttons,
        sink: &'a mut dyn FnMut(Output),
        scheduler: &'a mut Scheduler,
    ) -> Self {
        Self {
            now,
            buttons,
            old_buttons,
            sink,
            scheduler,
        }
    }

    #[inline]
    pub fn now(&self) -> Instant {
        self.now
    }

    #[inline]
    pub fn buttons(&self) -> Buttons {
        self.buttons
    }

    #[inline]
    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons.contains(button)
    }

    /// Whether the button was held at the previous poll tick.
    #[inline]
    pub fn was_pressed(&self, button: Button) -> bool {
        self.old_buttons.contains(button)
    }

    #[inline]
    pub fn emit(&mut self, output: Output) {
        (self.sink)(output);
    }

    pub fn schedule(&mut self, delay: Duration, task: Task) {
        self.scheduler.schedule(self.now + delay, task);
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("now", &self.now)
            .field("buttons", &self.buttons)
            .field("old_buttons", &self.old_buttons)
            .finish_non_exhaustive()
    }
}
