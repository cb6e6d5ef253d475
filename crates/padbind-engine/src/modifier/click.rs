use parking_lot::Mutex;

use crate::action::{Action, ActionRef, Context};
use crate::types::{Source, TRIGGER_CLICK};

/// Lets positional input through only while the pad or stick is clicked.
#[derive(Debug)]
pub struct ClickModifier {
    child: ActionRef,
    active: Mutex<bool>,
}

impl ClickModifier {
    pub fn new(child: ActionRef) -> Self {
        Self {
            child,
            active: Mutex::new(false),
        }
    }
}

impl Action for ClickModifier {
    fn trigger(&self, ctx: &mut Context<'_>, position: u8, old_position: u8) {
        if position >= TRIGGER_CLICK || old_position >= TRIGGER_CLICK {
            self.child.trigger(ctx, position, old_position);
        }
    }

    fn button_press(&self, ctx: &mut Context<'_>) {
        self.child.button_press(ctx);
    }

    fn button_release(&self, ctx: &mut Context<'_>) {
        self.child.button_release(ctx);
    }

    fn whole(&self, ctx: &mut Context<'_>, x: i32, y: i32, source: Source) {
        let Some(click) = source.click_button() else {
            self.child.whole(ctx, x, y, source);
            return;
        };
        let mut active = self.active.lock();
        if ctx.is_pressed(click) {
            *active = true;
            self.child.whole(ctx, x, y, source);
        } else if *active {
            *active = false;
            self.child.whole(ctx, 0, 0, source);
        }
    }

    fn gyro(&self, ctx: &mut Context<'_>, pitch: f64, yaw: f64, roll: f64) {
        self.child.gyro(ctx, pitch, yaw, roll);
    }

    fn tick(&self, ctx: &mut Context<'_>) {
        self.child.tick(ctx);
    }
}
