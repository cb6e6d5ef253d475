use std::sync::Arc;

use parking_lot::Mutex;

use crate::action::{Action, ActionRef, Context, NoAction};
use crate::types::{Button, Source};

#[derive(Debug, Default)]
struct ModeState {
    /// Child that received the last press, by index.
    pressed: Option<usize>,
    /// Child that received the last position.
    positional: Option<usize>,
    /// Child that received the last trigger value, with that value.
    trigger: Option<(usize, u8)>,
}

/// Picks a child by which mode button is held.
///
/// The first declared mode whose button is held wins; the default child is
/// used when none is.
#[derive(Debug)]
pub struct ModeModifier {
    modes: Vec<(Button, ActionRef)>,
    default: ActionRef,
    state: Mutex<ModeState>,
}

impl ModeModifier {
    pub fn new(modes: Vec<(Button, ActionRef)>, default: Option<ActionRef>) -> Self {
        Self {
            modes,
            default: default.unwrap_or_else(|| Arc::new(NoAction)),
            state: Mutex::new(ModeState::default()),
        }
    }

    /// Index of the selected child; `modes.len()` stands for the default.
    fn select(&self, ctx: &Context<'_>) -> usize {
        self.modes
            .iter()
            .position(|(button, _)| ctx.is_pressed(*button))
            .unwrap_or(self.modes.len())
    }

    fn child(&self, index: usize) -> &ActionRef {
        self.modes
            .get(index)
            .map_or(&self.default, |(_, action)| action)
    }
}

impl Action for ModeModifier {
    fn trigger(&self, ctx: &mut Context<'_>, position: u8, old_position: u8) {
        let selected = self.select(ctx);
        let mut state = self.state.lock();
        if let Some((previous, last)) = state.trigger {
            if previous != selected {
                self.child(previous).trigger(ctx, 0, last);
            }
        }
        state.trigger = Some((selected, position));
        self.child(selected).trigger(ctx, position, old_position);
    }

    fn button_press(&self, ctx: &mut Context<'_>) {
        let selected = self.select(ctx);
        self.state.lock().pressed = Some(selected);
        self.child(selected).button_press(ctx);
    }

    fn button_release(&self, ctx: &mut Context<'_>) {
        let pressed = self.state.lock().pressed.take();
        let index = pressed.unwrap_or_else(|| self.select(ctx));
        self.child(index).button_release(ctx);
    }

    fn whole(&self, ctx: &mut Context<'_>, x: i32, y: i32, source: Source) {
        let selected = self.select(ctx);
        let mut state = self.state.lock();
        if let Some(previous) = state.positional {
            if previous != selected {
                self.child(previous).whole(ctx, 0, 0, source);
            }
        }
        state.positional = Some(selected);
        self.child(selected).whole(ctx, x, y, source);
    }

    fn gyro(&self, ctx: &mut Context<'_>, pitch: f64, yaw: f64, roll: f64) {
        let selected = self.select(ctx);
        self.child(selected).gyro(ctx, pitch, yaw, roll);
    }

    fn tick(&self, ctx: &mut Context<'_>) {
        for (_, action) in &self.modes {
            action.tick(ctx);
        }
        self.default.tick(ctx);
    }
}
