use crate::action::{Action, ActionRef, Context};
use crate::output::{HapticEffect, Output};
use crate::types::Source;

/// Plays a haptic pulse whenever the wrapped action is triggered or pressed.
#[derive(Debug)]
pub struct FeedbackModifier {
    child: ActionRef,
    effect: HapticEffect,
}

impl FeedbackModifier {
    pub fn new(child: ActionRef, effect: HapticEffect) -> Self {
        Self { child, effect }
    }
}

impl Action for FeedbackModifier {
    fn trigger(&self, ctx: &mut Context<'_>, position: u8, old_position: u8) {
        ctx.emit(Output::Haptic(self.effect));
        self.child.trigger(ctx, position, old_position);
    }

    fn button_press(&self, ctx: &mut Context<'_>) {
        ctx.emit(Output::Haptic(self.effect));
        self.child.button_press(ctx);
    }

    fn button_release(&self, ctx: &mut Context<'_>) {
        self.child.button_release(ctx);
    }

    fn whole(&self, ctx: &mut Context<'_>, x: i32, y: i32, source: Source) {
        self.child.whole(ctx, x, y, source);
    }

    fn gyro(&self, ctx: &mut Context<'_>, pitch: f64, yaw: f64, roll: f64) {
        self.child.gyro(ctx, pitch, yaw, roll);
    }

    fn tick(&self, ctx: &mut Context<'_>) {
        self.child.tick(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::HapticPosition;
    use crate::testing::{Call, Harness, Probe};

    #[test]
    fn pulses_once_per_trigger_and_forwards() {
        let mut h = Harness::new();
        let probe = Probe::new();
        let effect = HapticEffect {
            position: HapticPosition::Right,
            amplitude: 1024,
            frequency: 8,
            period: 2048,
            count: 1,
        };
        let action = FeedbackModifier::new(probe.clone(), effect);

        h.with(|ctx| action.trigger(ctx, 120, 0));

        assert_eq!(h.take(), vec![Output::Haptic(effect)]);
        assert_eq!(probe.calls(), vec![Call::Trigger(120, 0)]);
    }

    #[test]
    fn pulses_on_press_only() {
        let mut h = Harness::new();
        let probe = Probe::new();
        let action = FeedbackModifier::new(probe.clone(), HapticEffect::default());

        h.with(|ctx| {
            action.button_press(ctx);
            action.button_release(ctx);
        });

        assert_eq!(h.take(), vec![Output::Haptic(HapticEffect::default())]);
        assert_eq!(probe.calls(), vec![Call::Press, Call::Release]);
    }
}
