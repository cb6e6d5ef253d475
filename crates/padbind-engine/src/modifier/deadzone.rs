use crate::action::{Action, ActionRef, Context};
use crate::types::{Source, STICK_PAD_MAX, TRIGGER_MAX};

/// Deadzone policy on a magnitude: at or under `lower` becomes 0, at or
/// over `upper` saturates to `upper`, anything between is unchanged.
pub fn deadzone(magnitude: f64, lower: f64, upper: f64) -> f64 {
    if magnitude <= lower {
        0.0
    } else if magnitude >= upper {
        upper
    } else {
        magnitude
    }
}

#[derive(Debug)]
pub struct DeadzoneModifier {
    child: ActionRef,
    lower: f64,
    upper: f64,
}

impl DeadzoneModifier {
    pub fn new(child: ActionRef, lower: i32, upper: Option<i32>) -> Self {
        Self {
            child,
            lower: f64::from(lower),
            upper: f64::from(upper.unwrap_or(STICK_PAD_MAX)),
        }
    }

    fn apply_trigger(&self, position: u8) -> u8 {
        let upper = self.upper.min(f64::from(TRIGGER_MAX));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = deadzone(f64::from(position), self.lower, upper).round() as u8;
        value
    }
}

impl Action for DeadzoneModifier {
    fn trigger(&self, ctx: &mut Context<'_>, position: u8, old_position: u8) {
        let position = self.apply_trigger(position);
        let old_position = self.apply_trigger(old_position);
        self.child.trigger(ctx, position, old_position);
    }

    fn button_press(&self, ctx: &mut Context<'_>) {
        self.child.button_press(ctx);
    }

    fn button_release(&self, ctx: &mut Context<'_>) {
        self.child.button_release(ctx);
    }

    fn whole(&self, ctx: &mut Context<'_>, x: i32, y: i32, source: Source) {
        let (fx, fy) = (f64::from(x), f64::from(y));
        let magnitude = fx.hypot(fy);
        if magnitude == 0.0 {
            self.child.whole(ctx, x, y, source);
            return;
        }
        let scale = deadzone(magnitude, self.lower, self.upper) / magnitude;
        #[allow(clippy::cast_possible_truncation)]
        let (x, y) = ((fx * scale).round() as i32, (fy * scale).round() as i32);
        self.child.whole(ctx, x, y, source);
    }

    fn gyro(&self, ctx: &mut Context<'_>, pitch: f64, yaw: f64, roll: f64) {
        let apply = |value: f64| value.signum() * deadzone(value.abs(), self.lower, self.upper);
        self.child.gyro(ctx, apply(pitch), apply(yaw), apply(roll));
    }

    fn tick(&self, ctx: &mut Context<'_>) {
        self.child.tick(ctx);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{Call, Harness, Probe};

    #[test]
    fn policy_cuts_and_saturates() {
        assert_eq!(deadzone(310.0, 0.0, 300.0), 300.0);
        assert_eq!(deadzone(200.0, 0.0, 300.0), 200.0);
        assert_eq!(deadzone(30.0, 50.0, 300.0), 0.0);
        assert_eq!(deadzone(50.0, 50.0, 300.0), 0.0);
    }

    #[test]
    fn positions_keep_direction() {
        let mut h = Harness::new();
        let probe = Probe::new();
        let action = DeadzoneModifier::new(probe.clone(), 50, Some(300));

        h.with(|ctx| {
            action.whole(ctx, 310, 0, Source::Stick);
            action.whole(ctx, 0, -200, Source::Stick);
            action.whole(ctx, 30, 0, Source::Stick);
            action.whole(ctx, 600, 800, Source::Stick);
        });

        assert_eq!(
            probe.calls(),
            vec![
                Call::Whole(300, 0, Source::Stick),
                Call::Whole(0, -200, Source::Stick),
                Call::Whole(0, 0, Source::Stick),
                Call::Whole(180, 240, Source::Stick),
            ]
        );
    }

    #[test]
    fn triggers_are_capped_to_trigger_range() {
        let mut h = Harness::new();
        let probe = Probe::new();
        let child: ActionRef = probe.clone();
        let action = DeadzoneModifier::new(Arc::clone(&child), 20, Some(200));

        h.with(|ctx| action.trigger(ctx, 250, 10));

        assert_eq!(probe.calls(), vec![Call::Trigger(200, 0)]);
    }
}
