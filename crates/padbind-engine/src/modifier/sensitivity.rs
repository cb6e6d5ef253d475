use crate::action::{Action, ActionRef, Context};
use crate::types::{Source, TRIGGER_MAX, TRIGGER_MIN};

/// Scales input by one factor per dimension.
#[derive(Debug)]
pub struct SensitivityModifier {
    child: ActionRef,
    factors: [f64; 3],
}

impl SensitivityModifier {
    /// Missing factors default to 1.0, extra ones are ignored.
    pub fn new(child: ActionRef, factors: &[f64]) -> Self {
        let mut all = [1.0; 3];
        for (slot, factor) in all.iter_mut().zip(factors) {
            *slot = *factor;
        }
        Self {
            child,
            factors: all,
        }
    }

    fn scale_trigger(&self, position: u8) -> u8 {
        let scaled = (f64::from(position) * self.factors[0])
            .round()
            .clamp(f64::from(TRIGGER_MIN), f64::from(TRIGGER_MAX));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scaled = scaled as u8;
        scaled
    }
}

impl Action for SensitivityModifier {
    fn trigger(&self, ctx: &mut Context<'_>, position: u8, old_position: u8) {
        let position = self.scale_trigger(position);
        let old_position = self.scale_trigger(old_position);
        self.child.trigger(ctx, position, old_position);
    }

    fn button_press(&self, ctx: &mut Context<'_>) {
        self.child.button_press(ctx);
    }

    fn button_release(&self, ctx: &mut Context<'_>) {
        self.child.button_release(ctx);
    }

    fn whole(&self, ctx: &mut Context<'_>, x: i32, y: i32, source: Source) {
        #[allow(clippy::cast_possible_truncation)]
        let (x, y) = (
            (f64::from(x) * self.factors[0]).round() as i32,
            (f64::from(y) * self.factors[1]).round() as i32,
        );
        self.child.whole(ctx, x, y, source);
    }

    fn gyro(&self, ctx: &mut Context<'_>, pitch: f64, yaw: f64, roll: f64) {
        let [p, y, r] = self.factors;
        self.child.gyro(ctx, pitch * p, yaw * y, roll * r);
    }

    fn tick(&self, ctx: &mut Context<'_>) {
        self.child.tick(ctx);
    }
}
