use crate::action::{Action, ActionRef, Context};
use crate::types::Source;

/// Rotate a position by `degrees`, rounding each coordinate.
pub fn rotate(x: i32, y: i32, degrees: f64) -> (i32, i32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (fx, fy) = (f64::from(x), f64::from(y));
    #[allow(clippy::cast_possible_truncation)]
    let rotated = (
        (fx * cos - fy * sin).round() as i32,
        (fx * sin + fy * cos).round() as i32,
    );
    rotated
}

/// Rotates positional input around the center.
#[derive(Debug)]
pub struct RotateModifier {
    child: ActionRef,
    angle: f64,
}

impl RotateModifier {
    pub fn new(child: ActionRef, angle: f64) -> Self {
        Self { child, angle }
    }
}

impl Action for RotateModifier {
    fn trigger(&self, ctx: &mut Context<'_>, position: u8, old_position: u8) {
        self.child.trigger(ctx, position, old_position);
    }

    fn button_press(&self, ctx: &mut Context<'_>) {
        self.child.button_press(ctx);
    }

    fn button_release(&self, ctx: &mut Context<'_>) {
        self.child.button_release(ctx);
    }

    fn whole(&self, ctx: &mut Context<'_>, x: i32, y: i32, source: Source) {
        let (x, y) = rotate(x, y, self.angle);
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
    use crate::testing::{Call, Harness, Probe};

    #[test]
    fn matches_rotation_formula() {
        let angle: f64 = 33.14;
        let (sin, cos) = angle.to_radians().sin_cos();
        assert_eq!(
            rotate(1000, 0, angle),
            ((1000.0 * cos).round() as i32, (1000.0 * sin).round() as i32)
        );
        assert_eq!(rotate(1000, 0, angle), (837, 547));
        assert_eq!(rotate(0, 0, angle), (0, 0));
    }

    #[test]
    fn twice_rounds_twice() {
        let once = rotate(100, 30, 33.14);
        assert_eq!(once, (67, 80));
        // Each pass rounds, so two rotations drift from one double rotation.
        assert_eq!(rotate(once.0, once.1, 33.14), (12, 104));
        assert_eq!(rotate(100, 30, 66.28), (13, 104));
    }

    #[test]
    fn nested_modifiers_rotate_twice() {
        let mut h = Harness::new();
        let probe = Probe::new();
        let inner: ActionRef = std::sync::Arc::new(RotateModifier::new(probe.clone(), 33.14));
        let action = RotateModifier::new(inner, 33.14);

        h.with(|ctx| action.whole(ctx, 100, 30, Source::LeftPad));

        assert_eq!(probe.calls(), vec![Call::Whole(12, 104, Source::LeftPad)]);
    }
}
