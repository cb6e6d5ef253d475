use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::action::{Action, ActionRef, Context};
use crate::types::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Waiting { deadline: Instant },
    Holding,
}

/// Fires `hold` when the button stays down past the timeout, `normal` on a
/// shorter press.
#[derive(Debug)]
pub struct HoldModifier {
    normal: ActionRef,
    hold: ActionRef,
    timeout: Duration,
    phase: Mutex<Phase>,
}

impl HoldModifier {
    pub fn new(normal: ActionRef, hold: ActionRef, timeout: Duration) -> Self {
        Self {
            normal,
            hold,
            timeout,
            phase: Mutex::new(Phase::Idle),
        }
    }
}

impl Action for HoldModifier {
    fn trigger(&self, ctx: &mut Context<'_>, position: u8, old_position: u8) {
        self.normal.trigger(ctx, position, old_position);
    }

    fn button_press(&self, ctx: &mut Context<'_>) {
        let mut phase = self.phase.lock();
        if *phase == Phase::Idle {
            *phase = Phase::Waiting {
                deadline: ctx.now() + self.timeout,
            };
        }
    }

    fn button_release(&self, ctx: &mut Context<'_>) {
        let mut phase = self.phase.lock();
        let previous = std::mem::replace(&mut *phase, Phase::Idle);
        match previous {
            Phase::Waiting { deadline } if ctx.now() < deadline => {
                self.normal.button_press(ctx);
                self.normal.button_release(ctx);
            }
            // Deadline passed between two ticks.
            Phase::Waiting { .. } => {
                self.hold.button_press(ctx);
                self.hold.button_release(ctx);
            }
            Phase::Holding => self.hold.button_release(ctx),
            Phase::Idle => {}
        }
    }

    fn whole(&self, ctx: &mut Context<'_>, x: i32, y: i32, source: Source) {
        self.normal.whole(ctx, x, y, source);
    }

    fn gyro(&self, ctx: &mut Context<'_>, pitch: f64, yaw: f64, roll: f64) {
        self.normal.gyro(ctx, pitch, yaw, roll);
    }

    fn tick(&self, ctx: &mut Context<'_>) {
        {
            let mut phase = self.phase.lock();
            if let Phase::Waiting { deadline } = *phase {
                if ctx.now() >= deadline {
                    *phase = Phase::Holding;
                    self.hold.button_press(ctx);
                }
            }
        }
        self.normal.tick(ctx);
        self.hold.tick(ctx);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::modifier::{DoubleclickModifier, DEFAULT_TIMEOUT};
    use crate::testing::{Call, Harness, Probe};

    #[test]
    fn short_press_fires_normal() {
        let mut h = Harness::new();
        let (normal, hold) = (Probe::new(), Probe::new());
        let action = HoldModifier::new(normal.clone(), hold.clone(), DEFAULT_TIMEOUT);

        h.with(|ctx| action.button_press(ctx));
        h.advance(Duration::from_millis(100));
        h.with(|ctx| {
            action.tick(ctx);
            action.button_release(ctx);
        });

        assert_eq!(normal.calls(), vec![Call::Press, Call::Release]);
        assert!(hold.calls().is_empty());
    }

    #[test]
    fn long_press_fires_hold_until_release() {
        let mut h = Harness::new();
        let (normal, hold) = (Probe::new(), Probe::new());
        let action = HoldModifier::new(normal.clone(), hold.clone(), DEFAULT_TIMEOUT);

        h.with(|ctx| action.button_press(ctx));
        h.advance(Duration::from_millis(250));
        h.with(|ctx| action.tick(ctx));
        assert_eq!(hold.take(), vec![Call::Press]);

        h.advance(Duration::from_secs(1));
        h.with(|ctx| {
            action.tick(ctx);
            action.button_release(ctx);
        });
        assert_eq!(hold.take(), vec![Call::Release]);
        assert!(normal.calls().is_empty());
    }

    #[test]
    fn wraps_doubleclick() {
        let mut h = Harness::new();
        let (normal, double, hold) = (Probe::new(), Probe::new(), Probe::new());
        let inner: ActionRef = Arc::new(DoubleclickModifier::new(
            normal.clone(),
            double.clone(),
            DEFAULT_TIMEOUT,
        ));
        let action = HoldModifier::new(inner, hold.clone(), DEFAULT_TIMEOUT);

        for _ in 0..2 {
            h.with(|ctx| action.button_press(ctx));
            h.advance(Duration::from_millis(30));
            h.with(|ctx| {
                action.tick(ctx);
                action.button_release(ctx);
            });
            h.advance(Duration::from_millis(30));
        }
        h.advance(Duration::from_millis(500));
        h.with(|ctx| action.tick(ctx));

        assert_eq!(double.calls(), vec![Call::Press, Call::Release]);
        assert!(normal.calls().is_empty());
        assert!(hold.calls().is_empty());
    }
}
