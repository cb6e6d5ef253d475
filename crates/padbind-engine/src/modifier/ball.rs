use std::time::Instant;

use parking_lot::Mutex;

use crate::action::{Action, ActionRef, Context};
use crate::types::Source;

pub const DEFAULT_FRICTION: f64 = 10.0;
/// Roll stops below this speed, pad units per second.
const MIN_SPEED: f64 = 500.0;
/// Weight of the newest sample in the velocity estimate.
const SMOOTHING: f64 = 0.5;

#[derive(Debug, Default)]
struct BallState {
    /// Virtual position handed to the child.
    position: (f64, f64),
    velocity: (f64, f64),
    /// Last finger sample.
    last: Option<((i32, i32), Instant)>,
    rolling: Option<(Source, Instant)>,
}

impl BallState {
    fn speed(&self) -> f64 {
        self.velocity.0.hypot(self.velocity.1)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn rounded(&self) -> (i32, i32) {
        (self.position.0.round() as i32, self.position.1.round() as i32)
    }
}

/// Makes a pad behave like a trackball: after the finger leaves, the
/// position keeps moving and slows down with friction.
#[derive(Debug)]
pub struct BallModifier {
    child: ActionRef,
    friction: f64,
    state: Mutex<BallState>,
}

impl BallModifier {
    pub fn new(child: ActionRef, friction: f64) -> Self {
        Self {
            child,
            friction,
            state: Mutex::new(BallState::default()),
        }
    }
}

impl Action for BallModifier {
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
        let mut state = self.state.lock();
        let now = ctx.now();

        if (x, y) == (0, 0) {
            state.last = None;
            if state.speed() >= MIN_SPEED {
                state.rolling = Some((source, now));
            } else {
                *state = BallState::default();
                self.child.whole(ctx, 0, 0, source);
            }
            return;
        }

        if state.rolling.take().is_some() {
            *state = BallState::default();
            self.child.whole(ctx, 0, 0, source);
        }

        match state.last {
            Some(((last_x, last_y), at)) => {
                let delta = (f64::from(x - last_x), f64::from(y - last_y));
                state.position.0 += delta.0;
                state.position.1 += delta.1;
                let dt = now.saturating_duration_since(at).as_secs_f64();
                if dt > 0.0 {
                    state.velocity.0 =
                        state.velocity.0 * (1.0 - SMOOTHING) + delta.0 / dt * SMOOTHING;
                    state.velocity.1 =
                        state.velocity.1 * (1.0 - SMOOTHING) + delta.1 / dt * SMOOTHING;
                }
            }
            None => {
                state.position = (f64::from(x), f64::from(y));
                state.velocity = (0.0, 0.0);
            }
        }
        state.last = Some(((x, y), now));
        let (x, y) = state.rounded();
        self.child.whole(ctx, x, y, source);
    }

    fn gyro(&self, ctx: &mut Context<'_>, pitch: f64, yaw: f64, roll: f64) {
        self.child.gyro(ctx, pitch, yaw, roll);
    }

    fn tick(&self, ctx: &mut Context<'_>) {
        {
            let mut state = self.state.lock();
            if let Some((source, at)) = state.rolling {
                let now = ctx.now();
                let dt = now.saturating_duration_since(at).as_secs_f64();
                state.position.0 += state.velocity.0 * dt;
                state.position.1 += state.velocity.1 * dt;
                let decay = (-self.friction * dt).exp();
                state.velocity.0 *= decay;
                state.velocity.1 *= decay;
                if state.speed() < MIN_SPEED {
                    *state = BallState::default();
                    self.child.whole(ctx, 0, 0, source);
                } else {
                    state.rolling = Some((source, now));
                    let (x, y) = state.rounded();
                    self.child.whole(ctx, x, y, source);
                }
            }
        }
        self.child.tick(ctx);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::{Call, Harness, Probe};

    fn wholes(calls: Vec<Call>) -> Vec<(i32, i32)> {
        calls
            .into_iter()
            .filter_map(|call| match call {
                Call::Whole(x, y, _) => Some((x, y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn follows_finger_while_touching() {
        let mut h = Harness::new();
        let probe = Probe::new();
        let action = BallModifier::new(probe.clone(), DEFAULT_FRICTION);

        h.with(|ctx| action.whole(ctx, 1000, 1000, Source::RightPad));
        h.advance(Duration::from_millis(10));
        h.with(|ctx| action.whole(ctx, 1100, 900, Source::RightPad));

        assert_eq!(wholes(probe.take()), vec![(1000, 1000), (1100, 900)]);
    }

    #[test]
    fn slow_lift_stops_at_once() {
        let mut h = Harness::new();
        let probe = Probe::new();
        let action = BallModifier::new(probe.clone(), DEFAULT_FRICTION);

        h.with(|ctx| action.whole(ctx, 1000, 1000, Source::RightPad));
        h.advance(Duration::from_secs(1));
        h.with(|ctx| {
            action.whole(ctx, 1001, 1000, Source::RightPad);
            action.whole(ctx, 0, 0, Source::RightPad);
        });

        assert_eq!(wholes(probe.take()), vec![(1000, 1000), (1001, 1000), (0, 0)]);
    }

    #[test]
    fn fast_lift_keeps_rolling_then_stops() {
        let mut h = Harness::new();
        let probe = Probe::new();
        let action = BallModifier::new(probe.clone(), DEFAULT_FRICTION);

        h.with(|ctx| action.whole(ctx, 0, 1000, Source::RightPad));
        h.advance(Duration::from_millis(10));
        h.with(|ctx| {
            action.whole(ctx, 1000, 1000, Source::RightPad);
            action.whole(ctx, 0, 0, Source::RightPad);
        });
        probe.take();

        h.advance(Duration::from_millis(10));
        h.with(|ctx| action.tick(ctx));
        let rolled = wholes(probe.take());
        assert_eq!(rolled.len(), 1);
        assert!(rolled[0].0 > 1000, "{rolled:?}");
        assert_eq!(rolled[0].1, 1000);

        for _ in 0..200 {
            h.advance(Duration::from_millis(10));
            h.with(|ctx| action.tick(ctx));
        }
        let rest = wholes(probe.take());
        assert_eq!(rest.last(), Some(&(0, 0)));
        let x: Vec<i32> = rest[..rest.len() - 1].iter().map(|(x, _)| *x).collect();
        assert!(x.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn new_touch_stops_roll() {
        let mut h = Harness::new();
        let probe = Probe::new();
        let action = BallModifier::new(probe.clone(), DEFAULT_FRICTION);

        h.with(|ctx| action.whole(ctx, 0, 1000, Source::LeftPad));
        h.advance(Duration::from_millis(10));
        h.with(|ctx| {
            action.whole(ctx, 1000, 1000, Source::LeftPad);
            action.whole(ctx, 0, 0, Source::LeftPad);
        });
        probe.take();

        h.advance(Duration::from_millis(5));
        h.with(|ctx| action.whole(ctx, -500, -500, Source::LeftPad));
        h.advance(Duration::from_millis(10));
        h.with(|ctx| action.tick(ctx));

        assert_eq!(wholes(probe.take()), vec![(0, 0), (-500, -500)]);
    }
}
