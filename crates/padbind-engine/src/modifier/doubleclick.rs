use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::action::{Action, ActionRef, Context};
use crate::types::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// First press seen, waiting for a second one.
    Waiting { deadline: Instant, held: bool },
    /// Alternate action pressed.
    Double,
    /// Normal action pressed, released on the release edge.
    NormalHeld,
    /// Normal action pressed, released on the next tick.
    PendingRelease,
}

/// Fires `double` on a fast press pair, `normal` otherwise.
#[derive(Debug)]
pub struct DoubleclickModifier {
    normal: ActionRef,
    double: ActionRef,
    timeout: Duration,
    phase: Mutex<Phase>,
}

impl DoubleclickModifier {
    pub fn new(normal: ActionRef, double: ActionRef, timeout: Duration) -> Self {
        Self {
            normal,
            double,
            timeout,
            phase: Mutex::new(Phase::Idle),
        }
    }

    fn click_normal(&self, ctx: &mut Context<'_>) {
        self.normal.button_press(ctx);
        self.normal.button_release(ctx);
    }
}

impl Action for DoubleclickModifier {
    fn trigger(&self, ctx: &mut Context<'_>, position: u8, old_position: u8) {
        self.normal.trigger(ctx, position, old_position);
    }

    fn button_press(&self, ctx: &mut Context<'_>) {
        let mut phase = self.phase.lock();
        let now = ctx.now();
        match *phase {
            Phase::Waiting { deadline, .. } if now < deadline => {
                *phase = Phase::Double;
                self.double.button_press(ctx);
                return;
            }
            Phase::Waiting { .. } => self.click_normal(ctx),
            Phase::PendingRelease => self.normal.button_release(ctx),
            Phase::Double | Phase::NormalHeld => return,
            Phase::Idle => {}
        }
        *phase = Phase::Waiting {
            deadline: now + self.timeout,
            held: true,
        };
    }

    fn button_release(&self, ctx: &mut Context<'_>) {
        let mut phase = self.phase.lock();
        match *phase {
            Phase::Waiting { deadline, .. } => {
                *phase = Phase::Waiting {
                    deadline,
                    held: false,
                };
            }
            Phase::Double => {
                *phase = Phase::Idle;
                self.double.button_release(ctx);
            }
            Phase::NormalHeld => {
                *phase = Phase::Idle;
                self.normal.button_release(ctx);
            }
            Phase::PendingRelease | Phase::Idle => {}
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
            match *phase {
                Phase::Waiting { deadline, held } if ctx.now() >= deadline => {
                    self.normal.button_press(ctx);
                    *phase = if held {
                        Phase::NormalHeld
                    } else {
                        Phase::PendingRelease
                    };
                }
                Phase::PendingRelease => {
                    *phase = Phase::Idle;
                    self.normal.button_release(ctx);
                }
                _ => {}
            }
        }
        self.normal.tick(ctx);
        self.double.tick(ctx);
    }
}
