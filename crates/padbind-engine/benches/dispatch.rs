use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use codspeed_criterion_compat::{black_box, criterion_group, criterion_main, Criterion};
use padbind_control::Axis;
use padbind_engine::action::{AxesAction, ButtonAction, MouseAction, MouseMode, Target};
use padbind_engine::modifier::{DeadzoneModifier, DoubleclickModifier, SensitivityModifier, DEFAULT_TIMEOUT};
use padbind_engine::{
    ActionRef, Button, DeviceControl, Dispatcher, LoadError, Output, PadEvent, Profile,
    ProfileLoader, Runtime, Source,
};

struct NoDevice;

impl DeviceControl for NoDevice {
    fn set_gyro_enabled(&self, _enabled: bool) {}
}

struct NoLoader;

impl ProfileLoader for NoLoader {
    fn load(&self, path: &Path) -> Result<Profile, LoadError> {
        Err(format!("{} is not available in benches", path.display()).into())
    }
}

fn bench_profile() -> Profile {
    let jump: ActionRef = Arc::new(ButtonAction::new(Target::Keys("space".parse().unwrap())));
    let dash: ActionRef = Arc::new(ButtonAction::new(Target::Keys("shift+w".parse().unwrap())));
    let pointer: ActionRef = Arc::new(SensitivityModifier::new(
        Arc::new(MouseAction::new(MouseMode::Pointer)),
        &[1.5, 1.5],
    ));
    let stick: ActionRef = Arc::new(DeadzoneModifier::new(
        Arc::new(AxesAction::new(Axis::X, Axis::Y)),
        2000,
        None,
    ));
    Profile::builder("bench.yaml")
        .bind(Source::A, Arc::new(DoubleclickModifier::new(jump, dash, DEFAULT_TIMEOUT)))
        .bind(Source::RightPad, pointer)
        .bind(Source::Stick, stick)
        .build()
}

fn dispatcher() -> Dispatcher {
    let runtime = Runtime::new(bench_profile(), Arc::new(NoDevice), Box::new(NoLoader));
    Dispatcher::new(Arc::new(runtime))
}

pub fn bench_button_path(c: &mut Criterion) {
    let mut d = dispatcher();
    let mut now = Instant::now();

    c.bench_function("dispatch_button_press_release", |b| {
        b.iter(|| {
            let mut count = 0usize;
            let mut sink = |output: Output| {
                count += 1;
                black_box(output);
            };
            for pressed in [true, false] {
                d.handle(
                    PadEvent::Button { button: Button::A, pressed },
                    now,
                    &mut sink,
                );
            }
            now += Duration::from_millis(300);
            d.tick(now, &mut sink);
            now += Duration::from_millis(10);
            d.tick(now, &mut sink);
            black_box(count);
        })
    });
}

pub fn bench_position_path(c: &mut Criterion) {
    let mut d = dispatcher();
    let now = Instant::now();

    c.bench_function("dispatch_pad_and_stick_positions", |b| {
        b.iter(|| {
            let mut count = 0usize;
            let mut sink = |output: Output| {
                count += 1;
                black_box(output);
            };
            for step in 0..32 {
                let x = step * 1000 - 16000;
                d.handle(
                    PadEvent::Position { source: Source::RightPad, x, y: -x },
                    now,
                    &mut sink,
                );
                d.handle(
                    PadEvent::Position { source: Source::Stick, x, y: x / 2 },
                    now,
                    &mut sink,
                );
            }
            d.handle(
                PadEvent::Position { source: Source::RightPad, x: 0, y: 0 },
                now,
                &mut sink,
            );
            black_box(count);
        })
    });
}

criterion_group!(benches, bench_button_path, bench_position_path);
criterion_main!(benches);
