use codspeed_criterion_compat::{black_box, criterion_group, criterion_main, Criterion};
use padbindd::protocol::{osd_line, parse_request, split_args};

fn bench_parse(c: &mut Criterion) {
    let lines = [
        "Lock: A B X Y LEFT RIGHT",
        "Observe: STICK LT RT",
        "Selected: main 'next profile'",
        "Profile: /home/user/.config/padbind/desktop.yaml",
        "Unlock.",
        "Hello?",
    ];
    c.bench_function("protocol_parse_requests", |b| {
        b.iter(|| {
            for line in lines {
                black_box(parse_request(black_box(line)));
            }
        })
    });
}

fn bench_osd(c: &mut Criterion) {
    let args = [
        "menu",
        "--confirm-with",
        "LPADTOUCH",
        "--cancel-with",
        "B",
        "--from-profile",
        "/home/user/.config/padbind/My Profile.yaml",
        "main",
    ];
    c.bench_function("protocol_osd_line", |b| {
        b.iter(|| black_box(osd_line(black_box(&args))))
    });
    let line = osd_line(&args);
    c.bench_function("protocol_split_args", |b| {
        b.iter(|| black_box(split_args(black_box(&line[5..]))))
    });
}

criterion_group!(benches, bench_parse, bench_osd);
criterion_main!(benches);
