use std::path::Path;

use codspeed_criterion_compat::{black_box, criterion_group, criterion_main, Criterion};
use padbind_profile::parse_profile;

fn bench_parse_profile(c: &mut Criterion) {
    // Use the sample profile from the repository root
    let yaml: &str = include_str!("../../../padbind_profile.yaml");
    let path = Path::new("padbind_profile.yaml");

    c.bench_function("profile_parse_padbind_profile", |b| {
        b.iter(|| {
            let input = black_box(yaml);
            let profile = parse_profile(input, path).expect("profile should parse");
            black_box(profile);
        })
    });
}

criterion_group!(benches, bench_parse_profile);
criterion_main!(benches);
