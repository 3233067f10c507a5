//! Sky tick benchmarks
//!
//! Run with: `cargo bench`

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skyscape::config::{Interval, SkyConfig};
use skyscape::render::SpriteFrame;
use skyscape::{Sky, Viewport};

const TICK: Duration = Duration::from_micros(16_667);

/// A sky that has been running long enough to be fully populated
fn busy_sky(pool_capacity: usize) -> Sky {
    let mut config = SkyConfig::default();
    config.seed = Some(7);
    config.birds.single_bird = false;
    config.birds.initial_delay = 0.1;
    config.birds.spawn_delay = 0.2;
    config.clouds.pool_capacity = pool_capacity;
    config.clouds.spawn_interval = Interval::Fixed(0.05);
    config.stars.spawn_interval = Interval::Fixed(0.1);
    config.roamer.first_delay = 1.0;

    let mut sky = Sky::new(config, Viewport::default()).expect("bench config is valid");
    for _ in 0..600 {
        sky.update(TICK);
    }
    sky
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("sky_update");

    for capacity in [20, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &capacity| {
            let mut sky = busy_sky(capacity);
            b.iter(|| black_box(sky.update(TICK)));
        });
    }

    group.finish();
}

fn bench_present(c: &mut Criterion) {
    let sky = busy_sky(200);
    let mut frame = SpriteFrame::new();

    c.bench_function("sky_present", |b| {
        b.iter(|| {
            sky.present(&mut frame);
            black_box(frame.len())
        });
    });
}

criterion_group!(benches, bench_update, bench_present);
criterion_main!(benches);
