//! Tick throughput and replay benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use prism_grid::game::{
    campaign::Campaign,
    config::SimConfig,
    input::Command,
    level::LevelPack,
    tick::{replay, tick},
};

fn bench_idle_ticks(c: &mut Criterion) {
    c.bench_function("first_level_600_ticks", |b| {
        b.iter(|| {
            let mut campaign = Campaign::new(LevelPack::builtin(), SimConfig::default())
                .expect("builtin pack loads");
            for _ in 0..600 {
                black_box(tick(&mut campaign, &[]));
            }
            campaign.compute_hash()
        })
    });
}

fn bench_replay(c: &mut Criterion) {
    let mut frames: Vec<Vec<Command>> = vec![Vec::new(); 600];
    frames[0] = vec![Command::SkipLevel];
    frames[20] = vec![Command::Touch { x: 2, y: 5 }, Command::Touch { x: 3, y: 5 }];

    c.bench_function("replay_600_frames", |b| {
        b.iter(|| {
            let (campaign, events) =
                replay(LevelPack::builtin(), SimConfig::default(), black_box(&frames))
                    .expect("replay succeeds");
            (campaign.compute_hash(), events.len())
        })
    });
}

criterion_group!(benches, bench_idle_ticks, bench_replay);
criterion_main!(benches);
