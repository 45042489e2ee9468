use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gridiron_core::engine::rng::seeded_rng;
use gridiron_core::models::{
    DefensiveCall, OffensiveFormation, PlayArchetype, PlayCall, RunDirection,
};
use gridiron_core::{
    EngineConfig, GameSimulator, PlayResolutionPipeline, RosterBuilder, SituationalContext,
    TeamSide,
};

fn bench_single_snap(c: &mut Criterion) {
    let config = EngineConfig::default();
    let home = RosterBuilder::new(TeamSide::Home).build();
    let away = RosterBuilder::new(TeamSide::Away).build();
    let pipeline = PlayResolutionPipeline::new(&config);
    let situation = SituationalContext::first_and_ten(TeamSide::Home, 35);
    let run = PlayCall::scrimmage(
        OffensiveFormation::IFormation,
        PlayArchetype::PowerRun,
        RunDirection::Middle,
        DefensiveCall::default(),
    );
    let pass = PlayCall::scrimmage(
        OffensiveFormation::Shotgun,
        PlayArchetype::MediumPass,
        RunDirection::Middle,
        DefensiveCall::default(),
    );

    let mut rng = seeded_rng(1);
    c.bench_function("resolve_run", |b| {
        b.iter(|| pipeline.resolve(&home, &away, black_box(&situation), &run, &mut rng))
    });
    c.bench_function("resolve_pass", |b| {
        b.iter(|| pipeline.resolve(&home, &away, black_box(&situation), &pass, &mut rng))
    });
}

fn bench_full_game(c: &mut Criterion) {
    let config = EngineConfig::default();
    let home = RosterBuilder::new(TeamSide::Home).build();
    let away = RosterBuilder::new(TeamSide::Away).build();
    let mut seed = 0u64;
    c.bench_function("full_game", |b| {
        b.iter(|| {
            seed += 1;
            GameSimulator::new(&config, &home, &away, black_box(seed)).run()
        })
    });
}

criterion_group!(benches, bench_single_snap, bench_full_game);
criterion_main!(benches);
