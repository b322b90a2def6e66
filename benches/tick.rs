//! Per-frame cost of the race simulation
//!
//! Run with: cargo bench --bench tick

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use distro_derby::game::constants::harness::DEFAULT_TICK_MS;
use distro_derby::game::game_loop::Race;
use distro_derby::game::input::DriverInput;
use distro_derby::game::track;
use distro_derby::sim::world::ArcadeWorld;
use distro_derby::sim::HeadlessSession;

/// Race tick alone: kinetics, pilots, timer and effects
fn bench_race_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("race_tick");
    group.sample_size(50);

    for rivals in [0, 2, 4] {
        let mut race = Race::level_1(rivals, Some(7)).expect("level 1 loads");
        race.tick(&DriverInput::forward(), DEFAULT_TICK_MS);

        group.throughput(Throughput::Elements(rivals as u64 + 1));
        group.bench_with_input(BenchmarkId::new("racers", rivals + 1), &rivals, |b, _| {
            b.iter(|| black_box(race.tick(&DriverInput::forward(), DEFAULT_TICK_MS)))
        });
    }
    group.finish();
}

/// Physics step with contact handling
fn bench_world_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_step");
    group.sample_size(50);

    let mut race = Race::level_1(4, Some(7)).expect("level 1 loads");
    let world = ArcadeWorld::new(track::level_1().expect("level 1 loads"));
    race.tick(&DriverInput::forward(), DEFAULT_TICK_MS);

    group.bench_function("five_cars", |b| {
        b.iter(|| {
            for contact in world.step(&mut race, DEFAULT_TICK_MS) {
                black_box(race.handle_contact(contact));
            }
        })
    });
    group.finish();
}

/// Whole headless frame with the autopilot driving, restarting each closed round
fn bench_full_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_frame");
    group.sample_size(30);

    let race = Race::level_1(4, Some(7)).expect("level 1 loads");
    let mut session = HeadlessSession::new(race, DEFAULT_TICK_MS);

    group.bench_function("autopilot", |b| {
        b.iter(|| {
            if session.race().state().session.is_race_over {
                session.restart();
            }
            black_box(session.autopilot_frame())
        })
    });
    group.finish();
}

/// Frame cost against the 60 Hz budget
fn bench_tick_budget(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_budget");
    group.sample_size(20);

    group.bench_function("one_second_of_frames", |b| {
        b.iter_batched(
            || HeadlessSession::new(Race::level_1(4, Some(11)).expect("level 1 loads"), DEFAULT_TICK_MS),
            |mut session| {
                for _ in 0..60 {
                    black_box(session.autopilot_frame());
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_race_tick,
    bench_world_step,
    bench_full_frame,
    bench_tick_budget,
);

criterion_main!(benches);
