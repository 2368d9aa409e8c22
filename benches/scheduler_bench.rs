use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use histrion::scenarios;
use histrion::{Action, Expr, Interval, Simulation, TimeUnit};

/// One herald waking `n` vassals, each waiting and tracing
fn bench_muster_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("muster_fan_out");
    for vassals in [10u32, 100, 1_000] {
        let scenario = scenarios::muster(vassals);
        group.bench_with_input(BenchmarkId::from_parameter(vassals), &scenario, |b, scenario| {
            b.iter(|| {
                let mut sim = Simulation::new();
                scenario.install(&mut sim).unwrap();
                black_box(sim.run().unwrap());
            })
        });
    }
    group.finish();
}

/// Many entities interleaving short waits through the queue
fn bench_interleaved_waits(c: &mut Criterion) {
    let script: Vec<Action> = (1..=50)
        .flat_map(|i| {
            vec![
                Action::Wait(Interval::of(i % 7 + 1, TimeUnit::Sec)),
                Action::Trace(Expr::Myself),
            ]
        })
        .collect();

    c.bench_function("interleaved_waits_200x50", |b| {
        b.iter(|| {
            let mut sim = Simulation::new();
            for n in 0..200 {
                sim.spawn(format!("Walker {}", n), script.clone()).unwrap();
            }
            black_box(sim.run().unwrap());
        })
    });
}

criterion_group!(benches, bench_muster_fan_out, bench_interleaved_waits);
criterion_main!(benches);
