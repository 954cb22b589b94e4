use basemath::{Config, SequentialTest};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_planning(c: &mut Criterion) {
    let mut group = c.benchmark_group("planning");

    group.bench_function("binary_small_mde", |b| {
        let config = Config::binary(0.1, 0.01);
        b.iter(|| {
            let test = SequentialTest::new(black_box(&config)).unwrap();
            black_box(test.required_samples())
        });
    });

    group.bench_function("continuous_many_looks", |b| {
        let config = Config::continuous(25.0, 0.05, 400.0).planned_looks(100);
        b.iter(|| {
            let test = SequentialTest::new(black_box(&config)).unwrap();
            black_box(test.plan().num_looks())
        });
    });

    group.finish();
}

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");
    let template = SequentialTest::new(&Config::binary(0.1, 0.01)).unwrap();

    group.bench_function("hundred_batches", |b| {
        b.iter(|| {
            let mut test = template.clone();
            let mut delta = 0.0;
            for i in 0..100u64 {
                let change = if i % 2 == 0 { 30.0 } else { 20.0 };
                black_box(test.evaluate(delta, change, i * 10_000, 10_000).unwrap());
                delta += change;
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_planning, bench_evaluation);
criterion_main!(benches);
