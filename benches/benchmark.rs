use criterion::{criterion_group, criterion_main, Criterion};

use advent2023::{default_input, ALL_SOLUTIONS};

pub fn criterion_benchmark(c: &mut Criterion) {
    for (n, day) in ALL_SOLUTIONS {
        // puzzle inputs are not checked in
        let Ok(input) = default_input(n) else {
            continue;
        };
        c.bench_function(&format!("day{}", n), |b| b.iter(|| day(&input)));
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
