#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use unilog::{and, append, between, member, run_all, run_one, Term, Var};

/// Benchmark for a three-way cartesian product of memberships
fn bench_cartesian_product(c: &mut Criterion) {
    c.bench_function("cartesian_product", |b| {
        let domain: Vec<i64> = (0..20).collect();
        b.iter(|| {
            let x = Var::named("X");
            let y = Var::named("Y");
            let z = Var::named("Z");
            let goal = and(vec![
                member(x.clone(), Term::seq(domain.clone())),
                member(y.clone(), Term::seq(domain.clone())),
                member(z.clone(), Term::seq(domain.clone())),
            ]);
            let solutions = run_all(goal, &[("x", x), ("y", y), ("z", z)]).unwrap();
            black_box(solutions.len())
        });
    });
}

/// Benchmark for the first solution of a huge range, which must not pay
/// for the rest of the range
fn bench_between_first_of_million(c: &mut Criterion) {
    c.bench_function("between_first_of_million", |b| {
        b.iter(|| {
            let x = Var::named("X");
            let goal = between(1, 1_000_000, x.clone());
            black_box(run_one(goal, &[("X", x)]).unwrap())
        });
    });
}

/// Benchmark for enumerating every split of a 100-element sequence
fn bench_append_splits(c: &mut Criterion) {
    c.bench_function("append_splits", |b| {
        let whole = Term::seq(0..100);
        b.iter(|| {
            let xs = Var::named("Xs");
            let ys = Var::named("Ys");
            let goal = append(xs.clone(), ys.clone(), whole.clone());
            let solutions = run_all(goal, &[("xs", xs), ("ys", ys)]).unwrap();
            black_box(solutions.len())
        });
    });
}

criterion_group!(
    benches,
    bench_cartesian_product,
    bench_between_first_of_million,
    bench_append_splits
);
criterion_main!(benches);
