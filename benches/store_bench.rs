#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use unilog::{Store, Term, Var};

/// Benchmark for bind/rollback churn on the trail
fn bench_bind_rollback(c: &mut Criterion) {
    c.bench_function("bind_rollback", |b| {
        let vars: Vec<Var> = (0..1000).map(|_| Var::fresh()).collect();
        b.iter(|| {
            let mut store = Store::new();
            let mark = store.mark();
            for (i, var) in vars.iter().enumerate() {
                store.bind(var, Term::from(i as i64));
            }
            store.rollback(mark);
            black_box(store.mark())
        });
    });
}

/// Benchmark for walking a long variable-to-variable chain
fn bench_walk_long_chain(c: &mut Criterion) {
    let mut store = Store::new();
    let vars: Vec<Var> = (0..1000).map(|_| Var::fresh()).collect();

    // v0 -> v1 -> ... -> v999 -> 42
    for pair in vars.windows(2) {
        store.bind(&pair[0], Term::Var(pair[1].clone()));
    }
    store.bind(&vars[999], Term::from(42));

    let head = Term::Var(vars[0].clone());
    c.bench_function("walk_long_chain", |b| {
        b.iter(|| black_box(store.walk(black_box(&head))));
    });
}

/// Benchmark for unifying two deep sequences full of variables
fn bench_unify_deep_sequences(c: &mut Criterion) {
    c.bench_function("unify_deep_sequences", |b| {
        b.iter(|| {
            let mut store = Store::new();
            let left = Term::seq((0..100).map(|_| Term::Var(Var::fresh())));
            let right = Term::seq((0..100).map(Term::from));
            let mark = store.mark();
            assert!(store.unify(black_box(&left), black_box(&right)));
            store.rollback(mark);
            black_box(store.mark())
        });
    });
}

criterion_group!(
    benches,
    bench_bind_rollback,
    bench_walk_long_chain,
    bench_unify_deep_sequences
);
criterion_main!(benches);
