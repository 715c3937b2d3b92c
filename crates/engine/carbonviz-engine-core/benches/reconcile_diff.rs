use carbonviz_engine::{reconcile, Attrs, Collapse, KeyedAttrs, Presence, Timing, TransitionScheduler};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn state(offset: usize, n: usize) -> KeyedAttrs {
    (offset..offset + n)
        .map(|i| {
            (
                format!("entity-{i}"),
                Attrs::rect(0.0, i as f32 * 12.0, (i % 97) as f32, 10.0),
            )
        })
        .collect()
}

fn bench_reconcile(c: &mut Criterion) {
    let prev = state(0, 200);
    let next = state(20, 200);
    let presence = Presence::uniform(Collapse::Width);

    c.bench_function("reconcile_200_keys_10pct_churn", |b| {
        b.iter(|| reconcile(black_box(&prev), black_box(&next), presence))
    });

    c.bench_function("reconcile_apply_update_200", |b| {
        let rec = reconcile(&prev, &next, presence);
        b.iter(|| {
            let mut sched = TransitionScheduler::default();
            sched.apply(&rec, Timing::new(500.0, 0.0)).unwrap();
            for _ in 0..30 {
                black_box(sched.update(16.0));
            }
        })
    });
}

criterion_group!(benches, bench_reconcile);
criterion_main!(benches);
