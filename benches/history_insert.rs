use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use multiclip::models::ClipboardHistory;

fn bench_insert_at_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_insert");

    for capacity in [25usize, 1_000] {
        let clips: Vec<String> = (0..capacity * 4).map(|i| format!("clip number {}", i)).collect();

        group.bench_with_input(BenchmarkId::from_parameter(capacity), &clips, |b, clips| {
            b.iter(|| {
                let mut history = ClipboardHistory::new(capacity);
                for clip in clips {
                    black_box(history.insert(clip.clone()));
                }
                history.len()
            })
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut history = ClipboardHistory::new(1_000);
    for i in 0..1_000 {
        history.insert(format!("clip number {}", i));
    }

    c.bench_function("history_snapshot_1000", |b| b.iter(|| black_box(history.snapshot())));
}

criterion_group!(benches, bench_insert_at_capacity, bench_snapshot);
criterion_main!(benches);
