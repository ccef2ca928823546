use criterion::{Criterion, criterion_group, criterion_main};
use etreemap_core::VAlign;
use etreemap_render::text::{
    CachingTextMeasurer, DeterministicTextMeasurer, LabelBox, ellipsize, wrap_label,
};
use std::hint::black_box;

const LABELS: &[&str] = &[
    "Rent",
    "north-east regional_distribution centre operations",
    "averyveryverylongsingleword",
    "Quarterly revenue by product line and sales channel, excluding discontinued items",
    "漢字を含むラベル",
];

fn bench_wrap(c: &mut Criterion) {
    let plain = DeterministicTextMeasurer::default();
    let cached = CachingTextMeasurer::new(DeterministicTextMeasurer::default());

    let mut group = c.benchmark_group("label_fitting");
    group.sample_size(50);

    group.bench_function("wrap_labels_x100", |b| {
        b.iter(|| {
            let mut acc = 0usize;
            for i in 0..100usize {
                let text = LABELS[i % LABELS.len()];
                let width = 40.0 + (i % 7) as f64 * 20.0;
                let out = wrap_label(
                    black_box(text),
                    LabelBox::new(width, 80.0),
                    13.0,
                    VAlign::Top,
                    &plain,
                );
                acc ^= out.lines.len();
            }
            black_box(acc);
        });
    });

    group.bench_function("wrap_labels_cached_x100", |b| {
        b.iter(|| {
            let mut acc = 0usize;
            for i in 0..100usize {
                let text = LABELS[i % LABELS.len()];
                let width = 40.0 + (i % 7) as f64 * 20.0;
                let out = wrap_label(
                    black_box(text),
                    LabelBox::new(width, 80.0),
                    13.0,
                    VAlign::Center,
                    &cached,
                );
                acc ^= out.lines.len();
            }
            black_box(acc);
        });
    });

    group.bench_function("ellipsize_headers_x100", |b| {
        b.iter(|| {
            let mut acc = 0usize;
            for i in 0..100usize {
                let text = LABELS[i % LABELS.len()];
                let out = ellipsize(black_box(text), 60.0, 16.0, &plain);
                acc ^= out.len();
            }
            black_box(acc);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_wrap);
criterion_main!(benches);
