//! Benchmarks for the pure preparation paths.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tryon_image::{assess_upload, remap_click, sniff_format, PreviewClick, UploadPolicy};

fn bench_format_sniffing(c: &mut Criterion) {
    let jpeg_data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01];
    let png_data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D];

    c.bench_function("sniff_jpeg", |b| b.iter(|| sniff_format(black_box(&jpeg_data))));
    c.bench_function("sniff_png", |b| b.iter(|| sniff_format(black_box(&png_data))));
}

fn bench_click_remap(c: &mut Criterion) {
    let click = PreviewClick {
        x: 299,
        y: 299,
        preview_width: 300,
        preview_height: 300,
    };

    c.bench_function("remap_click", |b| {
        b.iter(|| remap_click(black_box(&click), black_box(4000), black_box(3000)))
    });
}

fn bench_intake_gate(c: &mut Criterion) {
    let policy = UploadPolicy::default();

    c.bench_function("assess_upload", |b| {
        b.iter(|| {
            assess_upload(
                black_box(3 * 1024 * 1024),
                black_box(4000),
                black_box(3000),
                &policy,
            )
        })
    });
}

criterion_group!(
    benches,
    bench_format_sniffing,
    bench_click_remap,
    bench_intake_gate
);
criterion_main!(benches);
