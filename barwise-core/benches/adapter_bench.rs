//! Criterion benchmarks for the adapter layer.
//!
//! Benchmarks:
//! 1. Each TA kind over typed bars (column extraction + backend + zip)
//! 2. Row parsing plus compute (`on_rows`) for the default MACD
//! 3. Daily volume profile over several days of one-minute bars

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use barwise_core::{
    build, Bar, BarRow, Indicator, IndicatorConfig, IndicatorKind, PocParams, VolumeProfile,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    const BASE_MS: i64 = 1_704_153_600_000;
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Bar::new(
                BASE_MS + i as i64 * 60_000,
                close - 0.3,
                close + 1.5,
                close - 1.5,
                close,
                1_000.0 + (i % 500) as f64,
            )
        })
        .collect()
}

// ── 1. TA kinds ──────────────────────────────────────────────────────

fn bench_ta_kinds(c: &mut Criterion) {
    let mut group = c.benchmark_group("ta_on_bars");

    for &bar_count in &[500, 5_000, 50_000] {
        let bars = make_bars(bar_count);
        for kind in IndicatorKind::ALL {
            if kind == IndicatorKind::Poc {
                continue;
            }
            let indicator = build(&IndicatorConfig::defaults(kind)).expect("default config");
            group.bench_with_input(
                BenchmarkId::new(kind.as_str(), bar_count),
                &bars,
                |b, bars| {
                    b.iter(|| indicator.on_bars(black_box(bars)));
                },
            );
        }
    }

    group.finish();
}

// ── 2. Row parsing ───────────────────────────────────────────────────

fn bench_on_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("macd_on_rows");
    let macd = build(&IndicatorConfig::defaults(IndicatorKind::Macd)).expect("default config");

    for &bar_count in &[500, 5_000] {
        let rows: Vec<BarRow> = make_bars(bar_count).into_iter().map(BarRow::from).collect();
        group.bench_with_input(BenchmarkId::from_parameter(bar_count), &rows, |b, rows| {
            b.iter(|| macd.on_rows(black_box(rows)));
        });
    }

    group.finish();
}

// ── 3. Volume profile ────────────────────────────────────────────────

fn bench_volume_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("volume_profile");
    let bars = make_bars(5 * 1_440);

    for &bucket_size in &[0.01, 0.1, 1.0] {
        let vp = VolumeProfile::new(PocParams::new(0.7, bucket_size).expect("valid params"));
        group.bench_with_input(
            BenchmarkId::new("five_days", bucket_size),
            &bars,
            |b, bars| {
                b.iter(|| vp.on_bars(black_box(bars)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_ta_kinds, bench_on_rows, bench_volume_profile);
criterion_main!(benches);
