// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
// criterion_group!/criterion_main! expand to undocumented functions that cannot
// carry #[allow] (attributes on macro invocations are ignored).
#![allow(missing_docs)]
//! Continuity compilation and timeline building.
//!
//! - `compile`: lexing and parsing a multi-line continuity.
//! - `timeline_build_N`: a block of N marchers over three animated sheets.
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::{hint::black_box, time::Duration};
use stunt_core::{build_timeline, compile, Sheet, SheetPoint, Show, Symbol};
use stunt_geom::Coord;

const CONTINUITY: &str = "\
MT 4 E
A = DIST(NP) / 2
FM A N
EVEN REM NP
";

/// A square block of `side * side` marchers two steps apart.
fn block(side: i32, origin: (i32, i32)) -> Vec<SheetPoint> {
    (0..side)
        .flat_map(|r| {
            (0..side).map(move |c| {
                SheetPoint::new(Coord::from_steps(origin.0 + r * 2, origin.1 + c * 2), Symbol::Plain)
            })
        })
        .collect()
}

fn show_of(side: i32) -> Option<Show> {
    Show::new(vec![
        Sheet::new("1", 16, block(side, (0, 0))).with_continuity(Symbol::Plain, "EVEN REM NP"),
        Sheet::new("2", 16, block(side, (8, 0))).with_continuity(Symbol::Plain, "HSDM NP MTRM E"),
        Sheet::new("3", 8, block(side, (8, 8))).with_continuity(Symbol::Plain, "MTRM E"),
    ])
    .ok()
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("continuity");
    group.sample_size(50);
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(4));
    group.bench_function("compile", |b| {
        b.iter(|| black_box(compile(black_box(CONTINUITY))))
    });
    group.finish();
}

fn bench_timeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("timeline_build");
    group.sample_size(30);
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));
    group.noise_threshold(0.02);
    for &side in &[4_i32, 8, 16] {
        let Some(show) = show_of(side) else {
            continue;
        };
        let marchers = show.marcher_count() as u64;
        group.throughput(Throughput::Elements(marchers));
        group.bench_with_input(BenchmarkId::from_parameter(marchers), &show, |b, show| {
            b.iter(|| {
                let timeline = build_timeline(show);
                debug_assert!(timeline.errors().is_empty());
                black_box(timeline)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compile, bench_timeline);
criterion_main!(benches);
