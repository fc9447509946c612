//! Update loop cost per frame.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_mixer::mixer::Category;

use super::{coordinator, endless_clip};
use crate::POOL_SIZES;

const FRAME: f32 = 1.0 / 60.0;

pub fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/tick");

    for &size in POOL_SIZES {
        // === SWEEP ONLY ===
        // nothing finishes; measures polling every active voice
        let mut idle_frame = coordinator(size);
        for _ in 0..size {
            idle_frame.play(endless_clip(), Category::Sfx, true, 1.0);
        }
        group.bench_with_input(BenchmarkId::new("sweep", size), &size, |b, _| {
            b.iter(|| idle_frame.tick(black_box(FRAME)))
        });

        // === FADING ===
        // half the voices fading in; the ramps are long enough to never end
        let mut fading = coordinator(size);
        for i in 0..size {
            if i % 2 == 0 {
                fading.play_with_fade_in(endless_clip(), Category::Ambient, Some(1.0e9));
            } else {
                fading.play(endless_clip(), Category::Ambient, true, 1.0);
            }
        }
        group.bench_with_input(BenchmarkId::new("fading", size), &size, |b, _| {
            b.iter(|| fading.tick(black_box(FRAME)))
        });
    }

    group.finish();
}
