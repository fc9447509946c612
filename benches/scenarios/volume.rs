//! Category volume changes with a full scene playing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_mixer::mixer::Category;

use super::{coordinator, endless_clip};
use crate::POOL_SIZES;

pub fn bench_volume(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/volume");

    for &size in POOL_SIZES {
        // === ONE CATEGORY ===
        // music slider drag with every voice in Music
        let mut music = coordinator(size);
        for _ in 0..size {
            music.play(endless_clip(), Category::Music, true, 0.8);
        }
        let mut level = 0.0f32;
        group.bench_with_input(BenchmarkId::new("music_slider", size), &size, |b, _| {
            b.iter(|| {
                level = if level > 0.5 { 0.25 } else { 0.75 };
                music.set_category_volume(Category::Music, black_box(level));
            })
        });

        // === MASTER ===
        // master drag rescales every category when gating
        let mut scene = coordinator(size);
        for i in 0..size {
            let category = Category::ALL[1 + i % (Category::COUNT - 1)];
            scene.play(endless_clip(), category, true, 1.0);
        }
        group.bench_with_input(BenchmarkId::new("master_slider", size), &size, |b, _| {
            b.iter(|| {
                level = if level > 0.5 { 0.25 } else { 0.75 };
                scene.set_category_volume(Category::Master, black_box(level));
            })
        });
    }

    group.finish();
}
