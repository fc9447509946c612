//! Pool checkout costs.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_mixer::{
    pool::VoicePool,
    voice::{SimVoice, Voice},
};

use super::endless_clip;
use crate::POOL_SIZES;

type Pool = VoicePool<fn() -> SimVoice>;

fn prewarmed(size: usize) -> Pool {
    let mut pool: Pool = VoicePool::new(SimVoice::new as fn() -> SimVoice, size);
    pool.prewarm(size);
    pool
}

pub fn bench_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/pool");

    for &size in POOL_SIZES {
        // === CHURN ===
        // one-shot traffic: idle voice out, straight back in
        let mut pool = prewarmed(size);
        group.bench_with_input(BenchmarkId::new("churn", size), &size, |b, _| {
            b.iter(|| {
                if let Some(checkout) = pool.get() {
                    pool.return_voice(black_box(checkout.handle));
                }
            })
        });

        // === RECYCLE AT CAPACITY ===
        // every voice handed out and only the newest one silent, so the
        // recycling scan walks the whole creation order
        let mut full = prewarmed(size);
        for i in 0..size {
            let handle = full.get().unwrap().handle;
            if i + 1 < size {
                let voice = full.voice_mut(handle).unwrap();
                voice.set_clip(Some(endless_clip()));
                voice.play();
            }
        }
        group.bench_with_input(BenchmarkId::new("recycle_newest", size), &size, |b, _| {
            b.iter(|| black_box(full.get()))
        });
    }

    group.finish();
}
