//! Generated clips - short synthesized tones so the demo needs no assets

use std::{collections::HashMap, f32::consts::TAU, sync::Arc};

/// Immutable mono sample buffer shared between voices.
#[derive(Clone, Debug)]
pub struct ToneClip {
    name: Arc<str>,
    samples: Arc<[f32]>,
    sample_rate: f32,
}

impl ToneClip {
    fn new(name: &str, samples: Vec<f32>, sample_rate: f32) -> Self {
        Self {
            name: name.into(),
            samples: samples.into(),
            sample_rate,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

/// Clip library keyed by name, rendered at the device rate.
pub fn library(sample_rate: f32) -> HashMap<String, ToneClip> {
    let clips = [
        ToneClip::new("blip", blip(sample_rate, 880.0, 0.18), sample_rate),
        ToneClip::new("click", blip(sample_rate, 1_760.0, 0.04), sample_rate),
        ToneClip::new("line", murmur(sample_rate, 1.2), sample_rate),
        ToneClip::new("theme", arpeggio(sample_rate, &[220.0, 261.63, 329.63, 440.0]), sample_rate),
        ToneClip::new("night", arpeggio(sample_rate, &[146.83, 174.61, 220.0, 293.66]), sample_rate),
        ToneClip::new("rain", rain(sample_rate, 3.0), sample_rate),
    ];
    clips
        .into_iter()
        .map(|clip| (clip.name().to_string(), clip))
        .collect()
}

fn frames(sample_rate: f32, seconds: f32) -> usize {
    (sample_rate * seconds).max(1.0) as usize
}

// Sine with an exponential decay
fn blip(sample_rate: f32, freq: f32, seconds: f32) -> Vec<f32> {
    let len = frames(sample_rate, seconds);
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let decay = (-6.0 * t / seconds).exp();
            (TAU * freq * t).sin() * decay * 0.8
        })
        .collect()
}

// Low vibrato tone with a soft attack and release, standing in for dialogue
fn murmur(sample_rate: f32, seconds: f32) -> Vec<f32> {
    let len = frames(sample_rate, seconds);
    let mut phase = 0.0f32;
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let freq = 196.0 + 12.0 * (TAU * 5.0 * t).sin();
            phase = (phase + freq / sample_rate).fract();
            let shape = (std::f32::consts::PI * t / seconds).sin();
            (TAU * phase).sin() * shape * 0.5
        })
        .collect()
}

// Seamless four-note loop, one note per half second
fn arpeggio(sample_rate: f32, notes: &[f32]) -> Vec<f32> {
    const NOTE_SECONDS: f32 = 0.5;
    let note_len = frames(sample_rate, NOTE_SECONDS);

    let mut out = Vec::with_capacity(note_len * notes.len());
    for &freq in notes {
        for i in 0..note_len {
            let t = i as f32 / sample_rate;
            let attack = (t / 0.01).min(1.0);
            let release = ((NOTE_SECONDS - t) / 0.05).clamp(0.0, 1.0);
            let tone = (TAU * freq * t).sin() + 0.3 * (TAU * freq * 2.0 * t).sin();
            out.push(tone * attack * release * 0.35);
        }
    }
    out
}

// Lowpassed noise; xorshift keeps it deterministic
fn rain(sample_rate: f32, seconds: f32) -> Vec<f32> {
    let len = frames(sample_rate, seconds);
    let mut state = 0x9E37_79B9u32;
    let mut smoothed = 0.0f32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let white = state as f32 / u32::MAX as f32 * 2.0 - 1.0;
            smoothed += 0.08 * (white - smoothed);
            smoothed * 0.9
        })
        .collect()
}
