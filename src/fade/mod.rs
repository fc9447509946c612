//! Time-driven linear volume ramps.

/*
Fades
=====

A fade moves one voice's volume along a straight line over a fixed amount
of wall-clock time. Fades are advanced once per tick by the host's update
loop - there are no timers or threads behind them.

Vocabulary
----------

  start      Volume the voice held when the fade began.

  target     Volume the fade ends on. Fade-in: given by the caller.
             Fade-out: 0.0.

  elapsed    Unscaled seconds accumulated from tick deltas.

  progress   elapsed / duration, clamped to 1.0.


The Math
--------

    volume = start + (target - start) x progress

On the tick where elapsed reaches duration the volume is pinned to the
exact target instead of the interpolated value, so float drift in the
accumulated deltas never leaves a voice at 0.7999 instead of 0.8.

Linear in amplitude is not linear in loudness - a linear fade-out sounds
like it drops slowly and then vanishes at the end. That is acceptable here;
perceptual curves are a presentation choice for the host.


Fade-out Semantics
------------------

When a fade-out completes the voice is stopped and its volume is restored
to the start value, so whoever reuses the voice starts from a sensible level
rather than from silence. If the voice stops on its own part-way through (the
clip ran out) the fade ends at that tick with the same stop-and-restore.

A paused voice also reports not-playing, so the engine holds fades on voices
its category pause covers (`tick_holding`). A held fade keeps its elapsed
time and volume and picks up again once the category resumes.


Interaction With Category Volume
--------------------------------

Fades and category changes both write `voice.volume`. Both happen on the
update thread, so they never interleave inside a step. When a category's
gain moves while a fade runs, the engine rescales the fade's endpoints:

    start  <- start x new_gain / old_gain          (old_gain > 0)
    target <- relative x new_gain                  (fade-in only)

so the ramp keeps its shape and lands where a voice of that authored
loudness belongs under the new gain. Coming out of a mute (old_gain = 0)
there is nothing to scale; a fade-out restores to relative x new_gain.
*/

use tracing::debug;

use crate::{
    pool::VoicePool,
    voice::{Voice, VoiceFactory, VoiceHandle},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeKind {
    In { target: f32 },
    Out,
}

#[derive(Debug, Clone, Copy)]
struct Fade {
    handle: VoiceHandle,
    kind: FadeKind,
    start: f32,    // volume when the fade began
    elapsed: f32,  // seconds since start
    duration: f32, // seconds, always > 0 for a running fade
}

/// Runs fade-in, fade-out and cross-fade ramps on pooled voices.
#[derive(Debug, Default)]
pub struct FadeController {
    fades: Vec<Fade>,
}

impl FadeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ramp `handle` from its current volume to `target` over `duration` seconds.
    ///
    /// Replaces any fade already running on the voice. A non-positive
    /// duration sets the target immediately. Returns false if the handle no
    /// longer resolves to a live voice.
    pub fn fade_in<F: VoiceFactory>(
        &mut self,
        pool: &mut VoicePool<F>,
        handle: VoiceHandle,
        duration: f32,
        target: f32,
    ) -> bool {
        let Some(voice) = live_voice(pool, handle) else {
            return false;
        };

        self.cancel(handle);
        let target = target.clamp(0.0, 1.0);
        if !(duration > 0.0) {
            voice.set_volume(target);
            return true;
        }

        self.fades.push(Fade {
            handle,
            kind: FadeKind::In { target },
            start: voice.volume(),
            elapsed: 0.0,
            duration,
        });
        debug!(%handle, duration, target, "fade in started");
        true
    }

    /// Ramp `handle` to silence over `duration` seconds, then stop it and
    /// restore its pre-fade volume.
    ///
    /// Replaces any fade already running on the voice. A non-positive
    /// duration stops the voice immediately.
    pub fn fade_out<F: VoiceFactory>(
        &mut self,
        pool: &mut VoicePool<F>,
        handle: VoiceHandle,
        duration: f32,
    ) -> bool {
        let Some(voice) = live_voice(pool, handle) else {
            return false;
        };

        self.cancel(handle);
        let start = voice.volume();
        if !(duration > 0.0) {
            finish_out(voice, start);
            return true;
        }

        self.fades.push(Fade {
            handle,
            kind: FadeKind::Out,
            start,
            elapsed: 0.0,
            duration,
        });
        debug!(%handle, duration, "fade out started");
        true
    }

    /// Fade `outgoing` to silence while `incoming` ramps to its own current
    /// volume. The two ramps start together and run independently.
    pub fn cross_fade<F: VoiceFactory>(
        &mut self,
        pool: &mut VoicePool<F>,
        outgoing: VoiceHandle,
        incoming: VoiceHandle,
        duration: f32,
    ) -> bool {
        let faded_out = self.fade_out(pool, outgoing, duration);
        let faded_in = match live_voice(pool, incoming).map(|v| v.volume()) {
            Some(target) => self.fade_in(pool, incoming, duration, target),
            None => false,
        };
        faded_out || faded_in
    }

    /// Advance every running fade by `dt` seconds.
    ///
    /// `on_stopped` is called for each voice a fade-out stopped this tick.
    /// Fades whose voice went stale or invalid are dropped silently.
    pub fn tick<F, S>(&mut self, pool: &mut VoicePool<F>, dt: f32, on_stopped: S)
    where
        F: VoiceFactory,
        S: FnMut(VoiceHandle),
    {
        self.tick_holding(pool, dt, |_| false, on_stopped);
    }

    /// Like [`tick`](Self::tick), but fades on voices for which `held`
    /// returns true are frozen: no elapsed time, no volume change, and a
    /// held fade-out never stops its voice.
    pub fn tick_holding<F, H, S>(
        &mut self,
        pool: &mut VoicePool<F>,
        dt: f32,
        mut held: H,
        mut on_stopped: S,
    ) where
        F: VoiceFactory,
        H: FnMut(VoiceHandle) -> bool,
        S: FnMut(VoiceHandle),
    {
        let dt = dt.max(0.0);

        self.fades.retain_mut(|fade| {
            let Some(voice) = live_voice(pool, fade.handle) else {
                debug!(handle = %fade.handle, "fade cancelled, voice is gone");
                return false;
            };
            if held(fade.handle) {
                return true;
            }

            match fade.kind {
                FadeKind::In { target } => {
                    fade.elapsed += dt;
                    if fade.elapsed >= fade.duration {
                        voice.set_volume(target);
                        debug!(handle = %fade.handle, "fade in finished");
                        return false;
                    }
                    voice.set_volume(lerp(fade.start, target, fade.elapsed / fade.duration));
                    true
                }
                FadeKind::Out => {
                    if !voice.is_playing() {
                        finish_out(voice, fade.start);
                        on_stopped(fade.handle);
                        return false;
                    }

                    fade.elapsed += dt;
                    if fade.elapsed >= fade.duration {
                        finish_out(voice, fade.start);
                        on_stopped(fade.handle);
                        debug!(handle = %fade.handle, "fade out finished");
                        return false;
                    }
                    voice.set_volume(lerp(fade.start, 0.0, fade.elapsed / fade.duration));
                    true
                }
            }
        });
    }

    /// Move the endpoints of the fade on `handle` from `from_gain` to
    /// `to_gain`. `relative` is the voice's authored loudness in its category.
    pub fn rescale(&mut self, handle: VoiceHandle, from_gain: f32, to_gain: f32, relative: f32) {
        let Some(fade) = self.fades.iter_mut().find(|fade| fade.handle == handle) else {
            return;
        };

        let restored = relative * to_gain;
        if from_gain > 0.0 {
            fade.start = (fade.start * to_gain / from_gain).clamp(0.0, 1.0);
        } else if fade.kind == FadeKind::Out {
            fade.start = restored.clamp(0.0, 1.0);
        }
        if let FadeKind::In { target } = &mut fade.kind {
            *target = restored.clamp(0.0, 1.0);
        }
    }

    /// Drop the fade running on `handle`, leaving its volume where it is.
    pub fn cancel(&mut self, handle: VoiceHandle) -> bool {
        let before = self.fades.len();
        self.fades.retain(|fade| fade.handle != handle);
        self.fades.len() != before
    }

    pub fn clear(&mut self) {
        self.fades.clear();
    }

    pub fn is_fading(&self, handle: VoiceHandle) -> bool {
        self.fades.iter().any(|fade| fade.handle == handle)
    }

    /// Kind of fade running on `handle`, if any.
    pub fn fade_kind(&self, handle: VoiceHandle) -> Option<FadeKind> {
        self.fades
            .iter()
            .find(|fade| fade.handle == handle)
            .map(|fade| fade.kind)
    }

    pub fn len(&self) -> usize {
        self.fades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fades.is_empty()
    }
}

#[inline]
fn lerp(start: f32, target: f32, progress: f32) -> f32 {
    start + (target - start) * progress.clamp(0.0, 1.0)
}

fn finish_out<V: Voice>(voice: &mut V, start: f32) {
    voice.stop();
    voice.set_volume(start);
}

fn live_voice<F: VoiceFactory>(
    pool: &mut VoicePool<F>,
    handle: VoiceHandle,
) -> Option<&mut F::Voice> {
    pool.voice_mut(handle).filter(|voice| voice.is_valid())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::voice::{SimClip, SimVoice};

    type Pool = VoicePool<fn() -> SimVoice>;

    fn playing_voice(volume: f32) -> (Pool, VoiceHandle) {
        let mut pool: Pool = VoicePool::new(SimVoice::new as fn() -> SimVoice, 4);
        let handle = pool.get().unwrap().handle;
        let voice = pool.voice_mut(handle).unwrap();
        voice.set_clip(Some(SimClip::new("theme", 10.0)));
        voice.set_volume(volume);
        voice.play();
        (pool, handle)
    }

    fn run(fades: &mut FadeController, pool: &mut Pool, ticks: usize, dt: f32) -> Vec<VoiceHandle> {
        let mut stopped = Vec::new();
        for _ in 0..ticks {
            fades.tick(pool, dt, |h| stopped.push(h));
        }
        stopped
    }

    #[test]
    fn fade_in_lands_exactly_on_target() {
        let (mut pool, handle) = playing_voice(0.0);
        let mut fades = FadeController::new();

        assert!(fades.fade_in(&mut pool, handle, 1.0, 0.8));
        run(&mut fades, &mut pool, 4, 0.25);

        assert_eq!(pool.voice(handle).unwrap().volume(), 0.8);
        assert!(fades.is_empty());
    }

    #[test]
    fn fade_in_is_linear() {
        let (mut pool, handle) = playing_voice(0.0);
        let mut fades = FadeController::new();

        fades.fade_in(&mut pool, handle, 1.0, 0.8);
        run(&mut fades, &mut pool, 2, 0.25);

        assert_abs_diff_eq!(pool.voice(handle).unwrap().volume(), 0.4, epsilon = 1e-6);
        assert!(fades.is_fading(handle));
    }

    #[test]
    fn fade_in_tolerates_accumulated_tick_drift() {
        let (mut pool, handle) = playing_voice(0.0);
        let mut fades = FadeController::new();

        fades.fade_in(&mut pool, handle, 1.0, 0.8);
        // 0.1 is not exact in f32, so ten ticks may land either side of 1.0
        run(&mut fades, &mut pool, 11, 0.1);

        assert_eq!(pool.voice(handle).unwrap().volume(), 0.8);
    }

    #[test]
    fn fade_out_stops_and_restores_volume() {
        let (mut pool, handle) = playing_voice(0.6);
        let mut fades = FadeController::new();

        fades.fade_out(&mut pool, handle, 1.0);
        let half = run(&mut fades, &mut pool, 2, 0.25);
        assert!(half.is_empty());
        assert_abs_diff_eq!(pool.voice(handle).unwrap().volume(), 0.3, epsilon = 1e-6);

        let stopped = run(&mut fades, &mut pool, 2, 0.25);
        let voice = pool.voice(handle).unwrap();
        assert_eq!(stopped, vec![handle]);
        assert!(!voice.is_playing());
        assert_eq!(voice.volume(), 0.6);
    }

    #[test]
    fn fade_out_ends_early_when_clip_finishes() {
        let (mut pool, handle) = playing_voice(1.0);
        let mut fades = FadeController::new();

        fades.fade_out(&mut pool, handle, 2.0);
        run(&mut fades, &mut pool, 1, 0.5);
        pool.voice_mut(handle).unwrap().finish();

        let stopped = run(&mut fades, &mut pool, 1, 0.5);
        assert_eq!(stopped, vec![handle]);
        assert_eq!(pool.voice(handle).unwrap().volume(), 1.0);
        assert!(fades.is_empty());
    }

    #[test]
    fn fade_is_dropped_when_voice_returns_to_pool() {
        let (mut pool, handle) = playing_voice(0.0);
        let mut fades = FadeController::new();
        fades.fade_in(&mut pool, handle, 1.0, 1.0);

        pool.return_voice(handle);
        run(&mut fades, &mut pool, 1, 0.25);

        assert!(fades.is_empty());
    }

    #[test]
    fn held_fade_out_keeps_its_voice() {
        let (mut pool, handle) = playing_voice(0.8);
        let mut fades = FadeController::new();
        fades.fade_out(&mut pool, handle, 1.0);
        run(&mut fades, &mut pool, 1, 0.5);

        pool.voice_mut(handle).unwrap().pause();
        let mut stopped = Vec::new();
        for _ in 0..4 {
            fades.tick_holding(&mut pool, 0.5, |_| true, |h| stopped.push(h));
        }
        assert!(stopped.is_empty());
        assert!(fades.is_fading(handle));
        assert_abs_diff_eq!(pool.voice(handle).unwrap().volume(), 0.4, epsilon = 1e-6);

        pool.voice_mut(handle).unwrap().unpause();
        let stopped = run(&mut fades, &mut pool, 1, 0.5);
        assert_eq!(stopped, vec![handle]);
        assert_eq!(pool.voice(handle).unwrap().volume(), 0.8);
    }

    #[test]
    fn fade_is_dropped_when_voice_is_destroyed() {
        let (mut pool, handle) = playing_voice(1.0);
        let mut fades = FadeController::new();
        fades.fade_out(&mut pool, handle, 1.0);

        pool.voice_mut(handle).unwrap().destroy();
        let stopped = run(&mut fades, &mut pool, 1, 0.25);

        assert!(stopped.is_empty());
        assert!(fades.is_empty());
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let (mut pool, handle) = playing_voice(0.2);
        let mut fades = FadeController::new();

        fades.fade_in(&mut pool, handle, 0.0, 0.9);
        assert_eq!(pool.voice(handle).unwrap().volume(), 0.9);

        fades.fade_out(&mut pool, handle, -1.0);
        assert!(!pool.voice(handle).unwrap().is_playing());
        assert!(fades.is_empty());
    }

    #[test]
    fn new_fade_replaces_running_one() {
        let (mut pool, handle) = playing_voice(0.5);
        let mut fades = FadeController::new();

        fades.fade_in(&mut pool, handle, 1.0, 1.0);
        fades.fade_out(&mut pool, handle, 1.0);

        assert_eq!(fades.len(), 1);
        assert_eq!(fades.fade_kind(handle), Some(FadeKind::Out));
    }

    #[test]
    fn cross_fade_runs_both_ramps() {
        let (mut pool, outgoing) = playing_voice(1.0);
        let incoming = pool.get().unwrap().handle;
        {
            let voice = pool.voice_mut(incoming).unwrap();
            voice.set_clip(Some(SimClip::new("next", 10.0)));
            voice.set_volume(0.7);
            voice.play();
        }
        let mut fades = FadeController::new();

        assert!(fades.cross_fade(&mut pool, outgoing, incoming, 1.0));
        assert_eq!(fades.len(), 2);

        run(&mut fades, &mut pool, 4, 0.25);
        assert!(!pool.voice(outgoing).unwrap().is_playing());
        assert_eq!(pool.voice(incoming).unwrap().volume(), 0.7);
    }

    #[test]
    fn rescale_moves_fade_in_target() {
        let (mut pool, handle) = playing_voice(0.0);
        let mut fades = FadeController::new();

        fades.fade_in(&mut pool, handle, 1.0, 0.8);
        run(&mut fades, &mut pool, 2, 0.25);
        fades.rescale(handle, 0.8, 0.4, 1.0);
        run(&mut fades, &mut pool, 2, 0.25);

        assert_eq!(pool.voice(handle).unwrap().volume(), 0.4);
    }

    #[test]
    fn rescale_out_of_mute_restores_authored_level() {
        let (mut pool, handle) = playing_voice(0.0);
        let mut fades = FadeController::new();

        fades.fade_out(&mut pool, handle, 1.0);
        fades.rescale(handle, 0.0, 0.5, 0.6);
        run(&mut fades, &mut pool, 4, 0.25);

        let voice = pool.voice(handle).unwrap();
        assert!(!voice.is_playing());
        assert_abs_diff_eq!(voice.volume(), 0.3, epsilon = 1e-6);
    }

    #[test]
    fn stale_handle_is_rejected() {
        let (mut pool, handle) = playing_voice(1.0);
        pool.return_voice(handle);
        let mut fades = FadeController::new();

        assert!(!fades.fade_in(&mut pool, handle, 1.0, 1.0));
        assert!(!fades.fade_out(&mut pool, handle, 1.0));
    }
}
