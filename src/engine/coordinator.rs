use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::{
    active::{ActiveSources, ActiveVoice},
    message::{AudioMessage, MessageReceiver},
};
use crate::{
    config::AudioSettings,
    error::PlayError,
    fade::FadeController,
    io::{ClipLibrary, KeyValueStore},
    mixer::{Category, CategoryMixer, VoiceMix},
    pool::{PoolStats, VoicePool},
    voice::{Position, Voice, VoiceFactory, VoiceHandle},
};

/// Clip type accepted by the voices a factory produces.
pub type ClipOf<F> = <<F as VoiceFactory>::Voice as Voice>::Clip;

/// How a tracked voice left playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    Finished, // stopped playing on its own or via a fade-out
    Invalid,  // host destroyed the voice
    Stale,    // handle no longer resolves in the pool
}

/// Façade tying play requests to pooled voices, category volume and fades.
///
/// One coordinator is constructed by the application's composition root and
/// passed to whatever needs audio. Everything runs on the caller's update
/// thread: `tick` advances fades and returns finished voices to the pool.
///
/// Per request: requested → acquired → playing → finished | stopped → returned.
pub struct PlaybackCoordinator<F: VoiceFactory, S: KeyValueStore> {
    pool: VoicePool<F>,
    mixer: CategoryMixer<S>,
    fades: FadeController,
    active: ActiveSources,
    settings: AudioSettings,
    completions: Vec<(VoiceHandle, Completion)>, // sweep scratch
}

impl<F: VoiceFactory, S: KeyValueStore> PlaybackCoordinator<F, S> {
    pub fn new(settings: AudioSettings, factory: F, store: S) -> Self {
        let settings = settings.normalized();

        let mut pool = VoicePool::new(factory, settings.pool.max_size);
        pool.prewarm(settings.pool.initial_size);
        let mixer = CategoryMixer::new(&settings, store);

        info!(
            initial = settings.pool.initial_size,
            max = settings.pool.max_size,
            master_gates_all = settings.master_gates_all,
            "audio playback coordinator ready"
        );

        Self {
            pool,
            mixer,
            fades: FadeController::new(),
            active: ActiveSources::new(),
            settings,
            completions: Vec::new(),
        }
    }

    // ---- Playback ----------------------------------------------------------

    /// Play `clip` in `category`. `volume` is the sound's authored loudness
    /// within its category.
    pub fn play(
        &mut self,
        clip: ClipOf<F>,
        category: Category,
        looping: bool,
        volume: f32,
    ) -> Option<VoiceHandle> {
        let result = self.try_play(clip, category, looping, volume);
        absorb(result, category)
    }

    pub fn try_play(
        &mut self,
        clip: ClipOf<F>,
        category: Category,
        looping: bool,
        volume: f32,
    ) -> Result<VoiceHandle, PlayError> {
        if !volume.is_finite() {
            return Err(PlayError::InvalidVolume(volume));
        }
        let volume = volume.clamp(0.0, 1.0);

        let active = &self.active;
        let checkout = self
            .pool
            .get_recycling(|handle, voice| !voice.is_playing() && !active.is_paused(handle))
            .ok_or_else(|| PlayError::PoolExhausted {
                max: self.pool.max_size(),
            })?;

        if let Some(evicted) = checkout.evicted {
            self.forget(evicted);
        }

        let handle = checkout.handle;
        let gain = self.mixer.output_gain(category);
        if let Some(voice) = self.pool.voice_mut(handle) {
            voice.set_clip(Some(clip));
            voice.set_looping(looping);
            voice.set_volume(volume * gain);
            voice.set_spatial_blend(0.0);
            voice.play();
        }

        self.active.insert(ActiveVoice {
            handle,
            category,
            mix: VoiceMix::new(volume, gain),
            looping,
            paused: false,
        });

        if let Some(limit) = self.mixer.max_simultaneous(category) {
            let count = self.active.len(category);
            if count > limit {
                debug!(%category, count, limit, "category above its soft voice limit");
            }
        }

        debug!(%handle, %category, looping, volume, gain, "voice playing");
        Ok(handle)
    }

    /// Resolve `name` through `library` and play it.
    pub fn play_named<L>(
        &mut self,
        library: &L,
        name: &str,
        category: Category,
        looping: bool,
        volume: f32,
    ) -> Option<VoiceHandle>
    where
        L: ClipLibrary<ClipOf<F>> + ?Sized,
    {
        let result = self.try_play_named(library, name, category, looping, volume);
        absorb(result, category)
    }

    pub fn try_play_named<L>(
        &mut self,
        library: &L,
        name: &str,
        category: Category,
        looping: bool,
        volume: f32,
    ) -> Result<VoiceHandle, PlayError>
    where
        L: ClipLibrary<ClipOf<F>> + ?Sized,
    {
        let clip = library
            .clip(name)
            .ok_or_else(|| PlayError::ClipNotFound(name.to_string()))?;
        self.try_play(clip, category, looping, volume)
    }

    /// Play a one-shot as a fully spatial voice at `position`.
    pub fn play_at_position(
        &mut self,
        clip: ClipOf<F>,
        position: Position,
        category: Category,
        volume: f32,
    ) -> Option<VoiceHandle> {
        let handle = self.play(clip, category, false, volume)?;
        if let Some(voice) = self.pool.voice_mut(handle) {
            voice.set_position(position);
            voice.set_spatial_blend(1.0);
        }
        Some(handle)
    }

    /// Start a one-shot silent and ramp it to the category's output gain.
    ///
    /// `None` uses the configured default fade-in time.
    pub fn play_with_fade_in(
        &mut self,
        clip: ClipOf<F>,
        category: Category,
        fade_time: Option<f32>,
    ) -> Option<VoiceHandle> {
        let duration = fade_time.unwrap_or(self.settings.fades.fade_in);
        let handle = self.play(clip, category, false, 0.0)?;
        self.ramp_in(handle, duration);
        Some(handle)
    }

    /// Fade `outgoing` out while a new voice for `clip` fades in.
    pub fn cross_fade_to(
        &mut self,
        outgoing: VoiceHandle,
        clip: ClipOf<F>,
        category: Category,
        looping: bool,
        fade_time: Option<f32>,
    ) -> Option<VoiceHandle> {
        let duration = fade_time.unwrap_or(self.settings.fades.fade_in);
        self.fade_out(outgoing, Some(duration));

        let handle = self.play(clip, category, looping, 0.0)?;
        self.ramp_in(handle, duration);
        Some(handle)
    }

    // ---- Fades -------------------------------------------------------------

    /// Ramp an active voice to silence, then stop it.
    ///
    /// The voice stays in its active list; the next sweep after the fade ends
    /// returns it to the pool. `None` uses the configured default time.
    pub fn fade_out(&mut self, handle: VoiceHandle, fade_time: Option<f32>) -> bool {
        let duration = fade_time.unwrap_or(self.settings.fades.fade_out);
        if let Some(entry) = self.active.get_mut(handle) {
            entry.paused = false;
        }
        let started = self.fades.fade_out(&mut self.pool, handle, duration);
        if !started {
            debug!(%handle, "fade out ignored, stale voice");
        }
        started
    }

    /// Fade one voice out and another to its current volume, together.
    pub fn cross_fade(
        &mut self,
        outgoing: VoiceHandle,
        incoming: VoiceHandle,
        fade_time: Option<f32>,
    ) -> bool {
        let duration = fade_time.unwrap_or(self.settings.fades.fade_out);
        if let Some(entry) = self.active.get_mut(outgoing) {
            entry.paused = false;
        }
        self.fades
            .cross_fade(&mut self.pool, outgoing, incoming, duration)
    }

    // ---- Category control --------------------------------------------------

    pub fn set_category_volume(&mut self, category: Category, volume: f32) {
        self.mixer.set_volume(category, volume);
        self.reapply(category);
    }

    pub fn category_volume(&self, category: Category) -> f32 {
        self.mixer.volume(category)
    }

    pub fn set_category_mute(&mut self, category: Category, muted: bool) {
        self.mixer.set_mute(category, muted);
        self.reapply(category);
    }

    pub fn is_category_muted(&self, category: Category) -> bool {
        self.mixer.is_muted(category)
    }

    /// Stop every active voice and return it to the pool.
    pub fn stop_all(&mut self) {
        for category in Category::ALL {
            self.stop_category(category);
        }
    }

    /// Stop every voice in `category`, empty its active list and return the
    /// voices to the pool.
    pub fn stop_category(&mut self, category: Category) {
        let entries = self.active.take(category);
        if entries.is_empty() {
            return;
        }

        for entry in &entries {
            self.fades.cancel(entry.handle);
            if let Some(voice) = self.pool.voice_mut(entry.handle) {
                voice.stop();
            }
            self.pool.return_voice(entry.handle);
        }
        debug!(%category, stopped = entries.len(), "stopped category");
    }

    /// Stop a single voice and return it to the pool.
    pub fn stop(&mut self, handle: VoiceHandle) -> bool {
        if self.active.remove(handle).is_none() {
            return false;
        }
        self.fades.cancel(handle);
        if let Some(voice) = self.pool.voice_mut(handle) {
            voice.stop();
        }
        self.pool.return_voice(handle);
        true
    }

    /// Pause every playing voice in `category`. Paused voices stay active.
    pub fn pause_category(&mut self, category: Category) {
        for entry in self.active.list_mut(category) {
            if let Some(voice) = self.pool.voice_mut(entry.handle) {
                if voice.is_playing() {
                    voice.pause();
                    entry.paused = true;
                }
            }
        }
    }

    pub fn resume_category(&mut self, category: Category) {
        for entry in self.active.list_mut(category) {
            if !entry.paused {
                continue;
            }
            if let Some(voice) = self.pool.voice_mut(entry.handle) {
                voice.unpause();
            }
            entry.paused = false;
        }
    }

    // ---- Update loop -------------------------------------------------------

    /// Advance fades by `dt` unscaled seconds, then return every voice that
    /// stopped playing to the pool.
    pub fn tick(&mut self, dt: f32) {
        // A category pause freezes fades where they are
        let active = &self.active;
        self.fades
            .tick_holding(&mut self.pool, dt, |handle| active.is_paused(handle), |_| {});
        self.sweep();
    }

    /// Apply queued control messages in arrival order. Returns how many.
    pub fn process_messages<R: MessageReceiver + ?Sized>(&mut self, rx: &mut R) -> usize {
        let mut handled = 0;
        while let Some(message) = rx.pop() {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    pub fn handle_message(&mut self, message: AudioMessage) {
        match message {
            AudioMessage::SetCategoryVolume { category, volume } => {
                self.set_category_volume(category, volume)
            }
            AudioMessage::SetCategoryMute { category, muted } => {
                self.set_category_mute(category, muted)
            }
            AudioMessage::StopCategory(category) => self.stop_category(category),
            AudioMessage::PauseCategory(category) => self.pause_category(category),
            AudioMessage::ResumeCategory(category) => self.resume_category(category),
            AudioMessage::StopAll => self.stop_all(),
            AudioMessage::Stop(handle) => {
                self.stop(handle);
            }
            AudioMessage::FadeOut { handle, duration } => {
                self.fade_out(handle, duration);
            }
            AudioMessage::VoiceFinished(handle) => {
                if self.active.contains(handle) {
                    if let Some(voice) = self.pool.voice_mut(handle) {
                        voice.stop();
                    }
                    self.finish(handle, Completion::Finished);
                } else {
                    debug!(%handle, "completion for untracked voice ignored");
                }
            }
        }
    }

    /// Stop everything and destroy all pooled voices.
    pub fn shutdown(&mut self) {
        let stopped = self.active.total_len();
        self.stop_all();
        debug_assert!(self.active.is_empty());
        self.fades.clear();
        self.pool.clear();
        info!(stopped, "audio playback coordinator shut down");
    }

    // ---- Inspection --------------------------------------------------------

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    pub fn mixer(&self) -> &CategoryMixer<S> {
        &self.mixer
    }

    pub fn pool(&self) -> &VoicePool<F> {
        &self.pool
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn fades(&self) -> &FadeController {
        &self.fades
    }

    pub fn voice(&self, handle: VoiceHandle) -> Option<&F::Voice> {
        self.pool.voice(handle)
    }

    pub fn voice_mut(&mut self, handle: VoiceHandle) -> Option<&mut F::Voice> {
        self.pool.voice_mut(handle)
    }

    /// Every live voice, for hosts that drive playback themselves.
    pub fn voices_mut(&mut self) -> impl Iterator<Item = &mut F::Voice> + '_ {
        self.pool.voices_mut()
    }

    pub fn is_active(&self, handle: VoiceHandle) -> bool {
        self.active.contains(handle)
    }

    pub fn category_of(&self, handle: VoiceHandle) -> Option<Category> {
        self.active.get(handle).map(|entry| entry.category)
    }

    pub fn active_count(&self, category: Category) -> usize {
        self.active.len(category)
    }

    /// Active voices across every category.
    pub fn total_active(&self) -> usize {
        self.active.total_len()
    }

    pub fn active_handles(&self, category: Category) -> impl Iterator<Item = VoiceHandle> + '_ {
        self.active.list(category).iter().map(|entry| entry.handle)
    }

    pub fn into_store(self) -> S {
        self.mixer.into_store()
    }

    // ---- Internals ---------------------------------------------------------

    fn ramp_in(&mut self, handle: VoiceHandle, duration: f32) {
        let Some(entry) = self.active.get_mut(handle) else {
            return;
        };
        // Authored loudness of a faded-in voice is the full category level
        let gain = self.mixer.output_gain(entry.category);
        entry.mix = VoiceMix::new(1.0, gain);
        self.fades.fade_in(&mut self.pool, handle, duration, gain);
    }

    fn reapply(&mut self, category: Category) {
        if category == Category::Master && self.mixer.master_gates_all() {
            for category in Category::ALL {
                self.reapply_category(category);
            }
        } else {
            self.reapply_category(category);
        }
    }

    fn reapply_category(&mut self, category: Category) {
        let gain = self.mixer.output_gain(category);

        // Running fades keep their shape; their endpoints follow the new gain
        for entry in self.active.list_mut(category) {
            if !self.fades.is_fading(entry.handle) {
                continue;
            }
            let from = entry.mix.gain();
            self.fades
                .rescale(entry.handle, from, gain, entry.mix.relative());
            if from > 0.0 {
                if let Some(voice) = self.pool.voice_mut(entry.handle) {
                    voice.set_volume(voice.volume() * gain / from);
                }
            }
            entry.mix = VoiceMix::new(entry.mix.relative(), gain);
        }

        let fades = &self.fades;
        let mut mixes: HashMap<VoiceHandle, &mut VoiceMix> = self
            .active
            .list_mut(category)
            .iter_mut()
            .filter(|entry| !fades.is_fading(entry.handle))
            .map(|entry| (entry.handle, &mut entry.mix))
            .collect();
        if mixes.is_empty() {
            return;
        }

        let voices = self
            .pool
            .iter_mut()
            .filter_map(|(handle, voice)| mixes.remove(&handle).map(|mix| (voice, mix)));
        self.mixer.apply_to_active(category, voices);
    }

    fn sweep(&mut self) {
        self.completions.clear();
        for entry in self.active.iter() {
            let completion = match self.pool.voice(entry.handle) {
                None => Some(Completion::Stale),
                Some(voice) if !voice.is_valid() => Some(Completion::Invalid),
                Some(voice) if !entry.paused && !voice.is_playing() => Some(Completion::Finished),
                Some(_) => None,
            };
            if let Some(completion) = completion {
                self.completions.push((entry.handle, completion));
            }
        }

        for i in 0..self.completions.len() {
            let (handle, completion) = self.completions[i];
            self.finish(handle, completion);
        }
    }

    fn finish(&mut self, handle: VoiceHandle, completion: Completion) {
        let removed = self.active.remove(handle);
        let category = removed.map(|entry| entry.category);
        let looping = removed.is_some_and(|entry| entry.looping);
        self.fades.cancel(handle);

        match completion {
            Completion::Finished => {
                self.pool.return_voice(handle);
            }
            Completion::Invalid => {
                self.pool.discard(handle);
            }
            Completion::Stale => {}
        }
        debug!(%handle, ?category, looping, ?completion, "voice left playback");
    }

    /// Drop bookkeeping for a handle the pool has recycled.
    fn forget(&mut self, handle: VoiceHandle) {
        let removed = self.active.remove(handle);
        self.fades.cancel(handle);
        debug!(%handle, tracked = removed.is_some(), "recycled voice dropped from active list");
    }
}

fn absorb(result: Result<VoiceHandle, PlayError>, category: Category) -> Option<VoiceHandle> {
    match result {
        Ok(handle) => Some(handle),
        Err(err) => {
            warn!(error = %err, %category, "sound not played");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        fade::FadeKind,
        io::MemoryStore,
        voice::{SimClip, SimVoice},
    };

    type Coordinator = PlaybackCoordinator<fn() -> SimVoice, MemoryStore>;

    fn coordinator(initial: usize, max: usize) -> Coordinator {
        let mut settings = AudioSettings::default();
        settings.pool.initial_size = initial;
        settings.pool.max_size = max;
        PlaybackCoordinator::new(settings, SimVoice::new as fn() -> SimVoice, MemoryStore::new())
    }

    fn clip(name: &str) -> SimClip {
        SimClip::new(name, 2.0)
    }

    fn volume_of(c: &Coordinator, handle: VoiceHandle) -> f32 {
        c.voice(handle).unwrap().volume()
    }

    #[test]
    fn play_scales_by_category_gain() {
        let mut c = coordinator(2, 4);
        c.set_category_volume(Category::Sfx, 0.5);

        let handle = c.play(clip("hit"), Category::Sfx, false, 1.0).unwrap();

        assert_eq!(volume_of(&c, handle), 0.5);
        assert_eq!(c.category_of(handle), Some(Category::Sfx));
        assert!(c.voice(handle).unwrap().is_playing());
    }

    #[test]
    fn invalid_volume_is_rejected_before_touching_the_pool() {
        let mut c = coordinator(0, 4);

        let err = c
            .try_play(clip("hit"), Category::Sfx, false, f32::NAN)
            .unwrap_err();

        assert!(matches!(err, PlayError::InvalidVolume(_)));
        assert_eq!(c.pool_stats().total_created, 0);
    }

    #[test]
    fn out_of_range_volume_is_clamped() {
        let mut c = coordinator(1, 2);
        let handle = c.play(clip("hit"), Category::Ui, false, 3.0).unwrap();
        assert_eq!(volume_of(&c, handle), 1.0);
    }

    #[test]
    fn missing_clip_is_reported() {
        let mut c = coordinator(1, 2);
        let library: HashMap<String, SimClip> =
            [("menu".to_string(), clip("menu"))].into_iter().collect();

        assert!(c
            .play_named(&library, "menu", Category::Music, true, 1.0)
            .is_some());
        assert_eq!(
            c.try_play_named(&library, "nope", Category::Music, false, 1.0),
            Err(PlayError::ClipNotFound("nope".to_string()))
        );
    }

    #[test]
    fn finished_voice_returns_to_pool_on_tick() {
        let mut c = coordinator(1, 2);
        let handle = c.play(clip("hit"), Category::Sfx, false, 1.0).unwrap();

        c.voice_mut(handle).unwrap().finish();
        c.tick(0.016);

        assert!(!c.is_active(handle));
        assert!(c.voice(handle).is_none());
        assert_eq!(c.pool_stats().idle, 1);

        let again = c.play(clip("hit"), Category::Sfx, false, 1.0).unwrap();
        assert_eq!(again.index(), handle.index());
    }

    #[test]
    fn recycled_voice_leaves_its_old_active_entry() {
        let mut c = coordinator(1, 1);
        let first = c.play(clip("a"), Category::Sfx, false, 1.0).unwrap();

        // Finished but not yet swept
        c.voice_mut(first).unwrap().finish();
        let second = c.play(clip("b"), Category::Music, false, 1.0).unwrap();

        assert!(!c.is_active(first));
        assert!(c.is_active(second));
        assert_eq!(c.active_count(Category::Sfx), 0);
        assert_eq!(c.active_count(Category::Music), 1);
    }

    #[test]
    fn exhausted_pool_drops_the_request() {
        let mut c = coordinator(1, 1);
        c.play(clip("a"), Category::Sfx, true, 1.0).unwrap();

        assert_eq!(
            c.try_play(clip("b"), Category::Sfx, false, 1.0),
            Err(PlayError::PoolExhausted { max: 1 })
        );
        assert!(c.play(clip("b"), Category::Sfx, false, 1.0).is_none());
    }

    #[test]
    fn paused_voice_is_neither_swept_nor_recycled() {
        let mut c = coordinator(1, 1);
        let handle = c.play(clip("line"), Category::Voice, false, 1.0).unwrap();

        c.pause_category(Category::Voice);
        c.tick(0.016);
        assert!(c.is_active(handle));
        assert!(c.play(clip("other"), Category::Sfx, false, 1.0).is_none());

        c.resume_category(Category::Voice);
        assert!(c.voice(handle).unwrap().is_playing());
    }

    #[test]
    fn invalid_voice_is_discarded_on_tick() {
        let mut c = coordinator(2, 2);
        let handle = c.play(clip("hit"), Category::Sfx, false, 1.0).unwrap();

        c.voice_mut(handle).unwrap().destroy();
        c.tick(0.016);

        assert!(!c.is_active(handle));
        assert_eq!(c.pool_stats().total_created, 1);
    }

    #[test]
    fn stop_returns_immediately() {
        let mut c = coordinator(2, 4);
        let handle = c.play(clip("hit"), Category::Sfx, true, 1.0).unwrap();

        assert!(c.stop(handle));
        assert!(!c.stop(handle));
        assert_eq!(c.pool_stats().in_use, 0);
    }

    #[test]
    fn category_change_rescales_running_fade_in() {
        let mut c = coordinator(1, 2);
        let handle = c
            .play_with_fade_in(clip("theme"), Category::Music, Some(1.0))
            .unwrap();

        c.tick(0.25);
        c.tick(0.25);
        assert_abs_diff_eq!(volume_of(&c, handle), 0.5, epsilon = 1e-6);

        c.set_category_volume(Category::Music, 0.5);
        assert_abs_diff_eq!(volume_of(&c, handle), 0.25, epsilon = 1e-6);

        c.tick(0.25);
        c.tick(0.25);
        assert_eq!(volume_of(&c, handle), 0.5);
        assert!(c.fades().is_empty());
    }

    #[test]
    fn fade_out_hands_voice_back_after_completion() {
        let mut c = coordinator(1, 2);
        let handle = c.play(clip("theme"), Category::Music, true, 0.8).unwrap();

        assert!(c.fade_out(handle, Some(0.5)));
        c.tick(0.25);
        assert!(c.is_active(handle));

        c.tick(0.25);
        assert!(!c.is_active(handle));
        assert_eq!(c.pool_stats().idle, 1);
    }

    #[test]
    fn cross_fade_to_swaps_music() {
        let mut c = coordinator(2, 2);
        let old = c.play(clip("day"), Category::Music, true, 1.0).unwrap();

        let new = c
            .cross_fade_to(old, clip("night"), Category::Music, true, Some(0.5))
            .unwrap();
        c.tick(0.25);
        c.tick(0.25);

        assert!(!c.is_active(old));
        assert_eq!(volume_of(&c, new), 1.0);
        assert!(c.voice(new).unwrap().looping());
    }

    #[test]
    fn cross_fade_between_playing_voices() {
        let mut c = coordinator(2, 2);
        let old = c.play(clip("day"), Category::Music, true, 1.0).unwrap();
        let new = c.play(clip("night"), Category::Music, true, 0.5).unwrap();

        assert!(c.cross_fade(old, new, Some(0.5)));
        assert!(matches!(c.fades().fade_kind(new), Some(FadeKind::In { .. })));
        c.tick(0.25);
        assert_abs_diff_eq!(volume_of(&c, old), 0.5, epsilon = 1e-6);

        c.tick(0.25);
        assert!(!c.is_active(old));
        assert!(c.is_active(new));
        assert_eq!(volume_of(&c, new), 0.5);
        assert_eq!(c.pool_stats().idle, 1);
    }

    #[test]
    fn pause_freezes_a_running_fade_out() {
        let mut c = coordinator(1, 2);
        let handle = c.play(clip("theme"), Category::Music, true, 1.0).unwrap();

        assert!(c.fade_out(handle, Some(2.0)));
        c.tick(0.25);
        c.pause_category(Category::Music);
        for _ in 0..10 {
            c.tick(0.25);
        }

        assert!(c.is_active(handle));
        assert!(c.voice(handle).unwrap().is_paused());
        assert!(c.fades().is_fading(handle));
        assert_abs_diff_eq!(volume_of(&c, handle), 0.875, epsilon = 1e-6);

        c.resume_category(Category::Music);
        assert!(c.voice(handle).unwrap().is_playing());
        c.tick(1.0);
        assert!(c.is_active(handle));

        c.tick(0.75);
        assert!(!c.is_active(handle));
        assert_eq!(c.pool_stats().idle, 1);
    }

    #[test]
    fn play_at_position_is_fully_spatial() {
        let mut c = coordinator(1, 2);
        c.set_category_volume(Category::Sfx, 0.5);

        let handle = c
            .play_at_position(clip("hit"), [3.0, 0.0, -1.0], Category::Sfx, 0.8)
            .unwrap();

        let voice = c.voice(handle).unwrap();
        assert_eq!(voice.position(), [3.0, 0.0, -1.0]);
        assert_eq!(voice.spatial_blend(), 1.0);
        assert!(!voice.looping());
        assert_abs_diff_eq!(voice.volume(), 0.4, epsilon = 1e-6);

        let flat = c.play(clip("hit"), Category::Sfx, false, 1.0).unwrap();
        assert_eq!(c.voice(flat).unwrap().spatial_blend(), 0.0);
    }

    #[test]
    fn stop_all_empties_every_category() {
        let mut c = coordinator(3, 4);
        c.play(clip("a"), Category::Sfx, true, 1.0).unwrap();
        let music = c.play(clip("b"), Category::Music, true, 1.0).unwrap();
        c.play(clip("c"), Category::Ui, false, 1.0).unwrap();
        c.fade_out(music, Some(1.0));

        c.stop_all();

        assert_eq!(c.total_active(), 0);
        assert!(c.fades().is_empty());
        let stats = c.pool_stats();
        assert_eq!(stats.in_use, 0);
        assert_eq!(stats.idle, 3);
    }

    #[test]
    fn messages_apply_in_order() {
        let mut c = coordinator(2, 4);
        let handle = c.play(clip("rain"), Category::Ambient, true, 1.0).unwrap();

        let mut queue: VecDeque<AudioMessage> = VecDeque::new();
        queue.push_back(AudioMessage::SetCategoryVolume {
            category: Category::Ambient,
            volume: 0.25,
        });
        queue.push_back(AudioMessage::SetCategoryMute {
            category: Category::Ambient,
            muted: true,
        });
        queue.push_back(AudioMessage::SetCategoryMute {
            category: Category::Ambient,
            muted: false,
        });

        assert_eq!(c.process_messages(&mut queue), 3);
        assert_eq!(volume_of(&c, handle), 0.25);

        queue.push_back(AudioMessage::VoiceFinished(handle));
        queue.push_back(AudioMessage::Stop(handle));
        c.process_messages(&mut queue);
        assert!(!c.is_active(handle));
        assert_eq!(c.pool_stats().idle, 2);
    }

    #[test]
    fn shutdown_destroys_every_voice() {
        let mut c = coordinator(3, 4);
        c.play(clip("a"), Category::Sfx, true, 1.0).unwrap();
        c.play(clip("b"), Category::Music, true, 1.0).unwrap();

        c.shutdown();

        let stats = c.pool_stats();
        assert_eq!(stats.total_created, 0);
        assert_eq!(c.active_count(Category::Sfx), 0);
    }
}
