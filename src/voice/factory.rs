use super::Voice;

/// Factory the pool uses to create host voices on demand
///
/// This is the backend seam - the host decides what a voice is (a cpal-fed
/// software voice, an engine audio source, a simulated voice in tests) and
/// the pool only asks for another one when it is below capacity.
pub trait VoiceFactory {
    type Voice: Voice;

    fn create_voice(&mut self) -> Self::Voice;
}

impl<F, V> VoiceFactory for F
where
    F: FnMut() -> V,
    V: Voice,
{
    type Voice = V;

    fn create_voice(&mut self) -> Self::Voice {
        self()
    }
}
