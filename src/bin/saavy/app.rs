//! App - audio device setup, coordinator construction and the UI run

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{PushError, RingBuffer};
use tracing::{error, info};

use saavy_mixer::{io::JsonFileStore, AudioSettings, PlaybackCoordinator};

use super::{
    backend::VoiceBus,
    clips,
    ui::{self, UiApp},
};

// Capacity in visualisation windows for the audio→UI sample ring
const AUDIO_RING_BLOCKS: usize = 16;

/// Main application: owns configuration until `run` hands it to the engine
pub struct App {
    settings: AudioSettings,
    store: JsonFileStore,
}

impl App {
    pub fn new(settings: AudioSettings, store: JsonFileStore) -> Self {
        Self { settings, store }
    }

    /// Open the default output device and run the mixer UI until quit
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        info!(sample_rate, channels, "opened output device");

        let bus = VoiceBus::new();
        let (audio_tx, audio_rx) = RingBuffer::<f32>::new(ui::VIS_BUFFER_SIZE * AUDIO_RING_BLOCKS);

        let stream = device
            .build_output_stream(
                &config.into(),
                {
                    let bus = bus.clone();
                    let mut audio_tx = audio_tx;
                    move |data: &mut [f32], _| {
                        bus.render(data, channels, sample_rate);

                        // First channel only, dropped when the UI falls behind
                        for frame in data.chunks(channels.max(1)) {
                            if let Err(PushError::Full(_)) = audio_tx.push(frame[0]) {
                                break;
                            }
                        }
                    }
                },
                |err| error!(%err, "audio stream error"),
                None,
            )
            .wrap_err("failed to build output stream")?;
        stream.play().wrap_err("failed to start output stream")?;

        let factory = {
            let bus = bus.clone();
            move || bus.create_voice()
        };
        let coordinator = PlaybackCoordinator::new(self.settings, factory, self.store);
        let mut ui = UiApp::new(coordinator, clips::library(sample_rate), audio_rx, sample_rate);

        let mut terminal = ratatui::init();
        let result = ui.run(&mut terminal);
        ratatui::restore();

        ui.shutdown();
        drop(stream);
        result
    }
}
