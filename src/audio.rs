//! Sound effects and background music through SDL2_mixer.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use sdl2::{
    mixer::{self, Chunk, InitFlag, LoaderRWops, Music, AUDIO_S16LSB},
    rwops::RWops,
};
use tracing::{debug, trace, warn};

use crate::error::AudioError;

const AUDIO_FREQUENCY: i32 = 44_100;
const AUDIO_CHANNELS: i32 = 4;
const CHUNK_SIZE: i32 = 1024;
const DEFAULT_VOLUME: i32 = 32;

/// Plays sounds from files. Decoded effects are cached by path.
///
/// Nothing here is fatal: every failure is logged with `warn!` and handed back to the caller,
/// who is free to ignore it.
pub struct Audio {
    _mixer_context: mixer::Sdl2MixerContext,
    sounds: HashMap<PathBuf, Chunk>,
    music: Option<Music<'static>>,
}

impl Audio {
    /// Opens the audio device. Requires the SDL audio subsystem to be initialized.
    pub fn new() -> Result<Self, AudioError> {
        mixer::open_audio(AUDIO_FREQUENCY, AUDIO_S16LSB, 2, CHUNK_SIZE).map_err(AudioError::Load)?;
        mixer::allocate_channels(AUDIO_CHANNELS);
        for i in 0..AUDIO_CHANNELS {
            mixer::Channel(i).set_volume(DEFAULT_VOLUME);
        }

        let mixer_context = mixer::init(InitFlag::OGG | InitFlag::MP3).map_err(AudioError::Load)?;
        debug!(frequency = AUDIO_FREQUENCY, channels = AUDIO_CHANNELS, "Audio device opened");

        Ok(Self {
            _mixer_context: mixer_context,
            sounds: HashMap::new(),
            music: None,
        })
    }

    /// Plays a WAV file once on the first free channel.
    pub fn play_sound(&mut self, path: &Path) -> Result<(), AudioError> {
        let result = self.try_play_sound(path);
        if let Err(e) = &result {
            warn!(path = %path.display(), error = %e, "Could not play sound");
        }
        result
    }

    fn try_play_sound(&mut self, path: &Path) -> Result<(), AudioError> {
        if !self.sounds.contains_key(path) {
            let chunk = load_sound(path)?;
            self.sounds.insert(path.to_path_buf(), chunk);
        }

        let Some(chunk) = self.sounds.get(path) else {
            return Ok(());
        };
        let channel = mixer::Channel::all().play(chunk, 0).map_err(AudioError::Playback)?;
        trace!(path = %path.display(), channel = ?channel, "Playing sound");
        Ok(())
    }

    /// Starts looping a music track, replacing whatever was playing.
    pub fn play_music(&mut self, path: &Path) -> Result<(), AudioError> {
        let result = Music::from_file(path)
            .map_err(AudioError::Load)
            .and_then(|music| music.play(-1).map(|_| music).map_err(AudioError::Playback));

        match result {
            Ok(music) => {
                debug!(path = %path.display(), "Playing music");
                self.music = Some(music);
                Ok(())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not play music");
                Err(e)
            }
        }
    }

    pub fn stop_music(&mut self) {
        if self.music.take().is_some() {
            Music::halt();
        }
    }
}

fn load_sound(path: &Path) -> Result<Chunk, AudioError> {
    let data = fs::read(path)?;
    let rwops = RWops::from_bytes(&data).map_err(AudioError::Load)?;
    rwops.load_wav().map_err(AudioError::Load)
}
