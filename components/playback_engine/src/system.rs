use std::path::Path;

use clock::TimeSource;
use time_primitives::Micros;

use crate::audio::Audio;
use crate::error::AudioError;
use crate::file::FileAudio;
use crate::null::NullAudio;
use crate::probe::probe;

/// Opens tracks.
pub trait AudioSystem: Send {
    /// The empty placeholder track. Always succeeds.
    fn null(&self) -> Box<dyn Audio>;

    /// Opens the file at `path`.
    ///
    /// Problems with the file itself are [`AudioError::File`]; any other
    /// error kind signals a fault in the system.
    fn load(&self, path: &Path) -> Result<Box<dyn Audio>, AudioError>;
}

/// Opens files with symphonia and tracks their position against `T`.
pub struct SymphoniaAudioSystem<T> {
    time_source: T,
    position_period: Micros,
}

impl<T: TimeSource + Clone> SymphoniaAudioSystem<T> {
    /// `position_period` is the minimum spacing of broadcast position
    /// announcements from tracks this system opens.
    pub fn new(time_source: T, position_period: Micros) -> Self {
        Self {
            time_source,
            position_period,
        }
    }
}

impl<T: TimeSource + Clone + 'static> AudioSystem for SymphoniaAudioSystem<T> {
    fn null(&self) -> Box<dyn Audio> {
        Box::new(NullAudio)
    }

    fn load(&self, path: &Path) -> Result<Box<dyn Audio>, AudioError> {
        let info = probe(path)?;
        tracing::info!(
            "Loaded {:?}: {}Hz, {} channels, {}us",
            path,
            info.sample_rate,
            info.audio_channels,
            info.length
        );

        Ok(Box::new(FileAudio::new(
            path.to_path_buf(),
            info,
            self.time_source.clone(),
            self.position_period,
        )))
    }
}
