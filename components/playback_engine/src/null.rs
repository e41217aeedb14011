use playd_protocol::{paths, Response, ResponseCode};
use time_primitives::Micros;

use crate::audio::{Audio, AudioState};
use crate::error::AudioError;

/// The track that is active whenever nothing is loaded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl Audio for NullAudio {
    fn update(&mut self) -> AudioState {
        AudioState::None
    }

    fn emit(&mut self, path: &str, _broadcast: bool) -> Option<Response> {
        (path == paths::STATE).then(|| Response::new(ResponseCode::State).with_arg("Ejected"))
    }

    fn set_playing(&mut self, _playing: bool) -> Result<(), AudioError> {
        Err(AudioError::NoAudio)
    }

    fn seek(&mut self, _position: Micros) -> Result<(), AudioError> {
        Err(AudioError::NoAudio)
    }
}
