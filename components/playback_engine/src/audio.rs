use playd_protocol::Response;
use time_primitives::Micros;

use crate::error::AudioError;

/// What a track reported on its latest update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    /// Nothing is loaded.
    None,
    Stopped,
    Playing,
    /// Playback has reached the end of the track.
    AtEnd,
}

/// A playback handle: either a loaded track or the empty placeholder.
pub trait Audio: Send {
    /// Advances internal bookkeeping and reports where playback stands.
    fn update(&mut self) -> AudioState;

    /// Produces the content of the resource entry at `path`, if there is any.
    ///
    /// `broadcast` marks emissions headed for every client, which a track
    /// may choose to rate-limit.
    fn emit(&mut self, path: &str, broadcast: bool) -> Option<Response>;

    fn set_playing(&mut self, playing: bool) -> Result<(), AudioError>;

    fn seek(&mut self, position: Micros) -> Result<(), AudioError>;
}
