use playback_engine::AudioError;
use thiserror::Error;

/// Errors that abort command processing altogether.
///
/// Anything a client can provoke is a [`playd_protocol::CommandResult`]
/// instead; these mean the daemon can no longer be trusted to continue.
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Fatal audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("A response sink is already attached")]
    SinkAlreadyAttached,
}
