use playd_protocol::messages;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The file is missing, unreadable, or not audio we can play.
    #[error("{0}")]
    File(String),

    /// The requested position is outside the track.
    #[error("{0}")]
    Seek(String),

    /// The operation needs a loaded track and there is none.
    #[error("{}", messages::CMD_NEEDS_LOADED)]
    NoAudio,

    /// Something went wrong that no client request should be able to cause.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AudioError {
    pub fn file(message: impl Into<String>) -> Self {
        Self::File(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this error was caused by the file a client asked for.
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::File(_))
    }
}
