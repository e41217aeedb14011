mod audio;
mod error;
mod file;
mod null;
mod probe;
mod system;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use audio::{Audio, AudioState};
pub use error::AudioError;
pub use file::FileAudio;
pub use null::NullAudio;
pub use probe::{probe, TrackInfo};
pub use system::{AudioSystem, SymphoniaAudioSystem};
