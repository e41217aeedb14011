//! Doubles shared by the player's tests.

use std::path::Path;
use std::sync::Arc;

use clock::ManualTimeSource;
use parking_lot::Mutex;
use playback_engine::test_utils::write_wav;
use playback_engine::{
    Audio, AudioError, AudioState, AudioSystem, NullAudio, SymphoniaAudioSystem,
};
use playd_protocol::{ClientId, Response, ResponseSink};
use tempfile::TempDir;
use time_primitives::Micros;

use crate::player::Player;

/// Records every packed response along with who it was addressed to.
#[derive(Default)]
pub(crate) struct RecordingSink {
    received: Mutex<Vec<(ClientId, String)>>,
}

impl RecordingSink {
    pub(crate) fn take(&self) -> Vec<(ClientId, String)> {
        std::mem::take(&mut *self.received.lock())
    }

    pub(crate) fn take_lines(&self) -> Vec<String> {
        self.take().into_iter().map(|(_, line)| line).collect()
    }
}

impl ResponseSink for RecordingSink {
    fn respond(&self, response: &Response, id: ClientId) {
        self.received.lock().push((id, response.pack()));
    }
}

/// An audio system whose loads fail in a way no client could cause.
pub(crate) struct BrokenAudioSystem;

impl AudioSystem for BrokenAudioSystem {
    fn null(&self) -> Box<dyn Audio> {
        Box::new(NullAudio)
    }

    fn load(&self, _path: &Path) -> Result<Box<dyn Audio>, AudioError> {
        Err(AudioError::internal("decoder pool exhausted"))
    }
}

/// Loads tracks that open fine but fault on every transport change.
pub(crate) struct FaultyAudioSystem;

struct FaultyAudio;

impl Audio for FaultyAudio {
    fn update(&mut self) -> AudioState {
        AudioState::Stopped
    }

    fn emit(&mut self, _path: &str, _broadcast: bool) -> Option<Response> {
        None
    }

    fn set_playing(&mut self, _playing: bool) -> Result<(), AudioError> {
        Err(AudioError::internal("output device vanished"))
    }

    fn seek(&mut self, _position: Micros) -> Result<(), AudioError> {
        Err(AudioError::internal("output device vanished"))
    }
}

impl AudioSystem for FaultyAudioSystem {
    fn null(&self) -> Box<dyn Audio> {
        Box::new(NullAudio)
    }

    fn load(&self, _path: &Path) -> Result<Box<dyn Audio>, AudioError> {
        Ok(Box::new(FaultyAudio))
    }
}

pub(crate) struct Fixture {
    pub(crate) player: Player,
    pub(crate) sink: Arc<RecordingSink>,
    pub(crate) time: ManualTimeSource,
    /// A one second silent WAV.
    pub(crate) track: String,
    _dir: TempDir,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let track = write_wav(dir.path(), "tone.wav", 8000, 8000)
            .display()
            .to_string();

        let time = ManualTimeSource::new();
        let audio = SymphoniaAudioSystem::new(time.clone(), Micros::from_millis(500));
        let mut player = Player::new(Box::new(audio));
        let sink = Arc::new(RecordingSink::default());
        player.attach_sink(sink.clone()).unwrap();

        Self {
            player,
            sink,
            time,
            track,
            _dir: dir,
        }
    }

    pub(crate) fn run(&mut self, words: &[&str], id: usize) -> playd_protocol::CommandResult {
        self.player.run_command(words, ClientId::new(id)).unwrap()
    }

    /// Loads the fixture track and forgets the announcements it caused.
    pub(crate) fn loaded() -> Self {
        let mut fixture = Self::new();
        let track = fixture.track.clone();
        assert!(fixture.run(&["write", "t", "/player/file", track.as_str()], 1).is_success());
        fixture.sink.take();
        fixture
    }
}
