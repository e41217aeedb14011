use std::path::PathBuf;

use clock::{Stopwatch, TimeSource};
use playd_protocol::{messages, paths, Response, ResponseCode};
use time_primitives::Micros;

use crate::audio::{Audio, AudioState};
use crate::error::AudioError;
use crate::probe::TrackInfo;

/// A loaded file whose playback position follows a stopwatch.
pub struct FileAudio<T: TimeSource> {
    path: PathBuf,
    info: TrackInfo,
    clock: Stopwatch<T>,
    announcer: PositionAnnouncer,
}

impl<T: TimeSource> FileAudio<T> {
    pub fn new(path: PathBuf, info: TrackInfo, time_source: T, position_period: Micros) -> Self {
        Self {
            path,
            info,
            clock: Stopwatch::new(time_source),
            announcer: PositionAnnouncer::new(position_period),
        }
    }

    pub fn position(&self) -> Micros {
        Micros::from(self.clock.elapsed()).min(self.info.length)
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_running()
    }
}

impl<T: TimeSource> Audio for FileAudio<T> {
    fn update(&mut self) -> AudioState {
        if !self.clock.is_running() {
            AudioState::Stopped
        } else if Micros::from(self.clock.elapsed()) >= self.info.length {
            AudioState::AtEnd
        } else {
            AudioState::Playing
        }
    }

    fn emit(&mut self, path: &str, broadcast: bool) -> Option<Response> {
        match path {
            paths::STATE => {
                let state = if self.is_playing() { "Playing" } else { "Stopped" };
                Some(Response::new(ResponseCode::State).with_arg(state))
            }
            paths::FILE => {
                Some(Response::new(ResponseCode::File).with_arg(self.path.display().to_string()))
            }
            paths::ELAPSED => {
                let position = self.position();
                if broadcast && !self.announcer.should_announce(position) {
                    return None;
                }
                Some(Response::new(ResponseCode::Time).with_arg(position.to_string()))
            }
            _ => None,
        }
    }

    fn set_playing(&mut self, playing: bool) -> Result<(), AudioError> {
        if playing {
            self.clock.start();
        } else {
            self.clock.stop();
        }
        tracing::debug!(
            "Track {:?}: playing={}, position={}",
            self.path,
            playing,
            self.position()
        );
        Ok(())
    }

    fn seek(&mut self, position: Micros) -> Result<(), AudioError> {
        if position > self.info.length {
            tracing::debug!(
                "Seek to {} beyond length {} of {:?}",
                position,
                self.info.length,
                self.path
            );
            return Err(AudioError::Seek(messages::SEEK_FAIL.to_string()));
        }
        self.clock.set(position.into());
        self.announcer.rearm();
        Ok(())
    }
}

/// Rate-limits broadcast position announcements to one per period.
struct PositionAnnouncer {
    period: Micros,
    last_slot: Option<u64>,
}

impl PositionAnnouncer {
    fn new(period: Micros) -> Self {
        Self {
            period,
            last_slot: None,
        }
    }

    fn should_announce(&mut self, position: Micros) -> bool {
        let slot = position.slot(self.period);
        if self.last_slot == Some(slot) {
            return false;
        }
        self.last_slot = Some(slot);
        true
    }

    fn rearm(&mut self) {
        self.last_slot = None;
    }
}
