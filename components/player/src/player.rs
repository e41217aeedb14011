use std::path::Path;
use std::sync::Arc;

use playback_engine::{Audio, AudioError, AudioState, AudioSystem};
use playd_protocol::{
    messages, paths, ClientId, CommandResult, Response, ResponseCode, ResponseSink,
};
use time_primitives::Micros;
use tracing::{debug, error, info, warn};

use crate::error::PlayerError;
use crate::resources::{Node, ResourceTree, RESOURCES};

/// The playback engine as seen by clients: a small resource tree that can be
/// read, written and deleted, plus a periodic update.
///
/// A `Player` is not internally synchronised; callers must serialise every
/// call through one owner (for example a mutex).
pub struct Player {
    audio: Box<dyn AudioSystem>,
    /// The current track, or the placeholder when nothing is loaded.
    file: Box<dyn Audio>,
    is_running: bool,
    sink: Option<Arc<dyn ResponseSink>>,
    resources: &'static ResourceTree,
}

impl Player {
    pub fn new(audio: Box<dyn AudioSystem>) -> Self {
        let file = audio.null();
        Self {
            audio,
            file,
            is_running: true,
            sink: None,
            resources: &RESOURCES,
        }
    }

    /// Sets where responses go. Until this is called they are dropped.
    pub fn attach_sink(&mut self, sink: Arc<dyn ResponseSink>) -> Result<(), PlayerError> {
        if self.sink.is_some() {
            return Err(PlayerError::SinkAlreadyAttached);
        }
        self.sink = Some(sink);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Advances the track and announces what changed.
    ///
    /// Returns whether the player is still running; once this is `false` the
    /// caller should stop updating and shut down.
    pub fn update(&mut self) -> bool {
        match self.file.update() {
            AudioState::AtEnd => self.end(),
            AudioState::Playing => {
                // The track decides whether the position is worth announcing.
                self.read_resource(paths::ELAPSED, ClientId::BROADCAST);
            }
            AudioState::Stopped | AudioState::None => {}
        }
        self.is_running
    }

    /// Greets a newly attached client and sends it the whole resource tree.
    pub fn welcome(&mut self, id: ClientId) {
        self.respond(
            &Response::new(ResponseCode::Ohai).with_arg(messages::OHAI),
            id,
        );
        self.respond(
            &Response::new(ResponseCode::Features).with_args(messages::FEATURES),
            id,
        );
        self.read_resource(paths::ROOT, id);
    }

    //
    // Commands
    //

    /// Runs one tokenized command line from client `id`.
    ///
    /// Recognised shapes are `read TAG PATH`, `write TAG PATH PAYLOAD` and
    /// `delete TAG PATH`; the tag is not interpreted.
    pub fn run_command<S: AsRef<str>>(
        &mut self,
        command: &[S],
        id: ClientId,
    ) -> Result<CommandResult, PlayerError> {
        if let Some(refusal) = self.refuse_if_closing() {
            return Ok(refusal);
        }

        let words: Vec<&str> = command.iter().map(AsRef::as_ref).collect();
        debug!("Client {} sent {:?}", id, words);

        match words.as_slice() {
            ["read", _tag, path] => Ok(self.read_resource(path, id)),
            ["write", _tag, path, payload] => self.write_resource(path, payload),
            ["delete", _tag, path] => self.delete_resource(path),
            _ => Ok(CommandResult::invalid(messages::CMD_INVALID)),
        }
    }

    /// Sends the resource at `path` to client `id`, expanding directories.
    pub fn read(&mut self, path: &str, id: ClientId) -> CommandResult {
        self.refuse_if_closing()
            .unwrap_or_else(|| self.read_resource(path, id))
    }

    pub fn write(&mut self, path: &str, payload: &str) -> Result<CommandResult, PlayerError> {
        match self.refuse_if_closing() {
            Some(refusal) => Ok(refusal),
            None => self.write_resource(path, payload),
        }
    }

    /// Resets the resource at `path` to its default.
    pub fn delete(&mut self, path: &str) -> Result<CommandResult, PlayerError> {
        match self.refuse_if_closing() {
            Some(refusal) => Ok(refusal),
            None => self.delete_resource(path),
        }
    }

    /// Replaces the current track with the file at `path`.
    ///
    /// A bad file leaves nothing loaded and fails the command; any other
    /// load error also leaves nothing loaded, and is returned as fatal.
    pub fn load(&mut self, path: &str) -> Result<CommandResult, PlayerError> {
        match self.refuse_if_closing() {
            Some(refusal) => Ok(refusal),
            None => self.load_file(path),
        }
    }

    pub fn set_playing(&mut self, playing: bool) -> Result<CommandResult, PlayerError> {
        match self.refuse_if_closing() {
            Some(refusal) => Ok(refusal),
            None => self.change_playing(playing),
        }
    }

    /// Unloads the current track. Never fails.
    pub fn eject(&mut self) -> CommandResult {
        self.file = self.audio.null();
        self.read_resource(paths::STATE, ClientId::BROADCAST);
        CommandResult::Success
    }

    /// Ejects and stops accepting commands.
    pub fn quit(&mut self) -> CommandResult {
        self.eject();
        if self.is_running {
            info!("Player is quitting");
        }
        self.is_running = false;
        CommandResult::Success
    }

    /// Seeks to a position given as a string of whole microseconds.
    pub fn seek(&mut self, time_str: &str) -> Result<CommandResult, PlayerError> {
        match self.refuse_if_closing() {
            Some(refusal) => Ok(refusal),
            None => self.seek_str(time_str),
        }
    }

    //
    // Internals
    //

    fn refuse_if_closing(&self) -> Option<CommandResult> {
        (!self.is_running).then(|| CommandResult::failure(messages::CMD_PLAYER_CLOSING))
    }

    fn load_file(&mut self, path: &str) -> Result<CommandResult, PlayerError> {
        if path.is_empty() {
            return Ok(CommandResult::invalid(messages::LOAD_EMPTY_PATH));
        }

        // Let go of the old track before opening the new one, so two tracks
        // never hold playback resources at the same time.
        self.file = self.audio.null();

        match self.audio.load(Path::new(path)) {
            Ok(file) => {
                info!("Loaded {}", path);
                self.file = file;
                self.read_resource(paths::ROOT, ClientId::BROADCAST);
                Ok(CommandResult::Success)
            }
            Err(e) if e.is_file_error() => {
                warn!("Couldn't load {}: {}", path, e);
                self.eject();
                Ok(CommandResult::failure(e.to_string()))
            }
            Err(e) => {
                error!("Fatal error while loading {}: {}", path, e);
                self.eject();
                Err(e.into())
            }
        }
    }

    fn change_playing(&mut self, playing: bool) -> Result<CommandResult, PlayerError> {
        match self.file.set_playing(playing) {
            Ok(()) => {}
            Err(e @ AudioError::NoAudio) => return Ok(CommandResult::invalid(e.to_string())),
            Err(e) => return Err(e.into()),
        }

        self.read_resource(paths::STATE, ClientId::BROADCAST);
        Ok(CommandResult::Success)
    }

    fn seek_str(&mut self, time_str: &str) -> Result<CommandResult, PlayerError> {
        match time_str.parse::<Micros>() {
            Ok(position) => self.seek_to(position),
            Err(e) => {
                debug!("Rejecting seek: {}", e);
                Ok(CommandResult::invalid(messages::SEEK_INVALID_VALUE))
            }
        }
    }

    fn read_resource(&mut self, path: &str, id: ClientId) -> CommandResult {
        match self.resources.lookup(path) {
            None => CommandResult::failure(messages::NOT_FOUND),
            Some(Node::Entry) => {
                // An entry with nothing in it right now reads as missing.
                match self.file.emit(path, id.is_broadcast()) {
                    Some(response) => {
                        self.respond(&response, id);
                        CommandResult::Success
                    }
                    None => CommandResult::failure(messages::NOT_FOUND),
                }
            }
            Some(Node::Directory(children)) => {
                let listing = Response::new(ResponseCode::Directory)
                    .with_arg(path)
                    .with_arg(children.len().to_string());
                self.respond(&listing, id);

                // Empty children don't fail the listing.
                for child in children {
                    self.read_resource(child, id);
                }
                CommandResult::Success
            }
        }
    }

    fn write_resource(&mut self, path: &str, payload: &str) -> Result<CommandResult, PlayerError> {
        match path {
            paths::STATE => match payload {
                "Playing" => self.change_playing(true),
                "Stopped" => self.change_playing(false),
                "Ejected" => Ok(self.eject()),
                "Quitting" => Ok(self.quit()),
                _ => Ok(CommandResult::invalid(messages::INVALID_PAYLOAD)),
            },
            paths::FILE => self.load_file(payload),
            paths::ELAPSED => self.seek_str(payload),
            _ => Ok(self.resource_failure(path)),
        }
    }

    fn delete_resource(&mut self, path: &str) -> Result<CommandResult, PlayerError> {
        match path {
            paths::STATE => Ok(self.quit()),
            paths::FILE => Ok(self.eject()),
            paths::ELAPSED => self.seek_to(Micros::ZERO),
            _ => Ok(self.resource_failure(path)),
        }
    }

    /// The result for a path that can't take the attempted write or delete.
    fn resource_failure(&self, path: &str) -> CommandResult {
        if self.resources.contains(path) {
            CommandResult::invalid(messages::INVALID_ACTION)
        } else {
            CommandResult::failure(messages::NOT_FOUND)
        }
    }

    fn seek_to(&mut self, position: Micros) -> Result<CommandResult, PlayerError> {
        match self.seek_raw(position) {
            Ok(()) => {}
            Err(AudioError::NoAudio) => {
                return Ok(CommandResult::invalid(messages::CMD_NEEDS_LOADED))
            }
            Err(AudioError::Seek(message)) => {
                // To a client, seeking off the end and playing off the end
                // are the same thing.
                debug!("Seek to {} failed ({}), ending track", position, message);
                self.end();
            }
            Err(e) => return Err(e.into()),
        }
        Ok(CommandResult::Success)
    }

    fn seek_raw(&mut self, position: Micros) -> Result<(), AudioError> {
        self.file.seek(position)?;
        self.read_resource(paths::ELAPSED, ClientId::BROADCAST);
        Ok(())
    }

    fn end(&mut self) {
        if let Err(e) = self.change_playing(false) {
            warn!("Couldn't stop at end of track: {}", e);
        }

        // Must stay on the raw seek: seek_to ends the track when it fails.
        if let Err(e) = self.seek_raw(Micros::ZERO) {
            warn!("Couldn't rewind at end of track: {}", e);
        }

        self.respond(&Response::new(ResponseCode::End), ClientId::BROADCAST);
    }

    fn respond(&self, response: &Response, id: ClientId) {
        if let Some(sink) = &self.sink {
            sink.respond(response, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BrokenAudioSystem, FaultyAudioSystem, Fixture, RecordingSink};
    use assert_matches::assert_matches;
    use rstest::rstest;
    use std::time::Duration;

    fn loaded_listing(track: &str) -> Vec<String> {
        vec![
            "Directory / 2".to_string(),
            "Directory /control 1".to_string(),
            "STATE Stopped".to_string(),
            "Directory /player 2".to_string(),
            format!("FILE {}", track),
            "Directory /player/time 1".to_string(),
            "TIME 0".to_string(),
        ]
    }

    mod dispatch {
        use super::*;

        #[rstest]
        #[case(&[])]
        #[case(&["read"])]
        #[case(&["read", "t"])]
        #[case(&["read", "t", "/", "extra"])]
        #[case(&["write", "t", "/player/file"])]
        #[case(&["delete", "t"])]
        #[case(&["fly", "t", "/"])]
        #[case(&["READ", "t", "/"])]
        fn malformed_commands_are_invalid(#[case] words: &[&str]) {
            let mut fixture = Fixture::new();

            assert_eq!(
                fixture.run(words, 1),
                CommandResult::invalid(messages::CMD_INVALID)
            );
            assert!(fixture.sink.take().is_empty());
        }

        #[rstest]
        #[case(&["read", "t", "/nope"])]
        #[case(&["read", "t", "/player/"])]
        #[case(&["write", "t", "/nope", "x"])]
        #[case(&["write", "t", "", "x"])]
        #[case(&["delete", "t", "/nope"])]
        #[case(&["delete", "t", "/player/time/elapsed/deeper"])]
        fn unknown_paths_are_not_found(#[case] words: &[&str]) {
            let mut fixture = Fixture::loaded();

            assert_eq!(
                fixture.run(words, 1),
                CommandResult::failure(messages::NOT_FOUND)
            );
        }

        #[rstest]
        #[case(&["write", "t", "/", "x"])]
        #[case(&["write", "t", "/control", "x"])]
        #[case(&["write", "t", "/player", "x"])]
        #[case(&["write", "t", "/player/time", "0"])]
        #[case(&["delete", "t", "/"])]
        #[case(&["delete", "t", "/player"])]
        fn wrong_verb_for_existing_path_is_invalid(#[case] words: &[&str]) {
            let mut fixture = Fixture::loaded();

            assert_eq!(
                fixture.run(words, 1),
                CommandResult::invalid(messages::INVALID_ACTION)
            );
        }

        #[test]
        fn unknown_state_payload_is_invalid() {
            let mut fixture = Fixture::loaded();

            assert_eq!(
                fixture.run(&["write", "t", "/control/state", "Paused"], 1),
                CommandResult::invalid(messages::INVALID_PAYLOAD)
            );
            assert!(fixture.sink.take().is_empty());
        }

        #[test]
        fn direct_operations_match_dispatch() {
            let mut fixture = Fixture::new();

            assert_eq!(
                fixture.player.read("/nope", ClientId::new(1)),
                CommandResult::failure(messages::NOT_FOUND)
            );
            assert_eq!(
                fixture.player.write("/player", "x").unwrap(),
                CommandResult::invalid(messages::INVALID_ACTION)
            );
            assert_eq!(
                fixture.player.delete("/nope").unwrap(),
                CommandResult::failure(messages::NOT_FOUND)
            );
        }
    }

    mod reading {
        use super::*;

        #[test]
        fn welcome_sends_greeting_features_and_snapshot() {
            let mut fixture = Fixture::new();
            let client = ClientId::new(1);

            fixture.player.welcome(client);

            let received = fixture.sink.take();
            assert!(received.iter().all(|(id, _)| *id == client));
            let lines: Vec<&str> = received.iter().map(|(_, line)| line.as_str()).collect();
            assert_eq!(
                lines,
                [
                    "OHAI playd",
                    "FEATURES End FileLoad PlayStop Seek TimeReport",
                    "Directory / 2",
                    "Directory /control 1",
                    "STATE Ejected",
                    "Directory /player 2",
                    "Directory /player/time 1",
                ]
            );
        }

        #[test]
        fn directory_read_is_unicast_to_requester() {
            let mut fixture = Fixture::loaded();
            let client = ClientId::new(7);

            assert!(fixture.run(&["read", "t", "/player"], 7).is_success());

            let received = fixture.sink.take();
            assert!(received.iter().all(|(id, _)| *id == client));
            let lines: Vec<String> = received.into_iter().map(|(_, line)| line).collect();
            assert_eq!(
                lines,
                [
                    "Directory /player 2".to_string(),
                    format!("FILE {}", fixture.track),
                    "Directory /player/time 1".to_string(),
                    "TIME 0".to_string(),
                ]
            );
        }

        #[test]
        fn entry_read_goes_to_requester() {
            let mut fixture = Fixture::new();

            assert!(fixture.run(&["read", "t", "/control/state"], 2).is_success());
            assert_eq!(
                fixture.sink.take(),
                [(ClientId::new(2), "STATE Ejected".to_string())]
            );
        }

        #[test]
        fn empty_entry_reads_as_not_found() {
            let mut fixture = Fixture::new();

            assert_eq!(
                fixture.run(&["read", "t", "/player/file"], 2),
                CommandResult::failure(messages::NOT_FOUND)
            );
            assert!(fixture.sink.take().is_empty());
        }

        #[test]
        fn unicast_time_reads_are_never_throttled() {
            let mut fixture = Fixture::loaded();

            for _ in 0..3 {
                assert!(fixture.run(&["read", "t", "/player/time/elapsed"], 4).is_success());
            }
            assert_eq!(fixture.sink.take_lines(), ["TIME 0", "TIME 0", "TIME 0"]);
        }
    }

    mod loading {
        use super::*;

        #[test]
        fn load_announces_full_tree_to_everyone() {
            let mut fixture = Fixture::new();
            let track = fixture.track.clone();

            assert_eq!(
                fixture.run(&["write", "t", "/player/file", track.as_str()], 1),
                CommandResult::Success
            );

            let received = fixture.sink.take();
            assert!(received.iter().all(|(id, _)| id.is_broadcast()));
            let lines: Vec<String> = received.into_iter().map(|(_, line)| line).collect();
            assert_eq!(lines, loaded_listing(&track));
        }

        #[test]
        fn empty_path_is_invalid_and_keeps_track() {
            let mut fixture = Fixture::loaded();

            assert_eq!(
                fixture.run(&["write", "t", "/player/file", ""], 1),
                CommandResult::invalid(messages::LOAD_EMPTY_PATH)
            );
            assert!(fixture.sink.take().is_empty());

            assert!(fixture.run(&["read", "t", "/player/file"], 1).is_success());
            assert_eq!(
                fixture.sink.take_lines(),
                [format!("FILE {}", fixture.track)]
            );
        }

        #[test]
        fn missing_file_fails_and_leaves_nothing_loaded() {
            let mut fixture = Fixture::loaded();

            let result = fixture.run(&["write", "t", "/player/file", "/nonexistent/file"], 1);

            assert_matches!(result, CommandResult::Failure(message) => {
                assert!(message.contains("/nonexistent/file"), "{}", message);
            });
            assert_eq!(fixture.sink.take_lines(), ["STATE Ejected"]);
            assert_eq!(
                fixture.run(&["read", "t", "/player/file"], 1),
                CommandResult::failure(messages::NOT_FOUND)
            );
        }

        #[test]
        fn non_audio_file_fails() {
            let mut fixture = Fixture::new();
            let dir = tempfile::tempdir().unwrap();
            let notes = dir.path().join("notes.txt");
            std::fs::write(&notes, "not audio").unwrap();

            let result = fixture.player.load(&notes.display().to_string()).unwrap();

            assert_eq!(result, CommandResult::failure(messages::DECODE_NOAUDIO));
            assert_eq!(fixture.sink.take_lines(), ["STATE Ejected"]);
        }

        #[test]
        fn internal_load_error_is_fatal_and_ejects() {
            let mut player = Player::new(Box::new(BrokenAudioSystem));
            let sink = Arc::new(RecordingSink::default());
            player.attach_sink(sink.clone()).unwrap();

            let result = player.run_command(&["write", "t", "/player/file", "song.flac"], ClientId::new(1));

            assert_matches!(result, Err(PlayerError::Audio(AudioError::Internal(_))));
            assert_eq!(sink.take_lines(), ["STATE Ejected"]);
            assert!(player.is_running());
        }

        #[test]
        fn internal_transport_errors_are_fatal() {
            let mut player = Player::new(Box::new(FaultyAudioSystem));
            let sink = Arc::new(RecordingSink::default());
            player.attach_sink(sink.clone()).unwrap();
            let client = ClientId::new(1);

            assert!(player.load("song.flac").unwrap().is_success());
            sink.take();

            assert_matches!(
                player.run_command(&["write", "t", "/control/state", "Playing"], client),
                Err(PlayerError::Audio(AudioError::Internal(_)))
            );
            assert_matches!(
                player.run_command(&["write", "t", "/player/time/elapsed", "100"], client),
                Err(PlayerError::Audio(AudioError::Internal(_)))
            );
            assert_matches!(
                player.run_command(&["delete", "t", "/player/time/elapsed"], client),
                Err(PlayerError::Audio(AudioError::Internal(_)))
            );
            assert!(sink.take().is_empty());
            assert!(player.is_running());
        }

        #[test]
        fn reload_replaces_track() {
            let mut fixture = Fixture::loaded();
            let track = fixture.track.clone();

            assert!(fixture.player.load(&track).unwrap().is_success());

            assert_eq!(fixture.sink.take_lines(), loaded_listing(&track));
        }
    }

    mod playback {
        use super::*;

        #[test]
        fn play_and_stop_announce_state() {
            let mut fixture = Fixture::loaded();

            assert!(fixture.run(&["write", "t", "/control/state", "Playing"], 1).is_success());
            assert!(fixture.run(&["write", "t", "/control/state", "Stopped"], 1).is_success());

            assert_eq!(
                fixture.sink.take(),
                [
                    (ClientId::BROADCAST, "STATE Playing".to_string()),
                    (ClientId::BROADCAST, "STATE Stopped".to_string()),
                ]
            );
        }

        #[rstest]
        #[case("Playing")]
        #[case("Stopped")]
        fn play_state_needs_a_track(#[case] payload: &str) {
            let mut fixture = Fixture::new();

            assert_eq!(
                fixture.run(&["write", "t", "/control/state", payload], 1),
                CommandResult::invalid(messages::CMD_NEEDS_LOADED)
            );
            assert!(fixture.sink.take().is_empty());
        }

        #[test]
        fn eject_twice_succeeds_both_times() {
            let mut fixture = Fixture::loaded();

            assert_eq!(fixture.player.eject(), CommandResult::Success);
            assert_eq!(fixture.player.eject(), CommandResult::Success);

            assert_eq!(fixture.sink.take_lines(), ["STATE Ejected", "STATE Ejected"]);
            assert_eq!(
                fixture.run(&["read", "t", "/player/file"], 1),
                CommandResult::failure(messages::NOT_FOUND)
            );
        }

        #[test]
        fn writing_ejected_and_deleting_file_both_eject() {
            let mut fixture = Fixture::loaded();
            assert!(fixture.run(&["write", "t", "/control/state", "Ejected"], 1).is_success());
            assert_eq!(fixture.sink.take_lines(), ["STATE Ejected"]);

            let mut fixture = Fixture::loaded();
            assert!(fixture.run(&["delete", "t", "/player/file"], 1).is_success());
            assert_eq!(fixture.sink.take_lines(), ["STATE Ejected"]);
        }
    }

    mod seeking {
        use super::*;

        #[rstest]
        #[case("abc")]
        #[case("123abc")]
        #[case("")]
        #[case("-5")]
        #[case("1.5")]
        #[case(" 12")]
        fn unparseable_positions_are_invalid(#[case] position: &str) {
            let mut fixture = Fixture::loaded();

            assert_eq!(
                fixture.run(&["write", "t", "/player/time/elapsed", position], 1),
                CommandResult::invalid(messages::SEEK_INVALID_VALUE)
            );
            assert!(fixture.sink.take().is_empty());
        }

        #[test]
        fn seek_without_track_is_invalid() {
            let mut fixture = Fixture::new();

            assert_eq!(
                fixture.player.seek("123").unwrap(),
                CommandResult::invalid(messages::CMD_NEEDS_LOADED)
            );
            assert_eq!(
                fixture.run(&["delete", "t", "/player/time/elapsed"], 1),
                CommandResult::invalid(messages::CMD_NEEDS_LOADED)
            );
        }

        #[test]
        fn seek_announces_new_position() {
            let mut fixture = Fixture::loaded();

            assert!(fixture.run(&["write", "t", "/player/time/elapsed", "250000"], 1).is_success());

            assert_eq!(
                fixture.sink.take(),
                [(ClientId::BROADCAST, "TIME 250000".to_string())]
            );
        }

        #[test]
        fn delete_rewinds_to_zero() {
            let mut fixture = Fixture::loaded();
            fixture.player.seek("300000").unwrap();
            fixture.sink.take();

            assert!(fixture.run(&["delete", "t", "/player/time/elapsed"], 1).is_success());

            assert_eq!(fixture.sink.take_lines(), ["TIME 0"]);
        }

        #[test]
        fn seek_past_end_ends_the_track() {
            let mut fixture = Fixture::loaded();
            fixture.player.set_playing(true).unwrap();
            fixture.sink.take();

            assert_eq!(
                fixture.run(&["write", "t", "/player/time/elapsed", "5000000"], 1),
                CommandResult::Success
            );

            assert_eq!(
                fixture.sink.take_lines(),
                ["STATE Stopped", "TIME 0", "END"]
            );
            assert!(fixture.player.update());
            assert!(fixture.sink.take().is_empty());
        }
    }

    mod updating {
        use super::*;

        #[test]
        fn idle_player_says_nothing() {
            let mut fixture = Fixture::new();

            assert!(fixture.player.update());
            assert!(fixture.sink.take().is_empty());

            let mut fixture = Fixture::loaded();
            fixture.time.advance(Duration::from_secs(5));
            assert!(fixture.player.update());
            assert!(fixture.sink.take().is_empty());
        }

        #[test]
        fn playing_broadcasts_position_at_most_once_per_period() {
            let mut fixture = Fixture::loaded();
            fixture.player.set_playing(true).unwrap();
            fixture.sink.take();

            // Still in the half-second slot announced on load.
            fixture.time.advance(Duration::from_millis(100));
            assert!(fixture.player.update());
            assert!(fixture.sink.take().is_empty());

            fixture.time.advance(Duration::from_millis(500));
            assert!(fixture.player.update());
            assert_eq!(
                fixture.sink.take(),
                [(ClientId::BROADCAST, "TIME 600000".to_string())]
            );
        }

        #[test]
        fn reaching_the_end_stops_rewinds_and_announces() {
            let mut fixture = Fixture::loaded();
            fixture.player.set_playing(true).unwrap();
            fixture.sink.take();

            fixture.time.advance(Duration::from_millis(1200));
            assert!(fixture.player.update());

            assert_eq!(
                fixture.sink.take(),
                [
                    (ClientId::BROADCAST, "STATE Stopped".to_string()),
                    (ClientId::BROADCAST, "TIME 0".to_string()),
                    (ClientId::BROADCAST, "END".to_string()),
                ]
            );

            fixture.time.advance(Duration::from_secs(1));
            assert!(fixture.player.update());
            assert!(fixture.sink.take().is_empty());
        }
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn quitting_refuses_further_commands() {
            let mut fixture = Fixture::loaded();

            assert_eq!(
                fixture.run(&["write", "t", "/control/state", "Quitting"], 1),
                CommandResult::Success
            );
            assert!(!fixture.player.is_running());
            assert_eq!(fixture.sink.take_lines(), ["STATE Ejected"]);

            let closing = CommandResult::failure(messages::CMD_PLAYER_CLOSING);
            assert_eq!(fixture.run(&["read", "t", "/"], 1), closing);
            assert_eq!(fixture.run(&["bogus"], 1), closing);
            assert_eq!(fixture.player.read("/", ClientId::new(1)), closing);
            assert_eq!(fixture.player.write("/control/state", "Playing").unwrap(), closing);
            assert!(!fixture.player.update());
        }

        #[test]
        fn direct_transport_calls_are_refused_after_quit() {
            let mut fixture = Fixture::new();
            let track = fixture.track.clone();
            fixture.player.quit();
            fixture.sink.take();

            let closing = CommandResult::failure(messages::CMD_PLAYER_CLOSING);
            assert_eq!(fixture.player.load(&track).unwrap(), closing);
            assert_eq!(fixture.player.set_playing(true).unwrap(), closing);
            assert_eq!(fixture.player.seek("0").unwrap(), closing);
            assert_eq!(fixture.player.delete("/player/file").unwrap(), closing);

            assert!(fixture.sink.take().is_empty());
            assert!(!fixture.player.update());
            assert!(fixture.sink.take().is_empty());
        }

        #[test]
        fn deleting_state_quits() {
            let mut fixture = Fixture::new();

            assert!(fixture.run(&["delete", "t", "/control/state"], 1).is_success());

            assert!(!fixture.player.is_running());
        }

        #[test]
        fn quit_still_ejects_when_repeated() {
            let mut fixture = Fixture::new();

            assert_eq!(fixture.player.quit(), CommandResult::Success);
            assert_eq!(fixture.player.quit(), CommandResult::Success);

            assert_eq!(fixture.sink.take_lines(), ["STATE Ejected", "STATE Ejected"]);
        }

        #[test]
        fn works_without_a_sink() {
            let time = clock::ManualTimeSource::new();
            let audio = playback_engine::SymphoniaAudioSystem::new(time, Micros::from_millis(500));
            let mut player = Player::new(Box::new(audio));

            player.welcome(ClientId::new(1));
            assert!(player.eject().is_success());
            assert!(player.update());
            assert_eq!(
                player.run_command(&["read", "t", "/"], ClientId::new(1)).unwrap(),
                CommandResult::Success
            );
        }

        #[test]
        fn sink_attaches_once() {
            let mut fixture = Fixture::new();

            let result = fixture.player.attach_sink(Arc::new(RecordingSink::default()));

            assert_matches!(result, Err(PlayerError::SinkAlreadyAttached));
        }
    }
}
