//! Human-readable strings sent to clients.

/// Greeting carried by `OHAI` when a client attaches.
pub const OHAI: &str = "playd";

/// Capabilities announced by `FEATURES`, in announcement order.
pub const FEATURES: [&str; 5] = ["End", "FileLoad", "PlayStop", "Seek", "TimeReport"];

pub const CMD_INVALID: &str = "Bad command or file name";
pub const CMD_NEEDS_LOADED: &str = "Command requires a loaded file";
pub const CMD_PLAYER_CLOSING: &str = "Player is closing";

pub const NOT_FOUND: &str = "Resource not found";
pub const INVALID_ACTION: &str = "Resource does not support that action";
pub const INVALID_PAYLOAD: &str = "Invalid payload";
pub const LINE_TOO_LONG: &str = "Command line too long";

pub const LOAD_EMPTY_PATH: &str = "Command requires a non-empty path";

pub const SEEK_INVALID_VALUE: &str = "Seek position is not a valid number";
pub const SEEK_FAIL: &str = "Seek failed";

pub const DECODE_FAIL: &str = "Decoding failure";
pub const DECODE_NOAUDIO: &str = "This doesn't seem to be an audio file";
pub const DECODE_NOSTREAM: &str = "Couldn't acquire stream";
pub const DECODE_NOCODEC: &str = "Couldn't acquire codec";
pub const DECODE_BADRATE: &str = "Unsupported or invalid sample rate";
