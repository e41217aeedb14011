//! Resource paths with special meaning to the player.

pub const ROOT: &str = "/";
pub const CONTROL: &str = "/control";
pub const STATE: &str = "/control/state";
pub const PLAYER: &str = "/player";
pub const FILE: &str = "/player/file";
pub const TIME: &str = "/player/time";
pub const ELAPSED: &str = "/player/time/elapsed";
