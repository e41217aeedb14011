mod error;
mod player;
mod resources;
#[cfg(test)]
mod testing;

pub use error::PlayerError;
pub use player::Player;
pub use resources::{Node, ResourceTree, RESOURCES};
