mod error;
pub mod messages;
pub mod paths;
mod response;
mod result;
mod sink;
mod tokenizer;

pub use error::TokenizeError;
pub use response::{Response, ResponseCode};
pub use result::CommandResult;
pub use sink::{ClientId, ResponseSink};
pub use tokenizer::tokenize;
