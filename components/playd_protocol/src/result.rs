use crate::response::{Response, ResponseCode};

/// Outcome of a command that did not hit a fatal error.
///
/// `Invalid` means the client asked for something that cannot work (its bug);
/// `Failure` means a well-formed request failed at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Success,
    Invalid(String),
    Failure(String),
}

impl CommandResult {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The response telling the requester how `command` went.
    ///
    /// Successes echo the command words back, which carries the tag.
    pub fn to_response<S: AsRef<str>>(&self, command: &[S]) -> Response {
        match self {
            Self::Success => Response::new(ResponseCode::Okay)
                .with_args(command.iter().map(|word| word.as_ref().to_owned())),
            Self::Invalid(message) => Response::new(ResponseCode::What).with_arg(message.as_str()),
            Self::Failure(message) => Response::new(ResponseCode::Fail).with_arg(message.as_str()),
        }
    }
}
