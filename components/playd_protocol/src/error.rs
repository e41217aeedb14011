use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("Unterminated quote")]
    UnterminatedQuote,

    #[error("Dangling escape at end of line")]
    DanglingEscape,
}
