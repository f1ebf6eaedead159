pub mod lines;
pub mod matcher;
pub mod patch;
pub mod unified;

pub use lines::split_lines;
pub use matcher::SequenceMatcher;

use thiserror::Error;

/// Everything that can go wrong while rendering, parsing or applying a
/// patch. Matching and grouping never fail; the fallible surfaces are the
/// caller-supplied sink and patch text coming from outside.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("failed to write diff output")]
    Io(#[from] std::io::Error),
    #[error("diff output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("invalid patch format: {0}")]
    InvalidFormat(String),
    #[error("unexpected token: {0}")]
    UnexpectedToken(String),
    #[error("context mismatch at line {line}: expected {expected:?}, found {found:?}")]
    ContextMismatch {
        line: usize,
        expected: String,
        found: String,
    },
}
