use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("The file's magic value does not match the expectation {magic}")]
    InvalidMagicValue { magic: u32 },

    #[error("Unsupported file version {version}")]
    UnsupportedVersion { version: u32 },

    #[error("The file is violating the expected format, because: {reason}")]
    FormatError { reason: String },

    /// A record or chunk ends before all of its fields could be read.
    #[error("Truncated record while reading {context}")]
    Truncated { context: String },

    /// An index stored in the file points outside of the table it refers to.
    #[error("{what} index {index} is out of range (table has {len} entries) in {context}")]
    InvalidReference {
        what: &'static str,
        index: i64,
        len: usize,
        context: String,
    },

    #[error("Unbalanced braces at line {line}: {reason}")]
    UnbalancedBraces { line: usize, reason: String },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    UTF8ConversationError(#[from] std::string::FromUtf8Error),
}

impl ParserError {
    pub(crate) fn format(reason: impl Into<String>) -> Self {
        ParserError::FormatError { reason: reason.into() }
    }

    /// Turns a bare end-of-input error into [`ParserError::Truncated`], naming what was being read.
    pub(crate) fn truncated_in(self, context: impl FnOnce() -> String) -> Self {
        match self {
            ParserError::IOError(internal) if internal.kind() == std::io::ErrorKind::UnexpectedEof => {
                ParserError::Truncated { context: context() }
            }
            err => err,
        }
    }
}

pub mod cfg;
pub mod common;
pub mod mu;
