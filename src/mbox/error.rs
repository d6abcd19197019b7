//! Error types for archive formatting.

/// Result type alias for archive formatting.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that abort formatting of a single message.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The raw message could not be turned into a readable message.
    #[error("message body unavailable: {0}")]
    ParseUnavailable(String),

    /// The output sink rejected a write.
    #[error("write to archive failed: {0}")]
    Io(#[from] std::io::Error),

    /// The attachment declares a transfer encoding with no encoder.
    #[error("unsupported transfer encoding: {0}")]
    UnsupportedEncoding(String),

    /// A text payload is not valid UTF-8.
    #[error("text payload is not valid UTF-8")]
    NonUtf8Body,

    /// A header needed for the envelope line is absent.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),
}

impl From<mailparse::MailParseError> for ArchiveError {
    fn from(err: mailparse::MailParseError) -> Self {
        Self::ParseUnavailable(err.to_string())
    }
}
