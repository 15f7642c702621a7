//! Error types for the page transformation engine.
//!
//! Every failure surfaced by the engine falls into one of four kinds:
//!
//! - [`ErrorKind::InvalidInput`]: the caller sent something the engine rejects
//!   (empty file, wrong content type, ceilings exceeded, bad page index, ...)
//! - [`ErrorKind::CorruptedDocument`]: the bytes could not be parsed as a PDF
//!   and the parser reported structural damage
//! - [`ErrorKind::ResourceExhausted`]: memory ran out while processing
//! - [`ErrorKind::ServiceFailure`]: anything else
//!
//! Low-level failures are routed through [`Error::classify`], which inspects the
//! message of the underlying error for damage and allocation markers.

use std::collections::TryReserveError;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Markers in a parser message that indicate a damaged input file.
const CORRUPTION_MARKERS: &[&str] = &[
    "corrupt",
    "damaged",
    "invalid file header",
    "invalid file trailer",
    "trailer",
    "xref",
    "cross reference",
    "cross-reference",
    "parse error",
    "failed to parse",
    "unexpected end",
    "end of file",
    "invalid stream",
    "invalid object",
];

/// Markers in a message that indicate memory exhaustion.
const EXHAUSTION_MARKERS: &[&str] = &[
    "out of memory",
    "memory allocation",
    "capacity overflow",
    "allocation failed",
];

/// Coarse error category, stable across message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected input; the caller must change the request.
    InvalidInput,
    /// The document bytes are damaged.
    CorruptedDocument,
    /// The document is too complex to process with the available memory.
    ResourceExhausted,
    /// Unexpected internal or I/O failure.
    ServiceFailure,
}

/// Error types that can occur while transforming documents.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request or the uploaded file was rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The document could not be parsed because its structure is damaged.
    #[error("Corrupted document: {0}")]
    CorruptedDocument(String),

    /// Processing ran out of memory; the output cannot be trusted.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Any other failure, wrapped with the original message.
    #[error("Service failure: {0}")]
    ServiceFailure(String),
}

impl Error {
    /// Shorthand for an [`Error::InvalidInput`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    /// Error for a 1-based page index outside `[1, page_count]`.
    pub fn page_out_of_range(page: u32, page_count: u32) -> Self {
        Error::InvalidInput(format!(
            "Page {} out of range (document has {} pages)",
            page, page_count
        ))
    }

    /// Classify a low-level failure message.
    ///
    /// Allocation markers win over damage markers: a parser that ran out of
    /// memory half-way through a file often also reports an unexpected end.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();

        if EXHAUSTION_MARKERS.iter().any(|m| lower.contains(m)) {
            Error::ResourceExhausted(message)
        } else if CORRUPTION_MARKERS.iter().any(|m| lower.contains(m)) {
            Error::CorruptedDocument(message)
        } else {
            Error::ServiceFailure(message)
        }
    }

    /// Classify a failure to load document bytes.
    ///
    /// Loading reads from memory, so anything but exhaustion means the bytes
    /// are not a readable PDF.
    pub fn load_failure(err: lopdf::Error) -> Self {
        match Error::classify(err.to_string()) {
            Error::ServiceFailure(message) => Error::CorruptedDocument(message),
            other => other,
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::CorruptedDocument(_) => ErrorKind::CorruptedDocument,
            Error::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
            Error::ServiceFailure(_) => ErrorKind::ServiceFailure,
        }
    }

    /// HTTP status the upstream service should answer with.
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::InvalidInput => 400,
            ErrorKind::CorruptedDocument => 422,
            ErrorKind::ResourceExhausted => 413,
            ErrorKind::ServiceFailure => 500,
        }
    }

    /// Whether the caller can fix this by sending a smaller or cleaner file.
    pub fn is_user_actionable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::ServiceFailure)
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::classify(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::OutOfMemory => Error::ResourceExhausted(err.to_string()),
            std::io::ErrorKind::UnexpectedEof => Error::CorruptedDocument(err.to_string()),
            _ => Error::classify(err.to_string()),
        }
    }
}

impl From<TryReserveError> for Error {
    fn from(err: TryReserveError) -> Self {
        Error::ResourceExhausted(format!("memory allocation failed: {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::ServiceFailure(err.to_string())
        } else {
            Error::InvalidInput(format!("malformed JSON: {}", err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message() {
        let err = Error::invalid("file is empty");
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid input"));
        assert!(msg.contains("file is empty"));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_page_out_of_range() {
        let err = Error::page_out_of_range(7, 5);
        let msg = format!("{}", err);
        assert!(msg.contains("Page 7"));
        assert!(msg.contains("5 pages"));
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn test_classify_corruption() {
        let err = Error::classify("Invalid cross reference table");
        assert_eq!(err.kind(), ErrorKind::CorruptedDocument);

        let err = Error::classify("invalid file header");
        assert_eq!(err.kind(), ErrorKind::CorruptedDocument);

        let err = Error::classify("Document is damaged beyond repair");
        assert_eq!(err.kind(), ErrorKind::CorruptedDocument);
    }

    #[test]
    fn test_classify_exhaustion_wins() {
        let err = Error::classify("parse aborted: out of memory");
        assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
        assert_eq!(err.http_status(), 413);
    }

    #[test]
    fn test_classify_other() {
        let err = Error::classify("permission denied");
        assert_eq!(err.kind(), ErrorKind::ServiceFailure);
        assert!(!err.is_user_actionable());
        assert!(format!("{}", err).contains("permission denied"));
    }

    #[test]
    fn test_classify_ignores_incidental_words() {
        for message in [
            "failed to write response header",
            "could not parse config value",
            "peer closed connection before EOF",
        ] {
            assert_eq!(Error::classify(message).kind(), ErrorKind::ServiceFailure);
        }
    }

    #[test]
    fn test_io_out_of_memory() {
        let io = std::io::Error::new(std::io::ErrorKind::OutOfMemory, "no room");
        assert_eq!(Error::from(io).kind(), ErrorKind::ResourceExhausted);
    }

    #[test]
    fn test_try_reserve_error() {
        let mut v: Vec<u8> = Vec::new();
        let err = v.try_reserve(usize::MAX).unwrap_err();
        assert_eq!(Error::from(err).kind(), ErrorKind::ResourceExhausted);
    }

    #[test]
    fn test_json_error_is_invalid_input() {
        let err = serde_json::from_str::<Vec<u32>>("{not json").unwrap_err();
        assert_eq!(Error::from(err).kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
