//! Error types for the brain file codec.

use babbler_store::StoreError;
use thiserror::Error;

/// Errors that can occur while encoding or decoding a brain file.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Underlying file I/O failed (including truncated files).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Store operation failed while persisting or walking the tree.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// The file is not a valid brain file: bad magic, wrong reserved token
    /// text, or an out-of-range field during decode.
    #[error("corrupt brain file: {0}")]
    Corrupt(String),

    /// The brain does not fit the chosen format. An encode-time refusal,
    /// never a decode-time failure.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),
}

/// Convenience type alias for codec results.
pub type Result<T> = std::result::Result<T, CodecError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_display() {
        let err = CodecError::Corrupt("bad magic".into());
        assert_eq!(err.to_string(), "corrupt brain file: bad magic");
    }

    #[test]
    fn capacity_display() {
        let err = CodecError::CapacityExceeded("dictionary too large".into());
        assert!(err.to_string().contains("capacity exceeded"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: CodecError = io.into();
        assert!(matches!(err, CodecError::Io(_)));
    }

    #[test]
    fn store_error_converts() {
        let err: CodecError = StoreError::InvalidArgument("x".into()).into();
        assert!(matches!(err, CodecError::Store(_)));
    }
}
