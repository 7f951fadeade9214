//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from internal
//! error types to the unified Error type.

use super::types::Error;
use crate::common::binary::BinaryError;
use crate::ole::OleError;

impl From<OleError> for Error {
    fn from(err: OleError) -> Self {
        match err {
            OleError::Io(e) => Error::Io(e),
            OleError::StreamNotFound(path) => Error::StreamNotFound(path),
            other => Error::MalformedContainer(other.to_string()),
        }
    }
}

impl From<BinaryError> for Error {
    fn from(err: BinaryError) -> Self {
        Error::MalformedContainer(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ole_errors_map_to_taxonomy() {
        let err = Error::from(OleError::NotOleFile);
        assert!(matches!(err, Error::MalformedContainer(_)));

        let err = Error::from(OleError::StreamNotFound("DocInfo".to_string()));
        assert!(matches!(err, Error::StreamNotFound(ref p) if p == "DocInfo"));
        assert!(err.is_malformed());

        let io = std::io::Error::other("disk gone");
        assert!(matches!(Error::from(OleError::Io(io)), Error::Io(_)));
    }

    #[test]
    fn test_binary_error_is_malformed() {
        let err = Error::from(BinaryError::InsufficientData {
            expected: 4,
            available: 2,
        });
        assert!(err.is_malformed());
        assert!(err.to_string().contains("expected 4"));
    }
}
