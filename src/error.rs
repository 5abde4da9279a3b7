//! Error types for termscene.

use crate::scene::NodeId;
use std::fmt;
use std::io;

/// Result type alias for termscene operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for termscene operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error from terminal operations.
    Io(io::Error),
    /// Invalid color format (e.g., malformed hex string).
    InvalidColor(String),
    /// Buffer dimension error (e.g., zero width/height).
    InvalidDimensions { width: u32, height: u32 },
    /// The element catalogue has no entry for this kind.
    UnknownElement(String),
    /// A property value that cannot be interpreted for the named property.
    InvalidProperty { name: String, value: String },
    /// The layout solver rejected an operation.
    Layout(taffy::TaffyError),
    /// A node handle that no longer refers to a live node.
    NodeNotFound(NodeId),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidColor(s) => write!(f, "invalid color format: {s}"),
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid dimensions: {width}x{height}")
            }
            Self::UnknownElement(kind) => write!(f, "unknown element kind: {kind}"),
            Self::InvalidProperty { name, value } => {
                write!(f, "invalid value for property {name}: {value}")
            }
            Self::Layout(e) => write!(f, "layout error: {e}"),
            Self::NodeNotFound(id) => write!(f, "node {id} does not exist"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Layout(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<taffy::TaffyError> for Error {
    fn from(e: taffy::TaffyError) -> Self {
        Self::Layout(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidColor("not-a-color".to_string());
        assert!(err.to_string().contains("invalid color format"));

        let err = Error::InvalidDimensions {
            width: 0,
            height: 100,
        };
        assert!(err.to_string().contains("0x100"));

        let err = Error::UnknownElement("canvas".to_string());
        assert_eq!(err.to_string(), "unknown element kind: canvas");

        let err = Error::InvalidProperty {
            name: "width".to_string(),
            value: "wide".to_string(),
        };
        assert!(err.to_string().contains("width"));
        assert!(err.to_string().contains("wide"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_layout_error_conversion() {
        let err: Error = taffy::TaffyError::ChildIndexOutOfBounds {
            parent: taffy::NodeId::from(0_u64),
            child_index: 3,
            child_count: 1,
        }
        .into();
        assert!(matches!(err, Error::Layout(_)));
        assert!(err.to_string().starts_with("layout error"));
    }
}
