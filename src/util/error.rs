//! Error types for the asset-schema library.

use std::path::PathBuf;
use thiserror::Error;

use super::ScalarType;

/// Main error type for decode/encode operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Cursor ran past the end of the content
    #[error("Unexpected end of data at offset {offset}: need {requested} bytes, content is {size} bytes")]
    UnexpectedEof {
        offset: usize,
        requested: usize,
        size: usize,
    },

    /// Invalid data structure in a binary asset
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    /// Joint chain decoded a different number of joints than declared
    #[error("Joint count mismatch: header declares {declared}, chains contain {decoded}")]
    JointCountMismatch { declared: usize, decoded: usize },

    /// Nesting exceeded the configured depth limit
    #[error("Nesting depth limit of {limit} exceeded")]
    DepthLimit { limit: usize },

    /// Enum token has no entry in the enum's value table
    #[error("Unknown {enum_name} value: {key:?}")]
    UnknownEnumKey { enum_name: &'static str, key: String },

    /// Field name is not part of a record's schema
    #[error("{type_name} has no field named {key:?}")]
    UnknownField { type_name: &'static str, key: String },

    /// Destination cannot hold the kind of value found in the source
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// No array decoding strategy applies to the destination
    #[error("Cannot decode an array into {destination}")]
    NoArrayStrategy { destination: &'static str },

    /// Number does not fit the destination scalar type
    #[error("Value {value} is out of range for {target}")]
    NumericRange { value: String, target: ScalarType },

    /// Element count does not match a fixed extent
    #[error("Extent mismatch: expected {expected} elements, got {actual}")]
    ExtentMismatch { expected: usize, actual: usize },

    /// Output window is too small; `required` is the full encoded length
    #[error("Output buffer too small: need {required} bytes, have {capacity}")]
    BufferTooSmall { required: usize, capacity: usize },

    /// INI supports exactly one level of section nesting
    #[error("INI section [{section}] contains nested record {field:?}")]
    IniNesting { section: String, field: String },

    /// Value kind is not representable in the target format
    #[error("Unsupported in {format}: {what}")]
    Unsupported { format: &'static str, what: String },

    /// PNG color type or bit depth outside RGB/RGBA 1..16
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// Malformed text input
    #[error("Syntax error at {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// Failure while decoding a specific content
    #[error("{}: {source}", path.display())]
    InContent {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error from the tree collaborator
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// PNG decode error from the image collaborator
    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create a type mismatch error.
    pub fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an unsupported-value error for a codec.
    pub fn unsupported(format: &'static str, what: impl Into<String>) -> Self {
        Self::Unsupported {
            format,
            what: what.into(),
        }
    }

    /// Attach the source path of the content being decoded.
    pub fn in_content(self, path: impl Into<PathBuf>) -> Self {
        match self {
            e @ Self::InContent { .. } => e,
            e => Self::InContent {
                path: path.into(),
                source: Box::new(e),
            },
        }
    }

    /// Bytes missing from an undersized output window, if this is a
    /// [`Error::BufferTooSmall`].
    pub fn additional(&self) -> Option<usize> {
        match self {
            Self::BufferTooSmall { required, capacity } => Some(required - capacity),
            _ => None,
        }
    }

    /// Byte offset of the failure for cursor errors, looking through
    /// [`Error::InContent`].
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::UnexpectedEof { offset, .. } | Self::Syntax { offset, .. } => Some(*offset),
            Self::InContent { source, .. } => source.offset(),
            _ => None,
        }
    }
}

/// Result type alias for asset-schema operations.
pub type Result<T> = std::result::Result<T, Error>;
