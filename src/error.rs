//! Error handling for the ordered-collections library
//!
//! Every fallible operation returns [`Result`]. Malformed-input variants carry the
//! byte or character offset reached so callers can diagnose or resume decoding.

use thiserror::Error;

/// Main error type for the ordered-collections library
#[derive(Error, Debug)]
pub enum CollectionError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing type descriptor, null key or a value that does not match its descriptor
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message describing the issue
        message: String,
    },

    /// Index out of bounds access
    #[error("Out of bounds: index {index}, size {size}")]
    OutOfBounds {
        /// The invalid index
        index: usize,
        /// The valid size/length
        size: usize,
    },

    /// Memory allocation failures
    #[error("Memory allocation failed: requested {size} slots")]
    OutOfMemory {
        /// Number of slots requested
        size: usize,
    },

    /// Wire-format input that cannot be decoded
    #[error("Corrupt input at byte {position}: {message}")]
    Corrupt {
        /// Offset where decoding stopped
        position: usize,
        /// Error message describing the corruption
        message: String,
    },

    /// Input ended before a complete item could be read
    #[error("Truncated input at byte {position}: needed {needed} bytes, {available} available")]
    Truncated {
        /// Offset where decoding stopped
        position: usize,
        /// Bytes required by the item being read
        needed: usize,
        /// Bytes left in the input
        available: usize,
    },

    /// Malformed JSON text
    #[error("JSON error at offset {position}: {message}")]
    Json {
        /// Offset into the text where parsing failed
        position: usize,
        /// Parser message
        message: String,
    },

    /// Malformed XML text
    #[error("XML error at offset {position}: {message}")]
    Xml {
        /// Offset into the text where parsing failed
        position: usize,
        /// Parser message
        message: String,
    },

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },

    /// Resource already in use or locked
    #[error("Resource busy: {resource}")]
    ResourceBusy {
        /// Description of the busy resource
        resource: String,
    },
}

impl CollectionError {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument { message: message.into() }
    }

    /// Create an out of bounds error
    pub fn out_of_bounds(index: usize, size: usize) -> Self {
        Self::OutOfBounds { index, size }
    }

    /// Create an out of memory error
    pub fn out_of_memory(size: usize) -> Self {
        Self::OutOfMemory { size }
    }

    /// Create a corrupt input error
    pub fn corrupt<S: Into<String>>(position: usize, message: S) -> Self {
        Self::Corrupt { position, message: message.into() }
    }

    /// Create a truncated input error
    pub fn truncated(position: usize, needed: usize, available: usize) -> Self {
        Self::Truncated { position, needed, available }
    }

    /// Create a JSON parse error
    pub fn json<S: Into<String>>(position: usize, message: S) -> Self {
        Self::Json { position, message: message.into() }
    }

    /// Create an XML parse error
    pub fn xml<S: Into<String>>(position: usize, message: S) -> Self {
        Self::Xml { position, message: message.into() }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a resource busy error
    pub fn resource_busy<S: Into<String>>(resource: S) -> Self {
        Self::ResourceBusy { resource: resource.into() }
    }

    /// Offset reached when decoding or parsing failed, if this is a malformed-input error
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Corrupt { position, .. }
            | Self::Truncated { position, .. }
            | Self::Json { position, .. }
            | Self::Xml { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Shift the recorded offset of a malformed-input error by `base`.
    ///
    /// Nested decoders report offsets relative to their own slice; the caller
    /// rebases them onto the enclosing buffer.
    pub fn offset_by(self, base: usize) -> Self {
        match self {
            Self::Corrupt { position, message } => Self::Corrupt { position: position + base, message },
            Self::Truncated { position, needed, available } => {
                Self::Truncated { position: position + base, needed, available }
            }
            Self::Json { position, message } => Self::Json { position: position + base, message },
            Self::Xml { position, message } => Self::Xml { position: position + base, message },
            other => other,
        }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::OutOfMemory { .. } => true,
            Self::ResourceBusy { .. } => true,
            Self::InvalidArgument { .. } => false,
            Self::OutOfBounds { .. } => false,
            Self::Corrupt { .. } => false,
            Self::Truncated { .. } => false,
            Self::Json { .. } => false,
            Self::Xml { .. } => false,
            Self::Configuration { .. } => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::InvalidArgument { .. } => "argument",
            Self::OutOfBounds { .. } => "bounds",
            Self::OutOfMemory { .. } => "memory",
            Self::Corrupt { .. } | Self::Truncated { .. } => "data",
            Self::Json { .. } => "json",
            Self::Xml { .. } => "xml",
            Self::Configuration { .. } => "config",
            Self::ResourceBusy { .. } => "resource",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CollectionError>;

/// Assert that an index is within bounds
#[inline]
pub fn check_bounds(index: usize, size: usize) -> Result<()> {
    if index >= size {
        Err(CollectionError::out_of_bounds(index, size))
    } else {
        Ok(())
    }
}
