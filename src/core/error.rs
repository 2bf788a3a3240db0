// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for fastcdr.
//!
//! Every failure of the CDR engine is one of two kinds:
//! - [`CodecError::InsufficientSpace`] - the buffer cannot hold (or does not
//!   contain) the bytes an operation needs
//! - [`CodecError::InvalidEncoding`] - a decoded value falls outside its
//!   closed domain

use thiserror::Error;

/// Errors that can occur while serializing or deserializing CDR data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Not enough bytes in the buffer, and growing it was impossible.
    #[error(
        "Not enough memory: requested {requested} bytes at position {position}, but only {available} bytes available"
    )]
    InsufficientSpace {
        /// Requested bytes (including alignment padding)
        requested: usize,
        /// Bytes left between the cursor and the end of the buffer
        available: usize,
        /// Cursor position when the error occurred
        position: usize,
    },

    /// A decoded value violates its domain.
    #[error("Invalid encoding in {context}: {message}")]
    InvalidEncoding {
        /// Operation that rejected the value
        context: String,
        /// Error message
        message: String,
    },
}

impl CodecError {
    /// Create an insufficient space error.
    pub fn insufficient_space(requested: usize, available: usize, position: usize) -> Self {
        CodecError::InsufficientSpace {
            requested,
            available,
            position,
        }
    }

    /// Create an invalid encoding error.
    pub fn invalid_encoding(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::InvalidEncoding {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Check whether this is an [`CodecError::InsufficientSpace`] error.
    pub fn is_insufficient_space(&self) -> bool {
        matches!(self, CodecError::InsufficientSpace { .. })
    }

    /// Check whether this is an [`CodecError::InvalidEncoding`] error.
    pub fn is_invalid_encoding(&self) -> bool {
        matches!(self, CodecError::InvalidEncoding { .. })
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::InsufficientSpace {
                requested,
                available,
                position,
            } => vec![
                ("requested", requested.to_string()),
                ("available", available.to_string()),
                ("position", position.to_string()),
            ],
            CodecError::InvalidEncoding { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
        }
    }
}

/// Result type for fastcdr operations.
pub type Result<T> = std::result::Result<T, CodecError>;
