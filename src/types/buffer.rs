// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Byte buffers the CDR engine reads from and writes into.
//!
//! The engine only needs three things from a buffer: the byte region, its
//! length (the end-of-buffer cursor) and a way to grow it. [`CdrBuffer`]
//! captures that contract; [`FastBuffer`] is the default implementation.

use crate::core::CdrConfig;

/// Size of the first allocation of an internal buffer, and the minimum
/// step by which it grows afterwards.
pub const BUFFER_START_LENGTH: usize = 200;

/// Growable byte region used by the CDR engine.
///
/// Implementations may relocate their storage when growing. The engine only
/// keeps offsets into the region, so relocation is transparent to it.
pub trait CdrBuffer {
    /// The whole byte region, from the origin to the end of the buffer.
    fn as_slice(&self) -> &[u8];

    /// Mutable view of the whole byte region.
    fn as_mut_slice(&mut self) -> &mut [u8];

    /// Length of the byte region (the end-of-buffer cursor).
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Check if the byte region is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grow the region by at least `min_size_inc` bytes.
    ///
    /// Returns `false`, leaving the buffer untouched, when the buffer cannot
    /// grow.
    fn resize(&mut self, min_size_inc: usize) -> bool;
}

/// Contiguous byte buffer backing a CDR stream.
///
/// An *internal* buffer owns its storage and grows on demand; an *external*
/// buffer wraps bytes handed over by the caller (typically a received
/// message) and never grows.
///
/// # Example
///
/// ```
/// use fastcdr::types::{CdrBuffer, FastBuffer};
///
/// let mut buffer = FastBuffer::new();
/// assert!(buffer.resize(4));
/// assert_eq!(buffer.len(), 200);
///
/// let mut received = FastBuffer::from_vec(vec![0x00, 0x01]);
/// assert!(!received.resize(4));
/// ```
#[derive(Clone, PartialEq, Eq, Default)]
pub struct FastBuffer {
    /// The byte region
    data: Vec<u8>,
    /// Whether the storage is owned and may grow
    internal: bool,
    /// Upper bound on the region length for internal buffers
    max_size: Option<usize>,
}

impl FastBuffer {
    /// Create an empty internal buffer. The first write allocates it.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            internal: true,
            max_size: None,
        }
    }

    /// Create an internal buffer with `capacity` zeroed bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            internal: true,
            max_size: None,
        }
    }

    /// Wrap caller-provided bytes. The buffer never grows.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data,
            internal: false,
            max_size: None,
        }
    }

    /// Create an internal buffer as described by `config`.
    pub fn from_config(config: &CdrConfig) -> Self {
        let mut buffer = Self::with_capacity(config.initial_capacity);
        buffer.max_size = config.max_buffer_size;
        buffer
    }

    /// Limit the size this buffer may grow to.
    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Check if the buffer owns its storage and may grow.
    #[inline]
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// Get the growth limit, if any.
    #[inline]
    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    /// Consume the buffer and return its bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Hex dump of the first `len` bytes, for diagnostics.
    pub fn to_hex(&self, len: usize) -> String {
        hex::encode(&self.data[..len.min(self.data.len())])
    }
}

impl CdrBuffer for FastBuffer {
    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn resize(&mut self, min_size_inc: usize) -> bool {
        if !self.internal {
            return false;
        }

        let current = self.data.len();
        let Some(required) = current.checked_add(min_size_inc) else {
            return false;
        };
        let mut new_len = current.saturating_add(min_size_inc.max(BUFFER_START_LENGTH));

        if let Some(max) = self.max_size {
            if required > max {
                tracing::debug!(current, min_size_inc, max, "buffer growth refused by size limit");
                return false;
            }
            new_len = new_len.min(max);
        }

        self.data.resize(new_len, 0);
        true
    }
}

impl CdrBuffer for Vec<u8> {
    #[inline]
    fn as_slice(&self) -> &[u8] {
        self
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        self
    }

    fn resize(&mut self, min_size_inc: usize) -> bool {
        let Some(new_len) = self
            .len()
            .checked_add(min_size_inc.max(BUFFER_START_LENGTH))
        else {
            return false;
        };
        Vec::resize(self, new_len, 0);
        true
    }
}

impl AsRef<[u8]> for FastBuffer {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for FastBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastBuffer")
            .field("len", &self.data.len())
            .field("internal", &self.internal)
            .field("max_size", &self.max_size)
            .finish()
    }
}
