// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR stream engine: cursor state, alignment, byte order and buffer growth.
//!
//! The serialize and deserialize operations live in the `encoder` and
//! `decoder` modules; encapsulation framing lives in `encapsulation`. They
//! all drive the [`Cdr`] engine defined here.

use crate::core::{CdrConfig, CodecError, Endianness, Result as CoreResult};
use crate::types::{CdrBuffer, FastBuffer};

use super::encapsulation::{CdrType, DdsCdrPlFlag};

/// Snapshot of the engine's cursor.
///
/// Taken before any operation that may fail halfway, and written back with
/// [`Cdr::set_state`] to undo it.
///
/// - `current_position`: next byte to read or write
/// - `align_position`: origin for alignment, `(current - align) % size`
/// - `swap_bytes`: whether multi-byte values are byte-reversed
/// - `last_data_size`: width of the last primitive processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdrState {
    pub(crate) current_position: usize,
    pub(crate) align_position: usize,
    pub(crate) swap_bytes: bool,
    pub(crate) last_data_size: usize,
}

impl CdrState {
    /// Offset of the cursor from the buffer origin.
    #[inline]
    pub fn current_position(&self) -> usize {
        self.current_position
    }

    /// Offset of the alignment origin from the buffer origin.
    #[inline]
    pub fn align_position(&self) -> usize {
        self.align_position
    }

    /// Whether multi-byte values are byte-reversed.
    #[inline]
    pub fn swap_bytes(&self) -> bool {
        self.swap_bytes
    }

    /// Width of the last primitive processed.
    #[inline]
    pub fn last_data_size(&self) -> usize {
        self.last_data_size
    }
}

/// CDR serialization engine bound to one buffer.
///
/// The engine tracks:
/// - the live [`CdrState`] (cursor, alignment origin, swap flag)
/// - the declared endianness of the stream and the CDR type
/// - the DDS parameter-list flag and options of the encapsulation
/// - the cached end of the buffer, refreshed whenever the buffer grows
///
/// Writes grow the buffer on demand; reads never do. Single-step operations
/// check capacity before touching anything, and multi-step operations roll
/// back to the state they started from when they fail.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use fastcdr::encoding::cdr::{Cdr, CdrType};
/// use fastcdr::types::FastBuffer;
/// use fastcdr::Endianness;
///
/// let mut buffer = FastBuffer::new();
/// let mut cdr = Cdr::new(&mut buffer, Endianness::Big, CdrType::CorbaCdr);
/// cdr.serialize(0x0102_0304i32)?;
/// assert_eq!(cdr.data(), &[0x01, 0x02, 0x03, 0x04]);
///
/// cdr.reset();
/// assert_eq!(cdr.deserialize::<i32>()?, 0x0102_0304);
/// # Ok(())
/// # }
/// ```
pub struct Cdr<'a, B: CdrBuffer = FastBuffer> {
    /// The byte buffer the stream lives in
    pub(crate) buffer: &'a mut B,
    /// Plain CORBA CDR or DDS CDR
    pub(crate) cdr_type: CdrType,
    /// Parameter-list flag of the DDS encapsulation
    pub(crate) pl_flag: DdsCdrPlFlag,
    /// Options field of the DDS encapsulation
    pub(crate) options: u16,
    /// Declared byte order of the stream
    pub(crate) endianness: Endianness,
    /// Live cursor state
    pub(crate) state: CdrState,
    /// Cached end of the buffer
    pub(crate) last_position: usize,
}

impl<'a, B: CdrBuffer> Cdr<'a, B> {
    /// Create an engine over `buffer` with the cursor at its origin.
    pub fn new(buffer: &'a mut B, endianness: Endianness, cdr_type: CdrType) -> Self {
        let last_position = buffer.len();
        Self {
            buffer,
            cdr_type,
            pl_flag: DdsCdrPlFlag::WithoutPl,
            options: 0,
            endianness,
            state: CdrState {
                current_position: 0,
                align_position: 0,
                swap_bytes: !endianness.is_native(),
                last_data_size: 0,
            },
            last_position,
        }
    }

    /// Create an engine with the endianness and CDR type of `config`.
    pub fn from_config(buffer: &'a mut B, config: &CdrConfig) -> Self {
        Self::new(buffer, config.endianness, config.cdr_type)
    }

    /// Get the CDR type.
    #[inline]
    pub fn cdr_type(&self) -> CdrType {
        self.cdr_type
    }

    /// Get the declared endianness of the stream.
    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Whether multi-byte values are currently byte-reversed.
    #[inline]
    pub fn swap_bytes(&self) -> bool {
        self.state.swap_bytes
    }

    /// Change the declared endianness, toggling the swap flag when it differs.
    pub fn change_endianness(&mut self, endianness: Endianness) {
        if self.endianness != endianness {
            self.state.swap_bytes = !self.state.swap_bytes;
            self.endianness = endianness;
        }
    }

    /// Snapshot of the current state.
    #[inline]
    pub fn state(&self) -> CdrState {
        self.state
    }

    /// Restore a state previously returned by [`Cdr::state`].
    #[inline]
    pub fn set_state(&mut self, state: CdrState) {
        self.state = state;
    }

    /// Rewind both cursors to the buffer origin.
    ///
    /// The swap flag is recomputed from the declared endianness.
    pub fn reset(&mut self) {
        self.state = CdrState {
            current_position: 0,
            align_position: 0,
            swap_bytes: !self.endianness.is_native(),
            last_data_size: 0,
        };
        self.last_position = self.buffer.len();
    }

    /// Restart alignment from the current position.
    #[inline]
    pub fn reset_alignment(&mut self) {
        self.state.align_position = self.state.current_position;
    }

    /// Offset of the cursor from the buffer origin.
    #[inline]
    pub fn position(&self) -> usize {
        self.state.current_position
    }

    /// Number of bytes serialized (or consumed) so far.
    #[inline]
    pub fn serialized_data_length(&self) -> usize {
        self.state.current_position
    }

    /// Bytes between the cursor and the end of the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.last_position - self.state.current_position
    }

    /// The serialized bytes, from the buffer origin to the cursor.
    pub fn data(&self) -> &[u8] {
        &self.buffer.as_slice()[..self.state.current_position]
    }

    /// The whole buffer.
    pub fn buffer_pointer(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// The bytes from the cursor to the end of the buffer.
    pub fn current_position(&self) -> &[u8] {
        &self.buffer.as_slice()[self.state.current_position..self.last_position]
    }

    /// Skip `num_bytes` bytes, growing the buffer if needed.
    ///
    /// The skipped bytes are neither written nor validated.
    pub fn jump(&mut self, num_bytes: usize) -> CoreResult<&mut Self> {
        self.ensure_writable(num_bytes)?;
        self.state.current_position += num_bytes;
        // The cursor may now sit anywhere; the next primitive must align.
        self.state.last_data_size = 0;
        Ok(self)
    }

    /// Move the alignment origin forward by `num_bytes`.
    ///
    /// The origin never passes the cursor. The next primitive realigns
    /// against the new origin.
    pub fn move_alignment_forward(&mut self, num_bytes: usize) -> CoreResult<&mut Self> {
        let available = self.state.current_position - self.state.align_position;
        if num_bytes > available {
            return Err(CodecError::insufficient_space(
                num_bytes,
                available,
                self.state.align_position,
            ));
        }
        self.state.align_position += num_bytes;
        self.state.last_data_size = 0;
        Ok(self)
    }

    /// Run `op`, restoring the state captured on entry if it fails.
    ///
    /// This is how every multi-step operation of the engine stays atomic,
    /// and it composes: a caller serializing a structure field by field can
    /// wrap the whole structure.
    pub fn atomically<T>(&mut self, op: impl FnOnce(&mut Self) -> CoreResult<T>) -> CoreResult<T> {
        let state = self.state;
        let result = op(self);
        if let Err(err) = &result {
            tracing::debug!(
                position = self.state.current_position,
                restored = state.current_position,
                error = %err,
                fields = ?err.log_fields(),
                "rolling back CDR state"
            );
            self.state = state;
        }
        result
    }

    /// Run `op` with the byte order resolved against `endianness`.
    ///
    /// The swap flag is restored afterwards, whether `op` succeeds or fails.
    pub(crate) fn with_endianness<T>(
        &mut self,
        endianness: Endianness,
        op: impl FnOnce(&mut Self) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let aux_swap = self.state.swap_bytes;
        self.state.swap_bytes = (aux_swap && self.endianness == endianness)
            || (!aux_swap && self.endianness != endianness);
        let result = op(self);
        self.state.swap_bytes = aux_swap;
        result
    }

    /// Padding needed before a value aligned to `data_size`.
    ///
    /// When the last primitive was at least as wide, the stream is already
    /// aligned for `data_size`.
    #[inline]
    pub(crate) fn alignment(&self, data_size: usize) -> usize {
        if data_size > self.state.last_data_size {
            let offset = self.state.current_position - self.state.align_position;
            (data_size - (offset % data_size)) & (data_size - 1)
        } else {
            0
        }
    }

    /// Skip `align` padding bytes. Padding is never written.
    #[inline]
    pub(crate) fn make_align(&mut self, align: usize) {
        self.state.current_position += align;
    }

    /// Make sure `size` bytes can be written at the cursor.
    pub(crate) fn ensure_writable(&mut self, size: usize) -> CoreResult<()> {
        let remaining = self.remaining();
        if remaining >= size || (self.resize(size - remaining) && self.remaining() >= size) {
            Ok(())
        } else {
            Err(CodecError::insufficient_space(
                size,
                self.remaining(),
                self.state.current_position,
            ))
        }
    }

    /// Make sure `size` bytes can be read at the cursor.
    #[inline]
    pub(crate) fn ensure_readable(&self, size: usize) -> CoreResult<()> {
        if self.remaining() >= size {
            Ok(())
        } else {
            Err(CodecError::insufficient_space(
                size,
                self.remaining(),
                self.state.current_position,
            ))
        }
    }

    /// Ask the buffer to grow by at least `min_size_inc` bytes.
    fn resize(&mut self, min_size_inc: usize) -> bool {
        let before = self.buffer.len();
        if self.buffer.resize(min_size_inc) {
            self.last_position = self.buffer.len();
            tracing::debug!(
                min_size_inc,
                before,
                after = self.last_position,
                "CDR buffer grown"
            );
            true
        } else {
            tracing::debug!(min_size_inc, size = before, "CDR buffer cannot grow");
            false
        }
    }

    /// Mutable view of `len` bytes at the cursor. Capacity must be checked.
    #[inline]
    pub(crate) fn bytes_at_cursor_mut(&mut self, len: usize) -> &mut [u8] {
        let start = self.state.current_position;
        &mut self.buffer.as_mut_slice()[start..start + len]
    }

    /// View of `len` bytes at the cursor. Availability must be checked.
    #[inline]
    pub(crate) fn bytes_at_cursor(&self, len: usize) -> &[u8] {
        let start = self.state.current_position;
        &self.buffer.as_slice()[start..start + len]
    }
}

impl<B: CdrBuffer> std::fmt::Debug for Cdr<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cdr")
            .field("cdr_type", &self.cdr_type)
            .field("endianness", &self.endianness)
            .field("pl_flag", &self.pl_flag)
            .field("options", &self.options)
            .field("state", &self.state)
            .field("last_position", &self.last_position)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(buffer: &mut FastBuffer) -> Cdr<'_> {
        Cdr::new(buffer, Endianness::NATIVE, CdrType::CorbaCdr)
    }

    #[test]
    fn test_new_engine() {
        let mut buffer = FastBuffer::with_capacity(16);
        let cdr = engine(&mut buffer);
        assert_eq!(cdr.position(), 0);
        assert_eq!(cdr.remaining(), 16);
        assert!(!cdr.swap_bytes());
        assert_eq!(cdr.state().last_data_size(), 0);
    }

    #[test]
    fn test_swap_flag_from_endianness() {
        let mut buffer = FastBuffer::new();
        let cdr = Cdr::new(&mut buffer, Endianness::NATIVE.opposite(), CdrType::CorbaCdr);
        assert!(cdr.swap_bytes());
    }

    #[test]
    fn test_alignment() {
        let mut buffer = FastBuffer::with_capacity(32);
        let mut cdr = engine(&mut buffer);
        cdr.serialize(1u8).unwrap();
        assert_eq!(cdr.alignment(4), 3);
        assert_eq!(cdr.alignment(2), 1);
        assert_eq!(cdr.alignment(8), 7);
        assert_eq!(cdr.alignment(1), 0);
    }

    #[test]
    fn test_alignment_skipped_after_wider_value() {
        let mut buffer = FastBuffer::with_capacity(32);
        let mut cdr = engine(&mut buffer);
        cdr.serialize(1u64).unwrap();
        assert_eq!(cdr.alignment(4), 0);
        assert_eq!(cdr.alignment(8), 0);
    }

    #[test]
    fn test_reset_alignment() {
        let mut buffer = FastBuffer::with_capacity(32);
        let mut cdr = engine(&mut buffer);
        cdr.serialize(1u8).unwrap();
        cdr.reset_alignment();
        assert_eq!(cdr.state().align_position(), 1);
        assert_eq!(cdr.alignment(4), 0);
        cdr.serialize(7u32).unwrap();
        assert_eq!(cdr.position(), 5);
    }

    #[test]
    fn test_jump_forces_realignment() {
        let mut buffer = FastBuffer::with_capacity(32);
        let mut cdr = engine(&mut buffer);
        cdr.serialize(1u32).unwrap();
        cdr.jump(1).unwrap();
        assert_eq!(cdr.state().last_data_size(), 0);
        cdr.serialize(2u16).unwrap();
        assert_eq!(cdr.position(), 8);
    }

    #[test]
    fn test_jump_grows_internal_buffer() {
        let mut buffer = FastBuffer::new();
        let mut cdr = engine(&mut buffer);
        cdr.jump(10).unwrap();
        assert_eq!(cdr.position(), 10);
        assert!(cdr.remaining() > 0);
    }

    #[test]
    fn test_jump_past_external_buffer() {
        let mut buffer = FastBuffer::from_vec(vec![0; 4]);
        let mut cdr = engine(&mut buffer);
        let err = cdr.jump(5).unwrap_err();
        assert!(err.is_insufficient_space());
        assert_eq!(cdr.position(), 0);
    }

    #[test]
    fn test_move_alignment_forward() {
        let mut buffer = FastBuffer::with_capacity(16);
        let mut cdr = engine(&mut buffer);
        cdr.jump(3).unwrap();
        cdr.move_alignment_forward(2).unwrap();
        assert_eq!(cdr.state().align_position(), 2);
        assert!(cdr.move_alignment_forward(2).is_err());
        assert_eq!(cdr.state().align_position(), 2);
    }

    #[test]
    fn test_move_alignment_forward_realigns_next_value() {
        let mut buffer = FastBuffer::with_capacity(32);
        let mut cdr = engine(&mut buffer);
        cdr.serialize(1u64).unwrap();
        cdr.move_alignment_forward(4).unwrap();
        assert_eq!(cdr.state().last_data_size(), 0);

        cdr.serialize(2u64).unwrap();
        let start = cdr.position() - 8;
        assert_eq!((start - cdr.state().align_position()) % 8, 0);
        assert_eq!(start, 12);
    }

    #[test]
    fn test_growth_requests_only_the_shortfall() {
        let mut buffer = FastBuffer::with_capacity(10).with_max_size(12);
        let mut cdr = engine(&mut buffer);
        cdr.jump(8).unwrap();
        cdr.serialize(7u32).unwrap();
        assert_eq!(cdr.position(), 12);
        assert_eq!(cdr.remaining(), 0);
        assert!(cdr.serialize(1u8).unwrap_err().is_insufficient_space());
    }

    #[test]
    fn test_reset() {
        let mut buffer = FastBuffer::with_capacity(16);
        let mut cdr = engine(&mut buffer);
        cdr.serialize(5u32).unwrap();
        cdr.change_endianness(Endianness::NATIVE.opposite());
        assert!(cdr.swap_bytes());
        cdr.reset();
        assert_eq!(cdr.position(), 0);
        assert_eq!(cdr.state().align_position(), 0);
        assert!(cdr.swap_bytes());
        assert_eq!(cdr.state().last_data_size(), 0);
    }

    #[test]
    fn test_change_endianness_same_is_noop() {
        let mut buffer = FastBuffer::new();
        let mut cdr = engine(&mut buffer);
        cdr.change_endianness(Endianness::NATIVE);
        assert!(!cdr.swap_bytes());
        cdr.change_endianness(Endianness::NATIVE.opposite());
        cdr.change_endianness(Endianness::NATIVE.opposite());
        assert!(cdr.swap_bytes());
    }

    #[test]
    fn test_state_round_trip() {
        let mut buffer = FastBuffer::with_capacity(16);
        let mut cdr = engine(&mut buffer);
        let state = cdr.state();
        cdr.serialize(1u64).unwrap();
        assert_ne!(cdr.state(), state);
        cdr.set_state(state);
        assert_eq!(cdr.state(), state);
    }

    #[test]
    fn test_atomically_restores_on_error() {
        let mut buffer = FastBuffer::from_vec(vec![0; 6]);
        let mut cdr = engine(&mut buffer);
        cdr.serialize(1u8).unwrap();
        let before = cdr.state();
        let result = cdr.atomically(|cdr| {
            cdr.serialize(2u16)?;
            assert_eq!(cdr.position(), 4);
            cdr.serialize(3u32)?;
            Ok(())
        });
        assert!(result.unwrap_err().is_insufficient_space());
        assert_eq!(cdr.state(), before);
    }

    #[test]
    fn test_with_endianness_resolution() {
        let mut buffer = FastBuffer::new();
        let mut cdr = engine(&mut buffer);
        let native = Endianness::NATIVE;
        assert!(!cdr.with_endianness(native, |cdr| Ok(cdr.swap_bytes())).unwrap());
        assert!(cdr
            .with_endianness(native.opposite(), |cdr| Ok(cdr.swap_bytes()))
            .unwrap());

        cdr.change_endianness(native.opposite());
        assert!(cdr
            .with_endianness(native.opposite(), |cdr| Ok(cdr.swap_bytes()))
            .unwrap());
        assert!(!cdr.with_endianness(native, |cdr| Ok(cdr.swap_bytes())).unwrap());
        assert!(cdr.swap_bytes());
    }

    #[test]
    fn test_current_position_view() {
        let mut buffer = FastBuffer::from_vec(vec![1, 2, 3, 4]);
        let mut cdr = engine(&mut buffer);
        cdr.jump(1).unwrap();
        assert_eq!(cdr.current_position(), &[2, 3, 4]);
        assert_eq!(cdr.buffer_pointer(), &[1, 2, 3, 4]);
        assert_eq!(cdr.data(), &[1]);
    }
}
