// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Deserialization side of the CDR engine.
//!
//! Reads never grow the buffer: a value that runs past the end is an
//! [`CodecError::InsufficientSpace`] error. Values with a closed domain
//! (booleans, wide characters, strings) are validated before the cursor
//! moves, so a rejected value is left unconsumed.

use std::ops::Range;

use crate::core::{CodecError, Endianness, Result as CoreResult};
use crate::types::CdrBuffer;

use super::cursor::Cdr;
use super::primitive::{read_slice, read_value, CdrPrimitive};

/// Decode a boolean byte.
fn bool_from_byte(byte: u8, context: &str) -> CoreResult<bool> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CodecError::invalid_encoding(
            context,
            format!("unexpected byte value {other}, expected 0 or 1"),
        )),
    }
}

impl<'a, B: CdrBuffer> Cdr<'a, B> {
    /// Deserialize a primitive value in the stream byte order.
    pub fn deserialize<T: CdrPrimitive>(&mut self) -> CoreResult<T> {
        let align = self.alignment(T::ALIGNMENT);
        self.ensure_readable(T::SIZE + align)?;

        self.state.last_data_size = T::SIZE;
        self.make_align(align);

        let value = read_value(self.bytes_at_cursor(T::SIZE), self.state.swap_bytes);
        self.state.current_position += T::SIZE;
        Ok(value)
    }

    /// Deserialize a primitive value in the given byte order.
    pub fn deserialize_with_endianness<T: CdrPrimitive>(
        &mut self,
        endianness: Endianness,
    ) -> CoreResult<T> {
        self.with_endianness(endianness, |cdr| cdr.deserialize())
    }

    /// Deserialize a boolean byte.
    ///
    /// Any byte other than `0` or `1` is rejected and left unconsumed.
    pub fn deserialize_bool(&mut self) -> CoreResult<bool> {
        self.ensure_readable(1)?;
        let value = bool_from_byte(self.bytes_at_cursor(1)[0], "deserialize_bool")?;
        self.state.last_data_size = 1;
        self.state.current_position += 1;
        Ok(value)
    }

    /// Deserialize a wide character from its 4-byte encoding.
    pub fn deserialize_wchar(&mut self) -> CoreResult<char> {
        self.atomically(|cdr| {
            let code = cdr.deserialize::<u32>()?;
            char::from_u32(code).ok_or_else(|| {
                CodecError::invalid_encoding(
                    "deserialize_wchar",
                    format!("0x{code:08x} is not a Unicode scalar value"),
                )
            })
        })
    }

    /// Deserialize a wide character in the given byte order.
    pub fn deserialize_wchar_with_endianness(&mut self, endianness: Endianness) -> CoreResult<char> {
        self.with_endianness(endianness, |cdr| cdr.deserialize_wchar())
    }

    /// Fill a fixed-size array of primitives.
    ///
    /// The array is aligned once, for its first element. An empty array
    /// consumes nothing, not even padding.
    pub fn deserialize_array<T: CdrPrimitive>(&mut self, out: &mut [T]) -> CoreResult<&mut Self> {
        if out.is_empty() {
            return Ok(self);
        }

        let align = self.alignment(T::ALIGNMENT);
        let total_size = T::SIZE * out.len();
        self.ensure_readable(total_size + align)?;

        self.state.last_data_size = T::SIZE;
        self.make_align(align);

        read_slice(self.bytes_at_cursor(total_size), out, self.state.swap_bytes);
        self.state.current_position += total_size;
        Ok(self)
    }

    /// Fill a fixed-size array of primitives in the given byte order.
    pub fn deserialize_array_with_endianness<T: CdrPrimitive>(
        &mut self,
        out: &mut [T],
        endianness: Endianness,
    ) -> CoreResult<&mut Self> {
        self.with_endianness(endianness, |cdr| cdr.deserialize_array(out).map(|_| ()))?;
        Ok(self)
    }

    /// Fill a fixed-size array of booleans.
    ///
    /// Every byte is validated before any is consumed.
    pub fn deserialize_bool_array(&mut self, out: &mut [bool]) -> CoreResult<&mut Self> {
        if out.is_empty() {
            return Ok(self);
        }
        self.ensure_readable(out.len())?;

        let values = self
            .bytes_at_cursor(out.len())
            .iter()
            .map(|&byte| bool_from_byte(byte, "deserialize_bool_array"))
            .collect::<CoreResult<Vec<bool>>>()?;
        out.copy_from_slice(&values);

        self.state.last_data_size = 1;
        self.state.current_position += out.len();
        Ok(self)
    }

    /// Fill a fixed-size array of wide characters.
    pub fn deserialize_wchar_array(&mut self, out: &mut [char]) -> CoreResult<&mut Self> {
        self.atomically(|cdr| {
            for value in out.iter_mut() {
                *value = cdr.deserialize_wchar()?;
            }
            Ok(())
        })?;
        Ok(self)
    }

    /// Fill a fixed-size array of wide characters in the given byte order.
    pub fn deserialize_wchar_array_with_endianness(
        &mut self,
        out: &mut [char],
        endianness: Endianness,
    ) -> CoreResult<&mut Self> {
        self.with_endianness(endianness, |cdr| {
            cdr.deserialize_wchar_array(out).map(|_| ())
        })?;
        Ok(self)
    }

    /// Fill a fixed-size array of strings. Null strings become empty.
    ///
    /// On failure `out` is left untouched.
    pub fn deserialize_string_array(&mut self, out: &mut [String]) -> CoreResult<&mut Self> {
        let values = self.atomically(|cdr| {
            (0..out.len())
                .map(|_| cdr.deserialize_string().map(Option::unwrap_or_default))
                .collect::<CoreResult<Vec<String>>>()
        })?;
        for (slot, value) in out.iter_mut().zip(values) {
            *slot = value;
        }
        Ok(self)
    }

    /// Locate a string payload: read the length, check that the payload is
    /// present and carries exactly one terminator as its last byte, then
    /// step over it.
    ///
    /// Returns the payload range without the terminator, or `None` for a
    /// zero length. Must run inside [`Cdr::atomically`].
    fn string_payload(&mut self, context: &str) -> CoreResult<Option<Range<usize>>> {
        let length = self.deserialize::<u32>()? as usize;
        if length == 0 {
            return Ok(None);
        }
        self.ensure_readable(length)?;

        let payload = self.bytes_at_cursor(length);
        match payload.iter().position(|&b| b == 0) {
            Some(index) if index == length - 1 => {}
            Some(index) => {
                return Err(CodecError::invalid_encoding(
                    context,
                    format!("string of length {length} has a terminator at offset {index}"),
                ))
            }
            None => {
                return Err(CodecError::invalid_encoding(
                    context,
                    format!("string of length {length} is not terminated"),
                ))
            }
        }

        let start = self.state.current_position;
        self.state.last_data_size = 1;
        self.state.current_position += length;
        Ok(Some(start..start + length - 1))
    }

    /// Deserialize a string.
    ///
    /// A zero length yields `None`. The payload must end with its only
    /// terminator and be valid UTF-8. On failure the cursor is restored to
    /// before the length.
    pub fn deserialize_string(&mut self) -> CoreResult<Option<String>> {
        self.atomically(|cdr| {
            let Some(range) = cdr.string_payload("deserialize_string")? else {
                return Ok(None);
            };
            let bytes = cdr.buffer.as_slice()[range].to_vec();
            String::from_utf8(bytes).map(Some).map_err(|err| {
                CodecError::invalid_encoding("deserialize_string", err.to_string())
            })
        })
    }

    /// Deserialize a string with its length in the given byte order.
    pub fn deserialize_string_with_endianness(
        &mut self,
        endianness: Endianness,
    ) -> CoreResult<Option<String>> {
        self.with_endianness(endianness, |cdr| cdr.deserialize_string())
    }

    /// Deserialize a string as raw bytes, without the terminator and
    /// without UTF-8 validation.
    pub fn deserialize_bytes_string(&mut self) -> CoreResult<Option<Vec<u8>>> {
        self.atomically(|cdr| {
            let range = cdr.string_payload("deserialize_bytes_string")?;
            Ok(range.map(|range| cdr.buffer.as_slice()[range].to_vec()))
        })
    }

    /// Locate a UTF-8 string payload, rolling back on failure.
    fn utf8_payload(&mut self, context: &str) -> CoreResult<Option<Range<usize>>> {
        self.atomically(|cdr| {
            let range = cdr.string_payload(context)?;
            if let Some(range) = &range {
                std::str::from_utf8(&cdr.buffer.as_slice()[range.clone()])
                    .map_err(|err| CodecError::invalid_encoding(context, err.to_string()))?;
            }
            Ok(range)
        })
    }

    /// View a payload range already validated by [`Cdr::utf8_payload`].
    fn str_at(&self, range: Option<Range<usize>>, context: &str) -> CoreResult<&str> {
        match range {
            None => Ok(""),
            Some(range) => std::str::from_utf8(&self.buffer.as_slice()[range])
                .map_err(|err| CodecError::invalid_encoding(context, err.to_string())),
        }
    }

    /// Borrow the next string directly from the buffer.
    ///
    /// The returned view excludes the terminator; a zero length yields `""`.
    pub fn read_string(&mut self) -> CoreResult<&str> {
        let range = self.utf8_payload("read_string")?;
        self.str_at(range, "read_string")
    }

    /// Borrow the next string, with its length in the given byte order.
    pub fn read_string_with_endianness(&mut self, endianness: Endianness) -> CoreResult<&str> {
        let range = self.with_endianness(endianness, |cdr| cdr.utf8_payload("read_string"))?;
        self.str_at(range, "read_string")
    }

    /// Deserialize a sequence of primitives: 32-bit count, then the array.
    pub fn deserialize_sequence<T: CdrPrimitive>(&mut self) -> CoreResult<Vec<T>> {
        self.atomically(|cdr| {
            let count = cdr.deserialize::<u32>()? as usize;
            if count == 0 {
                return Ok(Vec::new());
            }

            // Check the whole span before allocating for it.
            let align = cdr.alignment(T::ALIGNMENT);
            let total_size = count.checked_mul(T::SIZE).unwrap_or(usize::MAX);
            cdr.ensure_readable(total_size.saturating_add(align))?;

            let mut values = vec![<T as bytemuck::Zeroable>::zeroed(); count];
            cdr.deserialize_array(&mut values)?;
            Ok(values)
        })
    }

    /// Deserialize a sequence of primitives in the given byte order.
    pub fn deserialize_sequence_with_endianness<T: CdrPrimitive>(
        &mut self,
        endianness: Endianness,
    ) -> CoreResult<Vec<T>> {
        self.with_endianness(endianness, |cdr| cdr.deserialize_sequence())
    }

    /// Deserialize a sequence of booleans.
    ///
    /// A missing element or a byte other than `0` or `1` restores the
    /// cursor to before the count.
    pub fn deserialize_bool_sequence(&mut self) -> CoreResult<Vec<bool>> {
        self.atomically(|cdr| {
            let count = cdr.deserialize::<u32>()? as usize;
            cdr.ensure_readable(count)?;

            let values = cdr
                .bytes_at_cursor(count)
                .iter()
                .map(|&byte| bool_from_byte(byte, "deserialize_bool_sequence"))
                .collect::<CoreResult<Vec<bool>>>()?;

            cdr.state.last_data_size = 1;
            cdr.state.current_position += count;
            Ok(values)
        })
    }

    /// Deserialize a sequence of strings. Null strings become empty.
    ///
    /// Either every element decodes, or the cursor is restored to before
    /// the count and nothing is returned.
    pub fn deserialize_string_sequence(&mut self) -> CoreResult<Vec<String>> {
        self.atomically(|cdr| {
            let count = cdr.deserialize::<u32>()? as usize;
            // Every element takes at least its 4-byte length.
            let mut values = Vec::with_capacity(count.min(cdr.remaining() / 4));
            for _ in 0..count {
                values.push(cdr.deserialize_string()?.unwrap_or_default());
            }
            Ok(values)
        })
    }
}
