// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Serialization side of the CDR engine.
//!
//! Scalars and arrays check the capacity they need (value plus alignment
//! padding) before writing anything, growing the buffer when it allows it.
//! Strings and sequences write a length first and roll back to the state
//! before that length when the payload does not fit.

use crate::core::{CodecError, Endianness, Result as CoreResult};
use crate::types::CdrBuffer;

use super::cursor::Cdr;
use super::primitive::{write_slice, write_value, CdrPrimitive};

/// Convert an in-memory length to the 32-bit length prefix.
fn length_prefix(len: usize, context: &str) -> CoreResult<u32> {
    u32::try_from(len).map_err(|_| {
        CodecError::invalid_encoding(context, format!("length {len} does not fit a 32-bit prefix"))
    })
}

impl<'a, B: CdrBuffer> Cdr<'a, B> {
    /// Serialize a primitive value in the stream byte order.
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
    /// let mut cdr = Cdr::new(&mut buffer, Endianness::Little, CdrType::CorbaCdr);
    /// cdr.serialize(1u8)?.serialize(2u32)?;
    /// assert_eq!(cdr.data(), &[1, 0, 0, 0, 2, 0, 0, 0]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn serialize<T: CdrPrimitive>(&mut self, value: T) -> CoreResult<&mut Self> {
        let align = self.alignment(T::ALIGNMENT);
        self.ensure_writable(T::SIZE + align)?;

        self.state.last_data_size = T::SIZE;
        self.make_align(align);

        let swap = self.state.swap_bytes;
        write_value(&value, self.bytes_at_cursor_mut(T::SIZE), swap);
        self.state.current_position += T::SIZE;
        Ok(self)
    }

    /// Serialize a primitive value in the given byte order.
    pub fn serialize_with_endianness<T: CdrPrimitive>(
        &mut self,
        value: T,
        endianness: Endianness,
    ) -> CoreResult<&mut Self> {
        self.with_endianness(endianness, |cdr| cdr.serialize(value).map(|_| ()))?;
        Ok(self)
    }

    /// Serialize a boolean as a single `0` or `1` byte.
    pub fn serialize_bool(&mut self, value: bool) -> CoreResult<&mut Self> {
        self.ensure_writable(1)?;
        self.state.last_data_size = 1;
        self.bytes_at_cursor_mut(1)[0] = u8::from(value);
        self.state.current_position += 1;
        Ok(self)
    }

    /// Serialize a wide character as a 4-byte unsigned value.
    pub fn serialize_wchar(&mut self, value: char) -> CoreResult<&mut Self> {
        self.serialize(value as u32)
    }

    /// Serialize a wide character in the given byte order.
    pub fn serialize_wchar_with_endianness(
        &mut self,
        value: char,
        endianness: Endianness,
    ) -> CoreResult<&mut Self> {
        self.serialize_with_endianness(value as u32, endianness)
    }

    /// Serialize a fixed-size array of primitives.
    ///
    /// The array is aligned once, for its first element. An empty array
    /// writes nothing, not even padding.
    pub fn serialize_array<T: CdrPrimitive>(&mut self, values: &[T]) -> CoreResult<&mut Self> {
        if values.is_empty() {
            return Ok(self);
        }

        let align = self.alignment(T::ALIGNMENT);
        let total_size = T::SIZE * values.len();
        self.ensure_writable(total_size + align)?;

        self.state.last_data_size = T::SIZE;
        self.make_align(align);

        let swap = self.state.swap_bytes;
        write_slice(values, self.bytes_at_cursor_mut(total_size), swap);
        self.state.current_position += total_size;
        Ok(self)
    }

    /// Serialize a fixed-size array of primitives in the given byte order.
    pub fn serialize_array_with_endianness<T: CdrPrimitive>(
        &mut self,
        values: &[T],
        endianness: Endianness,
    ) -> CoreResult<&mut Self> {
        self.with_endianness(endianness, |cdr| cdr.serialize_array(values).map(|_| ()))?;
        Ok(self)
    }

    /// Serialize a fixed-size array of booleans, one byte each.
    pub fn serialize_bool_array(&mut self, values: &[bool]) -> CoreResult<&mut Self> {
        if values.is_empty() {
            return Ok(self);
        }
        self.ensure_writable(values.len())?;

        self.state.last_data_size = 1;
        let dst = self.bytes_at_cursor_mut(values.len());
        for (byte, value) in dst.iter_mut().zip(values) {
            *byte = u8::from(*value);
        }
        self.state.current_position += values.len();
        Ok(self)
    }

    /// Serialize a fixed-size array of wide characters.
    ///
    /// Each element goes through the 4-byte scalar path.
    pub fn serialize_wchar_array(&mut self, values: &[char]) -> CoreResult<&mut Self> {
        self.atomically(|cdr| {
            for value in values {
                cdr.serialize_wchar(*value)?;
            }
            Ok(())
        })?;
        Ok(self)
    }

    /// Serialize a fixed-size array of wide characters in the given byte order.
    pub fn serialize_wchar_array_with_endianness(
        &mut self,
        values: &[char],
        endianness: Endianness,
    ) -> CoreResult<&mut Self> {
        self.with_endianness(endianness, |cdr| {
            cdr.serialize_wchar_array(values).map(|_| ())
        })?;
        Ok(self)
    }

    /// Serialize a fixed-size array of strings.
    pub fn serialize_string_array<S: AsRef<str>>(&mut self, values: &[S]) -> CoreResult<&mut Self> {
        self.atomically(|cdr| {
            for value in values {
                cdr.serialize_string(value.as_ref())?;
            }
            Ok(())
        })?;
        Ok(self)
    }

    /// Serialize a string: 32-bit length (terminator included), then the
    /// bytes and a zero terminator.
    ///
    /// `None` is encoded as a zero length with no payload. `Some("")` is not
    /// the same on the wire: it is a length of 1 followed by the terminator.
    /// Strings with an interior NUL cannot be represented and are rejected.
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
    /// cdr.serialize_string("ab")?;
    /// assert_eq!(cdr.data(), &[0, 0, 0, 3, b'a', b'b', 0]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn serialize_string<'s>(
        &mut self,
        value: impl Into<Option<&'s str>>,
    ) -> CoreResult<&mut Self> {
        let Some(value) = value.into() else {
            return self.serialize(0u32);
        };

        let bytes = value.as_bytes();
        if let Some(index) = bytes.iter().position(|&b| b == 0) {
            return Err(CodecError::invalid_encoding(
                "serialize_string",
                format!("string contains a NUL byte at offset {index}"),
            ));
        }
        let length = bytes.len() + 1;
        let prefix = length_prefix(length, "serialize_string")?;

        self.atomically(|cdr| {
            cdr.serialize(prefix)?;
            cdr.ensure_writable(length)?;

            cdr.state.last_data_size = 1;
            let dst = cdr.bytes_at_cursor_mut(length);
            dst[..bytes.len()].copy_from_slice(bytes);
            dst[bytes.len()] = 0;
            cdr.state.current_position += length;
            Ok(())
        })?;
        Ok(self)
    }

    /// Serialize a string with its length in the given byte order.
    pub fn serialize_string_with_endianness<'s>(
        &mut self,
        value: impl Into<Option<&'s str>>,
        endianness: Endianness,
    ) -> CoreResult<&mut Self> {
        let value = value.into();
        self.with_endianness(endianness, |cdr| cdr.serialize_string(value).map(|_| ()))?;
        Ok(self)
    }

    /// Serialize a sequence of primitives: 32-bit count, then the array.
    pub fn serialize_sequence<T: CdrPrimitive>(&mut self, values: &[T]) -> CoreResult<&mut Self> {
        let count = length_prefix(values.len(), "serialize_sequence")?;
        self.atomically(|cdr| {
            cdr.serialize(count)?;
            cdr.serialize_array(values)?;
            Ok(())
        })?;
        Ok(self)
    }

    /// Serialize a sequence of primitives in the given byte order.
    pub fn serialize_sequence_with_endianness<T: CdrPrimitive>(
        &mut self,
        values: &[T],
        endianness: Endianness,
    ) -> CoreResult<&mut Self> {
        self.with_endianness(endianness, |cdr| {
            cdr.serialize_sequence(values).map(|_| ())
        })?;
        Ok(self)
    }

    /// Serialize a sequence of booleans: 32-bit count, then one unaligned
    /// byte per element.
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
    /// let mut cdr = Cdr::new(&mut buffer, Endianness::Little, CdrType::CorbaCdr);
    /// cdr.serialize_bool_sequence(&[true, false, true])?;
    /// assert_eq!(cdr.data(), &[3, 0, 0, 0, 1, 0, 1]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn serialize_bool_sequence(&mut self, values: &[bool]) -> CoreResult<&mut Self> {
        let count = length_prefix(values.len(), "serialize_bool_sequence")?;
        self.atomically(|cdr| {
            cdr.serialize(count)?;
            cdr.ensure_writable(values.len())?;

            cdr.state.last_data_size = 1;
            let dst = cdr.bytes_at_cursor_mut(values.len());
            for (byte, value) in dst.iter_mut().zip(values) {
                *byte = u8::from(*value);
            }
            cdr.state.current_position += values.len();
            Ok(())
        })?;
        Ok(self)
    }

    /// Serialize a sequence of strings: 32-bit count, then each string.
    pub fn serialize_string_sequence<S: AsRef<str>>(
        &mut self,
        values: &[S],
    ) -> CoreResult<&mut Self> {
        let count = length_prefix(values.len(), "serialize_string_sequence")?;
        self.atomically(|cdr| {
            cdr.serialize(count)?;
            cdr.serialize_string_array(values)?;
            Ok(())
        })?;
        Ok(self)
    }
}
