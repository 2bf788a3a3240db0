// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Fixed-width primitive kinds and the generic copy-or-reverse routines.
//!
//! Every numeric primitive moves through the same two routines: a verbatim
//! copy of its in-memory bytes when the stream uses host byte order, or the
//! same bytes in reverse order when it does not. The per-type knowledge is
//! limited to the width and alignment carried by [`CdrPrimitive`].

use bytemuck::{Pod, Zeroable};

/// A fixed-width value that CDR encodes as its raw bytes.
///
/// Implemented for the integer kinds, `f32`, `f64` and [`LongDouble`].
/// `bool` and `char` have domain restrictions and are handled separately.
pub trait CdrPrimitive: Pod {
    /// Encoded width in bytes.
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Alignment boundary in the stream.
    const ALIGNMENT: usize = Self::SIZE;
}

impl CdrPrimitive for u8 {}
impl CdrPrimitive for i8 {}
impl CdrPrimitive for u16 {}
impl CdrPrimitive for i16 {}
impl CdrPrimitive for u32 {}
impl CdrPrimitive for i32 {}
impl CdrPrimitive for u64 {}
impl CdrPrimitive for i64 {}
impl CdrPrimitive for f32 {}
impl CdrPrimitive for f64 {}

impl CdrPrimitive for LongDouble {
    const ALIGNMENT: usize = 8;
}

/// Copy `value` into `dst`, reversing its bytes when `swap` is set.
///
/// `dst` must be exactly `T::SIZE` bytes long.
#[inline]
pub(crate) fn write_value<T: CdrPrimitive>(value: &T, dst: &mut [u8], swap: bool) {
    let src = bytemuck::bytes_of(value);
    if swap {
        for (d, s) in dst.iter_mut().zip(src.iter().rev()) {
            *d = *s;
        }
    } else {
        dst.copy_from_slice(src);
    }
}

/// Build a value from `src`, reversing its bytes when `swap` is set.
///
/// `src` must be exactly `T::SIZE` bytes long.
#[inline]
pub(crate) fn read_value<T: CdrPrimitive>(src: &[u8], swap: bool) -> T {
    let mut value = T::zeroed();
    let dst = bytemuck::bytes_of_mut(&mut value);
    if swap {
        for (d, s) in dst.iter_mut().zip(src.iter().rev()) {
            *d = *s;
        }
    } else {
        dst.copy_from_slice(src);
    }
    value
}

/// Copy a slice of values into `dst` (`values.len() * T::SIZE` bytes).
pub(crate) fn write_slice<T: CdrPrimitive>(values: &[T], dst: &mut [u8], swap: bool) {
    if swap {
        for (value, chunk) in values.iter().zip(dst.chunks_exact_mut(T::SIZE)) {
            write_value(value, chunk, true);
        }
    } else {
        dst.copy_from_slice(bytemuck::cast_slice(values));
    }
}

/// Fill `out` from `src` (`out.len() * T::SIZE` bytes).
pub(crate) fn read_slice<T: CdrPrimitive>(src: &[u8], out: &mut [T], swap: bool) {
    if swap {
        for (value, chunk) in out.iter_mut().zip(src.chunks_exact(T::SIZE)) {
            *value = read_value(chunk, true);
        }
    } else {
        bytemuck::cast_slice_mut::<T, u8>(out).copy_from_slice(src);
    }
}

const F128_EXP_BIAS: i32 = 16383;
const F128_MANTISSA_BITS: u32 = 112;
const F128_MANTISSA_MASK: u128 = (1 << F128_MANTISSA_BITS) - 1;
const F64_EXP_BIAS: i32 = 1023;
const F64_MANTISSA_BITS: u32 = 52;
const F64_MANTISSA_MASK: u64 = (1 << F64_MANTISSA_BITS) - 1;
const MANTISSA_SHIFT: u32 = F128_MANTISSA_BITS - F64_MANTISSA_BITS;

/// Extended 16-byte floating point value.
///
/// Holds the bit pattern of an IEEE-754 binary128 number. On the wire it is
/// the 16 bytes of that pattern in stream byte order, aligned to 8 bytes.
/// Conversion from `f64` is exact; conversion back truncates the extra
/// precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct LongDouble(u128);

impl LongDouble {
    /// Positive zero.
    pub const ZERO: LongDouble = LongDouble(0);

    /// Build from a raw binary128 bit pattern.
    pub const fn from_bits(bits: u128) -> Self {
        Self(bits)
    }

    /// Get the raw binary128 bit pattern.
    pub const fn to_bits(self) -> u128 {
        self.0
    }

    /// Widen an `f64` without loss.
    pub fn from_f64(value: f64) -> Self {
        let bits = value.to_bits();
        let sign = ((bits >> 63) as u128) << 127;
        let exp = ((bits >> F64_MANTISSA_BITS) & 0x7ff) as i32;
        let mantissa = bits & F64_MANTISSA_MASK;

        let (exp128, mantissa128) = match (exp, mantissa) {
            (0, 0) => (0u128, 0u128),
            (0, m) => {
                // f64 subnormals are normal numbers in binary128.
                let shift = m.leading_zeros() - (63 - F64_MANTISSA_BITS);
                let normalized = (m << shift) & F64_MANTISSA_MASK;
                let unbiased = 1 - F64_EXP_BIAS - shift as i32;
                (
                    (unbiased + F128_EXP_BIAS) as u128,
                    (normalized as u128) << MANTISSA_SHIFT,
                )
            }
            (0x7ff, m) => (0x7fff, (m as u128) << MANTISSA_SHIFT),
            (e, m) => (
                (e - F64_EXP_BIAS + F128_EXP_BIAS) as u128,
                (m as u128) << MANTISSA_SHIFT,
            ),
        };

        Self(sign | (exp128 << F128_MANTISSA_BITS) | mantissa128)
    }

    /// Narrow to an `f64`, truncating toward zero.
    pub fn to_f64(self) -> f64 {
        let bits = self.0;
        let sign = ((bits >> 127) as u64) << 63;
        let exp128 = ((bits >> F128_MANTISSA_BITS) & 0x7fff) as i32;
        let mantissa128 = bits & F128_MANTISSA_MASK;

        let magnitude = if exp128 == 0x7fff {
            let mut mantissa = (mantissa128 >> MANTISSA_SHIFT) as u64;
            if mantissa128 != 0 && mantissa == 0 {
                // NaN whose payload lives only in the dropped bits.
                mantissa = 1 << (F64_MANTISSA_BITS - 1);
            }
            (0x7ffu64 << F64_MANTISSA_BITS) | mantissa
        } else if exp128 == 0 {
            0
        } else {
            let unbiased = exp128 - F128_EXP_BIAS;
            if unbiased > F64_EXP_BIAS {
                0x7ffu64 << F64_MANTISSA_BITS
            } else if unbiased >= 1 - F64_EXP_BIAS {
                let exp = (unbiased + F64_EXP_BIAS) as u64;
                (exp << F64_MANTISSA_BITS) | (mantissa128 >> MANTISSA_SHIFT) as u64
            } else {
                let shift = (-(unbiased + 962)) as u32;
                let significand = (1u128 << F128_MANTISSA_BITS) | mantissa128;
                significand.checked_shr(shift).unwrap_or(0) as u64
            }
        };

        f64::from_bits(sign | magnitude)
    }
}

impl From<f64> for LongDouble {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<LongDouble> for f64 {
    fn from(value: LongDouble) -> Self {
        value.to_f64()
    }
}
