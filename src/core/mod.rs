// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout fastcdr.
//!
//! This module provides the foundational types for the library:
//! - [`CodecError`] - Error taxonomy of the CDR engine
//! - [`Endianness`] - Byte order identifier
//! - [`CdrConfig`] - Engine and buffer configuration

pub mod config;
pub mod error;

pub use config::{CdrConfig, ConfigError};
pub use error::{CodecError, Result};

use serde::{Deserialize, Serialize};

/// Byte order of a CDR stream.
///
/// The discriminants are the values carried by the endianness bit of the
/// encapsulation kind byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
#[repr(u8)]
pub enum Endianness {
    /// Most significant byte first
    Big = 0x00,
    /// Least significant byte first
    Little = 0x01,
}

impl Endianness {
    /// Byte order of the host.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Endianness = Endianness::Big;

    /// Byte order of the host.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Endianness = Endianness::Little;

    /// Decode the endianness bit of an encapsulation kind byte.
    pub const fn from_kind_bit(kind: u8) -> Self {
        if kind & 0x01 == 0 {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    /// Check if this is the host byte order.
    pub const fn is_native(self) -> bool {
        self as u8 == Self::NATIVE as u8
    }

    /// The other byte order.
    pub const fn opposite(self) -> Self {
        match self {
            Endianness::Big => Endianness::Little,
            Endianness::Little => Endianness::Big,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Endianness::Big => "big",
            Endianness::Little => "little",
        }
    }
}

impl Default for Endianness {
    fn default() -> Self {
        Self::NATIVE
    }
}

/// Error returned when parsing an `Endianness` from string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEndiannessError {
    input: String,
}

impl std::fmt::Display for ParseEndiannessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid endianness '{}', expected 'big', 'little', or 'native'",
            self.input
        )
    }
}

impl std::error::Error for ParseEndiannessError {}

impl std::str::FromStr for Endianness {
    type Err = ParseEndiannessError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "big" | "be" => Ok(Endianness::Big),
            "little" | "le" => Ok(Endianness::Little),
            "native" => Ok(Endianness::NATIVE),
            _ => Err(ParseEndiannessError {
                input: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Endianness {
    type Error = ParseEndiannessError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Endianness> for &'static str {
    fn from(value: Endianness) -> Self {
        value.as_str()
    }
}
