// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # fastcdr
//!
//! Binary CDR (Common Data Representation) serialization engine, as used by
//! CORBA GIOP and DDS/RTPS payloads.
//!
//! The crate is organized into:
//! - `core/` - error type, endianness and configuration
//! - `types/` - the growable byte buffer the engine writes into
//! - `encoding/cdr/` - the [`Cdr`] engine: alignment, byte swapping,
//!   encapsulation header and rollback on failure
//!
//! ## Example: Round trip with a DDS header
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use fastcdr::{Cdr, CdrType, Endianness, FastBuffer};
//!
//! let mut buffer = FastBuffer::new();
//! let mut cdr = Cdr::new(&mut buffer, Endianness::Little, CdrType::DdsCdr);
//! cdr.serialize_encapsulation()?;
//! cdr.serialize(42u32)?.serialize_string("hello")?;
//! let written = cdr.data().to_vec();
//!
//! let mut input = FastBuffer::from_vec(written);
//! let mut cdr = Cdr::new(&mut input, Endianness::Big, CdrType::DdsCdr);
//! cdr.read_encapsulation()?;
//! assert_eq!(cdr.endianness(), Endianness::Little);
//! assert_eq!(cdr.deserialize::<u32>()?, 42);
//! assert_eq!(cdr.deserialize_string()?.as_deref(), Some("hello"));
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{CdrConfig, CodecError, ConfigError, Endianness, Result};

// Encoding/decoding
pub mod encoding;

pub use encoding::cdr::{Cdr, CdrPrimitive, CdrState, CdrType, DdsCdrPlFlag, LongDouble};

// Buffers
pub mod types;

pub use types::{CdrBuffer, FastBuffer};
