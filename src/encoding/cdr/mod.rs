// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR (Common Data Representation) module.
//!
//! Provides the [`Cdr`] stream engine: aligned, endianness-aware encoding
//! and decoding of primitives, arrays, sequences and strings over a
//! [`CdrBuffer`](crate::types::CdrBuffer), plus the encapsulation header
//! used by CORBA and DDS streams.
//!
//! - [`cursor`] - engine state, alignment and buffer growth
//! - [`encoder`] - `serialize*` operations
//! - [`decoder`] - `deserialize*` operations
//! - [`encapsulation`] - stream header framing
//! - [`primitive`] - fixed-width kinds and byte-order routines

pub mod cursor;
pub mod decoder;
pub mod encapsulation;
pub mod encoder;
pub mod primitive;

pub use cursor::{Cdr, CdrState};
pub use encapsulation::{CdrType, DdsCdrPlFlag, CDR_HEADER_SIZE};
pub use primitive::{CdrPrimitive, LongDouble};
