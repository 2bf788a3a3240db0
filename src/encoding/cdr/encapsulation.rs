// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Encapsulation header framing.
//!
//! A DDS CDR stream starts with a 4-byte header:
//! - Byte 0: Unused (always 0)
//! - Byte 1: Encapsulation kind (endianness bit `0x01` | parameter-list bit `0x02`)
//! - Bytes 2-3: Options, in the declared byte order
//!
//! A CORBA CDR stream only carries the encapsulation kind byte. In both
//! cases alignment restarts right after the header.

use serde::{Deserialize, Serialize};

use crate::core::{CodecError, Endianness, Result as CoreResult};
use crate::types::CdrBuffer;

use super::cursor::Cdr;

/// Size of the DDS CDR encapsulation header (4 bytes).
pub const CDR_HEADER_SIZE: usize = 4;

/// Flavour of CDR stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CdrType {
    /// Plain CORBA CDR
    #[default]
    #[serde(rename = "corba")]
    CorbaCdr,
    /// DDS CDR, with a reserved byte and an options field in the header
    #[serde(rename = "dds")]
    DdsCdr,
}

/// Parameter-list bit of the encapsulation kind byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum DdsCdrPlFlag {
    /// Members are laid out positionally
    #[default]
    WithoutPl = 0x00,
    /// Members are encoded as a parameter list
    WithPl = 0x02,
}

impl<'a, B: CdrBuffer> Cdr<'a, B> {
    /// Get the parameter-list flag of the DDS encapsulation.
    #[inline]
    pub fn dds_cdr_pl_flag(&self) -> DdsCdrPlFlag {
        self.pl_flag
    }

    /// Set the parameter-list flag written by [`Cdr::serialize_encapsulation`].
    #[inline]
    pub fn set_dds_cdr_pl_flag(&mut self, pl_flag: DdsCdrPlFlag) {
        self.pl_flag = pl_flag;
    }

    /// Get the options field of the DDS encapsulation.
    #[inline]
    pub fn dds_cdr_options(&self) -> u16 {
        self.options
    }

    /// Set the options field written by [`Cdr::serialize_encapsulation`].
    #[inline]
    pub fn set_dds_cdr_options(&mut self, options: u16) {
        self.options = options;
    }

    /// Write the encapsulation header at the cursor.
    ///
    /// Call once, before the payload. On failure nothing is written.
    pub fn serialize_encapsulation(&mut self) -> CoreResult<&mut Self> {
        let start = self.state.current_position;
        self.atomically(|cdr| {
            if cdr.cdr_type == CdrType::DdsCdr {
                cdr.serialize(0u8)?;
            }

            let kind = cdr.pl_flag as u8 | cdr.endianness as u8;
            cdr.serialize(kind)?;

            if cdr.cdr_type == CdrType::DdsCdr {
                let options = cdr.options;
                cdr.serialize(options)?;
            }
            Ok(())
        })?;

        tracing::trace!(
            header = %hex::encode(&self.buffer.as_slice()[start..self.state.current_position]),
            cdr_type = ?self.cdr_type,
            "wrote CDR encapsulation"
        );

        self.reset_alignment();
        Ok(self)
    }

    /// Read the encapsulation header at the cursor.
    ///
    /// Adopts the endianness announced by the stream, toggling the swap flag
    /// when it differs from the declared one. A parameter-list bit on a
    /// CORBA CDR stream is rejected. On failure the engine is left exactly
    /// as it was, declared endianness included.
    pub fn read_encapsulation(&mut self) -> CoreResult<&mut Self> {
        let start = self.state.current_position;
        let endianness = self.endianness;
        let pl_flag = self.pl_flag;
        let options = self.options;

        let result = self.atomically(|cdr| {
            if cdr.cdr_type == CdrType::DdsCdr {
                let _dummy: u8 = cdr.deserialize()?;
            }

            let kind: u8 = cdr.deserialize()?;
            cdr.change_endianness(Endianness::from_kind_bit(kind));

            if kind & DdsCdrPlFlag::WithPl as u8 != 0 {
                if cdr.cdr_type != CdrType::DdsCdr {
                    return Err(CodecError::invalid_encoding(
                        "read_encapsulation",
                        format!("parameter list flag set in kind 0x{kind:02x} of a CORBA CDR stream"),
                    ));
                }
                cdr.pl_flag = DdsCdrPlFlag::WithPl;
            } else if cdr.cdr_type == CdrType::DdsCdr {
                cdr.pl_flag = DdsCdrPlFlag::WithoutPl;
            }

            if cdr.cdr_type == CdrType::DdsCdr {
                cdr.options = cdr.deserialize()?;
            }
            Ok(kind)
        });

        match result {
            Ok(kind) => {
                tracing::trace!(
                    header = %hex::encode(&self.buffer.as_slice()[start..self.state.current_position]),
                    kind,
                    endianness = ?self.endianness,
                    options = self.options,
                    "read CDR encapsulation"
                );
                self.reset_alignment();
                Ok(self)
            }
            Err(err) => {
                self.endianness = endianness;
                self.pl_flag = pl_flag;
                self.options = options;
                Err(err)
            }
        }
    }
}
