// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Buffer types shared by the CDR engine.

pub mod buffer;

pub use buffer::{CdrBuffer, FastBuffer, BUFFER_START_LENGTH};
