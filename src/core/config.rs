// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Engine and buffer configuration.
//!
//! A [`CdrConfig`] can be built in code or loaded from TOML:
//!
//! ```
//! use fastcdr::core::CdrConfig;
//! use fastcdr::encoding::cdr::CdrType;
//! use fastcdr::Endianness;
//!
//! let config = CdrConfig::from_toml_str(
//!     r#"
//!     endianness = "big"
//!     cdr_type = "dds"
//!     initial_capacity = 64
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.endianness, Endianness::Big);
//! assert_eq!(config.cdr_type, CdrType::DdsCdr);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Endianness;
use crate::encoding::cdr::CdrType;

/// Errors raised while loading a [`CdrConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("Failed to parse CDR configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("Failed to render CDR configuration: {0}")]
    Render(#[from] toml::ser::Error),

    /// A value is out of range.
    #[error("Invalid CDR configuration: {0}")]
    Invalid(String),
}

/// Configuration of a CDR engine and of the buffer it writes into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CdrConfig {
    /// Declared byte order of the stream
    pub endianness: Endianness,
    /// Plain CORBA CDR or DDS CDR (with options in the encapsulation)
    pub cdr_type: CdrType,
    /// Bytes allocated up front by an internal buffer
    pub initial_capacity: usize,
    /// Upper bound on the size an internal buffer may grow to
    pub max_buffer_size: Option<usize>,
}

impl Default for CdrConfig {
    fn default() -> Self {
        Self {
            endianness: Endianness::NATIVE,
            cdr_type: CdrType::CorbaCdr,
            initial_capacity: 0,
            max_buffer_size: None,
        }
    }
}

impl CdrConfig {
    /// Parse a configuration from a TOML document.
    ///
    /// Missing keys take their default value.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: CdrConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Check that the values are consistent with each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(max) = self.max_buffer_size {
            if self.initial_capacity > max {
                return Err(ConfigError::Invalid(format!(
                    "initial_capacity {} exceeds max_buffer_size {}",
                    self.initial_capacity, max
                )));
            }
        }
        Ok(())
    }
}
