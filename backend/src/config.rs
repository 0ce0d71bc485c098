//! Invocation options.
//!
//! Defaults can be overridden from the environment (the binary loads `.env`
//! first):
//! - `TRANSCO_HEADER_ROW`: 1-based row holding the source headers
//! - `TRANSCO_JOIN_SEPARATOR`: separator for fields without a split delimiter

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::transform::writer::DEFAULT_JOIN_SEPARATOR;

pub const ENV_HEADER_ROW: &str = "TRANSCO_HEADER_ROW";
pub const ENV_JOIN_SEPARATOR: &str = "TRANSCO_JOIN_SEPARATOR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscodeOptions {
    /// Row of the source dataset holding field names (1-based)
    pub header_row: usize,

    /// Used to join values when a field has no split delimiter
    pub join_separator: String,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            header_row: 1,
            join_separator: DEFAULT_JOIN_SEPARATOR.to_string(),
        }
    }
}

impl TranscodeOptions {
    /// Defaults overlaid with `TRANSCO_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigurationError> {
        let mut options = Self::default();

        if let Some(raw) = lookup(ENV_HEADER_ROW) {
            options.header_row = raw
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigurationError::InvalidSetting {
                    key: ENV_HEADER_ROW.to_string(),
                    message: e.to_string(),
                })?;
        }

        if let Some(separator) = lookup(ENV_JOIN_SEPARATOR) {
            options.join_separator = separator;
        }

        options.validate()?;
        Ok(options)
    }

    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.header_row == 0 {
            return Err(ConfigurationError::InvalidHeaderRow(self.header_row));
        }
        Ok(())
    }
}
