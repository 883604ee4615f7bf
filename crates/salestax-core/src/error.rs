//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used by the sales tax core. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Only loading can fail: reading a rate table, reading a settings file,
//!   or compiling the free-text pattern.
//! - The calculation pipeline itself never returns an error. Insufficient
//!   input and unknown jurisdictions are ordinary states of
//!   [`crate::session::CalculatorState`].
//! - Table validation errors name the country, region and component that
//!   carry the offending value.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the sales tax core.
#[derive(Error, Debug)]
pub enum SalesTaxError {
    /// The reference table could not be loaded or failed validation.
    #[error("tax table error: {0}")]
    Table(#[from] TableError),

    /// The settings file could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The free-text extraction pattern failed to compile.
    #[error("free-text pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Error while loading or validating a [`crate::table::ReferenceTable`].
#[derive(Error, Debug)]
pub enum TableError {
    /// The table file could not be read.
    #[error("failed to read tax table {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The table document is not valid YAML/JSON or has the wrong shape.
    #[error("failed to parse tax table: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A country key is empty or whitespace.
    #[error("country key must not be empty")]
    EmptyCountry,

    /// A region key is empty or whitespace.
    #[error("region key in {country} must not be empty")]
    EmptyRegion {
        /// Country containing the empty region key.
        country: String,
    },

    /// A component rate is negative, NaN or infinite.
    #[error("rate for {component} in {country}/{region} must be a finite non-negative fraction, got {rate}")]
    InvalidRate {
        /// Country key.
        country: String,
        /// Region key.
        region: String,
        /// Component name.
        component: String,
        /// The rejected rate.
        rate: f64,
    },
}

/// Error while loading [`crate::settings::Settings`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read settings file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings document is not valid YAML or contains unknown keys.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_yaml::Error),
}
