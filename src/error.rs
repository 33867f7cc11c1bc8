//! # Error Types
//!
//! Musical input never produces an error: unknown chord tokens, unparseable
//! keys and empty documents all resolve to well-defined fallback values.
//! The only fallible operations load declarative data, either a chord-type
//! table or an engine configuration.
//!
//! ## Error Types
//! - `Vocabulary` - chord-type table could not be read or breaks a table invariant
//! - `Config` - engine configuration could not be read or holds out-of-range values
//!
//! ## Usage
//! ```rust
//! use tonnetz::{EngineConfig, TonnetzError};
//!
//! match EngineConfig::from_yaml("chord-line-threshold: 2.0") {
//!     Ok(config) => println!("threshold {}", config.chord_line_threshold),
//!     Err(TonnetzError::Config(message)) => eprintln!("bad config: {}", message),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TonnetzError {
    /// Invalid chord-type table.
    ///
    /// # Example
    /// ```
    /// # use tonnetz::TonnetzError;
    /// let err = TonnetzError::Vocabulary("alias 'm' is used by both minor and min".to_string());
    /// assert_eq!(err.to_string(), "Invalid chord table: alias 'm' is used by both minor and min");
    /// ```
    #[error("Invalid chord table: {0}")]
    Vocabulary(String),

    /// Invalid engine configuration.
    ///
    /// # Example
    /// ```
    /// # use tonnetz::TonnetzError;
    /// let err = TonnetzError::Config("fallback-key must be between 0 and 11".to_string());
    /// assert_eq!(err.to_string(), "Invalid configuration: fallback-key must be between 0 and 11");
    /// ```
    #[error("Invalid configuration: {0}")]
    Config(String),
}
