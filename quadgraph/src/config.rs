//! Store configuration module.
//!
//! This module loads writer tolerance and `MemStore` behaviour from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `QUADGRAPH_IGNORE_DUPLICATE`: skip duplicate adds (default: `false`)
//! - `QUADGRAPH_IGNORE_MISSING`: skip removes of missing quads (default: `false`)
//! - `QUADGRAPH_NODE_GC`: `immediate`, `deferred` or `disabled` (default: `immediate`)
//! - `QUADGRAPH_SIZE_ACCOUNTING`: `quads-and-values` or `quads-only` (default: `quads-and-values`)
//! - `QUADGRAPH_TIME_PRECISION`: `ns`, `us` or `ms` (default: `ns`)
//! - `QUADGRAPH_TIME_ROUND`: round instead of truncate timestamps (default: `false`)
//! - `QUADGRAPH_UNTYPED`: store values as raw text (default: `false`)
//! - `QUADGRAPH_OPTIMIZE_COMPARISON`: answer comparisons from the value table (default: `false`)
//! - `QUADGRAPH_GC_BATCH_SIZE`: values reclaimed per GC tick (default: `100`)

use crate::store::gc::{DEFAULT_GC_BATCH_SIZE, GcConfig};
use crate::store::{MemStore, MemStoreOptions, NodeGc, SizeAccounting};
use crate::types::TimePrecision;
use crate::writer::WriterOptions;

/// Store configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreConfig {
    pub writer: WriterOptions,
    pub store: MemStoreOptions,
    pub gc: GcConfig,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn invalid(name: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        message,
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is set to a value it does not accept.
    pub fn from_env() -> Result<Self, ConfigError> {
        let var = |name: &str| std::env::var(name).ok();
        Ok(Self {
            writer: WriterOptions {
                ignore_duplicate: parse_bool(
                    "QUADGRAPH_IGNORE_DUPLICATE",
                    var("QUADGRAPH_IGNORE_DUPLICATE"),
                )?,
                ignore_missing: parse_bool(
                    "QUADGRAPH_IGNORE_MISSING",
                    var("QUADGRAPH_IGNORE_MISSING"),
                )?,
            },
            store: MemStoreOptions {
                node_gc: parse_node_gc(var("QUADGRAPH_NODE_GC"))?,
                size_accounting: parse_size_accounting(var("QUADGRAPH_SIZE_ACCOUNTING"))?,
                time_precision: parse_time_precision(var("QUADGRAPH_TIME_PRECISION"))?,
                time_round: parse_bool("QUADGRAPH_TIME_ROUND", var("QUADGRAPH_TIME_ROUND"))?,
                untyped: parse_bool("QUADGRAPH_UNTYPED", var("QUADGRAPH_UNTYPED"))?,
                optimizes_comparison: parse_bool(
                    "QUADGRAPH_OPTIMIZE_COMPARISON",
                    var("QUADGRAPH_OPTIMIZE_COMPARISON"),
                )?,
            },
            gc: GcConfig {
                batch_size: parse_batch_size(var("QUADGRAPH_GC_BATCH_SIZE"))?,
            },
        })
    }

    /// A `MemStore` with this configuration.
    #[must_use]
    pub fn build_store(&self) -> MemStore {
        MemStore::new(self.store).with_gc_config(self.gc)
    }
}

/// Parse a boolean flag. Unset means `false`.
pub fn parse_bool(name: &str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(invalid(name, format!("'{value}' is not a boolean"))),
    }
}

pub fn parse_node_gc(value: Option<String>) -> Result<NodeGc, ConfigError> {
    match value.as_deref() {
        None | Some("immediate") => Ok(NodeGc::Immediate),
        Some("deferred") => Ok(NodeGc::Deferred),
        Some("disabled") => Ok(NodeGc::Disabled),
        Some(other) => Err(invalid(
            "QUADGRAPH_NODE_GC",
            format!("'{other}' is not one of immediate, deferred, disabled"),
        )),
    }
}

pub fn parse_size_accounting(value: Option<String>) -> Result<SizeAccounting, ConfigError> {
    match value.as_deref() {
        None | Some("quads-and-values") => Ok(SizeAccounting::QuadsAndValues),
        Some("quads-only") => Ok(SizeAccounting::QuadsOnly),
        Some(other) => Err(invalid(
            "QUADGRAPH_SIZE_ACCOUNTING",
            format!("'{other}' is not one of quads-and-values, quads-only"),
        )),
    }
}

pub fn parse_time_precision(value: Option<String>) -> Result<TimePrecision, ConfigError> {
    match value.as_deref() {
        None | Some("ns") => Ok(TimePrecision::Nanos),
        Some("us") => Ok(TimePrecision::Micros),
        Some("ms") => Ok(TimePrecision::Millis),
        Some(other) => Err(invalid(
            "QUADGRAPH_TIME_PRECISION",
            format!("'{other}' is not one of ns, us, ms"),
        )),
    }
}

pub fn parse_batch_size(value: Option<String>) -> Result<usize, ConfigError> {
    let Some(value) = value else {
        return Ok(DEFAULT_GC_BATCH_SIZE);
    };
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(
            "QUADGRAPH_GC_BATCH_SIZE",
            format!("'{value}' is not a positive integer"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert!(!config.writer.ignore_duplicate);
        assert_eq!(config.store.node_gc, NodeGc::Immediate);
        assert_eq!(config.gc.batch_size, 100);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("X", None), Ok(false));
        assert_eq!(parse_bool("X", some("TRUE")), Ok(true));
        assert_eq!(parse_bool("X", some("0")), Ok(false));
        assert!(parse_bool("X", some("maybe")).is_err());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!(parse_node_gc(some("deferred")), Ok(NodeGc::Deferred));
        assert_eq!(parse_node_gc(None), Ok(NodeGc::Immediate));
        assert!(parse_node_gc(some("later")).is_err());
        assert_eq!(
            parse_size_accounting(some("quads-only")),
            Ok(SizeAccounting::QuadsOnly)
        );
        assert_eq!(parse_time_precision(some("ms")), Ok(TimePrecision::Millis));
        assert!(parse_time_precision(some("s")).is_err());
    }

    #[test]
    fn test_parse_batch_size() {
        assert_eq!(parse_batch_size(None), Ok(100));
        assert_eq!(parse_batch_size(some("7")), Ok(7));
        assert!(parse_batch_size(some("0")).is_err());
        assert!(parse_batch_size(some("-1")).is_err());
    }

    #[test]
    fn test_config_error_display_invalid() {
        let error = ConfigError::InvalidValue {
            name: "TEST_VAR".to_string(),
            message: "bad value".to_string(),
        };
        assert_eq!(error.to_string(), "invalid value for TEST_VAR: bad value");
    }
}
