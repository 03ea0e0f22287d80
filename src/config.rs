//! Configuration types for feeds and chat builds.
//!
//! Plain structs with builder-style setters, usable without any CLI layer.
//!
//! - [`FeedConfig`] - how export files are decoded
//! - [`BuildConfig`] - who owns the chat and how progress is reported
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use chatdemux::config::{BuildConfig, FeedConfig};
//!
//! let feed = FeedConfig::new().with_fix_encoding(false);
//! let build = BuildConfig::new("Alice").with_progress_interval(Duration::from_secs(5));
//! assert!(!feed.fix_encoding);
//! assert_eq!(build.owner_name, "Alice");
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for decoding export files.
///
/// # Example
///
/// ```rust
/// use chatdemux::config::FeedConfig;
///
/// let config = FeedConfig::raw();
/// assert!(!config.fix_encoding);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Undo the exporter's latin-1 mojibake on every decoded string (default: true)
    pub fix_encoding: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { fix_encoding: true }
    }
}

impl FeedConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that keeps strings exactly as exported.
    pub fn raw() -> Self {
        Self {
            fix_encoding: false,
        }
    }

    /// Enables or disables mojibake repair.
    #[must_use]
    pub fn with_fix_encoding(mut self, enabled: bool) -> Self {
        self.fix_encoding = enabled;
        self
    }
}

/// Configuration for one chat build.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use chatdemux::config::BuildConfig;
///
/// let config = BuildConfig::new("Alice");
/// assert!(config.progress_interval.is_none());
///
/// let config = config.with_progress_interval(Duration::from_millis(500));
/// assert_eq!(config.progress_interval, Some(Duration::from_millis(500)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Account name of the person who downloaded the archive
    pub owner_name: String,

    /// Report progress at this interval (default: never)
    #[serde(default)]
    pub progress_interval: Option<Duration>,
}

impl BuildConfig {
    /// Creates a configuration for a chat owned by `owner_name`.
    pub fn new(owner_name: impl Into<String>) -> Self {
        Self {
            owner_name: owner_name.into(),
            progress_interval: None,
        }
    }

    /// Sets how often progress is reported.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    /// Disables progress reporting.
    #[must_use]
    pub fn without_progress(mut self) -> Self {
        self.progress_interval = None;
        self
    }
}
