//! Engine configuration.

use crate::generate::DEFAULT_TIMEOUT;
use crate::types::MergeStrategy;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for opening an engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace root directory.
    pub root: PathBuf,

    /// Bound on a single generation call.
    pub generation_timeout: Duration,

    /// Strategy used by verbs that do not take an explicit one.
    pub default_strategy: MergeStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: default_root(),
            generation_timeout: DEFAULT_TIMEOUT,
            default_strategy: MergeStrategy::Overlay,
        }
    }
}

impl Config {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the workspace root.
    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Sets the generation timeout.
    #[must_use]
    pub const fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Sets the default merge strategy.
    #[must_use]
    pub const fn default_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }
}

/// The per-user default root: `$HOME/.fabula`, or `./.fabula` when no home
/// directory is known.
#[must_use]
pub fn default_root() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(".fabula")
}
