//! Tree building configuration.

use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

/// Default cap on folder levels below the computed root.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Configuration for building a tree.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct TreeConfig {
    /// Maximum number of segments below the root a record may have.
    #[builder(default = "DEFAULT_MAX_DEPTH")]
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Glob patterns matched against record paths; matches are skipped.
    #[builder(default)]
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl TreeConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_depth == Some(0) {
            return Err("max_depth must be at least 1".to_string());
        }
        if let Some(ref patterns) = self.exclude_patterns {
            for pattern in patterns {
                Glob::new(pattern).map_err(|e| format!("Invalid exclude pattern {pattern:?}: {e}"))?;
            }
        }
        Ok(())
    }
}

impl TreeConfig {
    /// Create a new tree config builder.
    pub fn builder() -> TreeConfigBuilder {
        TreeConfigBuilder::default()
    }

    /// Create a config with default settings.
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            exclude_patterns: Vec::new(),
        }
    }

    /// Compile the exclude patterns.
    ///
    /// Invalid patterns can only get here through deserialization or direct
    /// field access; they are skipped rather than failing the build.
    pub fn exclude_set(&self) -> GlobSet {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude_patterns {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(err) => tracing::warn!(%pattern, %err, "ignoring invalid exclude pattern"),
            }
        }
        builder.build().unwrap_or_else(|err| {
            tracing::warn!(%err, "failed to compile exclude patterns");
            GlobSet::empty()
        })
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}
