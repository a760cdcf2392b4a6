//! Core types and tree builder for pathtree.
//!
//! Turns a flat listing of stored files (each with a slash-separated path)
//! into a nested folder tree for tree-view widgets:
//!
//! - The longest common path prefix becomes a synthetic root folder
//! - Intermediate folders are created once and reused, in first-seen order
//! - Leaves are tagged by content type or extension for icon selection
//! - Records deeper than the configured cap are dropped below the cap
//!
//! ```rust,ignore
//! use pathtree_core::{FileRecord, build_tree};
//!
//! let records = vec![
//!     FileRecord::new("runs/a/metrics.json", "metrics.json"),
//!     FileRecord::new("runs/b/plot.png", "plot.png"),
//! ];
//! let tree = build_tree(&records);
//!
//! assert_eq!(tree[0].id, "runs");
//! assert_eq!(tree[0].child_count(), 2);
//! ```

mod builder;
mod config;
mod error;
mod kind;
mod node;
mod record;

pub use builder::{PathTreeBuilder, TreeReport, TreeStats, build_tree, common_root};
pub use config::{DEFAULT_MAX_DEPTH, TreeConfig, TreeConfigBuilder, TreeConfigBuilderError};
pub use error::{BuildWarning, LoadError, WarningKind};
pub use kind::{FileType, classify_type};
pub use node::TreeNode;
pub use record::{FileRecord, load_records, parse_records, read_records};
