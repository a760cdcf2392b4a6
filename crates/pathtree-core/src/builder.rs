//! Flat record list to nested folder tree.

use compact_str::CompactString;
use globset::GlobSet;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::TreeConfig;
use crate::error::BuildWarning;
use crate::kind::{FileType, classify_type};
use crate::node::TreeNode;
use crate::record::FileRecord;

/// Summary statistics for a built tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    /// Folder nodes, including the synthetic root.
    pub folders: usize,
    /// Leaf nodes.
    pub leaves: usize,
    /// Deepest leaf, counted in segments below the root.
    pub max_depth: usize,
    /// Records dropped for depth or id collisions.
    pub dropped: usize,
    /// Records skipped by exclude patterns.
    pub excluded: usize,
    /// Leaf count per type, in first-seen order.
    pub by_type: IndexMap<FileType, usize>,
}

impl TreeStats {
    /// Record a folder.
    pub fn record_folder(&mut self) {
        self.folders += 1;
    }

    /// Record a leaf at the given depth.
    pub fn record_leaf(&mut self, file_type: FileType, depth: usize) {
        self.leaves += 1;
        self.max_depth = self.max_depth.max(depth);
        *self.by_type.entry(file_type).or_default() += 1;
    }

    /// Record a dropped record.
    pub fn record_dropped(&mut self) {
        self.dropped += 1;
    }
}

/// A built tree along with what happened while building it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreeReport<'a> {
    /// Top-level nodes: empty, one leaf, or one root folder.
    pub nodes: Vec<TreeNode<'a>>,
    /// Common root of the kept records (empty when fewer than two).
    pub root: String,
    /// Summary statistics.
    pub stats: TreeStats,
    /// Records that were dropped, and why.
    pub warnings: Vec<BuildWarning>,
}

impl TreeReport<'_> {
    /// Check if any record was dropped.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Builds folder trees from flat record lists.
///
/// Stateless between calls; the same builder can be shared across threads.
#[derive(Debug, Clone)]
pub struct PathTreeBuilder {
    config: TreeConfig,
    exclude: GlobSet,
}

impl PathTreeBuilder {
    /// Create a builder with the default config.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Create a builder with a custom config.
    ///
    /// A `max_depth` of 0 (possible via struct literal or serde) is raised
    /// to 1 so top-level records still appear.
    pub fn with_config(mut config: TreeConfig) -> Self {
        if config.max_depth == 0 {
            tracing::warn!("max_depth 0 is not allowed, using 1");
            config.max_depth = 1;
        }
        let exclude = config.exclude_set();
        Self { config, exclude }
    }

    /// The config this builder was created with.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Build the tree, discarding stats and warnings.
    pub fn build<'a>(&self, records: &'a [FileRecord]) -> Vec<TreeNode<'a>> {
        self.build_with_report(records).nodes
    }

    /// Build the tree and report what was dropped along the way.
    pub fn build_with_report<'a>(&self, records: &'a [FileRecord]) -> TreeReport<'a> {
        let mut report = TreeReport::default();

        let kept: Vec<&'a FileRecord> = records
            .iter()
            .filter(|record| !self.exclude.is_match(&record.path))
            .collect();
        report.stats.excluded = records.len() - kept.len();

        match kept.as_slice() {
            [] => {}
            [record] => {
                let record = *record;
                let id = if record.path.is_empty() {
                    "."
                } else {
                    record.path.as_str()
                };
                let file_type = classify_type(record);
                report.stats.record_leaf(file_type, 0);
                report
                    .nodes
                    .push(TreeNode::leaf(id, record.display_name(), file_type, record));
            }
            _ => {
                let paths: Vec<&str> = kept.iter().map(|record| record.path.as_str()).collect();
                let root = common_root_of(&paths).to_string();

                let mut arena = Arena::new(&root);
                report.stats.record_folder();
                for record in kept.iter().copied() {
                    self.insert(&mut arena, &root, record, &mut report);
                }
                report.nodes.push(arena.into_tree());
                report.root = root;
            }
        }

        debug!(
            root = %report.root,
            folders = report.stats.folders,
            leaves = report.stats.leaves,
            dropped = report.stats.dropped,
            excluded = report.stats.excluded,
            "built path tree"
        );

        report
    }

    /// Walk one record down from the root, creating folders as needed.
    fn insert<'a>(
        &self,
        arena: &mut Arena<'a>,
        root: &str,
        record: &'a FileRecord,
        report: &mut TreeReport<'a>,
    ) {
        let path = record.path.as_str();
        let relative = relative_path(path, root);
        let segments: Vec<&str> = relative.split('/').collect();
        let max_depth = self.config.max_depth;

        let truncated = segments.len() > max_depth;
        let folders = if truncated {
            &segments[..max_depth]
        } else {
            &segments[..segments.len() - 1]
        };

        // Folder ids are prefixes of the record's own path.
        let mut end = path.len() - relative.len();
        let mut parent = Arena::ROOT;
        for (i, segment) in folders.iter().enumerate() {
            if i > 0 {
                end += 1;
            }
            end += segment.len();
            let id = &path[..end];

            parent = match arena.child(parent, id) {
                Some(index) if arena.is_folder(index) => index,
                Some(_) => {
                    report.stats.record_dropped();
                    report.warnings.push(BuildWarning::duplicate_id(path, id));
                    return;
                }
                None => {
                    trace!(%id, "creating folder");
                    report.stats.record_folder();
                    arena.push_folder(parent, id, segment)
                }
            };
        }

        if truncated {
            debug!(%path, segments = segments.len(), max_depth, "record exceeds max depth");
            report.stats.record_dropped();
            report.warnings.push(BuildWarning::depth_exceeded(
                path,
                segments.len(),
                max_depth,
            ));
            return;
        }

        if arena.child(parent, path).is_some() {
            report.stats.record_dropped();
            report.warnings.push(BuildWarning::duplicate_id(path, path));
            return;
        }

        let file_type = classify_type(record);
        report.stats.record_leaf(file_type, segments.len());
        arena.push_leaf(parent, record, file_type);
    }
}

impl Default for PathTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a tree with the default config.
pub fn build_tree(records: &[FileRecord]) -> Vec<TreeNode<'_>> {
    PathTreeBuilder::new().build(records)
}

/// Longest segment-wise path prefix shared by all records.
pub fn common_root(records: &[FileRecord]) -> String {
    let paths: Vec<&str> = records.iter().map(|record| record.path.as_str()).collect();
    common_root_of(&paths).to_string()
}

/// Accumulate the first path's segments while every path still starts with
/// the candidate plus a separator.
fn common_root_of<'p>(paths: &[&'p str]) -> &'p str {
    let Some(&first) = paths.first() else {
        return "";
    };

    let mut candidate = String::new();
    let mut root_len = 0;
    for segment in first.split('/') {
        candidate.push_str(segment);
        candidate.push('/');
        if !paths.iter().all(|path| path.starts_with(&candidate)) {
            break;
        }
        root_len = candidate.len() - 1;
    }

    &first[..root_len]
}

/// Path below the root, without the separator that follows it.
fn relative_path<'p>(path: &'p str, root: &str) -> &'p str {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.strip_prefix('/').unwrap_or(relative)
}

/// Per-call node storage. Children map ids to slot indices so folders can be
/// found and reused without walking the partial tree.
struct Arena<'a> {
    slots: Vec<Slot<'a>>,
}

struct Slot<'a> {
    id: String,
    label: CompactString,
    file_type: FileType,
    data: Option<&'a FileRecord>,
    children: IndexMap<String, usize>,
}

impl<'a> Arena<'a> {
    const ROOT: usize = 0;

    fn new(root: &str) -> Self {
        let label = root.rsplit('/').next().unwrap_or(root);
        Self {
            slots: vec![Slot {
                id: root.to_string(),
                label: label.into(),
                file_type: FileType::Folder,
                data: None,
                children: IndexMap::new(),
            }],
        }
    }

    fn child(&self, parent: usize, id: &str) -> Option<usize> {
        self.slots[parent].children.get(id).copied()
    }

    fn is_folder(&self, index: usize) -> bool {
        self.slots[index].data.is_none()
    }

    fn push_folder(&mut self, parent: usize, id: &str, label: &str) -> usize {
        self.push(
            parent,
            Slot {
                id: id.to_string(),
                label: label.into(),
                file_type: FileType::Folder,
                data: None,
                children: IndexMap::new(),
            },
        )
    }

    fn push_leaf(&mut self, parent: usize, record: &'a FileRecord, file_type: FileType) -> usize {
        self.push(
            parent,
            Slot {
                id: record.path.clone(),
                label: record.display_name().into(),
                file_type,
                data: Some(record),
                children: IndexMap::new(),
            },
        )
    }

    fn push(&mut self, parent: usize, slot: Slot<'a>) -> usize {
        let index = self.slots.len();
        self.slots[parent].children.insert(slot.id.clone(), index);
        self.slots.push(slot);
        index
    }

    fn into_tree(mut self) -> TreeNode<'a> {
        self.materialize(Self::ROOT)
    }

    fn materialize(&mut self, index: usize) -> TreeNode<'a> {
        let children = std::mem::take(&mut self.slots[index].children);
        let slot = &mut self.slots[index];
        let id = std::mem::take(&mut slot.id);
        let label = std::mem::take(&mut slot.label);
        let file_type = slot.file_type;
        let data = slot.data;

        match data {
            Some(record) => TreeNode::leaf(id, label, file_type, record),
            None => {
                let children = children
                    .into_values()
                    .map(|child| self.materialize(child))
                    .collect();
                TreeNode::folder(id, label, children)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WarningKind;

    fn records(paths: &[&str]) -> Vec<FileRecord> {
        paths
            .iter()
            .map(|&path| FileRecord::new(path, path.rsplit('/').next().unwrap_or(path)))
            .collect()
    }

    #[test]
    fn test_common_root_segment_wise() {
        assert_eq!(common_root_of(&["root/a/x", "root/b/y"]), "root");
        assert_eq!(common_root_of(&["root/a/x", "root/a/y"]), "root/a");
        assert_eq!(common_root_of(&["data/ab/x", "data/abc/y"]), "data");
        assert_eq!(common_root_of(&["a/x", "b/y"]), "");
        assert_eq!(common_root_of(&["/srv/a/x", "/srv/b/y"]), "/srv");
        assert_eq!(common_root_of(&["/a/x", "/b/y"]), "");
        assert_eq!(common_root_of(&[]), "");
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("root/a/x", "root"), "a/x");
        assert_eq!(relative_path("a/x", ""), "a/x");
        assert_eq!(relative_path("/a/x", ""), "a/x");
    }

    #[test]
    fn test_folder_reuse() {
        let input = records(&["r/a/x.json", "r/b/y.txt", "r/a/z.csv"]);
        let tree = build_tree(&input);
        let root = &tree[0];

        assert_eq!(root.child_count(), 2);
        assert_eq!(root.children()[0].id, "r/a");
        assert_eq!(root.children()[0].child_count(), 2);
        assert_eq!(root.children()[1].id, "r/b");
    }

    #[test]
    fn test_empty_segments_are_folders() {
        let input = records(&["r/a//x.txt", "r/b.txt"]);
        let tree = build_tree(&input);
        let a = &tree[0].children()[0];

        assert_eq!(a.id, "r/a");
        let empty = &a.children()[0];
        assert_eq!(empty.id, "r/a/");
        assert_eq!(empty.label, "");
        assert!(empty.is_folder());
        assert_eq!(empty.children()[0].id, "r/a//x.txt");
    }

    #[test]
    fn test_depth_cap_drops_record() {
        let config = TreeConfig::builder().max_depth(2usize).build().unwrap();
        let input = records(&["r/a/b/c.txt", "r/a/d.txt"]);
        let report = PathTreeBuilder::with_config(config).build_with_report(&input);
        let a = &report.nodes[0].children()[0];

        // r/a and r/a/b are created, c.txt is not.
        assert_eq!(a.id, "r/a");
        assert_eq!(a.children()[0].id, "r/a/b");
        assert_eq!(a.children()[0].child_count(), 0);
        assert_eq!(a.children()[1].id, "r/a/d.txt");
        assert_eq!(report.stats.dropped, 1);
        assert_eq!(report.stats.leaves, 1);
        assert_eq!(report.warnings[0].path, "r/a/b/c.txt");
    }

    #[test]
    fn test_leaf_then_folder_collision() {
        let input = records(&["r/a", "r/a/x.txt", "r/b"]);
        let report = PathTreeBuilder::new().build_with_report(&input);
        let root = &report.nodes[0];

        assert_eq!(root.child_count(), 2);
        assert!(root.children()[0].is_leaf());
        assert_eq!(report.stats.dropped, 1);
        assert_eq!(report.warnings[0].path, "r/a/x.txt");
    }

    #[test]
    fn test_duplicate_leaf_keeps_first() {
        let mut input = records(&["r/a.txt", "r/a.txt", "r/b.txt"]);
        input[1].extra.insert("copy".to_string(), true.into());
        let report = PathTreeBuilder::new().build_with_report(&input);
        let root = &report.nodes[0];

        assert_eq!(root.child_count(), 2);
        let kept = &root.children()[0];
        assert_eq!(kept.id, "r/a.txt");
        assert!(std::ptr::eq(kept.data.unwrap(), &input[0]));
        assert_eq!(report.stats.leaves, 2);
        assert_eq!(report.stats.dropped, 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::DuplicateId);
        assert_eq!(report.warnings[0].path, "r/a.txt");
    }

    #[test]
    fn test_zero_max_depth_is_raised() {
        let config = TreeConfig {
            max_depth: 0,
            exclude_patterns: Vec::new(),
        };
        let builder = PathTreeBuilder::with_config(config);
        assert_eq!(builder.config().max_depth, 1);

        let input = records(&["r/x.txt", "r/y.json"]);
        let report = builder.build_with_report(&input);
        assert_eq!(report.nodes[0].child_count(), 2);
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_stats() {
        let input = records(&["r/a/x.json", "r/a/y.json", "r/z.png"]);
        let report = PathTreeBuilder::new().build_with_report(&input);

        assert_eq!(report.root, "r");
        assert_eq!(report.stats.folders, 2);
        assert_eq!(report.stats.leaves, 3);
        assert_eq!(report.stats.max_depth, 2);
        assert_eq!(report.stats.by_type.get(&FileType::Json), Some(&2));
        assert_eq!(report.stats.by_type.get(&FileType::Image), Some(&1));
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_single_record_with_empty_path() {
        let input = vec![FileRecord::new("", "orphan")];
        let tree = build_tree(&input);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, ".");
        assert_eq!(tree[0].label, "orphan");
    }
}
