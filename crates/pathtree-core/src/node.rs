//! Output tree nodes.

use compact_str::CompactString;
use serde::Serialize;

use crate::kind::FileType;
use crate::record::FileRecord;

/// A folder or leaf in a built tree.
///
/// Leaves borrow the record they were built from, so a tree cannot outlive
/// its input batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode<'a> {
    /// Full path for leaves, cumulative path for folders.
    pub id: String,

    /// Folder segment or file name.
    pub label: CompactString,

    /// Icon tag.
    pub file_type: FileType,

    /// Children in first-seen order (folders only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode<'a>>>,

    /// Source record (leaves only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a FileRecord>,
}

impl<'a> TreeNode<'a> {
    /// Create a leaf for a record.
    pub fn leaf(
        id: impl Into<String>,
        label: impl Into<CompactString>,
        file_type: FileType,
        record: &'a FileRecord,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            file_type,
            children: None,
            data: Some(record),
        }
    }

    /// Create a folder with the given children.
    pub fn folder(
        id: impl Into<String>,
        label: impl Into<CompactString>,
        children: Vec<TreeNode<'a>>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            file_type: FileType::Folder,
            children: Some(children),
            data: None,
        }
    }

    /// Check if this node is a folder.
    pub fn is_folder(&self) -> bool {
        self.children.is_some()
    }

    /// Check if this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Direct children, empty for leaves.
    pub fn children(&self) -> &[TreeNode<'a>] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Get the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Count leaves in this subtree (1 for a leaf).
    pub fn leaf_count(&self) -> usize {
        match &self.children {
            None => 1,
            Some(children) => children.iter().map(TreeNode::leaf_count).sum(),
        }
    }

    /// Height of this subtree; a leaf or empty folder is 0.
    pub fn depth(&self) -> usize {
        self.children()
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Find a node by id, depth-first.
    pub fn find(&self, id: &str) -> Option<&TreeNode<'a>> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }
}
