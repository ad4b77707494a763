//! Document synopsis (outline / table of contents) tree.

use crate::DocumentViewport;

/// One entry in the document synopsis tree.
///
/// Children nest arbitrarily deep; the build in the session crate caps depth,
/// so the structure is a tree and never a cycle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SynopsisNode {
    /// Entry title.
    pub title: String,
    /// In-document destination, if the entry has one.
    pub target: Option<DocumentViewport>,
    /// External destination (another file), if the entry has one.
    pub external: Option<String>,
    /// Child entries.
    pub children: Vec<SynopsisNode>,
}

impl SynopsisNode {
    /// A leaf entry with a title and optional in-document target.
    pub fn new(title: impl Into<String>, target: Option<DocumentViewport>) -> Self {
        Self {
            title: title.into(),
            target,
            external: None,
            children: Vec::new(),
        }
    }

    /// Total number of entries in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SynopsisNode::node_count).sum::<usize>()
    }
}
