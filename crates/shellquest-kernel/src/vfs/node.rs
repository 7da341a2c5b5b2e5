//! Tree nodes.

use std::collections::BTreeMap;

/// A node in the VFS tree.
///
/// Names are unique within a parent; files and directories share that
/// namespace. `BTreeMap` keeps children sorted so listings need no extra work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNode {
    Directory { children: BTreeMap<String, FileNode> },
    File { content: String },
}

impl FileNode {
    /// Create an empty directory.
    pub fn dir() -> Self {
        FileNode::Directory {
            children: BTreeMap::new(),
        }
    }

    /// Create a file with the given content.
    pub fn file(content: impl Into<String>) -> Self {
        FileNode::File {
            content: content.into(),
        }
    }

    /// Builder helper: add a child to a directory.
    ///
    /// Calling this on a file returns the file unchanged.
    pub fn with_child(mut self, name: impl Into<String>, child: FileNode) -> Self {
        if let FileNode::Directory { children } = &mut self {
            children.insert(name.into(), child);
        }
        self
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, FileNode::Directory { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self, FileNode::File { .. })
    }

    /// Children of a directory, `None` for files.
    pub fn children(&self) -> Option<&BTreeMap<String, FileNode>> {
        match self {
            FileNode::Directory { children } => Some(children),
            FileNode::File { .. } => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut BTreeMap<String, FileNode>> {
        match self {
            FileNode::Directory { children } => Some(children),
            FileNode::File { .. } => None,
        }
    }

    /// Content of a file, `None` for directories.
    pub fn content(&self) -> Option<&str> {
        match self {
            FileNode::File { content } => Some(content),
            FileNode::Directory { .. } => None,
        }
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&FileNode> {
        self.children().and_then(|c| c.get(name))
    }
}
