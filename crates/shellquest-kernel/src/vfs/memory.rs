//! In-memory filesystem implementation.
//!
//! Holds the whole tree plus the CWD. The tree is only mutated through the
//! operation set below; quest checks and the interpreter get shared borrows.

use std::collections::BTreeMap;

use super::node::FileNode;
use super::seed::{starter_layout, HOME_SEGMENTS};
use super::VfsError;

/// The virtual filesystem: one exclusively-owned tree and a CWD.
///
/// Invariant: `cwd` always names an existing directory.
#[derive(Debug, Clone)]
pub struct VirtualFileSystem {
    root: FileNode,
    cwd: Vec<String>,
}

/// Result of resolving a path.
///
/// `node` is `None` when nothing lives at the cleaned path; callers decide
/// which error that maps to.
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    pub node: Option<&'a FileNode>,
    pub segments: Vec<String>,
}

impl Resolved<'_> {
    /// The cleaned path rendered as an absolute string.
    pub fn absolute_path(&self) -> String {
        render(&self.segments)
    }
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFileSystem {
    /// Create a filesystem seeded with the starter layout, CWD at the
    /// adventurer's home.
    pub fn new() -> Self {
        Self {
            root: starter_layout(),
            cwd: HOME_SEGMENTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create a filesystem from an arbitrary tree with the CWD at `/`.
    ///
    /// A file is not a valid root; it is replaced by an empty directory.
    pub fn with_root(root: FileNode) -> Self {
        let root = if root.is_dir() { root } else { FileNode::dir() };
        Self {
            root,
            cwd: Vec::new(),
        }
    }

    /// Clean a path into absolute segments: resolve `.` and `..` against
    /// the CWD (or the root for absolute paths).
    fn normalize(&self, path: &str) -> Vec<String> {
        let mut result = if path.starts_with('/') {
            Vec::new()
        } else {
            self.cwd.clone()
        };
        for part in path.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    result.pop();
                }
                name => result.push(name.to_string()),
            }
        }
        result
    }

    /// Resolve a path. Never fails; a missing target yields `node: None`.
    pub fn resolve(&self, path: &str) -> Resolved<'_> {
        let segments = self.normalize(path);
        Resolved {
            node: self.node(&segments),
            segments,
        }
    }

    /// Walk absolute segments from the root.
    pub fn node<S: AsRef<str>>(&self, segments: &[S]) -> Option<&FileNode> {
        let mut node = &self.root;
        for segment in segments {
            node = node.child(segment.as_ref())?;
        }
        Some(node)
    }

    fn node_mut(&mut self, segments: &[String]) -> Option<&mut FileNode> {
        let mut node = &mut self.root;
        for segment in segments {
            node = node.children_mut()?.get_mut(segment)?;
        }
        Some(node)
    }

    /// Split a path into its cleaned parent segments and the leaf name.
    ///
    /// Returns `None` when the path has no nameable leaf (`/`, `.`, `..`).
    fn split_parent(&self, path: &str) -> Option<(Vec<String>, String)> {
        let trimmed = path.trim_end_matches('/');
        let (dir, leaf) = match trimmed.rfind('/') {
            Some(idx) => (&trimmed[..=idx], &trimmed[idx + 1..]),
            None => ("", trimmed),
        };
        if leaf.is_empty() || leaf == "." || leaf == ".." {
            return None;
        }
        Some((self.normalize(dir), leaf.to_string()))
    }

    fn dir_children_mut(
        &mut self,
        segments: &[String],
    ) -> Result<&mut BTreeMap<String, FileNode>, VfsError> {
        self.node_mut(segments)
            .ok_or(VfsError::PathNotFound)?
            .children_mut()
            .ok_or(VfsError::NotADirectory)
    }

    /// Current directory as absolute segments.
    pub fn cwd(&self) -> &[String] {
        &self.cwd
    }

    pub fn pwd(&self) -> String {
        render(&self.cwd)
    }

    /// List a directory (the CWD when `path` is `None`), sorted by name.
    pub fn ls(&self, path: Option<&str>) -> Result<Vec<String>, VfsError> {
        let node = self
            .resolve(path.unwrap_or(""))
            .node
            .ok_or(VfsError::PathNotFound)?;
        let children = node.children().ok_or(VfsError::NotADirectory)?;
        Ok(children.keys().cloned().collect())
    }

    /// Change directory. The CWD is only replaced once the target is known
    /// to be a directory.
    pub fn cd(&mut self, path: &str) -> Result<String, VfsError> {
        let resolved = self.resolve(path);
        match resolved.node {
            None => Err(VfsError::PathNotFound),
            Some(node) if !node.is_dir() => Err(VfsError::NotADirectory),
            Some(_) => {
                let segments = resolved.segments;
                self.cwd = segments;
                Ok(self.pwd())
            }
        }
    }

    /// Create a directory. Fails if anything already has the name.
    pub fn mkdir(&mut self, name: &str) -> Result<(), VfsError> {
        let (parent, leaf) = self.split_parent(name).ok_or(VfsError::AlreadyExists)?;
        let children = self.dir_children_mut(&parent)?;
        if children.contains_key(&leaf) {
            return Err(VfsError::AlreadyExists);
        }
        children.insert(leaf, FileNode::dir());
        Ok(())
    }

    /// Create an empty file if absent. Existing nodes are left untouched.
    pub fn touch(&mut self, name: &str) -> Result<(), VfsError> {
        let Some((parent, leaf)) = self.split_parent(name) else {
            // `.`, `..` and `/` always name an existing directory
            return Ok(());
        };
        let children = self.dir_children_mut(&parent)?;
        children.entry(leaf).or_insert_with(|| FileNode::file(""));
        Ok(())
    }

    /// Remove a single file or empty directory.
    pub fn rm(&mut self, path: &str) -> Result<(), VfsError> {
        let (parent, leaf) = self.split_parent(path).ok_or(VfsError::NotFound)?;

        let mut target = parent.clone();
        target.push(leaf.clone());
        if self.cwd == target {
            return Err(VfsError::CurrentDirectory);
        }

        let children = self
            .node_mut(&parent)
            .and_then(FileNode::children_mut)
            .ok_or(VfsError::NotFound)?;
        match children.get(&leaf) {
            None => return Err(VfsError::NotFound),
            Some(FileNode::Directory { children: inner }) if !inner.is_empty() => {
                return Err(VfsError::DirectoryNotEmpty);
            }
            Some(_) => {}
        }
        children.remove(&leaf);
        Ok(())
    }

    /// Read a file.
    pub fn cat(&self, path: &str) -> Result<&str, VfsError> {
        match self.resolve(path).node {
            None => Err(VfsError::NotFound),
            Some(node) => node.content().ok_or(VfsError::NotAFile),
        }
    }

    /// Create or overwrite a file with `content`.
    pub fn echo(&mut self, content: &str, path: &str) -> Result<(), VfsError> {
        let (parent, leaf) = self.split_parent(path).ok_or(VfsError::NotAFile)?;
        let children = self
            .dir_children_mut(&parent)
            .map_err(|_| VfsError::PathNotFound)?;
        if children.get(&leaf).is_some_and(FileNode::is_dir) {
            return Err(VfsError::NotAFile);
        }
        children.insert(leaf, FileNode::file(content));
        Ok(())
    }

    /// Lines of a file containing `pattern` (case-sensitive substring).
    pub fn grep(&self, pattern: &str, path: &str) -> Result<Vec<String>, VfsError> {
        let content = self.cat(path)?;
        Ok(content
            .lines()
            .filter(|line| line.contains(pattern))
            .map(str::to_string)
            .collect())
    }

    /// Every path below the CWD, relative to it (for completion).
    pub fn paths_below_cwd(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(node) = self.node(&self.cwd) {
            collect_paths("", node, &mut out);
        }
        out
    }
}

fn collect_paths(prefix: &str, node: &FileNode, out: &mut Vec<String>) {
    let Some(children) = node.children() else {
        return;
    };
    for (name, child) in children {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        out.push(path.clone());
        collect_paths(&path, child, out);
    }
}

fn render(segments: &[String]) -> String {
    format!("/{}", segments.join("/"))
}
