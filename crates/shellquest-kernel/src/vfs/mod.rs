//! Virtual Filesystem (VFS) for ShellQuest.
//!
//! A single in-memory tree owned by one [`VirtualFileSystem`], plus a
//! current-working-directory pointer. Nothing here touches the real disk.
//!
//! # Design
//!
//! ```text
//! /                          # root directory
//! └── home/
//!     └── adventurer/        # starting CWD
//!         ├── notes.txt
//!         ├── tutorials/
//!         ├── forest/trail.txt
//!         └── caves/echo.txt
//! ```
//!
//! Paths are cleaned with a plain segment stack: `.` is dropped, `..` pops
//! (and is a no-op at the root). There are no symlinks, so resolution always
//! terminates in O(depth).

mod memory;
mod node;
mod seed;

pub use memory::{Resolved, VirtualFileSystem};
pub use node::FileNode;
pub use seed::{starter_layout, HOME_SEGMENTS};

use thiserror::Error;

/// Errors produced by filesystem primitives.
///
/// The interpreter renders these as plain output lines; they never escape
/// a command as a panic or a propagated error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    #[error("Path not found")]
    PathNotFound,
    #[error("Not a directory")]
    NotADirectory,
    #[error("Not a file")]
    NotAFile,
    #[error("Already exists")]
    AlreadyExists,
    #[error("Not found")]
    NotFound,
    #[error("Directory not empty")]
    DirectoryNotEmpty,
    #[error("Cannot remove the current directory")]
    CurrentDirectory,
}
