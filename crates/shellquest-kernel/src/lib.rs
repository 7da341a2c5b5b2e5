//! shellquest-kernel: the core of ShellQuest.
//!
//! This crate provides:
//!
//! - **VFS**: an in-memory directory tree with a current working directory
//! - **Interpreter**: tokenizes lines with logos, dispatches commands, and
//!   runs single-stage `<cmd> | grep <pattern>` pipelines
//! - **Progression**: player stats, rewards, leveling, upgrades, streaks
//! - **Quests**: the quest catalog, check kinds, and zone gating
//! - **Sync**: last-writer-wins save reconciliation and debounced autosave
//! - **Accounts**: local and cloud profiles
//! - **Kernel**: the session façade tying it all together

pub mod account;
pub mod completion;
pub mod interpreter;
pub mod kernel;
pub mod progression;
pub mod quests;
pub mod store;
pub mod sync;
pub mod vfs;

pub use interpreter::{ExecResult, Status};
pub use kernel::{Collaborators, Kernel, KernelConfig, Turn};
