//! Quest success predicates.

use std::collections::VecDeque;

use crate::progression::CommandLogEntry;
use crate::vfs::{FileNode, VirtualFileSystem};

/// What a quest checks for.
///
/// Filesystem paths are resolved like any command argument: relative to
/// the CWD at evaluation time, or absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestCheck {
    /// Some logged command starts with this text.
    CommandUsed(&'static str),
    /// Some single logged command contains every fragment.
    CommandContains(&'static [&'static str]),
    /// Some logged output mentions this path.
    PathVisited(&'static str),
    NodeExists(&'static str),
    NodeAbsent(&'static str),
    /// A file exists at `path` and its content contains `needle`.
    FileContains {
        path: &'static str,
        needle: &'static str,
    },
    All(&'static [QuestCheck]),
}

/// Read-only evidence a check runs against.
#[derive(Debug, Clone, Copy)]
pub struct QuestView<'a> {
    pub log: &'a VecDeque<CommandLogEntry>,
    pub vfs: &'a VirtualFileSystem,
}

impl QuestCheck {
    pub fn is_satisfied(&self, view: &QuestView<'_>) -> bool {
        match *self {
            QuestCheck::CommandUsed(prefix) => {
                view.log.iter().any(|e| e.command.starts_with(prefix))
            }
            QuestCheck::CommandContains(fragments) => view
                .log
                .iter()
                .any(|e| fragments.iter().all(|f| e.command.contains(f))),
            QuestCheck::PathVisited(path) => view.log.iter().any(|e| e.output.contains(path)),
            QuestCheck::NodeExists(path) => view.vfs.resolve(path).node.is_some(),
            QuestCheck::NodeAbsent(path) => view.vfs.resolve(path).node.is_none(),
            QuestCheck::FileContains { path, needle } => view
                .vfs
                .resolve(path)
                .node
                .and_then(FileNode::content)
                .is_some_and(|content| content.contains(needle)),
            QuestCheck::All(checks) => checks.iter().all(|c| c.is_satisfied(view)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::ProgressionState;

    fn logged(commands: &[(&str, &str)]) -> ProgressionState {
        let mut state = ProgressionState::default();
        for (command, output) in commands {
            state.log_command(command, output, chrono::Utc::now());
        }
        state
    }

    #[test]
    fn test_command_used_is_prefix() {
        let state = logged(&[("cat notes.txt", "Welcome to ShellQuest!")]);
        let vfs = VirtualFileSystem::new();
        let view = QuestView {
            log: &state.command_log,
            vfs: &vfs,
        };
        assert!(QuestCheck::CommandUsed("cat notes").is_satisfied(&view));
        assert!(!QuestCheck::CommandUsed("notes").is_satisfied(&view));
    }

    #[test]
    fn test_command_contains_needs_one_entry() {
        let state = logged(&[("ls", ""), ("grep txt notes.txt", "")]);
        let vfs = VirtualFileSystem::new();
        let view = QuestView {
            log: &state.command_log,
            vfs: &vfs,
        };
        assert!(!QuestCheck::CommandContains(&["ls", "|", "grep"]).is_satisfied(&view));

        let state = logged(&[("ls | grep txt", "notes.txt")]);
        let view = QuestView {
            log: &state.command_log,
            vfs: &vfs,
        };
        assert!(QuestCheck::CommandContains(&["ls", "|", "grep"]).is_satisfied(&view));
    }

    #[test]
    fn test_path_visited_reads_output() {
        let state = logged(&[("cd tutorials", "/home/adventurer/tutorials")]);
        let vfs = VirtualFileSystem::new();
        let view = QuestView {
            log: &state.command_log,
            vfs: &vfs,
        };
        assert!(QuestCheck::PathVisited("/home/adventurer/tutorials").is_satisfied(&view));
    }

    #[test]
    fn test_filesystem_checks() {
        let state = ProgressionState::default();
        let mut vfs = VirtualFileSystem::new();
        vfs.mkdir("camp").unwrap();
        vfs.echo("gather wood", "camp/todo.txt").unwrap();
        let view = QuestView {
            log: &state.command_log,
            vfs: &vfs,
        };
        assert!(QuestCheck::NodeExists("camp").is_satisfied(&view));
        assert!(QuestCheck::NodeAbsent("travel.log").is_satisfied(&view));
        assert!(QuestCheck::FileContains {
            path: "/home/adventurer/camp/todo.txt",
            needle: "gather",
        }
        .is_satisfied(&view));
        assert!(!QuestCheck::FileContains {
            path: "camp",
            needle: "",
        }
        .is_satisfied(&view));
    }

    #[test]
    fn test_all_requires_every_check() {
        let state = logged(&[("rm travel.log", "Removed travel.log")]);
        let vfs = VirtualFileSystem::new();
        let view = QuestView {
            log: &state.command_log,
            vfs: &vfs,
        };
        let check = QuestCheck::All(&[
            QuestCheck::CommandContains(&["rm", "travel.log"]),
            QuestCheck::NodeAbsent("travel.log"),
        ]);
        assert!(check.is_satisfied(&view));
        assert!(!QuestCheck::All(&[QuestCheck::NodeAbsent("notes.txt")]).is_satisfied(&view));
    }
}
