//! The command interpreter.
//!
//! A raw line goes through three steps:
//!
//! ```text
//! line ──► lexer::tokenize ──► command::parse ──► dispatch ──► ExecResult
//!                                   │
//!                          `<cmd> | grep <pat>` runs <cmd>, then filters
//! ```
//!
//! Whatever happens, the line and its flattened output are appended to the
//! command log exactly once. That log is the evidence quests are judged on.

mod card;
mod command;
mod dispatch;
mod lexer;
mod result;
mod system;

pub use command::{parse, Command, PackageManager, COMMAND_NAMES};
pub use lexer::{tokenize, Spanned, Token};
pub use result::{ExecResult, Status};
pub use system::{Process, ProcessStatus, SimulatedSystem};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::account::AccountManager;
use crate::progression::ProgressionState;
use crate::quests::QuestEngine;
use crate::vfs::VirtualFileSystem;

/// Output of a pipeline that filtered everything away.
pub const NO_MATCHES: &str = "(no matches)";

/// Everything a command may read or change, borrowed for one execution.
pub struct ExecContext<'a> {
    pub vfs: &'a mut VirtualFileSystem,
    pub progression: &'a mut ProgressionState,
    pub quests: &'a QuestEngine,
    pub accounts: &'a AccountManager,
    /// Timestamp for the log entry and anything the command stamps.
    pub now: DateTime<Utc>,
}

/// Session-scoped interpreter state.
#[derive(Debug, Clone)]
pub struct Interpreter {
    system: SimulatedSystem,
    /// Base hint cooldown before upgrades.
    hint_cooldown: TimeDelta,
    last_hint: Option<DateTime<Utc>>,
    /// Index of the next tip `tips` shows.
    tip_cursor: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(TimeDelta::seconds(20))
    }
}

impl Interpreter {
    pub fn new(hint_cooldown: TimeDelta) -> Self {
        Self {
            system: SimulatedSystem::new(),
            hint_cooldown,
            last_hint: None,
            tip_cursor: 0,
        }
    }

    pub fn system(&self) -> &SimulatedSystem {
        &self.system
    }

    /// Execute one input line. Never fails: errors come back as
    /// [`Status::Error`] results.
    pub async fn execute(&mut self, line: &str, ctx: &mut ExecContext<'_>) -> ExecResult {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return ExecResult::empty();
        }

        let command = parse(trimmed);
        debug!(?command, "dispatch");
        let result = match command {
            Command::Pipeline { left, pattern } => {
                let upstream = self.dispatch(*left, trimmed, ctx).await;
                filter_lines(upstream, &pattern)
            }
            other => self.dispatch(other, trimmed, ctx).await,
        };

        ctx.progression.log_command(trimmed, &result.text(), ctx.now);
        result
    }
}

/// Keep the lines containing `pattern`; the status of the left side stands.
fn filter_lines(result: ExecResult, pattern: &str) -> ExecResult {
    let lines: Vec<String> = result
        .lines
        .into_iter()
        .filter(|l| l.contains(pattern))
        .collect();
    let lines = if lines.is_empty() {
        vec![NO_MATCHES.to_string()]
    } else {
        lines
    };
    ExecResult { lines, ..result }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SaveStore;
    use crate::vfs::FileNode;
    use chrono::TimeZone;

    struct Harness {
        interpreter: Interpreter,
        vfs: VirtualFileSystem,
        progression: ProgressionState,
        quests: QuestEngine,
        accounts: AccountManager,
        now: DateTime<Utc>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_vfs(VirtualFileSystem::new())
        }

        fn with_vfs(vfs: VirtualFileSystem) -> Self {
            let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().unwrap();
            Self {
                interpreter: Interpreter::default(),
                vfs,
                progression: ProgressionState::fresh(now),
                quests: QuestEngine::default(),
                accounts: AccountManager::local(SaveStore::in_memory()),
                now,
            }
        }

        async fn run(&mut self, line: &str) -> ExecResult {
            let mut ctx = ExecContext {
                vfs: &mut self.vfs,
                progression: &mut self.progression,
                quests: &self.quests,
                accounts: &self.accounts,
                now: self.now,
            };
            self.interpreter.execute(line, &mut ctx).await
        }

        fn advance(&mut self, seconds: i64) {
            self.now += TimeDelta::seconds(seconds);
        }
    }

    #[tokio::test]
    async fn test_blank_line_is_not_logged() {
        let mut h = Harness::new();
        let result = h.run("   ").await;
        assert!(result.ok());
        assert!(result.lines.is_empty());
        assert!(h.progression.command_log.is_empty());
    }

    #[tokio::test]
    async fn test_every_command_is_logged_once() {
        let mut h = Harness::new();
        h.run("pwd").await;
        h.run("bogus").await;
        h.run("ls | grep notes").await;

        let log: Vec<(&str, &str)> = h
            .progression
            .command_log
            .iter()
            .map(|e| (e.command.as_str(), e.output.as_str()))
            .collect();
        assert_eq!(
            log,
            vec![
                ("pwd", "/home/adventurer"),
                ("bogus", "Unknown command: bogus"),
                ("ls | grep notes", "notes.txt"),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_command_is_an_error_result() {
        let mut h = Harness::new();
        let result = h.run("dance wildly").await;
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.lines, vec!["Unknown command: dance"]);
    }

    #[tokio::test]
    async fn test_pipeline_filters_left_output() {
        let root = FileNode::dir()
            .with_child("a.txt", FileNode::file(""))
            .with_child("b.log", FileNode::file(""));
        let mut h = Harness::with_vfs(VirtualFileSystem::with_root(root));

        assert_eq!(h.run("ls | grep txt").await.lines, vec!["a.txt"]);
        assert_eq!(h.run("ls | grep zzz").await.lines, vec![NO_MATCHES]);
    }

    #[tokio::test]
    async fn test_other_pipe_shapes_are_unknown() {
        let mut h = Harness::new();
        let result = h.run("ls | sort").await;
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.lines, vec!["Unknown command: ls | sort"]);
    }

    #[tokio::test]
    async fn test_echo_then_grep() {
        let mut h = Harness::new();
        let echoed = h.run(r#"echo "needle line" > notes.txt"#).await;
        assert_eq!(echoed.lines, vec!["needle line"]);
        assert_eq!(h.run("grep needle notes.txt").await.lines, vec!["needle line"]);
        assert_eq!(h.run("grep hay notes.txt").await.lines, vec![NO_MATCHES]);
    }

    #[tokio::test]
    async fn test_echo_usage_errors() {
        let mut h = Harness::new();
        assert_eq!(
            h.run("echo hello").await.lines,
            vec![r#"Usage: echo "text" > file"#]
        );
        assert_eq!(h.run("echo hello >").await.lines, vec!["Missing target file"]);
        let result = h.run("echo hi > nowhere/file.txt").await;
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.lines, vec!["echo: Path not found"]);
    }

    #[tokio::test]
    async fn test_filesystem_commands() {
        let mut h = Harness::new();
        assert_eq!(h.run("mkdir practice").await.lines, vec!["Created directory practice"]);
        assert_eq!(h.run("mkdir practice").await.lines, vec!["mkdir: Already exists"]);
        assert!(h.run("ls").await.lines.contains(&"practice".to_string()));
        assert_eq!(h.run("cd practice").await.lines, vec!["/home/adventurer/practice"]);
        assert_eq!(h.run("touch a.txt").await.lines, vec!["Created a.txt"]);
        assert_eq!(h.run("touch a.txt").await.lines, vec!["Created a.txt"]);
        assert_eq!(h.run("cat a.txt").await.lines, Vec::<String>::new());
        assert_eq!(h.run("rm a.txt").await.lines, vec!["Removed a.txt"]);
        assert_eq!(h.run("rm a.txt").await.lines, vec!["rm: Not found"]);
        assert_eq!(h.run("cd ..").await.lines, vec!["/home/adventurer"]);
        assert_eq!(h.run("cat forest").await.lines, vec!["cat: Not a file"]);
        assert_eq!(h.run("cd notes.txt").await.lines, vec!["cd: Not a directory"]);
    }

    #[tokio::test]
    async fn test_missing_arguments() {
        let mut h = Harness::new();
        assert_eq!(h.run("touch").await.lines, vec!["Missing filename"]);
        assert_eq!(h.run("mkdir").await.lines, vec!["Missing directory name"]);
        assert_eq!(h.run("rm").await.lines, vec!["Missing target"]);
        assert_eq!(h.run("cat").await.lines, vec!["Usage: cat <file>"]);
        assert_eq!(h.run("grep onlypattern").await.lines, vec!["Usage: grep pattern file"]);
    }

    #[tokio::test]
    async fn test_kill_removes_process() {
        let mut h = Harness::new();
        let killed = h.run("kill 202").await;
        assert!(killed.lines[0].contains("terminated safely"));
        let ps = h.run("ps").await;
        assert!(!ps.text().contains("202"));
        assert!(ps.text().contains("101"));
    }

    #[tokio::test]
    async fn test_history_includes_current_line() {
        let mut h = Harness::new();
        h.run("pwd").await;
        h.run("ls").await;
        let history = h.run("history").await;
        assert_eq!(history.lines, vec!["  1  pwd", "  2  ls", "  3  history"]);
    }

    #[tokio::test]
    async fn test_help_shows_card_until_first_quest() {
        let mut h = Harness::new();
        let help = h.run("help").await;
        assert!(help.lines[0].starts_with('╭'));
        assert!(help.lines.last().unwrap().starts_with("Commands: help"));

        h.progression.mark_complete("plains-help", crate::quests::ZoneId::TerminalPlains, h.now);
        let help = h.run("help").await;
        assert_eq!(help.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_tips_and_banner() {
        let mut h = Harness::new();
        let tips = h.run("tips").await;
        assert!(tips.ok());
        assert!(tips.lines[1].contains("Quick tips"));

        let banner = h.run("banner").await;
        assert!(banner.ok());
        assert_eq!(banner.lines[1], "║  SHELLQUEST AWAKENS  ║");

        let help = h.run("help").await;
        assert!(help.text().contains("help, tutorial, tips, banner, clear"));
    }

    #[tokio::test]
    async fn test_clear_sets_flag() {
        let mut h = Harness::new();
        let result = h.run("clear").await;
        assert!(result.clear);
        assert!(result.lines.is_empty());
    }

    #[tokio::test]
    async fn test_hint_cooldown() {
        let mut h = Harness::new();
        let first = h.run("hint").await;
        assert!(first.lines[0].starts_with("Hint: "));

        h.advance(5);
        assert_eq!(h.run("hint").await.lines, vec!["Hints cooling down. Wait 15s."]);

        h.advance(15);
        assert!(h.run("hint").await.lines[0].starts_with("Hint: "));
    }

    #[tokio::test]
    async fn test_hint_cooldown_reduction() {
        let mut h = Harness::new();
        h.progression.upgrades.hint_cooldown_reduction = 15;
        h.run("hint").await;
        h.advance(5);
        assert!(h.run("hint").await.lines[0].starts_with("Hint: "));
    }

    #[tokio::test]
    async fn test_shop_and_buy() {
        let mut h = Harness::new();
        assert!(h.run("shop").await.text().contains("xp-boost"));

        let broke = h.run("buy xp-boost").await;
        assert_eq!(broke.status, Status::Error);
        assert_eq!(broke.lines, vec!["Not enough coins"]);

        h.progression.player.coins = 30;
        let bought = h.run("buy xp-boost").await;
        assert!(bought.ok());
        assert_eq!(bought.lines, vec!["Purchased XP Booster. Coins left: 0"]);
        assert_eq!(h.run("buy nothing").await.lines, vec!["Upgrade not found"]);
    }

    #[tokio::test]
    async fn test_stats() {
        let mut h = Harness::new();
        let stats = h.run("stats").await;
        assert_eq!(stats.lines[0], "Lvl 1 · XP 0/50 · Coins 0");
    }

    #[tokio::test]
    async fn test_account_commands_render_errors() {
        let mut h = Harness::new();
        assert_eq!(h.run("whoami").await.lines, vec!["guest (not signed in)"]);
        assert_eq!(h.run("logout").await.lines, vec!["Not signed in"]);
        assert_eq!(h.run("signup").await.lines, vec!["Usage: signup <username>"]);

        let created = h.run("signup hero_one").await;
        assert!(created.ok());
        assert_eq!(h.run("whoami").await.lines, vec!["hero_one (local)"]);
        assert_eq!(
            h.run("sync").await.lines,
            vec!["Local profile; nothing to sync."]
        );
    }
}
