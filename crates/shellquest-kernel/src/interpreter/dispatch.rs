//! Command dispatch: one arm per [`Command`] variant.

use chrono::{DateTime, TimeDelta, Utc};

use super::card::{banner, card};
use super::command::{Command, COMMAND_NAMES};
use super::result::ExecResult;
use super::{ExecContext, Interpreter};
use crate::account::AccountError;
use crate::progression::{xp_threshold, ProgressionState, Skill, UPGRADE_CATALOG};
use crate::quests::QuestEngine;
use crate::vfs::VfsError;

fn fs_error(command: &str, e: VfsError) -> ExecResult {
    ExecResult::failure(format!("{command}: {e}"))
}

const TIPS: &[&str] = &[
    "Type `tutorial` anytime to see your next move.",
    "Use `ls` often to stay oriented.",
    "`pwd` tells you exactly where you are.",
    "Try `cd tutorials` to explore starter files.",
    "Most commands are lowercase. Mind the spaces.",
    "Use `cat <file>` to read story snippets.",
    "Create practice files with `touch filename`.",
    "Clear clutter with `clear` to focus.",
    "Unlock new zones by completing quests.",
    "Pipes like `ls | grep txt` filter output.",
];

const TIPS_PER_CARD: usize = 5;

fn account_result(result: Result<Vec<String>, AccountError>) -> ExecResult {
    match result {
        Ok(lines) => ExecResult::success(lines),
        Err(e) => ExecResult::failure(e.to_string()),
    }
}

/// Split `echo` arguments at the last `>` into (content, target).
fn split_redirect(rest: &str) -> Option<(&str, &str)> {
    let idx = rest.rfind('>')?;
    let content = rest[..idx].trim();
    let content = content.strip_prefix('"').unwrap_or(content);
    let content = content.strip_suffix('"').unwrap_or(content);
    Some((content, rest[idx + 1..].trim()))
}

impl Interpreter {
    pub(super) async fn dispatch(
        &mut self,
        command: Command,
        line: &str,
        ctx: &mut ExecContext<'_>,
    ) -> ExecResult {
        let vfs = &mut *ctx.vfs;
        match command {
            Command::Empty => ExecResult::empty(),
            Command::Pipeline { .. } => ExecResult::failure("Only one pipe is supported"),
            Command::Unknown(name) => ExecResult::failure(format!("Unknown command: {name}")),

            // Session
            Command::Help => help(ctx.progression),
            Command::Clear => ExecResult::cleared(),
            Command::Tutorial => tutorial(ctx.quests, ctx.progression),
            Command::Tips => self.tips(),
            Command::Banner => ExecResult::success(banner()),
            Command::Quests => quest_list(ctx.quests, ctx.progression),
            Command::Stats => stats(ctx.progression),
            Command::Shop => shop(ctx.progression),
            Command::Buy(None) => ExecResult::failure("Usage: buy <upgrade-id>"),
            Command::Buy(Some(id)) => match ctx.progression.purchase(&id) {
                Ok(upgrade) => ExecResult::line(format!(
                    "Purchased {}. Coins left: {}",
                    upgrade.name, ctx.progression.player.coins
                )),
                Err(e) => ExecResult::failure(e.to_string()),
            },
            Command::Hint => self.hint(ctx.quests, ctx.progression, ctx.now),
            Command::History => {
                let entries = ctx
                    .progression
                    .command_log
                    .iter()
                    .map(|e| e.command.as_str())
                    .chain(std::iter::once(line));
                ExecResult::success(
                    entries
                        .enumerate()
                        .map(|(i, command)| format!("{:>3}  {command}", i + 1)),
                )
            }

            // Filesystem
            Command::Pwd => ExecResult::line(vfs.pwd()),
            Command::Ls(path) => match vfs.ls(path.as_deref()) {
                Ok(names) => ExecResult::success(names),
                Err(e) => fs_error("ls", e),
            },
            Command::Cd(path) => match vfs.cd(path.as_deref().unwrap_or(".")) {
                Ok(path) => ExecResult::line(path),
                Err(e) => fs_error("cd", e),
            },
            Command::Cat(None) => ExecResult::failure("Usage: cat <file>"),
            Command::Cat(Some(path)) => match vfs.cat(&path) {
                Ok(content) => ExecResult::success(content.lines()),
                Err(e) => fs_error("cat", e),
            },
            Command::Touch(None) => ExecResult::failure("Missing filename"),
            Command::Touch(Some(name)) => match vfs.touch(&name) {
                Ok(()) => ExecResult::line(format!("Created {name}")),
                Err(e) => fs_error("touch", e),
            },
            Command::Mkdir(None) => ExecResult::failure("Missing directory name"),
            Command::Mkdir(Some(name)) => match vfs.mkdir(&name) {
                Ok(()) => ExecResult::line(format!("Created directory {name}")),
                Err(e) => fs_error("mkdir", e),
            },
            Command::Rm(None) => ExecResult::failure("Missing target"),
            Command::Rm(Some(path)) => match vfs.rm(&path) {
                Ok(()) => ExecResult::line(format!("Removed {path}")),
                Err(e) => fs_error("rm", e),
            },
            Command::Echo(rest) => {
                let Some((content, target)) = split_redirect(&rest) else {
                    return ExecResult::failure(r#"Usage: echo "text" > file"#);
                };
                if target.is_empty() {
                    return ExecResult::failure("Missing target file");
                }
                match vfs.echo(content, target) {
                    Ok(()) => ExecResult::line(content),
                    Err(e) => fs_error("echo", e),
                }
            }
            Command::Grep {
                pattern: Some(pattern),
                path: Some(path),
            } => match vfs.grep(&pattern, &path) {
                Ok(matches) if matches.is_empty() => ExecResult::line(super::NO_MATCHES),
                Ok(matches) => ExecResult::success(matches),
                Err(e) => fs_error("grep", e),
            },
            Command::Grep { .. } => ExecResult::failure("Usage: grep pattern file"),

            // Simulated system
            Command::Env => self.system.env(),
            Command::Export(argument) => self.system.export(&argument),
            Command::Ps => self.system.ps(),
            Command::Kill(pid) => self.system.kill(pid.as_deref()),
            Command::Ping(args) => self.system.ping(&args),
            Command::Curl(args) => self.system.curl(&args),
            Command::Package { manager, args } => self.system.package(manager, &args),

            // Accounts
            Command::Signup(None) => ExecResult::failure("Usage: signup <username>"),
            Command::Signup(Some(name)) => {
                account_result(ctx.accounts.signup(&name, ctx.progression, ctx.now).await)
            }
            Command::Login(None) => ExecResult::failure("Usage: login <username>"),
            Command::Login(Some(name)) => {
                account_result(ctx.accounts.login(&name, ctx.progression, ctx.now).await)
            }
            Command::Logout => account_result(ctx.accounts.logout(ctx.progression, ctx.now)),
            Command::Whoami => ExecResult::line(ctx.accounts.whoami(ctx.progression)),
            Command::Sync => account_result(ctx.accounts.sync(ctx.progression).await),
        }
    }

    /// The next few tips, in rotation.
    fn tips(&mut self) -> ExecResult {
        let start = self.tip_cursor;
        self.tip_cursor = (start + TIPS_PER_CARD) % TIPS.len();
        let picked = TIPS.iter().cycle().skip(start).take(TIPS_PER_CARD);
        ExecResult::success(card("Quick tips", picked))
    }

    /// First hint of the recommended quest, at most once per cooldown.
    fn hint(
        &mut self,
        quests: &QuestEngine,
        progression: &ProgressionState,
        now: DateTime<Utc>,
    ) -> ExecResult {
        let reduction = TimeDelta::seconds(i64::from(progression.upgrades.hint_cooldown_reduction));
        let cooldown = (self.hint_cooldown - reduction).max(TimeDelta::zero());
        if let Some(last) = self.last_hint {
            let ready = last + cooldown;
            if now < ready {
                let wait_ms = (ready - now).num_milliseconds();
                let wait = (wait_ms + 999) / 1000;
                return ExecResult::line(format!("Hints cooling down. Wait {wait}s."));
            }
        }

        match quests.next_recommended(progression) {
            None => ExecResult::line("No hints needed. All quests clear!"),
            Some((_, quest)) => {
                self.last_hint = Some(now);
                ExecResult::line(format!("Hint: {}", quest.first_hint()))
            }
        }
    }
}

fn help(progression: &ProgressionState) -> ExecResult {
    let mut lines = Vec::new();
    if !progression.has_completed_any() {
        lines.extend(card(
            "Welcome to ShellQuest",
            [
                "Use `tutorial` for your next move.",
                "Start with `pwd`, `ls`, then `cat notes.txt`.",
            ],
        ));
    }
    lines.push(format!("Commands: {}", COMMAND_NAMES.join(", ")));
    ExecResult::success(lines)
}

fn tutorial(quests: &QuestEngine, progression: &ProgressionState) -> ExecResult {
    let lines = match quests.next_recommended(progression) {
        None => card("All quests clear!", ["Awaiting new adventures."]),
        Some((zone, quest)) => card(
            &format!("Next: {}", quest.title),
            [
                format!("Zone: {}", zone.name),
                format!("Goal: {}", quest.goal),
                format!("Try: {}", quest.first_hint()),
            ],
        ),
    };
    ExecResult::success(lines)
}

fn quest_list(quests: &QuestEngine, progression: &ProgressionState) -> ExecResult {
    let mut lines = Vec::new();
    for zone in quests.zones() {
        if !quests.zone_unlocked(zone.id, progression) {
            lines.push(format!("{} (locked)", zone.name));
            continue;
        }
        lines.push(format!("{}:", zone.name));
        for quest in quests.quests().iter().filter(|q| q.zone == zone.id) {
            let mark = if progression.is_complete(quest.id) { "✔" } else { "•" };
            lines.push(format!("  {mark} {}: {}", quest.title, quest.goal));
        }
    }
    ExecResult::success(lines)
}

fn stats(progression: &ProgressionState) -> ExecResult {
    let player = &progression.player;
    let skills = Skill::ALL
        .iter()
        .map(|s| format!("{s} {}", player.skill(*s)))
        .collect::<Vec<_>>()
        .join(" · ");
    ExecResult::success([
        format!(
            "Lvl {} · XP {}/{} · Coins {}",
            player.level,
            player.xp,
            xp_threshold(player.level),
            player.coins
        ),
        format!("Skills: {skills}"),
        format!("Streak: {} day(s)", progression.streak.days),
    ])
}

fn shop(progression: &ProgressionState) -> ExecResult {
    let mut lines: Vec<String> = UPGRADE_CATALOG
        .iter()
        .map(|u| format!("{:<12} {:>3}c  {}: {}", u.id, u.cost, u.name, u.description))
        .collect();
    lines.push(format!(
        "Coins: {}. Buy with `buy <upgrade-id>`.",
        progression.player.coins
    ));
    ExecResult::success(lines)
}
