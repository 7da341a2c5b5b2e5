//! Player progression: stats, quest records, command log, upgrades, streak.
//!
//! [`ProgressionState`] is the single serializable snapshot that gets saved
//! locally, cached per account, and shipped to the cloud as a save record.
//! Every field has a default so partially written or older saves still load.

mod offline;
mod reward;
mod upgrades;

pub use offline::OfflineReport;
pub use reward::{xp_threshold, Reward, RewardOutcome};
pub use upgrades::{find_upgrade, PurchaseError, UpgradeDefinition, UpgradeKind, UPGRADE_CATALOG};

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::quests::ZoneId;
use crate::sync::SaveRecord;

/// Maximum number of entries kept in the command log.
pub const COMMAND_LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    Navigation,
    Files,
    Text,
}

impl Skill {
    pub const ALL: [Skill; 3] = [Skill::Navigation, Skill::Files, Skill::Text];
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skill::Navigation => f.write_str("Navigation"),
            Skill::Files => f.write_str("Files"),
            Skill::Text => f.write_str("Text"),
        }
    }
}

/// Level, XP, coins and skills.
///
/// Invariant: `xp < xp_threshold(level)` after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    pub level: u32,
    pub xp: u64,
    pub coins: u64,
    pub skills: BTreeMap<Skill, u32>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            coins: 0,
            skills: Skill::ALL.into_iter().map(|s| (s, 0)).collect(),
        }
    }
}

impl PlayerState {
    pub fn skill(&self, skill: Skill) -> u32 {
        self.skills.get(&skill).copied().unwrap_or(0)
    }
}

/// Purchased upgrade levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Upgrades {
    pub xp_boost: f64,
    pub coin_boost: f64,
    pub offline_cap_hours: u32,
    /// Seconds shaved off the hint cooldown.
    pub hint_cooldown_reduction: u32,
}

impl Default for Upgrades {
    fn default() -> Self {
        Self {
            xp_boost: 0.0,
            coin_boost: 0.0,
            offline_cap_hours: 8,
            hint_cooldown_reduction: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestStatus {
    pub completed: bool,
    pub completed_at: DateTime<Utc>,
}

/// One executed command and its flattened output: quest evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLogEntry {
    pub command: String,
    pub output: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Streak {
    pub last_check: DateTime<Utc>,
    pub days: u32,
}

impl Default for Streak {
    fn default() -> Self {
        Self {
            last_check: Utc::now(),
            days: 0,
        }
    }
}

/// Everything that makes up a player's saved game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressionState {
    pub player: PlayerState,
    pub upgrades: Upgrades,
    /// Quest id → status. Entries only ever appear, never disappear.
    pub quests: BTreeMap<String, QuestStatus>,
    /// Completed quest count per zone, bumped when a quest first completes.
    pub completed_by_zone: BTreeMap<ZoneId, u32>,
    pub command_log: VecDeque<CommandLogEntry>,
    pub streak: Streak,
    pub last_active: DateTime<Utc>,
    pub account: Option<Account>,
    pub updated_at: DateTime<Utc>,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self::fresh(Utc::now())
    }
}

impl ProgressionState {
    /// A brand-new guest save stamped at `now`.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            player: PlayerState::default(),
            upgrades: Upgrades::default(),
            quests: BTreeMap::new(),
            completed_by_zone: BTreeMap::new(),
            command_log: VecDeque::new(),
            streak: Streak {
                last_check: now,
                days: 0,
            },
            last_active: now,
            account: None,
            updated_at: now,
        }
    }

    /// Append to the command log, dropping the oldest entry past capacity.
    pub fn log_command(&mut self, command: &str, output: &str, at: DateTime<Utc>) {
        self.command_log.push_back(CommandLogEntry {
            command: command.to_string(),
            output: output.to_string(),
            at,
        });
        while self.command_log.len() > COMMAND_LOG_CAPACITY {
            self.command_log.pop_front();
        }
    }

    pub fn is_complete(&self, quest_id: &str) -> bool {
        self.quests.get(quest_id).is_some_and(|s| s.completed)
    }

    pub fn has_completed_any(&self) -> bool {
        self.quests.values().any(|s| s.completed)
    }

    pub fn completed_in(&self, zone: ZoneId) -> u32 {
        self.completed_by_zone.get(&zone).copied().unwrap_or(0)
    }

    /// Record a completion. Returns false (and changes nothing) if the quest
    /// was already complete.
    pub fn mark_complete(&mut self, quest_id: &str, zone: ZoneId, at: DateTime<Utc>) -> bool {
        if self.is_complete(quest_id) {
            return false;
        }
        *self.completed_by_zone.entry(zone).or_insert(0) += 1;
        self.quests.insert(
            quest_id.to_string(),
            QuestStatus {
                completed: true,
                completed_at: at,
            },
        );
        true
    }

    /// Stamp a mutation.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.last_active = now;
    }

    /// Repair fields a hand-edited or truncated save could break.
    fn sanitize(mut self) -> Self {
        self.player.level = self.player.level.max(1);
        self.player.level_check();
        for skill in Skill::ALL {
            self.player.skills.entry(skill).or_insert(0);
        }
        while self.command_log.len() > COMMAND_LOG_CAPACITY {
            self.command_log.pop_front();
        }
        self
    }

    /// Wrap this state as an opaque save record.
    pub fn to_record(&self) -> Result<SaveRecord, serde_json::Error> {
        Ok(SaveRecord {
            payload: serde_json::to_value(self)?,
            updated_at: self.updated_at,
        })
    }

    /// Restore a state from a save record. The record's timestamp wins over
    /// whatever the payload carries.
    pub fn from_record(record: &SaveRecord) -> Result<Self, serde_json::Error> {
        let mut state: Self = serde_json::from_value(record.payload.clone())?;
        state.updated_at = record.updated_at;
        Ok(state.sanitize())
    }

    /// Parse a JSON snapshot as written by local storage.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(raw).map(Self::sanitize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[test]
    fn test_fresh_defaults() {
        let state = ProgressionState::fresh(at(0));
        assert_eq!(state.player.level, 1);
        assert_eq!(state.player.xp, 0);
        assert_eq!(state.upgrades.offline_cap_hours, 8);
        assert_eq!(state.player.skill(Skill::Files), 0);
        assert!(state.account.is_none());
    }

    #[test]
    fn test_command_log_is_bounded_fifo() {
        let mut state = ProgressionState::fresh(at(0));
        for i in 0..(COMMAND_LOG_CAPACITY + 5) {
            state.log_command(&format!("cmd {i}"), "", at(i as i64));
        }
        assert_eq!(state.command_log.len(), COMMAND_LOG_CAPACITY);
        assert_eq!(state.command_log.front().unwrap().command, "cmd 5");
        assert_eq!(
            state.command_log.back().unwrap().command,
            format!("cmd {}", COMMAND_LOG_CAPACITY + 4)
        );
    }

    #[test]
    fn test_mark_complete_is_monotonic() {
        let mut state = ProgressionState::fresh(at(0));
        assert!(state.mark_complete("plains-pwd", ZoneId::TerminalPlains, at(10)));
        assert!(!state.mark_complete("plains-pwd", ZoneId::TerminalPlains, at(20)));
        assert_eq!(state.completed_in(ZoneId::TerminalPlains), 1);
        assert_eq!(state.quests["plains-pwd"].completed_at, at(10));
    }

    #[test]
    fn test_record_round_trip_keeps_timestamp() {
        let mut state = ProgressionState::fresh(at(0));
        state.player.coins = 42;
        state.touch(at(99));
        let record = state.to_record().unwrap();
        assert_eq!(record.updated_at, at(99));
        let restored = ProgressionState::from_record(&record).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_partial_json_gets_defaults() {
        let state = ProgressionState::from_json(r#"{"player":{"level":3,"xp":10}}"#).unwrap();
        assert_eq!(state.player.level, 3);
        assert_eq!(state.upgrades.offline_cap_hours, 8);
        assert_eq!(state.player.skill(Skill::Text), 0);
    }

    #[test]
    fn test_sanitize_repairs_level_zero_and_excess_xp() {
        let state = ProgressionState::from_json(r#"{"player":{"level":0,"xp":60}}"#).unwrap();
        assert_eq!(state.player.level, 2);
        assert_eq!(state.player.xp, 10);
    }

    #[test]
    fn test_corrupt_json_is_an_error() {
        assert!(ProgressionState::from_json("{not json").is_err());
    }
}
