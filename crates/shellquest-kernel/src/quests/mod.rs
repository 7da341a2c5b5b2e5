//! Quests, zones and the engine that awards them.
//!
//! Quest definitions are static data. Success predicates are [`QuestCheck`]
//! values, a small closed set of check kinds interpreted by one function,
//! so the catalog carries no executable code.

mod catalog;
mod check;
mod engine;

pub use catalog::{QUESTS, ZONES};
pub use check::{QuestCheck, QuestView};
pub use engine::{CompletedQuest, Evaluation, QuestEngine};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::progression::Reward;

/// Zones in unlock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneId {
    TerminalPlains,
    FilewoodForest,
    GrepCaves,
}

impl ZoneId {
    /// The zone whose completions gate this one. `None` for the first zone.
    pub fn previous(self) -> Option<ZoneId> {
        match self {
            ZoneId::TerminalPlains => None,
            ZoneId::FilewoodForest => Some(ZoneId::TerminalPlains),
            ZoneId::GrepCaves => Some(ZoneId::FilewoodForest),
        }
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ZoneId::TerminalPlains => "Terminal Plains",
            ZoneId::FilewoodForest => "Filewood Forest",
            ZoneId::GrepCaves => "Grep Caves",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    pub id: ZoneId,
    pub name: &'static str,
}

/// An immutable quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestDefinition {
    pub id: &'static str,
    pub zone: ZoneId,
    pub title: &'static str,
    pub intro: &'static str,
    pub goal: &'static str,
    pub hints: &'static [&'static str],
    pub check: QuestCheck,
    pub reward: Reward,
}

impl QuestDefinition {
    pub fn first_hint(&self) -> &'static str {
        self.hints.first().copied().unwrap_or(self.goal)
    }
}
