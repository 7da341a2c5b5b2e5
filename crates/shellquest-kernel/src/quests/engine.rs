//! Quest evaluation, reward application and zone gating.

use chrono::{DateTime, Utc};
use tracing::info;

use super::{QuestDefinition, QuestView, Zone, ZoneId, QUESTS, ZONES};
use crate::progression::{ProgressionState, RewardOutcome};
use crate::vfs::VirtualFileSystem;

/// A quest that completed during an evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedQuest {
    pub id: &'static str,
    pub title: &'static str,
    pub zone: ZoneId,
    pub outcome: RewardOutcome,
}

impl CompletedQuest {
    pub fn message(&self) -> String {
        format!(
            "Quest complete: {}! +{}xp +{}c",
            self.title, self.outcome.xp_gain, self.outcome.coin_gain
        )
    }
}

/// Everything one evaluation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub completed: Vec<CompletedQuest>,
    /// Zones that became available during this pass.
    pub unlocked: Vec<ZoneId>,
}

impl Evaluation {
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.unlocked.is_empty()
    }
}

/// Evaluates the quest catalog against the player's evidence.
#[derive(Debug, Clone)]
pub struct QuestEngine {
    quests: &'static [QuestDefinition],
    zones: &'static [Zone],
    /// Completions needed in zone N to open zone N+1.
    unlock_threshold: u32,
}

impl Default for QuestEngine {
    fn default() -> Self {
        Self::new(6)
    }
}

impl QuestEngine {
    /// Engine over the built-in catalog.
    pub fn new(unlock_threshold: u32) -> Self {
        Self::with_catalog(QUESTS, ZONES, unlock_threshold)
    }

    pub fn with_catalog(
        quests: &'static [QuestDefinition],
        zones: &'static [Zone],
        unlock_threshold: u32,
    ) -> Self {
        Self {
            quests,
            zones,
            unlock_threshold,
        }
    }

    pub fn quests(&self) -> &'static [QuestDefinition] {
        self.quests
    }

    pub fn zones(&self) -> &'static [Zone] {
        self.zones
    }

    pub fn find(&self, id: &str) -> Option<&'static QuestDefinition> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn zone_unlocked(&self, zone: ZoneId, state: &ProgressionState) -> bool {
        match zone.previous() {
            None => true,
            Some(previous) => state.completed_in(previous) >= self.unlock_threshold,
        }
    }

    pub fn unlocked_zones(&self, state: &ProgressionState) -> Vec<&'static Zone> {
        self.zones
            .iter()
            .filter(|z| self.zone_unlocked(z.id, state))
            .collect()
    }

    /// First pending quest of the first unlocked zone that has one.
    pub fn next_recommended(
        &self,
        state: &ProgressionState,
    ) -> Option<(&'static Zone, &'static QuestDefinition)> {
        self.unlocked_zones(state).into_iter().find_map(|zone| {
            self.quests
                .iter()
                .find(|q| q.zone == zone.id && !state.is_complete(q.id))
                .map(|q| (zone, q))
        })
    }

    /// Check every pending quest in an unlocked zone, in catalog order.
    ///
    /// Completions are applied as they happen, so finishing the last gating
    /// quest of a zone lets the next zone's quests complete in the same pass.
    pub fn evaluate(
        &self,
        state: &mut ProgressionState,
        vfs: &VirtualFileSystem,
        now: DateTime<Utc>,
    ) -> Evaluation {
        let locked_before: Vec<ZoneId> = self
            .zones
            .iter()
            .map(|z| z.id)
            .filter(|id| !self.zone_unlocked(*id, state))
            .collect();

        let mut evaluation = Evaluation::default();
        for quest in self.quests {
            if state.is_complete(quest.id) || !self.zone_unlocked(quest.zone, state) {
                continue;
            }
            let satisfied = quest.check.is_satisfied(&QuestView {
                log: &state.command_log,
                vfs,
            });
            if !satisfied {
                continue;
            }

            let outcome = state.apply_reward(&quest.reward);
            state.mark_complete(quest.id, quest.zone, now);
            info!(quest = quest.id, xp = outcome.xp_gain, coins = outcome.coin_gain, "quest complete");
            evaluation.completed.push(CompletedQuest {
                id: quest.id,
                title: quest.title,
                zone: quest.zone,
                outcome,
            });
        }

        evaluation.unlocked = locked_before
            .into_iter()
            .filter(|id| self.zone_unlocked(*id, state))
            .collect();
        for zone in &evaluation.unlocked {
            info!(%zone, "zone unlocked");
        }
        evaluation
    }
}
