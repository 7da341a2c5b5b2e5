//! The upgrade shop.

use thiserror::Error;

use super::ProgressionState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("Upgrade not found")]
    UnknownUpgrade,
    #[error("Not enough coins")]
    NotEnoughCoins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeKind {
    XpBoost,
    CoinBoost,
    OfflineCap,
    HintBoost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: u64,
    pub kind: UpgradeKind,
}

pub const UPGRADE_CATALOG: [UpgradeDefinition; 4] = [
    UpgradeDefinition {
        id: "xp-boost",
        name: "XP Booster",
        description: "+10% XP from quests",
        cost: 30,
        kind: UpgradeKind::XpBoost,
    },
    UpgradeDefinition {
        id: "coin-boost",
        name: "Coin Magnet",
        description: "+10% coins from quests",
        cost: 30,
        kind: UpgradeKind::CoinBoost,
    },
    UpgradeDefinition {
        id: "offline-cap",
        name: "Long Rest",
        description: "+2h offline cap (max 12h)",
        cost: 40,
        kind: UpgradeKind::OfflineCap,
    },
    UpgradeDefinition {
        id: "hint-boost",
        name: "Quick Thinking",
        description: "-5s hint cooldown",
        cost: 25,
        kind: UpgradeKind::HintBoost,
    },
];

pub fn find_upgrade(id: &str) -> Option<&'static UpgradeDefinition> {
    UPGRADE_CATALOG.iter().find(|u| u.id == id)
}

impl ProgressionState {
    /// Buy an upgrade. Coins are only deducted when the purchase succeeds;
    /// buying past a cap still costs coins and leaves the value at the cap.
    pub fn purchase(&mut self, id: &str) -> Result<&'static UpgradeDefinition, PurchaseError> {
        let upgrade = find_upgrade(id).ok_or(PurchaseError::UnknownUpgrade)?;
        if self.player.coins < upgrade.cost {
            return Err(PurchaseError::NotEnoughCoins);
        }
        self.player.coins -= upgrade.cost;

        let upgrades = &mut self.upgrades;
        match upgrade.kind {
            UpgradeKind::XpBoost => upgrades.xp_boost = (upgrades.xp_boost + 0.1).min(0.5),
            UpgradeKind::CoinBoost => upgrades.coin_boost = (upgrades.coin_boost + 0.1).min(0.5),
            UpgradeKind::OfflineCap => {
                upgrades.offline_cap_hours = (upgrades.offline_cap_hours + 2).min(12)
            }
            UpgradeKind::HintBoost => {
                upgrades.hint_cooldown_reduction = (upgrades.hint_cooldown_reduction + 5).min(20)
            }
        }
        tracing::info!(upgrade = upgrade.id, "upgrade purchased");
        Ok(upgrade)
    }
}
