//! Session-resume bookkeeping: offline coin accrual and the daily streak.

use chrono::{DateTime, Duration, Utc};

use super::ProgressionState;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Coins earned while away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfflineReport {
    pub away: Duration,
    pub coins: u64,
}

impl OfflineReport {
    pub fn message(&self) -> String {
        let hours = self.away.num_milliseconds() as f64 / MS_PER_HOUR;
        format!(
            "Welcome back! You were away for {hours:.2}h and earned {} coins.",
            self.coins
        )
    }
}

impl ProgressionState {
    /// Convert time since `last_active` into coins, capped at the offline
    /// cap and scaled by the coin boost. Always moves `last_active` to `now`.
    pub fn accrue_offline(&mut self, now: DateTime<Utc>, coins_per_hour: u32) -> Option<OfflineReport> {
        let away = (now - self.last_active).max(Duration::zero());
        let cap = Duration::hours(i64::from(self.upgrades.offline_cap_hours));
        let effective = away.min(cap);
        self.last_active = now;

        let hours = effective.num_milliseconds() as f64 / MS_PER_HOUR;
        let boost = self.upgrades.coin_boost.clamp(0.0, 0.5);
        let coins = (hours * f64::from(coins_per_hour) * (1.0 + boost)).floor() as u64;
        if coins == 0 {
            return None;
        }
        self.player.coins += coins;
        tracing::info!(coins, "offline gains");
        Some(OfflineReport { away, coins })
    }

    /// Advance the daily streak: first day counts as 1, consecutive days
    /// add one, a longer gap starts over. Returns the streak length.
    pub fn update_streak(&mut self, now: DateTime<Utc>) -> u32 {
        let days_since = (now - self.streak.last_check).num_days();
        match days_since {
            d if d <= 0 => {
                if self.streak.days == 0 {
                    self.streak.days = 1;
                }
            }
            1 => self.streak.days += 1,
            _ => self.streak.days = 1,
        }
        self.streak.last_check = now;
        self.streak.days
    }
}
