//! Reward application and leveling.

use super::{PlayerState, ProgressionState, Skill};

/// Upper bound for either reward multiplier.
const MAX_BOOST: f64 = 0.5;

/// XP needed to advance from `level` to `level + 1`.
pub fn xp_threshold(level: u32) -> u64 {
    50 + u64::from(level.saturating_sub(1)) * 25
}

/// A quest's reward bundle, before multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reward {
    pub xp: u64,
    pub coins: u64,
    pub skill: Option<Skill>,
}

/// What a reward actually granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardOutcome {
    pub xp_gain: u64,
    pub coin_gain: u64,
    pub skill_gain: u32,
    pub levels_gained: u32,
}

fn boosted(base: u64, boost: f64) -> u64 {
    let boost = if boost.is_finite() {
        boost.clamp(0.0, MAX_BOOST)
    } else {
        0.0
    };
    (base as f64 * (1.0 + boost)).round() as u64
}

impl PlayerState {
    /// Roll excess XP into levels. Returns the number of levels gained.
    pub fn level_check(&mut self) -> u32 {
        let mut gained = 0;
        loop {
            let required = xp_threshold(self.level);
            if self.xp < required {
                break;
            }
            self.xp -= required;
            self.level += 1;
            gained += 1;
        }
        gained
    }

    /// XP accumulated since level 1, across all levels.
    pub fn total_xp(&self) -> u64 {
        (1..self.level).map(xp_threshold).sum::<u64>() + self.xp
    }
}

impl ProgressionState {
    /// Apply a reward with the current upgrade multipliers, then level up.
    pub fn apply_reward(&mut self, reward: &Reward) -> RewardOutcome {
        let xp_gain = boosted(reward.xp, self.upgrades.xp_boost);
        let coin_gain = boosted(reward.coins, self.upgrades.coin_boost);

        self.player.xp += xp_gain;
        self.player.coins += coin_gain;

        // ceil(xp_gain * 0.6)
        let skill_gain = match reward.skill {
            Some(skill) => {
                let gain = u32::try_from((xp_gain * 3).div_ceil(5)).unwrap_or(u32::MAX);
                let entry = self.player.skills.entry(skill).or_insert(0);
                *entry = entry.saturating_add(gain);
                gain
            }
            None => 0,
        };

        let levels_gained = self.player.level_check();
        if levels_gained > 0 {
            tracing::info!(level = self.player.level, "level up");
        }

        RewardOutcome {
            xp_gain,
            coin_gain,
            skill_gain,
            levels_gained,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn reward(xp: u64, coins: u64) -> Reward {
        Reward {
            xp,
            coins,
            skill: None,
        }
    }

    #[rstest]
    #[case(1, 50)]
    #[case(2, 75)]
    #[case(5, 150)]
    fn threshold_grows_linearly(#[case] level: u32, #[case] expected: u64) {
        assert_eq!(xp_threshold(level), expected);
    }

    #[test]
    fn test_level_one_rollover() {
        let mut state = ProgressionState::default();
        let outcome = state.apply_reward(&reward(60, 10));
        assert_eq!(state.player.level, 2);
        assert_eq!(state.player.xp, 10);
        assert_eq!(state.player.coins, 10);
        assert_eq!(outcome.levels_gained, 1);
    }

    #[test]
    fn test_multi_level_rollover() {
        let mut state = ProgressionState::default();
        // 50 + 75 + 5
        state.apply_reward(&reward(130, 0));
        assert_eq!(state.player.level, 3);
        assert_eq!(state.player.xp, 5);
    }

    #[test]
    fn test_boosts_apply_and_clamp() {
        let mut state = ProgressionState::default();
        state.upgrades.xp_boost = 0.2;
        state.upgrades.coin_boost = 3.0;
        let outcome = state.apply_reward(&reward(20, 10));
        assert_eq!(outcome.xp_gain, 24);
        assert_eq!(outcome.coin_gain, 15);
    }

    #[test]
    fn test_negative_boost_clamps_to_zero() {
        let mut state = ProgressionState::default();
        state.upgrades.xp_boost = -1.0;
        assert_eq!(state.apply_reward(&reward(20, 0)).xp_gain, 20);
    }

    #[test]
    fn test_skill_gain_rounds_up() {
        let mut state = ProgressionState::default();
        let outcome = state.apply_reward(&Reward {
            xp: 15,
            coins: 5,
            skill: Some(Skill::Navigation),
        });
        assert_eq!(outcome.skill_gain, 9);
        assert_eq!(state.player.skill(Skill::Navigation), 9);

        let outcome = state.apply_reward(&Reward {
            xp: 1,
            coins: 0,
            skill: Some(Skill::Navigation),
        });
        assert_eq!(outcome.skill_gain, 1);
    }

    proptest! {
        #[test]
        fn leveling_preserves_total_xp(
            start_level in 1u32..20,
            start_xp in 0u64..50,
            gains in prop::collection::vec(0u64..500, 1..8),
        ) {
            let mut state = ProgressionState::default();
            state.player.level = start_level;
            state.player.xp = start_xp;
            let mut expected = state.player.total_xp();

            for gain in gains {
                state.apply_reward(&reward(gain, 0));
                expected += gain;
                prop_assert!(state.player.xp < xp_threshold(state.player.level));
                prop_assert_eq!(state.player.total_xp(), expected);
            }
        }
    }
}
