//! Lifetime points accumulator and token reward derivation.

use serde::Serialize;

/// Points required for one token reward.
pub const POINTS_PER_TOKEN: u64 = 100;

/// Lifetime points and the token count derived from them.
///
/// `token_rewards` is never set independently: every constructor and
/// transition recomputes it from `total_points`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardState {
    total_points: u64,
    token_rewards: u64,
}

impl RewardState {
    /// State for a given lifetime total.
    pub fn from_points(total_points: u64) -> Self {
        Self {
            total_points,
            token_rewards: tokens_for(total_points),
        }
    }

    pub fn total_points(&self) -> u64 {
        self.total_points
    }

    pub fn token_rewards(&self) -> u64 {
        self.token_rewards
    }

    /// Add earned points and recompute the token count.
    #[must_use]
    pub fn apply_points(self, earned: u64) -> Self {
        Self::from_points(self.total_points.saturating_add(earned))
    }

    /// Points still needed for the next token.
    pub fn points_to_next_token(&self) -> u64 {
        POINTS_PER_TOKEN - self.total_points % POINTS_PER_TOKEN
    }

    /// Explicit reset, the only transition that lowers the total.
    #[must_use]
    pub fn reset(self) -> Self {
        Self::default()
    }
}

/// `floor(total_points / POINTS_PER_TOKEN)`.
pub fn tokens_for(total_points: u64) -> u64 {
    total_points / POINTS_PER_TOKEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn applies_points_and_derives_tokens() {
        let state = RewardState::from_points(450).apply_points(60);
        assert_eq!(state.total_points(), 510);
        assert_eq!(state.token_rewards(), 5);
    }

    #[test]
    fn zero_state_has_no_tokens() {
        let state = RewardState::default();
        assert_eq!(state.total_points(), 0);
        assert_eq!(state.token_rewards(), 0);
        assert_eq!(state.points_to_next_token(), 100);
    }

    #[test]
    fn reset_returns_zero_state() {
        let state = RewardState::from_points(1234).reset();
        assert_eq!(state, RewardState::default());
    }

    #[test]
    fn saturates_instead_of_wrapping() {
        let state = RewardState::from_points(u64::MAX - 1).apply_points(50);
        assert_eq!(state.total_points(), u64::MAX);
        assert_eq!(state.token_rewards(), u64::MAX / 100);
    }

    #[test]
    fn serializes_both_fields() {
        let json = serde_json::to_value(RewardState::from_points(250)).unwrap();
        assert_eq!(json, serde_json::json!({"totalPoints": 250, "tokenRewards": 2}));
    }

    proptest! {
        #[test]
        fn tokens_always_derived(start in 0u64..1_000_000, earned in 0u64..=200) {
            let state = RewardState::from_points(start).apply_points(earned);
            prop_assert_eq!(state.token_rewards(), state.total_points() / 100);
            prop_assert!(state.total_points() >= start);
        }
    }
}
