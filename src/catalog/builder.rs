//! Builder API for custom reward catalogs.

use crate::catalog::error::CatalogError;
use crate::catalog::{RewardCatalog, RewardDefinition, RewardId, DEFAULT_UNLOCK_STEP};
use std::collections::BTreeSet;

/// Builder for creating reward catalogs with a fluent API.
///
/// # Example
///
/// ```rust
/// use wellquest::catalog::RewardCatalog;
///
/// let catalog = RewardCatalog::builder()
///     .reward(1, "Pebble", 0)
///     .reward(2, "Comet", 25)
///     .unlock_step(25)
///     .build()
///     .unwrap();
///
/// assert_eq!(catalog.unlock_step(), 25);
/// ```
pub struct RewardCatalogBuilder {
    rewards: Vec<RewardDefinition>,
    unlock_step: u64,
}

impl RewardCatalogBuilder {
    pub fn new() -> Self {
        Self {
            rewards: Vec::new(),
            unlock_step: DEFAULT_UNLOCK_STEP,
        }
    }

    /// Add a reward definition
    pub fn reward(mut self, id: RewardId, name: impl Into<String>, unlock_threshold: u64) -> Self {
        self.rewards
            .push(RewardDefinition::new(id, name, unlock_threshold));
        self
    }

    /// Add several prepared definitions at once
    pub fn rewards(mut self, rewards: impl IntoIterator<Item = RewardDefinition>) -> Self {
        self.rewards.extend(rewards);
        self
    }

    /// Set points per additional unlock
    pub fn unlock_step(mut self, step: u64) -> Self {
        self.unlock_step = step;
        self
    }

    /// Build the catalog.
    /// Returns an error if ids collide, the step is zero, or nothing is free.
    pub fn build(self) -> Result<RewardCatalog, CatalogError> {
        if self.rewards.is_empty() {
            return Err(CatalogError::Empty);
        }
        if self.unlock_step == 0 {
            return Err(CatalogError::ZeroUnlockStep);
        }

        let mut seen = BTreeSet::new();
        for reward in &self.rewards {
            if !seen.insert(reward.id) {
                return Err(CatalogError::DuplicateReward { id: reward.id });
            }
        }

        if !self.rewards.iter().any(RewardDefinition::is_always_unlocked) {
            return Err(CatalogError::NoAlwaysUnlocked);
        }

        let mut rewards = self.rewards;
        rewards.sort_by_key(|r| r.id);

        Ok(RewardCatalog {
            rewards,
            unlock_step: self.unlock_step,
        })
    }
}

impl Default for RewardCatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}
