//! Static reward and task catalogs.
//!
//! Catalogs are configuration data: built once, validated at construction,
//! and handed to the engine by value. Nothing in here mutates after `build()`.

pub mod builder;
pub mod error;
pub mod tasks;

pub use builder::RewardCatalogBuilder;
pub use error::CatalogError;
pub use tasks::{TaskCatalog, TaskId, WellnessTask};

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a reward (avatar) in the catalog.
pub type RewardId = u32;

/// Points needed for each additional unlock in the reference ladder.
pub const DEFAULT_UNLOCK_STEP: u64 = 50;

/// A cosmetic reward gated by a point threshold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardDefinition {
    /// Stable, unique identifier
    pub id: RewardId,
    /// Display name
    pub name: String,
    /// Points required to unlock; 0 means always unlocked
    pub unlock_threshold: u64,
}

impl RewardDefinition {
    pub fn new(id: RewardId, name: impl Into<String>, unlock_threshold: u64) -> Self {
        Self {
            id,
            name: name.into(),
            unlock_threshold,
        }
    }

    /// Rewards with a zero threshold are available from registration on.
    pub fn is_always_unlocked(&self) -> bool {
        self.unlock_threshold == 0
    }
}

/// Immutable, id-ordered list of reward definitions.
///
/// # Example
///
/// ```rust
/// use wellquest::catalog::RewardCatalog;
///
/// let catalog = RewardCatalog::reference();
/// assert_eq!(catalog.len(), 10);
/// assert_eq!(catalog.always_unlocked().count(), 3);
/// assert_eq!(catalog.lookup(4).map(|r| r.unlock_threshold), Some(50));
/// assert!(catalog.lookup(11).is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RewardCatalog {
    rewards: Vec<RewardDefinition>,
    unlock_step: u64,
}

impl RewardCatalog {
    /// The reference ladder: three free avatars, then seven spaced 50 points apart.
    pub fn reference() -> Self {
        Self {
            rewards: vec![
                RewardDefinition::new(1, "Forest Fox", 0),
                RewardDefinition::new(2, "Lake Turtle", 0),
                RewardDefinition::new(3, "Mountain Bear", 0),
                RewardDefinition::new(4, "River Otter", 50),
                RewardDefinition::new(5, "Forest Owl", 100),
                RewardDefinition::new(6, "Meadow Rabbit", 150),
                RewardDefinition::new(7, "Ocean Whale", 200),
                RewardDefinition::new(8, "Sky Eagle", 250),
                RewardDefinition::new(9, "Garden Butterfly", 300),
                RewardDefinition::new(10, "Crystal Dragon", 350),
            ],
            unlock_step: DEFAULT_UNLOCK_STEP,
        }
    }

    /// Start building a custom catalog.
    pub fn builder() -> RewardCatalogBuilder {
        RewardCatalogBuilder::new()
    }

    pub fn lookup(&self, id: RewardId) -> Option<&RewardDefinition> {
        self.rewards
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|idx| &self.rewards[idx])
    }

    /// All rewards in id order.
    pub fn rewards(&self) -> &[RewardDefinition] {
        &self.rewards
    }

    pub fn always_unlocked(&self) -> impl Iterator<Item = &RewardDefinition> {
        self.rewards.iter().filter(|r| r.is_always_unlocked())
    }

    /// Locked-by-default rewards ordered by threshold, ties broken by id.
    pub fn locked_ladder(&self) -> Vec<&RewardDefinition> {
        let mut ladder: Vec<&RewardDefinition> = self
            .rewards
            .iter()
            .filter(|r| !r.is_always_unlocked())
            .collect();
        ladder.sort_by_key(|r| (r.unlock_threshold, r.id));
        ladder
    }

    /// Points needed for each additional unlock along the ladder.
    pub fn unlock_step(&self) -> u64 {
        self.unlock_step
    }

    /// First reward in id order; the display fallback for a missing selection.
    pub fn first(&self) -> &RewardDefinition {
        // Non-empty by construction
        &self.rewards[0]
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

/// Wire shape of a catalog; deserialization goes through the builder checks.
#[derive(Deserialize)]
struct RawCatalog {
    rewards: Vec<RewardDefinition>,
    #[serde(default = "default_unlock_step")]
    unlock_step: u64,
}

fn default_unlock_step() -> u64 {
    DEFAULT_UNLOCK_STEP
}

impl<'de> Deserialize<'de> for RewardCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawCatalog::deserialize(deserializer)?;
        RewardCatalogBuilder::new()
            .rewards(raw.rewards)
            .unlock_step(raw.unlock_step)
            .build()
            .map_err(serde::de::Error::custom)
    }
}

impl Default for RewardCatalog {
    fn default() -> Self {
        Self::reference()
    }
}
