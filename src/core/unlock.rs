//! Derivation of the unlocked-reward set from a point total.
//!
//! The unlocked set is never patched incrementally. It is recomputed from
//! the current point total, so a point loss can relock rewards.

use crate::catalog::{RewardCatalog, RewardDefinition, RewardId};
use std::collections::BTreeSet;

/// Compute the rewards unlocked at `points`.
///
/// Always-unlocked rewards are included unconditionally. One more reward of
/// the locked ladder opens per full unlock step, capped at the ladder length.
///
/// # Example
///
/// ```rust
/// use wellquest::catalog::RewardCatalog;
/// use wellquest::core::derive_unlocked;
///
/// let catalog = RewardCatalog::reference();
///
/// let at_49 = derive_unlocked(49, &catalog);
/// assert_eq!(at_49.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
///
/// let at_100 = derive_unlocked(100, &catalog);
/// assert_eq!(at_100.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
/// ```
pub fn derive_unlocked(points: u64, catalog: &RewardCatalog) -> BTreeSet<RewardId> {
    let ladder = catalog.locked_ladder();
    let extra = unlock_count(points, catalog).min(ladder.len());

    catalog
        .always_unlocked()
        .map(|r| r.id)
        .chain(ladder.iter().take(extra).map(|r| r.id))
        .collect()
}

/// The next ladder reward still locked at `points`, with the points missing.
///
/// Returns `None` once the whole ladder is open.
pub fn next_unlock(points: u64, catalog: &RewardCatalog) -> Option<(&RewardDefinition, u64)> {
    let ladder = catalog.locked_ladder();
    let opened = unlock_count(points, catalog);
    let next = ladder.get(opened).copied()?;

    let step = catalog.unlock_step();
    let needed_total = step.saturating_mul(opened as u64 + 1);
    Some((next, needed_total.saturating_sub(points)))
}

/// Most valuable unlocked reward: highest threshold, then highest id.
pub fn best_unlocked(unlocked: &BTreeSet<RewardId>, catalog: &RewardCatalog) -> Option<RewardId> {
    unlocked
        .iter()
        .filter_map(|id| catalog.lookup(*id))
        .max_by_key(|r| (r.unlock_threshold, r.id))
        .map(|r| r.id)
}

fn unlock_count(points: u64, catalog: &RewardCatalog) -> usize {
    usize::try_from(points / catalog.unlock_step()).unwrap_or(usize::MAX)
}
