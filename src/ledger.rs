//! Point ledger for a session.
//!
//! The ledger is an immutable, ordered record of the events applied to a
//! participant and the point totals on either side of each. It travels in
//! the session snapshot next to the user record, not inside it.

use crate::catalog::{RewardId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The event that produced a ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activity {
    Registered,
    TaskCompleted { task_id: TaskId, minutes: u64 },
    StudyStarted,
    StudyStopped,
    AppUsageReported { bonus: bool },
    RewardSelected { reward_id: RewardId },
}

impl Activity {
    /// Short label for display and logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Registered => "Registered",
            Self::TaskCompleted { .. } => "TaskCompleted",
            Self::StudyStarted => "StudyStarted",
            Self::StudyStopped => "StudyStopped",
            Self::AppUsageReported { .. } => "AppUsageReported",
            Self::RewardSelected { .. } => "RewardSelected",
        }
    }
}

/// One applied event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// What happened
    pub activity: Activity,
    /// Points before the event
    pub points_before: u64,
    /// Points after the event
    pub points_after: u64,
    /// When the event was applied
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(activity: Activity, points_before: u64, points_after: u64) -> Self {
        Self {
            activity,
            points_before,
            points_after,
            timestamp: Utc::now(),
        }
    }

    /// Signed point change of this entry.
    pub fn delta(&self) -> i128 {
        i128::from(self.points_after) - i128::from(self.points_before)
    }
}

/// Entries kept by `PointLedger::new`.
pub const DEFAULT_LEDGER_RETENTION: usize = 100;

/// Ordered ledger of point changes.
///
/// Only the most recent `retention` entries are kept, so a session's
/// snapshot stays bounded however long it lives. Credit and debit totals
/// are running counters and cover every entry ever recorded.
///
/// `record` returns a new ledger with the entry appended and leaves the
/// original untouched.
///
/// # Example
///
/// ```rust
/// use wellquest::ledger::{Activity, LedgerEntry, PointLedger};
///
/// let ledger = PointLedger::new()
///     .record(LedgerEntry::new(Activity::StudyStarted, 0, 10))
///     .record(LedgerEntry::new(Activity::StudyStopped, 10, 5));
///
/// assert_eq!(ledger.point_path(), vec![0, 10, 5]);
/// assert_eq!(ledger.net_change(), 5);
/// assert_eq!(ledger.total_earned(), 10);
/// assert_eq!(ledger.total_lost(), 5);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointLedger {
    entries: Vec<LedgerEntry>,
    retention: usize,
    recorded: u64,
    earned: u64,
    lost: u64,
}

impl PointLedger {
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_LEDGER_RETENTION)
    }

    /// Empty ledger keeping at most `retention` entries (at least one).
    pub fn with_retention(retention: usize) -> Self {
        Self {
            entries: Vec::new(),
            retention: retention.max(1),
            recorded: 0,
            earned: 0,
            lost: 0,
        }
    }

    /// Record an entry, returning a new ledger.
    ///
    /// The oldest entries fall out once the retention is exceeded.
    pub fn record(&self, entry: LedgerEntry) -> Self {
        let limit = self.retention.max(1);
        let skip = (self.entries.len() + 1).saturating_sub(limit);
        let earned = entry.points_after.saturating_sub(entry.points_before);
        let lost = entry.points_before.saturating_sub(entry.points_after);

        let mut entries = Vec::with_capacity(self.entries.len() + 1 - skip);
        entries.extend_from_slice(&self.entries[skip..]);
        entries.push(entry);

        Self {
            entries,
            retention: self.retention,
            recorded: self.recorded.saturating_add(1),
            earned: self.earned.saturating_add(earned),
            lost: self.lost.saturating_add(lost),
        }
    }

    /// Point totals over the retained window: the first `points_before`,
    /// then each `points_after`.
    pub fn point_path(&self) -> Vec<u64> {
        let mut path = Vec::with_capacity(self.entries.len() + 1);
        if let Some(first) = self.entries.first() {
            path.push(first.points_before);
        }
        path.extend(self.entries.iter().map(|e| e.points_after));
        path
    }

    /// Net change over every recorded entry.
    pub fn net_change(&self) -> i128 {
        i128::from(self.earned) - i128::from(self.lost)
    }

    /// Sum of all credits.
    pub fn total_earned(&self) -> u64 {
        self.earned
    }

    /// Sum of all debits actually applied (after flooring at zero).
    pub fn total_lost(&self) -> u64 {
        self.lost
    }

    /// Time between the first and last retained entry, `None` when empty.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.entries.first()?, self.entries.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Retained entries, oldest first.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries recorded over the ledger's life, including dropped ones.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    pub fn retention(&self) -> usize {
        self.retention
    }
}

impl Default for PointLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ledger_is_empty() {
        let ledger = PointLedger::new();
        assert!(ledger.is_empty());
        assert!(ledger.point_path().is_empty());
        assert!(ledger.duration().is_none());
        assert_eq!(ledger.net_change(), 0);
    }

    #[test]
    fn record_is_immutable() {
        let ledger = PointLedger::new();
        let next = ledger.record(LedgerEntry::new(Activity::StudyStarted, 0, 10));

        assert_eq!(ledger.len(), 0);
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn floored_penalty_counts_only_what_was_lost() {
        let ledger = PointLedger::new()
            .record(LedgerEntry::new(Activity::StudyStopped, 3, 0));
        assert_eq!(ledger.total_lost(), 3);
        assert_eq!(ledger.net_change(), -3);
    }

    #[test]
    fn retention_drops_oldest_entries_but_keeps_totals() {
        let steps = [(0, 10), (10, 20), (20, 15), (15, 35), (35, 30)];
        let ledger = steps
            .iter()
            .fold(PointLedger::with_retention(3), |ledger, &(before, after)| {
                ledger.record(LedgerEntry::new(Activity::StudyStarted, before, after))
            });

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.recorded(), 5);
        assert_eq!(ledger.point_path(), vec![20, 15, 35, 30]);
        assert_eq!(ledger.total_earned(), 40);
        assert_eq!(ledger.total_lost(), 10);
        assert_eq!(ledger.net_change(), 30);
    }

    #[test]
    fn capped_record_leaves_original_intact() {
        let full = PointLedger::with_retention(1)
            .record(LedgerEntry::new(Activity::Registered, 0, 0));
        let next = full.record(LedgerEntry::new(Activity::StudyStarted, 0, 10));

        assert_eq!(full.entries()[0].activity, Activity::Registered);
        assert_eq!(next.entries()[0].activity, Activity::StudyStarted);
        assert_eq!(next.len(), 1);
        assert_eq!(next.recorded(), 2);
    }

    #[test]
    fn zero_retention_keeps_the_latest_entry() {
        let ledger = PointLedger::with_retention(0)
            .record(LedgerEntry::new(Activity::StudyStarted, 0, 10));
        assert_eq!(ledger.retention(), 1);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn neutral_events_have_zero_delta() {
        let entry = LedgerEntry::new(Activity::RewardSelected { reward_id: 2 }, 40, 40);
        assert_eq!(entry.delta(), 0);
    }

    #[test]
    fn duration_spans_first_to_last() {
        let start = Utc::now();
        let mut first = LedgerEntry::new(Activity::Registered, 0, 0);
        first.timestamp = start;
        let mut last = LedgerEntry::new(Activity::StudyStarted, 0, 10);
        last.timestamp = start + chrono::Duration::seconds(90);

        let ledger = PointLedger::new().record(first).record(last);
        assert_eq!(ledger.duration(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn activity_names_are_stable() {
        assert_eq!(Activity::Registered.name(), "Registered");
        assert_eq!(
            Activity::TaskCompleted {
                task_id: 1,
                minutes: 5
            }
            .name(),
            "TaskCompleted"
        );
    }

    #[test]
    fn ledger_serializes_correctly() {
        let ledger = PointLedger::new().record(LedgerEntry::new(
            Activity::AppUsageReported { bonus: true },
            0,
            20,
        ));
        let json = serde_json::to_string(&ledger).unwrap();
        let deserialized: PointLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(ledger, deserialized);
    }
}
