//! Entry/exit correlation
//!
//! Pairs each exit record with the entry record that opened the same
//! occurrence instance, keyed by (occurrence, local endpoint, remote
//! endpoint, flow id, tmm pid), and emits one duration sample per pair.
//! Each category is correlated independently; CMD and CMD_VM run as
//! separate passes over the same shared command list.

use crate::record::{Category, IdentityKey, Marker, OccurrenceRecord};
use std::collections::HashMap;

/// One measured elapsed time between a matched entry and exit.
/// Negative values are possible when counters wrap; sign is not validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationSample {
    pub occurrence: String,
    pub elapsed_us: i64,
}

/// How exits are paired with candidate entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// Scan backward from each exit for the most recent entry with an
    /// equal identity key. A matched entry is not marked consumed, so one
    /// entry may pair with several later exits when keys repeat. This is
    /// the original tool's behavior and the default.
    #[default]
    NearestScan,
    /// Keep a pending-entry stack per identity key and pop on match, so
    /// each entry pairs at most once. Output differs from `NearestScan`
    /// only when identity keys repeat.
    ConsumeOnMatch,
}

/// Result of one correlation pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MatchOutcome {
    pub samples: Vec<DurationSample>,
    /// Exit records with no earlier matching entry; they contribute no
    /// sample and are only counted.
    pub unmatched_exits: u64,
    /// Entry records that never paired with any exit.
    pub unmatched_entries: u64,
}

/// Correlate one category's entry/exit records into duration samples.
///
/// `records` must be in arrival order; matching is order-dependent.
/// Records of other categories on the list are ignored by the pass but
/// still occupy arrival positions, which keeps the two command categories
/// independent without splitting their shared list.
pub fn correlate(
    records: &[OccurrenceRecord],
    category: Category,
    strategy: MatchStrategy,
) -> MatchOutcome {
    match strategy {
        MatchStrategy::NearestScan => correlate_nearest(records, category),
        MatchStrategy::ConsumeOnMatch => correlate_consuming(records, category),
    }
}

fn sample_for(entry: &OccurrenceRecord, exit: &OccurrenceRecord) -> DurationSample {
    DurationSample {
        occurrence: entry.occurrence.clone(),
        elapsed_us: exit.timestamp_us - entry.timestamp_us,
    }
}

fn correlate_nearest(records: &[OccurrenceRecord], category: Category) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();
    let mut entry_used = vec![false; records.len()];

    for (index, record) in records.iter().enumerate() {
        if record.category != category || record.marker != Marker::Exit {
            continue;
        }

        let mut matched = false;
        // Most recent matching entry wins; strictly earlier positions only.
        for earlier_index in (0..index).rev() {
            let earlier = &records[earlier_index];
            if earlier.category == category
                && earlier.marker == Marker::Entry
                && earlier.matches_identity(record)
            {
                outcome.samples.push(sample_for(earlier, record));
                entry_used[earlier_index] = true;
                matched = true;
                break;
            }
        }

        if !matched {
            outcome.unmatched_exits += 1;
            tracing::debug!(
                occurrence = %record.occurrence,
                flow_id = %record.flow_id,
                "exit record has no matching entry"
            );
        }
    }

    outcome.unmatched_entries = records
        .iter()
        .enumerate()
        .filter(|(index, record)| {
            record.category == category && record.marker == Marker::Entry && !entry_used[*index]
        })
        .count() as u64;

    outcome
}

fn correlate_consuming(records: &[OccurrenceRecord], category: Category) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();
    let mut pending: HashMap<IdentityKey, Vec<usize>> = HashMap::new();

    for (index, record) in records.iter().enumerate() {
        if record.category != category {
            continue;
        }
        match record.marker {
            Marker::Entry => {
                pending.entry(record.identity_key()).or_default().push(index);
            }
            Marker::Exit => {
                let popped = pending
                    .get_mut(&record.identity_key())
                    .and_then(|stack| stack.pop());
                match popped {
                    Some(entry_index) => {
                        outcome.samples.push(sample_for(&records[entry_index], record));
                    }
                    None => {
                        outcome.unmatched_exits += 1;
                        tracing::debug!(
                            occurrence = %record.occurrence,
                            flow_id = %record.flow_id,
                            "exit record has no pending entry"
                        );
                    }
                }
            }
        }
    }

    outcome.unmatched_entries = pending.values().map(|stack| stack.len() as u64).sum();
    outcome
}
