//! Stream merger
//!
//! Produces one globally time-ordered tape from independently generated
//! batches. The sort is stable on `(exch_ts, local_ts)`, so records with
//! equal keys keep the order of their batch, and batches keep argument order.

use thiserror::Error;
use tracing::debug;
use types::record::EventRecord;

/// First position where a tape goes backwards in time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("record {index} with (exch_ts, local_ts) {current:?} precedes previous {previous:?}")]
pub struct OrderViolation {
    pub index: usize,
    pub previous: (i64, i64),
    pub current: (i64, i64),
}

/// Concatenate `batches` in order and stable-sort by `(exch_ts, local_ts)`.
pub fn merge<I>(batches: I) -> Vec<EventRecord>
where
    I: IntoIterator<Item = Vec<EventRecord>>,
{
    let mut merged: Vec<EventRecord> = Vec::new();
    let mut batch_count = 0usize;
    for batch in batches {
        merged.extend(batch);
        batch_count += 1;
    }
    merged.sort_by_key(EventRecord::time_key);
    debug!(batches = batch_count, records = merged.len(), "Merged batches");
    merged
}

/// Check that `records` are non-decreasing in `(exch_ts, local_ts)`.
pub fn check_order(records: &[EventRecord]) -> Result<(), OrderViolation> {
    for (i, pair) in records.windows(2).enumerate() {
        let previous = pair[0].time_key();
        let current = pair[1].time_key();
        if current < previous {
            return Err(OrderViolation {
                index: i + 1,
                previous,
                current,
            });
        }
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_merge_output_is_ordered_permutation(
            batches in prop::collection::vec(
                prop::collection::vec((0i64..50, 0i64..5), 0..40),
                0..4,
            )
        ) {
            let mut tag = 0.0;
            let input: Vec<Vec<EventRecord>> = batches
                .iter()
                .map(|batch| {
                    batch
                        .iter()
                        .map(|(ts, lat)| {
                            tag += 1.0;
                            EventRecord { exch_ts: *ts, local_ts: ts + lat, price: tag, ..Default::default() }
                        })
                        .collect()
                })
                .collect();
            let total: usize = input.iter().map(Vec::len).sum();

            let merged = merge(input);
            prop_assert_eq!(merged.len(), total);
            prop_assert!(check_order(&merged).is_ok());
            // equal keys keep input order (tags increase)
            for pair in merged.windows(2) {
                if pair[0].time_key() == pair[1].time_key() {
                    prop_assert!(pair[0].price < pair[1].price);
                }
            }
        }
    }
}
