//! Range index construction and lookup.
//!
//! Raw range records are partitioned by address family, their endpoints
//! encoded, and each family sorted ascending by start key. A lookup is then a
//! binary search over disjoint intervals.

use crate::error::GeoPulseError;
use crate::geo::codec::{encode_v4, encode_v6};
use crate::geo::types::RangeRecord;

/// A range record with its endpoints encoded for numeric comparison.
#[derive(Debug, Clone)]
pub struct EncodedRange<K> {
    /// Encoded first address of the interval.
    pub start_key: K,
    /// Encoded last address, inclusive.
    pub end_key: K,
    /// The underlying record.
    pub record: RangeRecord,
}

/// Immutable per-family sorted arrays, built once per dataset load and shared
/// read-only across lookups until a refresh replaces it wholesale.
#[derive(Debug, Default)]
pub struct RangeIndex {
    v4: Vec<EncodedRange<u32>>,
    v6: Vec<EncodedRange<u128>>,
}

impl RangeIndex {
    /// Builds the index from an unordered sequence of records.
    ///
    /// Records whose family cannot be determined or whose endpoints fail to
    /// encode are silently dropped (debug-logged), keeping the index total
    /// over malformed rows. Sorting is stable, so the output is deterministic
    /// for a given input regardless of prior ordering.
    pub fn build(records: Vec<RangeRecord>) -> Self {
        let mut v4 = Vec::new();
        let mut v6 = Vec::new();

        for record in records {
            match encode_record(&record) {
                Ok(Encoded::V4(start_key, end_key)) => v4.push(EncodedRange {
                    start_key,
                    end_key,
                    record,
                }),
                Ok(Encoded::V6(start_key, end_key)) => v6.push(EncodedRange {
                    start_key,
                    end_key,
                    record,
                }),
                Err(e) => {
                    log::debug!(
                        "dropping range {}-{}: {}",
                        record.start,
                        record.end,
                        e
                    );
                }
            }
        }

        v4.sort_by_key(|r| r.start_key);
        v6.sort_by_key(|r| r.start_key);

        RangeIndex { v4, v6 }
    }

    /// Finds the range owning `ip`, or `None` if the address is malformed or
    /// outside every known range.
    ///
    /// Precondition: ranges within a family are non-overlapping and sorted by
    /// start key. The search does not verify this and may return a wrong or
    /// missing match on a corrupted dataset.
    pub fn find(&self, ip: &str) -> Option<&RangeRecord> {
        if ip.contains('.') {
            let key = encode_v4(ip).ok()?;
            find_in(key, &self.v4)
        } else if ip.contains(':') {
            let key = encode_v6(ip).ok()?;
            find_in(key, &self.v6)
        } else {
            None
        }
    }

    /// Total number of indexed ranges across both families.
    pub fn len(&self) -> usize {
        self.v4.len() + self.v6.len()
    }

    /// True when no range survived encoding.
    pub fn is_empty(&self) -> bool {
        self.v4.is_empty() && self.v6.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn v4_keys(&self) -> Vec<(u32, u32)> {
        self.v4.iter().map(|r| (r.start_key, r.end_key)).collect()
    }
}

enum Encoded {
    V4(u32, u32),
    V6(u128, u128),
}

fn encode_record(record: &RangeRecord) -> Result<Encoded, GeoPulseError> {
    if record.start.contains('.') {
        Ok(Encoded::V4(
            encode_v4(&record.start)?,
            encode_v4(&record.end)?,
        ))
    } else if record.start.contains(':') {
        Ok(Encoded::V6(
            encode_v6(&record.start)?,
            encode_v6(&record.end)?,
        ))
    } else {
        Err(GeoPulseError::malformed(
            &record.start,
            "address family cannot be determined",
        ))
    }
}

/// Binary search over sorted disjoint intervals, inclusive on both ends.
fn find_in<K: Ord + Copy>(key: K, ranges: &[EncodedRange<K>]) -> Option<&RangeRecord> {
    let mut low = 0usize;
    let mut high = ranges.len();

    while low < high {
        let mid = low + (high - low) / 2;
        let range = &ranges[mid];
        if key < range.start_key {
            high = mid;
        } else if key > range.end_key {
            low = mid + 1;
        } else {
            return Some(&range.record);
        }
    }
    None
}
