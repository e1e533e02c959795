//! Nearest-comment search.
//!
//! Input is sorted ascending by timestamp, so one forward scan is enough:
//! a closer candidate resets the nearest set, an equally close one extends
//! it, and once candidates past the query time start getting farther away
//! nothing closer can follow.
//!
//! In a sorted sequence the nearest set is always contiguous, so it is
//! returned as an index range (or the matching sub-slice).

use std::ops::Range;

/// Anything carrying a playback timestamp in milliseconds.
pub trait Timestamped {
    fn timestamp_ms(&self) -> u64;
}

impl Timestamped for crate::types::Comment {
    fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }
}

impl Timestamped for u64 {
    fn timestamp_ms(&self) -> u64 {
        *self
    }
}

/// Index range of the entries nearest to `time_ms`. Empty for empty input.
pub fn locate_range<T: Timestamped>(sorted: &[T], time_ms: u64) -> Range<usize> {
    let mut nearest = 0..0;
    let mut nearest_distance = u64::MAX;

    for (index, entry) in sorted.iter().enumerate() {
        let timestamp = entry.timestamp_ms();
        let distance = time_ms.abs_diff(timestamp);

        if nearest.is_empty() || distance < nearest_distance {
            nearest = index..index + 1;
            nearest_distance = distance;
        } else if distance == nearest_distance {
            nearest.end = index + 1;
        } else if timestamp > time_ms {
            break;
        }
    }

    nearest
}

/// The entries nearest to `time_ms`.
///
/// Usually one element; several when they are exactly equidistant.
pub fn locate<T: Timestamped>(sorted: &[T], time_ms: u64) -> &[T] {
    &sorted[locate_range(sorted, time_ms)]
}
