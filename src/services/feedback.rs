//! Icon feedback bucketing.
//!
//! Viewers react with icons while watching. For the feedback graph the
//! reactions are counted per fixed interval of the video. Types are an
//! explicit enum with a fixed order, so every series comes out in the same
//! order regardless of input.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;

/// Width of one graph interval.
pub const FEEDBACK_INTERVAL_MS: u64 = 10_000;

/// Upper bound on the graphed span, whatever the configured video length.
const MAX_FEEDBACK_SPAN_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IconFeedbackType {
    Good,
    Bad,
    TooFast,
    TooSlow,
}

impl IconFeedbackType {
    /// Every type, in series order.
    pub const ALL: [IconFeedbackType; 4] = [
        IconFeedbackType::Good,
        IconFeedbackType::Bad,
        IconFeedbackType::TooFast,
        IconFeedbackType::TooSlow,
    ];

    #[inline]
    fn index(self) -> usize {
        match self {
            IconFeedbackType::Good => 0,
            IconFeedbackType::Bad => 1,
            IconFeedbackType::TooFast => 2,
            IconFeedbackType::TooSlow => 3,
        }
    }
}

/// One reaction at a point of the video.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconFeedback {
    pub timestamp_ms: u64,
    #[serde(rename = "type")]
    pub feedback_type: IconFeedbackType,
}

/// Reaction counts inside `[interval_start_ms, interval_start_ms + FEEDBACK_INTERVAL_MS)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntervalCounts {
    pub interval_start_ms: u64,
    counts: [u32; 4],
}

impl IntervalCounts {
    fn new(interval_start_ms: u64) -> Self {
        Self {
            interval_start_ms,
            counts: [0; 4],
        }
    }

    pub fn count(&self, feedback_type: IconFeedbackType) -> u32 {
        self.counts[feedback_type.index()]
    }

    #[cfg(test)]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

/// Reactions bucketed into consecutive intervals, starting at zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedIconFeedback {
    intervals: Vec<IntervalCounts>,
}

impl ParsedIconFeedback {
    /// Bucket `feedback`. Intervals without reactions are kept so the graph
    /// has a continuous time axis.
    ///
    /// Reactions past `video_length_ms` cannot belong to the video and are
    /// dropped, so the number of intervals stays bounded by the video length.
    pub fn parse(feedback: &[IconFeedback], video_length_ms: u64) -> Self {
        let limit_ms = video_length_ms.min(MAX_FEEDBACK_SPAN_MS);
        let (kept, dropped): (Vec<&IconFeedback>, Vec<&IconFeedback>) = feedback
            .iter()
            .partition(|f| f.timestamp_ms <= limit_ms);
        if !dropped.is_empty() {
            warn!(
                "Dropping {} feedback events past the video end ({}ms)",
                dropped.len(),
                limit_ms
            );
        }

        let Some(last) = kept.iter().map(|f| f.timestamp_ms).max() else {
            return Self::default();
        };

        let bucket_count = (last / FEEDBACK_INTERVAL_MS) as usize + 1;
        let mut intervals: Vec<IntervalCounts> = (0..bucket_count)
            .map(|i| IntervalCounts::new(i as u64 * FEEDBACK_INTERVAL_MS))
            .collect();

        for item in kept {
            let bucket = (item.timestamp_ms / FEEDBACK_INTERVAL_MS) as usize;
            intervals[bucket].counts[item.feedback_type.index()] += 1;
        }

        Self { intervals }
    }

    pub fn intervals(&self) -> &[IntervalCounts] {
        &self.intervals
    }

    /// Counts of one type across all intervals.
    pub fn series(&self, feedback_type: IconFeedbackType) -> Vec<u32> {
        self.intervals.iter().map(|i| i.count(feedback_type)).collect()
    }

    pub fn interval_starts(&self) -> Vec<u64> {
        self.intervals.iter().map(|i| i.interval_start_ms).collect()
    }
}

/// Read and bucket a JSON array of feedback events.
pub async fn load_feedback(
    path: &Path,
    video_length_ms: u64,
) -> Result<ParsedIconFeedback, Box<dyn Error>> {
    let contents = tokio::fs::read_to_string(path).await?;
    let feedback: Vec<IconFeedback> = serde_json::from_str(&contents)?;
    let parsed = ParsedIconFeedback::parse(&feedback, video_length_ms);

    info!(
        "Parsed {} feedback events into {} intervals",
        feedback.len(),
        parsed.intervals().len()
    );
    Ok(parsed)
}
