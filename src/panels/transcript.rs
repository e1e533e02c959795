//! Transcript panel.
//!
//! Highlights the transcript line being spoken at the playback time. Lines
//! are sorted by start time; a time between two lines highlights nothing.

use crate::event_bus::{CHANNEL_SYNC, LectureBus, LectureEvent};
use crate::functions::formatting::timestamp_to_string;
use lecture_bus::SubscriptionId;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::error::Error;
use std::path::Path;
use std::rc::Rc;

/// One caption line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptLine {
    pub start_timestamp_ms: u64,
    pub duration_ms: u64,
    pub end_timestamp_ms: u64,
    pub content: String,
}

impl TranscriptLine {
    #[cfg(test)]
    pub fn new(start_timestamp_ms: u64, duration_ms: u64, content: &str) -> Self {
        Self {
            start_timestamp_ms,
            duration_ms,
            end_timestamp_ms: start_timestamp_ms + duration_ms,
            content: content.to_string(),
        }
    }

    #[inline]
    fn contains(&self, time_ms: u64) -> bool {
        self.start_timestamp_ms <= time_ms && time_ms < self.end_timestamp_ms
    }
}

#[derive(Default)]
pub struct TranscriptArea {
    lines: RefCell<Vec<TranscriptLine>>,
    current: Cell<Option<usize>>,
}

impl TranscriptArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all lines. Clears the current line.
    pub fn set_lines(&self, mut lines: Vec<TranscriptLine>) {
        lines.sort_by_key(|l| l.start_timestamp_ms);
        info!("Loaded {} transcript lines", lines.len());
        *self.lines.borrow_mut() = lines;
        self.current.set(None);
    }

    /// The line currently highlighted.
    #[cfg(test)]
    pub fn current_line(&self) -> Option<TranscriptLine> {
        let index = self.current.get()?;
        self.lines.borrow().get(index).cloned()
    }

    /// Move the highlight to the line spoken at `time_ms`.
    pub fn on_sync(&self, time_ms: u64) -> Option<usize> {
        let lines = self.lines.borrow();
        let after = lines.partition_point(|l| l.start_timestamp_ms <= time_ms);
        let current = after
            .checked_sub(1)
            .filter(|&index| lines[index].contains(time_ms));

        if current != self.current.get() {
            match current {
                Some(index) => info!(
                    "Transcript > [{}] {}",
                    timestamp_to_string(lines[index].start_timestamp_ms),
                    lines[index].content
                ),
                None => debug!("No transcript line at {}ms", time_ms),
            }
            self.current.set(current);
        }
        current
    }
}

/// Read a JSON array of transcript lines.
pub async fn load_transcript(path: &Path) -> Result<Vec<TranscriptLine>, Box<dyn Error>> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&contents)?)
}

/// Subscribe `area` to sync events.
pub fn attach(bus: &LectureBus, area: &Rc<TranscriptArea>) -> SubscriptionId {
    let area_weak = Rc::downgrade(area);
    bus.subscribe(CHANNEL_SYNC, move |event| {
        if let (LectureEvent::Sync(sync), Some(area)) = (event, area_weak.upgrade()) {
            area.on_sync(sync.time_ms);
        }
        Ok(())
    })
}
