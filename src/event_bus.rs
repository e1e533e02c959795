//! Event bus shared by all lecture panels.
//!
//! Design principles:
//! - One bus per lecture view, injected into every panel (no globals)
//! - Typed payload enum, channel names as constants
//! - Panels hold only weak references inside their callbacks
//!
//! `sync` carries the playback time sampled from the video. `seekAll` asks
//! every panel (video first) to jump to a time.

use lecture_bus::{EventBus, SyncEvent};
use std::rc::Rc;

/// Channel carrying periodic and forced playback time updates.
pub const CHANNEL_SYNC: &str = "sync";

/// Channel asking every panel to seek to a time.
pub const CHANNEL_SEEK_ALL: &str = "seekAll";

/// Payload of every lecture bus channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LectureEvent {
    Sync(SyncEvent),
    SeekAll(u64),
}

impl From<SyncEvent> for LectureEvent {
    fn from(event: SyncEvent) -> Self {
        LectureEvent::Sync(event)
    }
}

pub type LectureBus = EventBus<LectureEvent>;

pub fn new_bus() -> Rc<LectureBus> {
    Rc::new(EventBus::new())
}

/// Ask every panel to seek to `time_ms`.
#[inline]
pub fn publish_seek_all(bus: &LectureBus, time_ms: u64) -> bool {
    bus.publish(CHANNEL_SEEK_ALL, &LectureEvent::SeekAll(time_ms))
}
