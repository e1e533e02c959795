//! Video panel.
//!
//! Handles `seekAll`: moves the player, then forces a sync so every other
//! panel follows right away instead of waiting for the next clock sample.

use crate::event_bus::{CHANNEL_SEEK_ALL, LectureBus, LectureEvent};
use crate::services::playback::SimulatedPlayer;
use lecture_bus::{SubscriptionId, TimeSource};
use log::info;
use std::rc::Rc;

/// Subscribe the player to seek requests.
pub fn attach(
    bus: &LectureBus,
    player: &Rc<SimulatedPlayer>,
    time_source: &Rc<TimeSource<LectureEvent>>,
) -> SubscriptionId {
    let player_weak = Rc::downgrade(player);
    let time_source_weak = Rc::downgrade(time_source);

    bus.subscribe(CHANNEL_SEEK_ALL, move |event| {
        let LectureEvent::SeekAll(time_ms) = *event else {
            return Ok(());
        };
        let (Some(player), Some(time_source)) = (player_weak.upgrade(), time_source_weak.upgrade())
        else {
            return Ok(());
        };

        info!("Seeking video to {}ms", time_ms);
        player.seek_to(time_ms);
        time_source.force_seek(time_ms);
        Ok(())
    })
}
