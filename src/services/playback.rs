//! Simulated video player.
//!
//! Stands in for the embedded player: keeps the last known position and the
//! instant it was taken, and interpolates while playing. The position is
//! clamped to the video length.

use lecture_bus::BusError;
use log::{debug, info};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::time::Instant;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    #[default]
    Stopped,
}

impl PlaybackStatus {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackStatus::Playing)
    }
}

#[derive(Debug)]
struct PlayerState {
    ready: bool,
    status: PlaybackStatus,
    /// Last known position
    position_ms: u64,
    /// When `position_ms` was taken
    position_at: Instant,
}

pub struct SimulatedPlayer {
    video_id: String,
    length_ms: u64,
    state: RefCell<PlayerState>,
}

impl SimulatedPlayer {
    pub fn new(video_id: &str, length_ms: u64) -> Self {
        Self {
            video_id: video_id.to_string(),
            length_ms,
            state: RefCell::new(PlayerState {
                ready: false,
                status: PlaybackStatus::Stopped,
                position_ms: 0,
                position_at: Instant::now(),
            }),
        }
    }

    /// Equivalent of the player's ready callback. The clock errors before this.
    pub fn mark_ready(&self) {
        info!("Player ready for video '{}'", self.video_id);
        self.state.borrow_mut().ready = true;
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.borrow().status
    }

    pub fn play(&self) {
        self.set_status(PlaybackStatus::Playing);
    }

    pub fn pause(&self) {
        self.set_status(PlaybackStatus::Paused);
    }

    pub fn seek_to(&self, time_ms: u64) {
        let mut state = self.state.borrow_mut();
        state.position_ms = time_ms.min(self.length_ms);
        state.position_at = Instant::now();
        debug!("Player seeked to {}ms", state.position_ms);
    }

    /// Current interpolated position.
    pub fn current_time_ms(&self) -> Result<u64, BusError> {
        let state = self.state.borrow();
        if !state.ready {
            return Err(BusError::ClockNotReady);
        }
        Ok(Self::interpolate(&state, self.length_ms))
    }

    /// Clock closure for the time source.
    pub fn clock(self: &Rc<Self>) -> impl Fn() -> Result<u64, BusError> + use<> {
        let player = Rc::clone(self);
        move || player.current_time_ms()
    }

    fn set_status(&self, status: PlaybackStatus) {
        let mut state = self.state.borrow_mut();
        // Freeze the interpolated position before switching.
        state.position_ms = Self::interpolate(&state, self.length_ms);
        state.position_at = Instant::now();
        state.status = status;
    }

    fn interpolate(state: &PlayerState, length_ms: u64) -> u64 {
        if !state.status.is_playing() {
            return state.position_ms;
        }
        let elapsed_ms = state.position_at.elapsed().as_millis() as u64;
        (state.position_ms + elapsed_ms).min(length_ms)
    }
}
