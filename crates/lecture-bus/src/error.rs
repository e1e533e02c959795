//! Error types for lecture-bus

/// Bus and clock errors
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Playback clock is not ready")]
    ClockNotReady,
}
