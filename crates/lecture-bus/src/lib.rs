//! lecture-bus: named-channel event bus for lecture panels
//!
//! Features:
//! - Synchronous publish in registration order
//! - Per-subscriber failure isolation (errors and panics)
//! - Edge-triggered playback clock sampler

pub mod bus;
pub mod error;
pub mod time_source;

pub use bus::{EventBus, SubscriberResult, SubscriptionId};
pub use error::BusError;
pub use time_source::{DEFAULT_SYNC_INTERVAL, PlaybackClock, SyncEvent, TimeSource};
