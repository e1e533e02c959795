//! Playback clock sampler.
//!
//! Reads the authoritative playback clock on a fixed interval and publishes a
//! [`SyncEvent`] only when the time changed since the last publish. The sync
//! channel is edge-triggered: a paused video produces no traffic.
//!
//! Seeks go through [`TimeSource::force_seek`], which publishes immediately
//! and never debounces.

use crate::bus::EventBus;
use crate::error::BusError;
use log::{debug, info, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default sampling interval.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_millis(1000);

/// Synchronization payload published on the sync channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncEvent {
    pub time_ms: u64,
    /// True when caused by an explicit seek rather than the periodic sampler.
    pub source_is_video_seek: bool,
}

/// Source of the current playback time in milliseconds.
pub trait PlaybackClock {
    /// Fails with [`BusError::ClockNotReady`] before the player is ready.
    fn current_time_ms(&self) -> Result<u64, BusError>;
}

impl<F> PlaybackClock for F
where
    F: Fn() -> Result<u64, BusError>,
{
    fn current_time_ms(&self) -> Result<u64, BusError> {
        self()
    }
}

/// Periodic sampler publishing [`SyncEvent`]s on one bus channel.
///
/// Payloads are converted with `E: From<SyncEvent>`, so the bus can carry an
/// application-wide event enum.
pub struct TimeSource<E> {
    bus: Rc<EventBus<E>>,
    channel: String,
    interval: Duration,
    last_published: Cell<Option<u64>>,
    // Bumped on every start/stop; a timer task only publishes while its epoch is current.
    epoch: Cell<u64>,
    task: RefCell<Option<JoinHandle<()>>>,
}

impl<E> TimeSource<E>
where
    E: From<SyncEvent> + 'static,
{
    pub fn new(bus: Rc<EventBus<E>>, channel: &str, interval: Duration) -> Self {
        Self {
            bus,
            channel: channel.to_string(),
            interval,
            last_published: Cell::new(None),
            epoch: Cell::new(0),
            task: RefCell::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Last time published on the channel, if any.
    pub fn last_published(&self) -> Option<u64> {
        self.last_published.get()
    }

    pub fn is_running(&self) -> bool {
        self.task.borrow().is_some()
    }

    /// Start sampling `clock` every interval.
    ///
    /// Must be called from inside a `tokio::task::LocalSet`. Starting an
    /// already running source replaces the previous timer.
    pub fn start<C>(self: &Rc<Self>, clock: C)
    where
        C: PlaybackClock + 'static,
    {
        self.stop();

        let epoch = self.epoch.get();
        let weak = Rc::downgrade(self);
        let period = self.interval;

        info!(
            "Starting time source on '{}' every {}ms",
            self.channel,
            period.as_millis()
        );

        let handle = tokio::task::spawn_local(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                let Some(source) = weak.upgrade() else {
                    break;
                };
                if source.epoch.get() != epoch {
                    debug!("Time source tick after stop, ignoring");
                    break;
                }
                source.tick(&clock);
            }
        });

        *self.task.borrow_mut() = Some(handle);
    }

    /// Cancel periodic sampling. Safe to call when not started.
    pub fn stop(&self) {
        self.epoch.set(self.epoch.get() + 1);

        if let Some(handle) = self.task.borrow_mut().take() {
            handle.abort();
            info!("Stopped time source on '{}'", self.channel);
        }
    }

    /// Take one sample and publish it if it differs from the last published time.
    ///
    /// Returns whether a publish happened.
    pub fn tick<C>(&self, clock: &C) -> bool
    where
        C: PlaybackClock + ?Sized,
    {
        let time_ms = match clock.current_time_ms() {
            Ok(time_ms) => time_ms,
            Err(e) => {
                warn!("Skipping sync tick: {}", e);
                return false;
            }
        };

        if self.last_published.get() == Some(time_ms) {
            return false;
        }

        self.last_published.set(Some(time_ms));
        self.publish(SyncEvent {
            time_ms,
            source_is_video_seek: false,
        });
        true
    }

    /// Publish a seek immediately, bypassing the debounce.
    ///
    /// The seek time becomes the new debounce baseline.
    pub fn force_seek(&self, time_ms: u64) -> bool {
        debug!("Forced seek to {}ms", time_ms);
        self.last_published.set(Some(time_ms));
        self.publish(SyncEvent {
            time_ms,
            source_is_video_seek: true,
        })
    }

    fn publish(&self, event: SyncEvent) -> bool {
        self.bus.publish(&self.channel, &E::from(event))
    }
}

impl<E> Drop for TimeSource<E> {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}
