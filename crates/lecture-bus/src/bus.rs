//! Named-channel event bus.
//!
//! Producers publish on a channel name, every subscriber of that channel is
//! called synchronously in registration order. One failing subscriber never
//! stops the others: errors and panics are caught and logged per callback.
//!
//! The bus is single-threaded (`Rc` callbacks). The subscriber list is
//! snapshotted at the start of a publish, so callbacks may publish,
//! subscribe or unsubscribe on the same bus.

use log::{debug, error, warn};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Result returned by subscriber callbacks.
pub type SubscriberResult = Result<(), Box<dyn std::error::Error>>;

type Callback<E> = Rc<dyn Fn(&E) -> SubscriberResult>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber<E> {
    id: SubscriptionId,
    callback: Callback<E>,
}

/// Publish/subscribe registry keyed by channel name.
pub struct EventBus<E> {
    channels: RefCell<HashMap<String, Vec<Subscriber<E>>>>,
    next_id: Cell<u64>,
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            channels: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        }
    }

    /// Register `callback` under `channel`. The channel does not need to exist.
    /// Registering the same callback twice makes it fire twice.
    pub fn subscribe<F>(&self, channel: &str, callback: F) -> SubscriptionId
    where
        F: Fn(&E) -> SubscriberResult + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        self.channels
            .borrow_mut()
            .entry(channel.to_string())
            .or_default()
            .push(Subscriber {
                id,
                callback: Rc::new(callback),
            });

        debug!("Subscribed {:?} to '{}'", id, channel);
        id
    }

    /// Remove a subscription. Returns whether anything was removed.
    pub fn unsubscribe(&self, channel: &str, id: SubscriptionId) -> bool {
        let mut channels = self.channels.borrow_mut();
        let Some(subscribers) = channels.get_mut(channel) else {
            return false;
        };

        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        let removed = subscribers.len() != before;

        if subscribers.is_empty() {
            channels.remove(channel);
        }
        removed
    }

    /// Call every subscriber of `channel` with `event`, in registration order.
    ///
    /// Returns `false` (and logs) when the channel has no subscribers.
    pub fn publish(&self, channel: &str, event: &E) -> bool {
        let callbacks: Vec<Callback<E>> = match self.channels.borrow().get(channel) {
            Some(subscribers) if !subscribers.is_empty() => subscribers
                .iter()
                .map(|s| Rc::clone(&s.callback))
                .collect(),
            _ => {
                warn!("{} not found.", channel);
                return false;
            }
        };

        for (index, callback) in callbacks.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| callback(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!("Subscriber #{} on '{}' failed: {}", index, channel, e);
                }
                Err(payload) => {
                    error!(
                        "Subscriber #{} on '{}' panicked: {}",
                        index,
                        channel,
                        panic_message(payload.as_ref())
                    );
                }
            }
        }

        true
    }

    /// Number of subscribers currently registered on `channel`.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .borrow()
            .get(channel)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Drop every subscription on every channel.
    pub fn clear(&self) {
        self.channels.borrow_mut().clear();
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
