//! Lecture panels wired to the event bus.
//!
//! Every panel exposes an `attach` function that subscribes it to the bus.
//! Callbacks hold weak references, so dropping a panel silently ends its
//! subscription's effect.

pub mod discussion;
pub mod transcript;
pub mod video;
