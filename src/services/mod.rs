//! Collaborators behind the lecture panels.
//!
//! - `playback` - Simulated video player exposing the playback clock
//! - `comments` - JSON-seeded comment source with in-memory posting
//! - `feedback` - Icon feedback bucketing for the feedback graph

pub mod comments;
pub mod feedback;
pub mod playback;
