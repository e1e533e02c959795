//! lecture-discussion - Discussion panel synchronized to playback time
//!
//! Features:
//! - Nearest-comment search over timestamp-sorted comments (with ties)
//! - Highlight state machine driven by sync events
//! - Generation-guarded reloads (a slow stale load never wins)

pub mod area;
pub mod error;
pub mod locator;
pub mod source;
pub mod types;

pub use area::{DiscussionArea, DiscussionPhase};
pub use error::DiscussionError;
pub use locator::{Timestamped, locate, locate_range};
pub use source::{CommentSource, CommentView};
pub use types::{Comment, CommentCollection, CommentId, CommentType};
