//! Collaborators consumed by the discussion panel.

use crate::error::DiscussionError;
use crate::types::{Comment, CommentId, CommentType};
use futures_util::future::LocalBoxFuture;

/// Where comments come from and where new ones go.
pub trait CommentSource {
    /// Fetch all root comments of the lecture.
    fn fetch_root_comments(&self) -> LocalBoxFuture<'_, Result<Vec<Comment>, DiscussionError>>;

    /// Post a new root comment anchored at `time_ms`.
    fn post_root_comment(
        &self,
        content: String,
        time_ms: u64,
        comment_type: CommentType,
    ) -> LocalBoxFuture<'_, Result<(), DiscussionError>>;

    /// Post a reply to `parent_id`.
    fn post_reply(
        &self,
        content: String,
        parent_id: CommentId,
    ) -> LocalBoxFuture<'_, Result<(), DiscussionError>>;
}

/// Rendering side of the discussion panel.
pub trait CommentView {
    /// Opaque handle to a rendered comment.
    type Handle: Clone;

    fn render(&self, comment: &Comment) -> Self::Handle;
    fn highlight(&self, handle: &Self::Handle);
    fn unhighlight(&self, handle: &Self::Handle);
    fn scroll_into_view(&self, handle: &Self::Handle);

    /// Remove every rendered comment.
    fn clear(&self);

    /// Show the time the discussion is synced to.
    fn show_time(&self, _time_ms: u64) {}
}
