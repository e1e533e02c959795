//! Discussion panel.
//!
//! Renders comments to the log and tracks which ones carry the highlight.
//! Subscribes the discussion controller to the sync channel.

use crate::event_bus::{CHANNEL_SYNC, LectureBus, LectureEvent};
use crate::functions::formatting::timestamp_to_string;
use lecture_bus::SubscriptionId;
use lecture_discussion::{Comment, CommentId, CommentView, DiscussionArea};
use log::{debug, info};
use std::cell::RefCell;
use std::rc::Rc;

pub type LectureDiscussion = DiscussionArea<LogCommentView>;

/// Rendered comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentHandle {
    pub id: CommentId,
    pub label: String,
}

/// Log-backed comment view.
#[derive(Default)]
pub struct LogCommentView {
    highlighted: RefCell<Vec<CommentId>>,
}

impl LogCommentView {
    /// Ids currently highlighted, in highlight order.
    #[cfg(test)]
    pub fn highlighted(&self) -> Vec<CommentId> {
        self.highlighted.borrow().clone()
    }
}

impl CommentView for LogCommentView {
    type Handle = CommentHandle;

    fn render(&self, comment: &Comment) -> CommentHandle {
        let label = format!(
            "[{}] {:?}: {}",
            timestamp_to_string(comment.timestamp_ms),
            comment.comment_type,
            comment.content
        );
        debug!("Rendered comment {}", label);
        CommentHandle {
            id: comment.id.clone(),
            label,
        }
    }

    fn highlight(&self, handle: &CommentHandle) {
        info!("Discussion > {}", handle.label);
        self.highlighted.borrow_mut().push(handle.id.clone());
    }

    fn unhighlight(&self, handle: &CommentHandle) {
        self.highlighted.borrow_mut().retain(|id| *id != handle.id);
    }

    fn scroll_into_view(&self, handle: &CommentHandle) {
        debug!("Scrolled discussion to {}", handle.id);
    }

    fn clear(&self) {
        self.highlighted.borrow_mut().clear();
    }

    fn show_time(&self, time_ms: u64) {
        debug!("Discussion time {}", timestamp_to_string(time_ms));
    }
}

/// Subscribe `area` to sync events.
pub fn attach(bus: &LectureBus, area: &Rc<LectureDiscussion>) -> SubscriptionId {
    let area_weak = Rc::downgrade(area);
    bus.subscribe(CHANNEL_SYNC, move |event| {
        if let (LectureEvent::Sync(sync), Some(area)) = (event, area_weak.upgrade()) {
            area.on_sync(sync.time_ms);
        }
        Ok(())
    })
}
