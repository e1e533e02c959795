//! Comment source seeded from a JSON file.
//!
//! The seed file is read once; posted comments and replies are kept in
//! memory for the lifetime of the view. Ids of posted comments are derived
//! from a SHA-256 over the lecture id, timestamp, content and a sequence
//! number, so they are stable for identical input.

use futures_util::future::LocalBoxFuture;
use lecture_discussion::{Comment, CommentId, CommentSource, CommentType, DiscussionError};
use log::{debug, info};
use sha2::{Digest, Sha256};
use std::cell::{Cell, RefCell};
use std::path::Path;

const COMMENT_ID_LEN: usize = 16;

pub struct JsonCommentSource {
    lecture_id: String,
    comments: RefCell<Vec<Comment>>,
    sequence: Cell<u64>,
}

impl JsonCommentSource {
    pub fn new(lecture_id: &str, comments: Vec<Comment>) -> Self {
        Self {
            lecture_id: lecture_id.to_string(),
            comments: RefCell::new(comments),
            sequence: Cell::new(0),
        }
    }

    /// Read the seed file. A missing file means an empty discussion.
    pub async fn load(lecture_id: &str, path: &Path) -> Result<Self, DiscussionError> {
        let comments = match tokio::fs::read_to_string(path).await {
            Ok(contents) => serde_json::from_str::<Vec<Comment>>(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No comments file at {:?}, starting empty", path);
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!("Read {} comments from {:?}", comments.len(), path);
        Ok(Self::new(lecture_id, comments))
    }

    /// All comments including replies.
    #[cfg(test)]
    pub fn all_comments(&self) -> Vec<Comment> {
        self.comments.borrow().clone()
    }

    fn next_id(&self, timestamp_ms: u64, content: &str) -> CommentId {
        let sequence = self.sequence.get();
        self.sequence.set(sequence + 1);
        comment_id(&self.lecture_id, timestamp_ms, content, sequence)
    }
}

/// Deterministic id for a new comment.
pub fn comment_id(lecture_id: &str, timestamp_ms: u64, content: &str, sequence: u64) -> CommentId {
    let mut hasher = Sha256::new();
    hasher.update(lecture_id.as_bytes());
    hasher.update(timestamp_ms.to_be_bytes());
    hasher.update(content.as_bytes());
    hasher.update(sequence.to_be_bytes());
    let hash = hex::encode(hasher.finalize());
    CommentId(hash[..COMMENT_ID_LEN].to_string())
}

fn check_content(content: &str) -> Result<(), DiscussionError> {
    if content.trim().is_empty() {
        return Err(DiscussionError::Source("comment content is empty".to_string()));
    }
    Ok(())
}

impl CommentSource for JsonCommentSource {
    fn fetch_root_comments(&self) -> LocalBoxFuture<'_, Result<Vec<Comment>, DiscussionError>> {
        let roots: Vec<Comment> = self
            .comments
            .borrow()
            .iter()
            .filter(|c| c.comment_type.is_root())
            .cloned()
            .collect();
        Box::pin(async move { Ok(roots) })
    }

    fn post_root_comment(
        &self,
        content: String,
        time_ms: u64,
        comment_type: CommentType,
    ) -> LocalBoxFuture<'_, Result<(), DiscussionError>> {
        Box::pin(async move {
            if !comment_type.is_root() {
                return Err(DiscussionError::MissingParent);
            }
            check_content(&content)?;
            let id = self.next_id(time_ms, &content);
            debug!("Posting {:?} {} at {}ms", comment_type, id, time_ms);
            self.comments.borrow_mut().push(Comment {
                id,
                timestamp_ms: time_ms,
                content,
                comment_type,
                parent_id: None,
            });
            Ok(())
        })
    }

    fn post_reply(
        &self,
        content: String,
        parent_id: CommentId,
    ) -> LocalBoxFuture<'_, Result<(), DiscussionError>> {
        Box::pin(async move {
            check_content(&content)?;
            let parent_time = self
                .comments
                .borrow()
                .iter()
                .find(|c| c.id == parent_id)
                .map(|c| c.timestamp_ms)
                .ok_or(DiscussionError::MissingParent)?;

            let id = self.next_id(parent_time, &content);
            debug!("Posting reply {} to {}", id, parent_id);
            self.comments.borrow_mut().push(Comment {
                id,
                timestamp_ms: parent_time,
                content,
                comment_type: CommentType::Reply,
                parent_id: Some(parent_id),
            });
            Ok(())
        })
    }
}
