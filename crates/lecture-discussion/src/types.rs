//! Core types for lecture-discussion

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque comment identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommentId {
    fn from(s: &str) -> Self {
        CommentId(s.to_string())
    }
}

/// Kind of comment. Questions and notes are root comments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentType {
    #[default]
    Question,
    Note,
    Reply,
}

impl CommentType {
    pub fn is_root(&self) -> bool {
        !matches!(self, CommentType::Reply)
    }
}

/// A discussion comment anchored to a playback time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub timestamp_ms: u64,
    pub content: String,
    #[serde(rename = "type", default)]
    pub comment_type: CommentType,
    /// Only set for replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
}

impl Comment {
    pub fn root(id: &str, timestamp_ms: u64, content: &str, comment_type: CommentType) -> Self {
        Self {
            id: id.into(),
            timestamp_ms,
            content: content.to_string(),
            comment_type,
            parent_id: None,
        }
    }
}

/// Root comments of one load, sorted ascending by timestamp.
///
/// The order is fixed at construction. A reload builds a new collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommentCollection {
    comments: Vec<Comment>,
}

impl CommentCollection {
    /// Build a collection from fetched comments. Replies are dropped.
    pub fn new(comments: Vec<Comment>) -> Self {
        let mut roots: Vec<Comment> = comments
            .into_iter()
            .filter(|c| {
                let is_root = c.comment_type.is_root();
                if !is_root {
                    warn!("Dropping reply {} from root comment list", c.id);
                }
                is_root
            })
            .collect();

        // Stable: comments at the same time keep the source's order.
        roots.sort_by_key(|c| c.timestamp_ms);
        Self { comments: roots }
    }

    pub fn as_slice(&self) -> &[Comment] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Comment> {
        self.comments.iter()
    }
}

impl IntoIterator for CommentCollection {
    type Item = Comment;
    type IntoIter = std::vec::IntoIter<Comment>;

    fn into_iter(self) -> Self::IntoIter {
        self.comments.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_sorts_and_drops_replies() {
        let mut reply = Comment::root("r", 1, "reply", CommentType::Reply);
        reply.parent_id = Some("b".into());

        let collection = CommentCollection::new(vec![
            Comment::root("c", 300, "third", CommentType::Question),
            reply,
            Comment::root("a", 100, "first", CommentType::Note),
            Comment::root("b", 200, "second", CommentType::Question),
        ]);

        let ids: Vec<&str> = collection.iter().map(|c| c.id.0.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_equal_timestamps_keep_source_order() {
        let collection = CommentCollection::new(vec![
            Comment::root("late", 500, "x", CommentType::Question),
            Comment::root("first", 100, "x", CommentType::Question),
            Comment::root("second", 100, "x", CommentType::Note),
        ]);

        let ids: Vec<&str> = collection.iter().map(|c| c.id.0.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "late"]);
    }

    #[test]
    fn test_comment_json_shape() {
        let json = r#"{"id":"42","timestampMs":61000,"content":"why?","type":"QUESTION"}"#;
        let comment: Comment = serde_json::from_str(json).unwrap();

        assert_eq!(comment.id, CommentId("42".into()));
        assert_eq!(comment.timestamp_ms, 61_000);
        assert_eq!(comment.comment_type, CommentType::Question);
        assert_eq!(comment.parent_id, None);

        let reply = r#"{"id":"43","timestampMs":0,"content":"because","type":"REPLY","parentId":"42"}"#;
        let reply: Comment = serde_json::from_str(reply).unwrap();
        assert_eq!(reply.parent_id, Some(CommentId("42".into())));
        assert!(!reply.comment_type.is_root());
    }
}
