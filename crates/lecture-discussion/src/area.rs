//! Discussion panel controller.
//!
//! Owns the rendered comments of the current load and the highlight state.
//! Sync events move the highlight to the comments nearest to the playback
//! time; reloads replace the whole collection.
//!
//! Reloads are asynchronous. Each load takes a generation token before it
//! suspends and only applies its result if no newer load started meanwhile,
//! so a slow response can never overwrite a faster, newer one.
//!
//! View callbacks run with no internal borrow held, so a view may query the
//! area from inside them.

use crate::error::DiscussionError;
use crate::locator::{Timestamped, locate_range};
use crate::source::{CommentSource, CommentView};
use crate::types::{Comment, CommentCollection, CommentId, CommentType};
use log::{debug, info};
use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::Rc;

/// Controller phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiscussionPhase {
    #[default]
    Idle,
    CommentsLoaded,
    Syncing,
}

struct RenderedComment<H> {
    comment: Comment,
    handle: H,
}

impl<H> Timestamped for RenderedComment<H> {
    fn timestamp_ms(&self) -> u64 {
        self.comment.timestamp_ms
    }
}

struct DiscussionState<H> {
    phase: DiscussionPhase,
    entries: Vec<RenderedComment<H>>,
    /// Highlighted entries. Always a valid range into `entries`.
    nearest: Range<usize>,
    current_time_ms: u64,
}

/// Discussion comments kept in sync with the playback time.
pub struct DiscussionArea<V: CommentView> {
    source: Rc<dyn CommentSource>,
    view: V,
    state: RefCell<DiscussionState<V::Handle>>,
    generation: Cell<u64>,
}

impl<V: CommentView> DiscussionArea<V> {
    pub fn new(source: Rc<dyn CommentSource>, view: V) -> Self {
        Self {
            source,
            view,
            state: RefCell::new(DiscussionState {
                phase: DiscussionPhase::Idle,
                entries: Vec::new(),
                nearest: 0..0,
                current_time_ms: 0,
            }),
            generation: Cell::new(0),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn phase(&self) -> DiscussionPhase {
        self.state.borrow().phase
    }

    /// Time of the last sync, used as the anchor for new comments.
    pub fn current_time_ms(&self) -> u64 {
        self.state.borrow().current_time_ms
    }

    /// Comments of the current load, sorted by timestamp.
    pub fn comments(&self) -> Vec<Comment> {
        self.state
            .borrow()
            .entries
            .iter()
            .map(|e| e.comment.clone())
            .collect()
    }

    /// Currently highlighted comments.
    pub fn nearest_comments(&self) -> Vec<Comment> {
        let state = self.state.borrow();
        state.entries[state.nearest.clone()]
            .iter()
            .map(|e| e.comment.clone())
            .collect()
    }

    /// Fetch comments from the source and show them.
    ///
    /// Returns `Ok(false)` when a newer load started while this one was
    /// waiting; its result is discarded. A newer load supersedes this one as
    /// soon as it starts, even if its own fetch then fails, in which case the
    /// area keeps showing the last applied comments.
    pub async fn load_discussion(&self) -> Result<bool, DiscussionError> {
        let generation = self.next_generation();
        let comments = self.source.fetch_root_comments().await?;

        if self.generation.get() != generation {
            debug!(
                "Discarding stale comment load (generation {} < {})",
                generation,
                self.generation.get()
            );
            return Ok(false);
        }

        self.apply(CommentCollection::new(comments));
        Ok(true)
    }

    /// Show an already fetched set of comments. Supersedes in-flight loads.
    pub fn on_comments_loaded(&self, comments: Vec<Comment>) {
        self.next_generation();
        self.apply(CommentCollection::new(comments));
    }

    /// Move the highlight to the comments nearest to `time_ms`.
    pub fn on_sync(&self, time_ms: u64) {
        let moved = {
            let mut state = self.state.borrow_mut();
            state.current_time_ms = time_ms;

            if state.phase == DiscussionPhase::Idle {
                None
            } else {
                let previous = handles(&state.entries, &state.nearest);
                let nearest = locate_range(&state.entries, time_ms);
                let current = handles(&state.entries, &nearest);
                state.nearest = nearest;
                state.phase = DiscussionPhase::Syncing;
                Some((previous, current))
            }
        };

        self.view.show_time(time_ms);
        let Some((previous, current)) = moved else {
            debug!("Sync to {}ms before comments loaded", time_ms);
            return;
        };

        for handle in &previous {
            self.view.unhighlight(handle);
        }
        if let Some(first) = current.first() {
            self.view.scroll_into_view(first);
        }
        for handle in &current {
            self.view.highlight(handle);
        }

        debug!(
            "Synced discussion to {}ms, {} nearest comment(s)",
            time_ms,
            current.len()
        );
    }

    /// Post a root comment at the current time, then reload.
    pub async fn post_new_comment(
        &self,
        content: String,
        comment_type: CommentType,
    ) -> Result<bool, DiscussionError> {
        if !comment_type.is_root() {
            return Err(DiscussionError::MissingParent);
        }

        let time_ms = self.current_time_ms();
        self.source
            .post_root_comment(content, time_ms, comment_type)
            .await?;
        self.load_discussion().await
    }

    /// Post a reply to `parent_id`, then reload.
    pub async fn post_reply(
        &self,
        content: String,
        parent_id: CommentId,
    ) -> Result<bool, DiscussionError> {
        self.source.post_reply(content, parent_id).await?;
        self.load_discussion().await
    }

    /// Drop all comments and highlights, and discard in-flight loads.
    pub fn teardown(&self) {
        self.next_generation();

        let previous = self.take_highlight();
        {
            let mut state = self.state.borrow_mut();
            state.entries.clear();
            state.phase = DiscussionPhase::Idle;
        }

        for handle in &previous {
            self.view.unhighlight(handle);
        }
        self.view.clear();
    }

    fn next_generation(&self) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        generation
    }

    fn apply(&self, collection: CommentCollection) {
        for handle in &self.take_highlight() {
            self.view.unhighlight(handle);
        }
        self.view.clear();

        let entries: Vec<RenderedComment<V::Handle>> = collection
            .into_iter()
            .map(|comment| {
                let handle = self.view.render(&comment);
                RenderedComment { comment, handle }
            })
            .collect();
        let count = entries.len();

        {
            let mut state = self.state.borrow_mut();
            state.entries = entries;
            state.phase = DiscussionPhase::CommentsLoaded;
        }
        info!("Loaded {} discussion comments", count);
    }

    /// Reset the highlight, returning the handles that carried it.
    fn take_highlight(&self) -> Vec<V::Handle> {
        let mut state = self.state.borrow_mut();
        let nearest = std::mem::replace(&mut state.nearest, 0..0);
        handles(&state.entries, &nearest)
    }
}

fn handles<H: Clone>(entries: &[RenderedComment<H>], range: &Range<usize>) -> Vec<H> {
    entries[range.clone()]
        .iter()
        .map(|e| e.handle.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::LocalBoxFuture;
    use std::collections::{BTreeSet, VecDeque};
    use std::rc::Weak;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingView {
        rendered: RefCell<Vec<String>>,
        highlighted: RefCell<BTreeSet<String>>,
        scrolled: RefCell<Vec<String>>,
        shown_time: Cell<u64>,
    }

    impl RecordingView {
        fn highlighted(&self) -> Vec<String> {
            self.highlighted.borrow().iter().cloned().collect()
        }
    }

    impl CommentView for RecordingView {
        type Handle = String;

        fn render(&self, comment: &Comment) -> String {
            self.rendered.borrow_mut().push(comment.id.0.clone());
            comment.id.0.clone()
        }

        fn highlight(&self, handle: &String) {
            self.highlighted.borrow_mut().insert(handle.clone());
        }

        fn unhighlight(&self, handle: &String) {
            self.highlighted.borrow_mut().remove(handle);
        }

        fn scroll_into_view(&self, handle: &String) {
            self.scrolled.borrow_mut().push(handle.clone());
        }

        fn clear(&self) {
            self.rendered.borrow_mut().clear();
            self.highlighted.borrow_mut().clear();
        }

        fn show_time(&self, time_ms: u64) {
            self.shown_time.set(time_ms);
        }
    }

    #[derive(Default)]
    struct FakeSource {
        comments: RefCell<Vec<Comment>>,
        /// Scripted (delay, result) pairs consumed by successive fetches.
        scripted: RefCell<VecDeque<(Duration, Result<Vec<Comment>, String>)>>,
        posted: RefCell<Vec<(String, u64, CommentType)>>,
    }

    impl CommentSource for FakeSource {
        fn fetch_root_comments(&self) -> LocalBoxFuture<'_, Result<Vec<Comment>, DiscussionError>> {
            let scripted = self.scripted.borrow_mut().pop_front();
            let stored = self.comments.borrow().clone();
            Box::pin(async move {
                match scripted {
                    Some((delay, result)) => {
                        tokio::time::sleep(delay).await;
                        result.map_err(DiscussionError::Source)
                    }
                    None => Ok(stored),
                }
            })
        }

        fn post_root_comment(
            &self,
            content: String,
            time_ms: u64,
            comment_type: CommentType,
        ) -> LocalBoxFuture<'_, Result<(), DiscussionError>> {
            let id = format!("posted-{}", self.posted.borrow().len());
            self.comments
                .borrow_mut()
                .push(Comment::root(&id, time_ms, &content, comment_type));
            self.posted.borrow_mut().push((content, time_ms, comment_type));
            Box::pin(async { Ok(()) })
        }

        fn post_reply(
            &self,
            content: String,
            parent_id: CommentId,
        ) -> LocalBoxFuture<'_, Result<(), DiscussionError>> {
            self.posted
                .borrow_mut()
                .push((format!("{parent_id}:{content}"), 0, CommentType::Reply));
            Box::pin(async { Ok(()) })
        }
    }

    fn comments(times: &[(&str, u64)]) -> Vec<Comment> {
        times
            .iter()
            .map(|(id, t)| Comment::root(id, *t, "text", CommentType::Question))
            .collect()
    }

    fn area() -> (DiscussionArea<RecordingView>, Rc<FakeSource>) {
        let source = Rc::new(FakeSource::default());
        let area = DiscussionArea::new(source.clone(), RecordingView::default());
        (area, source)
    }

    fn ids<V: CommentView>(area: &DiscussionArea<V>) -> Vec<String> {
        area.comments().into_iter().map(|c| c.id.0).collect()
    }

    /// View that reads the area back from inside its callbacks.
    #[derive(Default)]
    struct QueryingView {
        area: RefCell<Weak<DiscussionArea<QueryingView>>>,
        seen: RefCell<Vec<(String, usize)>>,
    }

    impl CommentView for QueryingView {
        type Handle = String;

        fn render(&self, comment: &Comment) -> String {
            comment.id.0.clone()
        }

        fn highlight(&self, handle: &String) {
            if let Some(area) = self.area.borrow().upgrade() {
                let nearest = area.nearest_comments().len();
                self.seen.borrow_mut().push((handle.clone(), nearest));
            }
        }

        fn unhighlight(&self, _handle: &String) {}

        fn scroll_into_view(&self, _handle: &String) {
            if let Some(area) = self.area.borrow().upgrade() {
                assert_eq!(area.phase(), DiscussionPhase::Syncing);
            }
        }

        fn clear(&self) {}
    }

    #[test]
    fn test_sync_before_load_only_records_time() {
        let (area, _) = area();
        area.on_sync(5_000);

        assert_eq!(area.phase(), DiscussionPhase::Idle);
        assert_eq!(area.current_time_ms(), 5_000);
        assert_eq!(area.view().shown_time.get(), 5_000);
        assert!(area.view().highlighted().is_empty());
    }

    #[test]
    fn test_sync_moves_highlight() {
        let (area, _) = area();
        area.on_comments_loaded(comments(&[("c", 30_000), ("a", 10_000), ("b", 20_000)]));
        assert_eq!(area.phase(), DiscussionPhase::CommentsLoaded);
        assert_eq!(*area.view().rendered.borrow(), vec!["a", "b", "c"]);

        area.on_sync(11_000);
        assert_eq!(area.phase(), DiscussionPhase::Syncing);
        assert_eq!(area.view().highlighted(), vec!["a"]);

        area.on_sync(29_000);
        assert_eq!(area.view().highlighted(), vec!["c"]);
        assert_eq!(*area.view().scrolled.borrow(), vec!["a", "c"]);
    }

    #[test]
    fn test_tie_highlights_all_and_scrolls_to_first() {
        let (area, _) = area();
        area.on_comments_loaded(comments(&[("a", 10_000), ("b", 30_000)]));

        area.on_sync(20_000);
        assert_eq!(area.view().highlighted(), vec!["a", "b"]);
        assert_eq!(*area.view().scrolled.borrow(), vec!["a"]);

        let nearest: Vec<String> = area.nearest_comments().into_iter().map(|c| c.id.0).collect();
        assert_eq!(nearest, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_collection_means_no_highlight() {
        let (area, _) = area();
        area.on_comments_loaded(Vec::new());
        area.on_sync(1_000);

        assert!(area.view().highlighted().is_empty());
        assert!(area.view().scrolled.borrow().is_empty());
        assert!(area.nearest_comments().is_empty());
    }

    #[test]
    fn test_reload_clears_highlight() {
        let (area, _) = area();
        area.on_comments_loaded(comments(&[("a", 1_000)]));
        area.on_sync(1_000);
        assert_eq!(area.view().highlighted(), vec!["a"]);

        area.on_comments_loaded(comments(&[("x", 1_000), ("y", 2_000)]));
        assert_eq!(area.phase(), DiscussionPhase::CommentsLoaded);
        assert!(area.nearest_comments().is_empty());
        assert!(area.view().highlighted().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_reload_wins_over_slower_earlier_one() {
        let (area, source) = area();
        source.scripted.borrow_mut().extend([
            (Duration::from_millis(200), Ok(comments(&[("old", 1_000)]))),
            (Duration::from_millis(50), Ok(comments(&[("new", 2_000)]))),
        ]);

        let (first, second) = tokio::join!(area.load_discussion(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            area.load_discussion().await
        });

        assert!(!first.unwrap());
        assert!(second.unwrap());
        assert_eq!(ids(&area), vec!["new"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_newer_load_still_supersedes_older_one() {
        let (area, source) = area();
        area.on_comments_loaded(comments(&[("before", 500)]));
        source.scripted.borrow_mut().extend([
            (Duration::from_millis(200), Ok(comments(&[("old", 1_000)]))),
            (Duration::from_millis(50), Err("backend down".to_string())),
        ]);

        let (first, second) = tokio::join!(area.load_discussion(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            area.load_discussion().await
        });

        assert!(!first.unwrap());
        assert!(matches!(second, Err(DiscussionError::Source(_))));
        assert_eq!(ids(&area), vec!["before"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pushed_comments_supersede_in_flight_load() {
        let (area, source) = area();
        source
            .scripted
            .borrow_mut()
            .push_back((Duration::from_millis(200), Ok(comments(&[("fetched", 1_000)]))));

        let (loaded, ()) = tokio::join!(area.load_discussion(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            area.on_comments_loaded(comments(&[("pushed", 2_000)]));
        });

        assert!(!loaded.unwrap());
        assert_eq!(ids(&area), vec!["pushed"]);
        assert_eq!(area.phase(), DiscussionPhase::CommentsLoaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_discards_in_flight_load() {
        let (area, source) = area();
        source
            .scripted
            .borrow_mut()
            .push_back((Duration::from_millis(200), Ok(comments(&[("fetched", 1_000)]))));

        let (loaded, ()) = tokio::join!(area.load_discussion(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            area.teardown();
        });

        assert!(!loaded.unwrap());
        assert_eq!(area.phase(), DiscussionPhase::Idle);
        assert!(area.comments().is_empty());
        assert!(area.view().rendered.borrow().is_empty());
    }

    #[test]
    fn test_view_may_query_area_from_callbacks() {
        let area = Rc::new(DiscussionArea::new(
            Rc::new(FakeSource::default()),
            QueryingView::default(),
        ));
        *area.view().area.borrow_mut() = Rc::downgrade(&area);

        area.on_comments_loaded(comments(&[("a", 10_000), ("b", 30_000)]));
        area.on_sync(20_000);

        assert_eq!(
            *area.view().seen.borrow(),
            vec![("a".to_string(), 2), ("b".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_post_new_comment_uses_current_time_and_reloads() {
        let (area, source) = area();
        area.load_discussion().await.unwrap();
        area.on_sync(42_000);

        assert!(
            area.post_new_comment("What is a monad?".into(), CommentType::Question)
                .await
                .unwrap()
        );

        assert_eq!(
            *source.posted.borrow(),
            vec![("What is a monad?".to_string(), 42_000, CommentType::Question)]
        );
        assert_eq!(area.comments().len(), 1);
        assert_eq!(area.comments()[0].timestamp_ms, 42_000);
    }

    #[tokio::test]
    async fn test_post_new_comment_rejects_reply_type() {
        let (area, source) = area();
        let result = area.post_new_comment("orphan".into(), CommentType::Reply).await;

        assert!(matches!(result, Err(DiscussionError::MissingParent)));
        assert!(source.posted.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_post_reply_reloads() {
        let (area, source) = area();
        source.comments.borrow_mut().extend(comments(&[("q", 5_000)]));

        assert!(area.post_reply("yes".into(), "q".into()).await.unwrap());
        assert_eq!(source.posted.borrow()[0].0, "q:yes");
        assert_eq!(area.phase(), DiscussionPhase::CommentsLoaded);
    }

    #[test]
    fn test_teardown_returns_to_idle() {
        let (area, _) = area();
        area.on_comments_loaded(comments(&[("a", 1_000)]));
        area.on_sync(1_000);

        area.teardown();
        assert_eq!(area.phase(), DiscussionPhase::Idle);
        assert!(area.comments().is_empty());
        assert!(area.view().highlighted().is_empty());
    }
}
