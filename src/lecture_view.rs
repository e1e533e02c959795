//! Lecture view: builds the panels, wires them to one bus and owns their
//! lifetime.
//!
//! Every collaborator is passed in explicitly; nothing is reachable through
//! globals. Teardown stops the clock sampler before anything else so no tick
//! can reach a half-dismantled view.

use crate::config::LectureConfig;
use crate::event_bus::{self, CHANNEL_SYNC, LectureBus, LectureEvent};
use crate::panels::discussion::{self, LectureDiscussion, LogCommentView};
use crate::panels::transcript::{self, TranscriptArea};
use crate::panels::video;
use crate::services::comments::JsonCommentSource;
use crate::services::feedback::{self, IconFeedbackType};
use crate::services::playback::SimulatedPlayer;
use lecture_bus::TimeSource;
use lecture_discussion::{CommentType, DiscussionArea, DiscussionError};
use log::{info, warn};
use std::error::Error;
use std::rc::Rc;

pub struct LectureView {
    config: LectureConfig,
    bus: Rc<LectureBus>,
    player: Rc<SimulatedPlayer>,
    time_source: Rc<TimeSource<LectureEvent>>,
    discussion: Rc<LectureDiscussion>,
    transcript: Rc<TranscriptArea>,
}

impl LectureView {
    /// Build every panel and subscribe it, without loading data or starting
    /// the clock.
    pub fn new(config: LectureConfig, comments: JsonCommentSource) -> Self {
        let bus = event_bus::new_bus();
        let player = Rc::new(SimulatedPlayer::new(
            &config.lecture.video_id,
            config.video_length_ms,
        ));
        let time_source = Rc::new(TimeSource::new(
            Rc::clone(&bus),
            CHANNEL_SYNC,
            config.sync_interval(),
        ));
        let discussion = Rc::new(DiscussionArea::new(
            Rc::new(comments),
            LogCommentView::default(),
        ));
        let transcript = Rc::new(TranscriptArea::new());

        video::attach(&bus, &player, &time_source);
        transcript::attach(&bus, &transcript);
        discussion::attach(&bus, &discussion);

        Self {
            config,
            bus,
            player,
            time_source,
            discussion,
            transcript,
        }
    }

    /// Build the view, load every panel's data and start playback.
    ///
    /// Must run inside a `LocalSet`. Panel data that fails to load is logged
    /// and left empty.
    pub async fn initialize(config: LectureConfig) -> Result<Self, Box<dyn Error>> {
        info!("Initializing lecture '{}'", config.lecture.name);

        let comments = match &config.comments_path {
            Some(path) => JsonCommentSource::load(&config.lecture.id, path).await?,
            None => JsonCommentSource::new(&config.lecture.id, Vec::new()),
        };
        let view = Self::new(config, comments);

        if let Err(e) = view.discussion.load_discussion().await {
            warn!("Failed to load discussion: {}", e);
        }

        if let Some(path) = &view.config.transcript_path {
            match transcript::load_transcript(path).await {
                Ok(lines) => view.transcript.set_lines(lines),
                Err(e) => warn!("Failed to load transcript {:?}: {}", path, e),
            }
        }

        if let Some(path) = &view.config.feedback_path {
            match feedback::load_feedback(path, view.config.video_length_ms).await {
                Ok(parsed) => {
                    info!("Feedback intervals (ms): {:?}", parsed.interval_starts());
                    for feedback_type in IconFeedbackType::ALL {
                        info!(
                            "Feedback {:?}: {:?}",
                            feedback_type,
                            parsed.series(feedback_type)
                        );
                    }
                }
                Err(e) => warn!("Failed to load feedback {:?}: {}", path, e),
            }
        }

        view.start_playback();
        Ok(view)
    }

    /// Mark the player ready, play, and start sampling its clock.
    pub fn start_playback(&self) {
        self.player.mark_ready();
        self.player.play();
        self.time_source.start(self.player.clock());
    }

    /// Seek every panel to `time_ms`.
    pub fn seek_all(&self, time_ms: u64) -> bool {
        event_bus::publish_seek_all(&self.bus, time_ms)
    }

    /// Post a question at the discussion's current time.
    pub async fn post_question(&self, content: String) -> Result<bool, DiscussionError> {
        self.discussion
            .post_new_comment(content, CommentType::Question)
            .await
    }

    pub fn teardown(&self) {
        info!(
            "Tearing down lecture '{}' ({:?})",
            self.config.lecture.name,
            self.player.status()
        );
        self.time_source.stop();
        self.player.pause();
        self.discussion.teardown();
        self.bus.clear();
    }
}
