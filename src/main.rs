//! lecture-sync - Lecture page with video, discussion and transcript kept in
//! sync to one playback clock.
//!
//! Single-threaded: one current-thread runtime driving a `LocalSet`.

mod config;
mod event_bus;
mod functions;
mod lecture_view;
mod panels;
mod services;

use config::LectureConfig;
use lecture_view::LectureView;
use log::{info, warn};
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(config::default_config_path);
    let config = LectureConfig::load_or_init(&config_path);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();

    local.block_on(&runtime, run(config))
}

async fn run(config: LectureConfig) -> Result<(), Box<dyn Error>> {
    let run_for = Duration::from_millis(config.run_for_ms);
    let seek_to_ms = config.seek_to_ms;
    let post_comment = config.post_comment.clone();

    let view = LectureView::initialize(config).await?;
    info!("Lecture view running for {}ms", run_for.as_millis());

    if seek_to_ms.is_some() || post_comment.is_some() {
        tokio::time::sleep(run_for / 2).await;

        if let Some(time_ms) = seek_to_ms {
            view.seek_all(time_ms);
        }
        if let Some(content) = post_comment {
            if let Err(e) = view.post_question(content).await {
                warn!("Failed to post comment: {}", e);
            }
        }

        tokio::time::sleep(run_for - run_for / 2).await;
    } else {
        tokio::time::sleep(run_for).await;
    }

    view.teardown();
    info!("Lecture view closed");
    Ok(())
}
