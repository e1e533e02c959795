//! Lecture view configuration.
//!
//! Loaded from JSON. A missing or unreadable file is not fatal: the view
//! starts with defaults and logs why. On first run the defaults are written
//! out so there is a file to edit.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR: &str = ".config/lecture-sync";
const CONFIG_FILE: &str = "config.json";

/// Lecture being viewed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LectureInfo {
    pub id: String,
    pub name: String,
    pub video_id: String,
}

impl Default for LectureInfo {
    fn default() -> Self {
        Self {
            id: "lecture".to_string(),
            name: "Untitled lecture".to_string(),
            video_id: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LectureConfig {
    pub lecture: LectureInfo,
    /// How often the video clock is sampled.
    pub sync_interval_ms: u64,
    /// JSON array of comments seeding the discussion.
    pub comments_path: Option<PathBuf>,
    /// JSON array of transcript lines.
    pub transcript_path: Option<PathBuf>,
    /// JSON array of icon feedback events.
    pub feedback_path: Option<PathBuf>,
    pub video_length_ms: u64,
    /// How long the simulated session runs before teardown.
    pub run_for_ms: u64,
    /// Optional seek issued halfway through the session.
    pub seek_to_ms: Option<u64>,
    /// Optional question posted after the seek.
    pub post_comment: Option<String>,
}

impl Default for LectureConfig {
    fn default() -> Self {
        Self {
            lecture: LectureInfo::default(),
            sync_interval_ms: 1000,
            comments_path: None,
            transcript_path: None,
            feedback_path: None,
            video_length_ms: 60 * 60 * 1000,
            run_for_ms: 10_000,
            seek_to_ms: None,
            post_comment: None,
        }
    }
}

impl LectureConfig {
    /// Load from config file, or return defaults if missing or invalid.
    pub fn load(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config at {:?}, using defaults", path);
                return Self::default();
            }
            Err(e) => {
                warn!("Failed to read config {:?}: {}. Using defaults", path, e);
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!("Invalid config {:?}: {}. Using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Like [`load`](Self::load), but writes the defaults to `path` when
    /// nothing is there yet. A failed write only logs.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::load(path);
        }

        let config = Self::default();
        match config.save(path) {
            Ok(()) => info!("Wrote default config to {:?}", path),
            Err(e) => warn!("Could not write default config {:?}: {}", path, e),
        }
        config
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let mut writer = BufWriter::new(fs::File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_millis(self.sync_interval_ms.max(1))
    }
}

/// `$HOME/.config/lecture-sync/config.json`
pub fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(CONFIG_DIR).join(CONFIG_FILE)
}
