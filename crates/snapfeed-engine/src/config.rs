//! Engine configuration loaded from environment variables.

use std::env;

use chrono::TimeDelta;

use snapfeed_core::domain::FillerWords;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How far back the general feed reaches.
    pub feed_window: TimeDelta,
    /// Storage key prefix for uploaded images.
    pub image_prefix: String,
    /// Reject a mutating operation while another of the same kind is in flight.
    pub reentrancy_guard: bool,
    /// Words dropped from captions before indexing.
    pub filler_words: FillerWords,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            feed_window: TimeDelta::hours(24),
            image_prefix: "images".to_string(),
            reentrancy_guard: true,
            filler_words: FillerWords::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            feed_window: env::var("FEED_WINDOW_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(TimeDelta::hours)
                .unwrap_or(defaults.feed_window),
            image_prefix: env::var("IMAGE_KEY_PREFIX")
                .map(|p| p.trim_matches('/').to_string())
                .unwrap_or(defaults.image_prefix),
            reentrancy_guard: env::var("REENTRANCY_GUARD")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.reentrancy_guard),
            filler_words: env::var("FILLER_WORDS_FILE")
                .ok()
                .and_then(|path| Self::load_filler_words(&path))
                .unwrap_or(defaults.filler_words),
        }
    }

    fn load_filler_words(path: &str) -> Option<FillerWords> {
        match std::fs::read_to_string(path) {
            Ok(source) => {
                let words = FillerWords::parse(&source);
                tracing::info!(path = %path, count = words.len(), "Loaded filler words");
                Some(words)
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Cannot read filler words, using defaults");
                None
            }
        }
    }
}
