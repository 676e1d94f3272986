//! Editor configuration loaded from environment variables.
//!
//! Every knob has a compiled-in default; a missing or unparsable variable
//! silently falls back to it so a bad value never prevents a board from
//! opening.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 500;
const DEFAULT_HISTORY_LIMIT: usize = 200;
const DEFAULT_EXPORT_PADDING_PX: u32 = 20;
const DEFAULT_EXPORT_MAX_PX: u32 = 16_384;
const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
const DEFAULT_VIEWPORT_HEIGHT: f64 = 720.0;

/// Tuning knobs for one editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Quiet period after the last commit before the scene is written.
    pub save_debounce_ms: u64,
    /// Maximum snapshots kept on the history stack.
    pub history_limit: usize,
    /// Margin in pixels around the scene bounds in raster exports.
    pub export_padding_px: u32,
    /// Upper bound on export width and height in pixels.
    pub export_max_px: u32,
    /// Font file used to rasterize text objects on export.
    pub export_font: Option<PathBuf>,
    /// Initial viewport width in screen pixels.
    pub viewport_width: f64,
    /// Initial viewport height in screen pixels.
    pub viewport_height: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: DEFAULT_SAVE_DEBOUNCE_MS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            export_padding_px: DEFAULT_EXPORT_PADDING_PX,
            export_max_px: DEFAULT_EXPORT_MAX_PX,
            export_font: None,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl EditorConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            save_debounce_ms: env_parse("BOARD_SAVE_DEBOUNCE_MS", DEFAULT_SAVE_DEBOUNCE_MS),
            history_limit: env_parse("BOARD_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT).max(1),
            export_padding_px: env_parse("BOARD_EXPORT_PADDING_PX", DEFAULT_EXPORT_PADDING_PX),
            export_max_px: env_parse("BOARD_EXPORT_MAX_PX", DEFAULT_EXPORT_MAX_PX).max(1),
            export_font: std::env::var_os("BOARD_EXPORT_FONT").map(PathBuf::from),
            viewport_width: env_parse("BOARD_VIEWPORT_WIDTH", DEFAULT_VIEWPORT_WIDTH),
            viewport_height: env_parse("BOARD_VIEWPORT_HEIGHT", DEFAULT_VIEWPORT_HEIGHT),
        }
    }

    #[must_use]
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
