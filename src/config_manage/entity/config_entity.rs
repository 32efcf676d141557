use derive_builder::Builder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into), default)]
pub struct WrapperConfig {
    /// Program spawned for every run, looked up on `PATH` when not a path.
    #[serde(default = "default_ffmpeg_binary")]
    pub ffmpeg_binary: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Draw the terminal progress bar; when off only the completion summary is printed.
    #[serde(default = "default_progress_bar")]
    pub progress_bar: bool,
}

fn default_ffmpeg_binary() -> String {
    "ffmpeg".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_progress_bar() -> bool {
    true
}

impl Default for WrapperConfig {
    fn default() -> Self {
        WrapperConfig {
            ffmpeg_binary: default_ffmpeg_binary(),
            log_level: default_log_level(),
            progress_bar: default_progress_bar(),
        }
    }
}
