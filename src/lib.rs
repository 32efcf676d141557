pub mod config_manage;

pub use ffmpeg_caller;
pub use log_util;
pub use sanitizer;

/// Name used for logging and the per-user config directory.
pub const APPLICATION_NAME: &str = "pffmpeg";
