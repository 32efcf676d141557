pub mod error;
pub mod ffmpeg_caller;
pub mod ffmpeg_progress;
pub mod ffmpeg_state;
pub mod line_buffer;
pub mod progress_display;

pub use error::CallerError;
pub use ffmpeg_caller::FfmpegCaller;
