use ffmpeg_caller::progress_display::{IndicatifDisplay, ProgressDisplay, SilentDisplay};
use ffmpeg_caller::FfmpegCaller;
use pffmpeg::config_manage::config_manager::ConfigManager;
use pffmpeg::APPLICATION_NAME;

// Arguments belong to ffmpeg, `-h` included, so they are forwarded without parsing.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = ConfigManager::read_config()?;
    log_util::init_logger(APPLICATION_NAME, &config.log_level)
        .map_err(|e| anyhow::anyhow!(e))?;
    tracing::debug!(?config, "loaded config");

    let display: Box<dyn ProgressDisplay> = if config.progress_bar {
        Box::new(IndicatifDisplay::new())
    } else {
        Box::new(SilentDisplay::new())
    };
    let mut caller = FfmpegCaller::with_parts(config.ffmpeg_binary, display, std::io::stderr());
    let code = caller.run(std::env::args().skip(1)).await?;
    std::process::exit(code);
}
