use pffmpeg::ffmpeg_caller::FfmpegCaller;

/// Converts a file with ffmpeg while showing a progress bar, e.g.
/// `cargo run --example transcode_with_progress -- input.mkv output.mp4`.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut paths = std::env::args().skip(1);
    let (source, dest) = match (paths.next(), paths.next()) {
        (Some(source), Some(dest)) => (source, dest),
        _ => anyhow::bail!("usage: transcode_with_progress <input> <output>"),
    };
    let args = vec!["-y", "-nostats", "-loglevel", "error", "-i", source.as_str(), "-c:a", "copy", dest.as_str()];
    let code = FfmpegCaller::new("ffmpeg").run(args).await?;
    println!("ffmpeg exited with {}", code);
    Ok(())
}
