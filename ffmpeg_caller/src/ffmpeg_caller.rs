use std::future::Future;
use std::io::{self, Write};
use std::process::Stdio;

use sanitizer::sanitize_args;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::CallerError;
use crate::ffmpeg_progress::FFMPEG_CONFIRM_TEXT;
use crate::ffmpeg_state::{Action, OutputState, ParserContext};
use crate::line_buffer::LineBuffer;
use crate::progress_display::{IndicatifDisplay, ProgressDisplay};

/// Exit code returned when the user interrupts the run with Ctrl+C.
pub const KEYBOARD_INTERRUPT_RETURN_CODE: i32 = 128 + libc::SIGINT;
/// Exit code returned when ffmpeg ended without one, e.g. killed by a signal.
pub const UNKNOWN_EXIT_CODE: i32 = -1;

/// Runs ffmpeg and replaces its status lines with a progress bar.
///
/// Everything else ffmpeg writes to stderr, including overwrite questions, is forwarded to
/// `output` unchanged. One caller handles one invocation at a time.
pub struct FfmpegCaller<D = IndicatifDisplay, W = io::Stderr> {
    binary: String,
    context: ParserContext,
    buffer: LineBuffer,
    display: D,
    output: W,
}

impl FfmpegCaller {
    pub fn new(binary: impl Into<String>) -> FfmpegCaller {
        FfmpegCaller::with_parts(binary, IndicatifDisplay::new(), io::stderr())
    }
}

impl<D: ProgressDisplay, W: Write> FfmpegCaller<D, W> {
    pub fn with_parts(binary: impl Into<String>, display: D, output: W) -> FfmpegCaller<D, W> {
        FfmpegCaller {
            binary: binary.into(),
            context: ParserContext::new(),
            buffer: LineBuffer::new(),
            display,
            output,
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn context(&self) -> &ParserContext {
        &self.context
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs ffmpeg with `args` until it exits or Ctrl+C is pressed, and returns the exit code.
    pub async fn run<I, S>(&mut self, args: I) -> Result<i32, CallerError>
        where
            I: IntoIterator<Item=S>,
            S: AsRef<str>, {
        self.run_until(args, interrupt_signal()).await
    }

    /// Same as [`FfmpegCaller::run`], with `interrupt` standing in for Ctrl+C.
    ///
    /// An interrupted child is killed when it is dropped; nothing waits for it.
    pub async fn run_until<I, S, C>(&mut self, args: I, interrupt: C) -> Result<i32, CallerError>
        where
            I: IntoIterator<Item=S>,
            S: AsRef<str>,
            C: Future<Output=()>, {
        let sanitized = sanitize_args(args);
        for notice in &sanitized.notices {
            self.print_line(notice)?;
        }
        let mut command = Command::new(&self.binary);
        command
            .args(&sanitized.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        debug!(binary = %self.binary, args = ?sanitized.args, "spawning command");
        let mut child = command.spawn().map_err(|source| CallerError::Spawn {
            binary: self.binary.clone(),
            source,
        })?;
        let stderr = child.stderr.take().ok_or(CallerError::MissingStderr)?;
        let exit = async move { child.wait().await.map(|status| status.code()) };
        self.supervise(stderr, exit, interrupt).await
    }

    /// Feeds `stderr` through the output state machine, then resolves `exit` into the exit code.
    pub async fn supervise<R, E, C>(&mut self, stderr: R, exit: E, interrupt: C) -> Result<i32, CallerError>
        where
            R: AsyncRead + Unpin,
            E: Future<Output=io::Result<Option<i32>>>,
            C: Future<Output=()>, {
        self.reset();
        let finished = tokio::select! {
            result = self.process_output(stderr, exit) => Some(result),
            _ = interrupt => None,
        };
        match finished {
            Some(result) => result,
            None => self.abort(),
        }
    }

    fn reset(&mut self) {
        self.context.reset();
        self.buffer.clear();
        self.display.reset();
    }

    async fn process_output<R, E>(&mut self, stderr: R, exit: E) -> Result<i32, CallerError>
        where
            R: AsyncRead + Unpin,
            E: Future<Output=io::Result<Option<i32>>>, {
        let mut reader = BufReader::new(stderr);
        let mut after_cr = false;
        loop {
            // questions like "Overwrite? [y/N] " never get a newline
            if self.buffer.peek().ends_with(FFMPEG_CONFIRM_TEXT) {
                let prompt = self.buffer.pop();
                self.print_prompt(&prompt)?;
            }
            let c = match read_char(&mut reader).await? {
                Some(c) => c,
                None => break,
            };
            match c {
                '\n' if after_cr => {}
                '\n' | '\r' => {
                    let line = self.buffer.pop();
                    self.dispatch(&line)?;
                }
                _ => self.buffer.write_char(c),
            }
            after_cr = c == '\r';
        }
        if !self.buffer.is_empty() {
            let line = self.buffer.pop();
            self.dispatch(&line)?;
        }
        if self.context.state() == OutputState::DisplayProgress {
            // stream closed mid-transcode, e.g. ffmpeg was killed
            self.display.stop();
        }
        let code = exit.await?;
        debug!(?code, "command exited");
        Ok(code.unwrap_or(UNKNOWN_EXIT_CODE))
    }

    fn dispatch(&mut self, line: &str) -> Result<(), CallerError> {
        trace!(line, state = ?self.context.state(), "handling line");
        for action in self.context.handle_line(line)? {
            match action {
                Action::Print(line) => self.print_line(&line)?,
                Action::SetTotal(total) => self.display.set_total(total),
                Action::SetProgress(progress) => self.display.set_position(progress),
                Action::Complete { total } => self.complete_progress(total)?,
            }
        }
        Ok(())
    }

    fn complete_progress(&mut self, total: Option<f64>) -> io::Result<()> {
        if let Some(total) = total {
            self.display.set_position(total);
        }
        self.display.stop();
        let finished_in = self.display.finished_in().as_secs_f64();
        self.print_line(&format!("Finished in {:.3} seconds", finished_in))
    }

    fn abort(&mut self) -> Result<i32, CallerError> {
        self.display.stop();
        self.print_line("Abort.")?;
        Ok(KEYBOARD_INTERRUPT_RETURN_CODE)
    }

    fn print_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{}", line)
    }

    fn print_prompt(&mut self, prompt: &str) -> io::Result<()> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()
    }
}

async fn interrupt_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // without a handler there is nothing to wait for
        std::future::pending::<()>().await;
    }
}

fn utf8_width(first: u8) -> usize {
    match first {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

async fn next_byte<R, F>(reader: &mut R, accept: F) -> io::Result<Option<u8>>
    where
        R: AsyncBufRead + Unpin,
        F: Fn(u8) -> bool, {
    let byte = match reader.fill_buf().await?.first() {
        Some(&byte) if accept(byte) => byte,
        _ => return Ok(None),
    };
    reader.consume(1);
    Ok(Some(byte))
}

/// Reads one UTF-8 character, `None` once the stream is closed.
async fn read_char<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<Option<char>> {
    let first = match next_byte(reader, |_| true).await? {
        Some(byte) => byte,
        None => return Ok(None),
    };
    let width = utf8_width(first);
    let mut bytes = [first, 0, 0, 0];
    let mut len = 1;
    while len < width {
        match next_byte(reader, |byte| byte & 0xC0 == 0x80).await? {
            Some(byte) => {
                bytes[len] = byte;
                len += 1;
            }
            None => break,
        }
    }
    let c = std::str::from_utf8(&bytes[..len])
        .ok()
        .and_then(|s| s.chars().next())
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    Ok(Some(c))
}
