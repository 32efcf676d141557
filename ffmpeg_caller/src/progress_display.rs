use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} {msg} {wide_bar:.magenta/black} {percent:>3}% {eta:>4} {elapsed_precise:.yellow}";
const PROGRESS_TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏✔";
const TICKS_PER_SECOND: f64 = 1000.0;

/// Live rendering of transcoding progress, in seconds of media.
pub trait ProgressDisplay {
    /// Stops any live display and forgets total and position.
    fn reset(&mut self);
    fn set_total(&mut self, total: f64);
    /// Updates the position; the first positive position starts the live display.
    fn set_position(&mut self, position: f64);
    fn stop(&mut self);
    /// Wall-clock time the display was live for, zero if it never started.
    fn finished_in(&self) -> Duration;
}

impl<D: ProgressDisplay + ?Sized> ProgressDisplay for Box<D> {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn set_total(&mut self, total: f64) {
        (**self).set_total(total)
    }

    fn set_position(&mut self, position: f64) {
        (**self).set_position(position)
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn finished_in(&self) -> Duration {
        (**self).finished_in()
    }
}

fn to_ticks(seconds: f64) -> u64 {
    (seconds.max(0.0) * TICKS_PER_SECOND).round() as u64
}

/// Terminal progress bar drawn on stderr.
pub struct IndicatifDisplay {
    bar: ProgressBar,
    live: bool,
    finished_in: Option<Duration>,
}

impl Default for IndicatifDisplay {
    fn default() -> Self {
        IndicatifDisplay {
            bar: Self::hidden_bar(),
            live: false,
            finished_in: None,
        }
    }
}

impl IndicatifDisplay {
    pub fn new() -> IndicatifDisplay {
        IndicatifDisplay::default()
    }

    fn hidden_bar() -> ProgressBar {
        let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_chars(PROGRESS_TICKS);
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        bar.set_style(style);
        bar.set_message("Progress");
        bar
    }
}

impl ProgressDisplay for IndicatifDisplay {
    fn reset(&mut self) {
        self.stop();
        self.bar = Self::hidden_bar();
        self.finished_in = None;
    }

    fn set_total(&mut self, total: f64) {
        self.bar.set_length(to_ticks(total));
    }

    fn set_position(&mut self, position: f64) {
        self.bar.set_position(to_ticks(position));
        if position > 0.0 && !self.live {
            self.bar.reset_elapsed();
            self.bar.set_draw_target(ProgressDrawTarget::stderr());
            self.bar.enable_steady_tick(Duration::from_millis(100));
            self.live = true;
        }
    }

    fn stop(&mut self) {
        if self.live {
            self.finished_in = Some(self.bar.elapsed());
            self.bar.finish();
            self.live = false;
        }
    }

    fn finished_in(&self) -> Duration {
        self.finished_in.unwrap_or_default()
    }
}

/// Draws nothing but keeps the same bookkeeping, for non-interactive use.
#[derive(Debug, Default)]
pub struct SilentDisplay {
    total: Option<f64>,
    position: Option<f64>,
    started_at: Option<Instant>,
    finished_in: Option<Duration>,
}

impl SilentDisplay {
    pub fn new() -> SilentDisplay {
        SilentDisplay::default()
    }

    pub fn total(&self) -> Option<f64> {
        self.total
    }

    pub fn position(&self) -> Option<f64> {
        self.position
    }

    pub fn is_live(&self) -> bool {
        self.started_at.is_some()
    }
}

impl ProgressDisplay for SilentDisplay {
    fn reset(&mut self) {
        *self = SilentDisplay::default();
    }

    fn set_total(&mut self, total: f64) {
        self.total = Some(total);
    }

    fn set_position(&mut self, position: f64) {
        self.position = Some(position);
        if position > 0.0 && self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    fn stop(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            self.finished_in = Some(started_at.elapsed());
        }
    }

    fn finished_in(&self) -> Duration {
        self.finished_in.unwrap_or_default()
    }
}
