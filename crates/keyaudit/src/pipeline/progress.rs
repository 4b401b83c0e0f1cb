use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::info;

const LOG_EVERY: usize = 100;

/// Terminal progress for one run, plus a log line every hundred files so
/// runs without a terminal still show movement.
pub(crate) struct RunProgress {
    bar: ProgressBar,
    total: usize,
    done: usize,
}

impl RunProgress {
    pub(crate) fn new(total: usize, label: &str, visible: bool) -> Self {
        let bar = if visible {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.cyan} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files ({eta}) {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(label.to_string());

        Self {
            bar,
            total,
            done: 0,
        }
    }

    pub(crate) fn advance(&mut self) {
        self.done += 1;
        self.bar.inc(1);
        if self.done % LOG_EVERY == 0 || self.done == self.total {
            info!("Progress: {}/{} files", self.done, self.total);
        }
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.bar.position()
    }

    pub(crate) fn finish(&self, cancelled: bool) {
        if cancelled {
            self.bar.abandon_with_message("cancelled");
        } else {
            self.bar.finish_with_message("done");
        }
    }
}
