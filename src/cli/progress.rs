use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{spotify::executor::Notifier, warning};

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}

/// Mirrors executor events on the spinner line.
pub struct SpinnerNotifier {
    pb: ProgressBar,
}

impl SpinnerNotifier {
    pub fn new(pb: ProgressBar) -> Self {
        Self { pb }
    }
}

impl Notifier for SpinnerNotifier {
    fn rate_limited(&self, wait: Duration, step: u32) {
        self.pb.set_message(format!(
            "Rate limited (step {step}), waiting {}s...",
            wait.as_secs()
        ));
    }

    fn countdown(&self, remaining: Duration) {
        self.pb
            .set_message(format!("Rate limited, retrying in {}s...", remaining.as_secs()));
    }

    fn long_retry_after(&self, wait: Duration) {
        self.pb.suspend(|| {
            warning!(
                "Spotify asks to wait {} seconds before the next request.",
                wait.as_secs()
            )
        });
    }

    fn token_refreshed(&self) {
        self.pb.set_message("Access token refreshed.");
    }

    fn page_fetched(&self, items_so_far: usize) {
        self.pb
            .set_message(format!("Fetched {items_so_far} tracks..."));
    }
}
