use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// How often long passes push their counters to the spinner.
pub(crate) const PROGRESS_INTERVAL: u64 = 10_000;

pub(crate) struct ProgressBarBuilder {
    style_template: &'static str,
    message: String,
    enable_tick: bool,
}

impl ProgressBarBuilder {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            style_template: "{spinner:.green} {msg}",
            message: message.into(),
            enable_tick: false,
        }
    }

    pub(crate) fn with_template(mut self, template: &'static str) -> Self {
        self.style_template = template;
        self
    }

    pub(crate) fn with_tick(mut self) -> Self {
        self.enable_tick = true;
        self
    }

    pub(crate) fn build(self) -> Result<ProgressBar> {
        let pb = ProgressBar::new_spinner();

        pb.set_style(ProgressStyle::default_spinner().template(self.style_template)?);
        pb.set_message(self.message);

        if self.enable_tick {
            pb.enable_steady_tick(Duration::from_millis(200));
        }

        Ok(pb)
    }
}

/// Spinner used by the record-level passes: elapsed time, counter and rate.
pub(crate) fn record_spinner(message: impl Into<String>) -> Result<ProgressBar> {
    ProgressBarBuilder::new(message)
        .with_template("{spinner:.green} [{elapsed_precise}] {msg} {pos} ({per_sec})")
        .with_tick()
        .build()
}
