//! Progress and status reporting for bundle runs

use crate::artifacts::{ArtifactKey, FetchProgress};
use crate::pipeline::Stage;
use colored::Colorize;
use url::Url;

/// Sink for everything a bundle run wants to tell the user
pub trait Reporter: FetchProgress {
    /// The pipeline entered `stage`
    fn stage(&mut self, stage: Stage);

    fn info(&mut self, message: &str);

    fn success(&mut self, message: &str);
}

/// Line-oriented output prefixed with the package name, for logs and CI
pub struct PlainReporter {
    label: String,
    total: usize,
    done: usize,
}

impl PlainReporter {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            total: 0,
            done: 0,
        }
    }

    fn prefix(&self) -> String {
        self.label.on_black().white().to_string()
    }

    fn percent(&self) -> usize {
        if self.total == 0 {
            100
        } else {
            (100 * self.done).div_ceil(self.total)
        }
    }
}

impl FetchProgress for PlainReporter {
    fn start(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
    }

    fn advance(&mut self, key: ArtifactKey, url: &Url) {
        self.done += 1;
        println!(
            "  {} [{}/{}] {:>3}% {} {}",
            "->".blue(),
            self.done,
            self.total,
            self.percent(),
            key,
            url.as_str().dimmed()
        );
    }

    fn finish(&mut self) {}

    fn fail(&mut self) {
        eprintln!(
            "{} {} of {} artifacts downloaded",
            "Download failed:".red(),
            self.done,
            self.total
        );
    }
}

impl Reporter for PlainReporter {
    fn stage(&mut self, stage: Stage) {
        if let Some(message) = stage.message() {
            println!("{} {}", self.prefix(), message);
        }
    }

    fn info(&mut self, message: &str) {
        println!("{} {}", self.prefix(), message);
    }

    fn success(&mut self, message: &str) {
        println!("{} {}", self.prefix(), message.bright_green());
    }
}
