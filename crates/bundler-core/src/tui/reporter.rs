//! cliclack rendering of a bundle run

use crate::artifacts::{ArtifactKey, FetchProgress};
use crate::config::read_package_name;
use crate::pipeline::{BundleArgs, BundleOutcome, Pipeline, Stage, FINISHED_MESSAGE};
use crate::product::ProductConfig;
use crate::report::Reporter;
use anyhow::Result;
use cliclack::ProgressBar;
use url::Url;

/// Reporter drawing a progress bar for downloads and log lines for stages
#[derive(Default)]
pub struct TuiReporter {
    bar: Option<ProgressBar>,
    total: usize,
}

impl TuiReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FetchProgress for TuiReporter {
    fn start(&mut self, total: usize) {
        let bar = cliclack::progress_bar(total as u64);
        bar.start("Downloading requirements...");
        self.bar = Some(bar);
        self.total = total;
    }

    fn advance(&mut self, _key: ArtifactKey, _url: &Url) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.stop(format!("Downloaded {} artifacts", self.total));
        }
    }

    fn fail(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.stop("Download failed");
        }
    }
}

impl Reporter for TuiReporter {
    fn stage(&mut self, stage: Stage) {
        // Downloads are rendered by the progress bar
        if stage == Stage::Fetching {
            return;
        }
        if let Some(message) = stage.message() {
            let _ = cliclack::log::step(message);
        }
    }

    fn info(&mut self, message: &str) {
        let _ = cliclack::log::info(message);
    }

    fn success(&mut self, message: &str) {
        let _ = cliclack::log::success(message);
    }
}

/// Run a bundle with interactive output
pub async fn run<C: ProductConfig>(config: &C, args: &BundleArgs) -> Result<BundleOutcome> {
    let mut pipeline = Pipeline::from_args(config, args)?;
    let label = read_package_name(&pipeline.paths().package_manifest).await?;
    cliclack::intro(format!("{} · {}", label, config.display_name()))?;
    cliclack::log::info(format!("Using artifacts from {}", pipeline.source()))?;

    let mut reporter = TuiReporter::new();
    match pipeline.run(&mut reporter).await {
        Ok(outcome) => {
            cliclack::log::success(format!(
                "{} profiles: {}",
                outcome.profile_names.len(),
                outcome.profile_names.join(", ")
            ))?;
            cliclack::log::info(format!(
                "Wrote {} ({} bytes) and {}",
                outcome.bundle.display(),
                outcome.bundle_size,
                outcome.declarations.display()
            ))?;
            cliclack::outro(FINISHED_MESSAGE)?;
            Ok(outcome)
        }
        Err(e) => {
            let stage = pipeline.failed_at().unwrap_or(Stage::Idle);
            cliclack::outro_cancel(format!("Bundling failed while {}", stage))?;
            Err(e.into())
        }
    }
}
