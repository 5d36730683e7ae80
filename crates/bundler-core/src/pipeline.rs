//! Bundle pipeline orchestration
//!
//! A run moves strictly forward through `Idle → Fetching → Bundling → DeclGen →
//! Writing → Done`; any error lands in `Failed` and is returned to the caller.
//! Both outputs are produced in memory before anything is written, and the
//! bundle is written last.

use crate::artifacts::{ArtifactFetcher, ArtifactKey, ArtifactSource, Requirements};
use crate::assembler::assemble;
use crate::config::{read_package_name, BundlePaths};
use crate::declarations::render_declarations;
use crate::error::{BundleError, Result};
use crate::product::ProductConfig;
use crate::profiles::profile_names;
use crate::report::{PlainReporter, Reporter};
use clap::Args;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Message printed once a run completes
pub const FINISHED_MESSAGE: &str = "Finished ! Module ready to use !";

/// Pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Fetching,
    Bundling,
    DeclGen,
    Writing,
    Done,
    Failed,
}

impl Stage {
    /// The stage a successful step leads to
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Idle => Some(Stage::Fetching),
            Stage::Fetching => Some(Stage::Bundling),
            Stage::Bundling => Some(Stage::DeclGen),
            Stage::DeclGen => Some(Stage::Writing),
            Stage::Writing => Some(Stage::Done),
            Stage::Done | Stage::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    /// Progress line announcing the stage, if it has one
    pub fn message(self) -> Option<&'static str> {
        match self {
            Stage::Fetching => Some("Downloading requirements..."),
            Stage::Bundling => Some("Bundling..."),
            Stage::DeclGen => Some("Generating declarations..."),
            Stage::Writing => Some("Writing outputs..."),
            Stage::Idle | Stage::Done | Stage::Failed => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Fetching => "fetching",
            Stage::Bundling => "bundling",
            Stage::DeclGen => "generating declarations",
            Stage::Writing => "writing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Command-line options of a bundle run
#[derive(Args, Debug, Clone)]
pub struct BundleArgs {
    /// Directory holding package.json and the declaration template; outputs go here too
    #[arg(long = "project-dir", default_value = ".")]
    pub project_dir: PathBuf,

    /// Base URL to fetch the artifacts from (overrides the environment and default)
    #[arg(long = "source-url", conflicts_with = "source_dir")]
    pub source_url: Option<String>,

    /// Local directory to read the artifacts from instead of fetching them (for offline builds)
    #[arg(long = "source-dir")]
    pub source_dir: Option<PathBuf>,

    /// Declaration template path (defaults to <project-dir>/template.index.d.ts)
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Generated declaration path (defaults to <project-dir>/index.d.ts)
    #[arg(long = "declarations-out")]
    pub declarations_out: Option<PathBuf>,

    /// Generated bundle path (defaults to <project-dir>/_bundle.js)
    #[arg(long = "bundle-out")]
    pub bundle_out: Option<PathBuf>,
}

impl Default for BundleArgs {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            source_url: None,
            source_dir: None,
            template: None,
            declarations_out: None,
            bundle_out: None,
        }
    }
}

impl BundleArgs {
    /// Artifact source: `--source-dir`, then `--source-url`, then the product's env/default
    pub fn source<C: ProductConfig>(&self, config: &C) -> Result<ArtifactSource> {
        match (&self.source_dir, &self.source_url) {
            (Some(dir), _) => Ok(ArtifactSource::local(dir.clone())),
            (None, Some(url)) => ArtifactSource::remote(url),
            (None, None) => ArtifactSource::from_config(config),
        }
    }

    /// Input/output paths with overrides applied
    pub fn paths(&self) -> BundlePaths {
        let mut paths = BundlePaths::in_dir(&self.project_dir);
        if let Some(template) = &self.template {
            paths.declaration_template = template.clone();
        }
        if let Some(out) = &self.declarations_out {
            paths.declarations = out.clone();
        }
        if let Some(out) = &self.bundle_out {
            paths.bundle = out.clone();
        }
        paths
    }
}

/// What a successful run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOutcome {
    pub profile_names: Vec<String>,
    pub declarations: PathBuf,
    pub bundle: PathBuf,
    pub bundle_size: usize,
}

/// One bundle run: fetch, assemble, generate declarations, write
pub struct Pipeline {
    fetcher: ArtifactFetcher,
    source: ArtifactSource,
    requirements: Requirements,
    paths: BundlePaths,
    fallback_prefix: &'static str,
    stage: Stage,
    failed_at: Option<Stage>,
}

impl Pipeline {
    pub fn new<C: ProductConfig>(
        config: &C,
        source: ArtifactSource,
        paths: BundlePaths,
    ) -> Result<Self> {
        let requirements = Requirements::from_source(&source)?;
        Ok(Self {
            fetcher: ArtifactFetcher::new(config.user_agent()),
            source,
            requirements,
            paths,
            fallback_prefix: config.fallback_prefix(),
            stage: Stage::Idle,
            failed_at: None,
        })
    }

    pub fn from_args<C: ProductConfig>(config: &C, args: &BundleArgs) -> Result<Self> {
        Self::new(config, args.source(config)?, args.paths())
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Stage that was running when the pipeline failed
    pub fn failed_at(&self) -> Option<Stage> {
        self.failed_at
    }

    pub fn source(&self) -> &ArtifactSource {
        &self.source
    }

    pub fn paths(&self) -> &BundlePaths {
        &self.paths
    }

    /// Run every stage to completion. A pipeline runs at most once.
    pub async fn run<R>(&mut self, reporter: &mut R) -> Result<BundleOutcome>
    where
        R: Reporter + ?Sized,
    {
        if self.stage != Stage::Idle {
            return Err(BundleError::Config(format!(
                "pipeline already ran (stage: {})",
                self.stage
            )));
        }

        match self.execute(reporter).await {
            Ok(outcome) => {
                self.enter(Stage::Done, reporter);
                Ok(outcome)
            }
            Err(e) => {
                self.failed_at = Some(self.stage);
                self.stage = Stage::Failed;
                reporter.stage(Stage::Failed);
                Err(e)
            }
        }
    }

    async fn execute<R>(&mut self, reporter: &mut R) -> Result<BundleOutcome>
    where
        R: Reporter + ?Sized,
    {
        self.enter(Stage::Fetching, reporter);
        let artifacts = self.fetcher.fetch_all(&self.requirements, reporter).await?;

        self.enter(Stage::Bundling, reporter);
        let bundle = assemble(&artifacts, self.fallback_prefix)?.render();

        self.enter(Stage::DeclGen, reporter);
        let names = profile_names(artifacts.text(ArtifactKey::Profiles)?)?;
        reporter.info(&format!(
            "{} profile names found in '{}', creating '{}'",
            names.len(),
            ArtifactKey::Profiles.file_name(),
            self.paths.declarations.display()
        ));
        let template = read_text(&self.paths.declaration_template).await?;
        let declarations = render_declarations(&template, &names)?;

        self.enter(Stage::Writing, reporter);
        write_text(&self.paths.declarations, &declarations).await?;
        write_text(&self.paths.bundle, &bundle).await?;

        Ok(BundleOutcome {
            profile_names: names,
            declarations: self.paths.declarations.clone(),
            bundle: self.paths.bundle.clone(),
            bundle_size: bundle.len(),
        })
    }

    fn enter<R>(&mut self, next: Stage, reporter: &mut R)
    where
        R: Reporter + ?Sized,
    {
        debug_assert_eq!(self.stage.next(), Some(next), "stage skipped");
        self.stage = next;
        reporter.stage(next);
    }
}

async fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .map_err(|source| BundleError::Read {
            path: path.to_path_buf(),
            source,
        })
}

async fn write_text(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)
        .await
        .map_err(|source| BundleError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Run a bundle with line-oriented output (no interactive terminal needed)
pub async fn run_plain<C: ProductConfig>(
    config: &C,
    args: &BundleArgs,
) -> anyhow::Result<BundleOutcome> {
    let mut pipeline = Pipeline::from_args(config, args)?;
    let label = read_package_name(&pipeline.paths().package_manifest).await?;
    let mut reporter = PlainReporter::new(label);
    reporter.info(&format!("Using artifacts from {}", pipeline.source()));

    let outcome = pipeline.run(&mut reporter).await?;
    reporter.info(&format!(
        "Wrote {} ({} bytes) and {}",
        outcome.bundle.display(),
        outcome.bundle_size,
        outcome.declarations.display()
    ));
    reporter.success(FINISHED_MESSAGE);
    Ok(outcome)
}
