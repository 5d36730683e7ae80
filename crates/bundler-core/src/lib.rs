//! Bundler Core - build-time bundling of emscripten artifacts into one offline module
//!
//! This library fetches a compiled module's loader, its memory image, a profile
//! catalog and the glue code around them, patches the two functions that would
//! otherwise fetch at runtime, and writes a self-contained module plus a type
//! declaration file listing the profile names.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Pure functions for body replacement, literal
//!   encoding, catalog parsing, assembly and declaration rendering
//! - **Layer 2: Workflow Orchestration** - `ProductConfig` trait, concurrent
//!   `ArtifactFetcher` and the staged `Pipeline`
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based output (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based interactive front end
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use bundler_core::{BundleArgs, Pipeline, PlainReporter, ProductConfig};
//!
//! let mut pipeline = Pipeline::from_args(&MyConfig, &BundleArgs::default())?;
//! let outcome = pipeline.run(&mut PlainReporter::new("my-package")).await?;
//! println!("{} profiles", outcome.profile_names.len());
//! ```

pub mod artifacts;
pub mod assembler;
pub mod config;
pub mod declarations;
pub mod encoding;
pub mod error;
pub mod patch;
pub mod pipeline;
pub mod product;
pub mod profiles;
pub mod report;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use artifacts::{
    Artifact, ArtifactFetcher, ArtifactKey, ArtifactSource, FetchProgress, Requirements,
    ResolvedArtifacts,
};
pub use assembler::{assemble, Bundle};
pub use config::BundlePaths;
pub use declarations::render_declarations;
pub use encoding::binary_literal;
pub use error::{BundleError, Result};
pub use patch::{function_body_span, replace_function_body};
pub use pipeline::{run_plain, BundleArgs, BundleOutcome, Pipeline, Stage};
pub use product::ProductConfig;
pub use profiles::profile_names;
pub use report::{PlainReporter, Reporter};

#[cfg(feature = "tui")]
pub use tui::run;
