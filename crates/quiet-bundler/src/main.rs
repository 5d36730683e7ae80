//! quiet-bundler - bundles quiet-js into a single offline module

use anyhow::Result;
use bundler_core::{BundleArgs, ProductConfig};
use clap::{CommandFactory, FromArgMatches, Parser};

/// quiet-js product configuration
#[derive(Clone)]
pub struct QuietConfig;

impl ProductConfig for QuietConfig {
    fn name(&self) -> &'static str {
        "quiet-bundler"
    }

    fn display_name(&self) -> &'static str {
        "quiet-js bundler"
    }

    fn default_source_url(&self) -> &'static str {
        "https://raw.githubusercontent.com/quiet/quiet-js/72782542a41f1b615a02c2ab43a0edb56edb6ce4/"
    }

    fn source_url_env(&self) -> &'static str {
        "QUIET_BUNDLER_SOURCE_URL"
    }

    fn fallback_prefix(&self) -> &'static str {
        "https://quiet.github.io/quiet-js/javascripts/"
    }

    fn cli_description(&self) -> &'static str {
        "Bundles quiet-js into a single offline module with generated profile typings"
    }
}

#[derive(Parser, Debug)]
#[command(name = "quiet-bundler")]
#[command(version)]
pub struct Args {
    #[command(flatten)]
    pub bundle: BundleArgs,

    /// Print plain log lines instead of the interactive output (for CI)
    #[arg(long)]
    pub plain: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let config = QuietConfig;
    let matches = Args::command()
        .about(config.cli_description())
        .get_matches();
    let args = Args::from_arg_matches(&matches)?;

    let result = if args.plain {
        bundler_core::run_plain(&config, &args.bundle).await
    } else {
        bundler_core::run(&config, &args.bundle).await
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result.map(|_| ())
}
