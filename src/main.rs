//! privacy-manifest
//!
//! Build an Apple privacy manifest (PrivacyInfo.xcprivacy) from checkbox
//! selections, on the command line or in an interactive terminal form.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use privacy_manifest::commands::{self, DataTypeSpec, GenerateRequest, OutputFormat};
use privacy_manifest::manifest::ReasonScoping;

#[derive(Parser)]
#[command(name = "privacy-manifest")]
#[command(author, version, about = "Build Apple privacy manifests from checkbox selections")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config.toml (first-time setup)
    Init,

    /// List API categories, usage reasons, tracking purposes and data types
    Catalog {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a manifest from selections given as flags
    Generate {
        /// API category id to declare (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Usage reason id to declare (repeatable)
        #[arg(short, long = "reason")]
        reasons: Vec<String>,

        /// Declare NSPrivacyTracking = true
        #[arg(long)]
        tracking: bool,

        /// Tracking domain (repeatable)
        #[arg(short, long = "domain")]
        domains: Vec<String>,

        /// Collected data type: NAME[:linked][:tracking][:purposes=a,b] (repeatable)
        #[arg(long = "collect")]
        data_types: Vec<DataTypeSpec>,

        /// Reason scoping: global or per-category (overrides config)
        #[arg(long)]
        scoping: Option<ReasonScoping>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail on lint warnings
        #[arg(long)]
        strict: bool,

        /// Output the manifest as JSON instead of plist XML
        #[arg(long)]
        json: bool,
    },

    /// Open the interactive form
    Form {
        /// File written by the form's write key (defaults to config output path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reason scoping: global or per-category (overrides config)
        #[arg(long)]
        scoping: Option<ReasonScoping>,
    },
}

/// Initialize tracing on stderr so stdout only carries the manifest
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "privacy_manifest=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The form owns the terminal; log lines would tear the screen
    if !matches!(cli.command, Commands::Form { .. }) {
        init_tracing();
    }

    match cli.command {
        Commands::Init => {
            commands::init()?;
        }
        Commands::Catalog { json } => {
            let format = if json {
                OutputFormat::Json
            } else {
                OutputFormat::Summary
            };
            commands::catalog(format)?;
        }
        Commands::Generate {
            categories,
            reasons,
            tracking,
            domains,
            data_types,
            scoping,
            output,
            strict,
            json,
        } => {
            commands::generate(GenerateRequest {
                categories,
                reasons,
                tracking,
                domains,
                data_types,
                scoping,
                output,
                strict,
                json,
            })?;
        }
        Commands::Form { output, scoping } => {
            commands::form(output, scoping)?;
        }
    }

    Ok(())
}
