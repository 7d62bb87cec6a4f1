//! metaclean CLI: inspect and strip file metadata through a cleaner service.
//!
//! Set CLEANER_URL and CLEANER_API_KEY (or mount it under /etc/secrets).

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use metaclean_api_client::{ApiClient, CleanWorkflow};
use metaclean_cli::{
    format_size, init_tracing, render_report, size_change_percent, CleanView, ReportView,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "metaclean", about = "Inspect and strip file metadata")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the cleaner is up
    Health {
        /// Also check that the metadata tool is installed
        #[arg(long)]
        deep: bool,
    },
    /// Show the metadata embedded in a file
    Inspect {
        /// Path to a png, jpg, jpeg or gif file
        file: PathBuf,
    },
    /// Write a copy of a file with all metadata removed
    Clean {
        /// Path to a png, jpg, jpeg or gif file
        file: PathBuf,
        /// Directory the cleaned copy is written to
        #[arg(long, default_value = "cleaned")]
        out_dir: PathBuf,
        /// Delete the input file once the cleaned copy is written
        #[arg(long)]
        delete_original: bool,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Copy `file` into `dir` so the workflow can consume the copy instead of the input.
async fn stage(file: &Path, dir: &Path) -> anyhow::Result<PathBuf> {
    let name = file
        .file_name()
        .with_context(|| format!("Not a file: {}", file.display()))?;
    let staged = dir.join(name);
    tokio::fs::copy(file, &staged)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    Ok(staged)
}

async fn clean(
    workflow: &CleanWorkflow,
    file: &Path,
    out_dir: &Path,
    delete_original: bool,
    json: bool,
) -> anyhow::Result<()> {
    // The workflow deletes what it cleans; keep the input unless asked otherwise.
    let staging = tempfile::Builder::new()
        .prefix("metaclean-upload-")
        .tempdir()
        .context("Failed to create staging directory")?;
    let upload = if delete_original {
        file.to_path_buf()
    } else {
        stage(file, staging.path()).await?
    };

    let outcome = workflow.clean(&upload, out_dir).await?;

    if json {
        return print_json(&CleanView {
            filename: &outcome.filename,
            cleaned_path: outcome.cleaned_path.display().to_string(),
            before: &outcome.before_highlighted,
            removed: outcome.before_highlighted.removed_count(),
            after: outcome.after.as_wire_text(),
            size_before: format_size(outcome.size_before),
            size_after: format_size(outcome.size_after),
        });
    }

    println!("Before ({} removed):", outcome.before_highlighted.removed_count());
    println!("{}", outcome.before_highlighted);
    println!();
    println!("After:");
    println!("{}", render_report(&outcome.after));
    println!();
    println!(
        "{} -> {} ({:.1}% smaller)",
        format_size(outcome.size_before),
        format_size(outcome.size_after),
        size_change_percent(outcome.size_before, outcome.size_after)
    );
    println!("Cleaned file: {}", outcome.cleaned_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client = ApiClient::from_env()
        .context("Failed to create cleaner client. Check CLEANER_URL and CLEANER_TIMEOUT_SECS")?;
    let workflow = CleanWorkflow::new(client);

    match cli.command {
        Commands::Health { deep } => {
            if deep {
                let response = workflow.client().deep_health().await?;
                print_json(&response)?;
            } else {
                let response = workflow.client().health().await?;
                print_json(&response)?;
            }
        }
        Commands::Inspect { file } => {
            let outcome = workflow.upload(&file).await?;
            if cli.json {
                print_json(&ReportView {
                    filename: &outcome.filename,
                    metadata: outcome.before.as_wire_text(),
                    size: format_size(outcome.size_before),
                })?;
            } else {
                println!("{} ({})", outcome.filename, format_size(outcome.size_before));
                println!("{}", render_report(&outcome.before));
            }
        }
        Commands::Clean {
            file,
            out_dir,
            delete_original,
        } => {
            clean(&workflow, &file, &out_dir, delete_original, cli.json).await?;
        }
    }

    Ok(())
}
