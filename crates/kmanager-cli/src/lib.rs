//! Shared helpers for the `kmanager` binary: output formatting, file input and
//! progress reporting.

pub mod render;

use std::path::{Component, Path};

use anyhow::{Context, Result};
use kmanager_api_client::SubmissionState;
use kmanager_core::models::DocumentUpload;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Split a comma-separated tag list.
pub fn parse_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Reject paths that climb out of the working tree.
pub fn check_path(path: &Path) -> Result<()> {
    if path.components().any(|c| c == Component::ParentDir) {
        return Err(anyhow::anyhow!("Invalid input: {}", path.display()));
    }
    Ok(())
}

/// Read a local file into an upload. The title defaults to the file stem.
pub fn read_upload_file(
    path: &Path,
    title: Option<String>,
    tags: Vec<String>,
) -> Result<DocumentUpload> {
    check_path(path)?;

    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("File path has no file name")?
        .to_string();

    let title = title.unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&file_name)
            .to_string()
    });

    Ok(DocumentUpload::new(file_name, bytes, title, tags))
}

/// Stream controller progress lines to stderr until the submission settles.
///
/// A controller that never starts leaves the task waiting; abort the handle
/// once the command is done.
pub fn watch_progress(mut rx: watch::Receiver<SubmissionState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last = None;
        loop {
            let (progress, status) = {
                let state = rx.borrow_and_update();
                (state.progress.clone(), state.status)
            };
            if progress.is_some() && progress != last {
                if let Some(line) = &progress {
                    eprintln!("{}", line);
                }
                last = progress;
            }
            if status.is_terminal() {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
}

/// Initialize tracing for the CLI.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
