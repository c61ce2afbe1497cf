use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use htmlpost::{Document, MinifyConfig, Pipeline};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Post-process rendered HTML files: collapse whitespace and shrink markup.
#[derive(Debug, Parser)]
#[command(name = "htmlpost", version, about)]
struct Cli {
    /// HTML files to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// JSON or YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable every optional optimizer
    #[arg(long)]
    aggressive: bool,

    /// Tag to leave completely untouched (repeatable)
    #[arg(long = "exclude-tag", value_name = "TAG")]
    exclude_tags: Vec<String>,

    /// Write results here instead of rewriting files in place
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Report savings without writing anything
    #[arg(long)]
    check: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    let mut config = match &cli.config {
        Some(path) => MinifyConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MinifyConfig::default(),
    };
    config.aggressive |= cli.aggressive;
    config.exclude_tags.extend(cli.exclude_tags.iter().cloned());
    let pipeline = Pipeline::new(&config).context("invalid configuration")?;
    info!(transforms = ?pipeline.transform_names(), files = cli.files.len(), "htmlpost starting");

    let mut unreadable = 0usize;
    let mut documents = Vec::with_capacity(cli.files.len());
    let mut paths = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        match fs::read_to_string(path) {
            Ok(html) => {
                documents.push(Document::new(path.display().to_string(), html));
                paths.push(path.as_path());
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "cannot read file");
                unreadable += 1;
            }
        }
    }

    if let Some(dir) = &cli.out_dir {
        if !cli.check {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
    }

    let processed = pipeline.process_batch(documents);
    let (mut before, mut after, mut failed) = (0usize, 0usize, 0usize);
    for (path, doc) in paths.into_iter().zip(&processed) {
        before += doc.original_len;
        after += doc.optimized_len;
        if !doc.is_optimized() {
            failed += 1;
        }
        if cli.check {
            continue;
        }
        let destination = destination(path, cli.out_dir.as_deref())?;
        if cli.out_dir.is_some() || doc.is_optimized() {
            fs::write(&destination, &doc.html)
                .with_context(|| format!("writing {}", destination.display()))?;
        }
    }

    if failed > 0 {
        warn!(failed, "some documents were left unchanged");
    }
    println!(
        "{} file(s), {} failed, {} -> {} bytes ({} saved)",
        processed.len(),
        failed,
        before,
        after,
        before.saturating_sub(after)
    );

    if unreadable > 0 {
        bail!("{unreadable} file(s) could not be read");
    }
    Ok(())
}

fn destination(path: &Path, out_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    match out_dir {
        Some(dir) => {
            let Some(name) = path.file_name() else {
                bail!("{} has no file name", path.display());
            };
            Ok(dir.join(name))
        }
        None => Ok(path.to_path_buf()),
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
