mod listing;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use seqfs_core::BrowserConfig;
use seqfs_core::log::{LogConfig, LogLevel};

/// List a directory with numbered files collapsed into sequences.
#[derive(Debug, Parser)]
#[command(name = "seqls", version)]
struct Cli {
    /// Directory or file to list, in generic or native form.
    #[arg(default_value = ".")]
    path: String,
    /// Show sequence placeholders such as `shot.####.exr`.
    #[arg(long)]
    sequences: bool,
    /// Only show files with this extension (repeatable).
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,
    /// Include dot files.
    #[arg(short, long)]
    all: bool,
    /// Show owner, group, size, modification time and frame range.
    #[arg(short, long)]
    long: bool,
    /// Print entries as JSON.
    #[arg(long)]
    json: bool,
    /// Browser config file. Defaults to the per-user config directory.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(long, default_value = "warn", value_name = "LEVEL")]
    log_level: LogLevel,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = seqfs_core::log::init(LogConfig::default().with_console_level(cli.log_level)) {
        eprintln!("failed to initialise logging: {err:#}");
    }

    let config_path = match cli.config {
        Some(path) => path,
        None => BrowserConfig::default_path()?,
    };
    let mut config = BrowserConfig::load(&config_path)?;
    if cli.sequences {
        config.include_sequences = true;
    }
    if !cli.extensions.is_empty() {
        config.extensions = cli.extensions;
        config.extensions_label = None;
    }
    if cli.all {
        config.show_hidden = true;
    }
    tracing::debug!(config = ?config, "resolved browser config");

    let path = config.root_path(&cli.path)?;
    if !path.is_valid() {
        bail!("{}: no such file or directory", path.native_string());
    }

    let paths = if path.is_directory() { path.children() } else { vec![path] };
    let entries = listing::collect(&paths, cli.long)?;

    let mut stdout = std::io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut stdout, &entries)?;
        writeln!(stdout)?;
    } else {
        listing::render(&mut stdout, &entries, cli.long)?;
    }
    Ok(())
}
