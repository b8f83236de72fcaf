//! CLI command definitions and handlers

mod clean;
mod count;
mod init;
mod plot;
mod show;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ngram_freq::config::{load_config, load_config_file, Config};
use std::path::{Path, PathBuf};

/// Parse and validate an n-gram size (1-16)
fn parse_n(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("n must be at least 1".to_string())
    } else if n > 16 {
        Err("n cannot exceed 16".to_string())
    } else {
        Ok(n)
    }
}

/// Parse and validate a limit proportion (0.0-1.0)
fn parse_limit_prop(s: &str) -> Result<f64, String> {
    let p: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(0.0..=1.0).contains(&p) {
        Err("limit proportion must be between 0 and 1".to_string())
    } else {
        Ok(p)
    }
}

/// ngram-freq - n-gram frequency counts for word-frequency experiments
#[derive(Parser, Debug)]
#[command(name = "ngram-freq")]
#[command(
    version,
    about = "Count n-gram frequencies over a bounded share of a corpus and cache them as NumPy archives",
    after_help = "\
Examples:
  ngram-freq init                               Write an example ngram-freq.toml
  ngram-freq count                              Count using ngram-freq.toml
  ngram-freq count --n 3 --limit-prop 0.01      Trigrams over 1% of the corpus
  ngram-freq count --refresh                    Recompute and overwrite the cached archive
  ngram-freq show <ARCHIVE> --top 50            Most frequent n-grams in an archive
  ngram-freq plot <ARCHIVE>                     Render the log-log frequency plot"
)]
pub struct Cli {
    /// Config file (default: ./ngram-freq.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for archives and plots (overrides config)
    #[arg(long, global = true, env = "NGRAM_FREQ_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example ngram-freq.toml in the current directory
    Init,

    /// Count n-grams for the configured corpus (cached)
    Count {
        /// N-gram size (1-16)
        #[arg(long, value_parser = parse_n)]
        n: Option<usize>,

        /// Share of the corpus to count (0.0-1.0)
        #[arg(long, value_parser = parse_limit_prop)]
        limit_prop: Option<f64>,

        /// Record field holding the token array (jsonl corpora)
        #[arg(long)]
        tokens_key: Option<String>,

        /// Lowercase tokens before counting
        #[arg(long)]
        lowercase: bool,

        /// Ignore an existing archive and overwrite it
        #[arg(long)]
        refresh: bool,

        /// Skip the frequency plot
        #[arg(long)]
        no_plot: bool,
    },

    /// Show the most frequent entries of an archive
    Show {
        /// Archive (.npz) to read
        archive: PathBuf,

        /// Number of entries to show (0 = all)
        #[arg(long, default_value = "20")]
        top: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the log-log frequency plot for an archive
    Plot {
        /// Archive (.npz) to read
        archive: PathBuf,

        /// Output image (default: archive path with .png)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Remove cached archives and plots
    Clean {
        /// Only list what would be removed
        #[arg(long)]
        dry_run: bool,
    },
}

/// Resolve the effective config: explicit file, else ./ngram-freq.toml, else
/// defaults; `--cache-dir` applied on top.
fn resolve_config(config_path: Option<&Path>, cache_dir: Option<PathBuf>) -> Result<Config> {
    let mut config = match config_path {
        Some(path) => load_config_file(path)?,
        None => load_config(Path::new(".")),
    };
    if cache_dir.is_some() {
        config.output.cache_dir = cache_dir;
    }
    Ok(config)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => init::run(Path::new(".")),

        Commands::Count {
            n,
            limit_prop,
            tokens_key,
            lowercase,
            refresh,
            no_plot,
        } => {
            let mut config = resolve_config(cli.config.as_deref(), cli.cache_dir)?;
            if let Some(n) = n {
                config.counting.n = n;
            }
            if let Some(p) = limit_prop {
                config.counting.limit_prop = p;
            }
            if let Some(key) = tokens_key {
                config.corpus.tokens_key = key;
            }
            if lowercase {
                config.counting.lowercase = true;
            }
            if no_plot {
                config.output.plot = false;
            }
            count::run(&config, refresh)
        }

        Commands::Show { archive, top, json } => show::run(&archive, top, json),

        Commands::Plot { archive, output } => plot::run(&archive, output.as_deref()),

        Commands::Clean { dry_run } => {
            let config = resolve_config(cli.config.as_deref(), cli.cache_dir)?;
            clean::run(&config.cache_dir(), dry_run)
        }
    }
}
