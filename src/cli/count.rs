//! Count command - run the counting pipeline through the cache

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use ngram_freq::cache::CacheStatus;
use ngram_freq::config::Config;
use ngram_freq::pipeline::run_count;

/// Create bar progress style
fn create_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("valid template")
        .progress_chars("█▓▒░  ")
}

pub fn run(config: &Config, refresh: bool) -> Result<()> {
    let bar = ProgressBar::new(0);
    bar.set_style(create_bar_style());
    bar.set_message(format!("Counting {}-grams...", config.counting.n));

    let report = run_count(config, refresh, &bar)
        .with_context(|| format!("Failed to count n-grams for '{}'", config.corpus.name))?;

    let status = match report.status {
        CacheStatus::Hit => style("cached").dim(),
        CacheStatus::Miss => style("computed").green(),
        CacheStatus::Refreshed => style("recomputed").yellow(),
    };
    println!(
        "{} {} ({})",
        style("✓").green(),
        style(report.archive.display()).cyan(),
        status
    );
    if let Some(examples) = report.examples_used {
        println!("  Examples used:  {}", examples);
    }
    println!(
        "  {}-grams:       {} distinct, {} total",
        config.counting.n,
        report.arrays.len(),
        report.arrays.total()
    );
    if let Some(plot) = &report.plot {
        println!("  Plot:           {}", style(plot.display()).cyan());
    }

    Ok(())
}
