//! Init command - write an example config

use anyhow::{Context, Result};
use console::style;
use ngram_freq::config::{CONFIG_FILE_NAME, EXAMPLE_CONFIG};
use std::path::Path;

/// Run the init command
pub fn run(dir: &Path) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        println!(
            "{} Already exists: {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to create {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    println!("\nEdit [corpus] paths, then run: ngram-freq count");
    Ok(())
}
