//! Plot command - render the frequency plot for an existing archive

use anyhow::{Context, Result};
use console::style;
use ngram_freq::archive::ResultArrays;
use ngram_freq::cache::plot_path_for;
use ngram_freq::plot::{archive_legend, plot_frequencies};
use std::path::Path;

pub fn run(archive: &Path, output: Option<&Path>) -> Result<()> {
    let arrays = ResultArrays::read_npz(archive)
        .with_context(|| format!("Failed to read archive {}", archive.display()))?;

    let path = output.map_or_else(|| plot_path_for(archive), Path::to_path_buf);
    plot_frequencies(&arrays.counts, &archive_legend(archive), &path)
        .with_context(|| format!("Failed to write plot {}", path.display()))?;

    println!("{} {}", style("✓").green(), style(path.display()).cyan());
    Ok(())
}
