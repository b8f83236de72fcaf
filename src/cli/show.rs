//! Show command - print the top entries of an archive

use anyhow::{Context, Result};
use console::style;
use ngram_freq::archive::ResultArrays;
use std::path::Path;

pub fn run(archive: &Path, top: usize, json: bool) -> Result<()> {
    let arrays = ResultArrays::read_npz(archive)
        .with_context(|| format!("Failed to read archive {}", archive.display()))?;

    let shown = if top == 0 {
        arrays.len()
    } else {
        top.min(arrays.len())
    };

    if json {
        let entries: Vec<serde_json::Value> = arrays
            .labels
            .iter()
            .zip(&arrays.counts)
            .take(shown)
            .map(|(label, count)| serde_json::json!({ "ngram": label, "count": count }))
            .collect();
        let out = serde_json::json!({
            "archive": archive.display().to_string(),
            "distinct": arrays.len(),
            "total": arrays.total(),
            "entries": entries,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{} {} distinct, {} total\n",
        style(archive.display()).cyan(),
        arrays.len(),
        arrays.total()
    );
    if arrays.is_empty() {
        println!("(archive is empty)");
        return Ok(());
    }

    let width = arrays.counts.first().map_or(1, |c| c.to_string().len());
    for (rank, (label, count)) in arrays.labels.iter().zip(&arrays.counts).take(shown).enumerate() {
        println!(
            "{:>5}. {:>width$}  {}",
            rank + 1,
            count,
            label,
            width = width
        );
    }
    if shown < arrays.len() {
        println!("{}", style(format!("... {} more", arrays.len() - shown)).dim());
    }

    Ok(())
}
