//! Clean command - remove cached archives and plots

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Files in `cache_dir` this tool writes: `*_gram_counts_*.npz`, their plots,
/// and staging files left behind by an interrupted write
fn cached_files(cache_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let entries = std::fs::read_dir(cache_dir)
        .with_context(|| format!("Failed to read {}", cache_dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let is_ours = path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| {
                    n.contains("_gram_counts_")
                        && [".npz", ".png", ".npz.tmp"].iter().any(|ext| n.ends_with(ext))
                });
        if is_ours {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

pub fn run(cache_dir: &Path, dry_run: bool) -> Result<()> {
    if !cache_dir.exists() {
        println!("No cache directory at {}.", cache_dir.display());
        return Ok(());
    }

    let found = cached_files(cache_dir)?;
    if found.is_empty() {
        println!("No cached archives found in {}.", cache_dir.display());
        return Ok(());
    }

    println!(
        "Found {} cached file{}:",
        found.len(),
        if found.len() == 1 { "" } else { "s" }
    );
    for path in &found {
        println!("  {}", path.display());
    }

    if dry_run {
        println!("\nDry run - nothing removed. Run without --dry-run to delete.");
        return Ok(());
    }

    println!();
    let mut removed = 0;
    for path in &found {
        match std::fs::remove_file(path) {
            Ok(_) => {
                removed += 1;
                println!("Removed: {}", path.display());
            }
            Err(e) => eprintln!("Failed to remove {}: {}", path.display(), e),
        }
    }

    println!(
        "\nCleaned {} file{}.",
        removed,
        if removed == 1 { "" } else { "s" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_only_our_files() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("2_gram_counts_wiki_0.1%.npz");
        let plot = dir.path().join("2_gram_counts_wiki_0.1%.png");
        let staged = dir.path().join("3_gram_counts_wiki_0.1%.npz.tmp");
        let other = dir.path().join("notes.txt");
        for p in [&archive, &plot, &staged, &other] {
            std::fs::write(p, b"x").unwrap();
        }

        assert_eq!(
            cached_files(dir.path()).unwrap(),
            vec![archive.clone(), plot.clone(), staged.clone()]
        );

        run(dir.path(), true).unwrap();
        assert!(archive.exists());

        run(dir.path(), false).unwrap();
        assert!(!archive.exists());
        assert!(!plot.exists());
        assert!(!staged.exists());
        assert!(other.exists());
    }

    #[test]
    fn test_clean_missing_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(&dir.path().join("absent"), false).is_ok());
    }
}
