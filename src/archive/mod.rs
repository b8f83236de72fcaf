//! Result arrays and their `.npz` archive
//!
//! A frozen [`CountTable`] becomes two parallel arrays, labels (`x`) and
//! counts (`y`), stored as `x.npy` / `y.npy` inside a deflated zip. The file
//! loads directly with `numpy.load`.

mod npy;

use crate::error::{FreqError, FreqResult};
use crate::ngram::CountTable;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Archive member holding the labels
pub const LABELS_KEY: &str = "x";
/// Archive member holding the counts
pub const COUNTS_KEY: &str = "y";

/// Parallel label/count arrays ready to persist
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultArrays {
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
}

impl ResultArrays {
    /// Consume a frozen table. With `sort`, entries are ordered by count
    /// descending; the sort is stable so ties keep first-seen order.
    pub fn from_table(table: CountTable, sort: bool) -> Self {
        let mut pairs: Vec<(String, u64)> = table
            .into_entries()
            .map(|(key, count)| (key.label(), count))
            .collect();
        if sort {
            pairs.sort_by(|a, b| b.1.cmp(&a.1));
        }
        let (labels, counts) = pairs.into_iter().unzip();
        Self { labels, counts }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Write the arrays to `path`, replacing whatever is there.
    ///
    /// Member timestamps and permissions are fixed, so the same arrays always
    /// produce the same bytes. The archive is built next to `path` and
    /// renamed into place, so a failed write never leaves a partial file.
    pub fn write_npz(&self, path: &Path) -> FreqResult<()> {
        let counts = self
            .counts
            .iter()
            .map(|&c| {
                i64::try_from(c)
                    .map_err(|_| FreqError::Archive(format!("count {} overflows int64", c)))
            })
            .collect::<FreqResult<Vec<i64>>>()?;

        write_atomically(path, |file| {
            let mut zip = ZipWriter::new(BufWriter::new(file));
            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .last_modified_time(DateTime::default())
                .unix_permissions(0o644);

            zip.start_file(format!("{}.npy", LABELS_KEY), options)?;
            zip.write_all(&npy::encode_unicode(&self.labels))?;
            zip.start_file(format!("{}.npy", COUNTS_KEY), options)?;
            zip.write_all(&npy::encode_i64(&counts))?;

            let mut writer = zip.finish()?;
            writer.flush()?;
            Ok(())
        })
    }

    /// Read arrays previously written by [`ResultArrays::write_npz`] (or by
    /// `numpy.savez_compressed(x=..., y=...)`).
    pub fn read_npz(path: &Path) -> FreqResult<Self> {
        let mut zip = ZipArchive::new(File::open(path)?)?;
        let labels = npy::decode_unicode(&read_member(&mut zip, LABELS_KEY)?)?;
        let counts = npy::decode_i64(&read_member(&mut zip, COUNTS_KEY)?)?
            .into_iter()
            .map(|c| {
                u64::try_from(c)
                    .map_err(|_| FreqError::Archive(format!("negative count {} in archive", c)))
            })
            .collect::<FreqResult<Vec<u64>>>()?;

        if labels.len() != counts.len() {
            return Err(FreqError::Archive(format!(
                "'{}' has {} entries but '{}' has {}",
                LABELS_KEY,
                labels.len(),
                COUNTS_KEY,
                counts.len()
            )));
        }
        Ok(Self { labels, counts })
    }
}

/// Sibling path the archive is staged at before the rename
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write to a temp file first, then rename (atomic on POSIX). On any
/// failure the temp file is removed and `path` is left untouched.
fn write_atomically<F>(path: &Path, write: F) -> FreqResult<()>
where
    F: FnOnce(&mut File) -> FreqResult<()>,
{
    let tmp = staging_path(path);
    let result = File::create(&tmp)
        .map_err(FreqError::from)
        .and_then(|mut file| write(&mut file))
        .and_then(|()| fs::rename(&tmp, path).map_err(FreqError::from));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn read_member(zip: &mut ZipArchive<File>, key: &str) -> FreqResult<Vec<u8>> {
    let mut member = zip
        .by_name(&format!("{}.npy", key))
        .map_err(|_| FreqError::Archive(format!("archive has no '{}' array", key)))?;
    // Declared size is untrusted, cap the preallocation
    let mut bytes = Vec::with_capacity(member.size().min(1 << 20) as usize);
    member.read_to_end(&mut bytes)?;
    Ok(bytes)
}
