//! CSV persistence for store tables.

use crate::error::Result;
use csv::WriterBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Modification time and length of a table file, used to notice rewrites by
/// another process. `None` when the file does not exist.
pub type Fingerprint = Option<(SystemTime, u64)>;

pub fn fingerprint(path: &Path) -> Fingerprint {
    let meta = fs::metadata(path).ok()?;
    Some((meta.modified().ok()?, meta.len()))
}

/// Reads every row of a table file. A missing file is an empty table.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        debug!(path = %path.display(), "Table file absent, starting empty");
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let record: T = result?;
        rows.push(record);
    }

    Ok(rows)
}

/// Replaces the table file with `rows`.
///
/// Rows go to a sibling temp file which is then renamed over the target, so
/// readers see either the old table or the new one.
pub fn replace_rows<'a, T, I>(path: &Path, rows: I) -> Result<usize>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let tmp = temp_path(path);
    let mut written = 0;
    {
        let file = File::create(&tmp)?;
        let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
        for row in rows {
            writer.serialize(row)?;
            written += 1;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;

    debug!(path = %path.display(), rows = written, "Table replaced");
    Ok(written)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
