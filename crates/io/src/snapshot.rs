//! Dated snapshot files: `<prefix>_<YYYYMMDD>.csv`.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::SourceError;

const DATE_FORMAT: &str = "%Y%m%d";

/// How to handle a day with no snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotPolicy {
    pub fallback: bool,
    pub max_age_days: Option<u32>,
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self {
            fallback: true,
            max_age_days: None,
        }
    }
}

/// A resolved snapshot file. `stale` is set when it predates the requested day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub path: PathBuf,
    pub date: NaiveDate,
    pub stale: bool,
}

pub fn snapshot_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}_{}.csv", date.format(DATE_FORMAT))
}

/// Date encoded in `file_name` if it is a snapshot for `prefix`.
pub fn snapshot_date(prefix: &str, file_name: &str) -> Option<NaiveDate> {
    let stamp = file_name
        .strip_prefix(prefix)?
        .strip_prefix('_')?
        .strip_suffix(".csv")?;
    if stamp.len() != 8 || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(stamp, DATE_FORMAT).ok()
}

/// Pick the snapshot for `as_of`, or the latest earlier one when the policy
/// allows. Snapshots dated after `as_of` are never used.
pub fn resolve_snapshot(
    dir: &Path,
    prefix: &str,
    as_of: NaiveDate,
    policy: SnapshotPolicy,
) -> Result<Snapshot, SourceError> {
    let exact = dir.join(snapshot_file_name(prefix, as_of));
    if exact.is_file() {
        return Ok(Snapshot {
            path: exact,
            date: as_of,
            stale: false,
        });
    }

    let not_found = || SourceError::SnapshotNotFound {
        prefix: prefix.to_string(),
        dir: dir.to_path_buf(),
        as_of,
    };

    if !policy.fallback || !dir.is_dir() {
        return Err(not_found());
    }

    let entries = fs::read_dir(dir).map_err(|source| SourceError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut latest: Option<(NaiveDate, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|source| SourceError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let file_name = entry.file_name();
        let Some(date) = file_name.to_str().and_then(|name| snapshot_date(prefix, name)) else {
            continue;
        };
        if date >= as_of || !entry.path().is_file() {
            continue;
        }
        if latest.as_ref().map_or(true, |(best, _)| date > *best) {
            latest = Some((date, entry.path()));
        }
    }

    let (date, path) = latest.ok_or_else(not_found)?;

    let age_days = (as_of - date).num_days();
    if let Some(max_age_days) = policy.max_age_days {
        if age_days > i64::from(max_age_days) {
            return Err(SourceError::SnapshotTooOld {
                prefix: prefix.to_string(),
                date,
                age_days,
                max_age_days,
            });
        }
    }

    tracing::warn!(
        prefix,
        %as_of,
        fallback = %date,
        age_days,
        "snapshot missing for requested date, using most recent prior snapshot"
    );

    Ok(Snapshot {
        path,
        date,
        stale: true,
    })
}

/// Read a snapshot as text. Non-UTF-8 files (typically spreadsheet exports)
/// are decoded as Windows-1252.
pub fn read_snapshot_text(path: &Path) -> Result<String, SourceError> {
    let io_err = |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = fs::File::open(path).map_err(io_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(io_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}
