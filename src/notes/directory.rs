use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};

use crate::error::NoteError;

/// Extension of daily note files.
pub const NOTE_EXTENSION: &str = "md";

/// A daily note file and the date encoded in its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFile {
    pub path: PathBuf,
    pub date: NaiveDate,
}

/// First date of the `window_days` ending at `today`, or `None` for an
/// empty window. Windows reaching past the calendar start at `NaiveDate::MIN`.
pub fn window_start(today: NaiveDate, window_days: u32) -> Option<NaiveDate> {
    let back = window_days.checked_sub(1)?;
    Some(
        today
            .checked_sub_days(Days::new(u64::from(back)))
            .unwrap_or(NaiveDate::MIN),
    )
}

/// Format `date` with a strftime pattern, failing instead of panicking on
/// patterns chrono cannot render.
fn format_date(date: NaiveDate, date_format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(date_format)).ok()?;
    Some(out)
}

/// Whether `date_format` names a whole calendar date: it must render and then
/// parse back to the same day. Formats without a year fail this.
pub fn is_date_format(date_format: &str) -> bool {
    let Some(sample) = NaiveDate::from_ymd_opt(2025, 11, 23) else {
        return false;
    };
    format_date(sample, date_format)
        .and_then(|name| NaiveDate::parse_from_str(&name, date_format).ok())
        == Some(sample)
}

/// Path of the note file for `date`.
pub fn note_path(dir: &Path, date_format: &str, date: NaiveDate) -> Result<PathBuf, NoteError> {
    let name = format_date(date, date_format)
        .ok_or_else(|| NoteError::InvalidDateFormat(date_format.to_string()))?;
    Ok(dir.join(format!("{}.{}", name, NOTE_EXTENSION)))
}

/// List note files directly inside `dir` whose name is a date in the window.
///
/// Files with other extensions, or whose name does not parse with
/// `date_format`, are skipped. Results are ordered by date, then path.
pub fn scan(
    dir: &Path,
    date_format: &str,
    window_days: u32,
    today: NaiveDate,
) -> Result<Vec<NoteFile>, NoteError> {
    if !is_date_format(date_format) {
        return Err(NoteError::InvalidDateFormat(date_format.to_string()));
    }

    let entries = std::fs::read_dir(dir).map_err(|source| NoteError::DirectoryUnavailable {
        path: dir.to_path_buf(),
        source,
    })?;

    let Some(first_day) = window_start(today, window_days) else {
        return Ok(Vec::new());
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(NOTE_EXTENSION) {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let date = match NaiveDate::parse_from_str(stem, date_format) {
            Ok(d) => d,
            Err(_) => {
                tracing::debug!(file = %path.display(), "name is not a date, skipping");
                continue;
            }
        };

        if date < first_day || date > today {
            tracing::debug!(file = %path.display(), %date, "outside report window");
            continue;
        }

        files.push(NoteFile { path, date });
    }

    files.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.path.cmp(&b.path)));
    Ok(files)
}
