pub mod directory;
pub mod format;
pub mod lines;
pub mod parser;
pub mod record;
pub mod report;

use std::path::Path;

use chrono::NaiveDate;

use crate::error::NoteError;

use record::SessionRecord;

/// Collect every session logged in the `window_days` ending at `today`.
///
/// A missing or unlistable directory is an error. A note file that cannot be
/// read is logged and skipped.
pub fn collect_sessions(
    dir: &Path,
    date_format: &str,
    window_days: u32,
    today: NaiveDate,
) -> Result<Vec<SessionRecord>, NoteError> {
    let files = directory::scan(dir, date_format, window_days, today)?;

    let mut sessions = Vec::new();
    for file in files {
        match parser::parse_file(&file.path, file.date) {
            Ok(records) => sessions.extend(records),
            Err(e) => tracing::warn!("{e}, skipping"),
        }
    }

    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_collect_across_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("2025-01-10.md"),
            "## Altum Work Sessions\n\n#### Session 1\n- Duration: 25 minutes 30 seconds\n- Focus Quality: 4/5\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("2025-01-09.md"),
            "## Altum Work Sessions\n\n#### Session 1\n- Duration: 10 minutes 0 seconds\n\n#### Session 2\n- Duration: 5 minutes 0 seconds\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("2025-01-01.md"), "## Altum Work Sessions\n#### Session 1\n").unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let sessions = collect_sessions(dir.path(), "%Y-%m-%d", 7, today).unwrap();

        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions[2].date, today);
        assert_eq!(sessions[2].duration, Duration::from_secs(25 * 60 + 30));
        assert_eq!(sessions[2].focus_quality, 4);
    }

    #[test]
    fn test_save_then_report_round() {
        use chrono::NaiveTime;
        use record::{EntryBody, SessionEntry};

        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let path = directory::note_path(dir.path(), "%Y-%m-%d", today).unwrap();

        for minutes in [10, 50] {
            let entry = SessionEntry {
                start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                duration: Duration::from_secs(minutes * 60),
                body: EntryBody::Reflective {
                    milestone: format!("{minutes} minute block"),
                    focus_quality: 3,
                    interruptions: String::new(),
                    reflection: String::new(),
                },
            };
            format::append_entry(&path, &entry).unwrap();
        }

        let sessions = collect_sessions(dir.path(), "%Y-%m-%d", 7, today).unwrap();
        let report = report::aggregate(&sessions, 7).unwrap();
        assert_eq!(report.session_count, 2);
        assert_eq!(report.best_day.total_duration, Duration::from_secs(3600));
        assert_eq!(report.longest_session.milestone, "50 minute block");
    }
}
