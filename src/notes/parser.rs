use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::NoteError;

use super::lines::{scan_section, SectionVisitor};
use super::record::SessionRecord;

static DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- Duration: (\d+) minutes (\d+) seconds$").unwrap());
static FOCUS_QUALITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- Focus Quality: (\d+)/5$").unwrap());
static RATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^- Rate: (\d+)/10$").unwrap());

const MILESTONE_PREFIX: &str = "- Milestone: ";
const INTERRUPTIONS_PREFIX: &str = "- Interruptions: ";
const REFLECTION_PREFIX: &str = "- Reflection: ";
const NOTES_PREFIX: &str = "- Notes: ";

const MAX_FOCUS_QUALITY: u8 = 5;
const MAX_RATING: u8 = 10;

/// Parse every session entry in a note file.
///
/// Each record is stamped with `file_date`. A file without the session
/// section yields no records.
pub fn parse_file(path: &Path, file_date: NaiveDate) -> Result<Vec<SessionRecord>, NoteError> {
    let content = std::fs::read_to_string(path).map_err(|source| NoteError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_content(&content, file_date);
    tracing::debug!(file = %path.display(), sessions = records.len(), "parsed note file");
    Ok(records)
}

/// Parse session entries out of note file content.
pub fn parse_content(content: &str, file_date: NaiveDate) -> Vec<SessionRecord> {
    let mut collector = Collector {
        date: file_date,
        current: None,
        records: Vec::new(),
    };
    scan_section(content.lines(), &mut collector);
    collector.finish()
}

struct Collector {
    date: NaiveDate,
    current: Option<SessionRecord>,
    records: Vec<SessionRecord>,
}

impl Collector {
    fn finish(mut self) -> Vec<SessionRecord> {
        self.records.extend(self.current.take());
        self.records
    }
}

impl SectionVisitor for Collector {
    fn session_header(&mut self) {
        if let Some(done) = self.current.replace(SessionRecord::new(self.date)) {
            self.records.push(done);
        }
    }

    fn line(&mut self, line: &str) {
        // Lines before the first session header belong to no entry.
        if let Some(record) = self.current.as_mut() {
            apply_line(record, line);
        }
    }
}

/// Fill in the field a single entry line describes. The first matching
/// pattern claims the line even if its value turns out to be unusable.
fn apply_line(record: &mut SessionRecord, line: &str) {
    if let Some(caps) = DURATION.captures(line) {
        match duration_from(&caps[1], &caps[2]) {
            Some(d) => record.duration = d,
            None => tracing::debug!(line, "duration out of range"),
        }
        return;
    }

    if let Some(caps) = FOCUS_QUALITY.captures(line) {
        if let Some(q) = bounded(&caps[1], MAX_FOCUS_QUALITY) {
            record.focus_quality = q;
        }
        return;
    }

    if let Some(text) = line.strip_prefix(MILESTONE_PREFIX) {
        record.milestone = text.to_string();
    } else if let Some(text) = line.strip_prefix(INTERRUPTIONS_PREFIX) {
        record.interruptions = text.to_string();
    } else if let Some(text) = line.strip_prefix(REFLECTION_PREFIX) {
        record.reflection = text.to_string();
    } else if let Some(caps) = RATE.captures(line) {
        record.legacy_rating = bounded(&caps[1], MAX_RATING);
    } else if let Some(text) = line.strip_prefix(NOTES_PREFIX) {
        record.legacy_notes = text.to_string();
    }
}

fn duration_from(minutes: &str, seconds: &str) -> Option<Duration> {
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    let total = minutes.checked_mul(60)?.checked_add(seconds)?;
    Some(Duration::from_secs(total))
}

fn bounded(digits: &str, max: u8) -> Option<u8> {
    digits.parse::<u8>().ok().filter(|v| *v <= max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    fn write_fixture(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_parse_single_session() {
        let fixture = write_fixture(
            "# Friday\n\n## Altum Work Sessions\n\n#### Session 1\n- Time: 23:50:00 - 00:15:30\n- Duration: 25 minutes 30 seconds\n- Milestone: Parser done\n- Focus Quality: 4/5\n",
        );

        let records = parse_file(fixture.path(), date()).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.duration, Duration::from_secs(25 * 60 + 30));
        assert_eq!(r.focus_quality, 4);
        assert_eq!(r.milestone, "Parser done");
        // Date comes from the file, not the time range that crosses midnight.
        assert_eq!(r.date, date());
    }

    #[test]
    fn test_no_section_title_yields_nothing() {
        let records = parse_content("#### Session 1\n- Duration: 5 minutes 0 seconds\n", date());
        assert!(records.is_empty());
    }

    #[test]
    fn test_title_without_sessions_yields_nothing() {
        let records = parse_content("## Altum Work Sessions\n- Duration: 5 minutes 0 seconds\n", date());
        assert!(records.is_empty());
    }

    #[test]
    fn test_unmatched_lines_leave_zero_fields() {
        let records = parse_content(
            "## Altum Work Sessions\n#### Session 1\n- Duration: about an hour\n- Focus Quality: great\n",
            date(),
        );
        assert_eq!(records, vec![SessionRecord::new(date())]);
    }

    #[test]
    fn test_multiple_sessions_and_optional_fields() {
        let content = "\
## Altum Work Sessions

#### Session 1
- Time: 09:00:00 - 09:50:00
- Duration: 50 minutes 0 seconds
- Milestone: Outline
- Focus Quality: 5/5
- Interruptions: Doorbell
- Reflection: Start earlier

#### Session 2
- Time: 14:00:00 - 14:10:05
- Duration: 10 minutes 5 seconds
- Milestone: Emails
- Focus Quality: 2/5
";
        let records = parse_content(content, date());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].interruptions, "Doorbell");
        assert_eq!(records[0].reflection, "Start earlier");
        assert_eq!(records[1].duration, Duration::from_secs(605));
        assert_eq!(records[1].focus_quality, 2);
        assert!(records[1].interruptions.is_empty());
    }

    #[test]
    fn test_legacy_entries() {
        let content = "## Altum Work Sessions\n#### Session 1\n- Duration: 30 minutes 0 seconds\n- Rate: 7/10\n- Notes: old format\n";
        let records = parse_content(content, date());
        assert_eq!(records[0].legacy_rating, Some(7));
        assert_eq!(records[0].legacy_notes, "old format");
        assert_eq!(records[0].focus_quality, 0);
    }

    #[test]
    fn test_out_of_range_values_are_absent() {
        let content = "## Altum Work Sessions\n#### Session 1\n- Focus Quality: 9/5\n- Rate: 11/10\n- Duration: 99999999999999999999 minutes 0 seconds\n";
        let records = parse_content(content, date());
        assert_eq!(records[0].focus_quality, 0);
        assert_eq!(records[0].legacy_rating, None);
        assert_eq!(records[0].duration, Duration::ZERO);
    }

    #[test]
    fn test_lines_before_first_header_ignored() {
        let content = "## Altum Work Sessions\n- Milestone: stray\n#### Session 1\n- Milestone: kept\n";
        let records = parse_content(content, date());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].milestone, "kept");
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_file(&dir.path().join("missing.md"), date()).unwrap_err();
        assert!(matches!(err, NoteError::FileUnreadable { .. }));
    }
}
