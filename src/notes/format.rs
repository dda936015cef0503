use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::NoteError;

use super::lines::{scan_section, SectionVisitor, SECTION_TITLE};
use super::record::{minutes_seconds, EntryBody, SessionEntry};

const TIME_FORMAT: &str = "%H:%M:%S";

/// Where the next entry goes in a note file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sequence {
    /// 1-based session number for the new entry.
    pub number: u32,
    /// The section title is missing and must be written first.
    pub needs_header: bool,
}

struct HeaderCount(u32);

impl SectionVisitor for HeaderCount {
    fn session_header(&mut self) {
        self.0 += 1;
    }
}

/// Compute the next session number from a note file's current content.
///
/// Only `#### Session N` lines after the section title are counted; the
/// numbers written in them are ignored.
pub fn next_sequence(existing: &str) -> Sequence {
    let mut count = HeaderCount(0);
    let found = scan_section(existing.lines(), &mut count);
    Sequence {
        number: count.0 + 1,
        needs_header: !found,
    }
}

/// Render an entry as the text block appended to a note file.
pub fn render(entry: &SessionEntry, sequence: Sequence) -> String {
    let mut out = String::new();

    if sequence.needs_header {
        out.push_str(&format!("\n{}\n", SECTION_TITLE));
    }

    let (minutes, seconds) = minutes_seconds(entry.duration);
    out.push_str(&format!("\n#### Session {}\n", sequence.number));
    out.push_str(&format!(
        "- Time: {} - {}\n",
        entry.start.format(TIME_FORMAT),
        entry.end.format(TIME_FORMAT)
    ));
    out.push_str(&format!("- Duration: {} minutes {} seconds\n", minutes, seconds));

    match &entry.body {
        EntryBody::Reflective {
            milestone,
            focus_quality,
            interruptions,
            reflection,
        } => {
            out.push_str(&format!("- Milestone: {}\n", single_line(milestone)));
            out.push_str(&format!("- Focus Quality: {}/5\n", focus_quality));
            push_optional(&mut out, "Interruptions", interruptions);
            push_optional(&mut out, "Reflection", reflection);
        }
        EntryBody::Legacy { rating, notes } => {
            out.push_str(&format!("- Rate: {}/10\n", rating));
            push_optional(&mut out, "Notes", notes);
        }
    }

    out
}

fn push_optional(out: &mut String, label: &str, text: &str) {
    let text = single_line(text);
    if !text.is_empty() {
        out.push_str(&format!("- {}: {}\n", label, text));
    }
}

/// Entries are line-oriented, so embedded newlines would split a field.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Append `entry` to the note file at `path`, creating it if absent.
///
/// Existing bytes are never rewritten. Returns the sequence that was used.
pub fn append_entry(path: &Path, entry: &SessionEntry) -> Result<Sequence, NoteError> {
    let write_failed = |source: std::io::Error| NoteError::FileWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(write_failed(e)),
    };

    let sequence = next_sequence(&existing);
    let block = render(entry, sequence);

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_failed)?;
    file.write_all(block.as_bytes()).map_err(write_failed)?;
    file.flush().map_err(write_failed)?;

    tracing::info!(
        path = %path.display(),
        session = sequence.number,
        new_section = sequence.needs_header,
        "appended session entry"
    );

    Ok(sequence)
}
