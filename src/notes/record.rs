use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use serde::{Serialize, Serializer};

/// One logged session as read back from a note file.
///
/// `date` always comes from the note file's name, never from the `- Time:` line.
/// Fields whose line was missing or malformed keep their zero value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    pub date: NaiveDate,
    #[serde(rename = "duration_seconds", serialize_with = "as_seconds")]
    pub duration: Duration,
    /// 1-5, or 0 when not recorded.
    pub focus_quality: u8,
    pub milestone: String,
    pub interruptions: String,
    pub reflection: String,

    /// `- Rate: n/10` from the older entry format. Never mixed into focus quality.
    pub legacy_rating: Option<u8>,
    pub legacy_notes: String,
}

impl SessionRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            duration: Duration::ZERO,
            focus_quality: 0,
            milestone: String::new(),
            interruptions: String::new(),
            reflection: String::new(),
            legacy_rating: None,
            legacy_notes: String::new(),
        }
    }
}

/// The part of a new entry that differs between the two note formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBody {
    /// Current format: milestone, focus quality, optional interruptions and reflection.
    Reflective {
        milestone: String,
        focus_quality: u8,
        interruptions: String,
        reflection: String,
    },
    /// Older format written by `start --quick`: a 1-10 rating and optional notes.
    Legacy { rating: u8, notes: String },
}

/// A finished session ready to be appended to today's note file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub duration: Duration,
    pub body: EntryBody,
}

/// Split a duration into whole minutes and leftover seconds.
pub fn minutes_seconds(duration: Duration) -> (u64, u64) {
    let secs = duration.as_secs();
    (secs / 60, secs % 60)
}

pub(crate) fn as_seconds<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(duration.as_secs())
}
