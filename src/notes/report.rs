use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;

use super::record::{as_seconds, SessionRecord};

/// How many days the "top performing days" ranking keeps.
pub const TOP_DAYS: usize = 5;

/// Sessions and time logged on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayStats {
    pub date: NaiveDate,
    pub session_count: usize,
    #[serde(rename = "total_duration_seconds", serialize_with = "as_seconds")]
    pub total_duration: Duration,
}

impl DayStats {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            session_count: 0,
            total_duration: Duration::ZERO,
        }
    }
}

/// Summary of `- Rate: n/10` values from older entries, kept apart from
/// focus quality because the two scales do not mix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyRatings {
    pub count: usize,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub window_days: u32,
    pub session_count: usize,
    #[serde(rename = "total_duration_seconds", serialize_with = "as_seconds")]
    pub total_duration: Duration,
    #[serde(rename = "average_duration_seconds", serialize_with = "as_seconds")]
    pub average_duration: Duration,
    /// Mean of nonzero focus qualities; `None` if no session recorded one.
    pub average_focus_quality: Option<f64>,
    pub focus_quality_points: u32,
    pub longest_session: SessionRecord,
    pub best_day: DayStats,
    pub days_with_work: usize,
    pub days_with_work_percent: f64,
    pub top_days: Vec<DayStats>,
    pub legacy_ratings: Option<LegacyRatings>,
}

/// Aggregate parsed sessions into report statistics.
///
/// Returns `None` when there are no records. Sums saturate at
/// `Duration::MAX` rather than overflow. Ties resolve deterministically:
/// the longest session is the first in input order, and the best day and
/// equal-length ranked days favour the earlier date.
pub fn aggregate(records: &[SessionRecord], window_days: u32) -> Option<Report> {
    let first = records.first()?;

    let mut total_duration = Duration::ZERO;
    let mut quality_points = 0u32;
    let mut quality_count = 0u32;
    let mut rating_points = 0u32;
    let mut rating_count = 0usize;
    let mut longest = first;
    let mut per_day: BTreeMap<NaiveDate, DayStats> = BTreeMap::new();

    for record in records {
        total_duration = total_duration.saturating_add(record.duration);

        if record.focus_quality > 0 {
            quality_points += u32::from(record.focus_quality);
            quality_count += 1;
        }

        if let Some(rating) = record.legacy_rating {
            rating_points += u32::from(rating);
            rating_count += 1;
        }

        if record.duration > longest.duration {
            longest = record;
        }

        let day = per_day
            .entry(record.date)
            .or_insert_with(|| DayStats::new(record.date));
        day.session_count += 1;
        day.total_duration = day.total_duration.saturating_add(record.duration);
    }

    // BTreeMap yields days in date order.
    let days: Vec<DayStats> = per_day.into_values().collect();

    let mut best_day = &days[0];
    for day in &days[1..] {
        if day.total_duration > best_day.total_duration {
            best_day = day;
        }
    }
    let best_day = best_day.clone();

    let days_with_work = days.len();
    let days_with_work_percent = if window_days == 0 {
        0.0
    } else {
        days_with_work as f64 / f64::from(window_days) * 100.0
    };

    let mut top_days = days;
    // Stable: equal totals keep date order.
    top_days.sort_by(|a, b| b.total_duration.cmp(&a.total_duration));
    top_days.truncate(TOP_DAYS);

    Some(Report {
        window_days,
        session_count: records.len(),
        total_duration,
        average_duration: Duration::from_secs(total_duration.as_secs() / records.len() as u64),
        average_focus_quality: (quality_count > 0)
            .then(|| f64::from(quality_points) / f64::from(quality_count)),
        focus_quality_points: quality_points,
        longest_session: longest.clone(),
        best_day,
        days_with_work,
        days_with_work_percent,
        top_days,
        legacy_ratings: (rating_count > 0).then(|| LegacyRatings {
            count: rating_count,
            average: f64::from(rating_points) / rating_count as f64,
        }),
    })
}
