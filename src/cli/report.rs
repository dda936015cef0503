use anyhow::Context;
use chrono::{Local, NaiveDate};

use crate::config::Settings;
use crate::notes;
use crate::notes::directory::window_start;
use crate::notes::record::{minutes_seconds, SessionRecord};
use crate::notes::report::{aggregate, Report};

use super::ReportFormat;

const RULE: &str = "═══════════════════════════════════════════════════════════";

pub fn run(settings: &Settings, days: u32, format: ReportFormat) -> anyhow::Result<()> {
    let notes_dir = settings.notes_dir()?;
    let today = Local::now().date_naive();

    let sessions = notes::collect_sessions(notes_dir, &settings.date_format, days, today)
        .context("Error parsing sessions")?;

    print!("{}", render(&sessions, days, today, format)?);
    Ok(())
}

/// The full report output, or the no-sessions notice.
fn render(
    sessions: &[SessionRecord],
    days: u32,
    today: NaiveDate,
    format: ReportFormat,
) -> anyhow::Result<String> {
    let Some(report) = aggregate(sessions, days) else {
        return Ok(format!("No sessions found in the last {} days.\n", days));
    };

    Ok(match format {
        ReportFormat::Text => render_text(&report, today),
        ReportFormat::Json => format!("{}\n", serde_json::to_string_pretty(&report)?),
    })
}

fn render_text(report: &Report, today: NaiveDate) -> String {
    let start = window_start(today, report.window_days).unwrap_or(today);

    let mut lines = vec![
        String::new(),
        RULE.to_string(),
        format!(
            "  Deep Work Report: {} - {}",
            long_date(start),
            long_date(today)
        ),
        RULE.to_string(),
        String::new(),
        format!("Total sessions: {}", report.session_count),
        format!(
            "Total deep work: {:.1} hours ({} minutes)",
            hours(report.total_duration),
            minutes_seconds(report.total_duration).0
        ),
        format!(
            "Average session: {} minutes",
            minutes_seconds(report.average_duration).0
        ),
    ];

    if let Some(avg) = report.average_focus_quality {
        lines.push(format!("Average rating: {:.1} / 5", avg));
    }
    if let Some(legacy) = &report.legacy_ratings {
        lines.push(format!(
            "Legacy rating: {:.1} / 10 ({} sessions)",
            legacy.average, legacy.count
        ));
    }

    let best = &report.best_day;
    lines.push(format!(
        "Best day: {} – {:.1} hours ({} sessions)",
        short_date(best.date),
        hours(best.total_duration),
        best.session_count
    ));

    let longest = &report.longest_session;
    lines.push(format!(
        "Longest session: {} minutes ({})",
        minutes_seconds(longest.duration).0,
        short_date(longest.date)
    ));

    lines.push(format!(
        "Days with deep work: {} / {} ({:.0}%)",
        report.days_with_work, report.window_days, report.days_with_work_percent
    ));

    if report.average_focus_quality.is_some() {
        lines.push(format!("Total rating points: {}", report.focus_quality_points));
    }

    lines.push(String::new());
    lines.push("Top performing days:".to_string());
    for day in &report.top_days {
        lines.push(format!(
            "{}: {:.1}h ({} sessions)",
            short_date(day.date),
            hours(day.total_duration),
            day.session_count
        ));
    }
    lines.push(String::new());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn hours(d: std::time::Duration) -> f64 {
    d.as_secs_f64() / 3600.0
}

fn long_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}
