use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

/// Wall-clock start plus a monotonic anchor for measuring the session.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    started_at: DateTime<Local>,
    anchor: Instant,
    stopped: Option<Duration>,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self::started_at(Local::now(), Instant::now())
    }

    pub fn started_at(started_at: DateTime<Local>, anchor: Instant) -> Self {
        Self {
            started_at,
            anchor,
            stopped: None,
        }
    }

    pub fn start_time(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Elapsed time truncated to whole seconds. Frozen once stopped.
    pub fn elapsed(&self) -> Duration {
        self.stopped.unwrap_or_else(|| whole_seconds(self.anchor.elapsed()))
    }

    /// Stop the stopwatch. Stopping twice keeps the first reading.
    pub fn stop(&mut self) -> Duration {
        let reading = whole_seconds(self.anchor.elapsed());
        *self.stopped.get_or_insert(reading)
    }
}

fn whole_seconds(d: Duration) -> Duration {
    Duration::from_secs(d.as_secs())
}

/// `MM:SS`, or `HH:MM:SS` once an hour has passed.
pub fn format_clock(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours == 0 {
        format!("{:02}:{:02}", minutes, seconds)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(Duration::from_secs(0)), "00:00");
        assert_eq!(format_clock(Duration::from_secs(25 * 60 + 30)), "25:30");
        assert_eq!(format_clock(Duration::from_secs(3600 + 61)), "01:01:01");
    }

    #[test]
    fn test_stop_freezes_elapsed() {
        let anchor = Instant::now() - Duration::from_millis(2_500);
        let mut sw = Stopwatch::started_at(Local::now(), anchor);
        assert!(sw.elapsed() >= Duration::from_secs(2));

        let first = sw.stop();
        assert!(first >= Duration::from_secs(2));
        assert_eq!(first.subsec_nanos(), 0);
        assert_eq!(sw.stop(), first);
        assert_eq!(sw.elapsed(), first);
    }
}
