pub mod config;
pub mod report;
pub mod start;

use clap::ValueEnum;

/// How `altum report` prints its results.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum ReportFormat {
    /// Human-readable summary (default)
    #[default]
    Text,
    /// The full report as pretty-printed JSON
    Json,
}
