//! Text rendering of leaderboards and diffs.
//!
//! Output is meant for a monospaced chat message: a table followed, for
//! diffs, by the list of newly solved puzzles.

use chrono::{FixedOffset, Offset, Utc};

use crate::models::{Leaderboard, ReportConfig};
use crate::utils::table::{Table, truncate};

use super::diff::{LeaderboardDiff, MemberProgress};
use super::rank::rank_members;

/// First line of every diff report.
pub const DIFF_TITLE: &str = "Changes in leaderboard!";

const HEADERS: [&str; 3] = ["pos", "score", "user"];

/// Formatting knobs for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Maximum user name width in tables, in grapheme clusters
    pub name_width: usize,
    /// Zone used to print solve times
    pub utc_offset: FixedOffset,
}

impl ReportOptions {
    /// Build options from configuration; an out-of-range offset falls back to UTC.
    pub fn from_config(config: &ReportConfig) -> Self {
        let utc_offset = FixedOffset::east_opt(config.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| {
                log::warn!(
                    "report.utc_offset_minutes={} is out of range; printing times in UTC",
                    config.utc_offset_minutes
                );
                Utc.fix()
            });
        Self {
            name_width: config.name_width,
            utc_offset,
        }
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

/// Render the whole leaderboard in rank order.
pub fn render_board(board: &Leaderboard, options: &ReportOptions) -> String {
    let mut table = Table::new(HEADERS);
    for ranked in rank_members(board) {
        let name = ranked.member.display_name();
        table.push_row([
            ranked.position.to_string(),
            ranked.member.local_score.to_string(),
            truncate(&name, options.name_width).to_string(),
        ]);
    }
    table.render()
}

/// Render a change-set: title, table with deltas, then new solutions.
pub fn render_diff(diff: &LeaderboardDiff<'_>, options: &ReportOptions) -> String {
    let mut table = Table::new(HEADERS);
    for progress in &diff.members {
        let name = progress.member.display_name();
        table.push_row([
            format!(
                "{:<2} {}",
                progress.position,
                signed_delta(progress.position_change)
            ),
            format!(
                "{:<4} {}",
                progress.member.local_score,
                signed_delta(progress.score_change)
            ),
            truncate(&name, options.name_width).to_string(),
        ]);
    }

    let mut report = format!("{DIFF_TITLE}\n{}", table.render());

    let solved: Vec<String> = diff
        .members
        .iter()
        .filter_map(|progress| solutions_line(progress, options))
        .collect();
    if !solved.is_empty() {
        report.push_str("\n\n");
        report.push_str(&solved.join("\n"));
    }

    report
}

/// `<name> solved d1_t2 at 09:01:52, ...`, or `None` without new stars.
fn solutions_line(progress: &MemberProgress<'_>, options: &ReportOptions) -> Option<String> {
    if progress.new_solutions.is_empty() {
        return None;
    }

    let solved = progress
        .new_solutions
        .iter()
        .map(|s| {
            format!(
                "d{}_t{} at {}",
                s.day,
                s.task.number(),
                s.when.with_timezone(&options.utc_offset).format("%H:%M:%S")
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    Some(format!("{} solved {}", progress.member.display_name(), solved))
}

/// `+N`/`-N` right-aligned to three columns; zero is a bare `0`.
pub fn signed_delta(delta: i64) -> String {
    if delta == 0 {
        format!("{:>3}", "0")
    } else {
        format!("{delta:>+3}")
    }
}
