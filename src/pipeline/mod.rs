//! Pipeline stages for leaderboard reporting.
//!
//! - `rank`: Order members and assign positions
//! - `diff`: Compare two snapshots
//! - `report`: Render boards and diffs as text
//! - `poll`: Fetch, compare and notify on an interval

pub mod diff;
pub mod poll;
pub mod rank;
pub mod report;

pub use diff::{
    LeaderboardDiff, MemberProgress, Solution, compute_diff, new_solutions, snapshots_score_equal,
};
pub use poll::{Backoff, CycleOutcome, Poller};
pub use rank::{RankedMember, rank_members};
pub use report::{DIFF_TITLE, ReportOptions, render_board, render_diff, signed_delta};
