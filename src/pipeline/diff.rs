//! Diff calculation between two leaderboard snapshots.
//!
//! Computes per-member position and score changes plus the stars that were
//! acquired since the previous snapshot. Arguments are always passed as
//! `(new, old)`.
//!
//! Members that disappear from the leaderboard are not reported.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{DayStars, Leaderboard, Member, Task};

use super::rank::{RankedMember, rank_members};

/// A star acquired since the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    pub day: u32,
    pub task: Task,
    pub when: DateTime<Utc>,
}

/// Change record for one member of the new snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProgress<'a> {
    pub member: &'a Member,
    /// Position in the new ranking
    pub position: usize,
    /// Old position minus new position; positive means moved up
    pub position_change: i64,
    /// New score minus old score
    pub score_change: i64,
    /// Member was absent from the old snapshot
    pub is_new: bool,
    pub new_solutions: Vec<Solution>,
}

/// Change records ordered by the new ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaderboardDiff<'a> {
    pub members: Vec<MemberProgress<'a>>,
}

impl LeaderboardDiff<'_> {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check if any member acquired a star.
    pub fn has_new_solutions(&self) -> bool {
        self.members.iter().any(|m| !m.new_solutions.is_empty())
    }

    /// Total number of stars acquired across members.
    pub fn solution_count(&self) -> usize {
        self.members.iter().map(|m| m.new_solutions.len()).sum()
    }
}

/// Compute the change-set from `old` to `new`.
pub fn compute_diff<'a>(new: &'a Leaderboard, old: &Leaderboard) -> LeaderboardDiff<'a> {
    // A transient empty response must not produce a report
    if new.is_empty() {
        return LeaderboardDiff::default();
    }

    let old_ranked: HashMap<&str, RankedMember<'_>> = rank_members(old)
        .into_iter()
        .map(|r| (r.member.id.as_str(), r))
        .collect();

    let members = rank_members(new)
        .into_iter()
        .map(|current| match old_ranked.get(current.member.id.as_str()) {
            None => MemberProgress {
                member: current.member,
                position: current.position,
                position_change: 0,
                score_change: 0,
                is_new: true,
                new_solutions: Vec::new(),
            },
            Some(previous) => MemberProgress {
                member: current.member,
                position: current.position,
                position_change: signed(previous.position) - signed(current.position),
                score_change: current.member.local_score - previous.member.local_score,
                is_new: false,
                new_solutions: new_solutions(current.member, previous.member),
            },
        })
        .collect();

    LeaderboardDiff { members }
}

/// Stars present in `new` but absent in `old`, by day then task.
pub fn new_solutions(new: &Member, old: &Member) -> Vec<Solution> {
    let empty = DayStars::default();
    let mut solutions = Vec::new();

    for (&day, stars) in &new.completion_day_level {
        let before = old.completion_day_level.get(&day).unwrap_or(&empty);
        for task in [Task::Silver, Task::Gold] {
            if let (Some(star), None) = (stars.slot(task), before.slot(task)) {
                solutions.push(Solution {
                    day,
                    task,
                    when: star.get_star_ts,
                });
            }
        }
    }

    solutions
}

/// Check that both snapshots hold the same members with the same scores.
///
/// Names, stars and ordering are ignored.
pub fn snapshots_score_equal(a: &Leaderboard, b: &Leaderboard) -> bool {
    a.len() == b.len()
        && a.members.iter().all(|(id, member)| {
            b.get(id)
                .is_some_and(|other| other.local_score == member.local_score)
        })
}

fn signed(position: usize) -> i64 {
    i64::try_from(position).unwrap_or(i64::MAX)
}
