//! Ranking of leaderboard members.
//!
//! Members are ordered by local score (descending). Equal scores are broken
//! by the timestamp of the latest star, where the more recent star ranks
//! higher. Anything still tied keeps identifier order, since the sort is
//! stable over the snapshot's `BTreeMap` iteration.

use crate::models::{Leaderboard, Member};

/// A member annotated with its 1-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedMember<'a> {
    pub position: usize,
    pub member: &'a Member,
}

/// Rank every member of the snapshot. Positions are dense: `1..=N`.
pub fn rank_members(board: &Leaderboard) -> Vec<RankedMember<'_>> {
    let mut members: Vec<&Member> = board.members.values().collect();

    members.sort_by(|a, b| {
        b.local_score
            .cmp(&a.local_score)
            .then_with(|| b.last_star_ts.cmp(&a.last_star_ts))
    });

    members
        .into_iter()
        .enumerate()
        .map(|(i, member)| RankedMember {
            position: i + 1,
            member,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn ids<'a>(ranked: &[RankedMember<'a>]) -> Vec<&'a str> {
        ranked.iter().map(|r| r.member.id.as_str()).collect()
    }

    #[test]
    fn orders_by_score_descending() {
        let board = Leaderboard::from_members([
            Member::new("a", 10, ts(1)),
            Member::new("b", 30, ts(1)),
            Member::new("c", 20, ts(1)),
        ]);
        assert_eq!(ids(&rank_members(&board)), vec!["b", "c", "a"]);
    }

    #[test]
    fn most_recent_star_wins_ties() {
        let board = Leaderboard::from_members([
            Member::new("early", 50, ts(100)),
            Member::new("late", 50, ts(200)),
        ]);
        assert_eq!(ids(&rank_members(&board)), vec!["late", "early"]);
    }

    #[test]
    fn full_ties_keep_identifier_order() {
        let board = Leaderboard::from_members([
            Member::new("2", 50, ts(100)),
            Member::new("1", 50, ts(100)),
            Member::new("3", 50, ts(100)),
        ]);
        assert_eq!(ids(&rank_members(&board)), vec!["1", "2", "3"]);
    }

    #[test]
    fn positions_are_dense() {
        let board = Leaderboard::from_members(
            (0..25).map(|i| Member::new(i.to_string(), i % 4, ts(i64::from(i % 3)))),
        );
        let ranked = rank_members(&board);
        let positions: Vec<usize> = ranked.iter().map(|r| r.position).collect();
        assert_eq!(positions, (1..=25).collect::<Vec<_>>());
    }

    #[test]
    fn ranking_is_deterministic() {
        let board = Leaderboard::from_members([
            Member::new("x", 5, ts(7)),
            Member::new("y", 5, ts(7)),
            Member::new("z", 9, ts(1)),
        ]);
        assert_eq!(rank_members(&board), rank_members(&board.clone()));
    }

    #[test]
    fn empty_board_ranks_nothing() {
        assert!(rank_members(&Leaderboard::default()).is_empty());
    }
}
