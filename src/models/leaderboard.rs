//! Leaderboard snapshot model.
//!
//! One [`Leaderboard`] is built per successful fetch and is never mutated
//! afterwards. Members are keyed by identifier in a `BTreeMap`, so iteration
//! order is deterministic regardless of the order the API returned them in.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Which of the two daily puzzles a star belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Task {
    /// First star of the day
    Silver,
    /// Second star of the day
    Gold,
}

impl Task {
    /// Task number as shown in reports (`1` or `2`).
    pub fn number(self) -> u8 {
        match self {
            Task::Silver => 1,
            Task::Gold => 2,
        }
    }
}

/// Acquisition record for a single star.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarInfo {
    #[serde(with = "epoch_seconds")]
    pub get_star_ts: DateTime<Utc>,
}

/// Star state of one puzzle day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayStars {
    #[serde(rename = "1", default, skip_serializing_if = "Option::is_none")]
    pub silver: Option<StarInfo>,

    #[serde(rename = "2", default, skip_serializing_if = "Option::is_none")]
    pub gold: Option<StarInfo>,
}

impl DayStars {
    /// Star slot for the given task.
    pub fn slot(&self, task: Task) -> Option<&StarInfo> {
        match task {
            Task::Silver => self.silver.as_ref(),
            Task::Gold => self.gold.as_ref(),
        }
    }

    fn slot_mut(&mut self, task: Task) -> &mut Option<StarInfo> {
        match task {
            Task::Silver => &mut self.silver,
            Task::Gold => &mut self.gold,
        }
    }
}

/// One participant of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(deserialize_with = "string_or_int")]
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Star count as reported by the API (informational)
    #[serde(default)]
    pub stars: u32,

    pub local_score: i64,

    pub global_score: i64,

    #[serde(with = "epoch_seconds")]
    pub last_star_ts: DateTime<Utc>,

    /// Puzzle day to star state
    pub completion_day_level: BTreeMap<u32, DayStars>,
}

impl Member {
    /// Create a member with no stars and no name.
    pub fn new(id: impl Into<String>, local_score: i64, last_star_ts: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: None,
            stars: 0,
            local_score,
            global_score: 0,
            last_star_ts,
            completion_day_level: BTreeMap::new(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Record a star for `day`/`task` acquired at `when`.
    pub fn with_star(mut self, day: u32, task: Task, when: DateTime<Utc>) -> Self {
        let slot = self.completion_day_level.entry(day).or_default().slot_mut(task);
        if slot.is_none() {
            self.stars += 1;
        }
        *slot = Some(StarInfo { get_star_ts: when });
        self
    }

    /// Name shown in reports: the provided name, or `anon <id>`.
    pub fn display_name(&self) -> Cow<'_, str> {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => Cow::Borrowed(name),
            _ => Cow::Owned(format!("anon {}", self.id)),
        }
    }
}

/// A full leaderboard snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub members: BTreeMap<String, Member>,
}

impl Leaderboard {
    /// Build a snapshot from members, keyed by their identifiers.
    pub fn from_members(members: impl IntoIterator<Item = Member>) -> Self {
        Self {
            members: members.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    /// Parse a snapshot from an already-decoded JSON body.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let board: Self = serde_json::from_value(value)
            .map_err(|e| AppError::validation(format!("unexpected leaderboard shape: {e}")))?;
        board.validate()?;
        Ok(board)
    }

    /// Parse a snapshot from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let board: Self = serde_json::from_slice(bytes)
            .map_err(|e| AppError::validation(format!("unexpected leaderboard shape: {e}")))?;
        board.validate()?;
        Ok(board)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        for (key, member) in &self.members {
            if *key != member.id {
                return Err(AppError::validation(format!(
                    "member key '{key}' does not match id '{}'",
                    member.id
                )));
            }
            if member.completion_day_level.contains_key(&0) {
                return Err(AppError::validation(format!(
                    "member '{key}' has a star record for day 0"
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Member> {
        self.members.get(id)
    }
}

/// Identifiers arrive as strings in older dumps and as integers in newer ones.
fn string_or_int<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Int(n) => n.to_string(),
        Raw::Text(s) => s,
    })
}

/// Epoch-second timestamps, accepted as integers or numeric strings.
mod epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(ts.timestamp())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let secs = match Raw::deserialize(d)? {
            Raw::Int(n) => n,
            Raw::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| D::Error::custom(format!("invalid epoch timestamp '{s}'")))?,
        };
        DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| D::Error::custom(format!("epoch timestamp {secs} out of range")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn parses_string_timestamps_and_ids() {
        let body = json!({
            "members": {
                "379505": {
                    "id": "379505",
                    "local_score": 88,
                    "last_star_ts": "1607149211",
                    "stars": 2,
                    "global_score": 0,
                    "name": "Alice",
                    "completion_day_level": {
                        "1": {
                            "1": { "get_star_ts": "1606801892" },
                            "2": { "get_star_ts": "1606802512" }
                        }
                    }
                }
            }
        });

        let board = Leaderboard::from_value(body).unwrap();
        let member = board.get("379505").unwrap();
        assert_eq!(member.local_score, 88);
        assert_eq!(member.last_star_ts, ts(1607149211));
        let day = &member.completion_day_level[&1];
        assert_eq!(day.silver.as_ref().unwrap().get_star_ts, ts(1606801892));
        assert_eq!(day.gold.as_ref().unwrap().get_star_ts, ts(1606802512));
    }

    #[test]
    fn parses_integer_fields_and_ignores_extra_keys() {
        let body = json!({
            "event": "2023",
            "owner_id": 42,
            "members": {
                "42": {
                    "id": 42,
                    "local_score": 10,
                    "last_star_ts": 1701400000,
                    "stars": 1,
                    "global_score": 0,
                    "name": null,
                    "completion_day_level": {
                        "3": { "1": { "get_star_ts": 1701400000, "star_index": 99 } }
                    }
                }
            }
        });

        let board = Leaderboard::from_value(body).unwrap();
        let member = board.get("42").unwrap();
        assert_eq!(member.id, "42");
        assert!(member.name.is_none());
        assert!(member.completion_day_level[&3].gold.is_none());
    }

    #[test]
    fn rejects_missing_members() {
        let err = Leaderboard::from_value(json!({ "event": "2020" })).unwrap_err();
        assert!(err.is_validation_failure());
    }

    #[test]
    fn rejects_wrong_score_type() {
        let body = json!({
            "members": {
                "1": {
                    "id": "1", "local_score": "lots", "last_star_ts": 0,
                    "global_score": 0, "completion_day_level": {}
                }
            }
        });
        assert!(Leaderboard::from_value(body).unwrap_err().is_validation_failure());
    }

    #[test]
    fn rejects_unknown_task_key() {
        let body = json!({
            "members": {
                "1": {
                    "id": "1", "local_score": 1, "last_star_ts": 0, "global_score": 0,
                    "completion_day_level": { "1": { "3": { "get_star_ts": 5 } } }
                }
            }
        });
        assert!(Leaderboard::from_value(body).unwrap_err().is_validation_failure());
    }

    #[test]
    fn rejects_non_numeric_day() {
        let body = json!({
            "members": {
                "1": {
                    "id": "1", "local_score": 1, "last_star_ts": 0, "global_score": 0,
                    "completion_day_level": { "first": {} }
                }
            }
        });
        assert!(Leaderboard::from_value(body).unwrap_err().is_validation_failure());
    }

    #[test]
    fn rejects_day_zero_and_key_mismatch() {
        let day_zero = json!({
            "members": {
                "1": {
                    "id": "1", "local_score": 1, "last_star_ts": 0, "global_score": 0,
                    "completion_day_level": { "0": {} }
                }
            }
        });
        assert!(Leaderboard::from_value(day_zero).is_err());

        let mismatch = json!({
            "members": {
                "1": {
                    "id": "2", "local_score": 1, "last_star_ts": 0, "global_score": 0,
                    "completion_day_level": {}
                }
            }
        });
        assert!(Leaderboard::from_value(mismatch).is_err());
    }

    #[test]
    fn rejects_malformed_bytes() {
        let err = Leaderboard::from_slice(b"<html>login</html>").unwrap_err();
        assert!(err.is_validation_failure());
    }

    #[test]
    fn display_name_falls_back_to_anon() {
        let named = Member::new("7", 0, ts(0)).with_name("Bob");
        assert_eq!(named.display_name(), "Bob");

        let anon = Member::new("7", 0, ts(0));
        assert_eq!(anon.display_name(), "anon 7");

        let blank = Member::new("8", 0, ts(0)).with_name("");
        assert_eq!(blank.display_name(), "anon 8");

        let spaces = Member::new("9", 0, ts(0)).with_name("  ");
        assert_eq!(spaces.display_name(), "  ");
    }

    #[test]
    fn with_star_counts_stars_once() {
        let member = Member::new("1", 0, ts(0))
            .with_star(1, Task::Silver, ts(10))
            .with_star(1, Task::Gold, ts(20))
            .with_star(1, Task::Gold, ts(30));
        assert_eq!(member.stars, 2);
        assert_eq!(
            member.completion_day_level[&1].slot(Task::Gold).unwrap().get_star_ts,
            ts(30)
        );
    }

    #[test]
    fn serialized_snapshot_parses_back() {
        let board = Leaderboard::from_members([Member::new("1", 5, ts(100))
            .with_name("Carol")
            .with_star(2, Task::Silver, ts(100))]);
        let bytes = serde_json::to_vec(&board).unwrap();
        assert_eq!(Leaderboard::from_slice(&bytes).unwrap(), board);
    }
}
