use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// One multiplayer game session. Immutable once inserted into the store;
/// frag events reference it by `match_id`.
#[derive(Debug, Clone)]
pub struct Match {
    pub match_id: u32,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub game_mode: String,
    pub map_name: String,
}

/// A single kill or death record. `victim_name` absent means the killer of
/// record died without a logged victim (the engine writes "killed itself"),
/// and `weapon_code` is absent exactly when the victim is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragEvent {
    pub match_id: u32,
    pub frag_time: DateTime<FixedOffset>,
    pub killer_name: String,
    pub victim_name: Option<String>,
    pub weapon_code: Option<String>,
}

impl FragEvent {
    /// A suicide carries no victim and no weapon.
    pub fn is_suicide(&self) -> bool {
        self.victim_name.is_none()
    }
}

/// A frag as it comes out of the log text, before a match id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrag {
    pub frag_time: DateTime<FixedOffset>,
    pub killer_name: String,
    pub victim_name: Option<String>,
    pub weapon_code: Option<String>,
}

/// Everything extracted from one server log file.
#[derive(Debug, Clone)]
pub struct ParsedMatch {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub game_mode: String,
    pub map_name: String,
    pub frags: Vec<RawFrag>,
}

/// One qualifying killing streak: the best run of kills by `killer_name`
/// within one match, `kill_count` already checked against the configured
/// minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreakRow {
    pub match_id: u32,
    pub killer_name: String,
    pub kill_count: usize,
}

/// Read path into the event store. Must be safe for concurrent reads; the
/// scan never writes through it.
pub trait EventFeed {
    /// Ids of all stored matches, ascending.
    fn match_ids(&self) -> Vec<u32>;

    /// Every distinct name that appears as a killer in the match at least
    /// once, sorted, so scan output is deterministic.
    fn killer_names(&self, match_id: u32) -> Vec<String>;

    /// The chronologically ordered subsequence of the match's frags where
    /// the player is the killer or the victim.
    fn player_timeline(&self, match_id: u32, player: &str) -> Vec<FragEvent>;
}

/// Collects qualifying streak rows for downstream reporting.
pub trait ResultSink {
    fn record(&mut self, row: StreakRow);
}

impl ResultSink for Vec<StreakRow> {
    fn record(&mut self, row: StreakRow) {
        self.push(row);
    }
}
