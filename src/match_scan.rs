use log::debug;
use rayon::prelude::{IntoParallelIterator, ParallelIterator};

use crate::analysis_types::{EventFeed, ResultSink, StreakRow};
use crate::config::Config;
use crate::streak_analysis::{compute_best_streak, StreakError};

/// Best qualifying streak per killer of one match, in killer-name order.
pub fn scan_match_streaks<F: EventFeed>(
    feed: &F,
    match_id: u32,
    config: &Config,
) -> Result<Vec<StreakRow>, StreakError> {
    let mut rows = Vec::new();
    for killer_name in feed.killer_names(match_id) {
        let timeline = feed.player_timeline(match_id, &killer_name);
        let best = compute_best_streak(
            &timeline,
            &killer_name,
            config.min_kill_count,
            config.max_gap_seconds,
        )?;
        if let Some(kill_count) = best {
            rows.push(StreakRow {
                match_id,
                killer_name,
                kill_count,
            });
        }
    }
    debug!("match {}: {} qualifying streaks", match_id, rows.len());
    Ok(rows)
}

/// Streak scan over every stored match. Each (match, player) computation
/// owns its state and reads an immutable timeline, so matches are scanned
/// in parallel; results come back ordered by match id, then killer name.
pub fn scan_all_matches<F: EventFeed + Sync>(
    feed: &F,
    config: &Config,
) -> Result<Vec<StreakRow>, StreakError> {
    let per_match: Result<Vec<Vec<StreakRow>>, StreakError> = feed
        .match_ids()
        .into_par_iter()
        .map(|match_id| scan_match_streaks(feed, match_id, config))
        .collect();
    Ok(per_match?.into_iter().flatten().collect())
}

/// Run the scan and feed every qualifying row to the sink.
pub fn scan_into_sink<F: EventFeed + Sync, S: ResultSink>(
    feed: &F,
    config: &Config,
    sink: &mut S,
) -> Result<usize, StreakError> {
    let rows = scan_all_matches(feed, config)?;
    let count = rows.len();
    for row in rows {
        sink.record(row);
    }
    Ok(count)
}
