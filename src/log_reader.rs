use log::warn;
use std::fs;

use crate::analysis_types::ParsedMatch;
use crate::frag_reader::{
    parse_frags, parse_log_start_time, parse_match_start_and_end, parse_mode_and_map,
};

const DEFAULT_START_INDEX: usize = 0;
const DEFAULT_END_INDEX: usize = 12;

/// Iterates over numbered server log files (`logs/log00.txt`,
/// `logs/log01.txt`, ...) and yields one parsed match per readable,
/// parseable file along with its file index. Broken files are skipped with
/// a warning so one bad log does not abort a batch.
pub struct LogIterator {
    log_file_index: usize,
    end_index: usize,
}

impl LogIterator {
    pub fn new(start_index: usize, end_index: usize) -> LogIterator {
        LogIterator {
            log_file_index: start_index,
            end_index,
        }
    }
}

impl Default for LogIterator {
    fn default() -> Self {
        Self::new(DEFAULT_START_INDEX, DEFAULT_END_INDEX)
    }
}

impl Iterator for LogIterator {
    type Item = (usize, ParsedMatch);

    fn next(&mut self) -> Option<Self::Item> {
        while self.log_file_index < self.end_index {
            let index = self.log_file_index;
            self.log_file_index += 1;
            let path = format!("logs/log{:02}.txt", index);

            let log_data = match fs::read_to_string(&path) {
                Ok(data) => data,
                Err(err) => {
                    warn!("Could not read {}: {}", path, err);
                    continue;
                }
            };
            match parse_match(&log_data) {
                Some(parsed) => return Some((index, parsed)),
                None => {
                    warn!("Skipping {}: not a usable match log", path);
                    continue;
                }
            }
        }
        None
    }
}

/// One log file's worth of match data, or `None` when any required piece
/// (start time, mode/map, session bounds) is missing.
pub fn parse_match(log_data: &str) -> Option<ParsedMatch> {
    let log_start = parse_log_start_time(log_data)?;
    let (game_mode, map_name) = parse_mode_and_map(log_data)?;
    let frags = parse_frags(log_data, log_start);
    let (start_time, end_time) = parse_match_start_and_end(log_data, log_start, &frags)?;
    Some(ParsedMatch {
        start_time,
        end_time,
        game_mode,
        map_name,
        frags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_match_assembles_all_pieces() {
        let log = "Log Started at Friday, November 09, 2018 12:22:07\n\
            cvar: (g_timezone,-5)\n\
            Loading level Levels/mp_surf, mission FFA ---------\n\
            <26:32>  Level mp_surf loaded in 27.675034 seconds\n\
            <26:58> <Lua> papazark killed lamonthe with AG36\n\
            <27:05> <Lua> lamonthe killed itself\n\
            <28:10> == Statistics ==========\n";
        let parsed = parse_match(log).unwrap();
        assert_eq!(parsed.game_mode, "FFA");
        assert_eq!(parsed.map_name, "mp_surf");
        assert_eq!(parsed.frags.len(), 2);
        assert!(parsed.start_time <= parsed.frags[0].frag_time);
        assert!(parsed.end_time >= parsed.frags[1].frag_time);
    }

    #[test]
    fn parse_match_rejects_logs_without_a_header() {
        assert!(parse_match("<26:58> <Lua> a killed b with M4\n").is_none());
    }

    #[test]
    fn missing_files_are_skipped_silently() {
        // Indexes far past anything checked into logs/
        let mut iterator = LogIterator::new(90, 94);
        assert!(iterator.next().is_none());
    }
}
