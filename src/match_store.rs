use std::collections::{BTreeMap, BTreeSet};

use crate::analysis_types::{EventFeed, FragEvent, Match, ParsedMatch};

/// In-memory store of finished matches and their frag rows. Ingestion
/// assigns match ids; after loading, analysis only reads.
pub struct MatchStore {
    matches: BTreeMap<u32, Match>,
    frags: Vec<FragEvent>,
    next_match_id: u32,
}

impl Default for MatchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchStore {
    pub fn new() -> Self {
        MatchStore {
            matches: BTreeMap::new(),
            frags: Vec::new(),
            next_match_id: 1,
        }
    }

    /// Store one parsed log as a match plus its frag rows, returning the
    /// assigned match id.
    pub fn insert_match(&mut self, parsed: ParsedMatch) -> u32 {
        let match_id = self.next_match_id;
        self.next_match_id += 1;

        self.matches.insert(
            match_id,
            Match {
                match_id,
                start_time: parsed.start_time,
                end_time: parsed.end_time,
                game_mode: parsed.game_mode,
                map_name: parsed.map_name,
            },
        );
        for frag in parsed.frags {
            self.frags.push(FragEvent {
                match_id,
                frag_time: frag.frag_time,
                killer_name: frag.killer_name,
                victim_name: frag.victim_name,
                weapon_code: frag.weapon_code,
            });
        }

        match_id
    }

    pub fn get_match(&self, match_id: u32) -> Option<&Match> {
        self.matches.get(&match_id)
    }

    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    /// All frag rows of one match in insertion (chronological) order.
    pub fn match_frags(&self, match_id: u32) -> Vec<&FragEvent> {
        self.frags
            .iter()
            .filter(|frag| frag.match_id == match_id)
            .collect()
    }

    pub fn frag_count(&self) -> usize {
        self.frags.len()
    }
}

impl EventFeed for MatchStore {
    fn match_ids(&self) -> Vec<u32> {
        self.matches.keys().copied().collect()
    }

    fn killer_names(&self, match_id: u32) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .frags
            .iter()
            .filter(|frag| frag.match_id == match_id)
            .map(|frag| frag.killer_name.as_str())
            .collect();
        names.into_iter().map(String::from).collect()
    }

    fn player_timeline(&self, match_id: u32, player: &str) -> Vec<FragEvent> {
        let mut timeline: Vec<FragEvent> = self
            .frags
            .iter()
            .filter(|frag| {
                frag.match_id == match_id
                    && (frag.killer_name == player
                        || frag.victim_name.as_deref() == Some(player))
            })
            .cloned()
            .collect();
        // Rows are inserted in log order already; the stable sort keeps
        // same-second events in that order.
        timeline.sort_by_key(|frag| frag.frag_time);
        timeline
    }
}
