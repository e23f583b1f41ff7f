use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use thiserror::Error;

use crate::analysis_types::{FragEvent, StreakRow};
use crate::frag_reader::{WeaponClass, FROWNING, SKULL_AND_CROSSBONES, STUCK_OUT_TONGUE};
use crate::match_store::MatchStore;

const CSV_HEADER_STREAKS: &str = "match_id,killer_name,kill_count";
const CSV_HEADER_FAVORITE_VICTIMS: &str = "match_id,killer_name,victim_name,kill_count";
const CSV_HEADER_WORST_ENEMIES: &str = "match_id,victim_name,killer_name,death_count";
const CSV_HEADER_WEAPON_CLASSES: &str = "match_id,killer_name,weapon_class,kill_count";
const CSV_HEADER_WEAPON_KILLS: &str = "match_id,killer_name,weapon_code,kill_count";
const CSV_HEADER_KILL_SUICIDE: &str = "match_id,player_name,kill_count,suicide_count";
const CSV_HEADER_DEATH_SERIES: &str = "match_id,player_name,death_count";
const CSV_HEADER_FRAG_HISTORY: &str = "frag_time,killer_name,victim_name,weapon_code";

const UNKNOWN_WEAPON: &str = "\u{2753}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteVictimRow {
    pub match_id: u32,
    pub killer_name: String,
    pub victim_name: String,
    pub kill_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorstEnemyRow {
    pub match_id: u32,
    pub victim_name: String,
    pub killer_name: String,
    pub death_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteWeaponRow {
    pub match_id: u32,
    pub killer_name: String,
    pub weapon_class: WeaponClass,
    pub kill_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeaponKillRow {
    pub match_id: u32,
    pub killer_name: String,
    pub weapon_code: String,
    pub kill_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeathSeriesRow {
    pub match_id: u32,
    pub player_name: String,
    pub death_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KillSuicideRow {
    pub match_id: u32,
    pub player_name: String,
    pub kill_count: usize,
    pub suicide_count: usize,
}

// Count plus position of the group's first occurrence, so ties go to the
// earliest-seen entry.
type Counts<K> = BTreeMap<K, (usize, usize)>;

fn bump<K: Ord>(counts: &mut Counts<K>, key: K, position: usize) {
    let entry = counts.entry(key).or_insert((0, position));
    entry.0 += 1;
}

fn top_entry<K: Ord>(counts: Counts<K>) -> Option<(K, usize)> {
    counts
        .into_iter()
        .max_by(|a, b| (a.1 .0, b.1 .1).cmp(&(b.1 .0, a.1 .1)))
        .map(|(key, (count, _))| (key, count))
}

/// For each killer of each match, the victim they fragged most often.
/// Ties break toward the victim fragged earliest.
pub fn favorite_victims(store: &MatchStore) -> Vec<FavoriteVictimRow> {
    let mut rows = Vec::new();
    for match_id in store.matches().map(|m| m.match_id) {
        let mut per_killer: BTreeMap<String, Counts<String>> = BTreeMap::new();
        for (position, frag) in store.match_frags(match_id).iter().enumerate() {
            if let Some(victim) = &frag.victim_name {
                let counts = per_killer.entry(frag.killer_name.clone()).or_default();
                bump(counts, victim.clone(), position);
            }
        }
        for (killer_name, counts) in per_killer {
            if let Some((victim_name, kill_count)) = top_entry(counts) {
                rows.push(FavoriteVictimRow {
                    match_id,
                    killer_name,
                    victim_name,
                    kill_count,
                });
            }
        }
    }
    rows
}

/// For each victim of each match, the killer who fragged them most often.
pub fn worst_enemies(store: &MatchStore) -> Vec<WorstEnemyRow> {
    let mut rows = Vec::new();
    for match_id in store.matches().map(|m| m.match_id) {
        let mut per_victim: BTreeMap<String, Counts<String>> = BTreeMap::new();
        for (position, frag) in store.match_frags(match_id).iter().enumerate() {
            if let Some(victim) = &frag.victim_name {
                let counts = per_victim.entry(victim.clone()).or_default();
                bump(counts, frag.killer_name.clone(), position);
            }
        }
        for (victim_name, counts) in per_victim {
            if let Some((killer_name, death_count)) = top_entry(counts) {
                rows.push(WorstEnemyRow {
                    match_id,
                    victim_name,
                    killer_name,
                    death_count,
                });
            }
        }
    }
    rows
}

/// For each killer of each match, the weapon class they killed with most.
/// Frags with an unknown weapon code are left out.
pub fn favorite_weapon_classes(store: &MatchStore) -> Vec<FavoriteWeaponRow> {
    let mut rows = Vec::new();
    for match_id in store.matches().map(|m| m.match_id) {
        let mut per_killer: BTreeMap<String, Counts<WeaponClass>> = BTreeMap::new();
        for (position, frag) in store.match_frags(match_id).iter().enumerate() {
            let class = frag
                .weapon_code
                .as_deref()
                .and_then(WeaponClass::from_code);
            if let Some(class) = class {
                let counts = per_killer.entry(frag.killer_name.clone()).or_default();
                bump(counts, class, position);
            }
        }
        for (killer_name, counts) in per_killer {
            if let Some((weapon_class, kill_count)) = top_entry(counts) {
                rows.push(FavoriteWeaponRow {
                    match_id,
                    killer_name,
                    weapon_class,
                    kill_count,
                });
            }
        }
    }
    rows
}

/// Kill counts per (killer, weapon code) of each match, every pair.
pub fn weapon_kill_counts(store: &MatchStore) -> Vec<WeaponKillRow> {
    let mut rows = Vec::new();
    for match_id in store.matches().map(|m| m.match_id) {
        let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
        for frag in store.match_frags(match_id) {
            if frag.victim_name.is_none() {
                continue;
            }
            if let Some(weapon) = &frag.weapon_code {
                *counts
                    .entry((frag.killer_name.clone(), weapon.clone()))
                    .or_insert(0) += 1;
            }
        }
        for ((killer_name, weapon_code), kill_count) in counts {
            rows.push(WeaponKillRow {
                match_id,
                killer_name,
                weapon_code,
                kill_count,
            });
        }
    }
    rows
}

/// Kills and suicides per killer-of-record of each match. A suicide is a
/// frag with no victim.
pub fn kill_suicide_counts(store: &MatchStore) -> Vec<KillSuicideRow> {
    let mut rows = Vec::new();
    for match_id in store.matches().map(|m| m.match_id) {
        let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for frag in store.match_frags(match_id) {
            let entry = counts.entry(frag.killer_name.clone()).or_insert((0, 0));
            if frag.is_suicide() {
                entry.1 += 1;
            } else {
                entry.0 += 1;
            }
        }
        for (player_name, (kill_count, suicide_count)) in counts {
            rows.push(KillSuicideRow {
                match_id,
                player_name,
                kill_count,
                suicide_count,
            });
        }
    }
    rows
}

/// For each player of each match, the longest unbroken series of deaths.
/// Being fragged and killing yourself both extend the series; only
/// fragging someone else ends it. No time-gap constraint applies here,
/// unlike the killing-streak scan.
pub fn longest_death_series(store: &MatchStore) -> Vec<DeathSeriesRow> {
    let mut rows = Vec::new();
    for match_id in store.matches().map(|m| m.match_id) {
        // open series length, longest seen so far
        let mut series: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for frag in store.match_frags(match_id) {
            match &frag.victim_name {
                Some(victim) => {
                    let entry = series.entry(victim.clone()).or_insert((0, 0));
                    entry.0 += 1;
                    entry.1 = entry.1.max(entry.0);
                    // the kill ends whatever series its killer had open
                    series.entry(frag.killer_name.clone()).or_insert((0, 0)).0 = 0;
                }
                None => {
                    let entry = series.entry(frag.killer_name.clone()).or_insert((0, 0));
                    entry.0 += 1;
                    entry.1 = entry.1.max(entry.0);
                }
            }
        }
        for (player_name, (_, death_count)) in series {
            if death_count > 0 {
                rows.push(DeathSeriesRow {
                    match_id,
                    player_name,
                    death_count,
                });
            }
        }
    }
    rows
}

/// Human-readable frag history, one line per frag, weapon classes rendered
/// as emojis.
pub fn prettify_frags(frags: &[FragEvent]) -> Vec<String> {
    frags
        .iter()
        .map(|frag| {
            let time = frag.frag_time.format("%Y-%m-%d %H:%M:%S%:z");
            match (&frag.victim_name, &frag.weapon_code) {
                (Some(victim), Some(weapon)) => {
                    let weapon_emoji = WeaponClass::from_code(weapon)
                        .map(|class| class.emoji())
                        .unwrap_or(UNKNOWN_WEAPON);
                    format!(
                        "[{}] {} {} {} {} {}",
                        time, STUCK_OUT_TONGUE, frag.killer_name, weapon_emoji, FROWNING, victim
                    )
                }
                _ => format!(
                    "[{}] {} {} {}",
                    time, FROWNING, frag.killer_name, SKULL_AND_CROSSBONES
                ),
            }
        })
        .collect()
}

fn write_csv(path: &str, header: &str, lines: impl Iterator<Item = String>) {
    let mut output_file = File::create(path).expect("Could not create output file.");
    output_file
        .write_all(header.as_bytes())
        .expect("Could not write header to file.");
    for line in lines {
        output_file
            .write_all(format!("\n{}", line).as_bytes())
            .expect("Could not write row to file.");
    }
}

fn quoted(name: &str) -> String {
    format!("\"{}\"", name.escape_default())
}

pub fn write_streaks_csv(path: &str, rows: &[StreakRow]) {
    write_csv(
        path,
        CSV_HEADER_STREAKS,
        rows.iter().map(|row| {
            format!("{},{},{}", row.match_id, quoted(&row.killer_name), row.kill_count)
        }),
    );
}

pub fn write_favorite_victims_csv(path: &str, rows: &[FavoriteVictimRow]) {
    write_csv(
        path,
        CSV_HEADER_FAVORITE_VICTIMS,
        rows.iter().map(|row| {
            format!(
                "{},{},{},{}",
                row.match_id,
                quoted(&row.killer_name),
                quoted(&row.victim_name),
                row.kill_count
            )
        }),
    );
}

pub fn write_worst_enemies_csv(path: &str, rows: &[WorstEnemyRow]) {
    write_csv(
        path,
        CSV_HEADER_WORST_ENEMIES,
        rows.iter().map(|row| {
            format!(
                "{},{},{},{}",
                row.match_id,
                quoted(&row.victim_name),
                quoted(&row.killer_name),
                row.death_count
            )
        }),
    );
}

pub fn write_weapon_classes_csv(path: &str, rows: &[FavoriteWeaponRow]) {
    write_csv(
        path,
        CSV_HEADER_WEAPON_CLASSES,
        rows.iter().map(|row| {
            format!(
                "{},{},{},{}",
                row.match_id,
                quoted(&row.killer_name),
                row.weapon_class,
                row.kill_count
            )
        }),
    );
}

pub fn write_weapon_kills_csv(path: &str, rows: &[WeaponKillRow]) {
    write_csv(
        path,
        CSV_HEADER_WEAPON_KILLS,
        rows.iter().map(|row| {
            format!(
                "{},{},{},{}",
                row.match_id,
                quoted(&row.killer_name),
                row.weapon_code,
                row.kill_count
            )
        }),
    );
}

pub fn write_kill_suicide_csv(path: &str, rows: &[KillSuicideRow]) {
    write_csv(
        path,
        CSV_HEADER_KILL_SUICIDE,
        rows.iter().map(|row| {
            format!(
                "{},{},{},{}",
                row.match_id,
                quoted(&row.player_name),
                row.kill_count,
                row.suicide_count
            )
        }),
    );
}

pub fn write_death_series_csv(path: &str, rows: &[DeathSeriesRow]) {
    write_csv(
        path,
        CSV_HEADER_DEATH_SERIES,
        rows.iter().map(|row| {
            format!(
                "{},{},{}",
                row.match_id,
                quoted(&row.player_name),
                row.death_count
            )
        }),
    );
}

pub fn write_frag_history_csv(path: &str, frags: &[FragEvent]) {
    write_csv(
        path,
        CSV_HEADER_FRAG_HISTORY,
        frags.iter().map(|frag| {
            format!(
                "{},{},{},{}",
                frag.frag_time.format("%Y-%m-%d %H:%M:%S%:z"),
                quoted(&frag.killer_name),
                frag.victim_name.as_deref().map(quoted).unwrap_or_default(),
                frag.weapon_code.as_deref().unwrap_or_default()
            )
        }),
    );
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("could not serialize streak report: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("could not write streak report: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
pub struct StreakReport<'a> {
    pub min_kill_count: usize,
    pub max_gap_seconds: i64,
    pub streaks: &'a [StreakRow],
}

/// JSON rendition of the scan results, for consumers that don't want CSV.
pub fn write_streak_report_json(path: &str, report: &StreakReport) -> Result<(), ReportError> {
    let json_output = serde_json::to_string_pretty(report)?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(json_output.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis_types::{ParsedMatch, RawFrag};
    use chrono::{DateTime, Duration, FixedOffset, TimeZone};

    fn at(seconds: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2018, 11, 9, 12, 0, 0)
            .unwrap()
            + Duration::seconds(seconds)
    }

    fn raw(seconds: i64, killer: &str, victim: Option<&str>, weapon: Option<&str>) -> RawFrag {
        RawFrag {
            frag_time: at(seconds),
            killer_name: killer.to_string(),
            victim_name: victim.map(String::from),
            weapon_code: weapon.map(String::from),
        }
    }

    fn store_with(frags: Vec<RawFrag>) -> MatchStore {
        let mut store = MatchStore::new();
        store.insert_match(ParsedMatch {
            start_time: at(0),
            end_time: at(600),
            game_mode: "FFA".to_string(),
            map_name: "mp_surf".to_string(),
            frags,
        });
        store
    }

    #[test]
    fn favorite_victim_is_the_most_fragged_one() {
        let store = store_with(vec![
            raw(0, "papazark", Some("cyap"), Some("AG36")),
            raw(5, "papazark", Some("lamonthe"), Some("AG36")),
            raw(9, "papazark", Some("lamonthe"), Some("M4")),
        ]);
        let rows = favorite_victims(&store);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].victim_name, "lamonthe");
        assert_eq!(rows[0].kill_count, 2);
    }

    #[test]
    fn favorite_victim_tie_goes_to_the_earliest() {
        let store = store_with(vec![
            raw(0, "papazark", Some("zzz"), Some("AG36")),
            raw(5, "papazark", Some("cyap"), Some("AG36")),
        ]);
        let rows = favorite_victims(&store);
        assert_eq!(rows[0].victim_name, "zzz");
        assert_eq!(rows[0].kill_count, 1);
    }

    #[test]
    fn worst_enemy_counts_deaths_from_each_killer() {
        let store = store_with(vec![
            raw(0, "papazark", Some("cyap"), Some("AG36")),
            raw(4, "lamonthe", Some("cyap"), Some("M4")),
            raw(8, "lamonthe", Some("cyap"), Some("M4")),
            raw(12, "cyap", None, None),
        ]);
        let rows = worst_enemies(&store);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].victim_name, "cyap");
        assert_eq!(rows[0].killer_name, "lamonthe");
        assert_eq!(rows[0].death_count, 2);
    }

    #[test]
    fn favorite_weapon_class_groups_codes() {
        // Two different gun codes still count as one class.
        let store = store_with(vec![
            raw(0, "papazark", Some("cyap"), Some("Falcon")),
            raw(4, "papazark", Some("cyap"), Some("M4")),
            raw(8, "papazark", Some("cyap"), Some("Rocket")),
        ]);
        let rows = favorite_weapon_classes(&store);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].weapon_class, WeaponClass::Gun);
        assert_eq!(rows[0].kill_count, 2);
    }

    #[test]
    fn weapon_kill_counts_keep_every_pair() {
        let store = store_with(vec![
            raw(0, "papazark", Some("cyap"), Some("Falcon")),
            raw(4, "papazark", Some("cyap"), Some("Falcon")),
            raw(8, "cyap", Some("papazark"), Some("Machete")),
        ]);
        let rows = weapon_kill_counts(&store);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].killer_name, "cyap");
        assert_eq!(rows[0].weapon_code, "Machete");
        assert_eq!(rows[0].kill_count, 1);
        assert_eq!(rows[1].killer_name, "papazark");
        assert_eq!(rows[1].kill_count, 2);
    }

    #[test]
    fn kill_and_suicide_counts_are_split() {
        let store = store_with(vec![
            raw(0, "papazark", Some("cyap"), Some("AG36")),
            raw(4, "papazark", None, None),
            raw(8, "papazark", Some("lamonthe"), Some("AG36")),
            raw(12, "cyap", None, None),
        ]);
        let rows = kill_suicide_counts(&store);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].player_name, "cyap");
        assert_eq!((rows[0].kill_count, rows[0].suicide_count), (0, 1));
        assert_eq!(rows[1].player_name, "papazark");
        assert_eq!((rows[1].kill_count, rows[1].suicide_count), (2, 1));
    }

    #[test]
    fn death_series_ends_when_the_player_frags_someone() {
        let store = store_with(vec![
            raw(0, "cyap", Some("papazark"), Some("AG36")),
            raw(4, "lamonthe", Some("papazark"), Some("M4")),
            raw(8, "cyap", Some("papazark"), Some("AG36")),
            raw(12, "papazark", Some("cyap"), Some("Falcon")),
            raw(16, "cyap", Some("papazark"), Some("AG36")),
        ]);
        let rows = longest_death_series(&store);
        let papazark = rows
            .iter()
            .find(|row| row.player_name == "papazark")
            .unwrap();
        assert_eq!(papazark.death_count, 3);
    }

    #[test]
    fn suicides_extend_the_death_series() {
        let store = store_with(vec![
            raw(0, "cyap", Some("papazark"), Some("AG36")),
            raw(4, "papazark", None, None),
            raw(8, "lamonthe", Some("papazark"), Some("M4")),
        ]);
        let rows = longest_death_series(&store);
        let papazark = rows
            .iter()
            .find(|row| row.player_name == "papazark")
            .unwrap();
        assert_eq!(papazark.death_count, 3);
    }

    #[test]
    fn players_who_never_die_get_no_death_series_row() {
        let store = store_with(vec![
            raw(0, "cyap", Some("papazark"), Some("AG36")),
            raw(4, "cyap", Some("lamonthe"), Some("AG36")),
        ]);
        let rows = longest_death_series(&store);
        assert!(rows.iter().all(|row| row.player_name != "cyap"));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn prettified_lines_mark_kills_and_suicides() {
        let store = store_with(vec![
            raw(0, "papazark", Some("cyap"), Some("Machete")),
            raw(4, "lamonthe", None, None),
        ]);
        let frags: Vec<FragEvent> = store.match_frags(1).into_iter().cloned().collect();
        let lines = prettify_frags(&frags);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(STUCK_OUT_TONGUE));
        assert!(lines[0].contains("papazark"));
        assert!(lines[0].contains(WeaponClass::Knife.emoji()));
        assert!(lines[0].contains("cyap"));
        assert!(lines[1].contains(SKULL_AND_CROSSBONES));
        assert!(lines[1].contains("lamonthe"));
        assert!(lines[0].starts_with("[2018-11-09 12:00:00+00:00]"));
    }

    #[test]
    fn streak_report_serializes_rows() {
        let rows = vec![StreakRow {
            match_id: 1,
            killer_name: "papazark".to_string(),
            kill_count: 4,
        }];
        let report = StreakReport {
            min_kill_count: 3,
            max_gap_seconds: 10,
            streaks: &rows,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"papazark\""));
        assert!(json.contains("\"kill_count\":4"));
    }
}
