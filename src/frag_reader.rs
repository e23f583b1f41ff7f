use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Timelike};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::analysis_types::RawFrag;

static START_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^Log Started at (\w+, \w+ \d{2}, \d{4} \d{2}:\d{2}:\d{2})$")
        .expect("Could not compile start time pattern.")
});
static TIME_ZONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"cvar: \(g_timezone,(-?\d)").expect("Could not compile timezone pattern.")
});
static LOADING_LEVEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Loading level Levels/(\w+), mission (\w+)")
        .expect("Could not compile loading level pattern.")
});
static FRAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^<([0-5][0-9]):([0-5][0-9])> <\w+> ([\w+ ]*) killed (?:itself|([\w+ ]*) with (\w+))")
        .expect("Could not compile frag pattern.")
});
static LEVEL_LOADED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^<([0-5][0-9]):([0-5][0-9])>  Level \w+ loaded in [-+]?[0-9]*\.?[0-9]+ seconds$")
        .expect("Could not compile level loaded pattern.")
});
static STATISTICS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^<([0-5][0-9]):([0-5][0-9])> == Statistics")
        .expect("Could not compile statistics pattern.")
});
static NEXT_LINE_TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<([0-5][0-9]):([0-5][0-9])>").expect("Could not compile timestamp pattern.")
});

const START_TIME_FORMAT: &str = "%A, %B %d, %Y %H:%M:%S";

pub const STUCK_OUT_TONGUE: &str = "\u{1F61B}";
pub const FROWNING: &str = "\u{1F626}";
pub const SKULL_AND_CROSSBONES: &str = "\u{2620}";

/// Coarse grouping of the engine's weapon codes, used by the favorite
/// weapon class report and the prettified frag history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum WeaponClass {
    Vehicle,
    Gun,
    Bomb,
    Rocket,
    Knife,
    Boat,
}

impl WeaponClass {
    pub fn from_code(code: &str) -> Option<WeaponClass> {
        match code {
            "Vehicle" => Some(WeaponClass::Vehicle),
            "Falcon" | "Shotgun" | "P90" | "MP5" | "M4" | "AG36" | "OICW" | "SniperRifle"
            | "M249" | "MG" | "VehicleMountedAutoMG" | "VehicleMountedMG" => {
                Some(WeaponClass::Gun)
            }
            "HandGrenade" | "AG36Grenade" | "OICWGrenade" | "StickyExplosive" => {
                Some(WeaponClass::Bomb)
            }
            "Rocket" | "VehicleMountedRocketMG" | "VehicleRocket" => Some(WeaponClass::Rocket),
            "Machete" => Some(WeaponClass::Knife),
            "Boat" => Some(WeaponClass::Boat),
            _ => None,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            WeaponClass::Vehicle => "\u{1F699}",
            WeaponClass::Gun => "\u{1F52B}",
            WeaponClass::Bomb => "\u{1F4A3}",
            WeaponClass::Rocket => "\u{1F680}",
            WeaponClass::Knife => "\u{1F52A}",
            WeaponClass::Boat => "\u{1F6A4}",
        }
    }
}

impl fmt::Display for WeaponClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeaponClass::Vehicle => "vehicle",
            WeaponClass::Gun => "gun",
            WeaponClass::Bomb => "bomb",
            WeaponClass::Rocket => "rocket",
            WeaponClass::Knife => "knife",
            WeaponClass::Boat => "boat",
        };
        write!(f, "{}", name)
    }
}

/// Time the engine began logging, from the "Log Started at" header plus the
/// `g_timezone` cvar. Logs without the cvar are treated as UTC.
pub fn parse_log_start_time(log_data: &str) -> Option<DateTime<FixedOffset>> {
    let caps = match START_TIME_RE.captures(log_data) {
        Some(caps) => caps,
        None => {
            warn!("Can't get start time from the log file!");
            return None;
        }
    };
    let naive = match NaiveDateTime::parse_from_str(&caps[1], START_TIME_FORMAT) {
        Ok(naive) => naive,
        Err(err) => {
            warn!("Malformed log start time {:?}: {}", &caps[1], err);
            return None;
        }
    };
    let offset_hours = TIME_ZONE_RE
        .captures(log_data)
        .and_then(|caps| caps[1].parse::<i32>().ok())
        .unwrap_or(0);
    let offset = FixedOffset::east_opt(offset_hours * 3600)?;
    naive.and_local_timezone(offset).single()
}

/// Multiplayer mode and map name from the "Loading level" line, in that
/// order.
pub fn parse_mode_and_map(log_data: &str) -> Option<(String, String)> {
    match LOADING_LEVEL_RE.captures(log_data) {
        Some(caps) => Some((caps[2].to_string(), caps[1].to_string())),
        None => {
            warn!("Can't get match mode and map from the log file!");
            None
        }
    }
}

/// All frag lines of the log in order, with absolute timestamps.
///
/// Frag lines only carry `<mm:ss>`; the hour comes from the log start time,
/// bumped by one whenever the logged minute wraps past 59:59.
pub fn parse_frags(log_data: &str, log_start: DateTime<FixedOffset>) -> Vec<RawFrag> {
    let mut frags = Vec::new();
    let mut frag_time = log_start;
    let mut previous_minute: Option<u32> = None;

    for caps in FRAG_RE.captures_iter(log_data) {
        let minute = match caps[1].parse::<u32>() {
            Ok(minute) => minute,
            Err(_) => continue,
        };
        let second = match caps[2].parse::<u32>() {
            Ok(second) => second,
            Err(_) => continue,
        };

        let wrapped = match previous_minute {
            None => minute < frag_time.minute(),
            Some(previous) => minute < previous,
        };
        if wrapped {
            frag_time += Duration::hours(1);
        }
        frag_time = match with_minute_second(frag_time, minute, second) {
            Some(time) => time,
            None => {
                warn!("Skipping frag with unusable timestamp {}:{}", minute, second);
                continue;
            }
        };
        previous_minute = Some(minute);

        frags.push(RawFrag {
            frag_time,
            killer_name: caps[3].trim().to_string(),
            victim_name: caps.get(4).map(|m| m.as_str().trim().to_string()),
            weapon_code: caps.get(5).map(|m| m.as_str().to_string()),
        });
    }

    frags
}

/// Approximate start and end of the game session.
///
/// The session starts when the level finishes loading and ends at the
/// statistics screen; logs cut off before the statistics line fall back to
/// the first timestamp after the last frag.
pub fn parse_match_start_and_end(
    log_data: &str,
    log_start: DateTime<FixedOffset>,
    frags: &[RawFrag],
) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let start_time = parse_session_start(log_data, log_start)?;
    let last_frag_time = frags.last()?.frag_time;
    let end_time = parse_session_end(log_data, last_frag_time)?;
    Some((start_time, end_time))
}

fn parse_session_start(
    log_data: &str,
    log_start: DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    let caps = LEVEL_LOADED_RE.captures(log_data)?;
    let minute = caps[1].parse::<u32>().ok()?;
    let second = caps[2].parse::<u32>().ok()?;
    let mut start_time = with_minute_second(log_start, minute, second)?;
    if start_time.minute() < log_start.minute() {
        start_time += Duration::hours(1);
    }
    Some(start_time)
}

fn parse_session_end(
    log_data: &str,
    last_frag_time: DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    let caps = match STATISTICS_RE.captures(log_data) {
        Some(caps) => Some(caps),
        None => {
            // Truncated log: take the timestamp of the line directly after
            // the last frag. Anchored there, so a stray <mm:ss> further
            // down the file cannot pass as the session end.
            let last_frag_end = FRAG_RE.find_iter(log_data).last()?.end();
            let next_line = log_data[last_frag_end..]
                .strip_prefix("\r\n")
                .or_else(|| log_data[last_frag_end..].strip_prefix('\n'))
                .unwrap_or(&log_data[last_frag_end..]);
            NEXT_LINE_TIMESTAMP_RE.captures(next_line)
        }
    }?;
    let minute = caps[1].parse::<u32>().ok()?;
    let second = caps[2].parse::<u32>().ok()?;
    let mut end_time = with_minute_second(last_frag_time, minute, second)?;
    if end_time.minute() < last_frag_time.minute() {
        end_time += Duration::hours(1);
    }
    Some(end_time)
}

fn with_minute_second(
    time: DateTime<FixedOffset>,
    minute: u32,
    second: u32,
) -> Option<DateTime<FixedOffset>> {
    time.with_minute(minute)?.with_second(second)
}
