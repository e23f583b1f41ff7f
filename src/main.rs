use rayon::ThreadPoolBuilder;
use std::env;
use std::process;

use frag_stats::config::parse_config;
use frag_stats::log_reader::LogIterator;
use frag_stats::match_scan::scan_all_matches;
use frag_stats::match_store::MatchStore;
use frag_stats::stat_collection::{write_streak_report_json, write_streaks_csv, StreakReport};

fn main() {
    let config = parse_config(env::args().collect());

    let mut store = MatchStore::new();
    for (log_index, parsed) in LogIterator::new(config.start_index, config.end_index) {
        let match_id = store.insert_match(parsed);
        println!("logs/log{:02}.txt -> match {}", log_index, match_id);
    }
    println!("Loaded {} frags from {} matches.", store.frag_count(), store.matches().count());

    let thread_pool = match ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build()
    {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Error creating thread pool: {}", err);
            process::exit(1);
        }
    };
    let rows = match thread_pool.install(|| scan_all_matches(&store, &config)) {
        Ok(rows) => rows,
        Err(err) => {
            eprintln!("Streak scan failed: {}", err);
            process::exit(1);
        }
    };

    write_streaks_csv(&format!("{}.csv", config.output_filename), &rows);
    let report = StreakReport {
        min_kill_count: config.min_kill_count,
        max_gap_seconds: config.max_gap_seconds,
        streaks: &rows,
    };
    match write_streak_report_json(&format!("{}.json", config.output_filename), &report) {
        Ok(()) => println!("Reported {} killing streaks.", rows.len()),
        Err(err) => eprintln!("Failed to create report: {:?}", err),
    }
}
