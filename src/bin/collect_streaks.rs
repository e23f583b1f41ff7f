use frag_stats::config::parse_config;
use frag_stats::log_reader::LogIterator;
use frag_stats::match_scan::scan_all_matches;
use frag_stats::match_store::MatchStore;
use frag_stats::stat_collection::write_streaks_csv;
use std::env;

fn main() {
    let config = parse_config(env::args().collect());

    let mut store = MatchStore::new();
    for (_, parsed) in LogIterator::new(config.start_index, config.end_index) {
        store.insert_match(parsed);
    }

    let rows = scan_all_matches(&store, &config).expect("Streak scan failed.");
    write_streaks_csv("analysis/streaks.csv", &rows);
    println!("Wrote {} killing streaks to analysis/streaks.csv", rows.len());
}
