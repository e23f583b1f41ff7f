use frag_stats::analysis_types::FragEvent;
use frag_stats::config::parse_config;
use frag_stats::log_reader::LogIterator;
use frag_stats::match_store::MatchStore;
use frag_stats::stat_collection::{
    favorite_victims, favorite_weapon_classes, kill_suicide_counts, longest_death_series,
    prettify_frags, weapon_kill_counts, worst_enemies, write_death_series_csv,
    write_favorite_victims_csv, write_frag_history_csv, write_kill_suicide_csv,
    write_weapon_classes_csv, write_weapon_kills_csv, write_worst_enemies_csv,
};
use std::env;

fn main() {
    let config = parse_config(env::args().collect());

    let mut store = MatchStore::new();
    for (_, parsed) in LogIterator::new(config.start_index, config.end_index) {
        store.insert_match(parsed);
    }
    println!("Collecting frag reports for {} matches...", store.matches().count());

    write_favorite_victims_csv("analysis/favorite_victims.csv", &favorite_victims(&store));
    write_worst_enemies_csv("analysis/worst_enemies.csv", &worst_enemies(&store));
    write_weapon_classes_csv("analysis/favorite_weapons.csv", &favorite_weapon_classes(&store));
    write_weapon_kills_csv("analysis/weapon_kills.csv", &weapon_kill_counts(&store));
    write_kill_suicide_csv("analysis/kill_suicide_counts.csv", &kill_suicide_counts(&store));
    write_death_series_csv("analysis/death_series.csv", &longest_death_series(&store));

    for game in store.matches() {
        let frags: Vec<FragEvent> = store
            .match_frags(game.match_id)
            .into_iter()
            .cloned()
            .collect();
        write_frag_history_csv(
            &format!("analysis/frags_match_{:02}.csv", game.match_id),
            &frags,
        );
        println!("\n{} on {} (match {}):", game.game_mode, game.map_name, game.match_id);
        for line in prettify_frags(&frags) {
            println!("{}", line);
        }
    }
}
