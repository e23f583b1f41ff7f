pub mod analysis_types;
pub mod config;
pub mod frag_reader;
pub mod log_reader;
pub mod match_scan;
pub mod match_store;
pub mod stat_collection;
pub mod streak_analysis;
