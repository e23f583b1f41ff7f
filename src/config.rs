pub const DEFAULT_MIN_KILL_COUNT: usize = 3;
pub const DEFAULT_MAX_GAP_SECONDS: i64 = 10;

const DEFAULT_START_INDEX: usize = 0;
const DEFAULT_END_INDEX: usize = 12;
const DEFAULT_NUM_THREADS: usize = 4;

#[derive(Debug, Clone)]
pub struct Config {
    pub output_filename: String,
    pub start_index: usize,
    pub end_index: usize,
    /// Shortest kill run worth reporting.
    pub min_kill_count: usize,
    /// Longest allowed pause between two kills of the same run.
    pub max_gap_seconds: i64,
    pub num_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_filename: format!("streaks_{}_{}", DEFAULT_START_INDEX, DEFAULT_END_INDEX),
            start_index: DEFAULT_START_INDEX,
            end_index: DEFAULT_END_INDEX,
            min_kill_count: DEFAULT_MIN_KILL_COUNT,
            max_gap_seconds: DEFAULT_MAX_GAP_SECONDS,
            num_threads: DEFAULT_NUM_THREADS,
        }
    }
}

/// Positional arguments, all optional:
/// `<output> <start-index> <end-index> <min-kill-count> <max-gap-seconds> <threads>`.
pub fn parse_config(args: Vec<String>) -> Config {
    let start_index = match args.get(2) {
        Some(x) => x.parse::<usize>().unwrap_or(DEFAULT_START_INDEX),
        None => DEFAULT_START_INDEX,
    };
    let end_index = match args.get(3) {
        Some(x) => x.parse::<usize>().unwrap_or(DEFAULT_END_INDEX),
        None => DEFAULT_END_INDEX,
    };
    let output_filename = match args.get(1) {
        Some(x) => x.clone(),
        None => format!("streaks_{}_{}", start_index, end_index),
    };
    let min_kill_count = match args.get(4) {
        Some(x) => x.parse::<usize>().unwrap_or(DEFAULT_MIN_KILL_COUNT),
        None => DEFAULT_MIN_KILL_COUNT,
    };
    let max_gap_seconds = match args.get(5) {
        Some(x) => x.parse::<i64>().unwrap_or(DEFAULT_MAX_GAP_SECONDS),
        None => DEFAULT_MAX_GAP_SECONDS,
    };
    let num_threads = match args.get(6) {
        Some(x) => x.parse::<usize>().unwrap_or(DEFAULT_NUM_THREADS),
        None => DEFAULT_NUM_THREADS,
    };

    Config {
        output_filename,
        start_index,
        end_index,
        min_kill_count,
        max_gap_seconds,
        num_threads,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn defaults_apply_when_arguments_are_missing() {
        let config = parse_config(args(&["frag-stats"]));
        assert_eq!(config.min_kill_count, 3);
        assert_eq!(config.max_gap_seconds, 10);
        assert_eq!(config.start_index, 0);
        assert_eq!(config.end_index, 12);
    }

    #[test]
    fn arguments_override_the_defaults() {
        let config = parse_config(args(&["frag-stats", "out", "3", "7", "2", "25", "8"]));
        assert_eq!(config.output_filename, "out");
        assert_eq!(config.start_index, 3);
        assert_eq!(config.end_index, 7);
        assert_eq!(config.min_kill_count, 2);
        assert_eq!(config.max_gap_seconds, 25);
        assert_eq!(config.num_threads, 8);
    }

    #[test]
    fn unparseable_arguments_fall_back_to_defaults() {
        let config = parse_config(args(&["frag-stats", "out", "x", "y", "z", "w", "v"]));
        assert_eq!(config.start_index, 0);
        assert_eq!(config.end_index, 12);
        assert_eq!(config.min_kill_count, 3);
        assert_eq!(config.max_gap_seconds, 10);
    }
}
