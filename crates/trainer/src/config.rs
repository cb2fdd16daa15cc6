//! Shell configuration from environment variables

use std::env;

use uci_engine::{Difficulty, EngineConfig, EngineError};

/// Known-good puzzle ids; the provider has no random endpoint
pub const DEFAULT_PUZZLE_POOL: [&str; 7] = ["dDlYz", "H5CTW", "sdtQT", "JfktH", "00008", "0000D", "000aY"];

#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the puzzle API
    pub lichess_base_url: String,

    /// HTTP timeout in seconds
    pub lichess_timeout_secs: u64,

    /// Ids that random and endless mode pick from
    pub puzzle_pool: Vec<String>,

    /// Default opponent strength for supervised play
    pub difficulty: Difficulty,

    pub engine: EngineConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, EngineError> {
        let lichess_base_url = env::var("LICHESS_BASE_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| "https://lichess.org/api".to_string());

        let lichess_timeout_secs = env::var("LICHESS_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(15);

        let puzzle_pool = env::var("PUZZLE_ID_POOL")
            .ok()
            .map(|v| parse_pool(&v))
            .filter(|pool| !pool.is_empty())
            .unwrap_or_else(|| DEFAULT_PUZZLE_POOL.iter().map(|id| id.to_string()).collect());

        let difficulty = match env::var("DIFFICULTY") {
            Ok(v) => v.parse()?,
            Err(_) => Difficulty::default(),
        };

        Ok(Self {
            lichess_base_url,
            lichess_timeout_secs,
            puzzle_pool,
            difficulty,
            engine: EngineConfig::from_env()?,
        })
    }
}

/// Comma-separated ids, blanks dropped
pub fn parse_pool(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pool() {
        assert_eq!(parse_pool(" abc, def ,,ghi "), vec!["abc", "def", "ghi"]);
        assert!(parse_pool(" , ").is_empty());
    }
}
