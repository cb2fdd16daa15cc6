//! Engine configuration from environment variables

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Path to the UCI engine binary
    pub path: String,

    /// Default search depth for evaluations
    pub depth: u32,

    /// Upper bound on a single search
    pub timeout_ms: u64,

    /// `Threads` UCI option
    pub threads: u32,

    /// `Hash` UCI option, in MB
    pub hash_mb: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: "stockfish".to_string(),
            depth: 15,
            timeout_ms: 5000,
            threads: 1,
            hash_mb: 64,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, EngineError> {
        let defaults = Self::default();

        let path = env::var("STOCKFISH_PATH").unwrap_or(defaults.path);
        if path.trim().is_empty() {
            return Err(EngineError::Config("STOCKFISH_PATH is empty".into()));
        }

        let depth = env::var("SEARCH_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.depth);

        let timeout_ms = env::var("SEARCH_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.timeout_ms);

        let threads = env::var("ENGINE_THREADS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.threads);

        let hash_mb = env::var("ENGINE_HASH_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.hash_mb);

        let config = Self {
            path,
            depth,
            timeout_ms,
            threads,
            hash_mb,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.depth == 0 {
            return Err(EngineError::Config("SEARCH_DEPTH must be at least 1".into()));
        }
        if self.timeout_ms == 0 {
            return Err(EngineError::Config("SEARCH_TIMEOUT_MS must be positive".into()));
        }
        if self.threads == 0 {
            return Err(EngineError::Config("ENGINE_THREADS must be at least 1".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Opponent strength presets, expressed as search depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Strong,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Strong,
        Difficulty::Expert,
    ];

    pub fn depth(self) -> u32 {
        match self {
            Difficulty::Beginner => 5,
            Difficulty::Intermediate => 10,
            Difficulty::Strong => 15,
            Difficulty::Expert => 18,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Strong => "strong",
            Difficulty::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == lowered)
            .ok_or_else(|| EngineError::Config(format!("unknown difficulty '{s}'")))
    }
}
