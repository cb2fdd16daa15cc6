//! Lichess puzzle API client

use std::time::Duration;

use puzzle_core::PuzzlePayload;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Client;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ClientError;

pub struct LichessClient {
    client: Client,
    base_url: String,
    pool: Vec<String>,
}

impl LichessClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent("PuzzleTrainer/1.0")
            .timeout(Duration::from_secs(config.lichess_timeout_secs))
            .build()
            .map_err(|e| ClientError::Request(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.lichess_base_url.clone(),
            pool: config.puzzle_pool.clone(),
        })
    }

    /// Today's puzzle
    pub async fn daily(&self) -> Result<PuzzlePayload, ClientError> {
        self.fetch(&daily_url(&self.base_url)).await
    }

    pub async fn by_id(&self, id: &str) -> Result<PuzzlePayload, ClientError> {
        self.fetch(&puzzle_url(&self.base_url, id)).await
    }

    /// A puzzle picked from the id pool, falling back to the daily puzzle
    pub async fn random<G: Rng + ?Sized>(&self, rng: &mut G) -> Result<PuzzlePayload, ClientError> {
        let Some(id) = pick_puzzle_id(&self.pool, rng) else {
            return self.daily().await;
        };
        match self.by_id(id).await {
            Ok(payload) => Ok(payload),
            Err(e) => {
                warn!(puzzle_id = id, error = %e, "Random puzzle fetch failed, falling back to daily");
                self.daily().await
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<PuzzlePayload, ClientError> {
        info!(url, "Fetching puzzle");
        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ClientError::Status {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }

        let text = resp
            .text()
            .await
            .map_err(|e| ClientError::Request(format!("Body read error: {e}")))?;
        PuzzlePayload::from_json(&text).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

fn daily_url(base: &str) -> String {
    format!("{base}/puzzle/daily")
}

fn puzzle_url(base: &str, id: &str) -> String {
    format!("{base}/puzzle/{id}")
}

pub fn pick_puzzle_id<'a, G: Rng + ?Sized>(pool: &'a [String], rng: &mut G) -> Option<&'a str> {
    pool.choose(rng).map(String::as_str)
}
