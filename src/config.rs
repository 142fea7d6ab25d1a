use crate::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_REQUEST_INTERVAL_MS: u64 = 1000;
const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub region: String,
    /// Minimum spacing between two outbound requests, shared by every worker.
    pub request_interval: Duration,
    pub workers: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("RIOT_API_KEY").map_err(|_| {
            AppError::ConfigError(
                "RIOT_API_KEY not found in .env file".to_string(),
            )
        })?;

        let region = env::var("RIOT_REGION").unwrap_or_else(|_| "na1".to_string());

        let request_interval = match env::var("RIOT_REQUEST_INTERVAL_MS") {
            Ok(raw) => Duration::from_millis(parse_positive(&raw, "RIOT_REQUEST_INTERVAL_MS")?),
            Err(_) => Duration::from_millis(DEFAULT_REQUEST_INTERVAL_MS),
        };

        let workers = match env::var("LEAGUE_SIGNALS_WORKERS") {
            Ok(raw) => parse_positive(&raw, "LEAGUE_SIGNALS_WORKERS")? as usize,
            Err(_) => DEFAULT_WORKERS,
        };

        Ok(Config {
            api_key,
            region,
            request_interval,
            workers,
        })
    }

    /// Where records go when no `--output` is given.
    pub fn default_output_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".league_signals")
            .join("records.csv")
    }
}

fn parse_positive(raw: &str, name: &str) -> Result<u64, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(AppError::ConfigError(format!(
            "{} must be a positive integer, got {:?}",
            name, raw
        ))),
        Ok(n) => Ok(n),
    }
}
