use std::env;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_FEED_URL: &str = "wss://pumpportal.fun/api/data";
const DEFAULT_SNAPSHOT_PATH: &str = "data/pumpswap_price_data.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("{0} must name at least one token mint")]
    NoTrackedMints(&'static str),
}

#[derive(Debug)]
pub struct Config {
    pub feed_url: String,
    pub api_key: String,
    pub tracked_mints: Vec<String>,
    pub snapshot_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let feed_url =
            env::var("PUMPPORTAL_WS_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string());
        let api_key = env::var("PUMPPORTAL_API_KEY")
            .map_err(|_| ConfigError::MissingVar("PUMPPORTAL_API_KEY"))?;
        let tracked_mints = parse_mint_list(
            &env::var("TRACKED_MINTS").map_err(|_| ConfigError::MissingVar("TRACKED_MINTS"))?,
        );
        if tracked_mints.is_empty() {
            return Err(ConfigError::NoTrackedMints("TRACKED_MINTS"));
        }
        let snapshot_path = env::var("PRICE_SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SNAPSHOT_PATH));

        Ok(Config {
            feed_url,
            api_key,
            tracked_mints,
            snapshot_path,
        })
    }
}

fn parse_mint_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("a,b,c", &["a", "b", "c"] ; "plain")]
    #[test_case(" a , b ", &["a", "b"] ; "trimmed")]
    #[test_case("a,,b,", &["a", "b"] ; "empty_segments")]
    #[test_case("", &[] ; "empty_string")]
    fn parses_mint_lists(value: &str, expected: &[&str]) {
        assert_eq!(parse_mint_list(value), expected);
    }
}
