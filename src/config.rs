use crate::error::ConfigError;
use std::net::SocketAddr;
use std::time::Duration;

/// Walker configuration
///
/// Every tunable lives here; there is no process-wide mutable resolver
/// state. The nameserver list starts out as public recursors and is
/// replaced with the zone's own authoritative servers once discovered.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Nameservers queries are sent to (one picked at random per query)
    pub nameservers: Vec<SocketAddr>,

    /// Timeout for a single query attempt
    pub query_timeout: Duration,

    /// Attempts per query before the caller moves on
    pub max_retries: u8,

    /// NSEC3 probing parameters
    pub nsec3: Nsec3Config,
}

#[derive(Debug, Clone)]
pub struct Nsec3Config {
    /// Hard cap on probe queries for one run
    pub max_attempts: usize,

    /// Stop once this fraction of the hashed keyspace is covered
    pub stop_coverage: f64,

    /// Lower coverage target that applies after `early_stop_attempts`
    /// probes have been spent (large zones rarely reach `stop_coverage`)
    pub early_stop_coverage: f64,

    /// Probe count after which `early_stop_coverage` is good enough
    pub early_stop_attempts: usize,

    /// Bound on candidate regenerations per probe; hitting it means the
    /// discovered ranges already blanket the keyspace
    pub max_candidate_attempts: usize,

    /// Output path for the crackable hash lines
    pub hashes_path: String,

    /// Output path for the hash-to-record-types map
    pub map_path: String,
}

impl Default for Nsec3Config {
    fn default() -> Self {
        Self {
            max_attempts: 10_000,
            stop_coverage: 0.99,
            early_stop_coverage: 0.90,
            early_stop_attempts: 1_000,
            max_candidate_attempts: 1_000,
            hashes_path: "nsec3.hashes".to_string(),
            map_path: "nsec3.map".to_string(),
        }
    }
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            nameservers: vec![
                "1.1.1.1:53".parse().expect("Cloudflare DNS is valid"),
                "8.8.8.8:53".parse().expect("Google DNS is valid"),
            ],
            query_timeout: Duration::from_secs(3),
            max_retries: 3,
            nsec3: Nsec3Config::default(),
        }
    }
}

impl WalkerConfig {
    /// Create a WalkerConfig from environment variables
    /// Returns Err if a present variable fails to parse
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(nameservers) = std::env::var("RATATOSKR_NAMESERVERS") {
            let servers: Result<Vec<SocketAddr>, _> = nameservers
                .split(',')
                .map(|s| {
                    s.trim()
                        .parse::<SocketAddr>()
                        .map_err(|_| ConfigError::InvalidNameserver(s.to_string()))
                })
                .collect();

            let servers = servers?;
            if servers.is_empty() {
                return Err(ConfigError::InvalidNameserver(
                    "No valid nameservers provided".to_string(),
                ));
            }
            config.nameservers = servers;
        }

        if let Ok(timeout_str) = std::env::var("RATATOSKR_QUERY_TIMEOUT") {
            let timeout_secs = timeout_str
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(timeout_str.clone()))?;
            if timeout_secs == 0 {
                return Err(ConfigError::InvalidTimeout(
                    "Timeout must be greater than 0".to_string(),
                ));
            }
            config.query_timeout = Duration::from_secs(timeout_secs);
        }

        if let Ok(retries) = std::env::var("RATATOSKR_MAX_RETRIES") {
            config.max_retries = retries
                .parse::<u8>()
                .map_err(|_| ConfigError::ParseError(format!("Invalid retry count: {}", retries)))?;
        }

        if let Ok(attempts) = std::env::var("RATATOSKR_NSEC3_MAX_ATTEMPTS") {
            config.nsec3.max_attempts = attempts.parse::<usize>().map_err(|_| {
                ConfigError::ParseError(format!("Invalid max attempts: {}", attempts))
            })?;
        }

        if let Ok(coverage) = std::env::var("RATATOSKR_NSEC3_STOP_COVERAGE") {
            config.nsec3.stop_coverage = parse_coverage(&coverage)?;
        }

        if let Ok(coverage) = std::env::var("RATATOSKR_NSEC3_EARLY_STOP_COVERAGE") {
            config.nsec3.early_stop_coverage = parse_coverage(&coverage)?;
        }

        if let Ok(attempts) = std::env::var("RATATOSKR_NSEC3_EARLY_STOP_ATTEMPTS") {
            config.nsec3.early_stop_attempts = attempts.parse::<usize>().map_err(|_| {
                ConfigError::ParseError(format!("Invalid early stop attempts: {}", attempts))
            })?;
        }

        if let Ok(path) = std::env::var("RATATOSKR_NSEC3_HASHES_PATH") {
            config.nsec3.hashes_path = path;
        }

        if let Ok(path) = std::env::var("RATATOSKR_NSEC3_MAP_PATH") {
            config.nsec3.map_path = path;
        }

        Ok(config)
    }
}

fn parse_coverage(value: &str) -> Result<f64, ConfigError> {
    let parsed = value
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidThreshold(value.to_string()))?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(ConfigError::InvalidThreshold(format!(
            "Coverage must be within [0, 1], got {}",
            parsed
        )));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WalkerConfig::default();
        assert_eq!(config.max_retries, 3);
        assert!(!config.nameservers.is_empty());
        assert!(config.nsec3.stop_coverage > config.nsec3.early_stop_coverage);
    }

    #[test]
    fn test_coverage_bounds() {
        assert!(parse_coverage("0.95").is_ok());
        assert!(parse_coverage("1.5").is_err());
        assert!(parse_coverage("banana").is_err());
    }
}
