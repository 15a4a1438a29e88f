use clap::Parser;
use thiserror::Error;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "rategate")]
#[command(about = "In-memory request rate limiting gateway")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Tracker cleanup sweep interval in seconds
    #[arg(long, default_value_t = 3600)]
    pub sweep_interval: u64,

    // Default limit: max requests per window
    #[arg(long, default_value_t = 100)]
    pub points: u32,

    // Default limit: window length in seconds
    #[arg(long, default_value_t = 60)]
    pub duration: i64,

    // Default limit: block duration in seconds
    #[arg(long, default_value_t = 900)]
    pub block_duration: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("points must be at least 1")]
    ZeroPoints,
    #[error("duration must be positive, got {0}s")]
    NonPositiveDuration(i64),
    #[error("block duration must not be negative, got {0}s")]
    NegativeBlockDuration(i64),
}

/// Limits applied to one route group: `points` requests per rolling
/// `duration_secs` window. A key that exceeds the quota is rejected outright
/// for `block_duration_secs`, regardless of the window count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub points: u32,
    pub duration_secs: i64,
    pub block_duration_secs: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            points: 100,
            duration_secs: 60,
            block_duration_secs: 900,
        }
    }
}

impl RateLimitConfig {
    pub fn new(points: u32, duration_secs: i64, block_duration_secs: i64) -> Self {
        Self {
            points,
            duration_secs,
            block_duration_secs,
        }
    }

    // Login: 5 attempts per 15 minutes, 1 hour block
    pub fn login() -> Self {
        Self::new(5, 900, 3600)
    }

    // Password reset: 3 attempts per hour, 24 hour block
    pub fn password_reset() -> Self {
        Self::new(3, 3600, 86400)
    }

    // General API access: 100 requests per hour
    pub fn api_access() -> Self {
        Self {
            points: 100,
            duration_secs: 3600,
            ..Self::default()
        }
    }

    /// Checked once at startup/registration; an invalid config reaching the
    /// per-request path is treated as an internal failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.points == 0 {
            return Err(ConfigError::ZeroPoints);
        }
        if self.duration_secs <= 0 {
            return Err(ConfigError::NonPositiveDuration(self.duration_secs));
        }
        if self.block_duration_secs < 0 {
            return Err(ConfigError::NegativeBlockDuration(self.block_duration_secs));
        }
        Ok(())
    }

    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.duration_secs)
    }

    pub fn block(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.block_duration_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RateLimitConfig::default();
        assert_eq!(config.points, 100);
        assert_eq!(config.duration_secs, 60);
        assert_eq!(config.block_duration_secs, 900);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn presets_are_valid() {
        for config in [
            RateLimitConfig::login(),
            RateLimitConfig::password_reset(),
            RateLimitConfig::api_access(),
        ] {
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn login_preset_values() {
        let config = RateLimitConfig::login();
        assert_eq!(config.points, 5);
        assert_eq!(config.duration_secs, 900);
        assert_eq!(config.block_duration_secs, 3600);
    }

    #[test]
    fn api_access_keeps_default_block_duration() {
        let config = RateLimitConfig::api_access();
        assert_eq!(config.points, 100);
        assert_eq!(config.duration_secs, 3600);
        assert_eq!(config.block_duration_secs, 900);
    }

    #[test]
    fn rejects_zero_points() {
        let config = RateLimitConfig::new(0, 60, 900);
        assert_eq!(config.validate(), Err(ConfigError::ZeroPoints));
    }

    #[test]
    fn rejects_non_positive_duration() {
        let config = RateLimitConfig::new(5, 0, 900);
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveDuration(0)));
        let config = RateLimitConfig::new(5, -10, 900);
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveDuration(-10)));
    }

    #[test]
    fn rejects_negative_block_duration() {
        let config = RateLimitConfig::new(5, 60, -1);
        assert_eq!(config.validate(), Err(ConfigError::NegativeBlockDuration(-1)));
    }

    #[test]
    fn zero_block_duration_is_allowed() {
        // blockDuration = 0 means an exceeded key is never locked out beyond
        // the window itself
        assert!(RateLimitConfig::new(5, 60, 0).validate().is_ok());
    }
}
