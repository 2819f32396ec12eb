use dotenvy::dotenv;
use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v9";

/// Should match the browser the account normally uses.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:138.0) Gecko/20100101 Firefox/138.0";

/// Discord search always returns pages of 25 results.
pub const SEARCH_PAGE_SIZE: u64 = 25;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: String,
    pub user_agent: String,
    pub deletion_delay: Duration,
    pub rate_limit_buffer: Duration,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            deletion_delay: Duration::from_secs(1),
            rate_limit_buffer: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Config {
            api_base: env::var("DISCORD_API_BASE")
                .map(|base| base.trim().trim_end_matches('/').to_string())
                .ok()
                .filter(|base| !base.is_empty())
                .unwrap_or(defaults.api_base),
            user_agent: env::var("DISCORD_USER_AGENT")
                .ok()
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or(defaults.user_agent),
            deletion_delay: duration_var("DELETION_DELAY", defaults.deletion_delay)?,
            rate_limit_buffer: duration_var("RATE_LIMIT_BUFFER", defaults.rate_limit_buffer)?,
            request_timeout: duration_var("REQUEST_TIMEOUT", defaults.request_timeout)?,
        })
    }
}

fn duration_var(name: &str, default: Duration) -> anyhow::Result<Duration> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => humantime::parse_duration(raw.trim())
            .map_err(|e| anyhow::anyhow!("{} must be a duration like `1s` or `500ms`: {}", name, e)),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_logic() {
        // 1. Defaults
        for var in [
            "DISCORD_API_BASE",
            "DISCORD_USER_AGENT",
            "DELETION_DELAY",
            "RATE_LIMIT_BUFFER",
            "REQUEST_TIMEOUT",
        ] {
            env::remove_var(var);
        }
        let config = Config::build().unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.deletion_delay, Duration::from_secs(1));
        assert_eq!(config.request_timeout, Duration::from_secs(10));

        // 2. Overrides
        env::set_var("DISCORD_API_BASE", "http://127.0.0.1:9000/api/");
        env::set_var("DELETION_DELAY", "1500ms");
        env::set_var("RATE_LIMIT_BUFFER", "2s");
        let config = Config::build().unwrap();
        assert_eq!(config.api_base, "http://127.0.0.1:9000/api");
        assert_eq!(config.deletion_delay, Duration::from_millis(1500));
        assert_eq!(config.rate_limit_buffer, Duration::from_secs(2));

        // 3. Invalid duration
        env::set_var("REQUEST_TIMEOUT", "soon");
        let err = Config::build().unwrap_err();
        assert!(err.to_string().contains("REQUEST_TIMEOUT"));

        // Cleanup
        env::remove_var("DISCORD_API_BASE");
        env::remove_var("DELETION_DELAY");
        env::remove_var("RATE_LIMIT_BUFFER");
        env::remove_var("REQUEST_TIMEOUT");
    }
}
