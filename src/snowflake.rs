use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

/// Milliseconds between the Unix epoch and the first second of 2015.
pub const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SnowflakeError {
    #[error("snowflake is empty")]
    Empty,
    #[error("snowflake must be a non-zero number, got `{0}`")]
    Invalid(String),
}

/// Discord identifier. Newer objects have larger IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Snowflake(NonZeroU64);

pub type MessageId = Snowflake;

impl Snowflake {
    pub fn new(value: u64) -> Option<Self> {
        NonZeroU64::new(value).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// Creation time encoded in the upper 42 bits.
    pub fn created_at(self) -> DateTime<Utc> {
        let millis = (self.get() >> 22) + DISCORD_EPOCH_MS;
        Utc.timestamp_millis_opt(millis as i64)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// The next ID up, used as an exclusive upper bound that keeps `self` in range.
    pub fn successor(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The next ID down, used as an exclusive lower bound. `None` for the smallest ID.
    pub fn predecessor(self) -> Option<Self> {
        Self::new(self.get() - 1)
    }
}

impl FromStr for Snowflake {
    type Err = SnowflakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SnowflakeError::Empty);
        }
        s.parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| SnowflakeError::Invalid(s.to_string()))
    }
}

impl TryFrom<String> for Snowflake {
    type Error = SnowflakeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
