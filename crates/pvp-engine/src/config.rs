//! Arena configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ArenaError;
use crate::strategy::StrategyBase;

/// Timing and opponent settings for an `Arena`.
///
/// Durations are written in milliseconds when loaded from JSON:
///
/// ```json
/// { "matchmakingDelayMs": 2500, "opponentIntervalMs": 4000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArenaConfig {
    /// Simulated time to find an opponent. Default: 2.5s.
    #[serde(rename = "matchmakingDelayMs", with = "duration_ms")]
    pub matchmaking_delay: Duration,
    /// Give up on matchmaking after this long. Must exceed the delay.
    /// Default: 30s.
    #[serde(rename = "matchmakingTimeoutMs", with = "duration_ms")]
    pub matchmaking_timeout: Duration,
    /// How often the autonomous opponent checks whether it may move.
    /// Default: 4s.
    #[serde(rename = "opponentIntervalMs", with = "duration_ms")]
    pub opponent_interval: Duration,
    /// Snapshots buffered per subscriber before it starts lagging. Default: 64.
    pub event_capacity: usize,
    /// Move selection for autonomous opponents. Default: Random.
    pub opponent_strategy: StrategyBase,
}

impl ArenaConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ArenaError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks:
    /// - all durations are non-zero
    /// - `matchmaking_timeout > matchmaking_delay` (otherwise every request times out)
    /// - `event_capacity >= 1` (broadcast channels need room for one value)
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.matchmaking_delay.is_zero() {
            return Err(ArenaError::InvalidConfig {
                reason: "matchmaking_delay must be > 0".to_string(),
            });
        }
        if self.matchmaking_timeout <= self.matchmaking_delay {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "matchmaking_timeout ({:?}) must exceed matchmaking_delay ({:?})",
                    self.matchmaking_timeout, self.matchmaking_delay
                ),
            });
        }
        if self.opponent_interval.is_zero() {
            return Err(ArenaError::InvalidConfig {
                reason: "opponent_interval must be > 0".to_string(),
            });
        }
        if self.event_capacity == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "event_capacity must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            matchmaking_delay: Duration::from_millis(2500),
            matchmaking_timeout: Duration::from_secs(30),
            opponent_interval: Duration::from_millis(4000),
            event_capacity: 64,
            opponent_strategy: StrategyBase::Random,
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ArenaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.matchmaking_delay, Duration::from_millis(2500));
        assert_eq!(config.opponent_interval, Duration::from_millis(4000));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let config = ArenaConfig {
            opponent_interval: Duration::ZERO,
            ..Default::default()
        };
        match config.validate() {
            Err(ArenaError::InvalidConfig { reason }) => {
                assert!(reason.contains("opponent_interval"));
            }
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_timeout_not_above_delay() {
        let config = ArenaConfig {
            matchmaking_delay: Duration::from_secs(5),
            matchmaking_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let config = ArenaConfig {
            event_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config = ArenaConfig::from_json_str(
            r#"{ "matchmakingDelayMs": 100, "opponentStrategy": "Cheapest" }"#,
        )
        .unwrap();
        assert_eq!(config.matchmaking_delay, Duration::from_millis(100));
        assert_eq!(config.opponent_interval, Duration::from_millis(4000));
        assert_eq!(config.opponent_strategy, StrategyBase::Cheapest);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            ArenaConfig::from_json_str("not json"),
            Err(ArenaError::Config(_))
        ));
        assert!(matches!(
            ArenaConfig::from_json_str(r#"{ "eventCapacity": 0 }"#),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_json_round_trip_uses_millis() {
        let json = serde_json::to_value(ArenaConfig::default()).unwrap();
        assert_eq!(json["matchmakingDelayMs"], 2500);
        assert_eq!(json["matchmakingTimeoutMs"], 30000);
    }
}
