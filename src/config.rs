use crate::domain::AvailabilityMode;
use crate::domain::eligibility::DEFAULT_COOLDOWN_DAYS;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/blood_donors";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_PORT: u16 = 3000;

/// 設定値の読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// アプリケーション設定
///
/// 起動時に環境変数から一度だけ構築し、各コンポーネントへ明示的に渡す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub cooldown_days: u32,
    pub availability_mode: AvailabilityMode,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    ///
    /// - `DATABASE_URL`
    /// - `DATABASE_MAX_CONNECTIONS`
    /// - `PORT`
    /// - `DONOR_COOLDOWN_DAYS`
    /// - `DONOR_AVAILABILITY_MODE` (`explicit` | `derive`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー検索関数から設定を読み込む
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());

        let database_max_connections = parse_or(
            &lookup,
            "DATABASE_MAX_CONNECTIONS",
            "an integer",
            DEFAULT_MAX_CONNECTIONS,
        )?;
        let port = parse_or(&lookup, "PORT", "a port number", DEFAULT_PORT)?;
        let cooldown_days = parse_or(
            &lookup,
            "DONOR_COOLDOWN_DAYS",
            "a non-negative integer",
            DEFAULT_COOLDOWN_DAYS,
        )?;
        let availability_mode = parse_or(
            &lookup,
            "DONOR_AVAILABILITY_MODE",
            "\"explicit\" or \"derive\"",
            AvailabilityMode::default(),
        )?;

        Ok(Self {
            database_url,
            database_max_connections,
            port,
            cooldown_days,
            availability_mode,
        })
    }
}

fn parse_or<F, T>(
    lookup: &F,
    key: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key,
                expected,
                value,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.port, 3000);
        assert_eq!(config.cooldown_days, 90);
        assert_eq!(config.availability_mode, AvailabilityMode::RequireExplicit);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://db/donors"),
            ("PORT", "8080"),
            ("DONOR_COOLDOWN_DAYS", "56"),
            ("DONOR_AVAILABILITY_MODE", "derive"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "postgres://db/donors");
        assert_eq!(config.port, 8080);
        assert_eq!(config.cooldown_days, 56);
        assert_eq!(config.availability_mode, AvailabilityMode::DeriveFromDate);
    }

    #[test]
    fn test_negative_cooldown_is_rejected() {
        let err = config_from(&[("DONOR_COOLDOWN_DAYS", "-1")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "DONOR_COOLDOWN_DAYS must be a non-negative integer, got \"-1\""
        );
    }

    #[test]
    fn test_unknown_availability_mode_is_rejected() {
        assert!(config_from(&[("DONOR_AVAILABILITY_MODE", "auto")]).is_err());
    }
}
