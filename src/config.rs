use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta};
use thiserror::Error;

use crate::catalog::SlotCatalog;
use crate::limits::*;
use crate::timewindow::ParseError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error("invalid slot catalog in LIBSCHED_SLOTS: {0}")]
    Slots(#[from] ParseError),
}

/// Booking policy handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Single source of truth for the check-in window and the no-show threshold.
    pub grace_period: TimeDelta,
    pub daily_limit: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            grace_period: TimeDelta::milliseconds(DEFAULT_GRACE_PERIOD_MS),
            daily_limit: MAX_ACTIVE_BOOKINGS_PER_DAY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub policy: Policy,
    pub sweep_interval: Duration,
    pub catalog: SlotCatalog,
    pub mock_time: Option<NaiveDateTime>,
    pub metrics_port: Option<u16>,
    pub seed_demo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: Policy::default(),
            sweep_interval: Duration::from_millis(DEFAULT_SWEEP_INTERVAL_MS),
            catalog: SlotCatalog::standard(),
            mock_time: None,
            metrics_port: None,
            seed_demo: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(ms) = parse_var::<i64, _>(&lookup, "LIBSCHED_GRACE_PERIOD_MS")? {
            if !(0..=MAX_GRACE_PERIOD_MS).contains(&ms) {
                return Err(invalid("LIBSCHED_GRACE_PERIOD_MS", ms.to_string()));
            }
            config.policy.grace_period = TimeDelta::milliseconds(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "LIBSCHED_SWEEP_INTERVAL_MS")? {
            if ms == 0 {
                return Err(invalid("LIBSCHED_SWEEP_INTERVAL_MS", ms.to_string()));
            }
            config.sweep_interval = Duration::from_millis(ms);
        }
        if let Some(limit) = parse_var::<usize, _>(&lookup, "LIBSCHED_DAILY_LIMIT")? {
            config.policy.daily_limit = limit;
        }
        if let Some(labels) = lookup("LIBSCHED_SLOTS") {
            config.catalog =
                SlotCatalog::from_labels(labels.split(';').filter(|l| !l.trim().is_empty()))?;
        }
        if let Some(raw) = lookup("LIBSCHED_MOCK_TIME") {
            let parsed = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S")
                .map_err(|_| invalid("LIBSCHED_MOCK_TIME", raw.clone()))?;
            config.mock_time = Some(parsed);
        }
        config.metrics_port = parse_var(&lookup, "LIBSCHED_METRICS_PORT")?;
        if let Some(seed) = parse_var::<bool, _>(&lookup, "LIBSCHED_SEED_DEMO")? {
            config.seed_demo = seed;
        }

        Ok(config)
    }
}

fn invalid(var: &'static str, value: String) -> ConfigError {
    ConfigError::Invalid { var, value }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(var, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.policy.grace_period, TimeDelta::minutes(15));
        assert_eq!(config.policy.daily_limit, 2);
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.catalog.len(), 8);
        assert!(config.seed_demo);
        assert!(config.mock_time.is_none());
    }

    #[test]
    fn overrides_from_environment() {
        let config = Config::from_lookup(lookup_from(&[
            ("LIBSCHED_GRACE_PERIOD_MS", "60000"),
            ("LIBSCHED_SWEEP_INTERVAL_MS", "5000"),
            ("LIBSCHED_DAILY_LIMIT", "3"),
            ("LIBSCHED_SLOTS", "8:00 AM - 9:00 AM; 9:00 AM - 10:00 AM"),
            ("LIBSCHED_MOCK_TIME", "2024-01-15 09:05:00"),
            ("LIBSCHED_METRICS_PORT", "9100"),
            ("LIBSCHED_SEED_DEMO", "false"),
        ]))
        .unwrap();
        assert_eq!(config.policy.grace_period, TimeDelta::minutes(1));
        assert_eq!(config.sweep_interval, Duration::from_secs(5));
        assert_eq!(config.policy.daily_limit, 3);
        assert_eq!(config.catalog.len(), 2);
        assert!(config.catalog.get("8:00 AM - 9:00 AM").is_some());
        assert_eq!(
            config.mock_time.unwrap().to_string(),
            "2024-01-15 09:05:00"
        );
        assert_eq!(config.metrics_port, Some(9100));
        assert!(!config.seed_demo);
    }

    #[test]
    fn rejects_bad_values() {
        let err = Config::from_lookup(lookup_from(&[("LIBSCHED_GRACE_PERIOD_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "LIBSCHED_GRACE_PERIOD_MS",
                ..
            }
        ));

        for ms in ["-1", "86400001", "9000000000000000"] {
            let err = Config::from_lookup(lookup_from(&[("LIBSCHED_GRACE_PERIOD_MS", ms)]))
                .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid {
                    var: "LIBSCHED_GRACE_PERIOD_MS",
                    ..
                }
            ));
        }
        let one_day = Config::from_lookup(lookup_from(&[("LIBSCHED_GRACE_PERIOD_MS", "86400000")]))
            .unwrap();
        assert_eq!(one_day.policy.grace_period, TimeDelta::days(1));

        let err = Config::from_lookup(lookup_from(&[("LIBSCHED_SWEEP_INTERVAL_MS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = Config::from_lookup(lookup_from(&[("LIBSCHED_SLOTS", "9 AM - 10 AM")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Slots(_)));
    }
}
