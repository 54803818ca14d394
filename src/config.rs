use std::path::PathBuf;

use crate::analysis::regression::{DEFAULT_SEED, DEFAULT_TEST_FRACTION, SplitConfig};
use crate::analysis::series::PREVIEW_ROWS;

pub const ENV_DATA: &str = "WEATHER_DASHBOARD_DATA";
pub const ENV_SEED: &str = "WEATHER_DASHBOARD_SEED";
pub const ENV_TEST_FRACTION: &str = "WEATHER_DASHBOARD_TEST_FRACTION";

/// Data file used when neither the command line nor the environment names one.
pub const DEFAULT_DATA_FILE: &str = "IndianWeatherRepository.csv";

// ---------------------------------------------------------------------------
// Startup configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub split: SplitConfig,
    pub preview_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            split: SplitConfig::default(),
            preview_rows: PREVIEW_ROWS,
        }
    }
}

impl AppConfig {
    /// Read the process arguments and environment.
    pub fn from_env() -> Self {
        Self::resolve(std::env::args().nth(1), |name| std::env::var(name).ok())
    }

    /// Resolve from an optional positional argument and an environment lookup.
    ///
    /// Precedence for the data file: argument, then `WEATHER_DASHBOARD_DATA`,
    /// then [`DEFAULT_DATA_FILE`]. Unparsable numbers keep their defaults.
    pub fn resolve(arg: Option<String>, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let data_path = arg
            .or_else(|| env(ENV_DATA))
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        let seed = match env(ENV_SEED) {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                log::warn!("{ENV_SEED}={raw} is not an unsigned integer, using {DEFAULT_SEED}");
                DEFAULT_SEED
            }),
            None => DEFAULT_SEED,
        };

        let test_fraction = match env(ENV_TEST_FRACTION) {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(f) if f > 0.0 && f < 1.0 => f,
                _ => {
                    log::warn!(
                        "{ENV_TEST_FRACTION}={raw} must be a number in (0, 1), using {DEFAULT_TEST_FRACTION}"
                    );
                    DEFAULT_TEST_FRACTION
                }
            },
            None => DEFAULT_TEST_FRACTION,
        };

        AppConfig {
            data_path,
            split: SplitConfig {
                test_fraction,
                seed,
            },
            preview_rows: defaults.preview_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_input() {
        assert_eq!(AppConfig::resolve(None, env(&[])), AppConfig::default());
    }

    #[test]
    fn argument_wins_over_environment() {
        let cfg = AppConfig::resolve(
            Some("cli.csv".to_string()),
            env(&[(ENV_DATA, "env.csv")]),
        );
        assert_eq!(cfg.data_path, PathBuf::from("cli.csv"));

        let cfg = AppConfig::resolve(None, env(&[(ENV_DATA, "env.csv")]));
        assert_eq!(cfg.data_path, PathBuf::from("env.csv"));
    }

    #[test]
    fn split_settings_from_environment() {
        let cfg = AppConfig::resolve(
            None,
            env(&[(ENV_SEED, "7"), (ENV_TEST_FRACTION, "0.25")]),
        );
        assert_eq!(cfg.split.seed, 7);
        assert_eq!(cfg.split.test_fraction, 0.25);
    }

    #[test]
    fn invalid_numbers_keep_defaults() {
        let cfg = AppConfig::resolve(
            None,
            env(&[(ENV_SEED, "-3"), (ENV_TEST_FRACTION, "1.5")]),
        );
        assert_eq!(cfg.split, SplitConfig::default());
    }
}
