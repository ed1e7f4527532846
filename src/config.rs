// All tunable simulation constants in one place.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

// Sprites
pub const SPRITE_COUNT: usize = 4;
pub const SPRITE_SIZE: f32 = 120.0;
pub const SEED_MARGIN: f32 = 20.0;

// Motion (px, px/s, px/s^2)
pub const MAX_SPEED: f32 = 90.0;
pub const JITTER_ACCEL: f32 = 40.0;
pub const TURN_FORCE: f32 = 2400.0;
pub const TURN_INTERVAL_MIN: f32 = 1.5;
pub const TURN_INTERVAL_MAX: f32 = 3.5;
pub const INITIAL_SPEED_MIN: f32 = 0.25; // fraction of MAX_SPEED
pub const INITIAL_SPEED_MAX: f32 = 0.5;

// Time
pub const MAX_DT_SECONDS: f32 = 0.05;

// Speed-cap divisor floor.
pub const SPEED_EPSILON: f32 = 1e-6;

// Window
pub const WINDOW_WIDTH: i32 = 720;
pub const WINDOW_HEIGHT: i32 = 900;
pub const HEADER_HEIGHT: f32 = 110.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("bad command line argument: {0}")]
    Argument(String),
}

/// Command line switches of the app.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LaunchOptions {
    pub config_path: Option<String>,
    /// Fixed seed for reproducible motion; entropy when absent.
    pub seed: Option<u64>,
    pub sprite_count: Option<usize>,
    /// Stop the animation after this many seconds.
    pub duration: Option<f64>,
}

impl LaunchOptions {
    pub fn parse_cli<I: IntoIterator<Item = String>>(args: I) -> Result<Self, ConfigError> {
        let mut opts = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = || {
                args.next()
                    .ok_or_else(|| ConfigError::Argument(format!("{arg} expects a value")))
            };
            match arg.as_str() {
                "--config" => opts.config_path = Some(value()?),
                "--seed" => opts.seed = Some(parse_value(&arg, value()?)?),
                "--sprites" => opts.sprite_count = Some(parse_value(&arg, value()?)?),
                "--duration" => opts.duration = Some(parse_value(&arg, value()?)?),
                _ => return Err(ConfigError::Argument(format!("unknown flag {arg}"))),
            }
        }
        Ok(opts)
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, raw: String) -> Result<T, ConfigError> {
    raw.parse()
        .map_err(|_| ConfigError::Argument(format!("{flag}: cannot parse {raw:?}")))
}

/// Immutable motion parameters, fixed when the ensemble is built.
///
/// Deserialises from camelCase JSON; any key left out keeps its default.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SimulationConfig {
    pub sprite_count: usize,
    pub sprite_size: f32,
    pub max_speed: f32,
    pub jitter_accel: f32,
    /// Seconds between turn impulses, drawn uniformly from `[min, max]`.
    pub turn_interval_range: [f32; 2],
    pub turn_force: f32,
    pub max_dt_seconds: f32,
    pub seed_margin: f32,
    /// Initial speed as a fraction of `max_speed`, drawn from `[lo, hi]`.
    pub initial_speed_fraction: [f32; 2],
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sprite_count: SPRITE_COUNT,
            sprite_size: SPRITE_SIZE,
            max_speed: MAX_SPEED,
            jitter_accel: JITTER_ACCEL,
            turn_interval_range: [TURN_INTERVAL_MIN, TURN_INTERVAL_MAX],
            turn_force: TURN_FORCE,
            max_dt_seconds: MAX_DT_SECONDS,
            seed_margin: SEED_MARGIN,
            initial_speed_fraction: [INITIAL_SPEED_MIN, INITIAL_SPEED_MAX],
        }
    }
}

impl SimulationConfig {
    /// Read a (possibly partial) JSON config and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sprite_count == 0 {
            return Err(invalid("spriteCount", "must be at least 1"));
        }
        non_negative("spriteSize", self.sprite_size)?;
        non_negative("maxSpeed", self.max_speed)?;
        non_negative("jitterAccel", self.jitter_accel)?;
        non_negative("turnForce", self.turn_force)?;
        non_negative("seedMargin", self.seed_margin)?;
        if !(self.max_dt_seconds.is_finite() && self.max_dt_seconds > 0.0) {
            return Err(invalid("maxDtSeconds", "must be a positive number"));
        }
        ordered_range("turnIntervalRange", self.turn_interval_range)?;
        ordered_range("initialSpeedFraction", self.initial_speed_fraction)?;
        if self.initial_speed_fraction[1] > 1.0 {
            return Err(invalid("initialSpeedFraction", "upper bound exceeds 1.0"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("expected a finite value >= 0, got {value}")))
    }
}

fn ordered_range(field: &'static str, [lo, hi]: [f32; 2]) -> Result<(), ConfigError> {
    non_negative(field, lo)?;
    non_negative(field, hi)?;
    if lo > hi {
        return Err(invalid(field, format!("range [{lo}, {hi}] is inverted")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{ "spriteCount": 9, "turnIntervalRange": [1.0, 2.0] }"#)
                .unwrap();
        assert_eq!(config.sprite_count, 9);
        assert_eq!(config.turn_interval_range, [1.0, 2.0]);
        assert_eq!(config.max_speed, MAX_SPEED);
        assert_eq!(config.max_dt_seconds, MAX_DT_SECONDS);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed = serde_json::from_str::<SimulationConfig>(r#"{ "spriteCnt": 2 }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn validate_flags_bad_values() {
        let mut config = SimulationConfig::default();
        config.turn_interval_range = [3.0, 1.0];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "turnIntervalRange", .. })
        ));

        let mut config = SimulationConfig::default();
        config.max_dt_seconds = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.max_speed = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.sprite_count = 0;
        assert!(config.validate().is_err());
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_cli_reads_all_flags() {
        let opts = LaunchOptions::parse_cli(args(&[
            "--seed", "42", "--sprites", "6", "--config", "field.json", "--duration", "2.5",
        ]))
        .unwrap();
        assert_eq!(opts.seed, Some(42));
        assert_eq!(opts.sprite_count, Some(6));
        assert_eq!(opts.config_path.as_deref(), Some("field.json"));
        assert_eq!(opts.duration, Some(2.5));
    }

    #[test]
    fn parse_cli_rejects_garbage() {
        assert!(LaunchOptions::parse_cli(args(&["--seed"])).is_err());
        assert!(LaunchOptions::parse_cli(args(&["--seed", "abc"])).is_err());
        assert!(LaunchOptions::parse_cli(args(&["--fast"])).is_err());
        assert_eq!(LaunchOptions::parse_cli(args(&[])).unwrap(), LaunchOptions::default());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = SimulationConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
