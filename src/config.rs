//! Runtime tuning read from the environment.
//!
//! Values come from `WNDW_*` variables (a `.env` file in the working
//! directory is loaded first). Unset variables use the defaults below.

use std::time::Duration;

pub const DEFAULT_WHEEL_SCALE: f64 = 10.0;
pub const DEFAULT_PAN_STEP: f64 = 50.0;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;
pub const DEFAULT_DOCK_MARGIN: u32 = 40;
pub const DEFAULT_TOPOLOGY_POLL_MS: u64 = 2000;
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Pan distance per wheel notch while Meta and Alt are held.
    pub wheel_scale: f64,
    /// Pan distance of the pan-left / pan-right hotkeys.
    pub pan_step: f64,
    /// How long the viewport gets to clear its last frame before hiding.
    pub settle_delay: Duration,
    /// Distance of the docked viewport from the display's bottom-right corner.
    pub dock_margin: u32,
    pub topology_poll_interval: Duration,
    /// Time between two captured frames of the shared display.
    pub frame_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wheel_scale: DEFAULT_WHEEL_SCALE,
            pan_step: DEFAULT_PAN_STEP,
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            dock_margin: DEFAULT_DOCK_MARGIN,
            topology_poll_interval: Duration::from_millis(DEFAULT_TOPOLOGY_POLL_MS),
            frame_interval: Duration::from_millis(DEFAULT_FRAME_INTERVAL_MS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::info!("[CONFIG] Loaded {}", path.display());
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let settle_ms = parse(&lookup, "WNDW_SETTLE_DELAY_MS", DEFAULT_SETTLE_DELAY_MS)?;
        let poll_ms = nonzero_ms(&lookup, "WNDW_TOPOLOGY_POLL_MS", DEFAULT_TOPOLOGY_POLL_MS)?;
        let frame_ms = nonzero_ms(&lookup, "WNDW_FRAME_INTERVAL_MS", DEFAULT_FRAME_INTERVAL_MS)?;

        let config = Self {
            wheel_scale: parse(&lookup, "WNDW_WHEEL_SCALE", defaults.wheel_scale)?,
            pan_step: parse(&lookup, "WNDW_PAN_STEP", defaults.pan_step)?,
            settle_delay: Duration::from_millis(settle_ms),
            dock_margin: parse(&lookup, "WNDW_DOCK_MARGIN", defaults.dock_margin)?,
            topology_poll_interval: Duration::from_millis(poll_ms),
            frame_interval: Duration::from_millis(frame_ms),
        };

        if !config.wheel_scale.is_finite() {
            return Err(ConfigError::Invalid {
                name: "WNDW_WHEEL_SCALE",
                value: config.wheel_scale.to_string(),
            });
        }
        if !config.pan_step.is_finite() {
            return Err(ConfigError::Invalid {
                name: "WNDW_PAN_STEP",
                value: config.pan_step.to_string(),
            });
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

// Intervals drive tokio timers, which reject a zero period.
fn nonzero_ms(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    let value = parse(lookup, name, default)?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            name,
            value: "0".into(),
        });
    }
    Ok(value)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.settle_delay, Duration::from_millis(100));
        assert_eq!(config.dock_margin, 40);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("WNDW_WHEEL_SCALE", "4.5"),
            ("WNDW_PAN_STEP", " 80 "),
            ("WNDW_SETTLE_DELAY_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.wheel_scale, 4.5);
        assert_eq!(config.pan_step, 80.0);
        assert_eq!(config.settle_delay, Duration::from_millis(250));
    }

    #[test]
    fn garbage_names_the_variable() {
        let err = Config::from_lookup(lookup(&[("WNDW_DOCK_MARGIN", "-3")])).unwrap_err();
        assert!(err.to_string().contains("WNDW_DOCK_MARGIN"));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        assert!(Config::from_lookup(lookup(&[("WNDW_TOPOLOGY_POLL_MS", "0")])).is_err());
    }

    #[test]
    fn frame_interval_defaults_and_rejects_zero() {
        let config = Config::from_lookup(lookup(&[("WNDW_FRAME_INTERVAL_MS", "40")])).unwrap();
        assert_eq!(config.frame_interval, Duration::from_millis(40));
        assert_eq!(Config::default().frame_interval, Duration::from_millis(100));

        let err = Config::from_lookup(lookup(&[("WNDW_FRAME_INTERVAL_MS", "0")])).unwrap_err();
        assert!(err.to_string().contains("WNDW_FRAME_INTERVAL_MS"));
    }
}
