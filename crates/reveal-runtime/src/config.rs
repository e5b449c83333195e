#![forbid(unsafe_code)]

//! Page configuration (deterministic, env-overridable).
//!
//! # Environment Variables
//! - `REVEAL_COUNTER_DURATION_MS` (u64, > 0)
//! - `REVEAL_COUNTER_START` (f64)
//! - `REVEAL_COUNTER_EASING` = linear|ease-out-quad|ease-out-cubic|ease-out-quart|...
//! - `REVEAL_REVEAL_THRESHOLD` (f64 in [0, 1])
//! - `REVEAL_REVEAL_ROOT_MARGIN` (CSS margin shorthand)
//! - `REVEAL_COUNTER_THRESHOLD` (f64 in [0, 1])
//! - `REVEAL_COUNTER_ROOT_MARGIN` (CSS margin shorthand)
//! - `REVEAL_CLASS` (string)
//! - `REVEAL_LOADED_CLASS` (string)
//! - `REVEAL_LOADED_DELAY_MS` (u64)
//!
//! The wasm host passes the same keys as a JSON object with the `REVEAL_`
//! prefix removed and lowercased (`{"counter_duration_ms": 900}`).

use core::fmt;
use std::env;
use std::time::Duration;

use reveal_core::{Easing, ObserverOptions, RootMargin};
use tracing::warn;

use crate::animator::CounterDefaults;

#[cfg(feature = "host-json")]
const ENV_PREFIX: &str = "REVEAL_";
const ENV_COUNTER_DURATION_MS: &str = "REVEAL_COUNTER_DURATION_MS";
const ENV_COUNTER_START: &str = "REVEAL_COUNTER_START";
const ENV_COUNTER_EASING: &str = "REVEAL_COUNTER_EASING";
const ENV_REVEAL_THRESHOLD: &str = "REVEAL_REVEAL_THRESHOLD";
const ENV_REVEAL_ROOT_MARGIN: &str = "REVEAL_REVEAL_ROOT_MARGIN";
const ENV_COUNTER_THRESHOLD: &str = "REVEAL_COUNTER_THRESHOLD";
const ENV_COUNTER_ROOT_MARGIN: &str = "REVEAL_COUNTER_ROOT_MARGIN";
const ENV_CLASS: &str = "REVEAL_CLASS";
const ENV_LOADED_CLASS: &str = "REVEAL_LOADED_CLASS";
const ENV_LOADED_DELAY_MS: &str = "REVEAL_LOADED_DELAY_MS";

/// Page-level settings for reveals, counters, and the loaded marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub counter_duration: Duration,
    pub counter_start: f64,
    pub counter_easing: Easing,
    /// Observer for fade-in / slide-in elements.
    pub reveal: ObserverOptions,
    /// Observer for metric counters.
    pub counters: ObserverOptions,
    /// Class added to a reveal element when it activates.
    pub reveal_class: String,
    /// Class added to the page root once the loaded delay elapses.
    pub loaded_class: String,
    pub loaded_delay: Duration,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            counter_duration: Duration::from_millis(1500),
            counter_start: 0.0,
            counter_easing: Easing::EaseOutQuart,
            reveal: ObserverOptions {
                threshold: 0.1,
                root_margin: RootMargin::px(0.0, 0.0, -50.0, 0.0),
            },
            counters: ObserverOptions {
                threshold: 0.5,
                root_margin: RootMargin::ZERO,
            },
            reveal_class: "animate-in".to_owned(),
            loaded_class: "loaded".to_owned(),
            loaded_delay: Duration::from_millis(500),
        }
    }
}

/// Configuration parse diagnostics (env + validation).
#[derive(Debug, Clone)]
pub struct PageConfigParse {
    pub config: PageConfig,
    pub errors: Vec<ConfigError>,
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl PageConfig {
    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> PageConfig {
        let parsed = Self::from_env_with_diagnostics();
        for err in &parsed.errors {
            warn!(field = err.field, value = %err.value, "ignoring config override: {}", err.message);
        }
        parsed.config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> PageConfigParse {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parse config through a custom key lookup. Invalid values keep their
    /// defaults and are reported in `errors`.
    #[must_use]
    pub fn from_lookup<F>(get: F) -> PageConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        from_lookup_with(get)
    }

    /// Parse a JSON object whose keys are the env names without the
    /// `REVEAL_` prefix, lowercased. Values may be strings, numbers, or
    /// booleans.
    #[cfg(feature = "host-json")]
    pub fn from_json(json: &str) -> Result<PageConfigParse, ConfigError> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| ConfigError::new("config", json, e.to_string()))?;
        Ok(from_lookup_with(|key| {
            let short = key.strip_prefix(ENV_PREFIX).unwrap_or(key).to_ascii_lowercase();
            map.get(&short).and_then(|value| match value {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                serde_json::Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
        }))
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        if self.counter_duration.is_zero() {
            errors.push(ConfigError::new(
                "counter_duration",
                "0",
                "must be positive",
            ));
        }
        if !self.counter_start.is_finite() {
            errors.push(ConfigError::new(
                "counter_start",
                self.counter_start.to_string(),
                "must be finite",
            ));
        }
        validate_threshold("reveal_threshold", self.reveal.threshold, &mut errors);
        validate_threshold("counter_threshold", self.counters.threshold, &mut errors);
        validate_class("reveal_class", &self.reveal_class, &mut errors);
        validate_class("loaded_class", &self.loaded_class, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Defaults for counters started from labels.
    #[must_use]
    pub fn counter_defaults(&self) -> CounterDefaults {
        CounterDefaults {
            start: self.counter_start,
            duration: self.counter_duration,
            easing: self.counter_easing,
        }
    }

    #[must_use]
    pub fn with_counter_duration(mut self, duration: Duration) -> Self {
        self.counter_duration = duration;
        self
    }

    #[must_use]
    pub fn with_counter_easing(mut self, easing: Easing) -> Self {
        self.counter_easing = easing;
        self
    }

    #[must_use]
    pub fn with_reveal_options(mut self, options: ObserverOptions) -> Self {
        self.reveal = options;
        self
    }

    #[must_use]
    pub fn with_counter_options(mut self, options: ObserverOptions) -> Self {
        self.counters = options;
        self
    }

    #[must_use]
    pub fn with_loaded_delay(mut self, delay: Duration) -> Self {
        self.loaded_delay = delay;
        self
    }

    /// Short human-readable summary for logs.
    #[must_use]
    pub fn summary_short(&self) -> String {
        format!(
            "counters: {}ms {} @{} · reveal: {} @{}",
            self.counter_duration.as_millis(),
            self.counter_easing,
            self.counters.threshold,
            self.reveal_class,
            self.reveal.threshold,
        )
    }
}

fn from_lookup_with<F>(mut get: F) -> PageConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = PageConfig::default();
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_COUNTER_DURATION_MS) {
        match parse_u64(&value).filter(|&ms| ms > 0) {
            Some(ms) => config.counter_duration = Duration::from_millis(ms),
            None => errors.push(ConfigError::new(
                "counter_duration_ms",
                value,
                "expected positive integer",
            )),
        }
    }

    if let Some(value) = get(ENV_COUNTER_START) {
        match parse_f64(&value) {
            Some(start) => config.counter_start = start,
            None => errors.push(ConfigError::new(
                "counter_start",
                value,
                "expected finite number",
            )),
        }
    }

    if let Some(value) = get(ENV_COUNTER_EASING) {
        match Easing::parse(&value) {
            Some(easing) => config.counter_easing = easing,
            None => errors.push(ConfigError::new(
                "counter_easing",
                value,
                "expected linear|ease-out-quad|ease-out-cubic|ease-out-quart|ease-out-quint|ease-in-out-quart|ease-out-expo",
            )),
        }
    }

    if let Some(value) = get(ENV_REVEAL_THRESHOLD) {
        match parse_threshold(&value) {
            Some(t) => config.reveal.threshold = t,
            None => errors.push(ConfigError::new(
                "reveal_threshold",
                value,
                "expected number in [0, 1]",
            )),
        }
    }

    if let Some(value) = get(ENV_REVEAL_ROOT_MARGIN) {
        match RootMargin::parse(&value) {
            Ok(margin) => config.reveal.root_margin = margin,
            Err(err) => errors.push(ConfigError::new("reveal_root_margin", value, err.to_string())),
        }
    }

    if let Some(value) = get(ENV_COUNTER_THRESHOLD) {
        match parse_threshold(&value) {
            Some(t) => config.counters.threshold = t,
            None => errors.push(ConfigError::new(
                "counter_threshold",
                value,
                "expected number in [0, 1]",
            )),
        }
    }

    if let Some(value) = get(ENV_COUNTER_ROOT_MARGIN) {
        match RootMargin::parse(&value) {
            Ok(margin) => config.counters.root_margin = margin,
            Err(err) => errors.push(ConfigError::new(
                "counter_root_margin",
                value,
                err.to_string(),
            )),
        }
    }

    if let Some(value) = get(ENV_CLASS) {
        match parse_class(&value) {
            Some(class) => config.reveal_class = class,
            None => errors.push(ConfigError::new(
                "reveal_class",
                value,
                "expected non-empty class name without whitespace",
            )),
        }
    }

    if let Some(value) = get(ENV_LOADED_CLASS) {
        match parse_class(&value) {
            Some(class) => config.loaded_class = class,
            None => errors.push(ConfigError::new(
                "loaded_class",
                value,
                "expected non-empty class name without whitespace",
            )),
        }
    }

    if let Some(value) = get(ENV_LOADED_DELAY_MS) {
        match parse_u64(&value) {
            Some(ms) => config.loaded_delay = Duration::from_millis(ms),
            None => errors.push(ConfigError::new(
                "loaded_delay_ms",
                value,
                "expected non-negative integer",
            )),
        }
    }

    PageConfigParse { config, errors }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_threshold(value: &str) -> Option<f64> {
    parse_f64(value).filter(|v| (0.0..=1.0).contains(v))
}

fn parse_class(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn validate_threshold(field: &'static str, value: f64, errors: &mut Vec<ConfigError>) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ConfigError::new(field, value.to_string(), "must be in [0, 1]"));
    }
}

fn validate_class(field: &'static str, value: &str, errors: &mut Vec<ConfigError>) {
    if parse_class(value).as_deref() != Some(value) {
        errors.push(ConfigError::new(
            field,
            value,
            "must be a non-empty class name without whitespace",
        ));
    }
}
