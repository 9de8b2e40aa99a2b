//! Runtime configuration shared across the execution loop and workers.
use std::str::FromStr;
use std::time::Duration;

/// Tunables for the execution loop, the sensor worker and the event bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Pause between two ticks of the execution loop.
    pub tick_interval: Duration,
    /// Period of the sensor worker.
    pub fact_refresh_interval: Duration,
    /// Poll period used by bounded waits inside goals.
    pub wait_poll_interval: Duration,
    pub event_buffer_size: usize,
    /// Stop the loop when a goal announces `abort = true`.
    pub stop_on_abort: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            fact_refresh_interval: Duration::from_millis(20),
            wait_poll_interval: Duration::from_millis(10),
            event_buffer_size: 100,
            stop_on_abort: true,
        }
    }
}

impl RuntimeConfig {
    /// Reads `GOAP_*` overrides from the process environment.
    ///
    /// Unset or unparsable variables keep their default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, fallback: Duration| {
            read_var::<u64>(&lookup, key)
                .map(Duration::from_millis)
                .unwrap_or(fallback)
        };

        Self {
            tick_interval: millis("GOAP_TICK_MS", defaults.tick_interval),
            fact_refresh_interval: millis("GOAP_FACT_REFRESH_MS", defaults.fact_refresh_interval),
            wait_poll_interval: millis("GOAP_WAIT_POLL_MS", defaults.wait_poll_interval),
            event_buffer_size: read_var(&lookup, "GOAP_EVENT_BUFFER")
                .filter(|size: &usize| *size > 0)
                .unwrap_or(defaults.event_buffer_size),
            stop_on_abort: read_var(&lookup, "GOAP_STOP_ON_ABORT")
                .unwrap_or(defaults.stop_on_abort),
        }
    }
}

fn read_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(target: "goap::config", key, value = %raw, "ignoring unparsable override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        assert_eq!(RuntimeConfig::from_lookup(lookup(&[])), RuntimeConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("GOAP_TICK_MS", "5"),
            ("GOAP_FACT_REFRESH_MS", " 7 "),
            ("GOAP_EVENT_BUFFER", "16"),
            ("GOAP_STOP_ON_ABORT", "false"),
        ]));

        assert_eq!(config.tick_interval, Duration::from_millis(5));
        assert_eq!(config.fact_refresh_interval, Duration::from_millis(7));
        assert_eq!(config.wait_poll_interval, Duration::from_millis(10));
        assert_eq!(config.event_buffer_size, 16);
        assert!(!config.stop_on_abort);
    }

    #[test]
    fn garbage_and_zero_buffer_fall_back() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("GOAP_TICK_MS", "soon"),
            ("GOAP_EVENT_BUFFER", "0"),
        ]));

        assert_eq!(config.tick_interval, Duration::from_millis(50));
        assert_eq!(config.event_buffer_size, 100);
    }
}
