//! Runtime configuration
//!
//! Settings come from three places, in increasing precedence for embedders
//! that want them: `RuntimeConfig::default()`, a TOML table
//! (`RuntimeConfig::from_toml_str`), or the process environment
//! (`RuntimeConfig::from_env`).
//!
//! | field            | env var                     | default   |
//! |------------------|-----------------------------|-----------|
//! | `queue_capacity` | `BLACKLIGHT_QUEUE_CAPACITY` | 1024      |
//! | `stack_size`     | `BLACKLIGHT_STACK_SIZE`     | 1 MiB     |
//! | `pool_capacity`  | `BLACKLIGHT_POOL_CAPACITY`  | 10000     |
//! | `workers`        | `BLACKLIGHT_WORKERS`        | 0 (May's) |
//!
//! The coroutine settings (`stack_size`, `pool_capacity`, `workers`) are
//! applied to May once per process, by the first `Runtime` created.

use blacklight_core::DEFAULT_QUEUE_CAPACITY;
use serde::Deserialize;
use tracing::warn;

/// Default coroutine stack size: 1MB (0x100000 bytes).
/// Evaluation recurses through nested blocks, so tasks need more room than
/// a bare coroutine.
pub const DEFAULT_STACK_SIZE: usize = 0x10_0000;

/// Default coroutine pool capacity.
/// May reuses completed coroutine stacks from this pool to avoid allocations.
pub const DEFAULT_POOL_CAPACITY: usize = 10000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Capacity of queues created by `newq`, `co` and the I/O ops
    pub queue_capacity: usize,
    /// Coroutine stack size in bytes
    pub stack_size: usize,
    /// Number of coroutine stacks May keeps for reuse
    pub pool_capacity: usize,
    /// Scheduler worker threads; 0 keeps May's default
    pub workers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            stack_size: DEFAULT_STACK_SIZE,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            workers: 0,
        }
    }
}

/// Parse a positive size from an optional env value.
/// Missing values give the default; zero or garbage warn and give the default.
fn parse_positive(var: &str, value: Option<String>, default: usize) -> usize {
    match value {
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(0) => {
                warn!("{}=0 is invalid, using default {}", var, default);
                default
            }
            Ok(n) => n,
            Err(_) => {
                warn!(
                    "{}='{}' is not a valid number, using default {}",
                    var, raw, default
                );
                default
            }
        },
        None => default,
    }
}

impl RuntimeConfig {
    /// Defaults overridden by any `BLACKLIGHT_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = RuntimeConfig::default();
        let read = |var: &str, default: usize| parse_positive(var, lookup(var), default);
        RuntimeConfig {
            queue_capacity: read("BLACKLIGHT_QUEUE_CAPACITY", defaults.queue_capacity),
            stack_size: read("BLACKLIGHT_STACK_SIZE", defaults.stack_size),
            pool_capacity: read("BLACKLIGHT_POOL_CAPACITY", defaults.pool_capacity),
            // 0 is meaningful here (May's default), so parse it separately
            workers: lookup("BLACKLIGHT_WORKERS")
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(defaults.workers),
        }
    }

    /// Parse a TOML table; missing fields keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = RuntimeConfig::from_lookup(lookup(&[]));
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.queue_capacity, 1024);
    }

    #[test]
    fn test_env_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("BLACKLIGHT_QUEUE_CAPACITY", "16"),
            ("BLACKLIGHT_STACK_SIZE", "2097152"),
            ("BLACKLIGHT_WORKERS", "2"),
        ]));
        assert_eq!(config.queue_capacity, 16);
        assert_eq!(config.stack_size, 2097152);
        assert_eq!(config.pool_capacity, DEFAULT_POOL_CAPACITY);
        assert_eq!(config.workers, 2);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("BLACKLIGHT_QUEUE_CAPACITY", "0"),
            ("BLACKLIGHT_STACK_SIZE", "lots"),
            ("BLACKLIGHT_WORKERS", "-3"),
        ]));
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_process_environment() {
        // SAFETY: serialized with other env-mutating tests
        unsafe { std::env::set_var("BLACKLIGHT_QUEUE_CAPACITY", "7") };
        let config = RuntimeConfig::from_env();
        unsafe { std::env::remove_var("BLACKLIGHT_QUEUE_CAPACITY") };
        assert_eq!(config.queue_capacity, 7);
    }

    #[test]
    fn test_from_toml() {
        let config = RuntimeConfig::from_toml_str("queue_capacity = 8\nworkers = 1\n").unwrap();
        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.workers, 1);
        assert_eq!(config.stack_size, DEFAULT_STACK_SIZE);
        assert!(RuntimeConfig::from_toml_str("queue_size = 8").is_err());
    }
}
