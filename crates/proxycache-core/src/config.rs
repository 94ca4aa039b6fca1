//! Environment-overridable size constants for the cache and request pipeline.
//!
//! Each knob has a documented default and a dedicated environment variable,
//! parsed defensively — invalid or missing falls back to the default rather
//! than failing startup.

use std::env;

/// Default `MaxObjectBytes`: largest response the cache will ever store.
pub const DEFAULT_MAX_OBJECT_BYTES: usize = 102_400;
/// Default `MaxCacheBytes`: total resident byte budget across all entries.
pub const DEFAULT_MAX_CACHE_BYTES: usize = 1_049_000;
/// Default per-line read buffer size.
pub const DEFAULT_LINE_BUFFER_SIZE: usize = 8192;
/// Default bound on a parsed host component.
pub const DEFAULT_HOST_LEN: usize = 256;
/// Default bound on a parsed port component.
pub const DEFAULT_PORT_LEN: usize = 8;

/// Resolved size/length knobs for one running proxy instance.
///
/// Built once in `main` via [`Config::from_env`] and shared read-only
/// (wrapped in an `Arc`) by every connection worker; nothing on the hot
/// path re-reads the environment.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub max_cache_bytes: usize,
    pub max_object_bytes: usize,
    pub line_buffer_size: usize,
    pub host_len: usize,
    pub port_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_cache_bytes: DEFAULT_MAX_CACHE_BYTES,
            max_object_bytes: DEFAULT_MAX_OBJECT_BYTES,
            line_buffer_size: DEFAULT_LINE_BUFFER_SIZE,
            host_len: DEFAULT_HOST_LEN,
            port_len: DEFAULT_PORT_LEN,
        }
    }
}

impl Config {
    /// Resolve every knob from its environment variable, defaulting whatever
    /// is absent or fails to parse as a positive `usize`.
    pub fn from_env() -> Self {
        Config {
            max_cache_bytes: usize_from_env("PROXY_MAX_CACHE_BYTES", DEFAULT_MAX_CACHE_BYTES),
            max_object_bytes: usize_from_env("PROXY_MAX_OBJECT_BYTES", DEFAULT_MAX_OBJECT_BYTES),
            line_buffer_size: usize_from_env("PROXY_LINE_BUFFER_SIZE", DEFAULT_LINE_BUFFER_SIZE),
            host_len: usize_from_env("PROXY_HOST_LEN", DEFAULT_HOST_LEN),
            port_len: usize_from_env("PROXY_PORT_LEN", DEFAULT_PORT_LEN),
        }
    }
}

fn usize_from_env(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_section_6_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.max_object_bytes, 102_400);
        assert_eq!(cfg.max_cache_bytes, 1_049_000);
        assert_eq!(cfg.line_buffer_size, 8192);
        assert_eq!(cfg.host_len, 256);
        assert_eq!(cfg.port_len, 8);
    }

    #[test]
    fn usize_from_env_falls_back_on_garbage() {
        assert_eq!(usize_from_env("PROXY_TEST_NOT_SET_XYZ", 42), 42);
    }

    #[test]
    fn usize_from_env_rejects_zero() {
        env::set_var("PROXY_TEST_ZERO_XYZ", "0");
        assert_eq!(usize_from_env("PROXY_TEST_ZERO_XYZ", 7), 7);
        env::remove_var("PROXY_TEST_ZERO_XYZ");
    }
}
