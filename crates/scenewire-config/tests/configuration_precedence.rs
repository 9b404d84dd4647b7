//! Flag, environment, and default precedence for the server configuration.
//!
//! Environment mutation is process-wide, so every case runs inside a single
//! test to keep the assertions ordered.

use scenewire_config::{LogFormat, ServerConfig};

struct EnvGuard {
    keys: Vec<&'static str>,
}

impl EnvGuard {
    fn set(&mut self, key: &'static str, value: &str) {
        // Environment mutation is `unsafe` under edition 2024; the guard
        // removes every key it set when dropped.
        unsafe { std::env::set_var(key, value) };
        self.keys.push(key);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.keys {
            unsafe { std::env::remove_var(key) };
        }
    }
}

#[test]
fn flags_beat_environment_which_beats_defaults() {
    let mut guard = EnvGuard { keys: Vec::new() };

    let defaults = ServerConfig::load_from_iter(["scenewired"]).expect("defaults");
    assert_eq!(defaults, ServerConfig::default());

    guard.set("SCENEWIRE_PORT", "6200");
    guard.set("SCENEWIRE_LOG_FORMAT", "compact");
    let from_env = ServerConfig::load_from_iter(["scenewired"]).expect("environment");
    assert_eq!(from_env.port, 6200);
    assert_eq!(from_env.log_format, LogFormat::Compact);

    let from_flags = ServerConfig::load_from_iter(["scenewired", "--port", "6300"])
        .expect("flags");
    assert_eq!(from_flags.port, 6300);
    assert_eq!(from_flags.log_format, LogFormat::Compact);

    guard.set("SCENEWIRE_PORT", "not-a-port");
    assert!(ServerConfig::load_from_iter(["scenewired"]).is_err());
}
