//! Runtime configuration for WatchPesa.
//!
//! Resolution order:
//!   1. WATCHPESA_* environment variables
//!   2. YAML file (WATCHPESA_CONFIG, else ~/.config/watchpesa/config.yaml)
//!   3. Built-in defaults
//!
//! The backend URL and anon key have no usable defaults; `is_configured`
//! tells the caller whether the gateway can actually be reached.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PesaConfig {
    /// Base URL of the hosted backend (auth + REST + RPC).
    pub backend_url: String,
    /// Public anon key sent with every request.
    pub anon_key: String,
    /// Bind address for the web app.
    pub bind: String,
    /// How long the celebration overlay stays up after a rewarded watch.
    pub celebration_secs: u64,
    /// Interval between social-proof popup events.
    pub popup_interval_secs: u64,
    /// External activation link opened on withdrawal.
    pub activation_url: String,
}

impl Default for PesaConfig {
    fn default() -> Self {
        PesaConfig {
            backend_url: String::new(),
            anon_key: String::new(),
            bind: "0.0.0.0:4100".to_string(),
            celebration_secs: 5,
            popup_interval_secs: 5,
            activation_url: "https://watchpesaactivation.netlify.app/".to_string(),
        }
    }
}

impl PesaConfig {
    /// Load config from file + environment.
    pub fn load() -> Self {
        let mut config = Self::from_file().unwrap_or_default();
        config.apply_env();
        config
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("WATCHPESA_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|d| d.join("watchpesa").join("config.yaml"))
    }

    fn from_file() -> Option<Self> {
        let path = Self::config_path()?;
        let raw = std::fs::read_to_string(path).ok()?;
        serde_yaml::from_str(&raw).ok()
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("WATCHPESA_BACKEND_URL") {
            self.backend_url = v;
        }
        if let Ok(v) = std::env::var("WATCHPESA_ANON_KEY") {
            self.anon_key = v;
        }
        if let Ok(v) = std::env::var("WATCHPESA_BIND") {
            self.bind = v;
        }
        if let Ok(v) = std::env::var("WATCHPESA_ACTIVATION_URL") {
            self.activation_url = v;
        }
    }

    /// Whether the remote gateway has enough to work with.
    pub fn is_configured(&self) -> bool {
        !self.backend_url.is_empty() && !self.anon_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = PesaConfig::default();
        assert_eq!(c.celebration_secs, 5);
        assert_eq!(c.popup_interval_secs, 5);
        assert!(!c.is_configured());
    }

    #[test]
    fn yaml_round_trip() {
        let c = PesaConfig {
            backend_url: "https://example.supabase.co".to_string(),
            anon_key: "anon".to_string(),
            ..PesaConfig::default()
        };
        let raw = serde_yaml::to_string(&c).unwrap();
        let back: PesaConfig = serde_yaml::from_str(&raw).unwrap();
        assert!(back.is_configured());
        assert_eq!(back.bind, c.bind);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let back: PesaConfig =
            serde_yaml::from_str("backend_url: https://example.supabase.co\n").unwrap();
        assert_eq!(back.backend_url, "https://example.supabase.co");
        assert_eq!(back.celebration_secs, 5);
    }
}
