use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

use crate::theme::ThemeConfig;

fn default_base_url() -> String { "http://localhost:3000".to_owned() }
fn default_timeout()  -> u64    { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url:        String,
    #[serde(default)]
    pub token:           String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url:        default_base_url(),
            token:           String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api:   ApiConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

impl AppConfig {
    /// Reads `config.toml` if present, then applies `TASKBOARD_API_URL` and
    /// `TASKBOARD_TOKEN`.
    pub fn load() -> Result<Self> {
        let path = config_path();
        let mut cfg = if path.exists() {
            Self::parse(&std::fs::read_to_string(&path)?)?
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            AppConfig::default()
        };
        cfg.apply_env(
            std::env::var("TASKBOARD_API_URL").ok(),
            std::env::var("TASKBOARD_TOKEN").ok(),
        );
        Ok(cfg)
    }

    pub fn parse(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    fn apply_env(&mut self, url: Option<String>, token: Option<String>) {
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            self.api.base_url = url;
        }
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.api.token = token;
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskboard")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::parse("").unwrap();
        assert_eq!(cfg.api.base_url, "http://localhost:3000");
        assert_eq!(cfg.api.token, "");
        assert_eq!(cfg.api.timeout_seconds, 30);
        assert_eq!(cfg.theme.accent, ThemeConfig::default().accent);
    }

    #[test]
    fn file_values_are_read() {
        let cfg = AppConfig::parse(r##"
            [api]
            base_url = "https://tasks.example.com"
            token    = "abc"

            [theme]
            accent = "#ff0000"
        "##).unwrap();
        assert_eq!(cfg.api.base_url, "https://tasks.example.com");
        assert_eq!(cfg.api.token, "abc");
        assert_eq!(cfg.theme.accent, "#ff0000");
        assert_eq!(cfg.theme.bg, ThemeConfig::default().bg);
    }

    #[test]
    fn env_overrides_file_but_not_with_empty_values() {
        let mut cfg = AppConfig::parse("[api]\ntoken = \"from-file\"").unwrap();
        cfg.apply_env(Some("http://override".into()), Some(String::new()));
        assert_eq!(cfg.api.base_url, "http://override");
        assert_eq!(cfg.api.token, "from-file");
    }
}
