use anyhow::{Context, Result, anyhow};
use chrono::FixedOffset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::ConfigError;

pub const DEFAULT_SOURCE_URL: &str = "https://weathernews.jp/onebox/tenki/saitama/11100/";
pub const DEFAULT_TABLE: &str = "readings";

/// Where and how the source page is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_secs: u64,

    /// UTC offset of the times printed on the page (JST by default).
    pub utc_offset_hours: i32,

    /// Stamp rows with the page's observation time instead of the insert time.
    pub stamp_observation_time: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_secs: 30,
            utc_offset_hours: 9,
            stamp_observation_time: false,
        }
    }
}

impl SourceConfig {
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidUtcOffset(self.utc_offset_hours))
    }
}

/// Connection details for the hosted table store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    pub key: String,
    pub table: String,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            key: String::new(),
            table: DEFAULT_TABLE.to_string(),
            timeout_secs: 30,
        }
    }
}

impl GatewayConfig {
    pub fn has_credentials(&self) -> bool {
        !self.url.trim().is_empty() && !self.key.trim().is_empty()
    }

    pub fn require_credentials(&self) -> Result<&Self, ConfigError> {
        if self.has_credentials() { Ok(self) } else { Err(ConfigError::MissingCredentials) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { interval_secs: 3600 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub bind: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { bind: "127.0.0.1:3000".to_string() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [gateway]
/// url = "https://xyz.supabase.co"
/// key = "..."
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub gateway: GatewayConfig,
    pub schedule: ScheduleConfig,
    pub dashboard: DashboardConfig,
}

impl Config {
    /// Load config from the default location, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "tenki", "tenki")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source.utc_offset()?;
        Ok(())
    }

    /// Overlay values from the environment. The lookup is passed in so
    /// callers decide where the values come from.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, name: &str| {
            if let Some(value) = lookup(name) {
                let value = value.trim();
                if !value.is_empty() {
                    *target = value.to_string();
                }
            }
        };

        set(&mut self.gateway.url, "SUPABASE_URL");
        set(&mut self.gateway.key, "SUPABASE_KEY");
        set(&mut self.gateway.table, "TENKI_TABLE");
        set(&mut self.source.url, "TENKI_SOURCE_URL");
        set(&mut self.dashboard.bind, "TENKI_BIND");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_saitama() {
        let cfg = Config::default();

        assert_eq!(cfg.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(cfg.gateway.table, "readings");
        assert_eq!(cfg.schedule.interval_secs, 3600);
        assert!(!cfg.gateway.has_credentials());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [gateway]
            url = "https://xyz.supabase.co"
            key = "anon"
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.gateway.url, "https://xyz.supabase.co");
        assert_eq!(cfg.gateway.table, DEFAULT_TABLE);
        assert_eq!(cfg.source, SourceConfig::default());
        assert!(cfg.gateway.require_credentials().is_ok());
    }

    #[test]
    fn require_credentials_errors_with_hint() {
        let cfg = Config::default();
        let err = cfg.gateway.require_credentials().unwrap_err();

        assert!(err.to_string().contains("tenki configure"));
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SUPABASE_URL", "https://env.supabase.co"),
            ("SUPABASE_KEY", "env-key"),
            ("TENKI_TABLE", ""),
        ]);

        let mut cfg = Config::default();
        cfg.gateway.table = "weather_saitama".into();
        cfg.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(cfg.gateway.url, "https://env.supabase.co");
        assert_eq!(cfg.gateway.key, "env-key");
        // Empty values don't clobber.
        assert_eq!(cfg.gateway.table, "weather_saitama");
    }

    #[test]
    fn env_values_are_trimmed() {
        let mut cfg = Config::default();
        cfg.apply_env(|name| match name {
            "SUPABASE_KEY" => Some("anon-key\n".to_string()),
            "SUPABASE_URL" => Some("  https://env.supabase.co ".to_string()),
            _ => None,
        });

        assert_eq!(cfg.gateway.key, "anon-key");
        assert_eq!(cfg.gateway.url, "https://env.supabase.co");
    }

    #[test]
    fn utc_offset_is_range_checked() {
        let jst = SourceConfig::default().utc_offset().unwrap();
        assert_eq!(jst.local_minus_utc(), 9 * 3600);

        for hours in [24, -24, i32::MAX] {
            let cfg = SourceConfig { utc_offset_hours: hours, ..SourceConfig::default() };
            let err = cfg.utc_offset().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidUtcOffset(h) if h == hours));
        }
    }

    #[test]
    fn load_rejects_out_of_range_offset() {
        let dir = std::env::temp_dir().join(format!("tenki-offset-{}", std::process::id()));
        let path = dir.join("config.toml");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "[source]\nutc_offset_hours = 100000000\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        fs::remove_dir_all(&dir).ok();

        assert!(format!("{err:#}").contains("out of range"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("tenki-config-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut cfg = Config::default();
        cfg.gateway.url = "https://xyz.supabase.co".into();
        cfg.gateway.key = "anon".into();
        cfg.dashboard.bind = "0.0.0.0:8080".into();

        cfg.save_to(&path).expect("save should succeed");
        let loaded = Config::load_from(&path).expect("load should succeed");
        fs::remove_dir_all(&dir).ok();

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("tenki-does-not-exist/config.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
