use anyhow::{Context as AnyhowContext, Result};
use mindverse_guidance::{GuidanceSettings, DEFAULT_AFFIRMATION_KARMA_COST, DEFAULT_GUIDANCE_KARMA_COST};
use mindverse_store::{DEFAULT_PASSWORD_COST, DEFAULT_SESSION_TTL_HOURS, MIN_PASSWORD_COST};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub(crate) const DATA_DIR_ENV: &str = "MINDVERSE_DATA_DIR";
pub(crate) const GUIDANCE_COST_ENV: &str = "MINDVERSE_GUIDANCE_KARMA_COST";
pub(crate) const AFFIRMATION_COST_ENV: &str = "MINDVERSE_AFFIRMATION_KARMA_COST";
pub(crate) const CORS_ORIGIN_ENV: &str = "MINDVERSE_CORS_ORIGIN";
pub(crate) const SESSION_TTL_ENV: &str = "MINDVERSE_SESSION_TTL_HOURS";

const MAX_PASSWORD_COST: u32 = 31;

const STORE_FILE: &str = "store.json";

/// Runtime settings. Layered as defaults, then the TOML file, then the
/// environment; CLI flags are applied last by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub data_dir: PathBuf,
    pub bind: String,
    pub guidance_karma_cost: u32,
    pub affirmation_karma_cost: u32,
    pub cors_origin: Option<String>,
    pub session_ttl_hours: u32,
    pub password_cost: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".mindverse"),
            bind: "127.0.0.1:5000".to_string(),
            guidance_karma_cost: DEFAULT_GUIDANCE_KARMA_COST,
            affirmation_karma_cost: DEFAULT_AFFIRMATION_KARMA_COST,
            cors_origin: None,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS as u32,
            password_cost: DEFAULT_PASSWORD_COST,
        }
    }
}

impl Config {
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(GUIDANCE_COST_ENV) {
            self.guidance_karma_cost = parse_u32(GUIDANCE_COST_ENV, &raw)?;
        }
        if let Some(raw) = lookup(AFFIRMATION_COST_ENV) {
            self.affirmation_karma_cost = parse_u32(AFFIRMATION_COST_ENV, &raw)?;
        }
        if let Some(raw) = lookup(SESSION_TTL_ENV) {
            self.session_ttl_hours = parse_u32(SESSION_TTL_ENV, &raw)?;
        }
        if let Some(origin) = lookup(CORS_ORIGIN_ENV).filter(|o| !o.trim().is_empty()) {
            self.cors_origin = Some(origin.trim().to_string());
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_PASSWORD_COST..=MAX_PASSWORD_COST).contains(&self.password_cost) {
            anyhow::bail!(
                "password_cost must be between {MIN_PASSWORD_COST} and {MAX_PASSWORD_COST}, got {}",
                self.password_cost
            );
        }
        if self.session_ttl_hours == 0 {
            anyhow::bail!("session_ttl_hours must be at least 1");
        }
        Ok(())
    }

    pub(crate) fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.session_ttl_hours))
    }

    pub(crate) fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    pub(crate) fn settings(&self) -> GuidanceSettings {
        GuidanceSettings {
            guidance_karma_cost: self.guidance_karma_cost,
            affirmation_karma_cost: self.affirmation_karma_cost,
        }
    }
}

fn parse_u32(key: &str, raw: &str) -> Result<u32> {
    raw.trim()
        .parse()
        .with_context(|| format!("{key} must be a non-negative integer, got {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mindverse.toml");
        std::fs::write(
            &path,
            "data_dir = \"/var/lib/mindverse\"\nguidance_karma_cost = 20\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/mindverse"));
        assert_eq!(config.guidance_karma_cost, 20);
        assert_eq!(config.affirmation_karma_cost, DEFAULT_AFFIRMATION_KARMA_COST);
        assert_eq!(
            config.store_path(),
            PathBuf::from("/var/lib/mindverse/store.json")
        );
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            (AFFIRMATION_COST_ENV, " 7 "),
            (CORS_ORIGIN_ENV, "http://localhost:3000"),
        ]);
        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.affirmation_karma_cost, 7);
        assert_eq!(config.cors_origin.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.settings().guidance_karma_cost, DEFAULT_GUIDANCE_KARMA_COST);
    }

    #[test]
    fn bad_cost_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env(|key| (key == GUIDANCE_COST_ENV).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(GUIDANCE_COST_ENV));
    }

    #[test]
    fn session_ttl_and_cost_are_checked() {
        let mut config = Config::default();
        assert_eq!(config.session_ttl(), chrono::Duration::days(7));
        config
            .apply_env(|key| (key == SESSION_TTL_ENV).then(|| "2".to_string()))
            .unwrap();
        assert_eq!(config.session_ttl(), chrono::Duration::hours(2));
        config.validate().unwrap();

        config.session_ttl_hours = 0;
        assert!(config.validate().is_err());
        config.session_ttl_hours = 1;
        config.password_cost = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/definitely/missing.toml"))).is_err());
    }
}
