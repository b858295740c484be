//! Settings and environment lookup.
//!
//! Settings live in `$HOME/.pr-scribe/settings.json` and provide an `env`
//! map used as a fallback whenever an environment variable is not set.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Name of the per-user and per-repository configuration directory.
pub const CONFIG_DIR_NAME: &str = ".pr-scribe";

/// Settings loaded from `$HOME/.pr-scribe/settings.json`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable fallbacks.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path.
    ///
    /// A missing file yields empty settings.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

        Ok(home_dir.join(CONFIG_DIR_NAME).join("settings.json"))
    }

    /// Returns an environment variable, falling back to these settings.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        env::var(key).ok().or_else(|| self.env.get(key).cloned())
    }
}

/// Returns an environment variable with fallback to the user's settings file.
pub fn get_env_var(key: &str) -> Result<String> {
    if let Ok(value) = env::var(key) {
        return Ok(value);
    }

    match Settings::load() {
        Ok(settings) => settings
            .env
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Environment variable not found: {key}")),
        Err(err) => Err(anyhow::anyhow!("Environment variable not found: {key}").context(err)),
    }
}

/// Tries several environment variables in order, with settings fallback.
pub fn get_env_vars(keys: &[&str]) -> Result<String> {
    keys.iter()
        .find_map(|key| get_env_var(key).ok())
        .ok_or_else(|| anyhow::anyhow!("None of the environment variables found: {keys:?}"))
}

/// Returns true when the variable is set to a truthy value ("true", "1", "yes").
pub fn env_flag(key: &str) -> bool {
    get_env_var(key)
        .ok()
        .and_then(|val| parse_bool_string(&val))
        .unwrap_or(false)
}

/// Parses a boolean-like string value.
///
/// Accepts "true"/"1"/"yes" as `true` and "false"/"0"/"no" as `false`.
pub fn parse_bool_string(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn settings_load_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let settings_path = temp_dir.path().join("settings.json");
        fs::write(
            &settings_path,
            r#"{ "env": { "PR_SCRIBE_TEST_VAR": "test_value", "GITHUB_TOKEN": "ghp_x" } }"#,
        )
        .unwrap();

        let settings = Settings::load_from_path(&settings_path).unwrap();

        assert_eq!(settings.env.get("PR_SCRIBE_TEST_VAR").unwrap(), "test_value");
        assert_eq!(settings.env.get("GITHUB_TOKEN").unwrap(), "ghp_x");
    }

    #[test]
    fn settings_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from_path(temp_dir.path().join("nope.json")).unwrap();
        assert!(settings.env.is_empty());
    }

    #[test]
    fn settings_invalid_json_errors() {
        let temp_dir = TempDir::new().unwrap();
        let settings_path = temp_dir.path().join("settings.json");
        fs::write(&settings_path, "{ not json").unwrap();

        let err = Settings::load_from_path(&settings_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings file"));
    }

    #[test]
    fn settings_env_takes_precedence() {
        let mut settings = Settings::default();
        settings
            .env
            .insert("PR_SCRIBE_PRECEDENCE".to_string(), "from_settings".to_string());

        assert_eq!(
            settings.get_env_var("PR_SCRIBE_PRECEDENCE").unwrap(),
            "from_settings"
        );

        env::set_var("PR_SCRIBE_PRECEDENCE", "from_env");
        assert_eq!(settings.get_env_var("PR_SCRIBE_PRECEDENCE").unwrap(), "from_env");
        env::remove_var("PR_SCRIBE_PRECEDENCE");
    }

    #[test]
    fn parse_bool_variants() {
        assert_eq!(parse_bool_string("TRUE"), Some(true));
        assert_eq!(parse_bool_string("yes"), Some(true));
        assert_eq!(parse_bool_string("0"), Some(false));
        assert_eq!(parse_bool_string("No"), Some(false));
        assert_eq!(parse_bool_string("maybe"), None);
    }
}
