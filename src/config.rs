//! Lookout configuration.
//!
//! Read from an optional TOML file, then overridden by the environment the
//! workflow provides (`AI_MODEL`, `OPENAI_BASE_URL`, `OPENAI_API_KEY`,
//! `GITHUB_REPOSITORY`, `LOOKOUT_MAX_TURNS`).

use std::{env, fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::agent::DEFAULT_MAX_TURNS;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Lookout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Model name sent to the backend.
    pub model: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint.
    pub api_base: String,

    /// API key. Usually supplied through `OPENAI_API_KEY` rather than the file.
    pub api_key: Option<String>,

    /// `owner/repo`. Left to `gh` when unset.
    pub repository: Option<String>,

    /// Backend turns per run.
    pub max_turns: usize,

    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: None,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            repository: None,
            max_turns: DEFAULT_MAX_TURNS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load config from `path` (if given) and apply environment overrides.
    ///
    /// A named file that is missing or invalid is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), String> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = get("AI_MODEL") {
            self.model = Some(model);
        }
        if let Some(base) = get("OPENAI_BASE_URL") {
            self.api_base = base;
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(repo) = get("GITHUB_REPOSITORY") {
            self.repository = Some(repo);
        }
        if let Some(turns) = get("LOOKOUT_MAX_TURNS") {
            self.max_turns = turns
                .trim()
                .parse()
                .map_err(|e| format!("invalid LOOKOUT_MAX_TURNS '{turns}': {e}"))?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<(), String> {
        if self.max_turns == 0 {
            return Err("max-turns must be at least 1".to_string());
        }
        Ok(())
    }

    /// The model name, required for any run that talks to the backend.
    pub fn require_model(&self) -> Result<&str, String> {
        self.model
            .as_deref()
            .ok_or_else(|| "no model configured: set AI_MODEL or `model` in the config file".to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.api_base, "https://api.openai.com/v1");
        assert_eq!(config.max_turns, 3);
        assert!(config.require_model().is_err());
    }

    #[test]
    fn file_values_are_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lookout.toml");
        fs::write(
            &path,
            "model = \"gpt-4o-mini\"\nmax-turns = 5\nrepository = \"octo/widgets\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.require_model().unwrap(), "gpt-4o-mini");
        assert_eq!(config.max_turns, 5);
        assert_eq!(config.repository.as_deref(), Some("octo/widgets"));
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn missing_named_file_is_an_error() {
        let err = Config::from_file(Path::new("/nonexistent/lookout.toml")).unwrap_err();
        assert!(err.starts_with("failed to read /nonexistent/lookout.toml"));
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lookout.toml");
        fs::write(&path, "max-turns = \"many\"").unwrap();

        assert!(Config::from_file(&path).unwrap_err().starts_with("invalid config at"));
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = Config {
            model: Some("from-file".to_string()),
            ..Config::default()
        };

        config
            .apply_overrides(lookup(&[
                ("AI_MODEL", "from-env"),
                ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
                ("OPENAI_API_KEY", "sk-test"),
                ("LOOKOUT_MAX_TURNS", "4"),
                ("GITHUB_REPOSITORY", ""),
            ]))
            .unwrap();

        assert_eq!(config.model.as_deref(), Some("from-env"));
        assert_eq!(config.api_base, "http://localhost:8080/v1");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.max_turns, 4);
        // Empty values don't override.
        assert_eq!(config.repository, None);
    }

    #[test]
    fn bad_turn_override_is_an_error() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(lookup(&[("LOOKOUT_MAX_TURNS", "three")]))
            .unwrap_err();
        assert!(err.starts_with("invalid LOOKOUT_MAX_TURNS 'three'"));
    }

    #[test]
    fn zero_turns_is_rejected() {
        let config = Config {
            max_turns: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
