//! Configuration file support for procscribe.
//!
//! Settings come from CLI flags, `procscribe.toml` in the working directory,
//! and the global `config.toml` under the user's config directory, in that
//! order of precedence.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use procscribe_core::{DEFAULT_AUTOSAVE_EVERY, DEFAULT_MAX_QUESTIONS, DEFAULT_STATE_FILE};
use procscribe_llm::BackendType;

/// The project config file name
pub const CONFIG_FILE_NAME: &str = "procscribe.toml";
/// Directory under the platform config dir holding the global config
pub const GLOBAL_CONFIG_DIR: &str = "procscribe";
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Settings that may appear in either config file
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Completion backend: openrouter, ollama or offline
    pub backend: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Per-request timeout in seconds (backend default when unset)
    pub timeout_secs: Option<u64>,
    pub max_questions: Option<usize>,
    pub autosave_every: Option<usize>,
    pub state_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        read_toml(&working_dir.join(CONFIG_FILE_NAME))
    }
}

/// Global configuration; keys live under `[defaults]`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    #[serde(default)]
    pub defaults: ProjectConfig,
}

impl GlobalConfig {
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
    }

    pub fn exists() -> bool {
        Self::path().is_some_and(|p| p.exists())
    }

    pub fn load() -> Result<Option<Self>> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        read_toml(path)
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(Some(config))
}

/// Fully resolved settings for a run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend: BackendType,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key_env: Option<String>,
    pub timeout: Option<Duration>,
    pub max_questions: usize,
    pub autosave_every: usize,
    pub state_file: PathBuf,
    pub output_dir: PathBuf,
    pub log_level: String,
}

impl Settings {
    /// Merge layers: `cli` > `project` > `global` > built-in defaults.
    ///
    /// Relative paths are resolved against `working_dir`.
    pub fn resolve(
        cli: &ProjectConfig,
        project: Option<&ProjectConfig>,
        global: Option<&GlobalConfig>,
        working_dir: &Path,
    ) -> Result<Self> {
        let layers: Vec<&ProjectConfig> = [Some(cli), project, global.map(|g| &g.defaults)]
            .into_iter()
            .flatten()
            .collect();

        fn pick<T: Clone>(
            layers: &[&ProjectConfig],
            field: impl Fn(&ProjectConfig) -> &Option<T>,
        ) -> Option<T> {
            layers.iter().find_map(|layer| field(layer).clone())
        }

        let backend = match pick(&layers, |c| &c.backend) {
            Some(name) => name
                .parse::<BackendType>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("Invalid backend setting")?,
            None => BackendType::OpenRouter,
        };

        let resolve_path = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                working_dir.join(path)
            }
        };

        Ok(Self {
            backend,
            model: pick(&layers, |c| &c.model),
            base_url: pick(&layers, |c| &c.base_url),
            api_key_env: pick(&layers, |c| &c.api_key_env),
            timeout: pick(&layers, |c| &c.timeout_secs).map(Duration::from_secs),
            max_questions: pick(&layers, |c| &c.max_questions).unwrap_or(DEFAULT_MAX_QUESTIONS),
            autosave_every: pick(&layers, |c| &c.autosave_every)
                .unwrap_or(DEFAULT_AUTOSAVE_EVERY),
            state_file: resolve_path(
                pick(&layers, |c| &c.state_file).unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
            ),
            output_dir: pick(&layers, |c| &c.output_dir)
                .map(resolve_path)
                .unwrap_or_else(|| working_dir.to_path_buf()),
            log_level: pick(&layers, |c| &c.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_project_config_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(ProjectConfig::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "agent = \"claude\"\n").unwrap();
        let err = ProjectConfig::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_global_config_nests_under_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(GLOBAL_CONFIG_FILE);
        std::fs::write(&path, "[defaults]\nbackend = \"ollama\"\nmax_questions = 8\n").unwrap();

        let global = GlobalConfig::load_from(&path).unwrap().unwrap();
        assert_eq!(global.defaults.backend.as_deref(), Some("ollama"));
        assert_eq!(global.defaults.max_questions, Some(8));
    }

    #[test]
    fn test_precedence_cli_then_project_then_global() {
        let cli = ProjectConfig {
            model: Some("cli-model".to_string()),
            ..Default::default()
        };
        let project = ProjectConfig {
            model: Some("project-model".to_string()),
            max_questions: Some(5),
            ..Default::default()
        };
        let global = GlobalConfig {
            defaults: ProjectConfig {
                backend: Some("ollama".to_string()),
                max_questions: Some(9),
                autosave_every: Some(1),
                ..Default::default()
            },
        };

        let settings =
            Settings::resolve(&cli, Some(&project), Some(&global), Path::new("/work")).unwrap();
        assert_eq!(settings.model.as_deref(), Some("cli-model"));
        assert_eq!(settings.max_questions, 5);
        assert_eq!(settings.autosave_every, 1);
        assert_eq!(settings.backend, BackendType::Ollama);
    }

    #[test]
    fn test_defaults_and_relative_paths() {
        let settings =
            Settings::resolve(&ProjectConfig::default(), None, None, Path::new("/work")).unwrap();
        assert_eq!(settings.backend, BackendType::OpenRouter);
        assert_eq!(settings.max_questions, DEFAULT_MAX_QUESTIONS);
        assert_eq!(settings.autosave_every, DEFAULT_AUTOSAVE_EVERY);
        assert_eq!(settings.state_file, PathBuf::from("/work/interview_state.json"));
        assert_eq!(settings.output_dir, PathBuf::from("/work"));
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.timeout, None);
    }

    #[test]
    fn test_invalid_backend_is_an_error() {
        let cli = ProjectConfig {
            backend: Some("gpt-9".to_string()),
            ..Default::default()
        };
        assert!(Settings::resolve(&cli, None, None, Path::new(".")).is_err());
    }

    #[test]
    fn test_timeout_secs_becomes_request_timeout() {
        let project: ProjectConfig = toml::from_str("timeout_secs = 15").unwrap();
        let settings =
            Settings::resolve(&ProjectConfig::default(), Some(&project), None, Path::new("/work"))
                .unwrap();
        assert_eq!(settings.timeout, Some(Duration::from_secs(15)));

        let cloned = settings.clone();
        assert_eq!(cloned, settings);
    }
}
