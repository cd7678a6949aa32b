use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::github::{RepoId, DEFAULT_API_URL};

const DEFAULT_CONFIG_FILE: &str = ".issue-sync.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to load env file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("Missing required configuration: {}", join_fields(.0))]
    Missing(Vec<Field>),

    #[error("Invalid REPO format: {0} (expected owner/name)")]
    MalformedRepo(String),
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.env_var())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The three values every run needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Token,
    Repo,
    VaultPath,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Token, Field::Repo, Field::VaultPath];

    pub fn env_var(self) -> &'static str {
        match self {
            Field::Token => "GITHUB_TOKEN",
            Field::Repo => "REPO",
            Field::VaultPath => "VAULT_PATH",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_var())
    }
}

/// Raw configuration as loaded from `.issue-sync.toml` and the environment.
///
/// Nothing is validated here; absent values stay `None` so the preflight
/// checks can report them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub vault: VaultConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// Personal access token. Falls back to GITHUB_TOKEN.
    pub token: Option<String>,
    /// Repository as `owner/name`. Falls back to REPO.
    pub repo: Option<String>,
    /// API base URL. Falls back to GITHUB_API_URL, then api.github.com.
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaultConfig {
    /// Vault directory. Falls back to VAULT_PATH.
    pub path: Option<PathBuf>,
}

/// Complete configuration handed to the sync pipeline.
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: String,
    pub repo: RepoId,
    pub vault_path: PathBuf,
    pub api_url: String,
}

impl Config {
    /// Load configuration for this process.
    ///
    /// 1. Load `env_file` if given, otherwise `.env` in the current directory if present
    /// 2. Read `config_file` if given, otherwise `.issue-sync.toml` if present
    /// 3. Fill unset fields from the environment
    pub fn load(env_file: Option<&Path>, config_file: Option<&Path>) -> Result<Config, ConfigError> {
        match env_file {
            Some(path) => dotenvy::from_path(path)?,
            None => load_default_env_file()?,
        }

        let mut config = match config_file {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load_from(path)?
                } else {
                    Config::default()
                }
            }
        };

        config.fill_from(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Fill every unset field from `lookup`, keyed by environment variable name.
    pub fn fill_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.github.token.is_none() {
            self.github.token = lookup(Field::Token.env_var());
        }
        if self.github.repo.is_none() {
            self.github.repo = lookup(Field::Repo.env_var());
        }
        if self.github.api_url.is_none() {
            self.github.api_url = lookup("GITHUB_API_URL");
        }
        if self.vault.path.is_none() {
            self.vault.path = lookup(Field::VaultPath.env_var()).map(PathBuf::from);
        }
    }

    pub fn token(&self) -> Option<&str> {
        non_blank(self.github.token.as_deref())
    }

    pub fn repo(&self) -> Option<&str> {
        non_blank(self.github.repo.as_deref())
    }

    pub fn vault_path(&self) -> Option<&Path> {
        self.vault
            .path
            .as_deref()
            .filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty())
    }

    pub fn api_url(&self) -> &str {
        non_blank(self.github.api_url.as_deref()).unwrap_or(DEFAULT_API_URL)
    }

    /// Required fields that are absent or blank, in declaration order.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| match field {
                Field::Token => self.token().is_none(),
                Field::Repo => self.repo().is_none(),
                Field::VaultPath => self.vault_path().is_none(),
            })
            .collect()
    }

    /// Resolve into `Settings`, failing on any missing or malformed value.
    /// Does not touch the filesystem or the network.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let (Some(token), Some(raw_repo), Some(vault_path)) =
            (self.token(), self.repo(), self.vault_path())
        else {
            return Err(ConfigError::Missing(Field::ALL.to_vec()));
        };
        let repo =
            RepoId::parse(raw_repo).ok_or_else(|| ConfigError::MalformedRepo(raw_repo.to_string()))?;

        Ok(Settings {
            token: token.to_string(),
            repo,
            vault_path: vault_path.to_path_buf(),
            api_url: self.api_url().to_string(),
        })
    }
}

/// Load `.env` from the current directory or its parents. A missing file is
/// fine; a file that exists but cannot be parsed is an error.
fn load_default_env_file() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.missing_fields(), Field::ALL.to_vec());
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[github]
repo = "octocat/Hello-World"
api_url = "https://ghe.example.com/api/v3"

[vault]
path = "/notes/vault"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.repo(), Some("octocat/Hello-World"));
        assert_eq!(config.api_url(), "https://ghe.example.com/api/v3");
        assert_eq!(config.vault_path(), Some(Path::new("/notes/vault")));
        assert_eq!(config.missing_fields(), vec![Field::Token]);
    }

    #[test]
    fn test_file_values_take_precedence_over_env() {
        let mut config: Config = toml::from_str("[github]\nrepo = \"from/file\"\n").unwrap();
        config.fill_from(env(&[
            ("REPO", "from/env"),
            ("GITHUB_TOKEN", "ghp_env"),
            ("VAULT_PATH", "/vault"),
        ]));
        assert_eq!(config.repo(), Some("from/file"));
        assert_eq!(config.token(), Some("ghp_env"));
        assert_eq!(config.vault_path(), Some(Path::new("/vault")));
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let mut config = Config::default();
        config.fill_from(env(&[("GITHUB_TOKEN", ""), ("REPO", "   "), ("VAULT_PATH", "/vault")]));
        assert_eq!(config.missing_fields(), vec![Field::Token, Field::Repo]);
    }

    #[test]
    fn test_settings_missing_fields() {
        let mut config = Config::default();
        config.fill_from(env(&[("REPO", "octocat/Hello-World")]));
        let err = config.settings().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref f) if *f == vec![Field::Token, Field::VaultPath]));
        assert_eq!(
            err.to_string(),
            "Missing required configuration: GITHUB_TOKEN, VAULT_PATH"
        );
    }

    #[test]
    fn test_settings_malformed_repo() {
        let mut config = Config::default();
        config.fill_from(env(&[
            ("GITHUB_TOKEN", "ghp_x"),
            ("REPO", "https://github.com/octocat/Hello-World"),
            ("VAULT_PATH", "/vault"),
        ]));
        assert!(matches!(config.settings(), Err(ConfigError::MalformedRepo(_))));
    }

    #[test]
    fn test_settings_resolved() {
        let mut config = Config::default();
        config.fill_from(env(&[
            ("GITHUB_TOKEN", "ghp_x"),
            ("REPO", "octocat/Hello-World"),
            ("VAULT_PATH", "/vault"),
        ]));
        let settings = config.settings().unwrap();
        assert_eq!(settings.token, "ghp_x");
        assert_eq!(settings.repo.owner, "octocat");
        assert_eq!(settings.vault_path, PathBuf::from("/vault"));
        assert_eq!(settings.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issue-sync.toml");
        fs::write(&path, "[github]\ntoken = \"ghp_file\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.token(), Some("ghp_file"));
    }

    #[test]
    fn test_malformed_env_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "GITHUB_TOKEN='unterminated\n").unwrap();

        let err = Config::load(Some(&path), Some(&dir.path().join("none.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile(_)));
    }

    #[test]
    fn test_missing_env_file_error_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = dotenvy::from_path(dir.path().join(".env")).unwrap_err();
        assert!(err.not_found());
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issue-sync.toml");
        fs::write(&path, "[github\ntoken = ").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }
}
