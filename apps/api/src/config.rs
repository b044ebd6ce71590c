use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// Name of the credential for the LLM provider. Required to run the pipeline.
pub const LLM_API_KEY: &str = "ANTHROPIC_API_KEY";
/// Name of the credential for the search provider. Optional; search is skipped without it.
pub const SEARCH_API_KEY: &str = "SERPER_API_KEY";

const DEFAULT_SECRETS_FILE: &str = ".tailor/secrets.toml";

/// Application configuration loaded once at startup.
///
/// A missing LLM key is NOT a startup failure: the service boots, and pipeline
/// runs are rejected with a configuration error until the key is provided.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory holding the uploaded resume and the generated markdown files.
    pub work_dir: PathBuf,
    pub secrets: Secrets,
}

/// Provider credentials resolved from the layered secret sources.
#[derive(Clone, Default)]
pub struct Secrets {
    pub llm_api_key: Option<String>,
    pub search_api_key: Option<String>,
}

// Keys never reach the logs.
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "<set>"))
            .field("search_api_key", &self.search_api_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let secrets_path = std::env::var("TAILOR_SECRETS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SECRETS_FILE));

        let sources: Vec<Box<dyn SecretSource>> = vec![
            Box::new(SecretsFile::load(&secrets_path)?),
            Box::new(EnvSource),
        ];

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            work_dir: std::env::var("TAILOR_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            secrets: Secrets::resolve(&sources),
        })
    }
}

impl Secrets {
    /// Looks up both provider keys, trying `sources` in order.
    pub fn resolve(sources: &[Box<dyn SecretSource>]) -> Self {
        Secrets {
            llm_api_key: lookup_secret(sources, LLM_API_KEY),
            search_api_key: lookup_secret(sources, SEARCH_API_KEY),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Secret sources
// ────────────────────────────────────────────────────────────────────────────

/// A named place credentials can come from. Sources are consulted in order and
/// the first non-empty value wins.
pub trait SecretSource: Send + Sync {
    fn name(&self) -> &str;
    fn get(&self, key: &str) -> Option<String>;
}

/// Flat TOML table of `KEY = "value"` pairs kept outside version control.
#[derive(Debug, Default)]
pub struct SecretsFile {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl SecretsFile {
    /// Loads the secrets file. A missing file yields an empty source; a file that
    /// exists but cannot be parsed is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No secrets file at {}", path.display());
            return Ok(SecretsFile {
                path: path.to_path_buf(),
                values: HashMap::new(),
            });
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read secrets file '{}'", path.display()))?;
        let file = Self::parse(path, &content)?;
        debug!("Loaded secrets file {file}");
        Ok(file)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let table: toml::Table = content
            .parse()
            .with_context(|| format!("Secrets file '{}' is not valid TOML", path.display()))?;

        let mut values = HashMap::new();
        for (key, value) in table {
            match value {
                toml::Value::String(s) => {
                    values.insert(key, s);
                }
                _ => warn!("Ignoring non-string secret '{key}' in {}", path.display()),
            }
        }

        Ok(SecretsFile {
            path: path.to_path_buf(),
            values,
        })
    }
}

impl SecretSource for SecretsFile {
    fn name(&self) -> &str {
        "secrets file"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Process environment (including anything dotenvy loaded from `.env`).
pub struct EnvSource;

impl SecretSource for EnvSource {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

fn lookup_secret(sources: &[Box<dyn SecretSource>], key: &str) -> Option<String> {
    for source in sources {
        if let Some(value) = source.get(key).filter(|v| !v.trim().is_empty()) {
            info!("Credential {key} loaded from {}", source.name());
            return Some(value);
        }
    }
    warn!("Credential {key} not found in any secret source");
    None
}

impl std::fmt::Display for SecretsFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} keys)", self.path.display(), self.values.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_source(content: &str) -> Box<dyn SecretSource> {
        Box::new(SecretsFile::parse(Path::new("secrets.toml"), content).unwrap())
    }

    #[test]
    fn test_secrets_file_parses_flat_string_table() {
        let file = SecretsFile::parse(
            Path::new("secrets.toml"),
            "ANTHROPIC_API_KEY = \"sk-file\"\nRETRIES = 3\n",
        )
        .unwrap();
        assert_eq!(file.get(LLM_API_KEY).as_deref(), Some("sk-file"));
        // non-string values are skipped
        assert!(file.get("RETRIES").is_none());
    }

    #[test]
    fn test_secrets_file_rejects_invalid_toml() {
        let result = SecretsFile::parse(Path::new("secrets.toml"), "this is = = not toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_secrets_file_is_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let file = SecretsFile::load(&dir.path().join("absent.toml")).unwrap();
        assert!(file.get(LLM_API_KEY).is_none());
    }

    #[test]
    fn test_first_source_wins() {
        let sources = vec![
            file_source("ANTHROPIC_API_KEY = \"from-store\""),
            file_source("ANTHROPIC_API_KEY = \"from-env\"\nSERPER_API_KEY = \"search\""),
        ];
        let secrets = Secrets::resolve(&sources);
        assert_eq!(secrets.llm_api_key.as_deref(), Some("from-store"));
        assert_eq!(secrets.search_api_key.as_deref(), Some("search"));
    }

    #[test]
    fn test_empty_value_falls_through_to_next_source() {
        let sources = vec![
            file_source("ANTHROPIC_API_KEY = \"  \""),
            file_source("ANTHROPIC_API_KEY = \"fallback\""),
        ];
        let secrets = Secrets::resolve(&sources);
        assert_eq!(secrets.llm_api_key.as_deref(), Some("fallback"));
    }

    #[test]
    fn test_absent_everywhere_is_none() {
        let sources = vec![file_source("")];
        let secrets = Secrets::resolve(&sources);
        assert!(secrets.llm_api_key.is_none());
        assert!(secrets.search_api_key.is_none());
    }

    #[test]
    fn test_debug_output_hides_keys() {
        let secrets = Secrets {
            llm_api_key: Some("sk-secret".to_string()),
            search_api_key: None,
        };
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<set>"));
    }
}
