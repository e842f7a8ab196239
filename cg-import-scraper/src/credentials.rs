use std::path::PathBuf;

use crate::error::ScrapeError;

const API_KEY_ENV: &str = "TACHI_API_KEY";

/// Where a new API key can be generated (Kamaitachi client file flow).
pub const CLIENT_FILE_FLOW: &str =
    "https://kamai.tachi.ac/client-file-flow/CIb4851b4fd80234cacb9934c1c0eee1c9d9da3030";

/// Bearer credential for the Kamaitachi API.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
}

/// Where the credential value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// TOML config file format.
#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct ConfigFile {
    kamaitachi: Option<KamaitachiConfig>,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct KamaitachiConfig {
    api_key: Option<String>,
}

impl Credentials {
    /// Load the API key from the environment or the config file.
    ///
    /// Priority: env var > config file.
    pub fn load() -> Result<Self, ScrapeError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .or_else(load_config_key)
            .ok_or_else(|| {
                ScrapeError::Config(format!(
                    "No API key. Set {API_KEY_ENV} or run 'cg-import auth set <key>'. \
                     Keys are issued at {CLIENT_FILE_FLOW}"
                ))
            })?;

        Ok(Self { api_key })
    }

    /// Replace the key with an explicit value (e.g. from a CLI flag).
    pub fn with_override(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key {
            self.api_key = key;
        }
        self
    }
}

/// Return the path to the credentials config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cg-import").join("credentials.toml"))
}

/// Save the API key to the config file, creating parent directories as
/// needed. Returns the path the file was written to.
///
/// Callers must verify the key against the API first; an unverified key is
/// never persisted.
pub fn save_to_file(creds: &Credentials) -> Result<PathBuf, ScrapeError> {
    let path = config_path()
        .ok_or_else(|| ScrapeError::Config("Could not determine config directory".to_string()))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let config = ConfigFile {
        kamaitachi: Some(KamaitachiConfig {
            api_key: Some(creds.api_key.clone()),
        }),
    };

    let toml_str = toml::to_string_pretty(&config)
        .map_err(|e| ScrapeError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(&path, toml_str)?;
    Ok(path)
}

/// Determine where the API key is coming from.
pub fn credential_source() -> CredentialSource {
    if std::env::var(API_KEY_ENV).is_ok() {
        CredentialSource::EnvVar(API_KEY_ENV)
    } else if load_config_key().is_some() {
        CredentialSource::ConfigFile
    } else {
        CredentialSource::Missing
    }
}

fn load_config_key() -> Option<String> {
    let path = config_path()?;
    let content = std::fs::read_to_string(&path).ok()?;
    let config: ConfigFile = toml::from_str(&content).ok()?;
    config.kamaitachi?.api_key
}
