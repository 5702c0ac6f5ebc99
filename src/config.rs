//! Application configuration.
//!
//! Configuration is stored as YAML in the platform config directory
//! (`~/.config/ticketdesk/config.yaml` on Linux) unless `TICKETDESK_CONFIG`
//! points elsewhere. It includes:
//! - The hosted backend URL, table names and storage bucket
//! - The API key used for both the REST and Storage APIs
//! - Which optional ticket columns the deployment has

use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TicketDeskError};
use crate::types::{DEFAULT_BUCKET, DEFAULT_ENGINEERS_TABLE, DEFAULT_TICKETS_TABLE};

pub const CONFIG_PATH_ENV: &str = "TICKETDESK_CONFIG";
pub const URL_ENV: &str = "SUPABASE_URL";
pub const API_KEY_ENV: &str = "SUPABASE_ANON_KEY";

/// Keys accepted by `config set`
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "backend.url",
    "backend.bucket",
    "backend.engineers_table",
    "backend.tickets_table",
    "auth.api_key",
    "schema.note_metadata",
];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub schema: SchemaConfig,
}

/// Location of the hosted backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub tables: TablesConfig,

    /// Storage bucket holding call report images
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            tables: TablesConfig::default(),
            bucket: default_bucket(),
        }
    }
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesConfig {
    #[serde(default = "default_engineers_table")]
    pub engineers: String,
    #[serde(default = "default_tickets_table")]
    pub tickets: String,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            engineers: default_engineers_table(),
            tickets: default_tickets_table(),
        }
    }
}

fn default_engineers_table() -> String {
    DEFAULT_ENGINEERS_TABLE.to_string()
}

fn default_tickets_table() -> String {
    DEFAULT_TICKETS_TABLE.to_string()
}

/// Authentication configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Optional ticket columns.
///
/// Some deployments have no `note_priority`/`note_created_at` columns; writing
/// them there would be rejected, so they are only sent when enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default = "default_note_metadata")]
    pub note_metadata: bool,
}

fn default_note_metadata() -> bool {
    true
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            note_metadata: default_note_metadata(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_PATH_ENV)
            && !path.is_empty()
        {
            return PathBuf::from(path);
        }

        match ProjectDirs::from("", "", "ticketdesk") {
            Some(dirs) => dirs.config_dir().join("config.yaml"),
            None => PathBuf::from(".ticketdesk").join("config.yaml"),
        }
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            TicketDeskError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Backend URL from environment or config file
    pub fn backend_url(&self) -> Option<String> {
        if let Ok(url) = env::var(URL_ENV)
            && !url.is_empty()
        {
            return Some(url);
        }

        self.backend.url.clone()
    }

    /// API key from environment or config file
    pub fn api_key(&self) -> Option<String> {
        if let Ok(key) = env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            return Some(key);
        }

        self.auth.api_key.clone()
    }

    pub fn note_metadata_enabled(&self) -> bool {
        self.schema.note_metadata
    }

    /// Set a value by its dotted key name
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "backend.url" => {
                url::Url::parse(value)?;
                self.backend.url = Some(value.trim_end_matches('/').to_string());
            }
            "backend.bucket" => self.backend.bucket = non_empty(key, value)?,
            "backend.engineers_table" => self.backend.tables.engineers = non_empty(key, value)?,
            "backend.tickets_table" => self.backend.tables.tickets = non_empty(key, value)?,
            "auth.api_key" => self.auth.api_key = Some(non_empty(key, value)?),
            "schema.note_metadata" => {
                self.schema.note_metadata = value.parse::<bool>().map_err(|_| {
                    TicketDeskError::Config(format!(
                        "invalid value '{value}' for schema.note_metadata. Expected: true or false"
                    ))
                })?;
            }
            _ => {
                return Err(TicketDeskError::Config(format!(
                    "unknown config key '{key}'. Valid keys: {}",
                    VALID_CONFIG_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn non_empty(key: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TicketDeskError::Config(format!("{key} cannot be empty")));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.backend.url.is_none());
        assert!(config.auth.api_key.is_none());
        assert_eq!(config.backend.bucket, "call-reports");
        assert_eq!(config.backend.tables.engineers, "engineers");
        assert_eq!(config.backend.tables.tickets, "ticket_main");
        assert!(config.note_metadata_enabled());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "backend:\n  url: https://demo.supabase.co\nschema:\n  note_metadata: false\n";
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(
            config.backend.url.as_deref(),
            Some("https://demo.supabase.co")
        );
        assert_eq!(config.backend.bucket, "call-reports");
        assert_eq!(config.backend.tables.tickets, "ticket_main");
        assert!(!config.note_metadata_enabled());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = Config::default();
        config.set_value("backend.url", "https://demo.supabase.co/").unwrap();
        config.set_value("auth.api_key", "anon-key-123").unwrap();
        config.set_value("backend.bucket", "photos").unwrap();

        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        let parsed: Config = serde_yaml_ng::from_str(&yaml).unwrap();

        assert_eq!(
            parsed.backend.url.as_deref(),
            Some("https://demo.supabase.co")
        );
        assert_eq!(parsed.auth.api_key.as_deref(), Some("anon-key-123"));
        assert_eq!(parsed.backend.bucket, "photos");
    }

    #[test]
    fn test_set_value_rejects_unknown_key() {
        let mut config = Config::default();
        let err = config.set_value("backend.port", "5432").unwrap_err();
        assert!(err.to_string().contains("unknown config key"));
    }

    #[test]
    fn test_set_value_rejects_bad_url_and_bool() {
        let mut config = Config::default();
        assert!(config.set_value("backend.url", "not a url").is_err());
        assert!(config.set_value("schema.note_metadata", "yes").is_err());
        assert!(config.set_value("backend.bucket", "  ").is_err());
    }

    #[test]
    fn test_auth_debug_is_redacted() {
        let auth = AuthConfig {
            api_key: Some("super-secret".to_string()),
        };
        let debug = format!("{auth:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file_values() {
        let mut config = Config::default();
        config.backend.url = Some("https://file.supabase.co".to_string());
        config.auth.api_key = Some("file-key".to_string());

        // SAFETY: serialized with every other test touching these variables
        unsafe {
            env::set_var(URL_ENV, "https://env.supabase.co");
            env::set_var(API_KEY_ENV, "");
        }
        assert_eq!(
            config.backend_url().as_deref(),
            Some("https://env.supabase.co")
        );
        // Empty variables fall back to the file
        assert_eq!(config.api_key().as_deref(), Some("file-key"));

        unsafe {
            env::remove_var(URL_ENV);
            env::remove_var(API_KEY_ENV);
        }
        assert_eq!(
            config.backend_url().as_deref(),
            Some("https://file.supabase.co")
        );
    }
}
