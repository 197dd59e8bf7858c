//! Application configuration for leadpipe.
//!
//! User config lives at `~/.leadpipe/leadpipe.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LeadPipeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "leadpipe.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".leadpipe";

// ---------------------------------------------------------------------------
// Config structs (matching leadpipe.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// PubMed E-utilities settings.
    #[serde(default)]
    pub pubmed: PubmedConfig,

    /// CRM webhook settings.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default search query.
    #[serde(default = "default_query")]
    pub query: String,

    /// Default maximum search results.
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Fetcher CSV backup path.
    #[serde(default = "default_export_path")]
    pub export_path: String,

    /// Scorer input CSV path.
    #[serde(default = "default_input_path")]
    pub input_path: String,

    /// Scorer output CSV path.
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            query: default_query(),
            limit: default_limit(),
            export_path: default_export_path(),
            input_path: default_input_path(),
            output_path: default_output_path(),
        }
    }
}

fn default_query() -> String {
    "liver toxicity 3D in-vitro".into()
}
fn default_limit() -> u32 {
    20
}
fn default_export_path() -> String {
    "pubmed_leads_export.csv".into()
}
fn default_input_path() -> String {
    "leads.csv".into()
}
fn default_output_path() -> String {
    "scored_leads.csv".into()
}

/// `[pubmed]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubmedConfig {
    /// Name of the env var holding the NCBI API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the E-utilities endpoints.
    #[serde(default = "default_eutils_base")]
    pub base_url: String,
}

impl Default for PubmedConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_eutils_base(),
        }
    }
}

fn default_api_key_env() -> String {
    "NCBI_API_KEY".into()
}
fn default_eutils_base() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".into()
}

/// `[webhook]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// CRM ingestion endpoint. Must be set before `fetch` can deliver.
    #[serde(default)]
    pub url: String,

    /// Pause between consecutive webhook posts, in milliseconds.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_ms: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            rate_limit_ms: default_rate_limit(),
        }
    }
}

fn default_rate_limit() -> u64 {
    500
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config file + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime fetch configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Free-text PubMed query.
    pub query: String,
    /// Maximum number of search results.
    pub limit: u32,
    /// NCBI API key; omitted from requests when `None`.
    pub api_key: Option<String>,
    /// E-utilities base URL.
    pub base_url: String,
    /// CSV backup path, overwritten on each run.
    pub export_path: PathBuf,
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            query: config.defaults.query.clone(),
            limit: config.defaults.limit,
            api_key: resolve_api_key(config),
            base_url: config.pubmed.base_url.clone(),
            export_path: PathBuf::from(&config.defaults.export_path),
        }
    }
}

/// Runtime webhook delivery configuration.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// CRM webhook endpoint.
    pub webhook_url: String,
    /// Pause between consecutive posts, in milliseconds.
    pub rate_limit_ms: u64,
}

impl From<&AppConfig> for DeliveryConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            webhook_url: config.webhook.url.clone(),
            rate_limit_ms: config.webhook.rate_limit_ms,
        }
    }
}

/// Runtime scorer configuration.
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Input CSV of lead records (never mutated).
    pub input_path: PathBuf,
    /// Output CSV with the score column appended, overwritten on each run.
    pub output_path: PathBuf,
}

impl From<&AppConfig> for ScoreConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            input_path: PathBuf::from(&config.defaults.input_path),
            output_path: PathBuf::from(&config.defaults.output_path),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.leadpipe/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LeadPipeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.leadpipe/leadpipe.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LeadPipeError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| LeadPipeError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LeadPipeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LeadPipeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LeadPipeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the NCBI API key from the env var named in the config.
/// An unset or empty var means requests go out without a key (NCBI allows
/// this at a lower rate ceiling).
pub fn resolve_api_key(config: &AppConfig) -> Option<String> {
    match std::env::var(&config.pubmed.api_key_env) {
        Ok(val) if !val.is_empty() => Some(val),
        _ => None,
    }
}

/// Check that a webhook URL is configured and well-formed before delivery.
pub fn validate_webhook_url(config: &DeliveryConfig) -> Result<()> {
    if config.webhook_url.is_empty() {
        return Err(LeadPipeError::config(
            "webhook URL not set. Add it under [webhook] in leadpipe.toml \
             (run `leadpipe config init` to create the file).",
        ));
    }

    url::Url::parse(&config.webhook_url).map_err(|e| {
        LeadPipeError::config(format!("invalid webhook URL '{}': {e}", config.webhook_url))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("query"));
        assert!(toml_str.contains("NCBI_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.limit, 20);
        assert_eq!(parsed.defaults.query, "liver toxicity 3D in-vitro");
        assert_eq!(parsed.pubmed.api_key_env, "NCBI_API_KEY");
        assert_eq!(parsed.webhook.rate_limit_ms, 500);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[webhook]
url = "https://crm.example.com/hook/abc123"

[defaults]
limit = 5
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.limit, 5);
        assert_eq!(config.defaults.input_path, "leads.csv");
        assert_eq!(config.webhook.url, "https://crm.example.com/hook/abc123");
        assert_eq!(config.webhook.rate_limit_ms, 500);
    }

    #[test]
    fn fetch_config_from_app_config() {
        let app = AppConfig::default();
        let fetch = FetchConfig::from(&app);
        assert_eq!(fetch.limit, 20);
        assert_eq!(fetch.export_path, PathBuf::from("pubmed_leads_export.csv"));
        assert!(fetch.base_url.starts_with("https://eutils.ncbi.nlm.nih.gov"));
    }

    #[test]
    fn score_config_from_app_config() {
        let app = AppConfig::default();
        let score = ScoreConfig::from(&app);
        assert_eq!(score.input_path, PathBuf::from("leads.csv"));
        assert_eq!(score.output_path, PathBuf::from("scored_leads.csv"));
    }

    #[test]
    fn empty_webhook_url_rejected() {
        let delivery = DeliveryConfig {
            webhook_url: String::new(),
            rate_limit_ms: 500,
        };
        let result = validate_webhook_url(&delivery);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("webhook URL"));
    }

    #[test]
    fn malformed_webhook_url_rejected() {
        let delivery = DeliveryConfig {
            webhook_url: "not a url".into(),
            rate_limit_ms: 500,
        };
        assert!(validate_webhook_url(&delivery).is_err());
    }

    #[test]
    fn api_key_resolution() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.pubmed.api_key_env = "LEADPIPE_TEST_NONEXISTENT_KEY_12345".into();
        assert!(resolve_api_key(&config).is_none());
    }
}
