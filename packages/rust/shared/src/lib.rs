//! Shared types, error model, and configuration for leadpipe.
//!
//! This crate is the foundation depended on by the fetcher, scorer, and CLI.
//! It provides:
//! - [`LeadPipeError`] — the unified error type
//! - Domain types ([`LeadRecord`] and its constants)
//! - Configuration ([`AppConfig`], runtime configs, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, DeliveryConfig, FetchConfig, PubmedConfig, ScoreConfig,
    WebhookConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    resolve_api_key, validate_webhook_url,
};
pub use error::{LeadPipeError, Result};
pub use types::{DEFAULT_AFFILIATION, LEAD_COLUMNS, LeadRecord, SOURCE_TAG};
