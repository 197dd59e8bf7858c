//! PubMed lead fetching, CSV export, and webhook delivery.
//!
//! This crate provides:
//! - [`pubmed`] — esearch/efetch client and article-to-lead extraction
//! - [`export`] — CSV backup of fetched leads
//! - [`webhook`] — per-record JSON delivery to the CRM endpoint

pub mod export;
pub mod pubmed;
pub mod webhook;

pub use export::{read_backup, write_backup};
pub use pubmed::PubmedClient;
pub use webhook::{Deliverer, DeliveryReport};
