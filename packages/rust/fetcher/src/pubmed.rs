//! PubMed E-utilities client: esearch → efetch → lead extraction.
//!
//! The two-step flow mirrors the E-utilities contract: `esearch.fcgi` turns a
//! free-text query into a list of PMIDs, and a single bulk `efetch.fcgi` call
//! returns the full article records as XML.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use leadpipe_shared::{
    DEFAULT_AFFILIATION, FetchConfig, LeadPipeError, LeadRecord, Result, SOURCE_TAG,
};

use crate::export;

/// User-Agent string for E-utilities requests.
const USER_AGENT: &str = concat!("leadpipe/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// esearch response shape
// ---------------------------------------------------------------------------

/// Envelope of the esearch JSON response. Missing fields collapse to an empty
/// id list rather than a parse error, so an unexpected-but-valid response is
/// treated the same as "no results".
#[derive(Debug, Default, Deserialize)]
struct EsearchResponse {
    #[serde(default)]
    esearchresult: EsearchResult,
}

#[derive(Debug, Default, Deserialize)]
struct EsearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

// ---------------------------------------------------------------------------
// PubmedClient
// ---------------------------------------------------------------------------

/// HTTP client for the PubMed fetch stage.
pub struct PubmedClient {
    config: FetchConfig,
    client: Client,
}

impl PubmedClient {
    /// Create a new client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LeadPipeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Run the full fetch stage: search, bulk-fetch, extract, export.
    ///
    /// An empty search result is not an error: it returns an empty Vec and
    /// skips both the efetch call and the CSV backup. Network failures and
    /// malformed responses are fatal for the run; there are no retries.
    #[instrument(skip_all, fields(query = %self.config.query, limit = self.config.limit))]
    pub async fn fetch(&self) -> Result<Vec<LeadRecord>> {
        info!("searching PubMed");
        let ids = self.search().await?;

        if ids.is_empty() {
            info!("no matching PubMed records");
            return Ok(Vec::new());
        }

        debug!(ids = ids.len(), "bulk-fetching article records");
        let xml = self.fetch_articles(&ids).await?;
        let leads = parse_articles(&xml)?;

        // Durability side effect, not the primary output channel.
        export::write_backup(&self.config.export_path, &leads)?;

        info!(
            leads = leads.len(),
            export_path = %self.config.export_path.display(),
            "fetch complete, backup written"
        );

        Ok(leads)
    }

    /// Issue the esearch request and return the matching PMIDs.
    async fn search(&self) -> Result<Vec<String>> {
        let url = format!("{}/esearch.fcgi", self.config.base_url);

        let mut params: Vec<(&str, String)> = vec![
            ("db", "pubmed".into()),
            ("term", self.config.query.clone()),
            ("retmode", "json".into()),
            ("retmax", self.config.limit.to_string()),
        ];
        if let Some(key) = &self.config.api_key {
            params.push(("api_key", key.clone()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| LeadPipeError::Network(format!("esearch: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LeadPipeError::Network(format!("esearch: HTTP {status}")));
        }

        let parsed: EsearchResponse = response
            .json()
            .await
            .map_err(|e| LeadPipeError::parse(format!("esearch response: {e}")))?;

        Ok(parsed.esearchresult.idlist)
    }

    /// Issue a single bulk efetch request for all PMIDs, returning raw XML.
    async fn fetch_articles(&self, ids: &[String]) -> Result<String> {
        let url = format!("{}/efetch.fcgi", self.config.base_url);

        let mut params: Vec<(&str, String)> = vec![
            ("db", "pubmed".into()),
            ("id", ids.join(",")),
            ("retmode", "xml".into()),
        ];
        if let Some(key) = &self.config.api_key {
            params.push(("api_key", key.clone()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| LeadPipeError::Network(format!("efetch: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LeadPipeError::Network(format!("efetch: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| LeadPipeError::Network(format!("efetch: failed to read body: {e}")))
    }
}

// ---------------------------------------------------------------------------
// XML extraction
// ---------------------------------------------------------------------------

/// Parse an efetch XML document into lead records.
///
/// Per article: the *last* listed author is taken (in the life sciences that
/// is typically the senior/corresponding author); an article with no author
/// entry is skipped entirely. The affiliation is the first one found anywhere
/// in the article, not necessarily the selected author's own.
fn parse_articles(xml: &str) -> Result<Vec<LeadRecord>> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| LeadPipeError::parse(format!("efetch XML: {e}")))?;

    let mut leads = Vec::new();

    for article in doc
        .descendants()
        .filter(|n| n.has_tag_name("PubmedArticle"))
    {
        let Some(author) = last_author(article) else {
            debug!("article has no author entries, skipping");
            continue;
        };

        let fore = child_text(author, "ForeName").unwrap_or("");
        let last = child_text(author, "LastName").unwrap_or("");
        let name = format!("{fore} {last}").trim().to_string();

        let paper_title = article
            .descendants()
            .find(|n| n.has_tag_name("ArticleTitle"))
            .and_then(|n| n.text())
            .map(str::to_string);

        let affiliation = article
            .descendants()
            .find(|n| n.has_tag_name("Affiliation"))
            .and_then(|n| n.text())
            .unwrap_or(DEFAULT_AFFILIATION)
            .to_string();

        leads.push(LeadRecord {
            name,
            paper_title,
            affiliation,
            source: SOURCE_TAG.to_string(),
        });
    }

    Ok(leads)
}

/// The last `Author` element of the article's `AuthorList`, if any.
fn last_author<'a, 'input>(
    article: roxmltree::Node<'a, 'input>,
) -> Option<roxmltree::Node<'a, 'input>> {
    let list = article
        .descendants()
        .find(|n| n.has_tag_name("AuthorList"))?;
    list.children().filter(|n| n.has_tag_name("Author")).last()
}

/// Text content of a direct child element, if present and non-empty.
fn child_text<'a>(node: roxmltree::Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
}
