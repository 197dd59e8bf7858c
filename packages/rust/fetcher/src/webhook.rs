//! Webhook delivery loop for fetched leads.
//!
//! Each lead is posted individually as a flat JSON object. Per-record
//! failures are logged and counted but never abort the loop; the receiver's
//! rate limit is respected by a scheduled pause between consecutive posts.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use leadpipe_shared::{DeliveryConfig, LeadPipeError, LeadRecord, Result, validate_webhook_url};

/// User-Agent string for webhook requests.
const USER_AGENT: &str = concat!("leadpipe/", env!("CARGO_PKG_VERSION"));

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// DeliveryReport
// ---------------------------------------------------------------------------

/// Summary of a completed delivery loop. Partial failure is reported here,
/// never as an `Err`.
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    /// Number of leads attempted (always the full input length).
    pub attempted: usize,
    /// Number of leads acknowledged with HTTP 200 or 201.
    pub delivered: usize,
    /// Per-record failures (lead name, reason).
    pub failures: Vec<(String, String)>,
    /// When the loop finished.
    pub completed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Deliverer
// ---------------------------------------------------------------------------

/// Sends lead records to the configured CRM webhook, one POST per record.
pub struct Deliverer {
    config: DeliveryConfig,
    client: Client,
}

impl Deliverer {
    /// Create a new deliverer. Fails if the webhook URL is unset or invalid.
    pub fn new(config: DeliveryConfig) -> Result<Self> {
        validate_webhook_url(&config)?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LeadPipeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Deliver every lead in order, pausing `rate_limit_ms` between sends.
    ///
    /// Exactly HTTP 200 and 201 count as delivered. Any other status or a
    /// transport error is recorded as a failure and the loop continues with
    /// the next record.
    #[instrument(skip_all, fields(count = leads.len()))]
    pub async fn deliver(&self, leads: &[LeadRecord]) -> DeliveryReport {
        let mut delivered = 0;
        let mut failures: Vec<(String, String)> = Vec::new();

        for (i, lead) in leads.iter().enumerate() {
            if i > 0 && self.config.rate_limit_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.rate_limit_ms)).await;
            }

            match self
                .client
                .post(&self.config.webhook_url)
                .json(lead)
                .send()
                .await
            {
                Ok(response) if matches!(response.status().as_u16(), 200 | 201) => {
                    debug!(name = %lead.name, "lead delivered");
                    delivered += 1;
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    warn!(name = %lead.name, %status, body = %body, "webhook rejected lead");
                    failures.push((lead.name.clone(), format!("HTTP {status}")));
                }
                Err(e) => {
                    warn!(name = %lead.name, error = %e, "webhook request failed");
                    failures.push((lead.name.clone(), e.to_string()));
                }
            }
        }

        let report = DeliveryReport {
            attempted: leads.len(),
            delivered,
            failures,
            completed_at: Utc::now(),
        };

        info!(
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failures.len(),
            "delivery complete"
        );

        report
    }
}
