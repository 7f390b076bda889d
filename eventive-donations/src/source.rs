//! Donation listing endpoint client
//!
//!   GET {api_root}/eventive/v1/donations?start_time=..&end_time=..&type=PAYMENT

use std::time::Duration;

use async_trait::async_trait;
use eventive_core::{DateRange, TransactionBatch};
use tracing::debug;

use crate::error::ProgressError;

/// Transaction type filter sent with every listing request
pub const TRANSACTION_TYPE: &str = "PAYMENT";

pub const DEFAULT_NAMESPACE: &str = "eventive/v1";

/// Anything that can list transactions for a date range
#[async_trait]
pub trait DonationSource: Send + Sync {
    async fn fetch_transactions(&self, range: &DateRange) -> Result<TransactionBatch, ProgressError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    /// REST API root, e.g. `https://example.org/wp-json`
    pub api_root: String,
    pub namespace: String,
    /// Transport-level timeout; `None` leaves it to reqwest's defaults
    pub timeout: Option<Duration>,
}

impl ClientSettings {
    pub fn new(api_root: impl Into<String>) -> Self {
        Self {
            api_root: api_root.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            timeout: None,
        }
    }
}

/// `DonationSource` backed by the platform's REST API
#[derive(Debug, Clone)]
pub struct RestDonationClient {
    http: reqwest::Client,
    settings: ClientSettings,
}

impl RestDonationClient {
    pub fn new(settings: ClientSettings) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            settings,
        })
    }

    /// Use a caller-configured reqwest client; `settings.timeout` is ignored
    pub fn with_http(http: reqwest::Client, settings: ClientSettings) -> Self {
        Self { http, settings }
    }

    /// Full listing URL for `range`; bounds are encoded like
    /// `encodeURIComponent`
    pub fn donations_url(&self, range: &DateRange) -> String {
        format!(
            "{}/{}/donations?start_time={}&end_time={}&type={}",
            self.settings.api_root.trim_end_matches('/'),
            self.settings.namespace.trim_matches('/'),
            encode_component(&range.start),
            encode_component(&range.end),
            TRANSACTION_TYPE,
        )
    }
}

/// `urlencoding::encode` also escapes `!'()*`, which `encodeURIComponent`
/// leaves as-is; put them back.
fn encode_component(s: &str) -> String {
    urlencoding::encode(s)
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}

#[async_trait]
impl DonationSource for RestDonationClient {
    async fn fetch_transactions(&self, range: &DateRange) -> Result<TransactionBatch, ProgressError> {
        let url = self.donations_url(range);
        debug!(%url, "requesting donations");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ProgressError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProgressError::RemoteRequest {
                status: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| ProgressError::Transport(e.to_string()))?;

        let batch: TransactionBatch = serde_json::from_slice(&body)
            .map_err(|e| ProgressError::MalformedResponse(e.to_string()))?;

        debug!(
            records = batch.len(),
            donations = batch.donation_count(),
            "decoded transaction batch"
        );
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(Some(start), Some(end)).unwrap()
    }

    #[test]
    fn test_donations_url() {
        let client = RestDonationClient::new(ClientSettings::new("https://example.org/wp-json/")).unwrap();
        assert_eq!(
            client.donations_url(&range("2025-01-01", "2025-12-31")),
            "https://example.org/wp-json/eventive/v1/donations?start_time=2025-01-01&end_time=2025-12-31&type=PAYMENT"
        );
    }

    #[test]
    fn test_donations_url_encodes_bounds() {
        let client = RestDonationClient::new(ClientSettings::new("http://localhost/wp-json")).unwrap();
        let url = client.donations_url(&range("2025-01-01 00:00:00+02:00", "a&b=c/d"));
        assert!(url.contains("start_time=2025-01-01%2000%3A00%3A00%2B02%3A00"));
        assert!(url.contains("end_time=a%26b%3Dc%2Fd"));
        assert!(url.ends_with("&type=PAYMENT"));
    }

    #[test]
    fn test_encoding_keeps_uri_component_marks() {
        assert_eq!(encode_component("it's (today)!*"), "it's%20(today)!*");
        assert_eq!(encode_component("100%"), "100%25");
        assert_eq!(encode_component("-_.~"), "-_.~");
    }

    #[test]
    fn test_custom_namespace() {
        let mut settings = ClientSettings::new("http://localhost/wp-json");
        settings.namespace = "/eventive/v2/".to_string();
        let client = RestDonationClient::new(settings).unwrap();
        assert!(
            client
                .donations_url(&range("a", "b"))
                .starts_with("http://localhost/wp-json/eventive/v2/donations?")
        );
    }
}
