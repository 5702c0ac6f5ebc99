//! Hosted backend speaking the PostgREST (`/rest/v1`) and Storage
//! (`/storage/v1`) HTTP APIs.
//!
//! # Security Note - Logging
//!
//! The anon key travels in both the `apikey` and `Authorization` headers.
//! Both are built through `RedactedHeader` and flagged sensitive, so neither
//! reqwest's debug output nor our own tracing events contain the key.

use std::fmt;
use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretBox};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::{Result, TicketDeskError};
use crate::types::{
    DEFAULT_BUCKET, DEFAULT_ENGINEERS_TABLE, DEFAULT_TICKETS_TABLE, Engineer, TicketDetail,
    TicketNumber, TicketSummary, TicketUpdate,
};

use super::error::ApiError;
use super::{EngineerDirectory, ImageStore, StoredObject, TicketDirectory, TicketRecordStore};

/// Characters escaped inside a single object key path segment
const KEY_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Wrapper for the API key that redacts the value when formatted.
struct RedactedHeader {
    value: String,
}

impl RedactedHeader {
    fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    fn as_header_value(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&self.value).map_err(|_| {
            TicketDeskError::Auth("API key contains characters not allowed in a header".into())
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactedHeader")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

pub struct SupabaseBackend {
    client: Client,
    base_url: Url,
    api_key: SecretBox<String>,
    engineers_table: String,
    tickets_table: String,
    bucket: String,
}

impl fmt::Debug for SupabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseBackend")
            .field("base_url", &self.base_url.as_str())
            .field("engineers_table", &self.engineers_table)
            .field("tickets_table", &self.tickets_table)
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl SupabaseBackend {
    /// Create a backend from configuration.
    ///
    /// Configures HTTP client with 30s connect timeout and 60s total timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let url = config.backend_url().ok_or_else(|| {
            TicketDeskError::Config(
                "backend URL not configured. Set SUPABASE_URL or run: ticketdesk config set backend.url <url>".to_string(),
            )
        })?;
        let api_key = config.api_key().ok_or_else(|| {
            TicketDeskError::Auth(
                "API key not configured. Set SUPABASE_ANON_KEY or run: ticketdesk config set auth.api_key <key>".to_string(),
            )
        })?;

        Ok(Self::new(&url, &api_key)?
            .with_tables(
                &config.backend.tables.engineers,
                &config.backend.tables.tickets,
            )
            .with_bucket(&config.backend.bucket))
    }

    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(TicketDeskError::Config(format!(
                "backend URL '{base_url}' cannot be used as a base URL"
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: SecretBox::new(Box::new(api_key.to_string())),
            engineers_table: DEFAULT_ENGINEERS_TABLE.to_string(),
            tickets_table: DEFAULT_TICKETS_TABLE.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
        })
    }

    pub fn with_tables(mut self, engineers: &str, tickets: &str) -> Self {
        self.engineers_table = engineers.to_string();
        self.tickets_table = tickets.to_string();
        self
    }

    pub fn with_bucket(mut self, bucket: &str) -> Self {
        self.bucket = bucket.to_string();
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TicketDeskError::Config("backend URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn rest_url(&self, table: &str) -> Result<Url> {
        self.endpoint(&["rest", "v1", table])
    }

    fn object_url(&self, key: &str) -> Result<Url> {
        self.endpoint(&["storage", "v1", "object", &self.bucket, key])
    }

    /// Public address of an object, with the key percent-escaped.
    pub fn public_object_url(&self, key: &str) -> String {
        let encoded: String = utf8_percent_encode(key, KEY_SEGMENT).collect();
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.bucket,
            encoded
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let key = RedactedHeader::new(self.api_key.expose_secret().as_str());
        let bearer = RedactedHeader::new(format!("Bearer {}", self.api_key.expose_secret()));
        Ok(builder
            .header("apikey", key.as_header_value()?)
            .header(header::AUTHORIZATION, bearer.as_header_value()?))
    }

    /// Send a request and turn non-success statuses into `ApiError`.
    async fn send(&self, builder: RequestBuilder) -> std::result::Result<Response, ApiError> {
        let builder = self
            .authorized(builder)
            .map_err(|e| ApiError::new(e.to_string()))?;
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response_parts(status, &headers, &body))
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Vec<T>> {
        let response = self
            .send(builder)
            .await
            .map_err(|e| e.into_error(TicketDeskError::Fetch))?;
        let body = response
            .text()
            .await
            .map_err(|e| TicketDeskError::Fetch(e.to_string()))?;
        parse_rows(&body)
    }
}

/// Parse a PostgREST row array.
fn parse_rows<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    serde_json::from_str(body)
        .map_err(|e| TicketDeskError::Fetch(format!("unexpected response body: {e}")))
}

/// `ilike` filter value for a case-insensitive substring match.
fn contains_filter(engineer: &str) -> String {
    format!("ilike.*{}*", engineer.trim())
}

fn eq_filter(ticket_number: &TicketNumber) -> String {
    format!("eq.{ticket_number}")
}

impl EngineerDirectory for SupabaseBackend {
    async fn list_engineers(&self) -> Result<Vec<Engineer>> {
        let url = self.rest_url(&self.engineers_table)?;
        debug!(table = %self.engineers_table, "listing engineers");
        self.fetch_rows(self.client.get(url).query(&[("select", "name")]))
            .await
    }
}

impl TicketDirectory for SupabaseBackend {
    async fn list_tickets_by_engineer(&self, engineer: &str) -> Result<Vec<TicketSummary>> {
        let url = self.rest_url(&self.tickets_table)?;
        debug!(engineer, "listing tickets");
        self.fetch_rows(self.client.get(url).query(&[
            ("select", "ticket_number,company_branch".to_string()),
            ("engineer", contains_filter(engineer)),
            ("order", "ticket_number.desc".to_string()),
        ]))
        .await
    }
}

impl TicketRecordStore for SupabaseBackend {
    async fn get_ticket(&self, ticket_number: &TicketNumber) -> Result<TicketDetail> {
        let url = self.rest_url(&self.tickets_table)?;
        debug!(%ticket_number, "fetching ticket");
        let mut rows: Vec<TicketDetail> = self
            .fetch_rows(
                self.client
                    .get(url)
                    .query(&[
                        ("select", "*".to_string()),
                        ("ticket_number", eq_filter(ticket_number)),
                    ]),
            )
            .await?;

        match rows.len() {
            0 => Err(TicketDeskError::TicketNotFound(ticket_number.to_string())),
            1 => Ok(rows.remove(0)),
            _ => Err(TicketDeskError::AmbiguousTicket(ticket_number.to_string())),
        }
    }

    async fn update_ticket(
        &self,
        ticket_number: &TicketNumber,
        update: &TicketUpdate,
    ) -> Result<()> {
        let url = self.rest_url(&self.tickets_table)?;
        debug!(%ticket_number, "updating ticket");
        let response = self
            .send(
                self.client
                    .patch(url)
                    .query(&[
                        ("ticket_number", eq_filter(ticket_number)),
                        ("select", "ticket_number".to_string()),
                    ])
                    .header("Prefer", "return=representation")
                    .json(update),
            )
            .await
            .map_err(|e| e.into_error(TicketDeskError::Write))?;

        let body = response
            .text()
            .await
            .map_err(|e| TicketDeskError::Write(e.to_string()))?;
        let touched: Vec<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| TicketDeskError::Write(format!("unexpected response body: {e}")))?;
        if touched.is_empty() {
            return Err(TicketDeskError::Write(format!(
                "ticket {ticket_number} no longer exists or is not writable"
            )));
        }
        Ok(())
    }

    async fn delete_ticket(&self, ticket_number: &TicketNumber) -> Result<()> {
        let url = self.rest_url(&self.tickets_table)?;
        debug!(%ticket_number, "deleting ticket");
        self.send(
            self.client
                .delete(url)
                .query(&[("ticket_number", eq_filter(ticket_number))]),
        )
        .await
        .map_err(|e| e.into_error(TicketDeskError::Write))?;
        Ok(())
    }
}

impl ImageStore for SupabaseBackend {
    async fn upload_file(
        &self,
        key: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<StoredObject> {
        let url = self.object_url(key)?;
        debug!(key, bytes = content.len(), "uploading object");
        self.send(
            self.client
                .post(url)
                .header(header::CONTENT_TYPE, content_type)
                .header("x-upsert", "false")
                .body(content.to_vec()),
        )
        .await
        .map_err(|e| e.into_error(TicketDeskError::Upload))?;

        Ok(StoredObject {
            key: key.to_string(),
        })
    }

    async fn resolve_public_url(&self, key: &str) -> Result<String> {
        Ok(self.public_object_url(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::decode_public_url;

    fn backend() -> SupabaseBackend {
        SupabaseBackend::new("https://demo.supabase.co/", "anon-key").unwrap()
    }

    #[test]
    fn test_rest_url() {
        let url = backend().rest_url("ticket_main").unwrap();
        assert_eq!(url.as_str(), "https://demo.supabase.co/rest/v1/ticket_main");
    }

    #[test]
    fn test_object_url_escapes_key() {
        let url = backend()
            .with_bucket("photos")
            .object_url("1700000000000-site photo.jpg")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://demo.supabase.co/storage/v1/object/photos/1700000000000-site%20photo.jpg"
        );
    }

    #[test]
    fn test_public_url_roundtrips_through_decode() {
        let public = backend().public_object_url("1700000000000-site photo.jpg");
        assert_eq!(
            public,
            "https://demo.supabase.co/storage/v1/object/public/call-reports/1700000000000-site%20photo.jpg"
        );
        assert_eq!(
            decode_public_url(&public).unwrap(),
            "https://demo.supabase.co/storage/v1/object/public/call-reports/1700000000000-site photo.jpg"
        );
    }

    #[test]
    fn test_filters() {
        assert_eq!(contains_filter("  Alice "), "ilike.*Alice*");
        assert_eq!(eq_filter(&TicketNumber::from(1001)), "eq.1001");
    }

    #[test]
    fn test_parse_rows() {
        let rows: Vec<TicketSummary> = parse_rows(
            r#"[{"ticket_number":1002,"company_branch":"York"},{"ticket_number":1001,"company_branch":null}]"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label(), "1002 - York");
        assert_eq!(rows[1].company_branch, "");

        let err = parse_rows::<Engineer>("{\"message\":\"oops\"}").unwrap_err();
        assert!(matches!(err, TicketDeskError::Fetch(_)));
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(SupabaseBackend::new("mailto:ops@example.com", "k").is_err());
        assert!(SupabaseBackend::new("not a url", "k").is_err());
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", backend());
        assert!(!debug.contains("anon-key"));
        let header = RedactedHeader::new("anon-key");
        assert_eq!(header.to_string(), "[REDACTED]");
        assert!(header.as_header_value().unwrap().is_sensitive());
    }
}
