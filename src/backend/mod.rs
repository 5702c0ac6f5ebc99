//! Remote collaborators of the ticket form.
//!
//! The form talks to four logical services: the engineer directory, the
//! ticket directory, the ticket record store and the image store. Each is a
//! trait so the hosted backend and the in-memory backend are interchangeable.

pub mod error;
pub mod memory;
pub mod supabase;

use std::future::Future;

use percent_encoding::percent_decode_str;

use crate::error::{Result, TicketDeskError};
use crate::types::{Engineer, TicketDetail, TicketNumber, TicketSummary, TicketUpdate};

pub use error::ApiError;
pub use memory::{BackendCall, InMemoryBackend, TicketRow};
pub use supabase::SupabaseBackend;

/// Confirmation returned by the image store after an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
}

/// Percent-decode a public object URL for storage in `callreports`.
pub fn decode_public_url(url: &str) -> Result<String> {
    percent_decode_str(url)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| TicketDeskError::Upload(format!("public URL is not valid UTF-8: {e}")))
}

/// Source of engineer names
pub trait EngineerDirectory: Send + Sync {
    fn list_engineers(&self) -> impl Future<Output = Result<Vec<Engineer>>> + Send;
}

/// Per-engineer ticket lookup
pub trait TicketDirectory: Send + Sync {
    /// Tickets whose engineer field contains `engineer` (case-insensitive),
    /// ordered by ticket number descending.
    fn list_tickets_by_engineer(
        &self,
        engineer: &str,
    ) -> impl Future<Output = Result<Vec<TicketSummary>>> + Send;
}

/// Read/update/delete of a single ticket record
pub trait TicketRecordStore: Send + Sync {
    /// Fails unless exactly one record matches.
    fn get_ticket(
        &self,
        ticket_number: &TicketNumber,
    ) -> impl Future<Output = Result<TicketDetail>> + Send;

    fn update_ticket(
        &self,
        ticket_number: &TicketNumber,
        update: &TicketUpdate,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Deleting a record that no longer exists succeeds.
    fn delete_ticket(&self, ticket_number: &TicketNumber)
    -> impl Future<Output = Result<()>> + Send;
}

/// Object storage for call report images
pub trait ImageStore: Send + Sync {
    fn upload_file(
        &self,
        key: &str,
        content: &[u8],
        content_type: &str,
    ) -> impl Future<Output = Result<StoredObject>> + Send;

    /// Publicly addressable URL for an uploaded object, percent-escapes included.
    fn resolve_public_url(&self, key: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Everything the ticket form needs from the outside world
pub trait Backend: EngineerDirectory + TicketDirectory + TicketRecordStore + ImageStore {}

impl<T> Backend for T where
    T: EngineerDirectory + TicketDirectory + TicketRecordStore + ImageStore
{
}

/// Backend chosen at runtime (hosted project or offline demo data)
pub enum AnyBackend {
    Supabase(SupabaseBackend),
    Memory(InMemoryBackend),
}

impl EngineerDirectory for AnyBackend {
    async fn list_engineers(&self) -> Result<Vec<Engineer>> {
        match self {
            AnyBackend::Supabase(b) => b.list_engineers().await,
            AnyBackend::Memory(b) => b.list_engineers().await,
        }
    }
}

impl TicketDirectory for AnyBackend {
    async fn list_tickets_by_engineer(&self, engineer: &str) -> Result<Vec<TicketSummary>> {
        match self {
            AnyBackend::Supabase(b) => b.list_tickets_by_engineer(engineer).await,
            AnyBackend::Memory(b) => b.list_tickets_by_engineer(engineer).await,
        }
    }
}

impl TicketRecordStore for AnyBackend {
    async fn get_ticket(&self, ticket_number: &TicketNumber) -> Result<TicketDetail> {
        match self {
            AnyBackend::Supabase(b) => b.get_ticket(ticket_number).await,
            AnyBackend::Memory(b) => b.get_ticket(ticket_number).await,
        }
    }

    async fn update_ticket(
        &self,
        ticket_number: &TicketNumber,
        update: &TicketUpdate,
    ) -> Result<()> {
        match self {
            AnyBackend::Supabase(b) => b.update_ticket(ticket_number, update).await,
            AnyBackend::Memory(b) => b.update_ticket(ticket_number, update).await,
        }
    }

    async fn delete_ticket(&self, ticket_number: &TicketNumber) -> Result<()> {
        match self {
            AnyBackend::Supabase(b) => b.delete_ticket(ticket_number).await,
            AnyBackend::Memory(b) => b.delete_ticket(ticket_number).await,
        }
    }
}

impl ImageStore for AnyBackend {
    async fn upload_file(
        &self,
        key: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<StoredObject> {
        match self {
            AnyBackend::Supabase(b) => b.upload_file(key, content, content_type).await,
            AnyBackend::Memory(b) => b.upload_file(key, content, content_type).await,
        }
    }

    async fn resolve_public_url(&self, key: &str) -> Result<String> {
        match self {
            AnyBackend::Supabase(b) => b.resolve_public_url(key).await,
            AnyBackend::Memory(b) => b.resolve_public_url(key).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_public_url() {
        assert_eq!(
            decode_public_url("http://x/1-site%20photo.jpg").unwrap(),
            "http://x/1-site photo.jpg"
        );
        assert_eq!(decode_public_url("http://x/plain.png").unwrap(), "http://x/plain.png");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode_public_url("http://x/%FF%FE").unwrap_err();
        assert!(matches!(err, TicketDeskError::Upload(_)));
    }
}
