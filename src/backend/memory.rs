//! In-process backend used for `--offline` mode and by the test suite.
//!
//! Behaves like the hosted backend for every operation the form uses and can
//! be told to fail or to hold specific calls until released.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tokio::sync::Notify;

use crate::error::{Result, TicketDeskError};
use crate::types::{Engineer, TicketDetail, TicketNumber, TicketSummary, TicketUpdate};

use super::{EngineerDirectory, ImageStore, StoredObject, TicketDirectory, TicketRecordStore};

const KEY_SEGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'%').add(b'#').add(b'?');

/// Public base used by the offline demo data
pub const DEMO_PUBLIC_BASE: &str = "memory://call-reports";

/// A stored ticket together with the engineer field it is listed under
#[derive(Debug, Clone)]
pub struct TicketRow {
    pub engineer: String,
    pub detail: TicketDetail,
}

/// Call log entry, in the order calls reached the backend
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    ListEngineers,
    ListTickets(String),
    GetTicket(TicketNumber),
    UpdateTicket(TicketNumber, TicketUpdate),
    DeleteTicket(TicketNumber),
    Upload(String),
}

#[derive(Debug, Default)]
struct FailurePlan {
    listing: bool,
    updates: bool,
    deletes: bool,
    /// Successful uploads left before uploads start failing
    uploads_left: Option<usize>,
}

#[derive(Default)]
struct Gates {
    uploads: Option<Arc<Notify>>,
    ticket_listing: BTreeMap<String, Arc<Notify>>,
    ticket_detail: BTreeMap<TicketNumber, Arc<Notify>>,
}

#[derive(Default)]
struct MemoryState {
    engineers: Vec<Engineer>,
    tickets: Vec<TicketRow>,
    objects: BTreeMap<String, (Vec<u8>, String)>,
    calls: Vec<BackendCall>,
    failures: FailurePlan,
    gates: Gates,
}

pub struct InMemoryBackend {
    public_base: String,
    state: Mutex<MemoryState>,
}

impl InMemoryBackend {
    /// Empty backend whose objects are published under `public_base`.
    pub fn new(public_base: impl Into<String>) -> Self {
        Self {
            public_base: public_base.into().trim_end_matches('/').to_string(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    pub fn with_engineer(self, name: &str) -> Self {
        self.state.lock().engineers.push(Engineer {
            name: name.to_string(),
        });
        self
    }

    pub fn with_ticket(self, engineer: &str, detail: TicketDetail) -> Self {
        self.insert_ticket(engineer, detail);
        self
    }

    pub fn insert_ticket(&self, engineer: &str, detail: TicketDetail) {
        self.state.lock().tickets.push(TicketRow {
            engineer: engineer.to_string(),
            detail,
        });
    }

    /// Small data set for trying the form without a hosted project.
    pub fn demo() -> Self {
        let mut leak = TicketDetail::new(1042);
        leak.company_branch = "Leeds North".to_string();
        leak.note = "Boiler pressure dropping overnight".to_string();

        let mut survey = TicketDetail::new(1038);
        survey.company_branch = "York".to_string();
        survey.paused = true;

        let mut install = TicketDetail::new(1051);
        install.company_branch = "Harrogate".to_string();

        let mut shared = TicketDetail::new(1047);
        shared.company_branch = "Wakefield".to_string();
        shared.completed = true;

        InMemoryBackend::new(DEMO_PUBLIC_BASE)
            .with_engineer("Alice Carter")
            .with_engineer("Bob Singh")
            .with_engineer("Chen Li")
            .with_ticket("Alice Carter", leak)
            .with_ticket("Alice Carter", survey)
            .with_ticket("Bob Singh", install)
            .with_ticket("Alice Carter, Bob Singh", shared)
    }

    pub fn fail_listing(&self, fail: bool) {
        self.state.lock().failures.listing = fail;
    }

    pub fn fail_updates(&self, fail: bool) {
        self.state.lock().failures.updates = fail;
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.state.lock().failures.deletes = fail;
    }

    /// Let `successes` more uploads through, then fail every upload.
    pub fn fail_uploads_after(&self, successes: usize) {
        self.state.lock().failures.uploads_left = Some(successes);
    }

    /// Hold every upload until `gate` is notified.
    pub fn gate_uploads(&self, gate: Arc<Notify>) {
        self.state.lock().gates.uploads = Some(gate);
    }

    /// Hold ticket listings for `engineer` until `gate` is notified.
    pub fn gate_ticket_listing(&self, engineer: &str, gate: Arc<Notify>) {
        self.state
            .lock()
            .gates
            .ticket_listing
            .insert(engineer.to_string(), gate);
    }

    /// Hold detail fetches for `ticket_number` until `gate` is notified.
    pub fn gate_ticket_detail(&self, ticket_number: &TicketNumber, gate: Arc<Notify>) {
        self.state
            .lock()
            .gates
            .ticket_detail
            .insert(ticket_number.clone(), gate);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().calls.clone()
    }

    pub fn upload_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, BackendCall::Upload(_)))
            .count()
    }

    pub fn updates(&self) -> Vec<TicketUpdate> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::UpdateTicket(_, update) => Some(update.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn ticket(&self, ticket_number: &TicketNumber) -> Option<TicketDetail> {
        self.state
            .lock()
            .tickets
            .iter()
            .find(|row| &row.detail.ticket_number == ticket_number)
            .map(|row| row.detail.clone())
    }

    /// Stored object bytes and content type
    pub fn object(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.state.lock().objects.get(key).cloned()
    }

    pub fn object_keys(&self) -> Vec<String> {
        self.state.lock().objects.keys().cloned().collect()
    }

    fn record(&self, call: BackendCall) {
        self.state.lock().calls.push(call);
    }
}

impl EngineerDirectory for InMemoryBackend {
    async fn list_engineers(&self) -> Result<Vec<Engineer>> {
        let mut state = self.state.lock();
        state.calls.push(BackendCall::ListEngineers);
        if state.failures.listing {
            return Err(TicketDeskError::Fetch("engineer directory unavailable".into()));
        }
        Ok(state.engineers.clone())
    }
}

impl TicketDirectory for InMemoryBackend {
    async fn list_tickets_by_engineer(&self, engineer: &str) -> Result<Vec<TicketSummary>> {
        self.record(BackendCall::ListTickets(engineer.to_string()));
        let gate = self.state.lock().gates.ticket_listing.get(engineer).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let state = self.state.lock();
        if state.failures.listing {
            return Err(TicketDeskError::Fetch("ticket directory unavailable".into()));
        }

        let needle = engineer.trim().to_lowercase();
        let mut tickets: Vec<TicketSummary> = state
            .tickets
            .iter()
            .filter(|row| row.engineer.to_lowercase().contains(&needle))
            .map(|row| TicketSummary {
                ticket_number: row.detail.ticket_number.clone(),
                company_branch: row.detail.company_branch.clone(),
            })
            .collect();
        tickets.sort_by(|a, b| b.ticket_number.cmp(&a.ticket_number));
        Ok(tickets)
    }
}

impl TicketRecordStore for InMemoryBackend {
    async fn get_ticket(&self, ticket_number: &TicketNumber) -> Result<TicketDetail> {
        self.record(BackendCall::GetTicket(ticket_number.clone()));
        let gate = self.state.lock().gates.ticket_detail.get(ticket_number).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let state = self.state.lock();
        if state.failures.listing {
            return Err(TicketDeskError::Fetch("ticket store unavailable".into()));
        }

        let mut matches = state
            .tickets
            .iter()
            .filter(|row| &row.detail.ticket_number == ticket_number);
        match (matches.next(), matches.next()) {
            (None, _) => Err(TicketDeskError::TicketNotFound(ticket_number.to_string())),
            (Some(row), None) => Ok(row.detail.clone()),
            (Some(_), Some(_)) => Err(TicketDeskError::AmbiguousTicket(ticket_number.to_string())),
        }
    }

    async fn update_ticket(
        &self,
        ticket_number: &TicketNumber,
        update: &TicketUpdate,
    ) -> Result<()> {
        let mut state = self.state.lock();
        state
            .calls
            .push(BackendCall::UpdateTicket(ticket_number.clone(), update.clone()));
        if state.failures.updates {
            return Err(TicketDeskError::Write(
                "new row violates check constraint".into(),
            ));
        }

        let row = state
            .tickets
            .iter_mut()
            .find(|row| &row.detail.ticket_number == ticket_number)
            .ok_or_else(|| {
                TicketDeskError::Write(format!(
                    "ticket {ticket_number} no longer exists or is not writable"
                ))
            })?;
        update.apply_to(&mut row.detail);
        Ok(())
    }

    async fn delete_ticket(&self, ticket_number: &TicketNumber) -> Result<()> {
        let mut state = self.state.lock();
        state
            .calls
            .push(BackendCall::DeleteTicket(ticket_number.clone()));
        if state.failures.deletes {
            return Err(TicketDeskError::Write("permission denied for table".into()));
        }
        state
            .tickets
            .retain(|row| &row.detail.ticket_number != ticket_number);
        Ok(())
    }
}

impl ImageStore for InMemoryBackend {
    async fn upload_file(
        &self,
        key: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<StoredObject> {
        self.record(BackendCall::Upload(key.to_string()));
        let gate = self.state.lock().gates.uploads.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state.lock();
        if let Some(left) = state.failures.uploads_left.as_mut() {
            if *left == 0 {
                return Err(TicketDeskError::Upload("storage quota exceeded".into()));
            }
            *left -= 1;
        }
        if state.objects.contains_key(key) {
            return Err(TicketDeskError::Upload(
                "The resource already exists".into(),
            ));
        }
        state
            .objects
            .insert(key.to_string(), (content.to_vec(), content_type.to_string()));
        Ok(StoredObject {
            key: key.to_string(),
        })
    }

    async fn resolve_public_url(&self, key: &str) -> Result<String> {
        let encoded: String = utf8_percent_encode(key, KEY_SEGMENT).collect();
        Ok(format!("{}/{}", self.public_base, encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> InMemoryBackend {
        let mut a = TicketDetail::new(1001);
        a.company_branch = "Leeds".to_string();
        let mut b = TicketDetail::new(1002);
        b.company_branch = "York".to_string();
        let c = TicketDetail::new(900);

        InMemoryBackend::new("http://x/")
            .with_engineer("Alice")
            .with_ticket("Alice", a)
            .with_ticket("alice, Bob", b)
            .with_ticket("Bob", c)
    }

    #[tokio::test]
    async fn test_listing_is_case_insensitive_and_descending() {
        let tickets = backend().list_tickets_by_engineer(" ALICE ").await.unwrap();
        let numbers: Vec<&str> = tickets.iter().map(|t| t.ticket_number.as_str()).collect();
        assert_eq!(numbers, vec!["1002", "1001"]);
    }

    #[tokio::test]
    async fn test_get_ticket_requires_exactly_one_row() {
        let backend = backend();
        assert!(matches!(
            backend.get_ticket(&TicketNumber::from(5)).await,
            Err(TicketDeskError::TicketNotFound(_))
        ));

        backend.insert_ticket("Carol", TicketDetail::new(1001));
        assert!(matches!(
            backend.get_ticket(&TicketNumber::from(1001)).await,
            Err(TicketDeskError::AmbiguousTicket(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_rejects_existing_key() {
        let backend = backend();
        backend.upload_file("1-a.png", b"one", "image/png").await.unwrap();
        let err = backend
            .upload_file("1-a.png", b"two", "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, TicketDeskError::Upload(_)));
        assert_eq!(backend.object("1-a.png").unwrap().0, b"one");
    }

    #[tokio::test]
    async fn test_public_url_is_escaped() {
        let url = backend().resolve_public_url("1-site photo.jpg").await.unwrap();
        assert_eq!(url, "http://x/1-site%20photo.jpg");
    }

    #[tokio::test]
    async fn test_fail_uploads_after() {
        let backend = backend();
        backend.fail_uploads_after(1);
        assert!(backend.upload_file("a", b"", "image/png").await.is_ok());
        assert!(backend.upload_file("b", b"", "image/png").await.is_err());
        assert_eq!(backend.upload_count(), 2);
    }

    #[tokio::test]
    async fn test_delete_absent_ticket_succeeds() {
        let backend = backend();
        backend.delete_ticket(&TicketNumber::from(42)).await.unwrap();
        backend.delete_ticket(&TicketNumber::from(900)).await.unwrap();
        assert!(backend.ticket(&TicketNumber::from(900)).is_none());
    }
}
