//! Ticket update form controller.
//!
//! `TicketUpdateForm` owns the form state and drives the backend: engineer
//! and ticket selection, local edits, call report uploads, and the final
//! update or delete. Front ends (the TUI and the one-shot CLI commands) only
//! call these operations and render `snapshot()`.
//!
//! Every operation records its outcome as an [`Alert`] and also returns it
//! as a `Result`, so callers can either render the alert or propagate.

mod state;
mod upload;

use std::sync::Arc;

use jiff::Timestamp;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::backend::{Backend, decode_public_url};
use crate::error::{Result, TicketDeskError};
use crate::options::{engineer_options, ticket_options};
use crate::types::{NoteMetadata, NotePriority, TicketNumber, TicketUpdate, join_callreports};

pub use state::{
    Alert, AlertKind, BusyAction, DELETE_SUCCESS_MESSAGE, EditableTicket, FormStage, FormState,
    UPDATE_SUCCESS_MESSAGE, UPLOAD_FAILED_MESSAGE, format_note_time,
};
pub use upload::PendingUpload;

/// Source of "now" for upload keys and note timestamps
pub type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

struct Inner {
    view: FormState,
    /// Bumped on every engineer selection
    engineer_generation: u64,
    /// Bumped on every engineer or ticket selection
    ticket_generation: u64,
}

pub struct TicketUpdateForm<B: Backend> {
    backend: Arc<B>,
    inner: Mutex<Inner>,
    clock: Clock,
    note_metadata: bool,
}

impl<B: Backend> TicketUpdateForm<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            inner: Mutex::new(Inner {
                view: FormState::default(),
                engineer_generation: 0,
                ticket_generation: 0,
            }),
            clock: Arc::new(Timestamp::now),
            note_metadata: true,
        }
    }

    /// Whether `note_priority`/`note_created_at` are written on submit.
    pub fn with_note_metadata(mut self, enabled: bool) -> Self {
        self.note_metadata = enabled;
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> Timestamp + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Cloned view of the whole form for rendering
    pub fn snapshot(&self) -> FormState {
        self.inner.lock().view.clone()
    }

    pub fn dismiss_alert(&self) {
        self.inner.lock().view.alert = None;
    }

    fn set_alert(&self, alert: Alert) {
        self.inner.lock().view.alert = Some(alert);
    }

    pub async fn load_engineers(&self) -> Result<()> {
        match self.backend.list_engineers().await {
            Ok(engineers) => {
                debug!(count = engineers.len(), "engineers loaded");
                self.inner.lock().view.engineers = engineer_options(&engineers);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to load engineers");
                self.set_alert(Alert::error(format!(
                    "Error loading engineers: {}",
                    e.reason()
                )));
                Err(e)
            }
        }
    }

    /// Choose an engineer and load the tickets listed under them.
    pub async fn select_engineer(&self, engineer: &str) -> Result<()> {
        let generation = {
            let mut inner = self.inner.lock();
            if inner.view.is_busy() {
                return Err(TicketDeskError::Busy);
            }
            inner.engineer_generation += 1;
            inner.ticket_generation += 1;
            inner.view.selected_engineer = Some(engineer.to_string());
            inner.view.tickets.clear();
            inner.view.reset_ticket();
            inner.engineer_generation
        };

        let result = self.backend.list_tickets_by_engineer(engineer).await;

        let mut inner = self.inner.lock();
        if inner.engineer_generation != generation {
            debug!(engineer, "discarding stale ticket list");
            return Ok(());
        }
        match result {
            Ok(tickets) => {
                debug!(engineer, count = tickets.len(), "tickets loaded");
                inner.view.tickets = ticket_options(&tickets);
                Ok(())
            }
            Err(e) => {
                error!(engineer, error = %e, "failed to load tickets");
                inner.view.alert = Some(Alert::error(format!(
                    "Error loading tickets: {}",
                    e.reason()
                )));
                Err(e)
            }
        }
    }

    /// Fetch a ticket and seed the editable fields from it.
    pub async fn select_ticket(&self, ticket_number: &TicketNumber) -> Result<()> {
        let generation = {
            let mut inner = self.inner.lock();
            if inner.view.is_busy() {
                return Err(TicketDeskError::Busy);
            }
            inner.ticket_generation += 1;
            inner.ticket_generation
        };

        let result = self.backend.get_ticket(ticket_number).await;

        let mut inner = self.inner.lock();
        if inner.ticket_generation != generation {
            debug!(%ticket_number, "discarding stale ticket detail");
            return Ok(());
        }
        inner.view.reset_ticket();
        match result {
            Ok(detail) => {
                debug!(%ticket_number, "ticket loaded");
                inner.view.editable = EditableTicket::from(&detail);
                inner.view.selected_ticket = Some(detail.ticket_number);
                Ok(())
            }
            Err(e) => {
                error!(%ticket_number, error = %e, "failed to load ticket");
                inner.view.alert = Some(Alert::error(format!(
                    "Error loading ticket: {}",
                    e.reason()
                )));
                Err(e)
            }
        }
    }

    pub fn clear_ticket_selection(&self) {
        let mut inner = self.inner.lock();
        if inner.view.is_busy() {
            return;
        }
        inner.ticket_generation += 1;
        inner.view.reset_ticket();
    }

    /// Apply `edit` to the editable fields; ignored without a ticket or while busy.
    fn edit(&self, edit: impl FnOnce(&mut FormState)) {
        let mut inner = self.inner.lock();
        if inner.view.selected_ticket.is_none() || inner.view.is_busy() {
            return;
        }
        edit(&mut inner.view);
    }

    pub fn set_company_branch(&self, branch: impl Into<String>) {
        let branch = branch.into();
        self.edit(|v| v.editable.company_branch = branch);
    }

    pub fn set_note(&self, note: impl Into<String>) {
        let note = note.into();
        self.edit(|v| v.editable.note = note);
    }

    pub fn set_note_priority(&self, priority: NotePriority) {
        self.edit(|v| v.editable.note_priority = priority);
    }

    pub fn set_paused(&self, paused: bool) {
        self.edit(|v| v.editable.paused = paused);
    }

    pub fn toggle_paused(&self) {
        self.edit(|v| v.editable.paused = !v.editable.paused);
    }

    pub fn set_completed(&self, completed: bool) {
        self.edit(|v| v.editable.completed = completed);
    }

    pub fn toggle_completed(&self) {
        self.edit(|v| v.editable.completed = !v.editable.completed);
    }

    /// Replace the pending uploads. An empty selection changes nothing.
    pub fn attach_files(&self, files: Vec<PendingUpload>) {
        if files.is_empty() {
            return;
        }
        self.edit(|v| v.pending_uploads = files);
    }

    /// Remove every pending upload named `name`.
    pub fn detach_pending_file(&self, name: &str) {
        self.edit(|v| v.pending_uploads.retain(|u| u.name != name));
    }

    /// Remove one already-stored image URL. Out-of-range indices are ignored.
    pub fn detach_existing_image(&self, index: usize) {
        self.edit(|v| {
            if index < v.editable.image_urls.len() {
                v.editable.image_urls.remove(index);
            }
        });
    }

    /// Mark the form busy for `action`, returning the selected ticket.
    fn begin(&self, action: BusyAction) -> Result<(TicketNumber, FormState)> {
        let mut inner = self.inner.lock();
        if inner.view.is_busy() {
            return Err(TicketDeskError::Busy);
        }
        let ticket_number = inner
            .view
            .selected_ticket
            .clone()
            .ok_or(TicketDeskError::NoTicketSelected)?;
        inner.view.busy = Some(action);
        inner.view.alert = None;
        Ok((ticket_number, inner.view.clone()))
    }

    /// Clear busy and record `alert`; on success also drop the ticket.
    fn finish(&self, alert: Alert, reset: bool) {
        let mut inner = self.inner.lock();
        inner.view.busy = None;
        if reset {
            inner.ticket_generation += 1;
            inner.view.reset_ticket();
        }
        inner.view.alert = Some(alert);
    }

    /// Upload pending files, then write the edited ticket back.
    pub async fn submit(&self) -> Result<()> {
        let (ticket_number, view) = self.begin(BusyAction::Saving)?;
        let now = (self.clock)();

        let uploaded = match self
            .upload_pending(&view.pending_uploads, now.as_millisecond())
            .await
        {
            Ok(urls) => urls,
            Err(e) => {
                error!(%ticket_number, error = %e, "call report upload failed");
                self.finish(Alert::error(UPLOAD_FAILED_MESSAGE), false);
                return Err(e);
            }
        };

        let mut image_urls = view.editable.image_urls.clone();
        image_urls.extend(uploaded);
        let update = self.build_update(&view.editable, &image_urls, now);

        match self.backend.update_ticket(&ticket_number, &update).await {
            Ok(()) => {
                info!(%ticket_number, images = image_urls.len(), "ticket updated");
                self.finish(Alert::success(UPDATE_SUCCESS_MESSAGE), true);
                Ok(())
            }
            Err(e) => {
                error!(%ticket_number, error = %e, "ticket update failed");
                self.finish(
                    Alert::error(format!("Error updating ticket: {}", e.reason())),
                    false,
                );
                Err(e)
            }
        }
    }

    /// Upload in order, stopping at the first failure.
    async fn upload_pending(
        &self,
        uploads: &[PendingUpload],
        stamp_ms: i64,
    ) -> Result<Vec<String>> {
        let mut urls = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let key = upload.storage_key(stamp_ms);
            self.backend
                .upload_file(&key, &upload.content, &upload.content_type)
                .await?;
            let public = self.backend.resolve_public_url(&key).await?;
            let url = decode_public_url(&public)?;
            debug!(key = %key, url = %url, "call report uploaded");
            urls.push(url);
        }
        Ok(urls)
    }

    fn build_update(
        &self,
        editable: &EditableTicket,
        image_urls: &[String],
        now: Timestamp,
    ) -> TicketUpdate {
        let note_metadata = self.note_metadata.then(|| {
            let note_created_at = match &editable.note_created_at {
                Some(existing) => Some(existing.clone()),
                None if !editable.note.is_empty() => Some(now.to_string()),
                None => None,
            };
            NoteMetadata {
                note_priority: editable.note_priority,
                note_created_at,
            }
        });

        TicketUpdate {
            company_branch: editable.company_branch.clone(),
            paused: editable.paused,
            completed: editable.completed,
            note: editable.note.clone(),
            callreports: join_callreports(image_urls),
            note_metadata,
        }
    }

    /// Delete the selected ticket. There is no confirmation at this level.
    pub async fn delete_ticket(&self) -> Result<()> {
        let (ticket_number, _) = self.begin(BusyAction::Deleting)?;

        match self.backend.delete_ticket(&ticket_number).await {
            Ok(()) => {
                info!(%ticket_number, "ticket deleted");
                self.finish(Alert::success(DELETE_SUCCESS_MESSAGE), true);
                Ok(())
            }
            Err(e) => {
                warn!(%ticket_number, error = %e, "ticket delete failed");
                self.finish(
                    Alert::error(format!("Error deleting ticket: {}", e.reason())),
                    false,
                );
                Err(e)
            }
        }
    }
}
