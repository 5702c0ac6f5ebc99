use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::options::SelectOption;
use crate::types::{NotePriority, TicketDetail, TicketNumber};

use super::upload::PendingUpload;

/// Alert message shown after an upload step fails
pub const UPLOAD_FAILED_MESSAGE: &str = "Error uploading images";
pub const UPDATE_SUCCESS_MESSAGE: &str = "Ticket updated successfully";
pub const DELETE_SUCCESS_MESSAGE: &str = "Ticket deleted successfully";

/// Fields of the selected ticket that the form edits locally
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditableTicket {
    pub company_branch: String,
    pub paused: bool,
    pub completed: bool,
    pub note: String,
    pub note_priority: NotePriority,
    pub note_created_at: Option<String>,
    pub image_urls: Vec<String>,
}

impl From<&TicketDetail> for EditableTicket {
    fn from(detail: &TicketDetail) -> Self {
        Self {
            company_branch: detail.company_branch.clone(),
            paused: detail.paused,
            completed: detail.completed,
            note: detail.note.clone(),
            note_priority: detail.note_priority,
            note_created_at: detail
                .note_created_at
                .clone()
                .filter(|at| !at.trim().is_empty()),
            image_urls: detail.image_urls(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

/// Transient, dismissible message describing the last operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == AlertKind::Error
    }
}

/// What the form is busy doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyAction {
    Saving,
    Deleting,
}

/// Position in the selection flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStage {
    NoEngineer,
    EngineerChosen,
    TicketChosen,
}

/// Everything needed to render the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub engineers: Vec<SelectOption<String>>,
    pub selected_engineer: Option<String>,
    pub tickets: Vec<SelectOption<TicketNumber>>,
    pub selected_ticket: Option<TicketNumber>,
    pub editable: EditableTicket,
    pub pending_uploads: Vec<PendingUpload>,
    pub alert: Option<Alert>,
    pub busy: Option<BusyAction>,
}

impl FormState {
    pub fn stage(&self) -> FormStage {
        match (&self.selected_engineer, &self.selected_ticket) {
            (_, Some(_)) => FormStage::TicketChosen,
            (Some(_), None) => FormStage::EngineerChosen,
            (None, None) => FormStage::NoEngineer,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    pub fn can_submit(&self) -> bool {
        self.selected_ticket.is_some() && !self.is_busy()
    }

    /// Drop the selected ticket and everything derived from it.
    pub(crate) fn reset_ticket(&mut self) {
        self.selected_ticket = None;
        self.editable = EditableTicket::default();
        self.pending_uploads.clear();
    }

    /// The recorded note creation time in the local time zone.
    pub fn note_created_display(&self) -> Option<String> {
        self.editable
            .note_created_at
            .as_deref()
            .map(|raw| format_note_time(raw, &TimeZone::system()))
    }
}

/// Render an RFC 3339 instant in `tz`; anything unparseable is shown verbatim.
pub fn format_note_time(raw: &str, tz: &TimeZone) -> String {
    match raw.parse::<Timestamp>() {
        Ok(ts) => ts
            .to_zoned(tz.clone())
            .strftime("%Y-%m-%d %H:%M:%S %Z")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editable_from_detail_splits_images() {
        let mut detail = TicketDetail::new(1001);
        detail.callreports = "a,b,c".to_string();
        detail.note = "leak".to_string();
        let editable = EditableTicket::from(&detail);
        assert_eq!(editable.image_urls, vec!["a", "b", "c"]);
        assert_eq!(editable.note, "leak");

        detail.callreports = String::new();
        assert!(EditableTicket::from(&detail).image_urls.is_empty());
    }

    #[test]
    fn test_blank_created_at_is_treated_as_missing() {
        let mut detail = TicketDetail::new(1001);
        detail.note_created_at = Some(String::new());
        let state = FormState {
            editable: EditableTicket::from(&detail),
            ..Default::default()
        };
        assert_eq!(state.editable.note_created_at, None);
        assert_eq!(state.note_created_display(), None);
    }

    #[test]
    fn test_stage_and_can_submit() {
        let mut state = FormState::default();
        assert_eq!(state.stage(), FormStage::NoEngineer);
        assert!(!state.can_submit());

        state.selected_engineer = Some("Alice".to_string());
        assert_eq!(state.stage(), FormStage::EngineerChosen);

        state.selected_ticket = Some(TicketNumber::from(1001));
        assert_eq!(state.stage(), FormStage::TicketChosen);
        assert!(state.can_submit());

        state.busy = Some(BusyAction::Saving);
        assert!(!state.can_submit());
    }

    #[test]
    fn test_reset_ticket_clears_editable_and_uploads() {
        let mut state = FormState {
            selected_engineer: Some("Alice".to_string()),
            selected_ticket: Some(TicketNumber::from(1001)),
            ..Default::default()
        };
        state.editable.note = "x".to_string();
        state
            .pending_uploads
            .push(PendingUpload::new("a.png", vec![0u8]));

        state.reset_ticket();
        assert_eq!(state.stage(), FormStage::EngineerChosen);
        assert_eq!(state.editable, EditableTicket::default());
        assert!(state.pending_uploads.is_empty());
    }

    #[test]
    fn test_format_note_time() {
        assert_eq!(
            format_note_time("2024-03-01T09:30:00Z", &TimeZone::UTC),
            "2024-03-01 09:30:00 UTC"
        );
        assert_eq!(format_note_time("yesterday", &TimeZone::UTC), "yesterday");
    }
}
