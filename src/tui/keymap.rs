//! Key-to-action mapping for the ticket form
//!
//! Converts raw `(KeyCode, KeyModifiers)` pairs into `FormAction` values
//! given the focused field, so the screen component only has to apply
//! actions.

use iocraft::prelude::{KeyCode, KeyModifiers};

use crate::form::FormStage;

/// Which part of the form has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Engineer,
    Ticket,
    Branch,
    Note,
    Priority,
    Paused,
    Completed,
    Uploads,
    Images,
}

impl FormField {
    const TICKET_FIELDS: [FormField; 9] = [
        FormField::Engineer,
        FormField::Ticket,
        FormField::Branch,
        FormField::Note,
        FormField::Priority,
        FormField::Paused,
        FormField::Completed,
        FormField::Uploads,
        FormField::Images,
    ];

    /// Fields shown at `stage`, in focus order
    pub fn visible(stage: FormStage) -> &'static [FormField] {
        match stage {
            FormStage::NoEngineer => &Self::TICKET_FIELDS[..1],
            FormStage::EngineerChosen => &Self::TICKET_FIELDS[..2],
            FormStage::TicketChosen => &Self::TICKET_FIELDS,
        }
    }

    /// Next visible field (wrapping)
    pub fn next(self, stage: FormStage) -> Self {
        let fields = Self::visible(stage);
        match fields.iter().position(|f| *f == self) {
            Some(i) => fields[(i + 1) % fields.len()],
            None => fields[0],
        }
    }

    /// Previous visible field (wrapping)
    pub fn prev(self, stage: FormStage) -> Self {
        let fields = Self::visible(stage);
        match fields.iter().position(|f| *f == self) {
            Some(0) | None => fields[fields.len() - 1],
            Some(i) => fields[i - 1],
        }
    }

    /// Nearest field still visible at `stage`
    pub fn clamp(self, stage: FormStage) -> Self {
        let fields = Self::visible(stage);
        if fields.contains(&self) {
            self
        } else {
            fields[fields.len() - 1]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    NextField,
    PrevField,

    // Lists (engineer, ticket, pending uploads, existing images)
    MoveUp,
    MoveDown,
    Choose,
    RemoveSelected,

    // Inputs
    InsertChar(char),
    Backspace,
    Newline,
    CyclePrev,
    CycleNext,
    Toggle,
    AttachFiles,

    // Form
    Save,
    Delete,
    Escape,
    Quit,
}

/// Map a key press to an action for the focused field.
///
/// Returns `None` for keys that mean nothing in the current context.
pub fn key_to_action(
    code: KeyCode,
    modifiers: KeyModifiers,
    field: FormField,
) -> Option<FormAction> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('q') => Some(FormAction::Quit),
            KeyCode::Char('s') => Some(FormAction::Save),
            KeyCode::Char('d') => Some(FormAction::Delete),
            _ => None,
        };
    }

    match code {
        KeyCode::Esc => return Some(FormAction::Escape),
        KeyCode::Tab if modifiers.contains(KeyModifiers::SHIFT) => {
            return Some(FormAction::PrevField);
        }
        KeyCode::Tab => return Some(FormAction::NextField),
        KeyCode::BackTab => return Some(FormAction::PrevField),
        _ => {}
    }

    match field {
        FormField::Engineer | FormField::Ticket => list_key(code),
        FormField::Images => match code {
            KeyCode::Delete | KeyCode::Char('x') => Some(FormAction::RemoveSelected),
            other => list_key(other).filter(|a| *a != FormAction::Choose),
        },
        FormField::Branch => text_key(code),
        FormField::Note => match code {
            KeyCode::Enter => Some(FormAction::Newline),
            other => text_key(other),
        },
        FormField::Uploads => match code {
            KeyCode::Enter => Some(FormAction::AttachFiles),
            KeyCode::Up => Some(FormAction::MoveUp),
            KeyCode::Down => Some(FormAction::MoveDown),
            KeyCode::Delete => Some(FormAction::RemoveSelected),
            other => text_key(other),
        },
        FormField::Priority => match code {
            KeyCode::Left | KeyCode::Char('h') => Some(FormAction::CyclePrev),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter | KeyCode::Char(' ') => {
                Some(FormAction::CycleNext)
            }
            _ => None,
        },
        FormField::Paused | FormField::Completed => match code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(FormAction::Toggle),
            _ => None,
        },
    }
}

fn list_key(code: KeyCode) -> Option<FormAction> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(FormAction::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(FormAction::MoveDown),
        KeyCode::Enter | KeyCode::Char(' ') => Some(FormAction::Choose),
        _ => None,
    }
}

fn text_key(code: KeyCode) -> Option<FormAction> {
    match code {
        KeyCode::Char(c) => Some(FormAction::InsertChar(c)),
        KeyCode::Backspace => Some(FormAction::Backspace),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_navigation_follows_stage() {
        assert_eq!(
            FormField::Engineer.next(FormStage::NoEngineer),
            FormField::Engineer
        );
        assert_eq!(
            FormField::Engineer.next(FormStage::EngineerChosen),
            FormField::Ticket
        );
        assert_eq!(
            FormField::Ticket.next(FormStage::EngineerChosen),
            FormField::Engineer
        );
        assert_eq!(
            FormField::Ticket.next(FormStage::TicketChosen),
            FormField::Branch
        );
        assert_eq!(
            FormField::Images.next(FormStage::TicketChosen),
            FormField::Engineer
        );
        assert_eq!(
            FormField::Engineer.prev(FormStage::TicketChosen),
            FormField::Images
        );
    }

    #[test]
    fn test_clamp_after_selection_cleared() {
        assert_eq!(
            FormField::Note.clamp(FormStage::EngineerChosen),
            FormField::Ticket
        );
        assert_eq!(
            FormField::Ticket.clamp(FormStage::EngineerChosen),
            FormField::Ticket
        );
        assert_eq!(
            FormField::Ticket.clamp(FormStage::NoEngineer),
            FormField::Engineer
        );
    }

    #[test]
    fn test_global_chords() {
        for field in [FormField::Engineer, FormField::Note, FormField::Uploads] {
            assert_eq!(
                key_to_action(KeyCode::Char('s'), KeyModifiers::CONTROL, field),
                Some(FormAction::Save)
            );
            assert_eq!(
                key_to_action(KeyCode::Char('d'), KeyModifiers::CONTROL, field),
                Some(FormAction::Delete)
            );
            assert_eq!(
                key_to_action(KeyCode::Char('q'), KeyModifiers::CONTROL, field),
                Some(FormAction::Quit)
            );
            assert_eq!(
                key_to_action(KeyCode::Esc, KeyModifiers::NONE, field),
                Some(FormAction::Escape)
            );
        }
    }

    #[test]
    fn test_tab_navigation() {
        assert_eq!(
            key_to_action(KeyCode::Tab, KeyModifiers::NONE, FormField::Note),
            Some(FormAction::NextField)
        );
        assert_eq!(
            key_to_action(KeyCode::Tab, KeyModifiers::SHIFT, FormField::Note),
            Some(FormAction::PrevField)
        );
        assert_eq!(
            key_to_action(KeyCode::BackTab, KeyModifiers::SHIFT, FormField::Note),
            Some(FormAction::PrevField)
        );
    }

    #[test]
    fn test_text_fields_take_letters() {
        assert_eq!(
            key_to_action(KeyCode::Char('j'), KeyModifiers::NONE, FormField::Branch),
            Some(FormAction::InsertChar('j'))
        );
        assert_eq!(
            key_to_action(KeyCode::Char('j'), KeyModifiers::NONE, FormField::Engineer),
            Some(FormAction::MoveDown)
        );
        assert_eq!(
            key_to_action(KeyCode::Enter, KeyModifiers::NONE, FormField::Note),
            Some(FormAction::Newline)
        );
        assert_eq!(
            key_to_action(KeyCode::Enter, KeyModifiers::NONE, FormField::Branch),
            None
        );
    }

    #[test]
    fn test_upload_and_image_lists() {
        assert_eq!(
            key_to_action(KeyCode::Enter, KeyModifiers::NONE, FormField::Uploads),
            Some(FormAction::AttachFiles)
        );
        assert_eq!(
            key_to_action(KeyCode::Delete, KeyModifiers::NONE, FormField::Uploads),
            Some(FormAction::RemoveSelected)
        );
        assert_eq!(
            key_to_action(KeyCode::Char('x'), KeyModifiers::NONE, FormField::Uploads),
            Some(FormAction::InsertChar('x'))
        );
        assert_eq!(
            key_to_action(KeyCode::Char('x'), KeyModifiers::NONE, FormField::Images),
            Some(FormAction::RemoveSelected)
        );
        assert_eq!(
            key_to_action(KeyCode::Enter, KeyModifiers::NONE, FormField::Images),
            None
        );
    }

    #[test]
    fn test_select_and_toggles() {
        assert_eq!(
            key_to_action(KeyCode::Left, KeyModifiers::NONE, FormField::Priority),
            Some(FormAction::CyclePrev)
        );
        assert_eq!(
            key_to_action(KeyCode::Char(' '), KeyModifiers::NONE, FormField::Priority),
            Some(FormAction::CycleNext)
        );
        assert_eq!(
            key_to_action(KeyCode::Char(' '), KeyModifiers::NONE, FormField::Paused),
            Some(FormAction::Toggle)
        );
        assert_eq!(
            key_to_action(KeyCode::Char('a'), KeyModifiers::NONE, FormField::Completed),
            None
        );
    }
}
