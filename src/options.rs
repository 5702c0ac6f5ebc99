//! Option lists for the form's pickers
//!
//! Both the TUI and the CLI present engineers, tickets and note priorities as
//! `value`/`label` pairs built from backend rows.

use serde::Serialize;

use crate::types::{Engineer, NotePriority, TicketNumber, TicketSummary};

/// A single entry in a picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption<T> {
    pub value: T,
    pub label: String,
}

impl<T> SelectOption<T> {
    pub fn new(value: T, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// Engineer names are both the value and the label.
pub fn engineer_options(engineers: &[Engineer]) -> Vec<SelectOption<String>> {
    engineers
        .iter()
        .map(|e| SelectOption::new(e.name.clone(), e.name.clone()))
        .collect()
}

/// Tickets keep the backend order; the label is `"<number> - <branch>"`.
pub fn ticket_options(tickets: &[TicketSummary]) -> Vec<SelectOption<TicketNumber>> {
    tickets
        .iter()
        .map(|t| SelectOption::new(t.ticket_number.clone(), t.label()))
        .collect()
}

pub fn priority_options() -> Vec<SelectOption<NotePriority>> {
    NotePriority::ALL
        .iter()
        .map(|p| SelectOption::new(*p, p.to_string()))
        .collect()
}

/// Index of the option holding `value`, if any
pub fn position_of<T: PartialEq>(options: &[SelectOption<T>], value: &T) -> Option<usize> {
    options.iter().position(|o| &o.value == value)
}

/// Labels in display order
pub fn labels<T>(options: &[SelectOption<T>]) -> Vec<String> {
    options.iter().map(|o| o.label.clone()).collect()
}
