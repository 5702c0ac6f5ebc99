//! Interactive terminal form
//!
//! `screen` hosts the full-screen ticket update form; `components` holds the
//! reusable widgets it is built from.

pub mod components;
pub mod keymap;
pub mod screen;
pub mod theme;

pub use keymap::{FormAction, FormField, key_to_action};
pub use screen::{SharedForm, TicketFormScreen, TicketFormScreenProps};
pub use theme::Theme;
