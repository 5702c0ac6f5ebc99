pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod options;
pub mod tui;
pub mod types;

pub use backend::{AnyBackend, Backend, InMemoryBackend, SupabaseBackend};
pub use config::Config;
pub use error::{Result, TicketDeskError};
pub use form::{Alert, AlertKind, FormStage, FormState, PendingUpload, TicketUpdateForm};
pub use options::SelectOption;
pub use types::{
    Engineer, NotePriority, TicketDetail, TicketNumber, TicketSummary, TicketUpdate,
};
