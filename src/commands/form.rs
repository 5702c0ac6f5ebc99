use iocraft::prelude::*;

use super::open_form;
use crate::error::{Result, TicketDeskError};
use crate::tui::TicketFormScreen;

/// Run the full-screen ticket update form
pub async fn cmd_form(offline: bool) -> Result<()> {
    let (form, source) = open_form(offline)?;

    element!(TicketFormScreen(form: Some(form), source: Some(source)))
        .fullscreen()
        .await
        .map_err(|e| TicketDeskError::Other(format!("TUI error: {}", e)))
}
