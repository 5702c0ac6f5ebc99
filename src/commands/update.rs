use std::path::PathBuf;

use owo_colors::OwoColorize;
use serde_json::json;

use super::lookup::{format_detail, ticket_json};
use super::{CommandOutput, OutputOptions, open_form};
use crate::backend::TicketRecordStore;
use crate::error::{Result, TicketDeskError};
use crate::form::{DELETE_SUCCESS_MESSAGE, PendingUpload, UPDATE_SUCCESS_MESSAGE};
use crate::types::{NotePriority, TicketNumber};

/// Edits requested by `ticketdesk update`
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub branch: Option<String>,
    pub note: Option<String>,
    pub priority: Option<NotePriority>,
    pub paused: Option<bool>,
    pub completed: Option<bool>,
    /// Files to upload as new call reports
    pub attach: Vec<PathBuf>,
    /// Indices into the ticket's existing image list
    pub remove_images: Vec<usize>,
}

/// Indices to detach, highest first so earlier removals don't shift later ones.
fn removal_order(indices: &[usize], image_count: usize) -> Result<Vec<usize>> {
    if let Some(bad) = indices.iter().find(|&&i| i >= image_count) {
        return Err(TicketDeskError::Other(format!(
            "image index {bad} out of range (ticket has {image_count} images)"
        )));
    }
    let mut order = indices.to_vec();
    order.sort_unstable_by(|a, b| b.cmp(a));
    order.dedup();
    Ok(order)
}

/// Edit one ticket and submit it, the same way the form does
pub async fn cmd_update(
    ticket: &str,
    options: UpdateOptions,
    offline: bool,
    output: OutputOptions,
) -> Result<()> {
    let ticket_number = TicketNumber::new(ticket);
    let (form, _) = open_form(offline)?;
    form.select_ticket(&ticket_number).await?;

    if let Some(branch) = options.branch {
        form.set_company_branch(branch);
    }
    if let Some(note) = options.note {
        form.set_note(note);
    }
    if let Some(priority) = options.priority {
        form.set_note_priority(priority);
    }
    if let Some(paused) = options.paused {
        form.set_paused(paused);
    }
    if let Some(completed) = options.completed {
        form.set_completed(completed);
    }

    let image_count = form.snapshot().editable.image_urls.len();
    for index in removal_order(&options.remove_images, image_count)? {
        form.detach_existing_image(index);
    }

    let mut uploads = Vec::with_capacity(options.attach.len());
    for path in &options.attach {
        uploads.push(PendingUpload::from_path(path).await?);
    }
    let uploaded = uploads.len();
    form.attach_files(uploads);

    form.submit().await?;

    let detail = form.backend().get_ticket(&ticket_number).await?;
    CommandOutput::new(json!({
        "action": "ticket_updated",
        "ticket_number": ticket_number,
        "uploaded": uploaded,
        "ticket": ticket_json(&detail),
    }))
    .with_text(format!(
        "{}\n\n{}",
        UPDATE_SUCCESS_MESSAGE.green(),
        format_detail(&detail)
    ))
    .print(output)
}

/// Delete one ticket. Requires `--yes`.
pub async fn cmd_delete(
    ticket: &str,
    yes: bool,
    offline: bool,
    output: OutputOptions,
) -> Result<()> {
    let ticket_number = TicketNumber::new(ticket);
    if !yes {
        return Err(TicketDeskError::Other(format!(
            "refusing to delete ticket '{ticket_number}' without --yes"
        )));
    }

    let (form, _) = open_form(offline)?;
    form.select_ticket(&ticket_number).await?;
    form.delete_ticket().await?;

    CommandOutput::new(json!({
        "action": "ticket_deleted",
        "ticket_number": ticket_number,
        "success": true,
    }))
    .with_text(format!(
        "{} ({})",
        DELETE_SUCCESS_MESSAGE.green(),
        ticket_number.to_string().cyan()
    ))
    .print(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_order_is_descending_and_unique() {
        assert_eq!(removal_order(&[0, 2, 2, 1], 3).unwrap(), vec![2, 1, 0]);
        assert!(removal_order(&[], 0).unwrap().is_empty());
    }

    #[test]
    fn test_removal_order_rejects_out_of_range() {
        let err = removal_order(&[1, 3], 3).unwrap_err();
        assert!(err.to_string().contains("image index 3 out of range"));
    }
}
