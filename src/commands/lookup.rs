use owo_colors::OwoColorize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{CommandOutput, OutputOptions, open_backend};
use crate::backend::{EngineerDirectory, TicketDirectory, TicketRecordStore};
use crate::config::Config;
use crate::error::Result;
use crate::form::format_note_time;
use crate::types::{NotePriority, TicketDetail, TicketNumber};

/// A row in the ticket list table
#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "Ticket")]
    ticket_number: String,
    #[tabled(rename = "Branch")]
    company_branch: String,
}

/// List every engineer in the directory
pub async fn cmd_engineers(offline: bool, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let (backend, _) = open_backend(&config, offline)?;
    let engineers = backend.list_engineers().await?;

    let text = if engineers.is_empty() {
        "No engineers found".dimmed().to_string()
    } else {
        engineers
            .iter()
            .map(|e| e.name.clone())
            .collect::<Vec<_>>()
            .join("\n")
    };

    CommandOutput::new(json!(engineers)).with_text(text).print(output)
}

/// List the tickets whose engineer field mentions `engineer`
pub async fn cmd_tickets(engineer: &str, offline: bool, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let (backend, _) = open_backend(&config, offline)?;
    let tickets = backend.list_tickets_by_engineer(engineer).await?;

    let text = if tickets.is_empty() {
        format!("No tickets for {}", engineer.cyan())
    } else {
        let rows: Vec<TicketRow> = tickets
            .iter()
            .map(|t| TicketRow {
                ticket_number: t.ticket_number.to_string(),
                company_branch: t.company_branch.clone(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        table.to_string()
    };

    CommandOutput::new(json!(tickets)).with_text(text).print(output)
}

/// Display one ticket record
pub async fn cmd_show(ticket: &str, offline: bool, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let (backend, _) = open_backend(&config, offline)?;
    let detail = backend.get_ticket(&TicketNumber::new(ticket)).await?;

    CommandOutput::new(ticket_json(&detail))
        .with_text(format_detail(&detail))
        .print(output)
}

pub(super) fn ticket_json(detail: &TicketDetail) -> serde_json::Value {
    json!({
        "ticket_number": detail.ticket_number,
        "company_branch": detail.company_branch,
        "paused": detail.paused,
        "completed": detail.completed,
        "note": detail.note,
        "note_priority": detail.note_priority,
        "note_created_at": detail.note_created_at,
        "images": detail.image_urls(),
    })
}

fn format_priority(priority: NotePriority) -> String {
    let label = priority.to_string();
    match priority {
        NotePriority::High => label.red().to_string(),
        NotePriority::Medium => label.yellow().to_string(),
        NotePriority::Low => label.green().to_string(),
        NotePriority::None => label.dimmed().to_string(),
    }
}

fn yes_no(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".dimmed().to_string()
    }
}

pub(super) fn format_detail(detail: &TicketDetail) -> String {
    let mut text = String::new();
    text.push_str(&format!(
        "{} {}\n",
        "Ticket".bold(),
        detail.ticket_number.to_string().cyan().bold()
    ));
    text.push_str(&format!("  branch:    {}\n", detail.company_branch));
    text.push_str(&format!("  paused:    {}\n", yes_no(detail.paused)));
    text.push_str(&format!("  completed: {}\n", yes_no(detail.completed)));
    text.push_str(&format!(
        "  priority:  {}\n",
        format_priority(detail.note_priority)
    ));

    if detail.note.is_empty() {
        text.push_str(&format!("  note:      {}\n", "(none)".dimmed()));
    } else {
        text.push_str("  note:\n");
        for line in detail.note.lines() {
            text.push_str(&format!("    {line}\n"));
        }
    }
    if let Some(created) = &detail.note_created_at {
        let shown = format_note_time(created, &jiff::tz::TimeZone::system());
        text.push_str(&format!("  {}\n", format!("note created at {shown}").dimmed()));
    }

    let images = detail.image_urls();
    if images.is_empty() {
        text.push_str(&format!("  images:    {}", "(none)".dimmed()));
    } else {
        text.push_str("  images:");
        for (index, url) in images.iter().enumerate() {
            text.push_str(&format!("\n    [{index}] {url}"));
        }
    }
    text
}
