//! One-shot command implementations behind the CLI.

mod config;
mod form;
mod lookup;
mod update;

pub use config::{cmd_config_path, cmd_config_set, cmd_config_show};
pub use form::cmd_form;
pub use lookup::{cmd_engineers, cmd_show, cmd_tickets};
pub use update::{UpdateOptions, cmd_delete, cmd_update};

use std::sync::Arc;

use serde_json::Value;

use crate::backend::{AnyBackend, InMemoryBackend, SupabaseBackend};
use crate::config::Config;
use crate::error::Result;
use crate::form::TicketUpdateForm;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

/// Result of a command, printable either as text or JSON
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, output: OutputOptions) -> Result<()> {
        match self.text {
            Some(text) if !output.json => println!("{text}"),
            _ => print_json(&self.json)?,
        }
        Ok(())
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Backend selected by `--offline`, plus a short description for display.
pub fn open_backend(config: &Config, offline: bool) -> Result<(AnyBackend, String)> {
    if offline {
        return Ok((
            AnyBackend::Memory(InMemoryBackend::demo()),
            "offline demo".to_string(),
        ));
    }

    let backend = SupabaseBackend::from_config(config)?;
    let source = config.backend_url().unwrap_or_default();
    Ok((AnyBackend::Supabase(backend), source))
}

/// Form controller wired to the configured backend.
pub fn open_form(offline: bool) -> Result<(Arc<TicketUpdateForm<AnyBackend>>, String)> {
    let config = Config::load()?;
    let (backend, source) = open_backend(&config, offline)?;
    let form = TicketUpdateForm::new(Arc::new(backend))
        .with_note_metadata(config.note_metadata_enabled());
    Ok((Arc::new(form), source))
}
