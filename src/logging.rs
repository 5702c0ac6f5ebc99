//! Diagnostic logging.
//!
//! Off unless `TICKETDESK_LOG` holds a filter directive (for example
//! `ticketdesk=debug`). Events go to stderr, or to `TICKETDESK_LOG_FILE` when
//! set, which is the only useful destination while the full-screen form owns
//! the terminal.

use std::env;
use std::fs::OpenOptions;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TicketDeskError};

pub const LOG_FILTER_ENV: &str = "TICKETDESK_LOG";
pub const LOG_FILE_ENV: &str = "TICKETDESK_LOG_FILE";

/// Filter used when `TICKETDESK_LOG` is unset or invalid
const DEFAULT_FILTER: &str = "off";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Calling it twice is an error.
pub fn init() -> Result<()> {
    let log_file = env::var(LOG_FILE_ENV).ok().filter(|p| !p.is_empty());

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };
    let stderr_layer = file_layer
        .is_none()
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter())
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| TicketDeskError::Other(format!("failed to initialize logging: {e}")))
}
