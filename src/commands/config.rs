//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config set`: Set a configuration value
//! - `config path`: Print the config file location

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, OutputOptions};
use crate::config::Config;
use crate::error::Result;

/// Mask a sensitive value by showing only the first 2 and last 2 characters
fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

fn or_unset(value: Option<String>) -> String {
    value.unwrap_or_else(|| "not configured".dimmed().to_string())
}

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let url = config.backend_url();
    let masked_key = config.api_key().as_deref().map(mask_sensitive_value);

    let json_output = json!({
        "backend": {
            "url": url,
            "bucket": config.backend.bucket,
            "engineers_table": config.backend.tables.engineers,
            "tickets_table": config.backend.tables.tickets,
        },
        "auth": {
            "api_key_configured": masked_key.is_some(),
            "api_key": masked_key,
        },
        "schema": {
            "note_metadata": config.note_metadata_enabled(),
        },
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text = String::new();
    text.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    text.push_str(&format!("{}:\n", "backend".cyan()));
    text.push_str(&format!("  url: {}\n", or_unset(url)));
    text.push_str(&format!("  bucket: {}\n", config.backend.bucket));
    text.push_str(&format!(
        "  engineers_table: {}\n",
        config.backend.tables.engineers
    ));
    text.push_str(&format!("  tickets_table: {}\n\n", config.backend.tables.tickets));

    text.push_str(&format!("{}:\n", "auth".cyan()));
    text.push_str(&format!("  api_key: {}\n\n", or_unset(masked_key)));

    text.push_str(&format!("{}:\n", "schema".cyan()));
    text.push_str(&format!(
        "  note_metadata: {}\n\n",
        config.note_metadata_enabled()
    ));

    text.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output).with_text(text).print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;
    config.set_value(key, value)?;
    config.save()?;

    let shown = if key == "auth.api_key" {
        mask_sensitive_value(value)
    } else {
        value.to_string()
    };

    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "success": true,
    }))
    .with_text(format!("Set {} to {}", key.cyan(), shown))
    .print(output)
}

/// Print the path of the configuration file
pub fn cmd_config_path(output: OutputOptions) -> Result<()> {
    let path = Config::config_path();
    CommandOutput::new(json!({ "config_file": path.to_string_lossy() }))
        .with_text(path.display().to_string())
        .print(output)
}
