use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;
use std::path::PathBuf;

use crate::commands::OutputOptions;
use crate::types::{NotePriority, VALID_NOTE_PRIORITIES};

#[derive(Parser)]
#[command(name = "ticketdesk")]
#[command(about = "Update field-service tickets and their call reports")]
#[command(version)]
pub struct Cli {
    /// Use the built-in demo data instead of the configured backend
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Run the chosen subcommand, or the interactive form when none is given.
    pub async fn run(self) -> crate::error::Result<()> {
        let command = self.command.unwrap_or(Commands::Form);
        command.run(self.offline).await
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive ticket update form (default)
    #[command(visible_alias = "f")]
    Form,

    /// List engineers
    Engineers {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the tickets assigned to an engineer
    #[command(visible_alias = "ls")]
    Tickets {
        /// Engineer name (matched as a case-insensitive substring)
        #[arg(value_parser = parse_non_empty)]
        engineer: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display one ticket
    #[command(visible_alias = "s")]
    Show {
        /// Ticket number
        #[arg(value_parser = parse_non_empty)]
        ticket: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a ticket and upload call reports
    #[command(visible_alias = "u")]
    Update {
        /// Ticket number
        #[arg(value_parser = parse_non_empty)]
        ticket: String,

        /// New company branch
        #[arg(long)]
        branch: Option<String>,

        /// New note text
        #[arg(long)]
        note: Option<String>,

        /// Note priority: None, Low, Medium, High (case-insensitive)
        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<NotePriority>,

        /// Mark the ticket paused (true or false)
        #[arg(long, value_parser = parse_bool_strict)]
        paused: Option<bool>,

        /// Mark the ticket completed (true or false)
        #[arg(long, value_parser = parse_bool_strict)]
        completed: Option<bool>,

        /// File to upload as a call report (repeatable)
        #[arg(short, long = "attach")]
        attach: Vec<PathBuf>,

        /// Index of an existing image to remove (repeatable, see `show`)
        #[arg(long = "remove-image")]
        remove_image: Vec<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a ticket
    Delete {
        /// Ticket number
        #[arg(value_parser = parse_non_empty)]
        ticket: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a configuration value
    Set {
        /// Config key (e.g. backend.url, auth.api_key, schema.note_metadata)
        key: String,
        /// Value to set
        value: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the config file path
    Path {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self, offline: bool) -> crate::error::Result<()> {
        use crate::commands::{
            UpdateOptions, cmd_config_path, cmd_config_set, cmd_config_show, cmd_delete,
            cmd_engineers, cmd_form, cmd_show, cmd_tickets, cmd_update,
        };

        match self {
            Commands::Form => cmd_form(offline).await,

            Commands::Engineers { json } => cmd_engineers(offline, OutputOptions { json }).await,

            Commands::Tickets { engineer, json } => {
                cmd_tickets(&engineer, offline, OutputOptions { json }).await
            }

            Commands::Show { ticket, json } => {
                cmd_show(&ticket, offline, OutputOptions { json }).await
            }

            Commands::Update {
                ticket,
                branch,
                note,
                priority,
                paused,
                completed,
                attach,
                remove_image,
                json,
            } => {
                let options = UpdateOptions {
                    branch,
                    note,
                    priority,
                    paused,
                    completed,
                    attach,
                    remove_images: remove_image,
                };
                cmd_update(&ticket, options, offline, OutputOptions { json }).await
            }

            Commands::Delete { ticket, yes, json } => {
                cmd_delete(&ticket, yes, offline, OutputOptions { json }).await
            }

            Commands::Config { action } => match action {
                ConfigAction::Show { json } => cmd_config_show(OutputOptions { json }),
                ConfigAction::Set { key, value, json } => {
                    cmd_config_set(&key, &value, OutputOptions { json })
                }
                ConfigAction::Path { json } => cmd_config_path(OutputOptions { json }),
            },

            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn parse_with_validation<T, F>(
    s: &str,
    parser: F,
    field_name: &str,
    valid_values: &[&str],
) -> Result<T, String>
where
    F: FnOnce(&str) -> Result<T, String>,
{
    parser(s).map_err(|_| {
        format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        )
    })
}

fn parse_priority(s: &str) -> Result<NotePriority, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "priority",
        VALID_NOTE_PRIORITIES,
    )
}

fn parse_non_empty(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("value cannot be empty".to_string());
    }
    Ok(trimmed.to_string())
}

fn parse_bool_strict(s: &str) -> Result<bool, String> {
    match s.to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!(
            "Invalid boolean value '{s}'. Must be 'true' or 'false'"
        )),
    }
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "ticketdesk", &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_bool_strict() {
        assert_eq!(parse_bool_strict("true"), Ok(true));
        assert_eq!(parse_bool_strict("FALSE"), Ok(false));
        assert!(parse_bool_strict("yes").is_err());
        assert!(parse_bool_strict("1").is_err());
        assert!(parse_bool_strict("").is_err());
    }

    #[test]
    fn test_parse_bool_strict_error_message() {
        let err = parse_bool_strict("yes").unwrap_err();
        assert!(err.contains("yes"), "Error should contain the invalid value");
        assert!(
            err.contains("true") && err.contains("false"),
            "Error should list valid values"
        );
    }

    #[test]
    fn test_parse_priority() {
        assert_eq!(parse_priority("high"), Ok(NotePriority::High));
        let err = parse_priority("urgent").unwrap_err();
        assert_eq!(err, "Invalid priority. Must be one of: None, Low, Medium, High");
    }

    #[test]
    fn test_parse_non_empty() {
        assert_eq!(parse_non_empty(" 1042 "), Ok("1042".to_string()));
        assert!(parse_non_empty("   ").is_err());
    }

    #[test]
    fn test_no_subcommand_defaults_to_form() {
        let cli = Cli::try_parse_from(["ticketdesk", "--offline"]).unwrap();
        assert!(cli.offline);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_update_collects_repeated_flags() {
        let cli = Cli::try_parse_from([
            "ticketdesk",
            "update",
            "1042",
            "--attach",
            "a.jpg",
            "--attach",
            "b.pdf",
            "--remove-image",
            "0",
            "--paused",
            "True",
            "--offline",
        ])
        .unwrap();
        assert!(cli.offline);
        match cli.command {
            Some(Commands::Update {
                ticket,
                attach,
                remove_image,
                paused,
                completed,
                ..
            }) => {
                assert_eq!(ticket, "1042");
                assert_eq!(attach, vec![PathBuf::from("a.jpg"), PathBuf::from("b.pdf")]);
                assert_eq!(remove_image, vec![0]);
                assert_eq!(paused, Some(true));
                assert_eq!(completed, None);
            }
            _ => panic!("expected update command"),
        }
    }

    #[test]
    fn test_update_rejects_loose_booleans() {
        assert!(
            Cli::try_parse_from(["ticketdesk", "update", "1042", "--completed", "yes"]).is_err()
        );
    }
}
