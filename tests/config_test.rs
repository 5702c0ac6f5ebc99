mod common;

use common::DeskTest;
use std::fs;

// ============================================================================
// Config command tests
// ============================================================================

#[test]
fn test_config_show_empty() {
    let desk = DeskTest::new();

    let output = desk.run_success(&["config", "show"]);
    assert!(output.contains("Configuration"));
    assert!(output.contains("not configured"));
    assert!(output.contains("call-reports"));
    assert!(output.contains("ticket_main"));
}

#[test]
fn test_config_path_honours_env() {
    let desk = DeskTest::new();

    let output = desk.run_success(&["config", "path"]);
    assert_eq!(output.trim(), desk.config_path().display().to_string());
}

#[test]
fn test_config_set_writes_yaml() {
    let desk = DeskTest::new();

    desk.run_success(&["config", "set", "backend.url", "https://demo.supabase.co/"]);
    desk.run_success(&["config", "set", "backend.tickets_table", "tickets"]);
    desk.run_success(&["config", "set", "schema.note_metadata", "false"]);

    let content = fs::read_to_string(desk.config_path()).unwrap();
    assert!(content.contains("https://demo.supabase.co"));
    assert!(!content.contains("supabase.co/"));
    assert!(content.contains("tickets: tickets"));
    assert!(content.contains("note_metadata: false"));
}

#[test]
fn test_config_show_masks_api_key() {
    let desk = DeskTest::new();

    let output = desk.run_success(&["config", "set", "auth.api_key", "anon-secret-key"]);
    assert!(!output.contains("anon-secret-key"));

    let json = desk.run_json(&["config", "show", "--json"]);
    assert_eq!(json["auth"]["api_key_configured"], true);
    assert_eq!(json["auth"]["api_key"], "an...ey");

    let text = desk.run_success(&["config", "show"]);
    assert!(!text.contains("anon-secret-key"));
}

#[test]
fn test_config_set_invalid_key() {
    let desk = DeskTest::new();

    let stderr = desk.run_failure(&["config", "set", "backend.port", "5432"]);
    assert!(stderr.contains("unknown config key"));
    assert!(!desk.config_path().exists());
}

#[test]
fn test_config_set_invalid_values() {
    let desk = DeskTest::new();

    desk.run_failure(&["config", "set", "backend.url", "not a url"]);
    desk.run_failure(&["config", "set", "schema.note_metadata", "maybe"]);
}

#[test]
fn test_malformed_config_file_is_reported() {
    let desk = DeskTest::new();
    fs::write(desk.config_path(), "backend: [unclosed").unwrap();

    let stderr = desk.run_failure(&["config", "show"]);
    assert!(stderr.contains("YAML parse error"));
}

#[test]
fn test_missing_api_key_is_reported() {
    let desk = DeskTest::new();
    desk.run_success(&["config", "set", "backend.url", "https://demo.supabase.co"]);

    let stderr = desk.run_failure(&["engineers"]);
    assert!(stderr.contains("SUPABASE_ANON_KEY"));
}
