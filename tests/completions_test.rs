use std::process::Command;

mod common;

fn completions(shell: &str) -> String {
    let output = Command::new(common::ticketdesk_binary())
        .args(["completions", shell])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_completions_bash() {
    assert!(completions("bash").contains("_ticketdesk"));
}

#[test]
fn test_completions_zsh() {
    assert!(completions("zsh").contains("#compdef ticketdesk"));
}

#[test]
fn test_completions_fish() {
    let stdout = completions("fish");
    assert!(stdout.contains("complete -c ticketdesk"));
    assert!(stdout.contains("update"));
}

#[test]
fn test_completions_invalid_shell() {
    let output = Command::new(common::ticketdesk_binary())
        .args(["completions", "tcsh"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}
