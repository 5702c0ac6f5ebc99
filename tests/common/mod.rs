#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

pub fn ticketdesk_binary() -> &'static str {
    env!("CARGO_BIN_EXE_ticketdesk")
}

/// Helper struct to run ticketdesk commands against an isolated config file
pub struct DeskTest {
    pub temp_dir: TempDir,
}

impl DeskTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        DeskTest { temp_dir }
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.yaml")
    }

    pub fn write_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(ticketdesk_binary())
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("TICKETDESK_CONFIG", self.config_path())
            .env_remove("SUPABASE_URL")
            .env_remove("SUPABASE_ANON_KEY")
            .env_remove("TICKETDESK_LOG")
            .env_remove("TICKETDESK_LOG_FILE")
            .output()
            .expect("Failed to execute ticketdesk command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let stdout = self.run_success(args);
        serde_json::from_str(&stdout).expect("Failed to parse JSON output")
    }
}
