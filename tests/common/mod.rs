#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::Arc;
use std::time::Duration;

use backoffice::session::UserData;
use backoffice::{ApiClient, CredentialStore, KeyValueStore, MemoryStore};
use secrecy::SecretString;
use tempfile::TempDir;

pub fn backoffice_binary() -> &'static str {
    env!("CARGO_BIN_EXE_backoffice")
}

/// Runs the binary against a config file and store in a temp directory.
pub struct BackofficeTest {
    pub temp_dir: TempDir,
}

impl BackofficeTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let test = BackofficeTest { temp_dir };
        test.write_config(&format!(
            "storage_path: {}\n",
            test.storage_path().display()
        ));
        test
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.yaml")
    }

    pub fn storage_path(&self) -> PathBuf {
        self.temp_dir.path().join("storage.json")
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).expect("Failed to write config file");
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.config_path()).expect("Failed to read config file")
    }

    pub fn read_storage(&self) -> String {
        fs::read_to_string(self.storage_path()).unwrap_or_default()
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(backoffice_binary())
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("BACKOFFICE_CONFIG", self.config_path())
            .env_remove("BACKOFFICE_API_URL")
            .env_remove("BACKOFFICE_FIREBASE_API_KEY")
            .env_remove("BACKOFFICE_LOG")
            .output()
            .expect("Failed to execute backoffice command")
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
        serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("Command {args:?} printed invalid JSON ({e}): {stdout}"))
    }
}

/// Credential store holding a session for user 7.
pub fn signed_in_credentials() -> CredentialStore {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let credentials = CredentialStore::new(store);
    let mut user = UserData::new("ada@example.com", "Ada Lovelace");
    user.id = Some("7".to_string());
    credentials
        .set_session(&SecretString::from("test-token".to_string()), &user)
        .expect("Failed to store session");
    credentials
}

pub fn api_client(base_url: &str, credentials: CredentialStore) -> ApiClient {
    ApiClient::new(base_url, credentials, Duration::from_secs(5)).expect("Failed to build client")
}
