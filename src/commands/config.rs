//! Configuration commands.
//!
//! - `config set`: Set a configuration value
//! - `config show`: Display current configuration

use owo_colors::OwoColorize;
use secrecy::ExposeSecret;
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::{Config, FIREBASE_API_KEY_ENV, mask_secret};
use crate::error::Result;

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let config_path = Config::config_path()?;
    let storage_path = config.storage_path()?;
    let api_key = config.firebase_api_key();
    let masked_key = api_key.as_ref().map(|k| mask_secret(k.expose_secret()));

    let json_output = json!({
        "api_base_url": config.api_base_url(),
        "request_timeout": config.request_timeout,
        "banner_timeout_ms": config.banner_timeout_ms,
        "page_size": config.page_size,
        "storage_path": storage_path.to_string_lossy(),
        "firebase": {
            "project_id": config.firebase_project_id(),
            "api_key": masked_key,
        },
        "config_file": config_path.to_string_lossy(),
    });

    let not_set = || "not configured".dimmed().to_string();
    let mut text = String::new();
    text.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));
    text.push_str(&format!("{}: {}\n", "api_base_url".cyan(), config.api_base_url()));
    text.push_str(&format!(
        "{}: {}s\n",
        "request_timeout".cyan(),
        config.request_timeout
    ));
    text.push_str(&format!(
        "{}: {}ms\n",
        "banner_timeout_ms".cyan(),
        config.banner_timeout_ms
    ));
    text.push_str(&format!("{}: {}\n", "page_size".cyan(), config.page_size));
    text.push_str(&format!(
        "{}: {}\n\n",
        "storage_path".cyan(),
        storage_path.display()
    ));

    text.push_str(&format!("{}:\n", "firebase".cyan()));
    text.push_str(&format!(
        "  project_id: {}\n",
        config
            .firebase_project_id()
            .map(str::to_string)
            .unwrap_or_else(not_set)
    ));
    let key_source = if config.firebase.api_key.is_none() && api_key.is_some() {
        format!(" (from {FIREBASE_API_KEY_ENV})")
    } else {
        String::new()
    };
    text.push_str(&format!(
        "  api_key: {}{}\n\n",
        masked_key.unwrap_or_else(not_set),
        key_source.dimmed()
    ));
    text.push_str(&format!(
        "{}",
        format!("Config file: {}", config_path.display()).dimmed()
    ));

    CommandOutput::new(json_output).with_text(text).print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;
    config.set_value(key, value)?;
    config.save()?;

    let shown = if key == "firebase.api_key" {
        mask_secret(value)
    } else {
        value.trim().to_string()
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
