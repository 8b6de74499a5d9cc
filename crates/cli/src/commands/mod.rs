pub mod chat;
pub mod config;
pub mod doctor;
pub mod smoke;

use std::path::Path;

use agenda_core::config::LoadOptions;
use serde::Serialize;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_DOCTOR: u8 = 3;
pub const EXIT_RUNTIME: u8 = 4;
pub const EXIT_SMOKE: u8 = 6;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// Load options honoring a `--config` path when one was given.
pub fn load_options(config_path: Option<&Path>) -> LoadOptions {
    LoadOptions { config_path: config_path.map(Path::to_path_buf), ..LoadOptions::default() }
}

pub(crate) fn current_thread_runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| format!("failed to initialize async runtime: {error}"))
}

pub(crate) fn to_json<T: Serialize>(value: &T, pretty: bool) -> String {
    let rendered =
        if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|error| {
        format!(
            "{{\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            escape_json(&error.to_string())
        )
    })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    to_json(&payload, false)
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
