use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use agenda_core::config::{resolve_config_path, AppConfig};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use toml::Value;

use crate::commands::{load_options, to_json, CommandResult, EXIT_CONFIG};

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

#[derive(Debug, Serialize)]
struct ConfigReport {
    command: &'static str,
    config_file: Option<String>,
    entries: Vec<ConfigEntry>,
}

pub fn run(json_output: bool, config_path: Option<&Path>) -> CommandResult {
    let config = match AppConfig::load(load_options(config_path)) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            )
        }
    };

    let file_path = resolve_config_path(config_path);
    let file_doc = load_config_file_doc(file_path.as_deref());
    let entries = effective_values(&config)
        .into_iter()
        .map(|(key, env_keys, value)| ConfigEntry {
            key,
            value,
            source: field_source(key, env_keys, file_doc.as_ref(), file_path.as_deref()),
        })
        .collect::<Vec<_>>();

    let report = ConfigReport {
        command: "config",
        config_file: file_path.as_ref().map(|path| path.display().to_string()),
        entries,
    };

    let output = if json_output { to_json(&report, true) } else { render_human(&report) };
    CommandResult { exit_code: 0, output }
}

type Row = (&'static str, &'static [&'static str], String);

fn row(key: &'static str, env_keys: &'static [&'static str], value: impl ToString) -> Row {
    (key, env_keys, value.to_string())
}

fn effective_values(config: &AppConfig) -> Vec<Row> {
    let agent = &config.agent;
    let llm = &config.llm;

    vec![
        row("agent.default_timezone", &["AGENDA_DEFAULT_TIMEZONE"], &agent.default_timezone),
        row("agent.session_ttl_secs", &["AGENDA_SESSION_TTL_SECS"], agent.session_ttl_secs),
        row("agent.history_window", &["AGENDA_HISTORY_WINDOW"], agent.history_window),
        row("agent.reap_interval_secs", &["AGENDA_REAP_INTERVAL_SECS"], agent.reap_interval_secs),
        row(
            "agent.implicit_confirmation",
            &["AGENDA_IMPLICIT_CONFIRMATION"],
            agent.implicit_confirmation,
        ),
        row("llm.provider", &["AGENDA_LLM_PROVIDER"], llm.provider.as_str()),
        row("llm.base_url", &["AGENDA_LLM_BASE_URL"], &llm.base_url),
        row("llm.model", &["AGENDA_LLM_MODEL"], &llm.model),
        row("llm.timeout_secs", &["AGENDA_LLM_TIMEOUT_SECS"], llm.timeout_secs),
        row("llm.temperature", &["AGENDA_LLM_TEMPERATURE"], llm.temperature),
        row("llm.max_tokens", &["AGENDA_LLM_MAX_TOKENS"], llm.max_tokens),
        row("calendar.provider", &["AGENDA_CALENDAR_PROVIDER"], config.calendar.provider.as_str()),
        row("calendar.calendar_id", &["AGENDA_CALENDAR_ID"], &config.calendar.calendar_id),
        row("calendar.send_updates", &[], &config.calendar.send_updates),
        row("email.provider", &["AGENDA_EMAIL_PROVIDER"], config.email.provider.as_str()),
        row("email.sender", &["AGENDA_EMAIL_SENDER"], display_or_unset(&config.email.sender)),
        row(
            "google.access_token",
            &["AGENDA_GOOGLE_ACCESS_TOKEN"],
            redact_token(config.google.access_token.as_ref()),
        ),
        row("google.timeout_secs", &["AGENDA_GOOGLE_TIMEOUT_SECS"], config.google.timeout_secs),
        row("server.bind_address", &["AGENDA_SERVER_BIND_ADDRESS"], &config.server.bind_address),
        row("server.port", &["AGENDA_SERVER_PORT"], config.server.port),
        row(
            "server.graceful_shutdown_secs",
            &["AGENDA_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            config.server.graceful_shutdown_secs,
        ),
        row("logging.level", &["AGENDA_LOGGING_LEVEL", "AGENDA_LOG_LEVEL"], &config.logging.level),
        row(
            "logging.format",
            &["AGENDA_LOGGING_FORMAT", "AGENDA_LOG_FORMAT"],
            config.logging.format.as_str(),
        ),
    ]
}

fn render_human(report: &ConfigReport) -> String {
    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(
        report
            .entries
            .iter()
            .map(|entry| format!("- {} = {} (source: {})", entry.key, entry.value, entry.source)),
    );
    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys
        .iter()
        .find(|key| env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false))
    {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("config file"));
            return format!("file ({})", file_path.display());
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn display_or_unset(value: &str) -> String {
    if value.trim().is_empty() {
        "<unset>".to_string()
    } else {
        value.to_string()
    }
}

/// Keeps a recognizable prefix for OAuth tokens (`ya29.***`) and hides the rest.
fn redact_token(token: Option<&SecretString>) -> String {
    let Some(token) = token else {
        return "<unset>".to_string();
    };
    let trimmed = token.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.split_once('.') {
        Some((prefix, _)) if prefix.len() <= 6 => format!("{prefix}.***"),
        _ => "<redacted>".to_string(),
    }
}
