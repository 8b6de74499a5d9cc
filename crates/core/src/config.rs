use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::resolve_timezone;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub llm: LlmConfig,
    pub calendar: CalendarConfig,
    pub email: EmailConfig,
    pub google: GoogleConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub default_timezone: String,
    pub session_ttl_secs: u64,
    pub history_window: usize,
    pub reap_interval_secs: u64,
    /// Treat an affirmative reply with complete slots as a confirmation even
    /// when no summary was shown yet.
    pub implicit_confirmation: bool,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Clone, Debug)]
pub struct CalendarConfig {
    pub provider: CalendarProvider,
    pub calendar_id: String,
    pub send_updates: String,
}

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub provider: EmailProvider,
    pub sender: String,
}

#[derive(Clone, Debug)]
pub struct GoogleConfig {
    pub access_token: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Ollama,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarProvider {
    Google,
    DryRun,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailProvider {
    Gmail,
    DryRun,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub default_timezone: Option<String>,
    pub session_ttl_secs: Option<u64>,
    pub log_level: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub calendar_provider: Option<CalendarProvider>,
    pub email_provider: Option<EmailProvider>,
    pub email_sender: Option<String>,
    pub google_access_token: Option<String>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig {
                default_timezone: "America/Chicago".to_string(),
                session_ttl_secs: 900,
                history_window: 8,
                reap_interval_secs: 60,
                implicit_confirmation: true,
            },
            llm: LlmConfig {
                provider: LlmProvider::Ollama,
                base_url: "http://127.0.0.1:11434".to_string(),
                model: "phi3:mini".to_string(),
                timeout_secs: 480,
                temperature: 0.2,
                max_tokens: 160,
            },
            calendar: CalendarConfig {
                provider: CalendarProvider::DryRun,
                calendar_id: "primary".to_string(),
                send_updates: "all".to_string(),
            },
            email: EmailConfig { provider: EmailProvider::DryRun, sender: String::new() },
            google: GoogleConfig { access_token: None, timeout_secs: 30 },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected ollama)"
            ))),
        }
    }
}

impl std::str::FromStr for CalendarProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "google" => Ok(Self::Google),
            "dry_run" => Ok(Self::DryRun),
            other => Err(ConfigError::Validation(format!(
                "unsupported calendar provider `{other}` (expected google|dry_run)"
            ))),
        }
    }
}

impl std::str::FromStr for EmailProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "gmail" => Ok(Self::Gmail),
            "dry_run" => Ok(Self::DryRun),
            other => Err(ConfigError::Validation(format!(
                "unsupported email provider `{other}` (expected gmail|dry_run)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl LlmProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
        }
    }
}

impl CalendarProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::DryRun => "dry_run",
        }
    }
}

impl EmailProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gmail => "gmail",
            Self::DryRun => "dry_run",
        }
    }
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl AgentConfig {
    /// Resolved default zone. Falls back to UTC only for configs that skipped
    /// validation.
    pub fn default_tz(&self) -> Tz {
        resolve_timezone(&self.default_timezone).unwrap_or(Tz::UTC)
    }
}

impl GoogleConfig {
    pub fn has_access_token(&self) -> bool {
        self.access_token
            .as_ref()
            .map(|token| !token.expose_secret().trim().is_empty())
            .unwrap_or(false)
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("agenda.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn uses_google(&self) -> bool {
        self.calendar.provider == CalendarProvider::Google
            || self.email.provider == EmailProvider::Gmail
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(agent) = patch.agent {
            if let Some(default_timezone) = agent.default_timezone {
                self.agent.default_timezone = default_timezone;
            }
            if let Some(session_ttl_secs) = agent.session_ttl_secs {
                self.agent.session_ttl_secs = session_ttl_secs;
            }
            if let Some(history_window) = agent.history_window {
                self.agent.history_window = history_window;
            }
            if let Some(reap_interval_secs) = agent.reap_interval_secs {
                self.agent.reap_interval_secs = reap_interval_secs;
            }
            if let Some(implicit_confirmation) = agent.implicit_confirmation {
                self.agent.implicit_confirmation = implicit_confirmation;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
            if let Some(temperature) = llm.temperature {
                self.llm.temperature = temperature;
            }
            if let Some(max_tokens) = llm.max_tokens {
                self.llm.max_tokens = max_tokens;
            }
        }

        if let Some(calendar) = patch.calendar {
            if let Some(provider) = calendar.provider {
                self.calendar.provider = provider;
            }
            if let Some(calendar_id) = calendar.calendar_id {
                self.calendar.calendar_id = calendar_id;
            }
            if let Some(send_updates) = calendar.send_updates {
                self.calendar.send_updates = send_updates;
            }
        }

        if let Some(email) = patch.email {
            if let Some(provider) = email.provider {
                self.email.provider = provider;
            }
            if let Some(sender) = email.sender {
                self.email.sender = sender;
            }
        }

        if let Some(google) = patch.google {
            if let Some(access_token_value) = google.access_token {
                self.google.access_token = Some(secret_value(access_token_value));
            }
            if let Some(timeout_secs) = google.timeout_secs {
                self.google.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("AGENDA_DEFAULT_TIMEZONE") {
            self.agent.default_timezone = value;
        }
        if let Some(value) = read_env("AGENDA_SESSION_TTL_SECS") {
            self.agent.session_ttl_secs = parse_u64("AGENDA_SESSION_TTL_SECS", &value)?;
        }
        if let Some(value) = read_env("AGENDA_HISTORY_WINDOW") {
            self.agent.history_window = parse_usize("AGENDA_HISTORY_WINDOW", &value)?;
        }
        if let Some(value) = read_env("AGENDA_REAP_INTERVAL_SECS") {
            self.agent.reap_interval_secs = parse_u64("AGENDA_REAP_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = read_env("AGENDA_IMPLICIT_CONFIRMATION") {
            self.agent.implicit_confirmation =
                parse_bool("AGENDA_IMPLICIT_CONFIRMATION", &value)?;
        }

        if let Some(value) = read_env("AGENDA_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("AGENDA_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("AGENDA_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("AGENDA_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("AGENDA_LLM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("AGENDA_LLM_TEMPERATURE") {
            self.llm.temperature = parse_f32("AGENDA_LLM_TEMPERATURE", &value)?;
        }
        if let Some(value) = read_env("AGENDA_LLM_MAX_TOKENS") {
            self.llm.max_tokens = parse_u32("AGENDA_LLM_MAX_TOKENS", &value)?;
        }

        if let Some(value) = read_env("AGENDA_CALENDAR_PROVIDER") {
            self.calendar.provider = value.parse()?;
        }
        if let Some(value) = read_env("AGENDA_CALENDAR_ID") {
            self.calendar.calendar_id = value;
        }

        if let Some(value) = read_env("AGENDA_EMAIL_PROVIDER") {
            self.email.provider = value.parse()?;
        }
        if let Some(value) = read_env("AGENDA_EMAIL_SENDER") {
            self.email.sender = value;
        }

        if let Some(value) = read_env("AGENDA_GOOGLE_ACCESS_TOKEN") {
            self.google.access_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("AGENDA_GOOGLE_TIMEOUT_SECS") {
            self.google.timeout_secs = parse_u64("AGENDA_GOOGLE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("AGENDA_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("AGENDA_SERVER_PORT") {
            self.server.port = parse_u16("AGENDA_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("AGENDA_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("AGENDA_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level = read_env("AGENDA_LOGGING_LEVEL").or_else(|| read_env("AGENDA_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("AGENDA_LOGGING_FORMAT").or_else(|| read_env("AGENDA_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(default_timezone) = overrides.default_timezone {
            self.agent.default_timezone = default_timezone;
        }
        if let Some(session_ttl_secs) = overrides.session_ttl_secs {
            self.agent.session_ttl_secs = session_ttl_secs;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_base_url) = overrides.llm_base_url {
            self.llm.base_url = llm_base_url;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(calendar_provider) = overrides.calendar_provider {
            self.calendar.provider = calendar_provider;
        }
        if let Some(email_provider) = overrides.email_provider {
            self.email.provider = email_provider;
        }
        if let Some(email_sender) = overrides.email_sender {
            self.email.sender = email_sender;
        }
        if let Some(google_access_token) = overrides.google_access_token {
            self.google.access_token = Some(secret_value(google_access_token));
        }
        if let Some(server_port) = overrides.server_port {
            self.server.port = server_port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_agent(&self.agent)?;
        validate_llm(&self.llm)?;
        validate_providers(self)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Config file lookup: explicit path, then `AGENDA_CONFIG`, then the two
/// conventional locations relative to the working directory.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    if let Some(path) = read_env("AGENDA_CONFIG") {
        let path = PathBuf::from(path);
        return path.exists().then_some(path);
    }

    [PathBuf::from("agenda.toml"), PathBuf::from("config/agenda.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_agent(agent: &AgentConfig) -> Result<(), ConfigError> {
    if resolve_timezone(&agent.default_timezone).is_none() {
        return Err(ConfigError::Validation(format!(
            "agent.default_timezone `{}` is not a known IANA zone (for example America/Chicago)",
            agent.default_timezone
        )));
    }

    if agent.session_ttl_secs == 0 {
        return Err(ConfigError::Validation(
            "agent.session_ttl_secs must be greater than zero".to_string(),
        ));
    }

    if agent.history_window == 0 || agent.history_window > 64 {
        return Err(ConfigError::Validation(
            "agent.history_window must be in range 1..=64".to_string(),
        ));
    }

    if agent.reap_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "agent.reap_interval_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 3600 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=3600".to_string(),
        ));
    }

    let base_url = llm.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "llm.base_url must start with http:// or https://".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model is required".to_string()));
    }

    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(ConfigError::Validation(
            "llm.temperature must be in range 0.0..=2.0".to_string(),
        ));
    }

    if llm.max_tokens == 0 {
        return Err(ConfigError::Validation(
            "llm.max_tokens must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_providers(config: &AppConfig) -> Result<(), ConfigError> {
    if config.uses_google() && !config.google.has_access_token() {
        return Err(ConfigError::Validation(
            "google.access_token is required when calendar.provider=google or email.provider=gmail (set AGENDA_GOOGLE_ACCESS_TOKEN)"
                .to_string(),
        ));
    }

    if config.email.provider == EmailProvider::Gmail && config.email.sender.trim().is_empty() {
        return Err(ConfigError::Validation(
            "email.sender is required for the gmail provider (set AGENDA_EMAIL_SENDER)".to_string(),
        ));
    }

    if config.google.timeout_secs == 0 || config.google.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "google.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if config.calendar.calendar_id.trim().is_empty() {
        return Err(ConfigError::Validation("calendar.calendar_id is required".to_string()));
    }

    match config.calendar.send_updates.as_str() {
        "all" | "externalOnly" | "none" => Ok(()),
        _ => Err(ConfigError::Validation(
            "calendar.send_updates must be one of all|externalOnly|none".to_string(),
        )),
    }
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| invalid_override(key, value))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| invalid_override(key, value))
}

fn parse_f32(key: &str, value: &str) -> Result<f32, ConfigError> {
    value.parse::<f32>().map_err(|_| invalid_override(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().to_ascii_lowercase().parse::<bool>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    agent: Option<AgentPatch>,
    llm: Option<LlmPatch>,
    calendar: Option<CalendarPatch>,
    email: Option<EmailPatch>,
    google: Option<GooglePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentPatch {
    default_timezone: Option<String>,
    session_ttl_secs: Option<u64>,
    history_window: Option<usize>,
    reap_interval_secs: Option<u64>,
    implicit_confirmation: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct CalendarPatch {
    provider: Option<CalendarProvider>,
    calendar_id: Option<String>,
    send_updates: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EmailPatch {
    provider: Option<EmailProvider>,
    sender: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GooglePatch {
    access_token: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
