use std::sync::Arc;

use agenda_adapters::{AdapterError, Adapters};
use agenda_agent::{AgentDependencies, AgentRuntime, InMemorySessionStore, RuntimeSettings};
use agenda_core::config::{AppConfig, ConfigError, LoadOptions};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub runtime: Arc<AgentRuntime>,
    pub adapters: Adapters,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("adapter setup failed: {0}")]
    Adapter(#[from] AdapterError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let adapters = Adapters::from_config(&config)?;
    info!(
        event_name = "system.bootstrap.adapters_ready",
        correlation_id = "bootstrap",
        llm_model = adapters.llm.model_id(),
        calendar_provider = config.calendar.provider.as_str(),
        email_provider = config.email.provider.as_str(),
        "provider adapters selected"
    );

    let runtime = AgentRuntime::new(
        AgentDependencies {
            llm: adapters.llm.clone(),
            calendar: adapters.calendar.clone(),
            mail: adapters.mail.clone(),
            store: Arc::new(InMemorySessionStore::new()),
        },
        RuntimeSettings::from_config(&config.agent),
    );

    Ok(Application { config, runtime: Arc::new(runtime), adapters })
}

#[cfg(test)]
mod tests {
    use agenda_core::config::{CalendarProvider, ConfigOverrides, EmailProvider, LoadOptions};

    use crate::bootstrap::{bootstrap, BootstrapError};

    #[tokio::test]
    async fn bootstrap_fails_fast_when_gmail_has_no_token() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                email_provider: Some(EmailProvider::Gmail),
                email_sender: Some("me@example.com".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("error").to_string();
        assert!(message.contains("google.access_token"), "unexpected error: {message}");
    }

    #[tokio::test]
    async fn bootstrap_rejects_unknown_default_timezone() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                default_timezone: Some("Mars/Olympus".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        assert!(matches!(result, Err(BootstrapError::Config(_))));
    }

    #[tokio::test]
    async fn dry_run_bootstrap_serves_sessions() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                calendar_provider: Some(CalendarProvider::DryRun),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await
        .expect("bootstrap should succeed with defaults");

        let started = app.runtime.start_session().await;
        assert_eq!(started.reply, "Hi! What should I schedule?");
        assert_eq!(app.runtime.active_sessions().await, 1);
        assert_eq!(app.adapters.llm.model_id(), "phi3:mini");
    }
}
