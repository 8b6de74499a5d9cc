//! Provider adapters for the booking agent: Ollama for completions, Google
//! Calendar and Gmail for side effects, and dry-run stand-ins for both.

pub mod dry_run;
pub mod google;
pub mod ollama;

use std::sync::Arc;

use agenda_agent::llm::LlmClient;
use agenda_core::config::{AppConfig, CalendarProvider, EmailProvider, LlmProvider};
use agenda_core::gateway::{CalendarGateway, MailGateway};
use thiserror::Error;

use crate::dry_run::{DryRunCalendar, DryRunMailer};
use crate::google::{GmailMailer, GoogleApiError, GoogleCalendar, GoogleClient};
use crate::ollama::{OllamaClient, OllamaError};

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("google adapter: {0}")]
    Google(#[from] GoogleApiError),
    #[error("ollama adapter: {0}")]
    Ollama(#[from] OllamaError),
}

/// Collaborators selected by configuration.
#[derive(Clone)]
pub struct Adapters {
    pub llm: Arc<dyn LlmClient>,
    pub calendar: Arc<dyn CalendarGateway>,
    pub mail: Arc<dyn MailGateway>,
}

impl Adapters {
    pub fn from_config(config: &AppConfig) -> Result<Self, AdapterError> {
        let llm: Arc<dyn LlmClient> = match config.llm.provider {
            LlmProvider::Ollama => Arc::new(OllamaClient::from_config(&config.llm)?),
        };

        let google = if config.uses_google() {
            Some(GoogleClient::from_config(&config.google)?)
        } else {
            None
        };

        let calendar: Arc<dyn CalendarGateway> = match (config.calendar.provider, &google) {
            (CalendarProvider::Google, Some(client)) => {
                Arc::new(GoogleCalendar::new(client.clone(), &config.calendar))
            }
            (CalendarProvider::Google, None) => return Err(GoogleApiError::MissingToken.into()),
            (CalendarProvider::DryRun, _) => Arc::new(DryRunCalendar::new()),
        };

        let mail: Arc<dyn MailGateway> = match (config.email.provider, &google) {
            (EmailProvider::Gmail, Some(client)) => {
                Arc::new(GmailMailer::new(client.clone(), &config.email))
            }
            (EmailProvider::Gmail, None) => return Err(GoogleApiError::MissingToken.into()),
            (EmailProvider::DryRun, _) => Arc::new(DryRunMailer::new()),
        };

        Ok(Self { llm, calendar, mail })
    }
}

#[cfg(test)]
mod tests {
    use agenda_core::config::{AppConfig, CalendarProvider};

    use super::{AdapterError, Adapters};

    #[test]
    fn defaults_select_dry_run_providers() {
        let adapters = Adapters::from_config(&AppConfig::default()).expect("adapters");
        assert_eq!(adapters.llm.model_id(), "phi3:mini");
    }

    #[test]
    fn google_calendar_requires_a_token() {
        let mut config = AppConfig::default();
        config.calendar.provider = CalendarProvider::Google;

        let result = Adapters::from_config(&config);
        assert!(matches!(result, Err(AdapterError::Google(_))));
    }
}
