use std::future::Future;
use std::path::Path;
use std::time::Instant;

use agenda_adapters::google::{GmailMailer, GoogleCalendar, GoogleClient};
use agenda_adapters::ollama::OllamaClient;
use agenda_core::config::AppConfig;
use agenda_core::domain::booking::EmailMessage;
use clap::ValueEnum;
use serde::Serialize;
use tokio::runtime::Runtime;

use crate::commands::{current_thread_runtime, load_options, to_json, CommandResult, EXIT_SMOKE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SmokeTarget {
    /// Read the configured calendar's metadata
    Calendar,
    /// Send a test message from the sender to itself
    Gmail,
    /// Confirm the model is pulled and answers a prompt
    Llm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SmokeStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: SmokeStatus,
    elapsed_ms: u64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SmokeReport {
    command: &'static str,
    target: SmokeTarget,
    status: SmokeStatus,
    summary: String,
    total_elapsed_ms: u64,
    checks: Vec<SmokeCheck>,
}

pub fn run(target: SmokeTarget, json_output: bool, config_path: Option<&Path>) -> CommandResult {
    let started = Instant::now();
    let mut checks = Vec::new();

    let config = match timed_check(|| AppConfig::load(load_options(config_path))) {
        Ok((elapsed_ms, config)) => {
            checks.push(pass("config_validation", elapsed_ms, "configuration loaded and validated"));
            config
        }
        Err((elapsed_ms, error)) => {
            checks.push(fail("config_validation", elapsed_ms, error.to_string()));
            return finalize_report(target, checks, started, json_output);
        }
    };

    let runtime = match current_thread_runtime() {
        Ok(runtime) => runtime,
        Err(message) => {
            checks.push(fail("async_runtime", 0, message));
            return finalize_report(target, checks, started, json_output);
        }
    };

    match target {
        SmokeTarget::Calendar => smoke_calendar(&runtime, &config, &mut checks),
        SmokeTarget::Gmail => smoke_gmail(&runtime, &config, &mut checks),
        SmokeTarget::Llm => smoke_llm(&runtime, &config, &mut checks),
    }

    finalize_report(target, checks, started, json_output)
}

fn google_client(config: &AppConfig, checks: &mut Vec<SmokeCheck>) -> Option<GoogleClient> {
    let (elapsed_ms, result) = timed(|| GoogleClient::from_config(&config.google));
    match result {
        Ok(client) => {
            checks.push(pass("google_credentials", elapsed_ms, "access token present"));
            Some(client)
        }
        Err(error) => {
            checks.push(fail(
                "google_credentials",
                elapsed_ms,
                format!("{error} (set AGENDA_GOOGLE_ACCESS_TOKEN)"),
            ));
            None
        }
    }
}

fn smoke_calendar(runtime: &Runtime, config: &AppConfig, checks: &mut Vec<SmokeCheck>) {
    let Some(client) = google_client(config, checks) else {
        checks.push(skipped("calendar_reachable"));
        return;
    };

    let calendar = GoogleCalendar::new(client, &config.calendar);
    let (elapsed_ms, result) = block_on_timed(runtime, calendar.calendar_summary());
    checks.push(match result {
        Ok(summary) => pass(
            "calendar_reachable",
            elapsed_ms,
            format!(
                "{}: {} | tz: {}",
                summary.id,
                summary.summary.as_deref().unwrap_or("<untitled>"),
                summary.time_zone.as_deref().unwrap_or("<unknown>")
            ),
        ),
        Err(error) => fail("calendar_reachable", elapsed_ms, error.to_string()),
    });
}

fn smoke_gmail(runtime: &Runtime, config: &AppConfig, checks: &mut Vec<SmokeCheck>) {
    let sender = config.email.sender.trim().to_string();
    if sender.is_empty() {
        checks.push(fail("sender_identity", 0, "sender address not configured (set AGENDA_EMAIL_SENDER)"));
        checks.push(skipped("google_credentials"));
        checks.push(skipped("gmail_send"));
        return;
    }
    checks.push(pass("sender_identity", 0, format!("sending as {sender}")));

    let Some(client) = google_client(config, checks) else {
        checks.push(skipped("gmail_send"));
        return;
    };

    let mailer = GmailMailer::new(client, &config.email);
    let message = EmailMessage {
        to: vec![sender],
        subject: "Gmail API test".to_string(),
        body_text: "Hello.".to_string(),
    };
    let (elapsed_ms, result) = block_on_timed(runtime, mailer.send_message(&message));
    checks.push(match result {
        Ok(sent) => pass("gmail_send", elapsed_ms, format!("sent message {}", sent.id)),
        Err(error) => fail("gmail_send", elapsed_ms, error.to_string()),
    });
}

fn smoke_llm(runtime: &Runtime, config: &AppConfig, checks: &mut Vec<SmokeCheck>) {
    let client = match OllamaClient::from_config(&config.llm) {
        Ok(client) => client,
        Err(error) => {
            checks.push(fail("llm_models", 0, error.to_string()));
            checks.push(skipped("llm_generate"));
            return;
        }
    };

    let (elapsed_ms, models) = block_on_timed(runtime, client.list_models());
    match models {
        Ok(models) if models.iter().any(|model| model_matches(model, &config.llm.model)) => {
            checks.push(pass(
                "llm_models",
                elapsed_ms,
                format!("`{}` is available at {}", config.llm.model, config.llm.base_url),
            ));
        }
        Ok(models) => {
            checks.push(fail(
                "llm_models",
                elapsed_ms,
                format!(
                    "`{}` is not pulled; available: [{}]",
                    config.llm.model,
                    models.join(", ")
                ),
            ));
            checks.push(skipped("llm_generate"));
            return;
        }
        Err(error) => {
            checks.push(fail("llm_models", elapsed_ms, error.to_string()));
            checks.push(skipped("llm_generate"));
            return;
        }
    }

    let (elapsed_ms, reply) =
        block_on_timed(runtime, client.generate("Reply with the single word: ready"));
    checks.push(match reply {
        Ok(response) if !response.response.trim().is_empty() => pass(
            "llm_generate",
            elapsed_ms,
            format!("model answered `{}`", response.response.trim()),
        ),
        Ok(_) => fail("llm_generate", elapsed_ms, "model returned an empty response"),
        Err(error) => fail("llm_generate", elapsed_ms, error.to_string()),
    });
}

/// Ollama lists untagged pulls as `name:latest`.
fn model_matches(listed: &str, configured: &str) -> bool {
    listed == configured || (!configured.contains(':') && listed == format!("{configured}:latest"))
}

fn timed<T>(check: impl FnOnce() -> T) -> (u64, T) {
    let started = Instant::now();
    let value = check();
    (started.elapsed().as_millis() as u64, value)
}

fn timed_check<T, E>(check: impl FnOnce() -> Result<T, E>) -> Result<(u64, T), (u64, E)> {
    match timed(check) {
        (elapsed_ms, Ok(value)) => Ok((elapsed_ms, value)),
        (elapsed_ms, Err(error)) => Err((elapsed_ms, error)),
    }
}

fn block_on_timed<F: Future>(runtime: &Runtime, future: F) -> (u64, F::Output) {
    timed(|| runtime.block_on(future))
}

fn pass(name: &'static str, elapsed_ms: u64, message: impl Into<String>) -> SmokeCheck {
    SmokeCheck { name, status: SmokeStatus::Pass, elapsed_ms, message: message.into() }
}

fn fail(name: &'static str, elapsed_ms: u64, message: impl Into<String>) -> SmokeCheck {
    SmokeCheck { name, status: SmokeStatus::Fail, elapsed_ms, message: message.into() }
}

fn skipped(name: &'static str) -> SmokeCheck {
    SmokeCheck {
        name,
        status: SmokeStatus::Skipped,
        elapsed_ms: 0,
        message: "skipped due previous failure".to_string(),
    }
}

fn finalize_report(
    target: SmokeTarget,
    checks: Vec<SmokeCheck>,
    started: Instant,
    json_output: bool,
) -> CommandResult {
    let total_elapsed_ms = started.elapsed().as_millis() as u64;
    let passed = checks.iter().filter(|check| check.status == SmokeStatus::Pass).count();
    let total = checks.len();
    let failed = checks.iter().any(|check| check.status == SmokeStatus::Fail);

    let report = SmokeReport {
        command: "smoke",
        target,
        status: if failed { SmokeStatus::Fail } else { SmokeStatus::Pass },
        summary: format!("smoke: {passed}/{total} checks passed in {total_elapsed_ms}ms"),
        total_elapsed_ms,
        checks,
    };

    let machine = to_json(&report, false);
    let output = if json_output {
        machine
    } else {
        let mut lines = vec![report.summary.clone()];
        lines.extend(report.checks.iter().map(|check| {
            let marker = match check.status {
                SmokeStatus::Pass => "ok",
                SmokeStatus::Fail => "fail",
                SmokeStatus::Skipped => "skip",
            };
            format!("- [{marker}] {} ({}ms): {}", check.name, check.elapsed_ms, check.message)
        }));
        lines.push(machine);
        lines.join("\n")
    };

    CommandResult { exit_code: if failed { EXIT_SMOKE } else { 0 }, output }
}
