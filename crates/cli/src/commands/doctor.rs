use std::path::Path;

use agenda_core::config::{AppConfig, CalendarProvider, EmailProvider};
use agenda_core::time::resolve_timezone;
use chrono::Utc;
use serde::Serialize;

use crate::commands::{load_options, to_json, CommandResult, EXIT_DOCTOR};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool, config_path: Option<&Path>) -> CommandResult {
    let report = build_report(config_path);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_DOCTOR };

    let output = if json_output { to_json(&report, true) } else { render_human(&report) };
    CommandResult { exit_code, output }
}

fn build_report(config_path: Option<&Path>) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(load_options(config_path)) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_timezone(&config));
            checks.push(check_credentials(&config));
            checks.push(check_sender(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["timezone_resolution", "credential_readiness", "sender_identity"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_timezone(config: &AppConfig) -> DoctorCheck {
    match resolve_timezone(&config.agent.default_timezone) {
        Some(zone) => DoctorCheck {
            name: "timezone_resolution",
            status: CheckStatus::Pass,
            details: format!(
                "default zone `{}` resolves (currently {})",
                zone.name(),
                Utc::now().with_timezone(&zone).format("%Z, UTC%:z")
            ),
        },
        None => DoctorCheck {
            name: "timezone_resolution",
            status: CheckStatus::Fail,
            details: format!("`{}` is not an IANA zone", config.agent.default_timezone),
        },
    }
}

fn check_credentials(config: &AppConfig) -> DoctorCheck {
    if !config.uses_google() {
        return DoctorCheck {
            name: "credential_readiness",
            status: CheckStatus::Skipped,
            details: "dry-run providers need no credentials".to_string(),
        };
    }

    let mut providers = Vec::new();
    if config.calendar.provider == CalendarProvider::Google {
        providers.push("calendar");
    }
    if config.email.provider == EmailProvider::Gmail {
        providers.push("gmail");
    }

    if config.google.has_access_token() {
        DoctorCheck {
            name: "credential_readiness",
            status: CheckStatus::Pass,
            details: format!("google access token present for {}", providers.join(", ")),
        }
    } else {
        DoctorCheck {
            name: "credential_readiness",
            status: CheckStatus::Fail,
            details: "google.access_token is not set".to_string(),
        }
    }
}

fn check_sender(config: &AppConfig) -> DoctorCheck {
    match config.email.provider {
        EmailProvider::DryRun => DoctorCheck {
            name: "sender_identity",
            status: CheckStatus::Skipped,
            details: "dry-run mailer does not send".to_string(),
        },
        EmailProvider::Gmail if config.email.sender.trim().is_empty() => DoctorCheck {
            name: "sender_identity",
            status: CheckStatus::Fail,
            details: "sender address not configured".to_string(),
        },
        EmailProvider::Gmail => DoctorCheck {
            name: "sender_identity",
            status: CheckStatus::Pass,
            details: format!("sending as {}", config.email.sender.trim()),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
