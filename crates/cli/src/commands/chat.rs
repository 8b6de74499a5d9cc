//! Local conversation over stdin/stdout, wired exactly like the server.

use std::path::Path;
use std::sync::Arc;

use agenda_adapters::Adapters;
use agenda_agent::{AgentDependencies, AgentRuntime, InMemorySessionStore, RuntimeSettings};
use agenda_core::config::AppConfig;
use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::commands::{
    current_thread_runtime, load_options, to_json, CommandResult, EXIT_CONFIG, EXIT_RUNTIME,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChatSummary {
    pub turns: usize,
    pub events_created: usize,
}

pub fn run(json_output: bool, config_path: Option<&Path>) -> CommandResult {
    let config = match AppConfig::load(load_options(config_path)) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "chat",
                "config_validation",
                error.to_string(),
                EXIT_CONFIG,
            )
        }
    };

    let adapters = match Adapters::from_config(&config) {
        Ok(adapters) => adapters,
        Err(error) => {
            return CommandResult::failure("chat", "adapter_setup", error.to_string(), EXIT_RUNTIME)
        }
    };

    let executor = match current_thread_runtime() {
        Ok(executor) => executor,
        Err(message) => return CommandResult::failure("chat", "runtime", message, EXIT_RUNTIME),
    };

    let agent = build_runtime(&config, adapters);
    let outcome = executor.block_on(async {
        let input = BufReader::new(tokio::io::stdin());
        let mut output = tokio::io::stdout();
        converse(&agent, input, &mut output, json_output).await
    });

    match outcome {
        Ok(summary) => CommandResult::success(
            "chat",
            format!(
                "chat ended after {} turns ({} events created)",
                summary.turns, summary.events_created
            ),
        ),
        Err(error) => CommandResult::failure("chat", "io", error.to_string(), EXIT_RUNTIME),
    }
}

pub fn build_runtime(config: &AppConfig, adapters: Adapters) -> AgentRuntime {
    AgentRuntime::new(
        AgentDependencies {
            llm: adapters.llm,
            calendar: adapters.calendar,
            mail: adapters.mail,
            store: Arc::new(InMemorySessionStore::new()),
        },
        RuntimeSettings::from_config(&config.agent),
    )
}

/// Runs one session until `/quit`, `/exit` or end of input. With
/// `json_output` each reply is written as a single JSON line.
pub async fn converse<R, W>(
    runtime: &AgentRuntime,
    input: R,
    output: &mut W,
    json_output: bool,
) -> Result<ChatSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let started = runtime.start_session().await;
    let greeting =
        if json_output { to_json(&started, false) } else { format!("agenda> {}", started.reply) };
    write_line(output, &greeting).await?;

    let mut summary = ChatSummary::default();
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "/quit" | "/exit") {
            break;
        }

        let response = runtime.submit_turn(&started.session_id, message).await?;
        summary.turns += 1;
        if response.done {
            summary.events_created += 1;
        }
        debug!(
            event_name = "cli.chat.turn",
            session_id = %started.session_id,
            turn = summary.turns,
            done = response.done,
        );

        let rendered =
            if json_output { to_json(&response, false) } else { format!("agenda> {}", response.reply) };
        write_line(output, &rendered).await?;
    }

    runtime.end_session(&started.session_id).await?;
    Ok(summary)
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
