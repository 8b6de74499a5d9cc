use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use agenda_adapters::dry_run::{DryRunCalendar, DryRunMailer};
use agenda_agent::{AgentDependencies, AgentRuntime, InMemorySessionStore, LlmClient, RuntimeSettings};
use async_trait::async_trait;

pub struct QueuedLlm {
    replies: Mutex<VecDeque<String>>,
}

impl QueuedLlm {
    pub fn new(replies: &[&str]) -> Self {
        Self { replies: Mutex::new(replies.iter().map(|reply| reply.to_string()).collect()) }
    }
}

#[async_trait]
impl LlmClient for QueuedLlm {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted completion left"))
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

pub struct TestRig {
    pub runtime: Arc<AgentRuntime>,
    pub calendar: Arc<DryRunCalendar>,
    pub mailer: Arc<DryRunMailer>,
}

pub fn rig(replies: &[&str], settings: RuntimeSettings) -> TestRig {
    let calendar = Arc::new(DryRunCalendar::new());
    let mailer = Arc::new(DryRunMailer::new());
    let runtime = AgentRuntime::new(
        AgentDependencies {
            llm: Arc::new(QueuedLlm::new(replies)),
            calendar: calendar.clone(),
            mail: mailer.clone(),
            store: Arc::new(InMemorySessionStore::new()),
        },
        settings,
    );
    TestRig { runtime: Arc::new(runtime), calendar, mailer }
}

pub fn runtime_with_replies(replies: &[&str]) -> AgentRuntime {
    let calendar = Arc::new(DryRunCalendar::new());
    let mailer = Arc::new(DryRunMailer::new());
    AgentRuntime::new(
        AgentDependencies {
            llm: Arc::new(QueuedLlm::new(replies)),
            calendar,
            mail: mailer,
            store: Arc::new(InMemorySessionStore::new()),
        },
        RuntimeSettings::default(),
    )
}
