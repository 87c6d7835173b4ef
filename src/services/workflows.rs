//! Background work started by chat interactions.
//!
//! Every interaction is acknowledged with a deferred response first; the workflow then
//! does the slow part and replaces the placeholder with its result, or with an error
//! line when anything fails.

use chrono::Local;
use std::fmt::Write as _;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::clients::discord::ChatPlatform;
use crate::clients::gemini::TextGenerator;
use crate::services::outline::{self, Outline};
use crate::services::scout::{ScoutService, push_topic_block};
use crate::services::session::SessionStore;
use crate::trends::TopicReport;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("This selection has expired. Run the command again.")]
    SessionExpired,

    #[error("Option {0} is not available")]
    OutOfRange(usize),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Could not find message context")]
    MissingContext,

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Work queued by an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowJob {
    /// `/blog`: offer today's topics.
    DailyTopics,
    /// `/outlines [topic]`.
    Outlines { topic: String },
    /// Follow-up `1`-`4`: outlines for a topic from the menu (0-based).
    TopicOutlines { index: usize },
    /// Follow-up keycap: final post for a stored outline (1-based).
    FinalBlog { number: u8 },
    /// Message context command.
    Draft { context: String },
}

impl WorkflowJob {
    const fn name(&self) -> &'static str {
        match self {
            Self::DailyTopics => "daily_topics",
            Self::Outlines { .. } => "outlines",
            Self::TopicOutlines { .. } => "topic_outlines",
            Self::FinalBlog { .. } => "final_blog",
            Self::Draft { .. } => "draft",
        }
    }
}

pub struct Workflows {
    scout: Arc<ScoutService>,
    generator: Arc<dyn TextGenerator>,
    chat: Arc<dyn ChatPlatform>,
    sessions: Arc<SessionStore>,
}

impl Workflows {
    #[must_use]
    pub fn new(
        scout: Arc<ScoutService>,
        generator: Arc<dyn TextGenerator>,
        chat: Arc<dyn ChatPlatform>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            scout,
            generator,
            chat,
            sessions,
        }
    }

    /// Runs a job to completion. Failures are logged and shown to the user in place of
    /// the deferred response.
    pub async fn execute(&self, token: &str, job: WorkflowJob) {
        let name = job.name();
        let result = match job {
            WorkflowJob::DailyTopics => self.daily_topics_selection(token).await,
            WorkflowJob::Outlines { topic } => self.outline_generation(token, &topic).await,
            WorkflowJob::TopicOutlines { index } => self.topic_outlines(token, index).await,
            WorkflowJob::FinalBlog { number } => self.final_blog(token, number).await,
            WorkflowJob::Draft { context } => self.draft_from_message(token, &context).await,
        };

        match result {
            Ok(()) => {
                metrics::counter!("workflow_runs_total", "job" => name, "outcome" => "ok")
                    .increment(1);
                info!(job = name, "Workflow finished");
            }
            Err(e) => {
                metrics::counter!("workflow_runs_total", "job" => name, "outcome" => "error")
                    .increment(1);
                error!(job = name, error = %e, "Workflow failed");
                self.report_failure(token, &e).await;
            }
        }
    }

    pub async fn daily_topics_selection(&self, token: &str) -> Result<(), WorkflowError> {
        let (daily, topics) = self.scout.daily_topics(Local::now().date_naive()).await;

        let mut menu = format!(
            "🎸 **TODAY'S TOPICS** ({})\n🎯 Theme: {}\n\n",
            daily.date_label, daily.theme
        );
        for (i, topic) in topics.iter().enumerate() {
            push_topic_block(&mut menu, i + 1, topic);
        }
        let _ = write!(
            menu,
            "**Reply with 1-{} to get blog outlines for a topic.**",
            topics.len()
        );

        self.sessions.put_topics(token, topics).await;
        self.deliver(token, &menu).await
    }

    pub async fn outline_generation(&self, token: &str, topic: &str) -> Result<(), WorkflowError> {
        let topic = if topic.trim().is_empty() {
            outline::DEFAULT_TOPIC
        } else {
            topic.trim()
        };

        let report = self.scout.aggregator().report_for_topic(topic).await;
        self.outlines_for(token, report).await
    }

    pub async fn topic_outlines(&self, token: &str, index: usize) -> Result<(), WorkflowError> {
        let session = self
            .sessions
            .get(token)
            .await
            .ok_or(WorkflowError::SessionExpired)?;

        let report = session
            .topics
            .get(index)
            .cloned()
            .ok_or(WorkflowError::OutOfRange(index + 1))?;

        self.outlines_for(token, report).await
    }

    async fn outlines_for(&self, token: &str, report: TopicReport) -> Result<(), WorkflowError> {
        let text = self.generate(&outline::outline_prompt(&report)).await?;
        let outlines = outline::parse_outlines(&text);
        if outlines.is_empty() {
            return Err(WorkflowError::Generation("no outlines returned".to_string()));
        }

        let message = outline::format_outlines(&report, &outlines);
        info!(query = %report.query, outlines = outlines.len(), "Generated outlines");

        self.sessions.put_outlines(token, report, outlines).await;
        self.deliver(token, &message).await
    }

    pub async fn final_blog(&self, token: &str, number: u8) -> Result<(), WorkflowError> {
        let session = self
            .sessions
            .get(token)
            .await
            .ok_or(WorkflowError::SessionExpired)?;

        let (report, chosen): (&TopicReport, &Outline) =
            match (&session.focus, session.outline(number)) {
                (Some(report), Some(chosen)) => (report, chosen),
                (None, _) => return Err(WorkflowError::SessionExpired),
                (Some(_), None) => return Err(WorkflowError::OutOfRange(usize::from(number))),
            };

        let post = self.generate(&outline::blog_prompt(report, chosen)).await?;
        let message = format!("✍️ **{}**\n\n{post}", chosen.title);
        self.deliver(token, &message).await
    }

    pub async fn draft_from_message(&self, token: &str, context: &str) -> Result<(), WorkflowError> {
        if context.trim().is_empty() {
            return Err(WorkflowError::MissingContext);
        }

        let draft = self.generate(&outline::draft_prompt(context)).await?;
        let message = format!("✍️ **SoundSwap AI Draft Complete:**\n\n{draft}");
        self.deliver(token, &message).await
    }

    async fn generate(&self, prompt: &str) -> Result<String, WorkflowError> {
        self.generator
            .generate(prompt)
            .await
            .map_err(|e| WorkflowError::Generation(e.to_string()))
    }

    async fn deliver(&self, token: &str, content: &str) -> Result<(), WorkflowError> {
        self.chat
            .edit_original(token, content)
            .await
            .map_err(|e| WorkflowError::Delivery(e.to_string()))
    }

    async fn report_failure(&self, token: &str, err: &WorkflowError) {
        if let Err(e) = self.chat.edit_original(token, &format!("❌ **Error:** {err}")).await {
            warn!(error = %e, "Could not report workflow failure");
        }
    }
}
