use anyhow::Result;
use chrono::Local;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info};

use crate::api::AppState;
use crate::config::SchedulerConfig;

pub struct Scheduler {
    state: Arc<AppState>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    #[must_use]
    pub fn new(state: Arc<AppState>, config: SchedulerConfig) -> Self {
        Self {
            state,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Runs the session sweep, and the daily scout when enabled, until stopped.
    pub async fn start(&self) -> Result<()> {
        *self.running.write().await = true;

        let mut sched = JobScheduler::new().await?;
        sched.add(self.sweep_job()?).await?;

        match (self.config.enabled, self.config.cron_expression.as_deref()) {
            (true, Some(cron_expr)) => {
                sched.add(self.scout_job(cron_expr)?).await?;
                info!("Daily scout scheduled with cron: {}", cron_expr);
            }
            _ => info!("Daily scout is not scheduled in-process"),
        }

        sched.start().await?;

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    pub async fn stop(&self) {
        *self.running.write().await = false;
        info!("Scheduler stopped");
    }

    fn scout_job(&self, cron_expr: &str) -> Result<Job> {
        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let state = Arc::clone(&state);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                match state.scout.run(state.chat.as_ref(), Local::now()).await {
                    Ok(outcome) => info!(
                        topics = outcome.topics,
                        chunks = outcome.chunks,
                        "Scheduled scout finished"
                    ),
                    Err(e) => error!("Scheduled scout failed: {:#}", e),
                }
            })
        })?;
        Ok(job)
    }

    fn sweep_job(&self) -> Result<Job> {
        let state = Arc::clone(&self.state);

        let job = Job::new_async(self.config.session_sweep_cron.as_str(), move |_uuid, _lock| {
            let state = Arc::clone(&state);
            Box::pin(async move {
                let removed = state.sessions.purge_expired().await;
                if removed > 0 {
                    debug!(removed, "Purged expired sessions");
                }
            })
        })?;
        Ok(job)
    }
}
