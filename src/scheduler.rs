use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::config::SchedulerConfig;
use crate::state::SharedState;

/// Fires the blog pipeline on a cron schedule, one invocation per tick.
///
/// Ticks never overlap: if a run is still in flight when the next tick
/// fires, the tick is skipped and logged. Failures of a scheduled run are
/// log-only; the next tick is the recovery mechanism.
pub struct Scheduler {
    state: Arc<SharedState>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
    in_flight: Arc<Mutex<()>>,
}

impl Scheduler {
    pub fn new(state: Arc<SharedState>, config: SchedulerConfig) -> Self {
        Self {
            state,
            config,
            running: Arc::new(RwLock::new(false)),
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;

        if self.config.run_on_startup {
            info!("Running startup blog generation");
            run_tick(&self.state, &self.in_flight).await;
        }

        let mut sched = JobScheduler::new().await?;

        let state = Arc::clone(&self.state);
        let in_flight = Arc::clone(&self.in_flight);
        let running = Arc::clone(&self.running);

        let job = Job::new_async(self.config.cron_expression.as_str(), move |_uuid, _lock| {
            let state = Arc::clone(&state);
            let in_flight = Arc::clone(&in_flight);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                run_tick(&state, &in_flight).await;
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!(
            "Scheduler running with cron: {}",
            self.config.cron_expression
        );

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
        info!("Stopping scheduler...");
        *self.running.write().await = false;
    }

    /// One manual invocation, subject to the same no-overlap guard as ticks.
    pub async fn run_once(&self) {
        run_tick(&self.state, &self.in_flight).await;
    }
}

async fn run_tick(state: &SharedState, in_flight: &Mutex<()>) {
    let Ok(_guard) = in_flight.try_lock() else {
        warn!("Previous run still in flight, skipping this tick");
        return;
    };

    let topic = &state.config.content.default_topic;
    let main_page_url = &state.config.content.default_main_page_url;

    match state.pipeline.run(topic, main_page_url).await {
        Ok(post) => {
            info!(
                "Scheduled blog post '{}' published at {}",
                post.title, post.firebase_url
            );
        }
        Err(e) => {
            // The failure notification was already attempted by the pipeline.
            error!("Scheduled blog generation failed: {e}");
        }
    }
}
