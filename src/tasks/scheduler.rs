use std::sync::Arc;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::cache::ResultCache;

/// Registers the periodic sweep that deletes expired cache entries and starts the scheduler.
pub async fn configure_cache_purge(
    cron_spec: &str,
    cache: Arc<dyn ResultCache>,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;
    let label = cron_spec.to_string();
    let job = Job::new_async(cron_spec, move |_id, _l| {
        let cache = cache.clone();
        let cron_label = label.clone();
        Box::pin(async move {
            match cache.purge_expired().await {
                Ok(removed) => {
                    tracing::info!(target: "scheduler", cron = %cron_label, removed, "expired cache entries purged");
                }
                Err(err) => {
                    tracing::warn!(target: "scheduler", cron = %cron_label, error = %err, "cache purge failed");
                }
            }
        })
    })?;
    scheduler.add(job).await?;
    tracing::info!(target: "scheduler", cron = %cron_spec, "cache purge job registered");
    scheduler.start().await?;
    Ok(scheduler)
}
