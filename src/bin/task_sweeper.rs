//! Refreshes the cached overdue flag of every active task in the store.
//!
//! Usage:
//!
//! ```text
//! TASKKEEPER_DATABASE_URL=postgres://localhost/tasks task_sweeper
//! ```
//!
//! Settings are read from the environment, and from a `.env` file in the
//! working directory when one exists. Log verbosity follows `RUST_LOG` and
//! defaults to `info`.

use mockable::DefaultClock;
use std::sync::Arc;
use taskkeeper::config::StoreConfig;
use taskkeeper::task::{
    adapters::postgres::PostgresTaskRepository, ports::SweepScope,
    services::TaskLifecycleService,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        info!(path = %path.display(), "loaded environment file");
    }

    let config = StoreConfig::from_env()?;
    let pool = config.build_pool()?;
    let service = TaskLifecycleService::new(
        Arc::new(PostgresTaskRepository::new(pool)),
        Arc::new(DefaultClock),
    );

    let changed = service.sweep_overdue(SweepScope::All).await?;
    info!(changed, "overdue sweep complete");
    Ok(())
}
