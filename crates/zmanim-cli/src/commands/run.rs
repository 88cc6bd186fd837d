use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use zmanim_core::integrations::{build_notifier, build_source};
use zmanim_core::scheduler::SystemClock;
use zmanim_core::{FileStateStore, Orchestrator, Scheduler, Settings};

use super::{load_config, runtime};

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let settings = Settings::from_config(&config)?;
    let source = build_source(&config)?;
    let notifier = build_notifier(&config)?;
    let state_dir = config.state_dir()?;
    let state = Arc::new(FileStateStore::new(state_dir.clone()));

    info!(
        timezone = %settings.timezone,
        source = source.name(),
        notifier = notifier.name(),
        state_dir = %state_dir.display(),
        "starting scheduler"
    );

    let orchestrator = Orchestrator::new(settings, source, notifier, state, Arc::new(SystemClock));
    let scheduler = Scheduler::new(orchestrator);
    let handle = scheduler.handle();

    runtime()?.block_on(async move {
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("interrupt received; shutting down");
                    handle.shutdown();
                }
                Err(err) => warn!("cannot listen for interrupt: {err}"),
            }
        });
        scheduler.run().await
    })?;
    Ok(())
}
