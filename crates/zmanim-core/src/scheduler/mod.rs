//! Scheduler actor.
//!
//! One task owns the [`Orchestrator`] and handles [`Command`]s in arrival
//! order. Timers and the daily refresh loop are separate tasks that only
//! send messages, so every write is serialised through the actor.
//!
//! ```text
//! refresh loop --Refresh--> |        |
//! timer tasks  --Fire-----> | actor  | --> notifier / state sink
//! handle       --Shutdown-> |        |
//! ```

pub mod clock;
pub mod messages;
pub mod orchestrator;

pub use clock::{next_refresh_at, Clock, FixedClock, SystemClock, TokioClock};
pub use orchestrator::{Orchestrator, RefreshOutcome};

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{ConfigError, CoreError};
use crate::events::Event;
use crate::plan::Trigger;

/// Messages understood by the actor.
#[derive(Debug, Clone)]
pub enum Command {
    Refresh,
    Fire { generation: u64, trigger: Trigger },
    Shutdown,
}

/// Cheap, cloneable sender side of the actor.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SchedulerHandle {
    /// Ask for an immediate refresh. Returns `false` once the actor is gone.
    pub fn refresh(&self) -> bool {
        self.tx.send(Command::Refresh).is_ok()
    }

    pub fn shutdown(&self) -> bool {
        self.tx.send(Command::Shutdown).is_ok()
    }
}

pub struct Scheduler {
    orchestrator: Orchestrator,
    tx: mpsc::UnboundedSender<Command>,
    rx: mpsc::UnboundedReceiver<Command>,
    timers: Vec<JoinHandle<()>>,
    events: broadcast::Sender<Event>,
}

impl Scheduler {
    pub fn new(orchestrator: Orchestrator) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(256);
        Self {
            orchestrator,
            tx,
            rx,
            timers: Vec::new(),
            events,
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            tx: self.tx.clone(),
        }
    }

    /// Every event the actor produces from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    fn publish(&self, events: Vec<Event>) {
        for event in events {
            event.log();
            // No subscribers is the normal case outside tests.
            let _ = self.events.send(event);
        }
    }

    /// Replace every armed timer with one per trigger in `outcome`.
    fn arm(&mut self, outcome: &RefreshOutcome) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
        let clock = self.orchestrator.clock();
        for trigger in &outcome.armed {
            let tx = self.tx.clone();
            let clock = Arc::clone(&clock);
            let generation = outcome.generation;
            let trigger = trigger.clone();
            self.timers.push(tokio::spawn(async move {
                let wait = (trigger.at - clock.now()).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;
                let _ = tx.send(Command::Fire {
                    generation,
                    trigger,
                });
            }));
        }
        debug!(generation = outcome.generation, timers = self.timers.len(), "timers armed");
    }

    /// Initial refresh plus the state-only pass.
    ///
    /// # Errors
    ///
    /// Returns an error if today's times leave no daylight; the service
    /// must not start on such data. No timer is armed in that case.
    pub async fn start(&mut self) -> Result<(), CoreError> {
        let outcome = self.orchestrator.refresh().await;
        self.orchestrator
            .check_daylight()
            .map_err(ConfigError::from)?;
        self.arm(&outcome);
        self.publish(outcome.events);
        let events = self.orchestrator.startup_pass().await;
        self.publish(events);
        Ok(())
    }

    async fn handle_refresh(&mut self) {
        let outcome = self.orchestrator.refresh().await;
        self.arm(&outcome);
        let fetched = outcome.fetched;
        self.publish(outcome.events);
        if let Err(err) = self.orchestrator.check_daylight() {
            let at = self.orchestrator.clock().now();
            self.publish(vec![Event::ConfigurationError {
                message: err.to_string(),
                at,
            }]);
        }
        if fetched {
            let events = self.orchestrator.state_pass().await;
            self.publish(events);
        }
    }

    /// Sends `Refresh` every day at the configured local time.
    fn spawn_daily_refresh(&self) -> JoinHandle<()> {
        let tx = self.tx.clone();
        let clock = self.orchestrator.clock();
        let tz = self.orchestrator.settings().timezone;
        let at = self.orchestrator.settings().refresh_time;
        tokio::spawn(async move {
            let mut cursor = clock.now();
            loop {
                let next = next_refresh_at(cursor, tz, at);
                let wait = (next - clock.now()).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;
                cursor = next;
                if tx.send(Command::Refresh).is_err() {
                    break;
                }
            }
        })
    }

    /// Process commands until `Shutdown`.
    pub async fn serve(&mut self) {
        let daily = self.spawn_daily_refresh();

        while let Some(command) = self.rx.recv().await {
            match command {
                Command::Refresh => self.handle_refresh().await,
                Command::Fire {
                    generation,
                    trigger,
                } => {
                    let events = self.orchestrator.fire(generation, &trigger).await;
                    self.publish(events);
                }
                Command::Shutdown => break,
            }
        }

        daily.abort();
        for timer in self.timers.drain(..) {
            timer.abort();
        }
        info!("scheduler stopped");
    }

    /// [`start`](Self::start) then [`serve`](Self::serve).
    pub async fn run(mut self) -> Result<(), CoreError> {
        self.start().await?;
        self.serve().await;
        Ok(())
    }
}
