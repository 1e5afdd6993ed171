// src/engine.rs

//! Async driver around the rotation scheduler.
//!
//! Bootstraps one engine instance (identity check, config load, counter
//! seeding) and then runs a single task that sleeps until the scheduler's
//! pending timer is due, applies user interactions as they arrive, and stops
//! on shutdown or when rotation can never resume.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info};

use crate::catalog::Catalog;
use crate::catalog::source::{ConfigSource, load_catalog};
use crate::config::DEFAULT_INITIAL_DELAY_MS;
use crate::error::{Result, WidgetError};
use crate::host::RenderHost;
use crate::report::{EventReporter, EventSink};
use crate::scheduler::{Interaction, RotationScheduler, RotationState};
use crate::store::{DisplayCountStore, SessionStorage};

const INTERACTION_BUFFER: usize = 32;

/// Stand-in deadline for delays too long to represent as an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Knobs for one engine instance
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub initial_delay: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
        }
    }
}

/// An interaction, optionally addressed to a specific widget
#[derive(Debug, Clone)]
struct Command {
    target: Option<String>,
    interaction: Interaction,
}

/// Clonable handle for feeding user interactions into a running engine
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Command>,
}

impl EngineHandle {
    /// Apply to whatever widget is mounted
    pub async fn send(&self, interaction: Interaction) -> bool {
        self.tx
            .send(Command { target: None, interaction })
            .await
            .is_ok()
    }

    /// Apply only if `widget_id` is still the mounted widget
    pub async fn send_to(&self, widget_id: impl Into<String>, interaction: Interaction) -> bool {
        self.tx
            .send(Command {
                target: Some(widget_id.into()),
                interaction,
            })
            .await
            .is_ok()
    }
}

pub struct Engine {
    scheduler: RotationScheduler,
    commands: mpsc::Receiver<Command>,
    tx: mpsc::Sender<Command>,
}

impl Engine {
    /// Build an engine over an already loaded catalog
    pub fn new(
        catalog: Catalog,
        options: EngineOptions,
        storage: Arc<dyn SessionStorage>,
        sink: Arc<dyn EventSink>,
        host: Box<dyn RenderHost>,
    ) -> Self {
        let scheduler = RotationScheduler::new(
            catalog,
            DisplayCountStore::new(storage),
            EventReporter::new(sink),
            host,
        )
        .with_initial_delay(options.initial_delay);

        let (tx, commands) = mpsc::channel(INTERACTION_BUFFER);
        Self { scheduler, commands, tx }
    }

    /// Load the site config and build an engine.
    ///
    /// A missing public key fails before any fetch. A failed load is logged
    /// and yields an engine over an empty catalog that stays idle.
    pub async fn bootstrap(
        public_key: Option<&str>,
        options: EngineOptions,
        source: &dyn ConfigSource,
        storage: Arc<dyn SessionStorage>,
        sink: Arc<dyn EventSink>,
        host: Box<dyn RenderHost>,
    ) -> Result<Self> {
        let public_key = match public_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => key,
            None => {
                error!("Widgetic: No public key provided.");
                return Err(WidgetError::MissingIdentity);
            }
        };

        let catalog = match load_catalog(source, public_key).await {
            Ok(catalog) => {
                info!("Loaded {} widgets for site {}", catalog.len(), public_key);
                catalog
            }
            Err(WidgetError::ConfigLoad(msg)) => {
                error!("Widgetic Error: {}", msg);
                Catalog::empty()
            }
            Err(e) => {
                error!("Widgetic: Failed to load config: {}", e);
                Catalog::empty()
            }
        };

        Ok(Self::new(catalog, options, storage, sink, host))
    }

    pub fn handle(&self) -> EngineHandle {
        EngineHandle { tx: self.tx.clone() }
    }

    pub fn state(&self) -> RotationState {
        self.scheduler.state()
    }

    pub fn scheduler(&self) -> &RotationScheduler {
        &self.scheduler
    }

    /// Drive rotation until shutdown or until no timer can fire again.
    /// Returns the engine so callers can inspect the final state.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Self {
        self.scheduler.start();

        // Deadline of the scheduler's pending timer, keyed by timer id
        let mut armed: Option<(u64, Instant)> = None;

        loop {
            armed = match (self.scheduler.pending_timer(), armed) {
                (Some(timer), Some((id, deadline))) if timer.id == id => Some((id, deadline)),
                (Some(timer), _) => Some((timer.id, deadline_after(timer.delay))),
                (None, _) => None,
            };

            if self.scheduler.is_finished() {
                info!("Rotation finished ({})", self.scheduler.state());
                break;
            }

            let deadline = armed.map(|(_, deadline)| deadline);
            let due = async move {
                match deadline {
                    Some(deadline) => sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = due => {
                    if let Some((id, _)) = armed.take() {
                        self.scheduler.fire(id);
                    }
                }
                command = self.commands.recv() => {
                    // The engine holds a sender itself, so the channel never closes
                    if let Some(Command { target, interaction }) = command {
                        debug!("Interaction {:?} (target: {:?})", interaction, target);
                        match target {
                            Some(widget_id) => self.scheduler.interact_on(&widget_id, interaction),
                            None => self.scheduler.interact(interaction),
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Engine shutting down ({})", self.scheduler.state());
                        break;
                    }
                }
            }
        }

        self
    }
}

fn deadline_after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay).unwrap_or_else(|| now + FAR_FUTURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ConfigDocument;
    use crate::report::NullSink;
    use crate::store::MemoryStorage;
    use async_trait::async_trait;

    struct NoopHost;

    impl RenderHost for NoopHost {
        fn show(&mut self, _presentation: &crate::render::Presentation) {}
        fn hide(&mut self) {}
        fn set_expanded(&mut self, _expanded: bool) {}
    }

    struct PanicSource;

    #[async_trait]
    impl ConfigSource for PanicSource {
        async fn fetch(&self, _public_key: &str) -> Result<ConfigDocument> {
            panic!("config must not be fetched without a key");
        }
    }

    #[tokio::test]
    async fn test_missing_key_aborts_before_fetch() {
        for key in [None, Some(""), Some("   ")] {
            let result = Engine::bootstrap(
                key,
                EngineOptions::default(),
                &PanicSource,
                Arc::new(MemoryStorage::new()),
                Arc::new(NullSink),
                Box::new(NoopHost),
            )
            .await;
            assert!(matches!(result, Err(WidgetError::MissingIdentity)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_delay_does_not_overflow() {
        let now = Instant::now();
        let deadline = deadline_after(Duration::MAX);
        assert!(deadline >= now + FAR_FUTURE);
        assert_eq!(deadline_after(Duration::from_secs(5)), now + Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_empty_engine_returns_immediately() {
        let engine = Engine::new(
            Catalog::empty(),
            EngineOptions::default(),
            Arc::new(MemoryStorage::new()),
            Arc::new(NullSink),
            Box::new(NoopHost),
        );
        let (_tx, rx) = watch::channel(false);
        let engine = engine.run(rx).await;
        assert_eq!(engine.state(), RotationState::Idle);
    }
}
