//! Process-scoped composition of the engine, store, and applier.
//!
//! One context per process, constructed explicitly at startup and injected
//! into consumers. The engine is built first and handed to the store and
//! applier, so there is no hidden global state and no import cycle between
//! the components.

use crate::apply::PresentationApplier;
use crate::engine::signals::OsSignalSource;
use crate::engine::PreferenceEngine;
use crate::platform::PresentationPort;
use crate::store::persist::PreferenceStorage;
use crate::store::PreferenceStore;
use std::sync::Arc;

/// The wired accessibility subsystem.
pub struct AccessibilityContext {
    engine: Arc<PreferenceEngine>,
    store: Arc<PreferenceStore>,
    applier: PresentationApplier,
}

impl AccessibilityContext {
    pub fn new(
        signals: Arc<dyn OsSignalSource>,
        storage: Box<dyn PreferenceStorage>,
        port: Arc<dyn PresentationPort>,
    ) -> Self {
        let engine = Arc::new(PreferenceEngine::new(signals));
        let store = PreferenceStore::new(Arc::clone(&engine), storage, Arc::clone(&port));
        let applier = PresentationApplier::new(Arc::clone(&engine), port);

        Self {
            engine,
            store,
            applier,
        }
    }

    pub fn engine(&self) -> &Arc<PreferenceEngine> {
        &self.engine
    }

    pub fn store(&self) -> &Arc<PreferenceStore> {
        &self.store
    }

    pub fn applier(&self) -> &PresentationApplier {
        &self.applier
    }

    /// Run the applier's one-time initialization sequence.
    pub async fn initialize(&self) {
        self.applier.initialize(&self.store).await;
    }

    /// Forward OS signal transitions into the store for the life of the
    /// process.
    pub fn spawn_signal_loop(&self) -> tokio::task::JoinHandle<()> {
        let mut events = self.engine.signal_events();
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            while let Some(change) = events.recv().await {
                tracing::debug!(?change, "ingesting OS signal change");
                store.apply_signal_change(change).await;
            }
        })
    }
}
