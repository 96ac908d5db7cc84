//! Reactive preference store: the single source of truth for current
//! preferences, the OS snapshot, and panel visibility.
//!
//! All mutation funnels through [`PreferenceStore::update_preferences`],
//! which serializes concurrent callers behind one update guard: merge,
//! validation, persistence, the immediate presentation update, and subscriber
//! fan-out all complete before the next update is admitted. Subscribers
//! therefore observe snapshots in commit order and never see a
//! partially-validated state.

pub mod persist;

use crate::engine::PreferenceEngine;
use crate::platform::{self, PresentationPort};
use crate::prefs::{
    AccessibilityPreferences, Motion, OsPreferences, PreferenceUpdate, SignalChange, StoreState,
};
use chrono::{DateTime, Utc};
use persist::PreferenceStorage;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

type SubscriberFn = Arc<dyn Fn(StoreState) + Send + Sync>;
type SubscriberRegistry = Mutex<Vec<(u64, SubscriberFn)>>;

/// Handle returned by [`PreferenceStore::subscribe`]; removes the callback.
pub struct Subscription {
    registry: Weak<SubscriberRegistry>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().unwrap().retain(|(id, _)| *id != self.id);
        }
    }
}

/// Export/import envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument {
    preferences: AccessibilityPreferences,
    os_preferences: OsPreferences,
    timestamp: DateTime<Utc>,
}

/// Lenient import shape: only a `preferences` field is required.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ImportDocument {
    preferences: Option<PreferenceUpdate>,
}

/// Canonical preference state with persistence and subscriber fan-out.
pub struct PreferenceStore {
    engine: Arc<PreferenceEngine>,
    storage: Box<dyn PreferenceStorage>,
    port: Arc<dyn PresentationPort>,
    state: Mutex<StoreState>,
    subscribers: Arc<SubscriberRegistry>,
    next_subscriber_id: AtomicU64,
    /// Serializes the merge/validate/persist/notify pipeline.
    update_guard: tokio::sync::Mutex<()>,
}

impl PreferenceStore {
    /// Build the store: engine defaults first, then the durable entry (if
    /// present and well-formed) merged over them. A failed read is logged and
    /// degrades to defaults.
    pub fn new(
        engine: Arc<PreferenceEngine>,
        storage: Box<dyn PreferenceStorage>,
        port: Arc<dyn PresentationPort>,
    ) -> Arc<Self> {
        let defaults = engine.default_preferences();
        let preferences = match storage.load() {
            Ok(Some(saved)) => defaults.merged(&saved),
            Ok(None) => defaults,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load persisted accessibility preferences");
                defaults
            }
        };

        Arc::new(Self {
            engine,
            storage,
            port,
            state: Mutex::new(StoreState {
                preferences,
                os_preferences: OsPreferences::default(),
                is_initialized: false,
                is_panel_open: false,
            }),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_subscriber_id: AtomicU64::new(0),
            update_guard: tokio::sync::Mutex::new(()),
        })
    }

    /// Defensive copy of the current preferences.
    pub fn preferences(&self) -> AccessibilityPreferences {
        self.state.lock().unwrap().preferences.clone()
    }

    /// Defensive copy of the full store state.
    pub fn state(&self) -> StoreState {
        self.state.lock().unwrap().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().unwrap().is_initialized
    }

    pub fn is_panel_open(&self) -> bool {
        self.state.lock().unwrap().is_panel_open
    }

    /// Merge a partial edit over current preferences, validate, persist,
    /// apply the latency-critical presentation updates, and notify.
    ///
    /// Callers are serialized: a second update cannot observe or overwrite
    /// state from one still in its validate/persist phase. Updates touching
    /// disjoint fields both survive; same-field updates apply in call order.
    pub async fn update_preferences(&self, update: impl Into<PreferenceUpdate>) {
        let update = update.into();
        let _guard = self.update_guard.lock().await;

        let merged = self.state.lock().unwrap().preferences.merged(&update);
        let validated = self.engine.validate_preferences(merged);

        self.state.lock().unwrap().preferences = validated.clone();

        // Write failure leaves the in-memory state authoritative for the
        // session.
        if let Err(e) = self.storage.save(&validated) {
            tracing::warn!(error = %e, "failed to persist accessibility preferences");
        }

        self.apply_immediate(&validated);
        self.notify_subscribers();
    }

    /// Replace the OS snapshot. On first run (no durable user override) the
    /// engine-derived defaults cascade through [`Self::update_preferences`];
    /// subscribers are notified either way.
    pub async fn set_os_preferences(&self, os: OsPreferences) {
        self.state.lock().unwrap().os_preferences = os.clone();

        let has_override = match self.storage.load() {
            Ok(entry) => entry.is_some(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to check for persisted preferences");
                false
            }
        };

        if !has_override {
            let defaults = PreferenceEngine::default_preferences_for(&os);
            self.update_preferences(defaults).await;
        }

        self.notify_subscribers();
    }

    /// Fold a single OS signal transition into the snapshot.
    pub async fn apply_signal_change(&self, change: SignalChange) {
        let mut os = self.state.lock().unwrap().os_preferences.clone();
        match change {
            SignalChange::ColorScheme(scheme) => os.color_scheme = scheme,
            SignalChange::Motion(motion) => os.reduced_motion = motion,
        }
        self.set_os_preferences(os).await;
    }

    /// Register a subscriber. It is invoked synchronously once with the
    /// current state before this returns.
    pub fn subscribe(
        &self,
        callback: impl Fn(StoreState) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        let callback: SubscriberFn = Arc::new(callback);
        self.subscribers
            .lock()
            .unwrap()
            .push((id, Arc::clone(&callback)));

        Self::deliver(&callback, self.state());

        Subscription {
            registry: Arc::downgrade(&self.subscribers),
            id,
        }
    }

    /// Toggle the preference panel.
    pub fn toggle_panel(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.is_panel_open = !state.is_panel_open;
        }
        self.notify_subscribers();
    }

    /// Close the preference panel. Idempotent.
    pub fn close_panel(&self) {
        self.state.lock().unwrap().is_panel_open = false;
        self.notify_subscribers();
    }

    /// Recompute engine defaults from the current OS snapshot and apply them.
    pub async fn reset_to_defaults(&self) {
        let os = self.state.lock().unwrap().os_preferences.clone();
        let defaults = PreferenceEngine::default_preferences_for(&os);
        self.update_preferences(defaults).await;
    }

    /// Serialize `{preferences, osPreferences, timestamp}` as pretty JSON.
    pub fn export_preferences(&self) -> String {
        let state = self.state();
        let document = ExportDocument {
            preferences: state.preferences,
            os_preferences: state.os_preferences,
            timestamp: Utc::now(),
        };
        serde_json::to_string_pretty(&document).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to export accessibility preferences");
            String::new()
        })
    }

    /// Apply a previously exported document. Returns false (state unchanged)
    /// on any parse failure or missing `preferences` field; never errors.
    pub async fn import_preferences(&self, json: &str) -> bool {
        match serde_json::from_str::<ImportDocument>(json) {
            Ok(ImportDocument {
                preferences: Some(update),
            }) => {
                self.update_preferences(update).await;
                true
            }
            Ok(_) => false,
            Err(e) => {
                tracing::error!(error = %e, "failed to import accessibility preferences");
                false
            }
        }
    }

    /// One-shot transition to the initialized state, then notify. Later
    /// notifications are "live" rather than bootstrap events.
    pub fn mark_initialized(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if state.is_initialized {
                return;
            }
            state.is_initialized = true;
        }
        self.notify_subscribers();
    }

    /// Latency-critical presentation updates that cannot wait for a full
    /// re-apply: focus outline and motion durations.
    fn apply_immediate(&self, prefs: &AccessibilityPreferences) {
        if prefs.focus_enhancement {
            self.port
                .set_variable(platform::VAR_FOCUS_OUTLINE_WIDTH, "3px");
            self.port
                .set_variable(platform::VAR_FOCUS_OUTLINE_STYLE, "solid");
            self.port.set_variable(
                platform::VAR_FOCUS_OUTLINE_COLOR,
                crate::apply::theme::FOCUS_RING_COLOR,
            );
        }

        if prefs.motion != Motion::Enabled {
            self.port.set_variable(platform::VAR_ANIMATION_DURATION, "0s");
            self.port
                .set_variable(platform::VAR_TRANSITION_DURATION, "0s");
        } else {
            self.port
                .set_variable(platform::VAR_ANIMATION_DURATION, "0.2s");
            self.port
                .set_variable(platform::VAR_TRANSITION_DURATION, "0.15s");
        }
    }

    fn notify_subscribers(&self) {
        let current = self.state();
        // Clone the registry so a callback can subscribe or unsubscribe
        // without deadlocking the fan-out.
        let subscribers: Vec<SubscriberFn> = self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in &subscribers {
            Self::deliver(callback, current.clone());
        }
    }

    /// A panicking subscriber must not stop fan-out or corrupt state.
    fn deliver(callback: &SubscriberFn, state: StoreState) {
        if catch_unwind(AssertUnwindSafe(|| callback(state))).is_err() {
            tracing::error!("accessibility store subscriber panicked");
        }
    }
}
