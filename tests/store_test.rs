//! Integration tests for the preference store: merge semantics, update
//! serialization, persistence, subscriptions, and import/export.

use prefcast::engine::signals::ManualSignals;
use prefcast::prefs::{
    AccessibilityPreferences, ColorScheme, Contrast, FontSize, Motion, OsPreferences,
    PreferenceUpdate, ReducedMotion, SignalChange, Spacing,
};
use prefcast::store::persist::{PreferenceStorage, StorageError};
use prefcast::{FileStorage, MemoryStorage, PreferenceEngine, PreferenceStore, RecordingPort};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn new_store() -> (Arc<PreferenceStore>, Arc<RecordingPort>) {
    new_store_with(Box::new(MemoryStorage::new()))
}

fn new_store_with(
    storage: Box<dyn PreferenceStorage>,
) -> (Arc<PreferenceStore>, Arc<RecordingPort>) {
    let engine = Arc::new(PreferenceEngine::new(Arc::new(ManualSignals::default())));
    let port = Arc::new(RecordingPort::new());
    let store = PreferenceStore::new(
        engine,
        storage,
        Arc::clone(&port) as Arc<dyn prefcast::PresentationPort>,
    );
    (store, port)
}

#[tokio::test]
async fn test_partial_update_keeps_all_fields_defined() {
    let (store, _) = new_store();
    let before = store.preferences();

    store
        .update_preferences(PreferenceUpdate {
            font_size: Some(FontSize::Large),
            link_highlighting: Some(true),
            ..Default::default()
        })
        .await;

    let after = store.preferences();
    assert_eq!(after.font_size, FontSize::Large);
    assert!(after.link_highlighting);
    // Untouched fields keep their prior values.
    assert_eq!(after.contrast, before.contrast);
    assert_eq!(after.spacing, before.spacing);
    assert_eq!(after.motion, before.motion);
    assert_eq!(after.focus_enhancement, before.focus_enhancement);
}

#[tokio::test]
async fn test_motion_disabled_coerces_reading_guide() {
    let (store, _) = new_store();

    store
        .update_preferences(PreferenceUpdate {
            motion: Some(Motion::Disabled),
            reading_guide: Some(true),
            ..Default::default()
        })
        .await;

    let prefs = store.preferences();
    assert_eq!(prefs.motion, Motion::Disabled);
    assert!(!prefs.reading_guide);
}

#[tokio::test]
async fn test_disjoint_updates_both_survive() {
    let (store, _) = new_store();

    store
        .update_preferences(PreferenceUpdate {
            font_size: Some(FontSize::Large),
            ..Default::default()
        })
        .await;
    store
        .update_preferences(PreferenceUpdate {
            motion: Some(Motion::Reduced),
            ..Default::default()
        })
        .await;

    let prefs = store.preferences();
    assert_eq!(prefs.font_size, FontSize::Large);
    assert_eq!(prefs.motion, Motion::Reduced);
}

#[tokio::test]
async fn test_racing_updates_are_serialized() {
    let (store, _) = new_store();

    tokio::join!(
        store.update_preferences(PreferenceUpdate {
            font_size: Some(FontSize::Large),
            ..Default::default()
        }),
        store.update_preferences(PreferenceUpdate {
            spacing: Some(Spacing::Loose),
            ..Default::default()
        }),
    );

    let prefs = store.preferences();
    assert_eq!(prefs.font_size, FontSize::Large);
    assert_eq!(prefs.spacing, Spacing::Loose);
}

#[tokio::test]
async fn test_same_field_updates_apply_in_call_order() {
    let (store, _) = new_store();

    store
        .update_preferences(PreferenceUpdate {
            font_size: Some(FontSize::Small),
            ..Default::default()
        })
        .await;
    store
        .update_preferences(PreferenceUpdate {
            font_size: Some(FontSize::ExtraLarge),
            ..Default::default()
        })
        .await;

    assert_eq!(store.preferences().font_size, FontSize::ExtraLarge);
}

#[test]
fn test_subscribe_invokes_once_synchronously() {
    let (store, _) = new_store();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    let subscription = store.subscribe(move |state| {
        sink.lock().unwrap().push(state);
    });

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].preferences, store.preferences());
    assert!(!seen[0].is_initialized);
    drop(seen);

    subscription.unsubscribe();
}

#[tokio::test]
async fn test_unsubscribe_stops_notifications() {
    let (store, _) = new_store();
    let count = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&count);
    let subscription = store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(count.load(Ordering::SeqCst), 1);

    subscription.unsubscribe();
    store
        .update_preferences(PreferenceUpdate {
            font_size: Some(FontSize::Large),
            ..Default::default()
        })
        .await;

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_panicking_subscriber_does_not_stop_fanout() {
    let (store, _) = new_store();

    let armed = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = Arc::clone(&armed);
    let _panicky = store.subscribe(move |_| {
        // Let the registration call succeed, then blow up on fan-out.
        if flag.swap(true, Ordering::SeqCst) {
            panic!("subscriber fault");
        }
    });

    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let _normal = store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store
        .update_preferences(PreferenceUpdate {
            font_size: Some(FontSize::Large),
            ..Default::default()
        })
        .await;

    // One registration call plus one fan-out.
    assert_eq!(count.load(Ordering::SeqCst), 2);
    // State survived the faulting subscriber.
    assert_eq!(store.preferences().font_size, FontSize::Large);
}

#[tokio::test]
async fn test_export_import_round_trip() {
    let (store, _) = new_store();
    store
        .update_preferences(PreferenceUpdate {
            font_size: Some(FontSize::ExtraLarge),
            contrast: Some(Contrast::HighDark),
            letter_spacing: Some(true),
            ..Default::default()
        })
        .await;
    let exported = store.export_preferences();
    let original = store.preferences();

    let (fresh, _) = new_store();
    assert!(fresh.import_preferences(&exported).await);
    assert_eq!(fresh.preferences(), original);
}

#[tokio::test]
async fn test_import_rejects_malformed_payloads() {
    let (store, _) = new_store();
    let before = store.preferences();

    assert!(!store.import_preferences("not json").await);
    assert!(!store.import_preferences("{}").await);
    assert!(!store.import_preferences(r#"{"other": 1}"#).await);

    assert_eq!(store.preferences(), before);
}

#[tokio::test]
async fn test_first_run_cascades_os_defaults() {
    let (store, _) = new_store();

    store
        .set_os_preferences(OsPreferences {
            color_scheme: ColorScheme::Dark,
            ..Default::default()
        })
        .await;

    assert_eq!(store.preferences().contrast, Contrast::Dark);
    assert_eq!(
        store.state().os_preferences.color_scheme,
        ColorScheme::Dark
    );
}

#[tokio::test]
async fn test_stored_override_blocks_cascade() {
    let storage = MemoryStorage::new();
    storage
        .save(&AccessibilityPreferences {
            contrast: Contrast::HighLight,
            ..Default::default()
        })
        .unwrap();
    let (store, _) = new_store_with(Box::new(storage));

    store
        .set_os_preferences(OsPreferences {
            color_scheme: ColorScheme::Dark,
            ..Default::default()
        })
        .await;

    // The user's stored choice wins over the OS-derived default.
    assert_eq!(store.preferences().contrast, Contrast::HighLight);
}

#[tokio::test]
async fn test_signal_change_folds_into_snapshot() {
    let (store, _) = new_store();

    store
        .apply_signal_change(SignalChange::Motion(ReducedMotion::Reduce))
        .await;

    let state = store.state();
    assert_eq!(state.os_preferences.reduced_motion, ReducedMotion::Reduce);
    // First run, so the derived default cascaded too.
    assert_eq!(state.preferences.motion, Motion::Reduced);
}

#[tokio::test]
async fn test_reset_recomputes_from_os_snapshot() {
    let (store, _) = new_store();
    store
        .set_os_preferences(OsPreferences {
            color_scheme: ColorScheme::Dark,
            ..Default::default()
        })
        .await;
    store
        .update_preferences(PreferenceUpdate {
            font_size: Some(FontSize::ExtraLarge),
            contrast: Some(Contrast::HighLight),
            ..Default::default()
        })
        .await;

    store.reset_to_defaults().await;

    let prefs = store.preferences();
    assert_eq!(prefs.font_size, FontSize::Medium);
    // Dark OS scheme still informs the default contrast.
    assert_eq!(prefs.contrast, Contrast::Dark);
}

#[test]
fn test_panel_transitions() {
    let (store, _) = new_store();
    assert!(!store.is_panel_open());

    store.toggle_panel();
    assert!(store.is_panel_open());
    store.toggle_panel();
    assert!(!store.is_panel_open());

    store.toggle_panel();
    store.close_panel();
    assert!(!store.is_panel_open());
    store.close_panel(); // idempotent
    assert!(!store.is_panel_open());
}

#[test]
fn test_mark_initialized_is_one_shot() {
    let (store, _) = new_store();
    let count = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&count);
    let _sub = store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store.mark_initialized();
    assert!(store.is_initialized());
    assert_eq!(count.load(Ordering::SeqCst), 2);

    store.mark_initialized();
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_malformed_stored_entry_degrades_to_defaults() {
    let (store, _) = new_store_with(Box::new(MemoryStorage::with_entry("{{corrupt")));
    assert_eq!(store.preferences(), AccessibilityPreferences::default());
}

#[tokio::test]
async fn test_partial_stored_entry_merges_over_defaults() {
    let (store, _) = new_store_with(Box::new(MemoryStorage::with_entry(
        r#"{"preferences": {"fontSize": "large"}, "timestamp": "2026-01-01T00:00:00Z", "version": "1.0"}"#,
    )));

    let prefs = store.preferences();
    assert_eq!(prefs.font_size, FontSize::Large);
    assert_eq!(prefs.contrast, Contrast::Default);
    assert!(prefs.focus_enhancement);
}

struct FailingStorage;

impl PreferenceStorage for FailingStorage {
    fn load(&self) -> Result<Option<PreferenceUpdate>, StorageError> {
        Err(StorageError::Io("disk on fire".into()))
    }

    fn save(&self, _: &AccessibilityPreferences) -> Result<(), StorageError> {
        Err(StorageError::Io("disk on fire".into()))
    }
}

#[tokio::test]
async fn test_storage_failures_leave_memory_state_authoritative() {
    let (store, _) = new_store_with(Box::new(FailingStorage));

    store
        .update_preferences(PreferenceUpdate {
            font_size: Some(FontSize::Large),
            ..Default::default()
        })
        .await;

    assert_eq!(store.preferences().font_size, FontSize::Large);
}

#[tokio::test]
async fn test_file_storage_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accessibility-preferences.json");

    {
        let (store, _) = new_store_with(Box::new(FileStorage::at(&path)));
        store
            .update_preferences(PreferenceUpdate {
                spacing: Some(Spacing::Loose),
                ..Default::default()
            })
            .await;
    }

    let (reloaded, _) = new_store_with(Box::new(FileStorage::at(&path)));
    assert_eq!(reloaded.preferences().spacing, Spacing::Loose);
}

#[tokio::test]
async fn test_export_envelope_shape() {
    let (store, _) = new_store();
    let exported = store.export_preferences();

    let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert!(value["preferences"]["fontSize"].is_string());
    assert!(value["osPreferences"]["colorScheme"].is_string());
    assert!(value["timestamp"].is_string());
}
