//! Prefcast - Accessibility Preference Reconciliation
//!
//! Lets users express visual and interaction accessibility preferences (text
//! scale, contrast theme, motion level, focus visibility, reading aids),
//! reconciles them with OS-level accessibility signals, persists them across
//! sessions, and fans them out onto the presentation layer through a narrow
//! port of style variables, feature classes, and live-region announcements.

pub mod apply;
pub mod context;
pub mod engine;
pub mod platform;
pub mod prefs;
pub mod store;

// Re-export commonly used types
pub use apply::PresentationApplier;
pub use context::AccessibilityContext;
pub use engine::signals::{ManualSignals, OsSignalSource, SystemSignals};
pub use engine::{PreferenceEngine, SizingMultiplier};
pub use platform::{LoggingPort, PresentationPort, RecordingPort};
pub use prefs::{AccessibilityPreferences, OsPreferences, PreferenceUpdate, StoreState};
pub use store::persist::{FileStorage, MemoryStorage, PreferenceStorage};
pub use store::PreferenceStore;
