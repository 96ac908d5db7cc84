//! Preference engine: OS signal detection, default derivation, validation,
//! and sizing multipliers.
//!
//! The engine is pure computation plus one long-lived concern: it owns the
//! OS signal watcher and the listener channels that decouple detection from
//! store ingestion.

pub mod signals;

use crate::prefs::{
    AccessibilityPreferences, Contrast, FontSize, Motion, OsPreferences, SignalChange, Spacing,
};
use signals::OsSignalSource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Scale factors realizing the named preference levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingMultiplier {
    /// Font scale relative to base size
    pub font_size: f32,
    /// Line-height / paragraph spacing scale
    pub spacing: f32,
    /// Additional letter spacing in em, when the flag is set
    pub letter_spacing: Option<f32>,
    /// Additional word spacing in em, when the flag is set
    pub word_spacing: Option<f32>,
}

/// Stateless preference computation plus the OS signal watcher.
pub struct PreferenceEngine {
    signals: Arc<dyn OsSignalSource>,
    snapshot: Arc<Mutex<OsPreferences>>,
    listeners: Arc<Mutex<Vec<mpsc::UnboundedSender<SignalChange>>>>,
    watching: AtomicBool,
}

impl PreferenceEngine {
    pub fn new(signals: Arc<dyn OsSignalSource>) -> Self {
        Self {
            signals,
            snapshot: Arc::new(Mutex::new(OsPreferences::default())),
            listeners: Arc::new(Mutex::new(Vec::new())),
            watching: AtomicBool::new(false),
        }
    }

    /// Read current environment signals, cache them, and (once per process)
    /// register the change watcher. Returns a copy of the snapshot.
    pub fn detect_os_preferences(&self) -> OsPreferences {
        let current = self.signals.snapshot();
        *self.snapshot.lock().unwrap() = current.clone();

        if !self.watching.swap(true, Ordering::SeqCst) {
            let snapshot = Arc::clone(&self.snapshot);
            let listeners = Arc::clone(&self.listeners);
            self.signals.watch(Box::new(move |change| {
                {
                    let mut snap = snapshot.lock().unwrap();
                    match change {
                        SignalChange::ColorScheme(scheme) => snap.color_scheme = scheme,
                        SignalChange::Motion(motion) => snap.reduced_motion = motion,
                    }
                }
                // Closed receivers fall out of the list here.
                listeners
                    .lock()
                    .unwrap()
                    .retain(|tx| tx.send(change).is_ok());
            }));
        }

        current
    }

    /// The cached OS snapshot from the last detection or signal change.
    pub fn os_snapshot(&self) -> OsPreferences {
        self.snapshot.lock().unwrap().clone()
    }

    /// Open a channel that receives every future [`SignalChange`].
    pub fn signal_events(&self) -> mpsc::UnboundedReceiver<SignalChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.lock().unwrap().push(tx);
        rx
    }

    /// Derive default preferences from the cached OS snapshot.
    pub fn default_preferences(&self) -> AccessibilityPreferences {
        Self::default_preferences_for(&self.os_snapshot())
    }

    /// Derive default preferences from a given OS snapshot. Pure mapping.
    pub fn default_preferences_for(os: &OsPreferences) -> AccessibilityPreferences {
        let mut defaults = AccessibilityPreferences::default();

        if os.color_scheme == crate::prefs::ColorScheme::Dark {
            defaults.contrast = Contrast::Dark;
        }

        defaults.motion = match os.reduced_motion {
            crate::prefs::ReducedMotion::Reduce => Motion::Reduced,
            crate::prefs::ReducedMotion::NoPreference => Motion::Enabled,
        };

        defaults
    }

    /// Enforce the single hard coercion and log advisory warnings.
    ///
    /// Motion disabled forces the reading guide off (it relies on continuous
    /// animation). Everything else passes through untouched; unreadable
    /// combinations are warned about, never corrected.
    pub fn validate_preferences(
        &self,
        mut prefs: AccessibilityPreferences,
    ) -> AccessibilityPreferences {
        if !prefs.focus_enhancement {
            tracing::warn!(
                "focus enhancement disabled - ensure keyboard navigation remains accessible"
            );
        }

        if prefs.contrast.is_high_contrast() && prefs.font_size == FontSize::Small {
            tracing::warn!("small font size with high contrast may reduce readability");
        }

        if prefs.motion == Motion::Disabled && prefs.reading_guide {
            tracing::debug!("motion disabled, turning reading guide off");
            prefs.reading_guide = false;
        }

        prefs
    }

    /// Deterministic sizing table. Font scale tops out at 200% per the WCAG
    /// resize-text requirement.
    pub fn sizing_multiplier(&self, prefs: &AccessibilityPreferences) -> SizingMultiplier {
        let font_size = match prefs.font_size {
            FontSize::Small => 0.875,
            FontSize::Medium => 1.0,
            FontSize::Large => 1.25,
            FontSize::ExtraLarge => 2.0,
        };

        let spacing = match prefs.spacing {
            Spacing::Normal => 1.0,
            Spacing::Relaxed => 1.5,
            Spacing::Loose => 2.0,
        };

        SizingMultiplier {
            font_size,
            spacing,
            letter_spacing: prefs.letter_spacing.then_some(font_size * 0.1),
            word_spacing: prefs.word_spacing.then_some(font_size * 0.25),
        }
    }
}
