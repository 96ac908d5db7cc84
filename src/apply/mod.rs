//! Presentation applier: materializes store snapshots into style variables,
//! feature classes, and screen-reader announcements.
//!
//! Owns the initialization sequencing (detect → ingest → apply → subscribe →
//! mark initialized) and the fallback baseline when that sequence fails.

pub mod theme;

use crate::engine::PreferenceEngine;
use crate::platform::{self, PresentationPort};
use crate::prefs::AccessibilityPreferences;
use crate::store::PreferenceStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// How long an announcement stays in the live region before being cleared.
pub const ANNOUNCEMENT_CLEAR_DELAY: Duration = Duration::from_secs(5);

/// Format a scale factor without binary float noise ("1.2", not "1.1999999").
fn fmt_scale(value: f32) -> String {
    ((value * 10000.0).round() / 10000.0).to_string()
}

/// Applies preferences to the presentation layer and speaks changes.
pub struct PresentationApplier {
    inner: Arc<ApplierInner>,
    initialized: AtomicBool,
}

struct ApplierInner {
    engine: Arc<PreferenceEngine>,
    port: Arc<dyn PresentationPort>,
    /// Pending live-region clear; replaced when a newer announcement lands.
    clear_timer: Mutex<Option<JoinHandle<()>>>,
}

impl PresentationApplier {
    pub fn new(engine: Arc<PreferenceEngine>, port: Arc<dyn PresentationPort>) -> Self {
        Self {
            inner: Arc::new(ApplierInner {
                engine,
                port,
                clear_timer: Mutex::new(None),
            }),
            initialized: AtomicBool::new(false),
        }
    }

    /// Run the one-time initialization sequence. Idempotent; a failure
    /// anywhere along the path applies the safe baseline instead of
    /// propagating, so the page stays readable and keyboard-navigable.
    pub async fn initialize(&self, store: &Arc<PreferenceStore>) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let store = Arc::clone(store);
        let sequence = tokio::spawn(async move {
            let os = inner.engine.detect_os_preferences();
            store.set_os_preferences(os).await;

            inner.apply_preferences(&store.preferences());

            // Live states only: everything before mark_initialized is the
            // bootstrap path and has already been applied above. The
            // listener persists for the life of the store.
            let subscriber = Arc::clone(&inner);
            let _subscription = store.subscribe(move |state| {
                if state.is_initialized {
                    subscriber.apply_preferences(&state.preferences);
                }
            });

            store.mark_initialized();
        })
        .await;

        if let Err(e) = sequence {
            tracing::error!(error = %e, "failed to initialize accessibility system");
            self.inner.apply_fallback();
        }
    }

    /// Materialize a full preference record onto the presentation layer.
    pub fn apply_preferences(&self, prefs: &AccessibilityPreferences) {
        self.inner.apply_preferences(prefs);
    }

    /// Minimal safe baseline: unscaled text, default line height, visible
    /// focus ring. Keeps the page operable without the full machinery.
    pub fn apply_fallback(&self) {
        self.inner.apply_fallback();
    }
}

impl ApplierInner {
    fn apply_preferences(&self, prefs: &AccessibilityPreferences) {
        let sizing = self.engine.sizing_multiplier(prefs);

        self.port
            .set_variable(platform::VAR_FONT_SCALE, &fmt_scale(sizing.font_size));
        self.port
            .set_variable(platform::VAR_LINE_HEIGHT_SCALE, &fmt_scale(sizing.spacing));
        self.port.set_variable(
            platform::VAR_PARAGRAPH_SPACING_SCALE,
            &fmt_scale(sizing.spacing * 0.8),
        );

        match sizing.letter_spacing {
            Some(em) => self
                .port
                .set_variable(platform::VAR_LETTER_SPACING, &format!("{}em", fmt_scale(em))),
            None => self.port.remove_variable(platform::VAR_LETTER_SPACING),
        }
        match sizing.word_spacing {
            Some(em) => self
                .port
                .set_variable(platform::VAR_WORD_SPACING, &format!("{}em", fmt_scale(em))),
            None => self.port.remove_variable(platform::VAR_WORD_SPACING),
        }

        self.apply_contrast(prefs);
        self.apply_motion(prefs);
        self.apply_focus(prefs);

        self.port
            .set_class(platform::CLASS_LINK_HIGHLIGHTING, prefs.link_highlighting);
        self.port
            .set_class(platform::CLASS_READING_GUIDE, prefs.reading_guide);

        self.apply_level_classes(prefs);
        self.announce_preferences(prefs);
    }

    fn apply_contrast(&self, prefs: &AccessibilityPreferences) {
        for class in [
            platform::CLASS_THEME_HIGH_CONTRAST_LIGHT,
            platform::CLASS_THEME_HIGH_CONTRAST_DARK,
            platform::CLASS_THEME_DARK,
        ] {
            self.port.set_class(class, false);
        }

        let palette = theme::palette(prefs.contrast);
        if let Some(class) = palette.class {
            self.port.set_class(class, true);
        }
        self.port.set_variable(platform::VAR_TEXT_COLOR, palette.text);
        self.port
            .set_variable(platform::VAR_BACKGROUND_COLOR, palette.background);
        self.port
            .set_variable(platform::VAR_BORDER_COLOR, palette.border);
    }

    fn apply_motion(&self, prefs: &AccessibilityPreferences) {
        for class in [platform::CLASS_MOTION_REDUCED, platform::CLASS_MOTION_DISABLED] {
            self.port.set_class(class, false);
        }

        let profile = theme::motion_profile(prefs.motion);
        if let Some(class) = profile.class {
            self.port.set_class(class, true);
        }
        self.port
            .set_variable(platform::VAR_ANIMATION_DURATION, profile.animation_duration);
        self.port.set_variable(
            platform::VAR_TRANSITION_DURATION,
            profile.transition_duration,
        );
    }

    fn apply_focus(&self, prefs: &AccessibilityPreferences) {
        if prefs.focus_enhancement {
            self.port.set_class(platform::CLASS_FOCUS_ENHANCED, true);
            self.port
                .set_variable(platform::VAR_FOCUS_RING_COLOR, theme::FOCUS_RING_COLOR);
            self.port
                .set_variable(platform::VAR_FOCUS_RING_WIDTH, theme::FOCUS_RING_WIDTH);
            self.port
                .set_variable(platform::VAR_FOCUS_RING_STYLE, theme::FOCUS_RING_STYLE);
        } else {
            self.port.set_class(platform::CLASS_FOCUS_ENHANCED, false);
        }
    }

    fn apply_level_classes(&self, prefs: &AccessibilityPreferences) {
        for class in [
            platform::CLASS_FONT_SIZE_SMALL,
            platform::CLASS_FONT_SIZE_LARGE,
            platform::CLASS_FONT_SIZE_EXTRA_LARGE,
        ] {
            self.port.set_class(class, false);
        }
        if let Some(class) = platform::font_size_class(prefs.font_size) {
            self.port.set_class(class, true);
        }

        for class in [platform::CLASS_SPACING_RELAXED, platform::CLASS_SPACING_LOOSE] {
            self.port.set_class(class, false);
        }
        if let Some(class) = platform::spacing_class(prefs.spacing) {
            self.port.set_class(class, true);
        }
    }

    fn announce_preferences(&self, prefs: &AccessibilityPreferences) {
        let message = format!(
            "Accessibility preferences updated. Font size: {}, Contrast: {}, Motion: {}.",
            prefs.font_size, prefs.contrast, prefs.motion
        );
        self.announce(message);
    }

    /// Speak through the live region and schedule the clear. A newer
    /// announcement aborts the pending clear so it cannot erase it early.
    fn announce(&self, message: String) {
        self.port.announce(&message);

        let mut timer = self.clear_timer.lock().unwrap();
        if let Some(pending) = timer.take() {
            pending.abort();
        }

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let port = Arc::clone(&self.port);
            *timer = Some(runtime.spawn(async move {
                tokio::time::sleep(ANNOUNCEMENT_CLEAR_DELAY).await;
                port.clear_announcement();
            }));
        }
    }

    fn apply_fallback(&self) {
        self.port.set_variable(platform::VAR_FONT_SCALE, "1");
        self.port.set_variable(platform::VAR_LINE_HEIGHT_SCALE, "1");
        self.port
            .set_variable(platform::VAR_FOCUS_RING_COLOR, theme::FOCUS_RING_COLOR);
        self.port
            .set_variable(platform::VAR_FOCUS_RING_WIDTH, theme::FOCUS_RING_WIDTH);
        self.port.set_class(platform::CLASS_FOCUS_ENHANCED, true);

        tracing::info!("applied basic accessibility fallbacks");
    }
}
