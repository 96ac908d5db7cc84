//! Presentation port: the narrow seam between the reconciliation core and
//! whatever renders it.
//!
//! The core only ever sets style variables, toggles feature classes, and
//! speaks through one polite live region. Adapters implement those operations
//! for a real presentation layer; [`RecordingPort`] captures them for
//! headless inspection and tests.

use crate::prefs::{FontSize, Spacing};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

// Style variables consumed by the shared stylesheet layer.
pub const VAR_FONT_SCALE: &str = "--font-scale";
pub const VAR_LINE_HEIGHT_SCALE: &str = "--line-height-scale";
pub const VAR_PARAGRAPH_SPACING_SCALE: &str = "--paragraph-spacing-scale";
pub const VAR_LETTER_SPACING: &str = "--letter-spacing";
pub const VAR_WORD_SPACING: &str = "--word-spacing";
pub const VAR_TEXT_COLOR: &str = "--text-color";
pub const VAR_BACKGROUND_COLOR: &str = "--background-color";
pub const VAR_BORDER_COLOR: &str = "--border-color";
pub const VAR_FOCUS_RING_COLOR: &str = "--focus-ring-color";
pub const VAR_FOCUS_RING_WIDTH: &str = "--focus-ring-width";
pub const VAR_FOCUS_RING_STYLE: &str = "--focus-ring-style";
pub const VAR_FOCUS_OUTLINE_COLOR: &str = "--focus-outline-color";
pub const VAR_FOCUS_OUTLINE_WIDTH: &str = "--focus-outline-width";
pub const VAR_FOCUS_OUTLINE_STYLE: &str = "--focus-outline-style";
pub const VAR_ANIMATION_DURATION: &str = "--animation-duration";
pub const VAR_TRANSITION_DURATION: &str = "--transition-duration";

// Feature / theme classes.
pub const CLASS_THEME_HIGH_CONTRAST_LIGHT: &str = "theme-high-contrast-light";
pub const CLASS_THEME_HIGH_CONTRAST_DARK: &str = "theme-high-contrast-dark";
pub const CLASS_THEME_DARK: &str = "theme-dark";
pub const CLASS_MOTION_REDUCED: &str = "motion-reduced";
pub const CLASS_MOTION_DISABLED: &str = "motion-disabled";
pub const CLASS_FOCUS_ENHANCED: &str = "focus-enhanced";
pub const CLASS_LINK_HIGHLIGHTING: &str = "accessibility-link-highlighting";
pub const CLASS_READING_GUIDE: &str = "accessibility-reading-guide";
pub const CLASS_FONT_SIZE_SMALL: &str = "font-size-small";
pub const CLASS_FONT_SIZE_LARGE: &str = "font-size-large";
pub const CLASS_FONT_SIZE_EXTRA_LARGE: &str = "font-size-extra-large";
pub const CLASS_SPACING_RELAXED: &str = "spacing-relaxed";
pub const CLASS_SPACING_LOOSE: &str = "spacing-loose";

/// Level class for a non-default font size.
pub fn font_size_class(level: FontSize) -> Option<&'static str> {
    match level {
        FontSize::Small => Some(CLASS_FONT_SIZE_SMALL),
        FontSize::Medium => None,
        FontSize::Large => Some(CLASS_FONT_SIZE_LARGE),
        FontSize::ExtraLarge => Some(CLASS_FONT_SIZE_EXTRA_LARGE),
    }
}

/// Level class for a non-default spacing.
pub fn spacing_class(level: Spacing) -> Option<&'static str> {
    match level {
        Spacing::Normal => None,
        Spacing::Relaxed => Some(CLASS_SPACING_RELAXED),
        Spacing::Loose => Some(CLASS_SPACING_LOOSE),
    }
}

/// Fixed id of the polite, atomic live region all announcements go through.
pub const LIVE_REGION_ID: &str = "accessibility-announcer";

/// Operations the reconciliation core is allowed to perform against the
/// presentation layer.
pub trait PresentationPort: Send + Sync {
    /// Set a style variable on the presentation root.
    fn set_variable(&self, name: &str, value: &str);

    /// Remove a style variable from the presentation root.
    fn remove_variable(&self, name: &str);

    /// Add or remove a feature class.
    fn set_class(&self, name: &str, enabled: bool);

    /// Replace the live region content with a polite announcement.
    fn announce(&self, message: &str);

    /// Clear the live region.
    fn clear_announcement(&self);
}

/// Port that traces every operation. Used by the diagnostic binary.
#[derive(Debug, Default)]
pub struct LoggingPort;

impl PresentationPort for LoggingPort {
    fn set_variable(&self, name: &str, value: &str) {
        tracing::debug!(%name, %value, "set variable");
    }

    fn remove_variable(&self, name: &str) {
        tracing::debug!(%name, "remove variable");
    }

    fn set_class(&self, name: &str, enabled: bool) {
        tracing::debug!(%name, enabled, "set class");
    }

    fn announce(&self, message: &str) {
        tracing::info!(region = LIVE_REGION_ID, %message, "announce");
    }

    fn clear_announcement(&self) {
        tracing::debug!(region = LIVE_REGION_ID, "clear announcement");
    }
}

/// Port that records the effective presentation state.
#[derive(Debug, Default)]
pub struct RecordingPort {
    variables: Mutex<BTreeMap<String, String>>,
    classes: Mutex<BTreeSet<String>>,
    announcement: Mutex<Option<String>>,
    history: Mutex<Vec<String>>,
}

impl RecordingPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a style variable, if set.
    pub fn variable(&self, name: &str) -> Option<String> {
        self.variables.lock().unwrap().get(name).cloned()
    }

    /// Whether a feature class is currently on.
    pub fn has_class(&self, name: &str) -> bool {
        self.classes.lock().unwrap().contains(name)
    }

    /// Current live region content, if any.
    pub fn announcement(&self) -> Option<String> {
        self.announcement.lock().unwrap().clone()
    }

    /// Every announcement made so far, in order.
    pub fn announcement_history(&self) -> Vec<String> {
        self.history.lock().unwrap().clone()
    }
}

impl PresentationPort for RecordingPort {
    fn set_variable(&self, name: &str, value: &str) {
        self.variables
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    fn remove_variable(&self, name: &str) {
        self.variables.lock().unwrap().remove(name);
    }

    fn set_class(&self, name: &str, enabled: bool) {
        let mut classes = self.classes.lock().unwrap();
        if enabled {
            classes.insert(name.to_string());
        } else {
            classes.remove(name);
        }
    }

    fn announce(&self, message: &str) {
        *self.announcement.lock().unwrap() = Some(message.to_string());
        self.history.lock().unwrap().push(message.to_string());
    }

    fn clear_announcement(&self) {
        *self.announcement.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_port_tracks_state() {
        let port = RecordingPort::new();

        port.set_variable(VAR_FONT_SCALE, "1.25");
        assert_eq!(port.variable(VAR_FONT_SCALE), Some("1.25".to_string()));

        port.remove_variable(VAR_FONT_SCALE);
        assert_eq!(port.variable(VAR_FONT_SCALE), None);

        port.set_class(CLASS_FOCUS_ENHANCED, true);
        assert!(port.has_class(CLASS_FOCUS_ENHANCED));
        port.set_class(CLASS_FOCUS_ENHANCED, false);
        assert!(!port.has_class(CLASS_FOCUS_ENHANCED));

        port.announce("first");
        port.announce("second");
        assert_eq!(port.announcement(), Some("second".to_string()));
        assert_eq!(port.announcement_history(), vec!["first", "second"]);

        port.clear_announcement();
        assert_eq!(port.announcement(), None);
    }
}
