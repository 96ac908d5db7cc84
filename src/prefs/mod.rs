//! Accessibility preference data model.
//!
//! The preference record is always fully populated once a store exists; edits
//! arrive as [`PreferenceUpdate`] partials and are merged over the complete
//! prior state, so no field is ever left undefined.

use serde::{Deserialize, Serialize};

/// Text size preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontSize {
    /// 87.5% of base size
    Small,
    /// Base size
    #[default]
    Medium,
    /// 125% of base size
    Large,
    /// 200% of base size (WCAG 1.4.4 resize target)
    ExtraLarge,
}

impl std::fmt::Display for FontSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontSize::Small => write!(f, "small"),
            FontSize::Medium => write!(f, "medium"),
            FontSize::Large => write!(f, "large"),
            FontSize::ExtraLarge => write!(f, "extra-large"),
        }
    }
}

/// Contrast theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Contrast {
    /// Site default palette
    #[default]
    Default,
    /// High contrast, light background
    HighLight,
    /// High contrast, dark background
    HighDark,
    /// Standard dark palette
    Dark,
}

impl Contrast {
    /// Whether this is one of the high-contrast variants.
    pub fn is_high_contrast(&self) -> bool {
        matches!(self, Contrast::HighLight | Contrast::HighDark)
    }
}

impl std::fmt::Display for Contrast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Contrast::Default => write!(f, "default"),
            Contrast::HighLight => write!(f, "high-light"),
            Contrast::HighDark => write!(f, "high-dark"),
            Contrast::Dark => write!(f, "dark"),
        }
    }
}

/// Line-height and paragraph spacing preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Spacing {
    #[default]
    Normal,
    Relaxed,
    Loose,
}

impl std::fmt::Display for Spacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Spacing::Normal => write!(f, "normal"),
            Spacing::Relaxed => write!(f, "relaxed"),
            Spacing::Loose => write!(f, "loose"),
        }
    }
}

/// Animation/transition preference, critical for vestibular disorders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Motion {
    #[default]
    Enabled,
    Reduced,
    Disabled,
}

impl std::fmt::Display for Motion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Motion::Enabled => write!(f, "enabled"),
            Motion::Reduced => write!(f, "reduced"),
            Motion::Disabled => write!(f, "disabled"),
        }
    }
}

/// The canonical user preference record. Every field is defined after
/// initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityPreferences {
    /// Text size level
    pub font_size: FontSize,
    /// Contrast theme
    pub contrast: Contrast,
    /// Line-height / paragraph spacing level
    pub spacing: Spacing,
    /// Animation level
    pub motion: Motion,
    /// Visible focus ring for keyboard navigation
    pub focus_enhancement: bool,
    /// Underline + highlight links
    pub link_highlighting: bool,
    /// Animated reading guide line
    pub reading_guide: bool,
    /// Extra letter spacing (dyslexia support)
    pub letter_spacing: bool,
    /// Extra word spacing (dyslexia support)
    pub word_spacing: bool,
}

impl Default for AccessibilityPreferences {
    fn default() -> Self {
        Self {
            font_size: FontSize::Medium,
            contrast: Contrast::Default,
            spacing: Spacing::Normal,
            motion: Motion::Enabled,
            // WCAG 2.4.7 requires visible focus indicators
            focus_enhancement: true,
            link_highlighting: false,
            reading_guide: false,
            letter_spacing: false,
            word_spacing: false,
        }
    }
}

impl AccessibilityPreferences {
    /// Merge a partial update over this record, producing a complete record.
    pub fn merged(&self, update: &PreferenceUpdate) -> Self {
        Self {
            font_size: update.font_size.unwrap_or(self.font_size),
            contrast: update.contrast.unwrap_or(self.contrast),
            spacing: update.spacing.unwrap_or(self.spacing),
            motion: update.motion.unwrap_or(self.motion),
            focus_enhancement: update.focus_enhancement.unwrap_or(self.focus_enhancement),
            link_highlighting: update.link_highlighting.unwrap_or(self.link_highlighting),
            reading_guide: update.reading_guide.unwrap_or(self.reading_guide),
            letter_spacing: update.letter_spacing.unwrap_or(self.letter_spacing),
            word_spacing: update.word_spacing.unwrap_or(self.word_spacing),
        }
    }
}

/// A partial preference edit. Unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferenceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<FontSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<Contrast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Spacing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion: Option<Motion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_enhancement: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_highlighting: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_guide: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_spacing: Option<bool>,
}

impl From<AccessibilityPreferences> for PreferenceUpdate {
    fn from(prefs: AccessibilityPreferences) -> Self {
        Self {
            font_size: Some(prefs.font_size),
            contrast: Some(prefs.contrast),
            spacing: Some(prefs.spacing),
            motion: Some(prefs.motion),
            focus_enhancement: Some(prefs.focus_enhancement),
            link_highlighting: Some(prefs.link_highlighting),
            reading_guide: Some(prefs.reading_guide),
            letter_spacing: Some(prefs.letter_spacing),
            word_spacing: Some(prefs.word_spacing),
        }
    }
}

/// Environment color-scheme signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    Light,
    Dark,
    #[default]
    NoPreference,
}

/// Environment reduced-motion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReducedMotion {
    Reduce,
    #[default]
    NoPreference,
}

/// Snapshot of environment-derived accessibility signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsPreferences {
    pub color_scheme: ColorScheme,
    pub reduced_motion: ReducedMotion,
    /// Reduced transparency, where the platform reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduced_transparency: Option<bool>,
    /// Forced high contrast, where the platform reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_contrast: Option<bool>,
}

/// A single OS signal transition, emitted by the engine's change listeners.
///
/// Serializes as `{"type": "colorScheme", "value": "dark"}` and the like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum SignalChange {
    ColorScheme(ColorScheme),
    Motion(ReducedMotion),
}

/// Full observable store state handed to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState {
    pub preferences: AccessibilityPreferences,
    pub os_preferences: OsPreferences,
    /// False until the first detect-and-apply cycle completes
    pub is_initialized: bool,
    /// Preference panel visibility
    pub is_panel_open: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let base = AccessibilityPreferences::default();
        let update = PreferenceUpdate {
            font_size: Some(FontSize::Large),
            ..Default::default()
        };

        let merged = base.merged(&update);
        assert_eq!(merged.font_size, FontSize::Large);
        assert_eq!(merged.contrast, base.contrast);
        assert_eq!(merged.motion, base.motion);
        assert!(merged.focus_enhancement);
    }

    #[test]
    fn test_preferences_serialize_camel_case_kebab_values() {
        let prefs = AccessibilityPreferences {
            font_size: FontSize::ExtraLarge,
            contrast: Contrast::HighDark,
            ..Default::default()
        };

        let json = serde_json::to_value(&prefs).unwrap();
        assert_eq!(json["fontSize"], "extra-large");
        assert_eq!(json["contrast"], "high-dark");
        assert_eq!(json["focusEnhancement"], true);
    }

    #[test]
    fn test_signal_change_wire_shape() {
        let change = SignalChange::ColorScheme(ColorScheme::Dark);
        let json = serde_json::to_value(change).unwrap();
        assert_eq!(json["type"], "colorScheme");
        assert_eq!(json["value"], "dark");

        let change = SignalChange::Motion(ReducedMotion::Reduce);
        let json = serde_json::to_value(change).unwrap();
        assert_eq!(json["type"], "motion");
        assert_eq!(json["value"], "reduce");
    }

    #[test]
    fn test_partial_update_deserialize_ignores_missing() {
        let update: PreferenceUpdate =
            serde_json::from_str(r#"{"fontSize": "large"}"#).unwrap();
        assert_eq!(update.font_size, Some(FontSize::Large));
        assert_eq!(update.contrast, None);
    }
}
