//! Contrast palettes, motion profiles, and WCAG contrast math.

use crate::platform;
use crate::prefs::{Contrast, Motion};

/// Focus ring accent. Holds at least 3:1 against every palette background.
pub const FOCUS_RING_COLOR: &str = "#B8860B";
pub const FOCUS_RING_WIDTH: &str = "3px";
pub const FOCUS_RING_STYLE: &str = "solid";

/// Foreground/background/border values for one contrast theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContrastPalette {
    pub text: &'static str,
    pub background: &'static str,
    pub border: &'static str,
    /// Theme class toggled alongside the variables, if any
    pub class: Option<&'static str>,
}

/// Palette for a contrast preference.
pub fn palette(contrast: Contrast) -> ContrastPalette {
    match contrast {
        Contrast::Default => ContrastPalette {
            text: "#1A1A1A",
            background: "#FFF8DC",
            border: "#1A1A1A",
            class: None,
        },
        Contrast::HighLight => ContrastPalette {
            text: "#000000",
            background: "#FFFFFF",
            border: "#000000",
            class: Some(platform::CLASS_THEME_HIGH_CONTRAST_LIGHT),
        },
        Contrast::HighDark => ContrastPalette {
            text: "#FFFF00",
            background: "#000000",
            border: "#FFFF00",
            class: Some(platform::CLASS_THEME_HIGH_CONTRAST_DARK),
        },
        Contrast::Dark => ContrastPalette {
            text: "#FFFFFF",
            background: "#1A1A1A",
            border: "#FFFFFF",
            class: Some(platform::CLASS_THEME_DARK),
        },
    }
}

/// Animation/transition durations for one motion preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionProfile {
    pub animation_duration: &'static str,
    pub transition_duration: &'static str,
    pub class: Option<&'static str>,
}

/// Profile for a motion preference. Reduced keeps gentler, slower movement;
/// disabled zeroes everything out.
pub fn motion_profile(motion: Motion) -> MotionProfile {
    match motion {
        Motion::Enabled => MotionProfile {
            animation_duration: "0.2s",
            transition_duration: "0.15s",
            class: None,
        },
        Motion::Reduced => MotionProfile {
            animation_duration: "0.5s",
            transition_duration: "0.3s",
            class: Some(platform::CLASS_MOTION_REDUCED),
        },
        Motion::Disabled => MotionProfile {
            animation_duration: "0s",
            transition_duration: "0s",
            class: Some(platform::CLASS_MOTION_DISABLED),
        },
    }
}

/// An sRGB color parsed from a `#RRGGBB` string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        Some(Self {
            r: u8::from_str_radix(&hex[0..2], 16).ok()?,
            g: u8::from_str_radix(&hex[2..4], 16).ok()?,
            b: u8::from_str_radix(&hex[4..6], 16).ok()?,
        })
    }

    /// Relative luminance per WCAG.
    /// https://www.w3.org/TR/WCAG21/#dfn-relative-luminance
    pub fn relative_luminance(&self) -> f32 {
        let r = linearize(self.r as f32 / 255.0);
        let g = linearize(self.g as f32 / 255.0);
        let b = linearize(self.b as f32 / 255.0);

        0.2126 * r + 0.7152 * g + 0.0722 * b
    }
}

fn linearize(value: f32) -> f32 {
    if value <= 0.03928 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Contrast ratio between two colors, from 1 to 21.
pub fn contrast_ratio(fg: Rgb, bg: Rgb) -> f32 {
    let fg_lum = fg.relative_luminance();
    let bg_lum = bg.relative_luminance();

    let (lighter, darker) = if fg_lum > bg_lum {
        (fg_lum, bg_lum)
    } else {
        (bg_lum, fg_lum)
    };

    (lighter + 0.05) / (darker + 0.05)
}

/// WCAG AA for normal text (4.5:1).
pub fn meets_aa(fg: Rgb, bg: Rgb) -> bool {
    contrast_ratio(fg, bg) >= 4.5
}

/// WCAG minimum for non-text UI elements such as focus rings (3:1).
pub fn meets_ui_minimum(fg: Rgb, bg: Rgb) -> bool {
    contrast_ratio(fg, bg) >= 3.0
}
