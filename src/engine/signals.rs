//! OS accessibility signal sources.
//!
//! The engine reads environment signals through the [`OsSignalSource`] port so
//! the reconciliation core never touches platform APIs directly. Two adapters
//! are provided: [`SystemSignals`] for real desktop detection and
//! [`ManualSignals`] for embedders and tests that supply signals themselves.

use crate::prefs::{ColorScheme, OsPreferences, SignalChange};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Callback invoked on every OS signal transition. Observers live for the
/// rest of the process; there is no unsubscribe path.
pub type SignalObserver = Box<dyn Fn(SignalChange) + Send + Sync>;

/// Source of environment accessibility signals.
pub trait OsSignalSource: Send + Sync {
    /// Read the current signal snapshot.
    fn snapshot(&self) -> OsPreferences;

    /// Register an observer for future signal transitions.
    fn watch(&self, observer: SignalObserver);
}

/// Desktop signal source backed by system theme detection.
///
/// Color scheme comes from the platform (via `dark-light`); there is no
/// portable desktop signal for reduced motion, reduced transparency, or
/// forced high contrast, so those report no-preference. The watcher is a
/// background poll thread that emits a change only on an actual transition.
pub struct SystemSignals {
    poll_interval: Duration,
    watching: AtomicBool,
}

impl Default for SystemSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemSignals {
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            watching: AtomicBool::new(false),
        }
    }

    fn detect_color_scheme() -> ColorScheme {
        match dark_light::detect() {
            dark_light::Mode::Dark => ColorScheme::Dark,
            dark_light::Mode::Light => ColorScheme::Light,
            dark_light::Mode::Default => ColorScheme::NoPreference,
        }
    }
}

impl OsSignalSource for SystemSignals {
    fn snapshot(&self) -> OsPreferences {
        OsPreferences {
            color_scheme: Self::detect_color_scheme(),
            ..Default::default()
        }
    }

    fn watch(&self, observer: SignalObserver) {
        // One poll thread per source; it runs for the life of the process.
        if self.watching.swap(true, Ordering::SeqCst) {
            return;
        }

        let interval = self.poll_interval;
        std::thread::spawn(move || {
            let mut last = Self::detect_color_scheme();
            loop {
                std::thread::sleep(interval);
                let current = Self::detect_color_scheme();
                if current != last {
                    tracing::debug!(?current, "system color scheme changed");
                    last = current;
                    observer(SignalChange::ColorScheme(current));
                }
            }
        });
    }
}

/// Programmatic signal source. Hosts that have their own signal plumbing
/// (or tests) push snapshots in; transitions fan out to observers.
pub struct ManualSignals {
    state: Mutex<OsPreferences>,
    observers: Mutex<Vec<SignalObserver>>,
}

impl Default for ManualSignals {
    fn default() -> Self {
        Self::new(OsPreferences::default())
    }
}

impl ManualSignals {
    pub fn new(initial: OsPreferences) -> Self {
        Self {
            state: Mutex::new(initial),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Replace the snapshot, emitting a change for each signal that differed.
    pub fn set(&self, next: OsPreferences) {
        let previous = {
            let mut state = self.state.lock().unwrap();
            std::mem::replace(&mut *state, next.clone())
        };

        if next.color_scheme != previous.color_scheme {
            self.emit(SignalChange::ColorScheme(next.color_scheme));
        }
        if next.reduced_motion != previous.reduced_motion {
            self.emit(SignalChange::Motion(next.reduced_motion));
        }
    }

    /// Change only the color-scheme signal.
    pub fn set_color_scheme(&self, scheme: ColorScheme) {
        let mut next = self.state.lock().unwrap().clone();
        next.color_scheme = scheme;
        self.set(next);
    }

    /// Change only the reduced-motion signal.
    pub fn set_reduced_motion(&self, motion: crate::prefs::ReducedMotion) {
        let mut next = self.state.lock().unwrap().clone();
        next.reduced_motion = motion;
        self.set(next);
    }

    fn emit(&self, change: SignalChange) {
        for observer in self.observers.lock().unwrap().iter() {
            observer(change);
        }
    }
}

impl OsSignalSource for ManualSignals {
    fn snapshot(&self) -> OsPreferences {
        self.state.lock().unwrap().clone()
    }

    fn watch(&self, observer: SignalObserver) {
        self.observers.lock().unwrap().push(observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::ReducedMotion;
    use std::sync::Arc;

    #[test]
    fn test_manual_signals_emit_only_transitions() {
        let signals = ManualSignals::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        signals.watch(Box::new(move |change| {
            sink.lock().unwrap().push(change);
        }));

        signals.set_color_scheme(ColorScheme::Dark);
        signals.set_color_scheme(ColorScheme::Dark); // no transition
        signals.set_reduced_motion(ReducedMotion::Reduce);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                SignalChange::ColorScheme(ColorScheme::Dark),
                SignalChange::Motion(ReducedMotion::Reduce),
            ]
        );
    }

    #[test]
    fn test_manual_snapshot_reflects_set() {
        let signals = ManualSignals::default();
        signals.set(OsPreferences {
            color_scheme: ColorScheme::Light,
            reduced_motion: ReducedMotion::Reduce,
            reduced_transparency: Some(true),
            high_contrast: None,
        });

        let snap = signals.snapshot();
        assert_eq!(snap.color_scheme, ColorScheme::Light);
        assert_eq!(snap.reduced_motion, ReducedMotion::Reduce);
        assert_eq!(snap.reduced_transparency, Some(true));
    }
}
