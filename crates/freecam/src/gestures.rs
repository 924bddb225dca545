//! Gesture state machines for controller buttons and sticks.
//!
//! Two small automata turn noisy per-tick signals into stable outputs:
//! `ToggleLatch` converts a held button into a persistent on/off toggle, and
//! `DoubleTapDetector` recognizes a double-push-forward sprint gesture from a
//! stick axis and a running clock. Both are plain state machines driven once
//! per tick, with no edge events, so they can be exercised directly in tests.

/// States of the debounced toggle. Each state pairs the current trigger
/// level with the latched output, so a single table covers both edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LatchState {
    TriggerOffOutputOff,
    TriggerOnOutputOn,
    TriggerOffOutputOn,
    TriggerOnOutputOff,
}

/// Debounced on/off toggle driven by a held button.
///
/// The output flips exactly once per press-release-press cycle: a press
/// latches the output on, the release keeps it on, the next press latches it
/// off, and that release completes the cycle. The table is asymmetric on
/// purpose; it is preserved exactly as observed.
#[derive(Debug)]
pub struct ToggleLatch {
    state: LatchState,
}

impl ToggleLatch {
    pub fn new() -> Self {
        Self {
            state: LatchState::TriggerOffOutputOff,
        }
    }

    /// Advance the automaton with this tick's trigger level.
    pub fn update(&mut self, trigger: bool) {
        use LatchState::*;
        self.state = match self.state {
            TriggerOffOutputOff if trigger => TriggerOnOutputOn,
            TriggerOnOutputOn if !trigger => TriggerOffOutputOn,
            TriggerOffOutputOn if trigger => TriggerOnOutputOff,
            TriggerOnOutputOff if !trigger => TriggerOffOutputOff,
            unchanged => unchanged,
        };
    }

    /// Current latched output.
    pub fn output(&self) -> bool {
        matches!(
            self.state,
            LatchState::TriggerOnOutputOn | LatchState::TriggerOffOutputOn
        )
    }
}

impl Default for ToggleLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Stick level above which a push counts as a full forward press.
const TAP_HIGH: f32 = 0.9;
/// Stick level below which the stick counts as released.
const TAP_LOW: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TapState {
    Init,
    FirstUp,
    FirstLow,
    Sustained,
}

/// Double-push-forward sprint detector.
///
/// Axis values strictly between `TAP_LOW` and `TAP_HIGH` freeze the automaton
/// entirely (hysteresis band): no transition, and the internal clock does not
/// advance. Each stage must be reached within `interval` seconds of the
/// previous qualifying update or the automaton resets to `Init`. `Sustained`
/// holds until the axis drops back below `TAP_HIGH`.
#[derive(Debug)]
pub struct DoubleTapDetector {
    state: TapState,
    saved_time: f32,
    up_time: f32,
    low_time: f32,
}

impl DoubleTapDetector {
    pub fn new() -> Self {
        Self {
            state: TapState::Init,
            saved_time: 0.0,
            up_time: 0.0,
            low_time: 0.0,
        }
    }

    /// Advance with the current axis value and the running clock (seconds).
    /// `interval` is the configured double-tap window in seconds.
    pub fn update(&mut self, axis: f32, elapsed: f32, interval: f32) {
        if axis < TAP_HIGH && axis > TAP_LOW {
            return;
        }
        let delta = elapsed - self.saved_time;
        self.saved_time = elapsed;
        match self.state {
            TapState::Init => {
                if axis > TAP_HIGH && delta < interval {
                    self.state = TapState::FirstUp;
                    self.up_time = elapsed;
                }
            }
            TapState::FirstUp => {
                let up_delta = elapsed - self.up_time;
                if axis < TAP_LOW && delta < interval {
                    self.state = TapState::FirstLow;
                    self.low_time = elapsed;
                } else if (axis > TAP_LOW && up_delta > interval) || delta > interval {
                    self.state = TapState::Init;
                }
            }
            TapState::FirstLow => {
                let low_delta = elapsed - self.low_time;
                if axis > TAP_HIGH && delta < interval {
                    self.state = TapState::Sustained;
                } else if (axis < TAP_HIGH && low_delta > interval) || delta > interval {
                    self.state = TapState::Init;
                }
            }
            TapState::Sustained => {
                if axis < TAP_HIGH {
                    self.state = TapState::Init;
                }
            }
        }
    }

    /// True while the sprint gesture is sustained.
    pub fn sprinting(&self) -> bool {
        self.state == TapState::Sustained
    }
}

impl Default for DoubleTapDetector {
    fn default() -> Self {
        Self::new()
    }
}
