//! Button input: debouncing and short/long press discrimination.
//!
//! The button is active-low: [`BUTTON_PUSHED`] is the low level and
//! [`BUTTON_RELEASED`] the high level. Callers sample the raw pin once per poll
//! tick and pass `is_low` together with the tick's instant.

use crate::time::{TimeDuration, TimeInstant};

/// Raw level of a pushed button (`is_low == true`).
pub const BUTTON_PUSHED: bool = true;

/// Raw level of a released button (`is_low == false`).
pub const BUTTON_RELEASED: bool = false;

/// A debounced level transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    /// Stable released → pushed transition.
    Pushed,
    /// Stable pushed → released transition.
    Released,
}

/// A classified button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Press {
    /// Released before the long-press threshold.
    Short,
    /// Held for at least the long-press threshold. Reported while still held.
    Long,
}

/// Time-window debouncer for one active-low input.
///
/// A raw level that differs from the accepted level starts a pending timer.
/// The new level is accepted once it has been seen continuously for the
/// debounce window; any sample back at the accepted level cancels it.
pub struct Debouncer<I: TimeInstant> {
    window: I::Duration,
    pushed: bool,
    pending_since: Option<I>,
    pushed_at: Option<I>,
    last_hold: Option<I::Duration>,
}

impl<I: TimeInstant> Debouncer<I> {
    /// Creates a debouncer that starts in the released state.
    pub fn new(window: I::Duration) -> Self {
        Self {
            window,
            pushed: BUTTON_RELEASED,
            pending_since: None,
            pushed_at: None,
            last_hold: None,
        }
    }

    /// Processes one raw sample.
    ///
    /// Returns an event only on the sample where a transition is accepted, so
    /// each physical transition yields exactly one event.
    pub fn sample(&mut self, is_low: bool, now: I) -> Option<ButtonEvent> {
        if is_low == self.pushed {
            self.pending_since = None;
            return None;
        }

        let since = *self.pending_since.get_or_insert(now);
        if !now.duration_since(since).reached(self.window) {
            return None;
        }

        self.pending_since = None;
        self.pushed = is_low;

        if is_low == BUTTON_PUSHED {
            self.pushed_at = Some(now);
            self.last_hold = None;
            Some(ButtonEvent::Pushed)
        } else {
            // The hold ends where the release started bouncing, not where it
            // was accepted.
            self.last_hold = self.pushed_at.take().map(|at| since.duration_since(at));
            Some(ButtonEvent::Released)
        }
    }

    /// Debounced level.
    pub fn is_pushed(&self) -> bool {
        self.pushed
    }

    /// How long the button has been held, `None` while released.
    ///
    /// Stops counting while a release is pending.
    pub fn held_for(&self, now: I) -> Option<I::Duration> {
        self.pushed_at
            .map(|at| self.pending_since.unwrap_or(now).duration_since(at))
    }

    /// Length of the most recent completed press.
    pub fn last_hold(&self) -> Option<I::Duration> {
        self.last_hold
    }
}

/// Turns debounced events and hold time into [`Press`]es.
pub struct PressClassifier<D: TimeDuration> {
    long_press: D,
    long_reported: bool,
}

impl<D: TimeDuration> PressClassifier<D> {
    pub fn new(long_press: D) -> Self {
        Self {
            long_press,
            long_reported: false,
        }
    }

    /// Classifies one tick.
    ///
    /// * `event` - Debouncer output for this tick
    /// * `held_for` - Current hold time (`None` while released)
    /// * `last_hold` - Length of the press that just ended, read on `Released`
    pub fn update(
        &mut self,
        event: Option<ButtonEvent>,
        held_for: Option<D>,
        last_hold: Option<D>,
    ) -> Option<Press> {
        match event {
            Some(ButtonEvent::Pushed) => {
                self.long_reported = false;
                None
            }
            Some(ButtonEvent::Released) => {
                if core::mem::replace(&mut self.long_reported, false) {
                    return None;
                }
                match last_hold {
                    Some(held) if held.reached(self.long_press) => Some(Press::Long),
                    _ => Some(Press::Short),
                }
            }
            None => match held_for {
                Some(held) if !self.long_reported && held.reached(self.long_press) => {
                    self.long_reported = true;
                    Some(Press::Long)
                }
                _ => None,
            },
        }
    }
}

/// Result of one [`Button::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonUpdate {
    pub event: Option<ButtonEvent>,
    pub press: Option<Press>,
}

impl ButtonUpdate {
    /// True when the debounced level changed this tick.
    pub fn is_activity(&self) -> bool {
        self.event.is_some()
    }
}

/// Debouncer and press classifier for the single head-unit button.
pub struct Button<I: TimeInstant> {
    debouncer: Debouncer<I>,
    classifier: PressClassifier<I::Duration>,
}

impl<I: TimeInstant> Button<I> {
    pub fn new(debounce: I::Duration, long_press: I::Duration) -> Self {
        Self {
            debouncer: Debouncer::new(debounce),
            classifier: PressClassifier::new(long_press),
        }
    }

    /// Samples the raw level and classifies the result.
    pub fn poll(&mut self, is_low: bool, now: I) -> ButtonUpdate {
        let event = self.debouncer.sample(is_low, now);
        let press = self.classifier.update(
            event,
            self.debouncer.held_for(now),
            self.debouncer.last_hold(),
        );
        ButtonUpdate { event, press }
    }

    pub fn debouncer(&self) -> &Debouncer<I> {
        &self.debouncer
    }
}
