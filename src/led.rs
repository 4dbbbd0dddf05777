//! Bicolor button LED driven by two output lines.
//!
//! The LED inside the button has a "high" and a "low" brightness line
//! (`INPUT_BUTTON_LED_HIGH` / `INPUT_BUTTON_LED_LOW`). At most one of them is
//! ever active.

use crate::items::ClosedSet;
use embedded_hal::digital::OutputPin;

/// Brightness of the button LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LedState {
    /// Both lines inactive.
    #[default]
    Off = 0,
    /// Only the low line active.
    Low,
    /// Only the high line active.
    High,
}

impl LedState {
    /// Line levels for this state as `(high_active, low_active)`.
    pub const fn lines(self) -> (bool, bool) {
        match self {
            LedState::Off => (false, false),
            LedState::Low => (false, true),
            LedState::High => (true, false),
        }
    }
}

impl ClosedSet for LedState {
    const ALL: &'static [Self] = &[LedState::Off, LedState::Low, LedState::High];

    #[inline]
    fn raw(self) -> u8 {
        self as u8
    }
}

/// Drives the two LED lines from a target [`LedState`].
///
/// Both pins must share an error type, which is the case for every pin of a
/// single HAL port.
pub struct LedController<H, L> {
    high: H,
    low: L,
    state: Option<LedState>,
}

impl<H, L, E> LedController<H, L>
where
    H: OutputPin<Error = E>,
    L: OutputPin<Error = E>,
{
    /// Wraps the pins without touching them. The first [`apply`](Self::apply)
    /// always drives both lines.
    pub fn new(high: H, low: L) -> Self {
        Self {
            high,
            low,
            state: None,
        }
    }

    /// Drives the lines for `target`.
    ///
    /// The line being switched off is written first so both lines are never
    /// active at the same time. Repeating the current target writes nothing.
    ///
    /// # Returns
    /// * `Ok(true)` - Pins were written
    /// * `Ok(false)` - `target` was already applied
    /// * `Err` - A pin write failed; the previous state is kept so the next
    ///   call retries
    pub fn apply(&mut self, target: LedState) -> Result<bool, E> {
        if self.state == Some(target) {
            return Ok(false);
        }

        match target {
            LedState::Off => {
                self.high.set_low()?;
                self.low.set_low()?;
            }
            LedState::Low => {
                self.high.set_low()?;
                self.low.set_high()?;
            }
            LedState::High => {
                self.low.set_low()?;
                self.high.set_high()?;
            }
        }

        self.state = Some(target);
        Ok(true)
    }

    /// Last successfully applied state, `None` before the first apply.
    pub fn state(&self) -> Option<LedState> {
        self.state
    }

    /// Gives the pins back.
    pub fn release(self) -> (H, L) {
        (self.high, self.low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct CountingPin {
        high: bool,
        writes: u32,
    }

    impl ErrorType for CountingPin {
        type Error = Infallible;
    }

    impl OutputPin for CountingPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn each_state_drives_expected_lines() {
        for &state in LedState::ALL {
            let mut led = LedController::new(CountingPin::default(), CountingPin::default());
            led.apply(state).unwrap();
            let (high, low) = led.release();
            assert_eq!((high.high, low.high), state.lines());
        }
    }

    #[test]
    fn repeated_target_is_idempotent() {
        let mut led = LedController::new(CountingPin::default(), CountingPin::default());
        assert_eq!(led.apply(LedState::High), Ok(true));
        assert_eq!(led.apply(LedState::High), Ok(false));
        assert_eq!(led.apply(LedState::High), Ok(false));
        assert_eq!(led.state(), Some(LedState::High));

        let (high, low) = led.release();
        assert_eq!(high.writes, 1);
        assert_eq!(low.writes, 1);
    }

    #[test]
    fn first_apply_drives_pins_even_for_off() {
        let mut led = LedController::new(CountingPin::default(), CountingPin::default());
        assert_eq!(led.state(), None);
        assert_eq!(led.apply(LedState::Off), Ok(true));
        assert_eq!(led.state(), Some(LedState::Off));
    }

    #[test]
    fn never_more_than_one_line_active() {
        for &state in LedState::ALL {
            let (high, low) = state.lines();
            assert!(!(high && low));
        }
    }
}
