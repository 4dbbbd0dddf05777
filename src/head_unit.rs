//! Per-tick wiring of button, display state machine, LED and storage.

use crate::config::DeviceConfig;
use crate::display::{DisplayStateMachine, Effects, View};
use crate::input::Button;
use crate::led::{LedController, LedState};
use crate::render::{Frame, SensorReadings, render};
use crate::storage::{ConfigStore, EepromData, RecordError, RecordField, StoreError};
use crate::time::{TimeDuration, TimeInstant, TimeSource};
use embedded_hal::digital::OutputPin;
use embedded_storage::Storage;

/// Errors reported by the head unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeadUnitError<P, S> {
    /// Driving an LED line failed.
    Led(P),
    /// Reading or writing the persisted record failed.
    Store(StoreError<S>),
    /// A setting was given a value the record cannot hold.
    Rejected(RecordError),
}

impl<P: core::fmt::Debug, S: core::fmt::Debug> core::fmt::Display for HeadUnitError<P, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HeadUnitError::Led(e) => write!(f, "LED pin error: {:?}", e),
            HeadUnitError::Store(e) => write!(f, "{}", e),
            HeadUnitError::Rejected(e) => write!(f, "rejected setting: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl<P: core::fmt::Debug, S: core::fmt::Debug> std::error::Error for HeadUnitError<P, S> {}

/// Outcome of one [`HeadUnit::poll`].
///
/// `effects` is valid even when `fault` is set: the state machine has
/// already advanced, so the caller must still redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick<P, S> {
    pub effects: Effects,
    /// I/O failure hit during this tick.
    pub fault: Option<HeadUnitError<P, S>>,
}

/// The sensor head unit: one button, one bicolor LED, one persisted record.
///
/// Call [`poll`](Self::poll) once per main-loop iteration with the raw button
/// level, and [`frame`](Self::frame) whenever the returned [`Tick`] asks for
/// a redraw or new readings arrive.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `T` - Time source
/// * `H`, `L` - High and low LED line pins
/// * `S` - Non-volatile storage holding the record
pub struct HeadUnit<'t, I, T, H, L, S>
where
    I: TimeInstant,
    T: TimeSource<I>,
    H: OutputPin,
    L: OutputPin<Error = H::Error>,
    S: Storage,
{
    time_source: &'t T,
    button: Button<I>,
    display: DisplayStateMachine<I>,
    led: LedController<H, L>,
    store: ConfigStore<S>,
    saves: u32,
    boot_fault: Option<HeadUnitError<H::Error, S::Error>>,
}

impl<'t, I, T, H, L, S> HeadUnit<'t, I, T, H, L, S>
where
    I: TimeInstant,
    T: TimeSource<I>,
    H: OutputPin,
    L: OutputPin<Error = H::Error>,
    S: Storage,
    S::Error: core::fmt::Debug,
{
    /// Loads the persisted record, heals it if it was rejected and lights the
    /// LED accordingly.
    ///
    /// Boot never fails: if storage or a pin cannot be used the unit runs on
    /// the default record and reports the problem through
    /// [`boot_fault`](Self::boot_fault).
    pub fn boot(
        config: &DeviceConfig,
        time_source: &'t T,
        led_high: H,
        led_low: L,
        storage: S,
    ) -> Self {
        let default = EepromData::new(config.default_stats_display_ms);
        let mut store = ConfigStore::new(storage, config.eeprom_offset, default);
        let mut boot_fault = None;
        let mut saves = 0;

        let record = match store.load_or_heal() {
            Ok(loaded) => {
                if loaded.is_valid() {
                    #[cfg(feature = "defmt")]
                    defmt::info!("loaded config {}", loaded.data);
                } else {
                    saves += 1;
                }
                loaded.data
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::error!("config storage unavailable: {}", defmt::Debug2Format(&_e));
                boot_fault = Some(HeadUnitError::Store(_e));
                default
            }
        };

        let mut led = LedController::new(led_high, led_low);
        if let Err(_e) = led.apply(record.led_state) {
            #[cfg(feature = "defmt")]
            defmt::error!("LED pin write failed: {}", defmt::Debug2Format(&_e));
            if boot_fault.is_none() {
                boot_fault = Some(HeadUnitError::Led(_e));
            }
        }

        let now = time_source.now();
        Self {
            time_source,
            button: Button::new(
                I::Duration::from_millis(config.debounce_ms),
                I::Duration::from_millis(config.long_press_ms),
            ),
            display: DisplayStateMachine::new(
                record,
                now,
                I::Duration::from_millis(config.config_timeout_ms),
            ),
            led,
            store,
            saves,
            boot_fault,
        }
    }

    /// Runs one tick.
    ///
    /// Samples the button at the current instant, feeds any press to the
    /// state machine, evaluates its timers, reconciles the LED with the
    /// state machine's target and writes the record if a commit happened.
    ///
    /// A failed LED write is retried on the next tick, a failed save on the
    /// next commit. Either is reported in [`Tick::fault`] next to the
    /// effects of the tick, with the save failure taking precedence.
    pub fn poll(&mut self, is_low: bool) -> Tick<H::Error, S::Error> {
        let now = self.time_source.now();
        let update = self.button.poll(is_low, now);

        if update.is_activity() {
            self.display.on_input(now);
        }

        let mut effects = match update.press {
            Some(press) => self.display.on_press(press, now),
            None => Effects::default(),
        };
        effects = effects.merge(self.display.tick(now));

        let mut fault = None;

        if let Err(e) = self.led.apply(self.display.led_target()) {
            #[cfg(feature = "defmt")]
            defmt::warn!("LED pin write failed: {}", defmt::Debug2Format(&e));
            fault = Some(HeadUnitError::Led(e));
        }

        if effects.persist {
            if let Err(e) = self.save() {
                fault = Some(e);
            }
        }

        Tick { effects, fault }
    }

    /// Sets how long each sensor item stays on screen in cycle mode and
    /// persists it.
    ///
    /// # Returns
    /// * `Ok(true)` - The value changed and was written
    /// * `Ok(false)` - The value was already set; nothing is written
    /// * `Err` - Zero was given, or the write failed
    pub fn set_stats_display_time_ms(
        &mut self,
        millis: u16,
    ) -> Result<bool, HeadUnitError<H::Error, S::Error>> {
        if millis == 0 {
            return Err(HeadUnitError::Rejected(RecordError::OutOfRange {
                field: RecordField::StatsDisplayTime,
                value: 0,
            }));
        }
        if !self.display.set_stats_display_time_ms(millis) {
            return Ok(false);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("stats display time set to {} ms", millis);
        self.save()?;
        Ok(true)
    }

    fn save(&mut self) -> Result<(), HeadUnitError<H::Error, S::Error>> {
        let record = *self.display.record();
        match self.store.save(&record) {
            Ok(()) => {
                self.saves += 1;
                Ok(())
            }
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::error!("saving config failed: {}", defmt::Debug2Format(&e));
                Err(HeadUnitError::Store(e))
            }
        }
    }

    /// LCD content for the current view.
    pub fn frame(&self, readings: &SensorReadings) -> Frame {
        render(self.display.view(), readings)
    }

    pub fn view(&self) -> View {
        self.display.view()
    }

    pub fn display(&self) -> &DisplayStateMachine<I> {
        &self.display
    }

    /// The in-memory record. Matches storage except for a sensor item picked
    /// by short press, which is only written with the next save.
    pub fn record(&self) -> &EepromData {
        self.display.record()
    }

    /// LED state currently driven on the pins, `None` if no write succeeded
    /// yet.
    pub fn led_state(&self) -> Option<LedState> {
        self.led.state()
    }

    /// Number of record writes since boot, including the heal.
    pub fn saves(&self) -> u32 {
        self.saves
    }

    /// First error hit during [`boot`](Self::boot), if any.
    pub fn boot_fault(&self) -> Option<&HeadUnitError<H::Error, S::Error>> {
        self.boot_fault.as_ref()
    }

    pub fn storage(&self) -> &S {
        self.store.storage()
    }
}
