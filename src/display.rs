//! Display/configuration state machine.
//!
//! Provides [`DisplayStateMachine`], which owns the current [`DisplayMode`],
//! the sensor item on screen and the config menu highlight. It reacts to
//! classified button presses and to elapsed time, and reports what the caller
//! has to do next through [`Effects`]: redraw the LCD, drive the LED, persist
//! the record.
//!
//! Only a long press in the config menu commits. Everything else (auto-cycle
//! position, menu highlight, abandoned edits) stays in memory. Landing on an
//! LED entry in the menu lights the LED right away as a preview; the preview
//! is written by the next commit or dropped when the menu times out.

use crate::input::Press;
use crate::items::{ClosedSet, ConfigItem, Cyclic, DisplayMode, SensorItem};
use crate::led::LedState;
use crate::storage::EepromData;
use crate::time::{TimeDuration, TimeInstant};

/// What the LCD should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum View {
    /// A sensor item, either fixed or as part of the rotation.
    Sensor { item: SensorItem, cycling: bool },
    /// The config menu with the highlighted entry.
    Config { highlight: ConfigItem },
}

/// Side effects requested by a state machine update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Effects {
    /// The [`View`] changed.
    pub redraw: bool,
    /// New LED target.
    pub led: Option<LedState>,
    /// The committed record changed and must be written.
    pub persist: bool,
}

impl Effects {
    fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    /// Combines two updates from the same tick.
    pub fn merge(self, other: Self) -> Self {
        Self {
            redraw: self.redraw || other.redraw,
            led: other.led.or(self.led),
            persist: self.persist || other.persist,
        }
    }

    /// True when nothing needs to be done.
    pub fn is_empty(&self) -> bool {
        !self.redraw && self.led.is_none() && !self.persist
    }
}

/// Drives display mode, sensor selection and config menu from presses and
/// time.
///
/// # Type Parameters
/// * `I` - Time instant type
pub struct DisplayStateMachine<I: TimeInstant> {
    record: EepromData,
    mode: DisplayMode,
    shown: SensorItem,
    highlight: ConfigItem,
    preview: Option<LedState>,
    rotated_at: I,
    last_input: I,
    config_timeout: I::Duration,
}

impl<I: TimeInstant> DisplayStateMachine<I> {
    /// Starts in the mode stored in `record`.
    ///
    /// The config menu is never resumed after a reboot; a record carrying
    /// [`DisplayMode::Config`] resumes as [`DisplayMode::Sensor`].
    pub fn new(mut record: EepromData, now: I, config_timeout: I::Duration) -> Self {
        if record.display_mode == DisplayMode::Config {
            record.display_mode = DisplayMode::Sensor;
        }

        Self {
            record,
            mode: record.display_mode,
            shown: record.sensor_item,
            highlight: ConfigItem::first(),
            preview: None,
            rotated_at: now,
            last_input: now,
            config_timeout,
        }
    }

    /// Records button activity. Any debounced transition keeps the config
    /// menu open.
    pub fn on_input(&mut self, now: I) {
        self.last_input = now;
    }

    /// Handles a classified press.
    pub fn on_press(&mut self, press: Press, now: I) -> Effects {
        self.last_input = now;

        match (self.mode, press) {
            (DisplayMode::Sensor | DisplayMode::SensorCycle, Press::Short) => {
                self.shown = self.shown.next();
                if self.mode == DisplayMode::Sensor {
                    self.record.sensor_item = self.shown;
                }
                self.rotated_at = now;
                Effects::redraw()
            }
            (DisplayMode::Sensor | DisplayMode::SensorCycle, Press::Long) => {
                self.mode = DisplayMode::Config;
                self.highlight = ConfigItem::first();
                self.preview = None;
                Effects::redraw()
            }
            (DisplayMode::Config, Press::Short) => {
                self.highlight = self.highlight.next();
                let mut effects = Effects::redraw();
                if let Some(led) = self.highlight.led() {
                    self.preview = Some(led);
                    effects.led = Some(led);
                }
                effects
            }
            (DisplayMode::Config, Press::Long) => self.commit(now),
        }
    }

    /// Evaluates the timers: auto-cycle rotation and config idle timeout.
    pub fn tick(&mut self, now: I) -> Effects {
        match self.mode {
            DisplayMode::Sensor => Effects::default(),
            DisplayMode::SensorCycle => {
                if now.duration_since(self.rotated_at).reached(self.stats_period()) {
                    self.shown = self.shown.next();
                    self.rotated_at = now;
                    Effects::redraw()
                } else {
                    Effects::default()
                }
            }
            DisplayMode::Config => {
                if now.duration_since(self.last_input).reached(self.config_timeout) {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("config menu idle, discarding {}", self.highlight);
                    let mut effects = Effects::redraw();
                    if self.preview.is_some() {
                        effects.led = Some(self.record.led_state);
                    }
                    self.leave_config(now);
                    effects
                } else {
                    Effects::default()
                }
            }
        }
    }

    /// Applies the highlighted config entry to the record and leaves the menu.
    fn commit(&mut self, now: I) -> Effects {
        let mut effects = Effects {
            redraw: true,
            led: None,
            persist: true,
        };

        if let Some(item) = self.highlight.sensor() {
            self.record.display_mode = DisplayMode::Sensor;
            self.record.sensor_item = item;
            self.shown = item;
        } else if let Some(led) = self.highlight.led() {
            self.preview = Some(led);
        } else {
            self.record.display_mode = DisplayMode::SensorCycle;
        }

        if let Some(led) = self.preview {
            self.record.led_state = led;
            effects.led = Some(led);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("committed {} -> {}", self.highlight, self.record);

        self.leave_config(now);
        effects
    }

    fn leave_config(&mut self, now: I) {
        self.mode = self.record.display_mode;
        self.highlight = ConfigItem::first();
        self.preview = None;
        self.rotated_at = now;
    }

    /// Sets how long each item stays on screen in cycle mode.
    ///
    /// Returns `false` when the value is unchanged. Zero is never stored; the
    /// caller rejects it.
    pub fn set_stats_display_time_ms(&mut self, millis: u16) -> bool {
        if millis == 0 || millis == self.record.stats_display_time_ms {
            return false;
        }
        self.record.stats_display_time_ms = millis;
        true
    }

    fn stats_period(&self) -> I::Duration {
        I::Duration::from_millis(self.record.stats_display_time_ms as u64)
    }

    /// What the LCD should show now.
    pub fn view(&self) -> View {
        match self.mode {
            DisplayMode::Config => View::Config {
                highlight: self.highlight,
            },
            mode => View::Sensor {
                item: self.shown,
                cycling: mode == DisplayMode::SensorCycle,
            },
        }
    }

    /// The record as it will be written on the next commit.
    pub fn record(&self) -> &EepromData {
        &self.record
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Sensor item on screen (or on screen again once the menu closes).
    pub fn shown(&self) -> SensorItem {
        self.shown
    }

    pub fn highlight(&self) -> ConfigItem {
        self.highlight
    }

    /// LED state the pins should show: the menu preview while one is
    /// pending, the record's state otherwise.
    pub fn led_target(&self) -> LedState {
        self.preview.unwrap_or(self.record.led_state)
    }
}
