//! Device constants and the runtime configuration handed to each component.
//!
//! The constants are the factory values. Wiring and timings reach the
//! components through a [`DeviceConfig`] built at startup, so a board with
//! different pins or timings only has to build a different config. LCD
//! geometry and the record version are fixed at compile time.

/// I²C address of the PCF8574 backpack driving the LCD.
pub const LCD_I2C_ADDR: u8 = 0x27;

/// Characters per LCD line.
pub const LCD_WIDTH: usize = 16;

/// Number of LCD lines.
pub const LCD_HEIGHT: usize = 2;

/// Output pin of the LED "high" line.
pub const INPUT_BUTTON_LED_HIGH: u8 = 5;

/// Output pin of the LED "low" line.
pub const INPUT_BUTTON_LED_LOW: u8 = 4;

/// Input pin of the push button (active-low, internal pull-up).
pub const INPUT_BUTTON: u8 = 6;

/// A raw level must be stable this long before it is accepted.
pub const DEBOUNCE_TIME_MS: u64 = 30;

/// Hold time after which a press counts as a long press.
pub const LONG_PRESS_TIME_MS: u64 = 800;

/// Default time a sensor item stays on screen in cycle mode.
pub const STATS_DISPLAY_DEFAULT_TIME_MS: u16 = 3000;

/// Idle time after which the config menu is abandoned.
pub const CONFIG_DISPLAY_TIME_MS: u64 = 3000;

/// Format revision of the persisted record.
pub const CURRENT_EEPROM_DATA_VERSION: u8 = 1;

/// Byte offset of the persisted record in non-volatile storage.
pub const EEPROM_DATA_OFFSET: u32 = 0;

/// Pin assignment, geometry and timings of one head unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub lcd_i2c_addr: u8,
    pub lcd_width: usize,
    pub lcd_height: usize,
    pub button_pin: u8,
    pub led_high_pin: u8,
    pub led_low_pin: u8,
    pub debounce_ms: u64,
    pub long_press_ms: u64,
    pub config_timeout_ms: u64,
    /// Used when the stored record is missing or corrupt.
    pub default_stats_display_ms: u16,
    pub eeprom_offset: u32,
}

impl DeviceConfig {
    /// Factory configuration.
    pub const fn new() -> Self {
        Self {
            lcd_i2c_addr: LCD_I2C_ADDR,
            lcd_width: LCD_WIDTH,
            lcd_height: LCD_HEIGHT,
            button_pin: INPUT_BUTTON,
            led_high_pin: INPUT_BUTTON_LED_HIGH,
            led_low_pin: INPUT_BUTTON_LED_LOW,
            debounce_ms: DEBOUNCE_TIME_MS,
            long_press_ms: LONG_PRESS_TIME_MS,
            config_timeout_ms: CONFIG_DISPLAY_TIME_MS,
            default_stats_display_ms: STATS_DISPLAY_DEFAULT_TIME_MS,
            eeprom_offset: EEPROM_DATA_OFFSET,
        }
    }

    pub const fn with_debounce_ms(mut self, millis: u64) -> Self {
        self.debounce_ms = millis;
        self
    }

    pub const fn with_long_press_ms(mut self, millis: u64) -> Self {
        self.long_press_ms = millis;
        self
    }

    pub const fn with_config_timeout_ms(mut self, millis: u64) -> Self {
        self.config_timeout_ms = millis;
        self
    }

    /// Zero is replaced with the factory default, since a zero period would
    /// make the cycle mode spin on every tick.
    pub const fn with_default_stats_display_ms(mut self, millis: u16) -> Self {
        self.default_stats_display_ms = if millis == 0 {
            STATS_DISPLAY_DEFAULT_TIME_MS
        } else {
            millis
        };
        self
    }

    pub const fn with_eeprom_offset(mut self, offset: u32) -> Self {
        self.eeprom_offset = offset;
        self
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new()
    }
}
