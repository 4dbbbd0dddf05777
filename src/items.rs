//! Closed selection sets: sensor items, config menu items and display modes.
//!
//! Every set carries an explicit `ALL` table whose order matches the wire
//! value of each variant. The count of a set doubles as its `endEnum`
//! sentinel: it is one past the last valid raw value and is never a valid
//! selection. Raw-integer arithmetic on these enums happens only in
//! [`ClosedSet`] and [`Cyclic`].

use crate::led::LedState;

/// A closed set of variants with a stable `u8` wire value.
pub trait ClosedSet: Copy + PartialEq + 'static {
    /// All variants, ordered by wire value starting at 0.
    const ALL: &'static [Self];

    /// Number of valid variants, i.e. the `endEnum` sentinel value.
    const COUNT: usize = Self::ALL.len();

    /// Wire value of this variant.
    fn raw(self) -> u8;

    /// Parses a wire value. Values `>= COUNT` are rejected.
    #[inline]
    fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// First variant of the set.
    #[inline]
    fn first() -> Self {
        Self::ALL[0]
    }
}

/// A closed set whose selection is advanced by a button press.
pub trait Cyclic: ClosedSet {
    /// Next variant, wrapping from the last one back to the first.
    #[inline]
    fn next(self) -> Self {
        let index = (self.raw() as usize + 1) % Self::COUNT;
        Self::ALL[index]
    }
}

/// Which sensor reading is shown on the LCD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SensorItem {
    /// Chassis temperature and fan.
    #[default]
    System = 0,
    /// CPU temperature and fan.
    Cpu,
    /// GPU temperature and fan.
    Gpu,
    /// All three temperatures on one screen.
    AllTemp,
    /// All three fan speeds on one screen.
    AllFan,
}

impl SensorItem {
    /// Short uppercase title used on the first LCD line and in the config menu.
    pub const fn label(self) -> &'static str {
        match self {
            SensorItem::System => "SYSTEM",
            SensorItem::Cpu => "CPU",
            SensorItem::Gpu => "GPU",
            SensorItem::AllTemp => "ALL TEMP",
            SensorItem::AllFan => "ALL FAN",
        }
    }
}

impl ClosedSet for SensorItem {
    const ALL: &'static [Self] = &[
        SensorItem::System,
        SensorItem::Cpu,
        SensorItem::Gpu,
        SensorItem::AllTemp,
        SensorItem::AllFan,
    ];

    #[inline]
    fn raw(self) -> u8 {
        self as u8
    }
}

impl Cyclic for SensorItem {}

/// Entries of the configuration menu.
///
/// The first five entries mirror [`SensorItem`] and select a fixed sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ConfigItem {
    #[default]
    System = 0,
    Cpu,
    Gpu,
    AllTemp,
    AllFan,
    /// Rotate through every sensor item automatically.
    Cycle,
    ButtonLedOff,
    ButtonLedHigh,
    ButtonLedLow,
}

impl ConfigItem {
    /// The fixed sensor this entry selects, if it is a sensor entry.
    pub const fn sensor(self) -> Option<SensorItem> {
        match self {
            ConfigItem::System => Some(SensorItem::System),
            ConfigItem::Cpu => Some(SensorItem::Cpu),
            ConfigItem::Gpu => Some(SensorItem::Gpu),
            ConfigItem::AllTemp => Some(SensorItem::AllTemp),
            ConfigItem::AllFan => Some(SensorItem::AllFan),
            _ => None,
        }
    }

    /// The LED state this entry selects, if it is an LED entry.
    pub const fn led(self) -> Option<LedState> {
        match self {
            ConfigItem::ButtonLedOff => Some(LedState::Off),
            ConfigItem::ButtonLedHigh => Some(LedState::High),
            ConfigItem::ButtonLedLow => Some(LedState::Low),
            _ => None,
        }
    }

    /// Menu label, at most 14 characters so it fits behind the `> ` cursor.
    pub const fn label(self) -> &'static str {
        match self {
            ConfigItem::Cycle => "CYCLE",
            ConfigItem::ButtonLedOff => "LED OFF",
            ConfigItem::ButtonLedHigh => "LED HIGH",
            ConfigItem::ButtonLedLow => "LED LOW",
            ConfigItem::System => SensorItem::System.label(),
            ConfigItem::Cpu => SensorItem::Cpu.label(),
            ConfigItem::Gpu => SensorItem::Gpu.label(),
            ConfigItem::AllTemp => SensorItem::AllTemp.label(),
            ConfigItem::AllFan => SensorItem::AllFan.label(),
        }
    }
}

impl ClosedSet for ConfigItem {
    const ALL: &'static [Self] = &[
        ConfigItem::System,
        ConfigItem::Cpu,
        ConfigItem::Gpu,
        ConfigItem::AllTemp,
        ConfigItem::AllFan,
        ConfigItem::Cycle,
        ConfigItem::ButtonLedOff,
        ConfigItem::ButtonLedHigh,
        ConfigItem::ButtonLedLow,
    ];

    #[inline]
    fn raw(self) -> u8 {
        self as u8
    }
}

impl Cyclic for ConfigItem {}

/// What the LCD is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DisplayMode {
    /// Show one fixed sensor item.
    #[default]
    Sensor = 0,
    /// Rotate through the sensor items on a timer.
    SensorCycle,
    /// Configuration menu.
    Config,
}

impl ClosedSet for DisplayMode {
    const ALL: &'static [Self] = &[
        DisplayMode::Sensor,
        DisplayMode::SensorCycle,
        DisplayMode::Config,
    ];

    #[inline]
    fn raw(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_table_matches_wire_values<T: ClosedSet + core::fmt::Debug>() {
        for (index, variant) in T::ALL.iter().enumerate() {
            assert_eq!(variant.raw() as usize, index, "{:?}", variant);
        }
    }

    #[test]
    fn tables_are_ordered_by_wire_value() {
        assert_table_matches_wire_values::<SensorItem>();
        assert_table_matches_wire_values::<ConfigItem>();
        assert_table_matches_wire_values::<DisplayMode>();
    }

    #[test]
    fn sentinel_values_match_counts() {
        assert_eq!(SensorItem::COUNT, 5);
        assert_eq!(ConfigItem::COUNT, 9);
        assert_eq!(DisplayMode::COUNT, 3);
    }

    #[test]
    fn from_raw_rejects_sentinel_and_above() {
        assert_eq!(SensorItem::from_raw(4), Some(SensorItem::AllFan));
        assert_eq!(SensorItem::from_raw(5), None);
        assert_eq!(SensorItem::from_raw(0xFF), None);
        assert_eq!(ConfigItem::from_raw(9), None);
        assert_eq!(DisplayMode::from_raw(3), None);
    }

    #[test]
    fn first_variant_is_wire_value_zero() {
        assert_eq!(SensorItem::first(), SensorItem::System);
        assert_eq!(ConfigItem::first(), ConfigItem::System);
        assert_eq!(DisplayMode::first(), DisplayMode::Sensor);
    }

    #[test]
    fn next_wraps_before_sentinel() {
        assert_eq!(SensorItem::AllFan.next(), SensorItem::System);
        assert_eq!(ConfigItem::ButtonLedLow.next(), ConfigItem::System);
        assert_eq!(ConfigItem::AllFan.next(), ConfigItem::Cycle);
    }

    fn assert_cycle_visits_every_value_once<T: Cyclic + core::fmt::Debug>() {
        for &start in T::ALL {
            let mut seen = [false; 16];
            let mut current = start;
            for _ in 0..T::COUNT {
                let index = current.raw() as usize;
                assert!(index < T::COUNT, "{:?} is past the sentinel", current);
                assert!(!seen[index], "{:?} visited twice from {:?}", current, start);
                seen[index] = true;
                current = current.next();
            }
            assert!(seen[..T::COUNT].iter().all(|&s| s), "walk from {:?}", start);
            assert_eq!(current, start);
        }
    }

    #[test]
    fn next_visits_every_value_once_from_any_start() {
        assert_cycle_visits_every_value_once::<SensorItem>();
        assert_cycle_visits_every_value_once::<ConfigItem>();
    }

    #[test]
    fn config_items_map_to_exactly_one_action() {
        for item in ConfigItem::ALL {
            let actions = item.sensor().is_some() as u8
                + item.led().is_some() as u8
                + (*item == ConfigItem::Cycle) as u8;
            assert_eq!(actions, 1, "{:?}", item);
        }
    }

    #[test]
    fn labels_fit_behind_menu_cursor() {
        for item in ConfigItem::ALL {
            assert!(item.label().len() <= 14);
        }
    }
}
