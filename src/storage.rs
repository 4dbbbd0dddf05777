//! Persisted configuration record.
//!
//! The record lives at a fixed offset in non-volatile storage and is always
//! written whole. Layout (byte order and field order fixed):
//!
//! ```text
//! offset  type  field
//! 0       u8    Version
//! 1       u8    Size
//! 2       u8    SelectedDisplayMode
//! 3       u8    SelectedSensorItem
//! 4       u8    LedState
//! 5       u16   StatsDisplayTimeMs (little-endian)
//! 7       u8    Parity
//! ```
//!
//! `Parity` must stay the last byte: new fields are inserted before it and
//! bump `Size` and `CURRENT_EEPROM_DATA_VERSION`, so older records fail the
//! size or version check instead of being misread.

use crate::config::{CURRENT_EEPROM_DATA_VERSION, STATS_DISPLAY_DEFAULT_TIME_MS};
use crate::items::{ClosedSet, DisplayMode, SensorItem};
use crate::led::LedState;
use embedded_storage::{ReadStorage, Storage};

/// Encoded record length in bytes.
pub const RECORD_SIZE: usize = 8;

const VERSION: usize = 0;
const SIZE: usize = 1;
const DISPLAY_MODE: usize = 2;
const SENSOR_ITEM: usize = 3;
const LED_STATE: usize = 4;
const STATS_DISPLAY_TIME: usize = 5;
const PARITY: usize = RECORD_SIZE - 1;

/// Starting value of the parity fold. Non-zero so that zeroed or erased
/// (`0xFF`) storage never carries a matching parity byte.
const PARITY_SEED: u8 = 0x5A;

/// Persisted record field that failed a range check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordField {
    DisplayMode,
    SensorItem,
    LedState,
    StatsDisplayTime,
}

/// Why a stored record was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Written by another format revision (or never written).
    VersionMismatch { found: u8 },
    /// Length stamp differs from [`RECORD_SIZE`].
    SizeMismatch { found: u8 },
    /// Torn write or bit rot.
    ParityMismatch { expected: u8, found: u8 },
    /// A field holds a value outside its valid range.
    OutOfRange { field: RecordField, value: u16 },
}

impl core::fmt::Display for RecordError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RecordError::VersionMismatch { found } => write!(
                f,
                "record version {} does not match {}",
                found, CURRENT_EEPROM_DATA_VERSION
            ),
            RecordError::SizeMismatch { found } => {
                write!(f, "record size {} does not match {}", found, RECORD_SIZE)
            }
            RecordError::ParityMismatch { expected, found } => write!(
                f,
                "record parity {:#04x} does not match computed {:#04x}",
                found, expected
            ),
            RecordError::OutOfRange { field, value } => {
                write!(f, "record field {:?} out of range: {}", field, value)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RecordError {}

/// The head unit's durable configuration.
///
/// Version, size and parity are not stored here; they are stamped by
/// [`encode`](Self::encode) and checked by [`decode`](Self::decode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EepromData {
    pub display_mode: DisplayMode,
    pub sensor_item: SensorItem,
    pub led_state: LedState,
    /// How long each item stays on screen in cycle mode. Never zero.
    pub stats_display_time_ms: u16,
}

impl EepromData {
    /// The fail-safe record: first sensor item, fixed display, LED off.
    pub const fn new(stats_display_time_ms: u16) -> Self {
        Self {
            display_mode: DisplayMode::Sensor,
            sensor_item: SensorItem::System,
            led_state: LedState::Off,
            stats_display_time_ms,
        }
    }

    /// Serializes the record, stamping the current version and size and
    /// computing parity over every preceding byte.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut bytes = [0u8; RECORD_SIZE];
        bytes[VERSION] = CURRENT_EEPROM_DATA_VERSION;
        bytes[SIZE] = RECORD_SIZE as u8;
        bytes[DISPLAY_MODE] = self.display_mode.raw();
        bytes[SENSOR_ITEM] = self.sensor_item.raw();
        bytes[LED_STATE] = self.led_state.raw();
        bytes[STATS_DISPLAY_TIME..STATS_DISPLAY_TIME + 2]
            .copy_from_slice(&self.stats_display_time_ms.to_le_bytes());
        bytes[PARITY] = parity(&bytes[..PARITY]);
        bytes
    }

    /// Parses and validates a stored record.
    ///
    /// Checks run in order: version, size, parity, field ranges. A record is
    /// accepted only if every check passes.
    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Result<Self, RecordError> {
        if bytes[VERSION] != CURRENT_EEPROM_DATA_VERSION {
            return Err(RecordError::VersionMismatch {
                found: bytes[VERSION],
            });
        }

        if bytes[SIZE] as usize != RECORD_SIZE {
            return Err(RecordError::SizeMismatch { found: bytes[SIZE] });
        }

        let expected = parity(&bytes[..PARITY]);
        if bytes[PARITY] != expected {
            return Err(RecordError::ParityMismatch {
                expected,
                found: bytes[PARITY],
            });
        }

        let stats_display_time_ms =
            u16::from_le_bytes([bytes[STATS_DISPLAY_TIME], bytes[STATS_DISPLAY_TIME + 1]]);
        if stats_display_time_ms == 0 {
            return Err(RecordError::OutOfRange {
                field: RecordField::StatsDisplayTime,
                value: 0,
            });
        }

        Ok(Self {
            display_mode: field(bytes[DISPLAY_MODE], RecordField::DisplayMode)?,
            sensor_item: field(bytes[SENSOR_ITEM], RecordField::SensorItem)?,
            led_state: field(bytes[LED_STATE], RecordField::LedState)?,
            stats_display_time_ms,
        })
    }
}

impl Default for EepromData {
    fn default() -> Self {
        Self::new(STATS_DISPLAY_DEFAULT_TIME_MS)
    }
}

fn field<T: ClosedSet>(raw: u8, field: RecordField) -> Result<T, RecordError> {
    T::from_raw(raw).ok_or(RecordError::OutOfRange {
        field,
        value: raw as u16,
    })
}

/// Seeded XOR fold over `bytes`.
pub fn parity(bytes: &[u8]) -> u8 {
    bytes.iter().fold(PARITY_SEED, |acc, b| acc ^ b)
}

/// Storage-level failure while reading or writing the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError<E> {
    /// The underlying storage driver failed.
    Storage(E),
    /// The record does not fit below the storage capacity at this offset.
    OutOfBounds { offset: u32, capacity: usize },
}

impl<E: core::fmt::Debug> core::fmt::Display for StoreError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreError::Storage(e) => write!(f, "storage error: {:?}", e),
            StoreError::OutOfBounds { offset, capacity } => write!(
                f,
                "record at offset {} does not fit in {} bytes",
                offset, capacity
            ),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for StoreError<E> {}

/// Outcome of [`ConfigStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Loaded {
    /// The stored record, or the default if it was rejected.
    pub data: EepromData,
    /// Why the stored record was rejected, `None` if it was trusted.
    pub recovered: Option<RecordError>,
}

impl Loaded {
    pub fn is_valid(&self) -> bool {
        self.recovered.is_none()
    }
}

/// Reads and writes the [`EepromData`] record at a fixed storage offset.
pub struct ConfigStore<S> {
    storage: S,
    offset: u32,
    default: EepromData,
}

impl<S: Storage> ConfigStore<S> {
    /// * `offset` - Byte offset of the record
    /// * `default` - Record substituted when the stored one is rejected
    pub fn new(storage: S, offset: u32, default: EepromData) -> Self {
        Self {
            storage,
            offset,
            default,
        }
    }

    /// Reads and validates the stored record.
    ///
    /// A rejected record is never partially used: the result carries the
    /// default record and the rejection reason. The caller is expected to
    /// persist the default; see [`load_or_heal`](Self::load_or_heal).
    pub fn load(&mut self) -> Result<Loaded, StoreError<S::Error>> {
        self.check_bounds()?;

        let mut bytes = [0u8; RECORD_SIZE];
        self.storage
            .read(self.offset, &mut bytes)
            .map_err(StoreError::Storage)?;

        Ok(match EepromData::decode(&bytes) {
            Ok(data) => Loaded {
                data,
                recovered: None,
            },
            Err(e) => Loaded {
                data: self.default,
                recovered: Some(e),
            },
        })
    }

    /// [`load`](Self::load), then writes the default back if the stored
    /// record was rejected.
    pub fn load_or_heal(&mut self) -> Result<Loaded, StoreError<S::Error>> {
        let loaded = self.load()?;
        if let Some(_reason) = loaded.recovered {
            #[cfg(feature = "defmt")]
            defmt::warn!("stored config rejected ({}), writing defaults", _reason);
            self.save(&loaded.data)?;
        }
        Ok(loaded)
    }

    /// Writes the complete record in a single storage write.
    ///
    /// A power loss mid-write leaves a record that fails the parity or
    /// version check on the next load.
    pub fn save(&mut self, data: &EepromData) -> Result<(), StoreError<S::Error>> {
        self.check_bounds()?;
        self.storage
            .write(self.offset, &data.encode())
            .map_err(StoreError::Storage)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn release(self) -> S {
        self.storage
    }

    fn check_bounds(&self) -> Result<(), StoreError<S::Error>> {
        let capacity = self.storage.capacity();
        match (self.offset as usize).checked_add(RECORD_SIZE) {
            Some(end) if end <= capacity => Ok(()),
            _ => Err(StoreError::OutOfBounds {
                offset: self.offset,
                capacity,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EepromData {
        EepromData {
            display_mode: DisplayMode::SensorCycle,
            sensor_item: SensorItem::Gpu,
            led_state: LedState::High,
            stats_display_time_ms: 0x1234,
        }
    }

    #[test]
    fn encode_layout_is_fixed() {
        let bytes = sample().encode();
        assert_eq!(&bytes[..PARITY], &[1, 8, 1, 2, 2, 0x34, 0x12]);
        assert_eq!(bytes[PARITY], parity(&bytes[..PARITY]));
    }

    #[test]
    fn parity_is_last_byte() {
        assert_eq!(PARITY, RECORD_SIZE - 1);
        assert_eq!(STATS_DISPLAY_TIME + 2, PARITY);
    }

    #[test]
    fn erased_and_zeroed_storage_fail_version_check() {
        assert_eq!(
            EepromData::decode(&[0xFF; RECORD_SIZE]),
            Err(RecordError::VersionMismatch { found: 0xFF })
        );
        assert_eq!(
            EepromData::decode(&[0x00; RECORD_SIZE]),
            Err(RecordError::VersionMismatch { found: 0x00 })
        );
    }

    #[test]
    fn seeded_parity_rejects_uniform_bytes() {
        assert_ne!(parity(&[0xFF; PARITY]), 0xFF);
        assert_ne!(parity(&[0x00; PARITY]), 0x00);
    }

    #[test]
    fn size_checked_before_parity() {
        let mut bytes = sample().encode();
        bytes[SIZE] = 9;
        assert_eq!(
            EepromData::decode(&bytes),
            Err(RecordError::SizeMismatch { found: 9 })
        );
    }

    #[test]
    fn any_single_bit_flip_is_rejected() {
        let good = sample().encode();
        for byte in 0..RECORD_SIZE {
            for bit in 0..8 {
                let mut bytes = good;
                bytes[byte] ^= 1 << bit;
                assert!(EepromData::decode(&bytes).is_err(), "byte {} bit {}", byte, bit);
            }
        }
    }

    #[test]
    fn out_of_range_field_with_valid_parity_is_rejected() {
        let mut bytes = sample().encode();
        bytes[SENSOR_ITEM] = SensorItem::COUNT as u8;
        bytes[PARITY] = parity(&bytes[..PARITY]);
        assert_eq!(
            EepromData::decode(&bytes),
            Err(RecordError::OutOfRange {
                field: RecordField::SensorItem,
                value: 5
            })
        );
    }

    #[test]
    fn zero_display_time_is_rejected() {
        let mut bytes = sample().encode();
        bytes[STATS_DISPLAY_TIME] = 0;
        bytes[STATS_DISPLAY_TIME + 1] = 0;
        bytes[PARITY] = parity(&bytes[..PARITY]);
        assert!(matches!(
            EepromData::decode(&bytes),
            Err(RecordError::OutOfRange {
                field: RecordField::StatsDisplayTime,
                ..
            })
        ));
    }

    #[test]
    fn default_record_matches_fail_safe_values() {
        let data = EepromData::default();
        assert_eq!(data.display_mode, DisplayMode::Sensor);
        assert_eq!(data.sensor_item, SensorItem::System);
        assert_eq!(data.led_state, LedState::Off);
        assert_eq!(data.stats_display_time_ms, 3000);
    }
}
