//! Shared test infrastructure for sensors-display integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use core::cell::Cell;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use embedded_storage::{ReadStorage, Storage};
use sensors_display::{TimeDuration, TimeInstant, TimeSource};

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    fn as_millis(&self) -> u64 {
        self.0
    }

    fn from_millis(millis: u64) -> Self {
        TestDuration(millis)
    }
}

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0 - earlier.0)
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: Cell<TestInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: Cell::new(TestInstant(0)),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u64) {
        let current = self.current_time.get();
        self.current_time.set(TestInstant(current.0 + millis));
    }

    pub fn set_time(&self, time: TestInstant) {
        self.current_time.set(time);
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Output Pins
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinError;

impl embedded_hal::digital::Error for PinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Observable state of one output line, shared with the [`MockPin`] driving it
pub struct PinLine {
    high: Cell<bool>,
    writes: Cell<u32>,
    fail: Cell<bool>,
}

impl PinLine {
    pub fn new() -> Self {
        Self {
            high: Cell::new(false),
            writes: Cell::new(0),
            fail: Cell::new(false),
        }
    }

    pub fn is_high(&self) -> bool {
        self.high.get()
    }

    pub fn writes(&self) -> u32 {
        self.writes.get()
    }

    /// Make every following write fail
    pub fn set_failing(&self, fail: bool) {
        self.fail.set(fail);
    }

    pub fn pin(&self) -> MockPin<'_> {
        MockPin(self)
    }
}

pub struct MockPin<'a>(&'a PinLine);

impl MockPin<'_> {
    fn set(&mut self, high: bool) -> Result<(), PinError> {
        if self.0.fail.get() {
            return Err(PinError);
        }
        self.0.high.set(high);
        self.0.writes.set(self.0.writes.get() + 1);
        Ok(())
    }
}

impl ErrorType for MockPin<'_> {
    type Error = PinError;
}

impl OutputPin for MockPin<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true)
    }
}

// ============================================================================
// Mock EEPROM
// ============================================================================

pub const EEPROM_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EepromError {
    Read,
    Write,
}

/// In-memory EEPROM, erased to `0xFF`, counting write calls
pub struct MockEeprom {
    pub bytes: [u8; EEPROM_CAPACITY],
    writes: u32,
    fail_reads: bool,
    fail_writes: Cell<bool>,
}

impl MockEeprom {
    /// Freshly erased part
    pub fn new() -> Self {
        Self {
            bytes: [0xFF; EEPROM_CAPACITY],
            writes: 0,
            fail_reads: false,
            fail_writes: Cell::new(false),
        }
    }

    /// Part holding `record` at `offset`
    pub fn with_record(offset: usize, record: &[u8]) -> Self {
        let mut eeprom = Self::new();
        eeprom.bytes[offset..offset + record.len()].copy_from_slice(record);
        eeprom
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::new()
        }
    }

    pub fn writes(&self) -> u32 {
        self.writes
    }

    /// Callable through a shared reference so tests can flip it after the
    /// part was handed over
    pub fn set_failing_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn record(&self, offset: usize, len: usize) -> &[u8] {
        &self.bytes[offset..offset + len]
    }
}

impl ReadStorage for MockEeprom {
    type Error = EepromError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        if self.fail_reads {
            return Err(EepromError::Read);
        }
        let start = offset as usize;
        bytes.copy_from_slice(&self.bytes[start..start + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        EEPROM_CAPACITY
    }
}

impl Storage for MockEeprom {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes.get() {
            return Err(EepromError::Write);
        }
        let start = offset as usize;
        self.bytes[start..start + bytes.len()].copy_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }
}
