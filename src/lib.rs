#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`HeadUnit`**: Owns every component and runs one tick per `poll`
//! - **`Button`**: Debouncer plus short/long press classifier for the active-low button
//! - **`DisplayStateMachine`**: Sensor, auto-cycle and config menu modes; reports `Effects`
//! - **`LedController`**: Drives the two lines of the bicolor button LED
//! - **`ConfigStore`**: Loads, validates, heals and saves the `EepromData` record
//! - **`render`**: Turns the current `View` and `SensorReadings` into two LCD lines
//! - **`ClosedSet` / `Cyclic`**: Wire values and wrap-around stepping of the selection enums
//! - **`TimeSource`**: Trait to implement for your timing system
//! - **`DeviceConfig`**: Pins, LCD geometry and timings
//!
//! Hardware is reached only through `embedded-hal` output pins and an
//! `embedded-storage` device, so the core runs unchanged against mocks on the
//! host.

pub mod config;
pub mod display;
pub mod head_unit;
pub mod input;
pub mod items;
pub mod led;
pub mod render;
pub mod storage;
pub mod time;

pub use config::DeviceConfig;
pub use display::{DisplayStateMachine, Effects, View};
pub use head_unit::{HeadUnit, HeadUnitError, Tick};
pub use input::{Button, ButtonEvent, ButtonUpdate, Debouncer, Press, PressClassifier};
pub use items::{ClosedSet, ConfigItem, Cyclic, DisplayMode, SensorItem};
pub use led::{LedController, LedState};
pub use render::{Frame, Line, Reading, SensorReadings, render};
pub use storage::{ConfigStore, EepromData, Loaded, RecordError, RecordField, StoreError};
pub use time::{TimeDuration, TimeInstant, TimeSource};
