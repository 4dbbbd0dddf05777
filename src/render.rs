//! Text content of the 16×2 LCD.
//!
//! Decides *what* is on each line; pushing the characters to the HD44780 is
//! left to the LCD driver. Lines longer than [`LCD_WIDTH`] are truncated.

use crate::config::{LCD_HEIGHT, LCD_WIDTH};
use crate::display::View;
use crate::items::SensorItem;
use core::fmt::Write;
use heapless::String;

/// One LCD line.
pub type Line = String<LCD_WIDTH>;

/// Latest values for one sensor source. `None` means not reported yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub temp_c: Option<i16>,
    pub fan_rpm: Option<u16>,
}

/// Latest readings from the host, per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorReadings {
    pub system: Reading,
    pub cpu: Reading,
    pub gpu: Reading,
}

/// Both LCD lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub lines: [Line; LCD_HEIGHT],
}

impl Frame {
    pub fn line(&self, row: usize) -> &str {
        self.lines.get(row).map(|l| l.as_str()).unwrap_or("")
    }
}

/// `fmt::Write` adapter that drops everything past the line width instead of
/// failing the whole write.
struct Truncating<'a>(&'a mut Line);

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

struct Value<T>(Option<T>);

impl<T: core::fmt::Display> core::fmt::Display for Value<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.0 {
            Some(v) => write!(f, "{}", v),
            None => f.write_str("--"),
        }
    }
}

fn hundreds(rpm: Option<u16>) -> Value<u16> {
    Value(rpm.map(|r| r / 100))
}

/// Builds the LCD content for `view`.
pub fn render(view: View, readings: &SensorReadings) -> Frame {
    let mut frame = Frame::default();
    let [title, body] = &mut frame.lines;
    let mut title = Truncating(title);
    let mut body = Truncating(body);

    // Writes into `Truncating` never fail.
    let _ = match view {
        View::Config { highlight } => {
            let _ = title.write_str("CONFIG");
            write!(body, "> {}", highlight.label())
        }
        View::Sensor { item, cycling } => {
            let _ = title.write_str(item.label());
            if item == SensorItem::AllFan {
                let _ = title.write_str(" x100");
            }
            if cycling {
                let _ = title.write_str(" (AUTO)");
            }
            write_body(&mut body, item, readings)
        }
    };

    frame
}

fn write_body(
    body: &mut Truncating<'_>,
    item: SensorItem,
    r: &SensorReadings,
) -> core::fmt::Result {
    let single = |body: &mut Truncating<'_>, reading: &Reading| {
        write!(
            body,
            "T:{}C F:{}",
            Value(reading.temp_c),
            Value(reading.fan_rpm)
        )
    };

    match item {
        SensorItem::System => single(body, &r.system),
        SensorItem::Cpu => single(body, &r.cpu),
        SensorItem::Gpu => single(body, &r.gpu),
        SensorItem::AllTemp => write!(
            body,
            "S:{} C:{} G:{}",
            Value(r.system.temp_c),
            Value(r.cpu.temp_c),
            Value(r.gpu.temp_c)
        ),
        SensorItem::AllFan => write!(
            body,
            "S:{} C:{} G:{}",
            hundreds(r.system.fan_rpm),
            hundreds(r.cpu.fan_rpm),
            hundreds(r.gpu.fan_rpm)
        ),
    }
}
