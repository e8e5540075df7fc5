//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the MQ-3 analog source and the display driver, exposing them
//! through [`SensorPort`] and [`DisplayPort`].  This is the only module in
//! the system that hands actual hardware to the domain.  On non-espidf
//! targets the underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{DisplayPort, SensorPort};
use crate::drivers::analog::Mq3AnalogSource;

/// Concrete adapter that combines the board's peripherals behind port traits.
pub struct HardwareAdapter<D: DisplayPort> {
    analog: Mq3AnalogSource,
    display: D,
}

impl<D: DisplayPort> HardwareAdapter<D> {
    pub fn new(analog: Mq3AnalogSource, display: D) -> Self {
        Self { analog, display }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<D: DisplayPort> SensorPort for HardwareAdapter<D> {
    fn read_raw(&mut self) -> u16 {
        self.analog.read()
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl<D: DisplayPort> DisplayPort for HardwareAdapter<D> {
    fn show(&mut self, text: &str, x: i32, y: i32, clear: bool) {
        self.display.show(text, x, y, clear);
    }
}
