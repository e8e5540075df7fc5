//! SSD1306 OLED display adapter.
//!
//! Implements [`DisplayPort`] on a 128×64 SSD1306 panel over I²C, drawing
//! text with `embedded-graphics` into the buffered framebuffer mode.
//!
//! Panel init failure is tolerated: the adapter keeps a `None` inner
//! display and every `show` becomes a logged no-op, so a broken or absent
//! screen never takes the measurement loop down.  Frame flush failures are
//! likewise logged and skipped.
//!
//! On non-espidf targets the adapter is a stub that mirrors each line to
//! the debug log.

#[cfg(not(target_os = "espidf"))]
use crate::app::ports::DisplayPort;

// ── Device implementation ─────────────────────────────────────

#[cfg(target_os = "espidf")]
mod panel {
    use embedded_graphics::mono_font::ascii::FONT_6X10;
    use embedded_graphics::mono_font::MonoTextStyle;
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::prelude::*;
    use embedded_graphics::text::{Baseline, Text};
    use embedded_hal::i2c::I2c;
    use log::error;
    use ssd1306::mode::BufferedGraphicsMode;
    use ssd1306::prelude::*;
    use ssd1306::{I2CDisplayInterface, Ssd1306};

    use crate::app::ports::DisplayPort;
    use crate::error::DisplayError;

    type Panel<I2C> =
        Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

    pub struct OledDisplay<I2C: I2c> {
        inner: Option<Panel<I2C>>,
    }

    impl<I2C: I2c> OledDisplay<I2C> {
        /// Bring the panel up.  On init failure the device keeps running
        /// headless with a logged error.
        pub fn new(i2c: I2C) -> Self {
            let interface = I2CDisplayInterface::new(i2c);
            let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
                .into_buffered_graphics_mode();

            match display.init() {
                Ok(()) => Self {
                    inner: Some(display),
                },
                Err(e) => {
                    error!("OLED: {} ({:?})", DisplayError::InitFailed, e);
                    Self { inner: None }
                }
            }
        }
    }

    impl<I2C: I2c> DisplayPort for OledDisplay<I2C> {
        fn show(&mut self, text: &str, x: i32, y: i32, clear: bool) {
            let Some(display) = self.inner.as_mut() else {
                return;
            };

            if clear {
                let _ = display.clear(BinaryColor::Off);
            }

            let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
            let _ = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
                .draw(display);

            if display.flush().is_err() {
                error!("OLED: {}, frame skipped", DisplayError::I2cWriteFailed);
            }
        }
    }
}

#[cfg(target_os = "espidf")]
pub use panel::OledDisplay;

// ── Host stub ─────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct OledDisplay;

#[cfg(not(target_os = "espidf"))]
impl OledDisplay {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for OledDisplay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl DisplayPort for OledDisplay {
    fn show(&mut self, text: &str, x: i32, y: i32, clear: bool) {
        log::debug!("display(sim): ({x},{y}) clear={clear} \"{text}\"");
    }
}
