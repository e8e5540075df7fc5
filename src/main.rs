//! BreathSense Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single cooperative poll loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter       OledDisplay      FileLogSink          │
//! │  (SensorPort+Display)  (DisplayPort)    (EventSink)          │
//! │  SystemClock           ButtonDriver                          │
//! │  (ClockPort)           (gesture input)                       │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────        │
//! │                                                              │
//! │  ┌───────────────────────────────────────────────────┐       │
//! │  │            AppService (pure logic)                │       │
//! │  │  FSM · Calibrator · ReadingWindow                 │       │
//! │  └───────────────────────────────────────────────────┘       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod error;
mod pins;

pub mod app;
mod adapters;
mod drivers;
pub mod fsm;
mod sensors;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::info;

use adapters::display::OledDisplay;
use adapters::hardware::HardwareAdapter;
use adapters::log_sink::FileLogSink;
use adapters::time::SystemClock;
use app::ports::ClockPort;
use app::service::AppService;
use config::SystemConfig;
use drivers::analog::Mq3AnalogSource;
use drivers::button::ButtonDriver;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  BreathSense v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let config = SystemConfig::default();
    if let Err(e) = config.validate() {
        anyhow::bail!("invalid configuration: {e}");
    }

    // ── 3. Construct adapters ─────────────────────────────────
    // The OLED owns the I²C bus (see pins::OLED_SDA_GPIO / OLED_SCL_GPIO).
    let peripherals = esp_idf_hal::peripherals::Peripherals::take()?;
    let i2c_config = esp_idf_hal::i2c::I2cConfig::new()
        .baudrate(esp_idf_hal::units::Hertz(pins::OLED_I2C_FREQ_HZ));
    let i2c = esp_idf_hal::i2c::I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &i2c_config,
    )?;
    let display = OledDisplay::new(i2c);

    let mut hw = HardwareAdapter::new(Mq3AnalogSource::new(pins::MQ3_ADC_GPIO), display);
    let mut clock = SystemClock::new();
    let mut sink = FileLogSink::new(&config);
    let mut button = ButtonDriver::new(pins::BUTTON_GPIO);

    // ── 4. Construct app service ──────────────────────────────
    let mut app = AppService::new(config.clone());
    app.start(&mut sink);

    info!("System ready. Entering poll loop.");

    // ── 5. Poll loop ──────────────────────────────────────────
    //
    // Strictly sequential: classify the button, tick the service (which
    // may block through warm-up / calibration / debounce), then sleep one
    // poll period.  All state lives on this loop — no tasks, no locks.
    loop {
        let now_ms = clock.now_ms();
        let signal = button.tick(now_ms);
        app.tick(now_ms, signal, &mut hw, &mut clock, &mut sink);
        clock.sleep_ms(config.poll_interval_ms);
    }
}
