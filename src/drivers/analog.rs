//! MQ-3 analog source.
//!
//! Reads the gas sensor's divider voltage through an ESP32 ADC1 channel.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the channel via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

use core::sync::atomic::{AtomicU16, Ordering};

static SIM_MQ3_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_mq3_adc(raw: u16) {
    SIM_MQ3_ADC.store(raw, Ordering::Relaxed);
}

/// Raw-sample source for the MQ-3 channel.
pub struct Mq3AnalogSource {
    _adc_gpio: i32,
}

impl Mq3AnalogSource {
    pub fn new(adc_gpio: i32) -> Self {
        Self { _adc_gpio: adc_gpio }
    }

    /// One raw ADC sample (0 – 4095).  A failed read reports as 0.
    pub fn read(&mut self) -> u16 {
        self.read_adc()
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        crate::drivers::hw_init::adc1_read(crate::drivers::hw_init::ADC1_CH_MQ3)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_MQ3_ADC.load(Ordering::Relaxed)
    }
}
