//! System configuration parameters
//!
//! All tunable parameters for the BreathSense pipeline.  Defaults carry the
//! calibrated reference constants for the MQ-3 sensor board.

use serde::{Deserialize, Serialize};

/// Minimum log level written to the text log (and mirrored to the console).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogThreshold {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogThreshold {
    /// True if a message at `level` passes this threshold.
    pub fn allows(self, level: log::Level) -> bool {
        let min = match self {
            Self::Debug => log::Level::Debug,
            Self::Info => log::Level::Info,
            Self::Warn => log::Level::Warn,
            Self::Error => log::Level::Error,
        };
        level <= min
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Calibration ---
    /// Sensor warm-up duration before the first calibration (seconds)
    pub warm_up_secs: u16,
    /// Number of samples averaged per calibration run
    pub num_calibration_readings: u16,
    /// Empirical ratio of sensor resistance in clean air to true R0
    pub air_r0_ratio: f32,
    /// Spacing between calibration samples (milliseconds)
    pub calibration_sample_interval_ms: u32,

    // --- Button gestures ---
    /// Hold duration separating a long press from a short press (seconds)
    pub long_press_secs: f32,
    /// Hold-off sleep after a power toggle (milliseconds)
    pub toggle_debounce_ms: u32,

    // --- Timing ---
    /// Spacing between display samples while ON (milliseconds)
    pub reading_interval_ms: u32,
    /// Control loop poll period (milliseconds)
    pub poll_interval_ms: u32,

    // --- Sensor electrical model ---
    /// ADC reference / divider supply voltage (volts)
    pub supply_voltage: f32,
    /// Full-scale raw ADC value
    pub adc_max: u16,
    /// Voltage-divider load resistor RL (ohms)
    pub load_resistance_ohms: f32,

    // --- Logging ---
    /// Minimum level persisted to the text log
    pub log_threshold: LogThreshold,
    /// Append-only log file path
    pub log_file: heapless::String<32>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut log_file = heapless::String::new();
        let _ = log_file.push_str("sensor_log.txt");

        Self {
            // Calibration
            warm_up_secs: 20,
            num_calibration_readings: 10,
            air_r0_ratio: 60.0,
            calibration_sample_interval_ms: 100,

            // Button gestures
            long_press_secs: 3.0,
            toggle_debounce_ms: 1000,

            // Timing
            reading_interval_ms: 1000, // 1 Hz while ON
            poll_interval_ms: 100,     // 10 Hz loop

            // Sensor electrical model
            supply_voltage: 3.3,
            adc_max: 4095,
            load_resistance_ohms: 1000.0,

            // Logging
            log_threshold: LogThreshold::Info,
            log_file,
        }
    }
}

impl SystemConfig {
    /// Range-check the configuration before the control loop starts.
    /// Invalid values are rejected, not clamped.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::Error;

        if self.adc_max == 0 {
            return Err(Error::Config("adc_max must be non-zero"));
        }
        if self.supply_voltage <= 0.0 {
            return Err(Error::Config("supply_voltage must be positive"));
        }
        if self.load_resistance_ohms <= 0.0 {
            return Err(Error::Config("load_resistance_ohms must be positive"));
        }
        if self.air_r0_ratio <= 0.0 {
            return Err(Error::Config("air_r0_ratio must be positive"));
        }
        if self.num_calibration_readings == 0 {
            return Err(Error::Config("num_calibration_readings must be non-zero"));
        }
        if self.poll_interval_ms == 0 || self.reading_interval_ms < self.poll_interval_ms {
            return Err(Error::Config("reading interval must cover at least one poll"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.warm_up_secs > 0);
        assert!(c.num_calibration_readings > 0);
        assert!(c.air_r0_ratio > 0.0);
        assert!(c.supply_voltage > 0.0);
        assert!(c.adc_max > 0);
        assert!(c.load_resistance_ohms > 0.0);
        assert!(c.poll_interval_ms > 0);
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert!((c.air_r0_ratio - c2.air_r0_ratio).abs() < 0.001);
        assert_eq!(c.num_calibration_readings, c2.num_calibration_readings);
        assert_eq!(c.log_file, c2.log_file);
        assert_eq!(c.log_threshold, c2.log_threshold);
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = SystemConfig::default();
        assert!(
            c.poll_interval_ms < c.reading_interval_ms,
            "loop must poll faster than it samples"
        );
        assert!(
            c.long_press_secs * 1000.0 > c.poll_interval_ms as f32,
            "a long press must span several polls"
        );
    }

    #[test]
    fn default_config_validates() {
        assert!(SystemConfig::default().validate().is_ok());
    }

    #[test]
    fn degenerate_configs_are_rejected() {
        let mut c = SystemConfig::default();
        c.adc_max = 0;
        assert!(c.validate().is_err());

        let mut c = SystemConfig::default();
        c.air_r0_ratio = 0.0;
        assert!(c.validate().is_err());

        let mut c = SystemConfig::default();
        c.reading_interval_ms = 50; // below the poll period
        assert!(c.validate().is_err());
    }

    #[test]
    fn log_threshold_ordering() {
        assert!(LogThreshold::Info.allows(log::Level::Warn));
        assert!(LogThreshold::Info.allows(log::Level::Info));
        assert!(!LogThreshold::Info.allows(log::Level::Debug));
        assert!(LogThreshold::Error.allows(log::Level::Error));
        assert!(!LogThreshold::Error.allows(log::Level::Warn));
    }
}
