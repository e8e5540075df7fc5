//! Baseline-resistance (R0) calibration.
//!
//! The MQ-3's response curve is relative to R0, its resistance in clean
//! alcohol-free air.  [`Calibrator`] drives the sensor through a fixed
//! warm-up delay and a burst of averaged samples to estimate R0; the result
//! lives in [`CalibrationState`] for the lifetime of the power cycle (it is
//! never persisted).

use log::{info, warn};

use crate::app::ports::{ClockPort, DisplayPort, SensorPort};
use crate::config::SystemConfig;
use crate::pins;
use crate::sensors::model::{resistance_from_sample, VoltageDivider};

/// Sentinel R0 meaning "never calibrated".
pub const UNCALIBRATED_R0: f32 = 1.0;

/// How long the "Calibration done" message stays on screen (milliseconds).
const DONE_MESSAGE_HOLD_MS: u32 = 2000;

/// The calibration baseline.  `r0 > 0` after any completed calibration;
/// exactly [`UNCALIBRATED_R0`] until the first one runs.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationState {
    r0: f32,
}

impl CalibrationState {
    pub fn new() -> Self {
        Self { r0: UNCALIBRATED_R0 }
    }

    /// Current baseline resistance (ohms).
    pub fn r0(&self) -> f32 {
        self.r0
    }

    /// True once a calibration run has replaced the startup sentinel.
    pub fn is_calibrated(&self) -> bool {
        self.r0 != UNCALIBRATED_R0
    }
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs warm-up and calibration sequences against the hardware ports.
pub struct Calibrator {
    warm_up_secs: u16,
    num_readings: u16,
    air_r0_ratio: f32,
    sample_interval_ms: u32,
    divider: VoltageDivider,
}

impl Calibrator {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            warm_up_secs: config.warm_up_secs,
            num_readings: config.num_calibration_readings,
            air_r0_ratio: config.air_r0_ratio,
            sample_interval_ms: config.calibration_sample_interval_ms,
            divider: VoltageDivider::from_config(config),
        }
    }

    /// Warm the sensor up, then calibrate.
    ///
    /// Blocks the control loop for the full warm-up duration, painting one
    /// progress dot per second.  Coarse fixed delay — the MQ-3 heater needs
    /// the time regardless of what the readings look like.
    pub fn warm_up(
        &self,
        state: &mut CalibrationState,
        hw: &mut (impl SensorPort + DisplayPort),
        clock: &mut impl ClockPort,
    ) -> f32 {
        info!("Warming up the sensor...");
        hw.show("Warming up...", 0, 0, true);

        let mut dots: heapless::String<64> = heapless::String::new();
        for _ in 0..self.warm_up_secs {
            hw.show(dots.as_str(), 0, pins::ROW_WARMUP_DOTS, false);
            clock.sleep_ms(1000);
            let _ = dots.push('.');
        }

        self.calibrate(state, hw, clock)
    }

    /// Estimate R0 from a burst of clean-air samples.
    ///
    /// Each sample's Rs is divided by the clean-air ratio and the mean of
    /// the results becomes the new baseline.  Samples are trusted as-is —
    /// a transient bad sample skews the average.  The one exception is a
    /// zero-voltage sample, which is excluded; if every sample is excluded
    /// the previous baseline is kept.
    pub fn calibrate(
        &self,
        state: &mut CalibrationState,
        hw: &mut (impl SensorPort + DisplayPort),
        clock: &mut impl ClockPort,
    ) -> f32 {
        info!("Calibrating sensor...");
        hw.show("Calibrating...", 0, 0, true);

        let mut sum = 0.0f32;
        let mut used: u16 = 0;
        for _ in 0..self.num_readings {
            let raw = hw.read_raw();
            match resistance_from_sample(raw, &self.divider) {
                Ok(rs) => {
                    sum += rs / self.air_r0_ratio;
                    used += 1;
                }
                Err(e) => warn!("calibration sample discarded: {}", e),
            }
            clock.sleep_ms(self.sample_interval_ms);
        }

        if used > 0 {
            state.r0 = sum / used as f32;
            info!("Calibration complete. New R0: {}", state.r0);
        } else {
            warn!(
                "calibration produced no usable samples, keeping R0 = {}",
                state.r0
            );
        }

        hw.show("Calibration done", 0, 0, true);
        clock.sleep_ms(DONE_MESSAGE_HOLD_MS);
        state.r0
    }
}
