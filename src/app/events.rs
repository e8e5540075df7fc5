//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — mirror to the console, append to the
//! text log, or both.

use crate::error::SensorError;
use crate::fsm::StateId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A calibration run began (warm-up or short-press recalibration).
    CalibrationStarted,

    /// A calibration run finished with the new baseline resistance.
    CalibrationCompleted { r0: f32 },

    /// One smoothed reading with its derived units.
    Reading(ReadingSample),

    /// A sample had to be discarded.
    SensorFault(SensorError),
}

/// A point-in-time reading snapshot suitable for logging or display.
#[derive(Debug, Clone, Copy)]
pub struct ReadingSample {
    /// Raw ADC value this tick (0 – adc_max).
    pub raw: u16,
    /// Smoothed alcohol concentration (mg/L).
    pub concentration_mg_l: f32,
    /// Concentration in parts per million.
    pub ppm: f32,
    /// Blood alcohol percentage.
    pub bac_percent: f32,
    /// Concentration in grams per millilitre.
    pub grams_per_ml: f32,
}
