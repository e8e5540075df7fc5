//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the button signal for this poll, the sampling cadence, the
//! configuration, and the side-effect commands the handlers request.  The
//! handlers themselves stay pure functions of this context — no clocks, no
//! ports, no sleeping — which is what makes the gesture logic testable
//! without real time.

use crate::config::SystemConfig;
use crate::drivers::button::ButtonSignal;
use crate::fsm::StateId;

// ---------------------------------------------------------------------------
// Control commands (written by state handlers; executed by the service)
// ---------------------------------------------------------------------------

/// Side effects requested by state handlers for this tick.
/// The [`AppService`](crate::app::service::AppService) executes them against
/// the hardware ports after the FSM tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlCommands {
    /// Run the full warm-up + calibration sequence (power-on).
    pub begin_warm_up: bool,
    /// Run a calibration burst only (short-press recalibration).
    pub run_calibration: bool,
    /// Take one sample and render it.
    pub take_reading: bool,
    /// Announce the power state on the display ("ON" / "OFF").
    pub announce: Option<StateId>,
    /// Post-toggle hold-off sleep.
    pub debounce_ms: u32,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    /// Button signal observed this poll.
    pub button: ButtonSignal,
    /// Set when a long press already fired its toggle during the current
    /// physical press; swallows the eventual release so one hold toggles
    /// exactly once.
    pub long_press_latched: bool,
    /// Milliseconds since the last completed reading.
    pub ms_since_reading: u64,
    /// Commands requested by the handlers this tick.
    pub commands: ControlCommands,
    /// System configuration (tunable parameters).
    pub config: SystemConfig,
}

impl FsmContext {
    /// Create a new context with the given configuration.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            button: ButtonSignal::Idle,
            long_press_latched: false,
            ms_since_reading: 0,
            commands: ControlCommands::default(),
            config,
        }
    }

    /// Reset the per-tick command plan.  Call before each FSM tick.
    pub fn clear_commands(&mut self) {
        self.commands = ControlCommands::default();
    }

    /// True if the current hold has crossed the long-press threshold.
    pub fn is_long_hold(&self, secs: f32) -> bool {
        secs >= self.config.long_press_secs
    }
}
