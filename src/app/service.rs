//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the FSM, the calibration baseline, and the smoothing
//! window.  It exposes a clean, hardware-agnostic API: the main loop feeds
//! it the current time and button signal once per poll, and all I/O flows
//! through port traits injected at the call site, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                  │        AppService        │
//!  DisplayPort ◀───│  FSM · Calibrator · Avg  │
//!    ClockPort ──▶ └──────────────────────────┘
//! ```

use core::fmt::Write as _;

use log::warn;

use crate::app::events::{AppEvent, ReadingSample};
use crate::app::ports::{ClockPort, DisplayPort, EventSink, SensorPort};
use crate::config::SystemConfig;
use crate::drivers::button::ButtonSignal;
use crate::fsm::context::{ControlCommands, FsmContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::pins;
use crate::sensors::calibration::{CalibrationState, Calibrator};
use crate::sensors::model::{
    concentration_from_resistance, resistance_from_sample, to_bac_percent, to_grams_per_ml,
    to_ppm, VoltageDivider,
};
use crate::sensors::smoothing::ReadingWindow;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    calibrator: Calibrator,
    calibration: CalibrationState,
    window: ReadingWindow,
    divider: VoltageDivider,
    /// Timestamp of the last completed sample tick.
    last_reading_ms: u64,
    warned_uncalibrated: bool,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let calibrator = Calibrator::new(&config);
        let divider = VoltageDivider::from_config(&config);
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Off);

        Self {
            fsm,
            ctx,
            calibrator,
            calibration: CalibrationState::new(),
            window: ReadingWindow::new(),
            divider,
            last_reading_ms: 0,
            warned_uncalibrated: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in its initial state (Off).
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
    }

    // ── Per-poll orchestration ────────────────────────────────

    /// Run one full poll cycle: classify the button signal through the FSM,
    /// then execute whatever side effects the handlers requested.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`DisplayPort`] — this avoids a double mutable borrow while keeping
    /// the port boundary explicit.  Warm-up, calibration, and the
    /// post-toggle debounce all block inside this call by design.
    pub fn tick(
        &mut self,
        now_ms: u64,
        button: ButtonSignal,
        hw: &mut (impl SensorPort + DisplayPort),
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        let prev_state = self.fsm.current_state();

        self.ctx.button = button;
        self.ctx.ms_since_reading = now_ms.saturating_sub(self.last_reading_ms);
        self.ctx.clear_commands();
        self.fsm.tick(&mut self.ctx);

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }

        let commands = self.ctx.commands;
        self.execute(&commands, now_ms, hw, clock, sink);

        // CALIBRATING is transient: resolve it back to ON within the same
        // poll handling so it never persists across polls.
        if self.fsm.current_state() == StateId::Calibrating {
            self.ctx.button = ButtonSignal::Idle;
            self.ctx.clear_commands();
            self.fsm.tick(&mut self.ctx);
            sink.emit(&AppEvent::StateChanged {
                from: StateId::Calibrating,
                to: self.fsm.current_state(),
            });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Current calibration baseline (ohms).
    pub fn r0(&self) -> f32 {
        self.calibration.r0()
    }

    /// True once a calibration run has completed.
    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_calibrated()
    }

    /// Total FSM ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.fsm.tick_count()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Apply the side effects planned by the state handlers, in the order
    /// the device presents them: calibration sequence, power announcement,
    /// debounce hold-off, then sampling.
    fn execute(
        &mut self,
        commands: &ControlCommands,
        now_ms: u64,
        hw: &mut (impl SensorPort + DisplayPort),
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        if commands.begin_warm_up {
            sink.emit(&AppEvent::CalibrationStarted);
            let r0 = self
                .calibrator
                .warm_up(&mut self.calibration, hw, clock);
            sink.emit(&AppEvent::CalibrationCompleted { r0 });
        }

        if commands.run_calibration {
            sink.emit(&AppEvent::CalibrationStarted);
            let r0 = self
                .calibrator
                .calibrate(&mut self.calibration, hw, clock);
            sink.emit(&AppEvent::CalibrationCompleted { r0 });
        }

        if let Some(state) = commands.announce {
            let label = if state == StateId::On { "ON" } else { "OFF" };
            hw.show(label, 0, 0, true);
        }

        if commands.debounce_ms > 0 {
            clock.sleep_ms(commands.debounce_ms);
        }

        if commands.take_reading {
            self.take_reading(now_ms, hw, sink);
        }
    }

    /// Sample → model → window → units → display, one reading.
    fn take_reading(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + DisplayPort),
        sink: &mut impl EventSink,
    ) {
        // The sample timer advances even when the sample is discarded, so a
        // stuck sensor degrades to one warning per second instead of one
        // per poll.
        self.last_reading_ms = now_ms;

        let raw = hw.read_raw();
        let rs = match resistance_from_sample(raw, &self.divider) {
            Ok(rs) => rs,
            Err(e) => {
                warn!("reading discarded: {}", e);
                sink.emit(&AppEvent::SensorFault(e));
                return;
            }
        };

        if !self.calibration.is_calibrated() && !self.warned_uncalibrated {
            warn!("sampling before any calibration; readings use the startup baseline");
            self.warned_uncalibrated = true;
        }

        let concentration = concentration_from_resistance(rs, self.calibration.r0());
        let smoothed = self.window.push_and_average(concentration);

        let sample = ReadingSample {
            raw,
            concentration_mg_l: smoothed,
            ppm: to_ppm(smoothed),
            bac_percent: to_bac_percent(smoothed),
            grams_per_ml: to_grams_per_ml(smoothed),
        };

        self.render(&sample, hw);
        sink.emit(&AppEvent::Reading(sample));
    }

    /// Paint the four reading rows.
    fn render(&self, s: &ReadingSample, hw: &mut impl DisplayPort) {
        let mut line: heapless::String<32> = heapless::String::new();

        let _ = write!(line, "Raw: {:.2} mg/L", s.concentration_mg_l);
        hw.show(&line, 0, pins::ROW_READING, true);

        line.clear();
        let _ = write!(line, "PPM: {:.0}", s.ppm);
        hw.show(&line, 0, pins::ROW_PPM, false);

        line.clear();
        let _ = write!(line, "BAC: {:.2} %", s.bac_percent);
        hw.show(&line, 0, pins::ROW_BAC, false);

        line.clear();
        let _ = write!(line, "g/mL: {:.4}", s.grams_per_ml);
        hw.show(&line, 0, pins::ROW_GRAMS, false);
    }
}
