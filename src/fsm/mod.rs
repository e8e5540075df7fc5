//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  StateTable                                                 │
//! │  ┌─────────────┬───────────┬──────────┬───────────────────┐ │
//! │  │ StateId     │ on_enter  │ on_exit  │ on_update         │ │
//! │  ├─────────────┼───────────┼──────────┼───────────────────┤ │
//! │  │ Off         │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ On          │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ Calibrating │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  └─────────────┴───────────┴──────────┴───────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.  If it
//! returns `Some(next_id)`, the engine runs `on_exit` for the current
//! state, then `on_enter` for the next, and updates the current pointer.
//! All functions receive `&mut FsmContext`, which holds the button signal,
//! sampling cadence, configuration, and the outbound side-effect commands.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all device states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Off = 0,
    On = 1,
    Calibrating = 2,
}

impl StateId {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 3;

    /// Convert a `u8` index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `Off` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Off,
            1 => Self::On,
            2 => Self::Calibrating,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Off
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]) and ticks against a
/// mutable [`FsmContext`] threaded through every handler call.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Monotonically increasing tick counter (wraps at u64::MAX).
    tick_count: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        self.tick_count += 1;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// Total ticks executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        // Exit current state
        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        // Enter new state
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::context::FsmContext;
    use super::*;
    use crate::config::SystemConfig;
    use crate::drivers::button::ButtonSignal;

    fn make_ctx() -> FsmContext {
        FsmContext::new(SystemConfig::default())
    }

    fn make_fsm() -> Fsm {
        Fsm::new(states::build_state_table(), StateId::Off)
    }

    fn long_hold(ctx: &mut FsmContext) {
        ctx.button = ButtonSignal::Held(3.5);
    }

    #[test]
    fn starts_off() {
        let fsm = make_fsm();
        assert_eq!(fsm.current_state(), StateId::Off);
    }

    #[test]
    fn tick_increments_counter() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        fsm.tick(&mut ctx);
        fsm.tick(&mut ctx);
        assert_eq!(fsm.tick_count(), 2);
    }

    #[test]
    fn off_ignores_idle_and_short_press() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        ctx.button = ButtonSignal::Idle;
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), StateId::Off);

        ctx.button = ButtonSignal::Released(0.5);
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), StateId::Off);
        assert!(!ctx.commands.run_calibration);
    }

    #[test]
    fn long_press_toggles_off_to_on_with_warm_up() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        long_hold(&mut ctx);
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), StateId::On);
        assert!(ctx.commands.begin_warm_up);
        assert_eq!(ctx.commands.announce, Some(StateId::On));
        assert!(ctx.commands.debounce_ms > 0);
    }

    #[test]
    fn long_press_toggles_on_to_off_without_warm_up() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        long_hold(&mut ctx);
        fsm.tick(&mut ctx);
        ctx.button = ButtonSignal::Released(4.0);
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), StateId::On, "latched release must not toggle");

        ctx.clear_commands();
        long_hold(&mut ctx);
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), StateId::Off);
        assert!(!ctx.commands.begin_warm_up);
        assert_eq!(ctx.commands.announce, Some(StateId::Off));
    }

    #[test]
    fn three_long_presses_cycle_off_on_off_on() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        let mut seen = vec![fsm.current_state()];

        for _ in 0..3 {
            ctx.clear_commands();
            ctx.button = ButtonSignal::Held(3.2);
            fsm.tick(&mut ctx);
            seen.push(fsm.current_state());
            ctx.button = ButtonSignal::Released(3.4);
            fsm.tick(&mut ctx);
            ctx.button = ButtonSignal::Idle;
            fsm.tick(&mut ctx);
        }

        assert_eq!(
            seen,
            vec![StateId::Off, StateId::On, StateId::Off, StateId::On]
        );
    }

    #[test]
    fn short_press_while_on_requests_calibration() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        long_hold(&mut ctx);
        fsm.tick(&mut ctx);
        ctx.button = ButtonSignal::Released(3.4);
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), StateId::On);

        // A short tap: held below threshold, then released.
        ctx.clear_commands();
        ctx.button = ButtonSignal::Held(0.4);
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), StateId::On, "no trigger while still held");
        assert!(!ctx.commands.run_calibration);

        ctx.button = ButtonSignal::Released(0.5);
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), StateId::Calibrating);
        assert!(ctx.commands.run_calibration);

        // Transient: the next tick returns to On.
        ctx.clear_commands();
        ctx.button = ButtonSignal::Idle;
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), StateId::On);
    }

    #[test]
    fn reading_requested_only_when_interval_elapsed() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        long_hold(&mut ctx);
        fsm.tick(&mut ctx);
        ctx.button = ButtonSignal::Released(3.4);
        fsm.tick(&mut ctx);

        ctx.clear_commands();
        ctx.button = ButtonSignal::Idle;
        ctx.ms_since_reading = 100;
        fsm.tick(&mut ctx);
        assert!(!ctx.commands.take_reading);

        ctx.ms_since_reading = 1000;
        fsm.tick(&mut ctx);
        assert!(ctx.commands.take_reading);
    }

    #[test]
    fn off_never_samples() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        ctx.button = ButtonSignal::Idle;
        ctx.ms_since_reading = 10_000;
        fsm.tick(&mut ctx);
        assert!(!ctx.commands.take_reading);
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod proptests {
    use super::context::FsmContext;
    use super::*;
    use crate::config::SystemConfig;
    use crate::drivers::button::ButtonSignal;
    use proptest::prelude::*;

    fn arb_signal() -> impl Strategy<Value = ButtonSignal> {
        prop_oneof![
            Just(ButtonSignal::Idle),
            (0.0f32..10.0).prop_map(ButtonSignal::Held),
            (0.0f32..10.0).prop_map(ButtonSignal::Released),
        ]
    }

    proptest! {
        #[test]
        fn no_invalid_state_reachable(
            signals in proptest::collection::vec((arb_signal(), 0u64..5000), 1..200)
        ) {
            let mut fsm = Fsm::new(states::build_state_table(), StateId::Off);
            let mut ctx = FsmContext::new(SystemConfig::default());
            fsm.start(&mut ctx);

            let valid = [StateId::Off, StateId::On, StateId::Calibrating];

            for (signal, elapsed) in signals {
                ctx.clear_commands();
                ctx.button = signal;
                ctx.ms_since_reading = elapsed;
                fsm.tick(&mut ctx);

                prop_assert!(valid.contains(&fsm.current_state()));
            }
        }

        #[test]
        fn calibrating_never_survives_a_second_tick(
            signals in proptest::collection::vec(arb_signal(), 1..200)
        ) {
            let mut fsm = Fsm::new(states::build_state_table(), StateId::Off);
            let mut ctx = FsmContext::new(SystemConfig::default());
            fsm.start(&mut ctx);

            for signal in signals {
                ctx.clear_commands();
                ctx.button = signal;
                let before = fsm.current_state();
                fsm.tick(&mut ctx);
                prop_assert!(
                    !(before == StateId::Calibrating
                        && fsm.current_state() == StateId::Calibrating),
                    "Calibrating must resolve within one tick"
                );
            }
        }
    }
}
