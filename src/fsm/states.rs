//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap.  This is the classic embedded C FSM pattern
//! expressed in safe Rust.
//!
//! ```text
//!  OFF ──[hold >= 3s: warm-up + calibrate]──▶ ON
//!   ▲                                          │
//!   └──────────[hold >= 3s]────────────────────┤
//!                                              │
//!            [short tap released]              ▼
//!  ON ◀──[baseline updated]────────────── CALIBRATING
//! ```
//!
//! CALIBRATING is transient: its update handler unconditionally returns to
//! ON, so it never survives past the poll that entered it.  Long presses
//! fire on the poll where the hold crosses the threshold; short presses
//! fire on the release edge only.

use log::info;

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use crate::drivers::button::ButtonSignal;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Off
        StateDescriptor {
            id: StateId::Off,
            name: "Off",
            on_enter: Some(off_enter),
            on_exit: None,
            on_update: off_update,
        },
        // Index 1 — On
        StateDescriptor {
            id: StateId::On,
            name: "On",
            on_enter: Some(on_enter),
            on_exit: None,
            on_update: on_update,
        },
        // Index 2 — Calibrating
        StateDescriptor {
            id: StateId::Calibrating,
            name: "Calibrating",
            on_enter: Some(calibrating_enter),
            on_exit: None,
            on_update: calibrating_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Gesture helpers
// ═══════════════════════════════════════════════════════════════════════════

/// A long press fires once per physical press, on the poll where the hold
/// crosses the threshold.  A release that crossed the threshold without
/// ever being observed held (the hold elapsed inside a blocking sequence)
/// also counts, unless the latch already consumed the press.
fn long_press_fired(ctx: &mut FsmContext) -> bool {
    match ctx.button {
        ButtonSignal::Held(secs) => {
            if ctx.is_long_hold(secs) && !ctx.long_press_latched {
                ctx.long_press_latched = true;
                return true;
            }
            false
        }
        ButtonSignal::Released(secs) => {
            let latched = core::mem::take(&mut ctx.long_press_latched);
            !latched && ctx.is_long_hold(secs)
        }
        ButtonSignal::Idle => {
            ctx.long_press_latched = false;
            false
        }
    }
}

/// A short press fires on the release edge only: a completed hold below
/// the long-press threshold.  Call after [`long_press_fired`] so the latch
/// bookkeeping has already run for this poll.
fn short_press_fired(ctx: &FsmContext) -> bool {
    match ctx.button {
        ButtonSignal::Released(secs) => secs > 0.0 && !ctx.is_long_hold(secs),
        _ => false,
    }
}

fn request_toggle(ctx: &mut FsmContext, to: StateId) {
    ctx.commands.announce = Some(to);
    ctx.commands.debounce_ms = ctx.config.toggle_debounce_ms;
}

// ═══════════════════════════════════════════════════════════════════════════
//  OFF state
// ═══════════════════════════════════════════════════════════════════════════

fn off_enter(_ctx: &mut FsmContext) {
    info!("OFF: sampling halted, waiting for long press");
}

fn off_update(ctx: &mut FsmContext) -> Option<StateId> {
    if long_press_fired(ctx) {
        // Power on: the sensor heater needs its warm-up before the first
        // baseline is trustworthy.
        ctx.commands.begin_warm_up = true;
        request_toggle(ctx, StateId::On);
        return Some(StateId::On);
    }

    // Short presses are ignored while off.
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ON state — periodic sampling, gestures armed
// ═══════════════════════════════════════════════════════════════════════════

fn on_enter(_ctx: &mut FsmContext) {
    info!("ON: sampling armed");
}

fn on_update(ctx: &mut FsmContext) -> Option<StateId> {
    if long_press_fired(ctx) {
        request_toggle(ctx, StateId::Off);
        return Some(StateId::Off);
    }

    if short_press_fired(ctx) {
        ctx.commands.run_calibration = true;
        return Some(StateId::Calibrating);
    }

    if ctx.ms_since_reading >= ctx.config.reading_interval_ms as u64 {
        ctx.commands.take_reading = true;
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  CALIBRATING state — transient, resolved back to ON immediately
// ═══════════════════════════════════════════════════════════════════════════

fn calibrating_enter(_ctx: &mut FsmContext) {
    info!("CALIBRATING: re-sampling baseline");
}

fn calibrating_update(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::On)
}
