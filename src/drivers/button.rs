//! Polled hold-duration button driver.
//!
//! ## Hardware
//!
//! Active-low momentary switch (the ESP32 BOOT button) with pull-up.  The
//! main loop polls the pin level each control tick; the driver keeps the
//! press-start timestamp and reports the accumulated hold time.
//!
//! ## Signal contract
//!
//! | Pin state          | Signal                                    |
//! |--------------------|-------------------------------------------|
//! | not pressed        | `Idle`                                    |
//! | pressed            | `Held(secs)` — elapsed hold time so far   |
//! | just released      | `Released(secs)` — final duration, once   |
//!
//! `Released` fires exactly once per physical press; afterwards the driver
//! returns to `Idle` until the next press.  Gesture classification (long
//! vs. short press) is the state machine's job, not the driver's.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the GPIO level configured by hw_init.
//! On host/test: reads a static `AtomicBool` for injection.

use core::sync::atomic::{AtomicBool, Ordering};

static SIM_PRESSED: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_pressed(pressed: bool) {
    SIM_PRESSED.store(pressed, Ordering::Relaxed);
}

/// Button state reported to the control loop each poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ButtonSignal {
    /// Not pressed, and no release pending.
    Idle,
    /// Currently pressed; carries the elapsed hold time in seconds.
    Held(f32),
    /// Just released; carries the final hold duration in seconds.
    Released(f32),
}

pub struct ButtonDriver {
    gpio: i32,
    press_start_ms: Option<u64>,
}

impl ButtonDriver {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            press_start_ms: None,
        }
    }

    /// GPIO pin this button is attached to.
    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    /// Call from the main loop at each control tick.
    /// `now_ms` is the current monotonic time in milliseconds.
    pub fn tick(&mut self, now_ms: u64) -> ButtonSignal {
        if Self::is_pressed_hw() {
            let start = *self.press_start_ms.get_or_insert(now_ms);
            ButtonSignal::Held(now_ms.saturating_sub(start) as f32 / 1000.0)
        } else if let Some(start) = self.press_start_ms.take() {
            ButtonSignal::Released(now_ms.saturating_sub(start) as f32 / 1000.0)
        } else {
            ButtonSignal::Idle
        }
    }

    #[cfg(target_os = "espidf")]
    fn is_pressed_hw() -> bool {
        // Active-low: pressed pulls the pin to ground.
        !crate::drivers::hw_init::gpio_read(crate::pins::BUTTON_GPIO)
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_pressed_hw() -> bool {
        SIM_PRESSED.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The sim atomic is process-global; serialise the tests that drive it.
    static SIM_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn hold_sim() -> std::sync::MutexGuard<'static, ()> {
        let guard = SIM_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        SIM_PRESSED.store(false, Ordering::SeqCst);
        guard
    }

    #[test]
    fn idle_without_press() {
        let _guard = hold_sim();
        let mut btn = ButtonDriver::new(0);
        assert_eq!(btn.tick(100), ButtonSignal::Idle);
        assert_eq!(btn.tick(200), ButtonSignal::Idle);
    }

    #[test]
    fn hold_accumulates_duration() {
        let _guard = hold_sim();
        let mut btn = ButtonDriver::new(0);
        sim_set_pressed(true);
        assert_eq!(btn.tick(1000), ButtonSignal::Held(0.0));
        assert_eq!(btn.tick(1100), ButtonSignal::Held(0.1));
        assert_eq!(btn.tick(4200), ButtonSignal::Held(3.2));
    }

    #[test]
    fn release_reports_final_duration_exactly_once() {
        let _guard = hold_sim();
        let mut btn = ButtonDriver::new(0);
        sim_set_pressed(true);
        btn.tick(1000);
        btn.tick(1500);
        sim_set_pressed(false);
        assert_eq!(btn.tick(1600), ButtonSignal::Released(0.6));
        assert_eq!(btn.tick(1700), ButtonSignal::Idle);
    }

    #[test]
    fn new_press_after_release_starts_fresh() {
        let _guard = hold_sim();
        let mut btn = ButtonDriver::new(0);
        sim_set_pressed(true);
        btn.tick(1000);
        sim_set_pressed(false);
        btn.tick(1200);
        sim_set_pressed(true);
        assert_eq!(btn.tick(5000), ButtonSignal::Held(0.0));
    }
}
