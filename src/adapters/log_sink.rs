//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by formatting structured application events
//! into text lines, mirroring each line to the `log` console backend and
//! appending it to a line-oriented log file.  Messages below the configured
//! threshold are dropped; file I/O faults are swallowed — logging is a
//! no-fail side channel and must never disturb the control loop.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::PathBuf;
use std::time::Instant;

use log::Level;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::config::{LogThreshold, SystemConfig};

/// Adapter that writes every [`AppEvent`] to the console and a text file.
pub struct FileLogSink {
    path: Option<PathBuf>,
    threshold: LogThreshold,
    start: Instant,
}

impl FileLogSink {
    pub fn new(config: &SystemConfig) -> Self {
        let path = if config.log_file.is_empty() {
            None
        } else {
            Some(PathBuf::from(config.log_file.as_str()))
        };
        Self {
            path,
            threshold: config.log_threshold,
            start: Instant::now(),
        }
    }

    /// A sink that only mirrors to the console (no file).
    pub fn console_only(threshold: LogThreshold) -> Self {
        Self {
            path: None,
            threshold,
            start: Instant::now(),
        }
    }

    fn append_line(&self, line: &str) {
        let Some(path) = &self.path else { return };
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut f| writeln!(f, "{}", line));
        if let Err(e) = written {
            log::debug!("log file append failed: {}", e);
        }
    }
}

impl EventSink for FileLogSink {
    fn emit(&mut self, event: &AppEvent) {
        let (level, msg) = format_event(event);
        if !self.threshold.allows(level) {
            return;
        }

        log::log!(level, "{}", msg);

        let uptime_secs = self.start.elapsed().as_secs();
        self.append_line(&format!("[{:>6}s] {}", uptime_secs, msg));
    }
}

/// Render an event as a log level plus a one-line message.
fn format_event(event: &AppEvent) -> (Level, String) {
    match event {
        AppEvent::Started(state) => (Level::Info, format!("START | initial_state={:?}", state)),
        AppEvent::StateChanged { from, to } => {
            (Level::Info, format!("STATE | {:?} -> {:?}", from, to))
        }
        AppEvent::CalibrationStarted => (Level::Info, "CAL   | started".to_string()),
        AppEvent::CalibrationCompleted { r0 } => {
            (Level::Info, format!("CAL   | complete, R0={:.2}", r0))
        }
        AppEvent::Reading(s) => (
            Level::Info,
            format!(
                "READ  | Raw Alcohol: {:.2} mg/L, PPM: {:.0}, BAC: {:.2}%, g/mL: {:.4}",
                s.concentration_mg_l, s.ppm, s.bac_percent, s.grams_per_ml,
            ),
        ),
        AppEvent::SensorFault(e) => (Level::Warn, format!("FAULT | sample discarded: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::events::ReadingSample;
    use crate::fsm::StateId;

    #[test]
    fn reading_line_carries_all_four_units() {
        let sample = ReadingSample {
            raw: 2000,
            concentration_mg_l: 0.5,
            ppm: 250.0,
            bac_percent: 0.1,
            grams_per_ml: 0.001,
        };
        let (level, msg) = format_event(&AppEvent::Reading(sample));
        assert_eq!(level, Level::Info);
        assert!(msg.contains("0.50 mg/L"));
        assert!(msg.contains("PPM: 250"));
        assert!(msg.contains("BAC: 0.10%"));
        assert!(msg.contains("g/mL: 0.0010"));
    }

    #[test]
    fn fault_maps_to_warn() {
        let (level, msg) =
            format_event(&AppEvent::SensorFault(crate::error::SensorError::ZeroVoltage));
        assert_eq!(level, Level::Warn);
        assert!(msg.contains("zero sample voltage"));
    }

    #[test]
    fn state_change_names_both_states() {
        let (_, msg) = format_event(&AppEvent::StateChanged {
            from: StateId::Off,
            to: StateId::On,
        });
        assert!(msg.contains("Off"));
        assert!(msg.contains("On"));
    }

    #[test]
    fn threshold_filters_file_output() {
        let dir = std::env::temp_dir().join(format!(
            "breathsense-log-test-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sensor_log.txt");

        let mut sink = FileLogSink {
            path: Some(path.clone()),
            threshold: LogThreshold::Error,
            start: Instant::now(),
        };

        // Info-level reading is below the Error threshold — dropped.
        sink.emit(&AppEvent::Started(StateId::Off));
        assert!(!path.exists());

        // Warn is still below Error.
        sink.emit(&AppEvent::SensorFault(crate::error::SensorError::ZeroVoltage));
        assert!(!path.exists());

        let mut sink = FileLogSink {
            path: Some(path.clone()),
            threshold: LogThreshold::Info,
            start: Instant::now(),
        };
        sink.emit(&AppEvent::Started(StateId::Off));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("START | initial_state=Off"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
