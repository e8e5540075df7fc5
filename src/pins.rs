//! GPIO / peripheral pin assignments for the BreathSense board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// MQ-3 alcohol sensor — Analog (ADC1)
// ---------------------------------------------------------------------------

/// MQ-3 gas sensor — analog voltage via resistive divider.
/// ADC1 channel 6 (GPIO 34 on ESP32).
pub const MQ3_ADC_GPIO: i32 = 34;
/// ADC attenuation for the MQ-3 channel (11 dB → full supply-voltage range).
pub const MQ3_ADC_ATTEN: u32 = 3; // esp_idf_hal::adc::attenuation::DB_11

// ---------------------------------------------------------------------------
// SSD1306 OLED (I²C)
// ---------------------------------------------------------------------------

pub const OLED_SDA_GPIO: i32 = 21;
pub const OLED_SCL_GPIO: i32 = 22;
/// I²C bus frequency for the display (standard SSD1306 fast mode).
pub const OLED_I2C_FREQ_HZ: u32 = 400_000;

/// Display panel dimensions in pixels.
pub const OLED_WIDTH: u32 = 128;
pub const OLED_HEIGHT: u32 = 64;

// ---------------------------------------------------------------------------
// Display row layout (pixel y-coordinates used by the reading renderer)
// ---------------------------------------------------------------------------

/// y-offset of the warm-up progress-dot row.
pub const ROW_WARMUP_DOTS: i32 = 20;
/// y-offsets of the four reading rows (raw, PPM, BAC, g/mL).
pub const ROW_READING: i32 = 0;
pub const ROW_PPM: i32 = 16;
pub const ROW_BAC: i32 = 32;
pub const ROW_GRAMS: i32 = 48;

// ---------------------------------------------------------------------------
// User button (active-low with internal pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button — the ESP32 BOOT button doubles as the user button.
pub const BUTTON_GPIO: i32 = 0;
