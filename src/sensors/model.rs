//! MQ-3 sensor response model.
//!
//! Pure conversion functions: raw ADC sample → divider voltage → sensor
//! resistance (Rs) → alcohol concentration (mg/L) → derived units.  The
//! concentration curve is the datasheet power law `A * (Rs/R0)^B` with
//! constants fitted for ethanol on the MQ-3.  Nothing in here touches
//! hardware or holds state.

use crate::error::SensorError;

/// Ethanol curve coefficient for the MQ-3 response power law.
pub const CURVE_COEFF_A: f32 = 0.4;
/// Ethanol curve exponent for the MQ-3 response power law.
pub const CURVE_EXPONENT_B: f32 = -1.430_68;

/// mg/L → parts-per-million scale factor.
pub const MG_L_TO_PPM: f32 = 500.0;
/// mg/L → blood-alcohol-percent scale factor.
pub const MG_L_TO_BAC_PERCENT: f32 = 0.2;
/// mg/L → grams-per-millilitre scale factor.
pub const MG_L_TO_G_PER_ML: f32 = 0.002;

/// Electrical model of the sensor's voltage divider.
#[derive(Debug, Clone, Copy)]
pub struct VoltageDivider {
    /// Divider supply voltage (volts) — also the ADC full-scale voltage.
    pub supply_voltage: f32,
    /// Full-scale raw ADC value.
    pub adc_max: u16,
    /// Load resistor RL (ohms).
    pub load_resistance_ohms: f32,
}

impl Default for VoltageDivider {
    fn default() -> Self {
        Self {
            supply_voltage: 3.3,
            adc_max: 4095,
            load_resistance_ohms: 1000.0,
        }
    }
}

impl VoltageDivider {
    /// Build the divider model from the configured electrical parameters.
    pub fn from_config(config: &crate::config::SystemConfig) -> Self {
        Self {
            supply_voltage: config.supply_voltage,
            adc_max: config.adc_max,
            load_resistance_ohms: config.load_resistance_ohms,
        }
    }
}

/// Estimate the sensor resistance Rs from a raw ADC sample.
///
/// `voltage = sample * (supply / adc_max)`,
/// `Rs = supply * RL / voltage - RL`.
///
/// A zero sample (zero divider voltage) makes Rs undefined; the caller
/// decides whether to skip the reading or the calibration sample.
pub fn resistance_from_sample(
    sample: u16,
    divider: &VoltageDivider,
) -> Result<f32, SensorError> {
    let voltage = sample as f32 * (divider.supply_voltage / divider.adc_max as f32);
    if voltage <= 0.0 {
        return Err(SensorError::ZeroVoltage);
    }
    Ok(divider.supply_voltage * divider.load_resistance_ohms / voltage
        - divider.load_resistance_ohms)
}

/// Alcohol concentration (mg/L) from the resistance ratio Rs/R0.
///
/// `r0 == 0` returns 0.0 exactly: an uncalibrated or degenerate baseline
/// yields a flat reading, never a fault.  Downstream consumers rely on this
/// output being finite and bounded.
pub fn concentration_from_resistance(resistance: f32, r0: f32) -> f32 {
    if r0 == 0.0 {
        return 0.0;
    }
    CURVE_COEFF_A * (resistance / r0).powf(CURVE_EXPONENT_B)
}

/// Concentration (mg/L) → parts per million.
pub fn to_ppm(concentration: f32) -> f32 {
    concentration * MG_L_TO_PPM
}

/// Concentration (mg/L) → blood alcohol percentage.
pub fn to_bac_percent(concentration: f32) -> f32 {
    concentration * MG_L_TO_BAC_PERCENT
}

/// Concentration (mg/L) → grams per millilitre.
pub fn to_grams_per_ml(concentration: f32) -> f32 {
    concentration * MG_L_TO_G_PER_ML
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, tol: f32) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn unit_conversions_are_exact_linear_laws() {
        for c in [0.0, 0.5, 1.0, 2.0, 5.0] {
            assert!(approx(to_ppm(c), c * 500.0, 1e-6));
            assert!(approx(to_bac_percent(c), c * 0.2, 1e-6));
            assert!(approx(to_grams_per_ml(c), c * 0.002, 1e-6));
        }
        assert!(approx(to_bac_percent(5.0), 1.0, 1e-6));
        assert!(approx(to_grams_per_ml(5.0), 0.01, 1e-6));
        assert!(approx(to_ppm(0.1), 50.0, 1e-4));
    }

    #[test]
    fn zero_r0_yields_zero_concentration() {
        for rs in [0.0, 1.0, 900.0, 9900.0, f32::MAX] {
            assert_eq!(concentration_from_resistance(rs, 0.0), 0.0);
        }
    }

    #[test]
    fn resistance_from_reference_samples() {
        // RL * (adc_max/sample - 1) — the supply voltage cancels out of the
        // divider model, leaving a pure ratio law.
        let div = VoltageDivider::default();
        let expected = [
            (1000u16, 3095.0f32),
            (2000, 1047.5),
            (3000, 365.0),
            (4000, 23.75),
        ];
        for (sample, rs) in expected {
            let got = resistance_from_sample(sample, &div).unwrap();
            assert!(approx(got, rs, 1.0), "sample {sample}: got {got}, want {rs}");
        }
    }

    #[test]
    fn zero_sample_is_an_explicit_error() {
        let div = VoltageDivider::default();
        assert_eq!(
            resistance_from_sample(0, &div),
            Err(SensorError::ZeroVoltage)
        );
    }

    #[test]
    fn concentration_from_reference_samples() {
        let div = VoltageDivider::default();
        let expected = [
            (1000u16, 0.079448f32, 0.001f32),
            (2000, 0.374305, 0.001),
            (3000, 1.691527, 0.001),
            (4000, 84.326791, 0.01),
        ];
        for (sample, conc, tol) in expected {
            let rs = resistance_from_sample(sample, &div).unwrap();
            let got = concentration_from_resistance(rs, 1000.0);
            assert!(
                approx(got, conc, tol),
                "sample {sample}: got {got}, want {conc}"
            );
        }
    }

    #[test]
    fn full_scale_sample_gives_near_zero_resistance() {
        let div = VoltageDivider::default();
        let rs = resistance_from_sample(4095, &div).unwrap();
        assert!(approx(rs, 0.0, 0.01));
    }
}
