//! Utility functions for the microwave-control crate.

/// Convert a magnetron power percentage into a PWM duty cycle.
///
/// The magnetron delivers full average power at half duty, so 100 %
/// power maps to a duty cycle of 0.5.
///
/// # Example
///
/// ```
/// use microwave_control::power_to_duty_cycle;
///
/// assert!((power_to_duty_cycle(100.0) - 0.5).abs() < 1e-9);
/// assert_eq!(power_to_duty_cycle(0.0), 0.0);
/// ```
#[inline]
pub fn power_to_duty_cycle(power_percent: f64) -> f64 {
    clamp_duty_cycle(power_percent / 200.0)
}

/// Clamp a duty cycle into `[0, 1]`. NaN becomes 0.
#[inline]
pub fn clamp_duty_cycle(duty: f64) -> f64 {
    if duty.is_nan() {
        0.0
    } else {
        duty.clamp(0.0, 1.0)
    }
}

/// Convert Celsius to Fahrenheit.
///
/// # Example
///
/// ```
/// use microwave_control::celsius_to_fahrenheit;
///
/// let fahrenheit = celsius_to_fahrenheit(100.0);
/// assert!((fahrenheit - 212.0).abs() < 0.001);
/// ```
#[inline]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_to_duty_cycle() {
        assert!((power_to_duty_cycle(100.0) - 0.5).abs() < 1e-12);
        assert!((power_to_duty_cycle(50.0) - 0.25).abs() < 1e-12);
        assert_eq!(power_to_duty_cycle(0.0), 0.0);
    }

    #[test]
    fn test_clamp_duty_cycle() {
        assert_eq!(clamp_duty_cycle(-0.2), 0.0);
        assert_eq!(clamp_duty_cycle(1.7), 1.0);
        assert_eq!(clamp_duty_cycle(0.3), 0.3);
        assert_eq!(clamp_duty_cycle(f64::NAN), 0.0);
        assert_eq!(clamp_duty_cycle(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_celsius_to_fahrenheit() {
        assert!((celsius_to_fahrenheit(0.0) - 32.0).abs() < 0.001);
        assert!((celsius_to_fahrenheit(-40.0) - (-40.0)).abs() < 0.001);
    }
}
