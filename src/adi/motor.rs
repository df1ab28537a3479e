//! # Motor speeds.

/// Largest speed magnitude a motor port accepts.
pub const MOTOR_MAX: i8 = 127;

/// Clamps a computed speed to the motor range `-127..=127`.
///
/// Control loops do their arithmetic in `i32` (correction terms can push a
/// side past full speed) and narrow here, right before the port write.
pub fn clamp_speed(speed: i32) -> i8 {
    match speed {
        v if v < -(MOTOR_MAX as i32) => -MOTOR_MAX,
        v if v > MOTOR_MAX as i32 => MOTOR_MAX,
        v => v as i8,
    }
}

/// Scales a speed or count by an empirical gain, truncating toward zero.
pub fn scale(value: i32, gain: f64) -> i32 {
    let scaled = value as f64 * gain;
    num_traits::cast(scaled).unwrap_or(if scaled < 0.0 { i32::MIN } else { i32::MAX })
}
