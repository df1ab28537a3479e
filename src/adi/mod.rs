//! Interfacing with the Cortex's ports: 3-wire digital and analog sensors,
//! motor ports, integrated motor encoders and ultrasonic rangefinders.
//!
//! The robot programs never touch the kernel directly. They take a
//! [`Hardware`] implementation, which the board support crate provides on
//! top of the PROS API and `sim::SimHardware` provides for desk testing.

use core::time::Duration;

use crate::rtos::Instant;

mod encoder;
mod motor;
mod port;
mod ultrasonic;

pub use encoder::*;
pub use motor::*;
pub use port::*;
pub use ultrasonic::*;

/// The capability object through which all robot I/O flows.
///
/// Implementations are not expected to be shared between tasks: the
/// competition switch guarantees that only one mode drives the ports at a
/// time, and every consumer in this crate holds the handle by `&mut`.
pub trait Hardware {
    /// Gets the digital value of a port: `true` if the pin is HIGH.
    ///
    /// Limit switches and jumpers are wired active low, so a pressed switch
    /// or an inserted jumper reads `false`.
    fn digital_read(&mut self, port: DigitalPort) -> Result<bool, PortError>;

    /// Sets the digital value of a port configured as an output.
    fn digital_write(&mut self, port: DigitalPort, value: bool) -> Result<(), PortError>;

    /// Reads an analog input channel and returns the 12-bit value (0 ≈ 0 V,
    /// 4095 ≈ 5 V).
    fn analog_read(&mut self, port: AnalogPort) -> Result<i32, PortError>;

    /// Sets the speed of the motor on the given port.
    fn motor_set(&mut self, port: MotorPort, speed: i8) -> Result<(), PortError>;

    /// Stops the motor on the given port.
    fn motor_stop(&mut self, port: MotorPort) -> Result<(), PortError>;

    /// Gets the number of ticks recorded by an integrated motor encoder since
    /// its last reset. The value is raw: see [`Side::normalize`].
    fn encoder_get(&mut self, side: Side) -> Result<i32, EncoderError>;

    /// Resets an integrated motor encoder to zero.
    fn encoder_reset(&mut self, side: Side) -> Result<(), EncoderError>;

    /// Gets the last velocity sample of an integrated motor encoder, raw like
    /// [`Hardware::encoder_get`].
    fn encoder_velocity(&mut self, side: Side) -> Result<i32, EncoderError>;

    /// Gets the distance reported by an ultrasonic sensor, in centimetres.
    fn ultrasonic_get(&mut self, sensor: Ultrasonic) -> Result<u32, UltrasonicError>;

    /// Gets the current timestamp (i.e., the time which has passed since
    /// program start).
    fn now(&self) -> Instant;

    /// Blocks the calling task for the given duration.
    fn delay(&mut self, duration: Duration);
}

impl<H: Hardware + ?Sized> Hardware for &mut H {
    fn digital_read(&mut self, port: DigitalPort) -> Result<bool, PortError> {
        (**self).digital_read(port)
    }

    fn digital_write(&mut self, port: DigitalPort, value: bool) -> Result<(), PortError> {
        (**self).digital_write(port, value)
    }

    fn analog_read(&mut self, port: AnalogPort) -> Result<i32, PortError> {
        (**self).analog_read(port)
    }

    fn motor_set(&mut self, port: MotorPort, speed: i8) -> Result<(), PortError> {
        (**self).motor_set(port, speed)
    }

    fn motor_stop(&mut self, port: MotorPort) -> Result<(), PortError> {
        (**self).motor_stop(port)
    }

    fn encoder_get(&mut self, side: Side) -> Result<i32, EncoderError> {
        (**self).encoder_get(side)
    }

    fn encoder_reset(&mut self, side: Side) -> Result<(), EncoderError> {
        (**self).encoder_reset(side)
    }

    fn encoder_velocity(&mut self, side: Side) -> Result<i32, EncoderError> {
        (**self).encoder_velocity(side)
    }

    fn ultrasonic_get(&mut self, sensor: Ultrasonic) -> Result<u32, UltrasonicError> {
        (**self).ultrasonic_get(sensor)
    }

    fn now(&self) -> Instant {
        (**self).now()
    }

    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }
}
