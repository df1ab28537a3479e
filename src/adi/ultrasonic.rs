use crate::error::Error;

use super::DigitalPort;

/// Represents a port pair configured as an ultrasonic sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ultrasonic {
    /// Port connected to the sensor's orange "output" (echo) wire.
    pub echo: DigitalPort,
    /// Port connected to the sensor's yellow "input" (ping) wire.
    pub ping: DigitalPort,
}

impl Ultrasonic {
    /// Describes an ultrasonic sensor on two digital ports.
    pub const fn new(echo: DigitalPort, ping: DigitalPort) -> Self {
        Self { echo, ping }
    }
}

/// Represents possible errors for ultrasonic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UltrasonicError {
    /// Ports cannot be configured as an ultrasonic sensor.
    PortsNotUltrasonic,
    /// Sensor did not hear an echo.
    NoReading,
    /// Unknown error.
    Unknown(i32),
}

impl From<UltrasonicError> for Error {
    fn from(err: UltrasonicError) -> Self {
        match err {
            UltrasonicError::PortsNotUltrasonic => {
                Error::Custom("ports not an ultrasonic sensor".into())
            }
            UltrasonicError::NoReading => Error::Custom("sensor did not hear an echo".into()),
            UltrasonicError::Unknown(n) => Error::System(n),
        }
    }
}
