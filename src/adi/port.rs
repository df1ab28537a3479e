//! Port numbering and the errors shared by single-port devices.

use alloc::format;

use crate::error::Error;

/// Represents possible errors for digital, analog and motor port operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortError {
    /// Port number is out of range for its kind.
    PortOutOfRange(u8),
    /// Port is configured for another kind of device.
    WrongMode(u8),
    /// Unknown error.
    Unknown(i32),
}

impl From<PortError> for Error {
    fn from(err: PortError) -> Self {
        match err {
            PortError::PortOutOfRange(n) => Error::Custom(format!("port {} is out of range", n)),
            PortError::WrongMode(n) => {
                Error::Custom(format!("port {} is configured as another device", n))
            }
            PortError::Unknown(n) => Error::System(n),
        }
    }
}

macro_rules! port_type {
    ($(#[$attr:meta])* $name:ident, $kind:literal, $max:literal) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u8);

        impl $name {
            #[doc = concat!("Highest valid ", $kind, " port number.")]
            pub const MAX: u8 = $max;

            #[doc = concat!("Constructs a ", $kind, " port.")]
            ///
            /// # Panics
            ///
            /// Panics if `port` is zero or above [`Self::MAX`]. Port numbers
            /// are wiring constants, so this is evaluated at compile time
            /// when used in a `const`.
            pub const fn new(port: u8) -> Self {
                assert!(port >= 1 && port <= $max, concat!("invalid ", $kind, " port"));
                Self(port)
            }

            #[doc = concat!("Constructs a ", $kind, " port, checking the range at run time.")]
            pub fn try_new(port: u8) -> Result<Self, PortError> {
                if (1..=$max).contains(&port) {
                    Ok(Self(port))
                } else {
                    Err(PortError::PortOutOfRange(port))
                }
            }

            #[inline]
            /// The port number as printed on the Cortex.
            pub const fn number(self) -> u8 {
                self.0
            }

            #[inline]
            /// The port number as an array index.
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!($kind, " {}"), self.0)
            }
        }
    };
}

port_type!(
    /// One of the Cortex's 3-wire digital ports (1-12).
    DigitalPort,
    "digital",
    12
);

port_type!(
    /// One of the Cortex's analog input ports (1-8).
    AnalogPort,
    "analog",
    8
);

port_type!(
    /// One of the Cortex's motor ports (1-10). Ports 1 and 10 are 2-wire, the
    /// rest drive motor controllers over PWM.
    MotorPort,
    "motor",
    10
);
