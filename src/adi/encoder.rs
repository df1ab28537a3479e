//! # Integrated motor encoders.

use alloc::format;

use crate::error::Error;

/// A drive side, used to address its integrated motor encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The left drive group's encoder (IME address 0).
    Left,
    /// The right drive group's encoder (IME address 1).
    Right,
}

impl Side {
    /// Both sides, left first.
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    #[inline]
    /// Position of this encoder on the I2C chain.
    pub const fn address(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    #[inline]
    /// Converts a raw reading of this side's encoder so that positive means
    /// the robot moved forward.
    ///
    /// The left encoder is mounted mirrored and counts backwards.
    pub const fn normalize(self, raw: i32) -> i32 {
        match self {
            Side::Left => raw.wrapping_neg(),
            Side::Right => raw,
        }
    }
}

/// Represents possible errors for encoder operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderError {
    /// No encoder answered at this address on the I2C chain.
    NotConnected(Side),
    /// The encoder has not produced a velocity sample yet.
    NoVelocity(Side),
    /// Unknown error.
    Unknown(i32),
}

impl From<EncoderError> for Error {
    fn from(err: EncoderError) -> Self {
        match err {
            EncoderError::NotConnected(side) => {
                Error::Custom(format!("{:?} encoder is not connected", side))
            }
            EncoderError::NoVelocity(side) => {
                Error::Custom(format!("{:?} encoder has no velocity sample", side))
            }
            EncoderError::Unknown(n) => Error::System(n),
        }
    }
}
