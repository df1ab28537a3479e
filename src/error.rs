//! Common error model.

use alloc::string::String;
use core::fmt::{self, Debug, Display, Formatter};

/// Identifies the blocking loop which gave up waiting for its termination
/// condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Maneuver {
    /// [`Chassis::drive_straight`](crate::motion::Chassis::drive_straight).
    DriveStraight,
    /// [`Chassis::drive_to_line`](crate::motion::Chassis::drive_to_line).
    DriveToLine,
    /// [`Chassis::turn`](crate::motion::Chassis::turn).
    Turn,
    /// [`Chassis::arm_to`](crate::motion::Chassis::arm_to).
    ArmTo,
    /// Backing away from the bump until a line sensor hits a line.
    LineSeek,
    /// Driving under the bridge until a line sensor hits a line.
    BridgeSeek,
    /// Creeping up to the goal until the ultrasonic sees it in range.
    GoalApproach,
    /// Cocking or releasing the ball tosser's trigger.
    Trigger,
}

impl Display for Maneuver {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Maneuver::DriveStraight => "drive straight",
            Maneuver::DriveToLine => "drive to line",
            Maneuver::Turn => "turn",
            Maneuver::ArmTo => "arm to position",
            Maneuver::LineSeek => "line seek",
            Maneuver::BridgeSeek => "bridge seek",
            Maneuver::GoalApproach => "goal approach",
            Maneuver::Trigger => "trigger",
        };
        f.write_str(name)
    }
}

/// Represents a runtime error.
pub enum Error {
    /// Represents an error which comes from the underlying platform (PROS,
    /// FreeRTOS, newlib, etc.). It wraps an `errno` value.
    System(i32),
    /// Represents an error which comes from within Rust. It wraps an error
    /// string.
    Custom(String),
    /// A guarded loop ran past its configured time limit.
    Timeout(Maneuver),
}

impl Error {
    /// Returns the maneuver which timed out, if this is a timeout.
    pub fn timed_out(&self) -> Option<Maneuver> {
        match self {
            Error::Timeout(maneuver) => Some(*maneuver),
            _ => None,
        }
    }
}

impl<T> From<Error> for Result<T, Error> {
    #[inline]
    fn from(err: Error) -> Self {
        Err(err)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::System(n) => write!(f, "System({})", n),
            Error::Custom(s) => write!(f, "Custom({:?})", s),
            Error::Timeout(m) => write!(f, "Timeout({:?})", m),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::System(n) => write!(f, "system error {}", n),
            Error::Custom(s) => Display::fmt(s, f),
            Error::Timeout(m) => write!(f, "{} timed out", m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn timeout_reports_the_maneuver() {
        let err = Error::Timeout(Maneuver::GoalApproach);
        assert_eq!(err.timed_out(), Some(Maneuver::GoalApproach));
        assert_eq!(err.to_string(), "goal approach timed out");
        assert_eq!(Error::System(6).timed_out(), None);
    }
}
