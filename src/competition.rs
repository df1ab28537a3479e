//! The competition state.

use bitflags::bitflags;
use log::{debug, info};

use crate::{error::Error, robot::Robot};

bitflags! {
    /// The state of competition.
    pub struct CompetitionStatus: u8 {
        /// The robot is disabled.
        const DISABLED = 1 << 0;
        /// The robot is in autonomous.
        const AUTONOMOUS = 1 << 1;
        /// The robot is connected.
        const CONNECTED = 1 << 2;
        /// An invalid state.
        const INVALID = 1 << 7;
    }
}

impl CompetitionStatus {
    /// The mode the robot should be running in.
    pub fn mode(self) -> Mode {
        if self.intersects(Self::DISABLED | Self::INVALID) {
            Mode::Disabled
        } else if self.contains(Self::AUTONOMOUS) {
            Mode::Autonomous
        } else {
            Mode::Opcontrol
        }
    }
}

/// A competition mode, each with its own [`Robot`] hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Disabled by the field or the competition switch.
    Disabled,
    /// The autonomous period.
    Autonomous,
    /// The driver control period.
    Opcontrol,
}

/// Runs a [`Robot`]'s hooks as the competition status changes.
pub struct Competition<R> {
    robot: R,
    initialized: bool,
}

impl<R: Robot> Competition<R> {
    /// Wraps a robot. Nothing runs until the first status arrives.
    pub fn new(robot: R) -> Self {
        Self {
            robot,
            initialized: false,
        }
    }

    /// Wraps a robot and installs the stderr logger, stamping lines with
    /// `clock`.
    #[cfg(feature = "logging")]
    pub fn with_logger(robot: R, clock: fn() -> crate::rtos::Instant) -> Self {
        if let Err(err) = crate::logging::StderrLogger::init(log::STATIC_MAX_LEVEL, clock) {
            libc_print::libc_eprintln!("Failed to initialize logging: {:?}", err);
        }
        Self::new(robot)
    }

    #[inline]
    /// The robot.
    pub fn robot(&self) -> &R {
        &self.robot
    }

    #[inline]
    /// The robot, mutably.
    pub fn robot_mut(&mut self) -> &mut R {
        &mut self.robot
    }

    /// Runs the hook for `status`, after initialising the robot if this is
    /// the first status seen. Blocks for as long as the hook does.
    pub fn enter(&mut self, status: CompetitionStatus) -> Result<Mode, Error> {
        if !self.initialized {
            info!("initialize");
            self.robot.initialize()?;
            self.initialized = true;
        }
        let mode = status.mode();
        debug!("{:?} -> {:?}", status, mode);
        match mode {
            Mode::Disabled => self.robot.disabled()?,
            Mode::Autonomous => self.robot.autonomous()?,
            Mode::Opcontrol => self.robot.opcontrol()?,
        }
        Ok(mode)
    }
}
