//! The ball tosser's operator control: a command loop driven by a companion
//! computer over six digital lines.
//!
//! The companion waits for the ready line to go high, puts a command on the
//! command lines (and a turn length on the parameter lines) and holds it
//! there. The Cortex drops ready while it carries the command out.

use core::convert::Infallible;

use bitflags::bitflags;
use log::{debug, info, warn};

use crate::{
    adi::{clamp_speed, Hardware},
    config::{TosserCalibration, TosserPorts},
    error::{Error, Maneuver},
    rtos::Deadline,
};

bitflags! {
    /// The levels on the two command lines.
    pub struct CommandLines: u8 {
        /// Command bit 0.
        const A = 1 << 0;
        /// Command bit 1.
        const B = 1 << 1;
    }
}

/// A command from the companion computer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// No command; the ready line stays up.
    Idle,
    /// Pivot left for the given number of turn steps.
    TurnLeft(u8),
    /// Pivot right for the given number of turn steps.
    TurnRight(u8),
    /// Spin up the launcher and cycle the trigger once.
    Fire,
}

impl Command {
    /// Decodes the command lines together with the 4-bit turn parameter.
    pub fn decode(lines: CommandLines, parameter: u8) -> Self {
        let parameter = parameter & 0x0f;
        match (lines.contains(CommandLines::A), lines.contains(CommandLines::B)) {
            (false, false) => Command::Idle,
            (true, false) => Command::TurnLeft(parameter),
            (false, true) => Command::TurnRight(parameter),
            (true, true) => Command::Fire,
        }
    }
}

/// The ball tosser's operator control program.
pub struct BallTosser<H> {
    hw: H,
    ports: TosserPorts,
    cal: TosserCalibration,
}

impl<H: Hardware> BallTosser<H> {
    /// Creates the program with the ball tosser's wiring and calibration.
    pub fn new(hw: H) -> Self {
        Self::with_config(hw, TosserPorts::default(), TosserCalibration::default())
    }

    /// Creates the program with custom wiring and calibration.
    pub fn with_config(hw: H, ports: TosserPorts, cal: TosserCalibration) -> Self {
        Self { hw, ports, cal }
    }

    #[inline]
    /// The hardware handle.
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    #[inline]
    /// The hardware handle, mutably.
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    /// Reads the command lines and the turn parameter.
    pub fn read_command(&mut self) -> Result<Command, Error> {
        let mut lines = CommandLines::empty();
        let [a, b] = self.ports.command;
        lines.set(CommandLines::A, self.hw.digital_read(a)?);
        lines.set(CommandLines::B, self.hw.digital_read(b)?);
        if lines.is_empty() || lines.is_all() {
            return Ok(Command::decode(lines, 0));
        }
        let parameter = self.read_parameter()?;
        Ok(Command::decode(lines, parameter))
    }

    fn read_parameter(&mut self) -> Result<u8, Error> {
        let mut parameter = 0;
        for (bit, port) in self.ports.parameter.iter().enumerate() {
            if self.hw.digital_read(*port)? {
                parameter |= 1 << bit;
            }
        }
        Ok(parameter)
    }

    /// Runs one cycle: raises ready, reads a command and carries it out.
    pub fn poll(&mut self) -> Result<Command, Error> {
        self.hw.digital_write(self.ports.ready, true)?;
        let command = self.read_command()?;
        if command != Command::Idle {
            debug!("command {:?}", command);
            self.hw.digital_write(self.ports.ready, false)?;
        }
        match command {
            Command::Idle => {}
            Command::TurnLeft(steps) => self.turn(steps, self.cal.turn_speed as i32)?,
            Command::TurnRight(steps) => self.turn(steps, -(self.cal.turn_speed as i32))?,
            Command::Fire => self.fire()?,
        }
        Ok(command)
    }

    /// Polls forever.
    pub fn run(&mut self) -> Result<Infallible, Error> {
        info!("waiting for commands");
        loop {
            self.poll()?;
        }
    }

    /// Pivots for `steps` turn steps. Both drive motors get the same speed,
    /// which turns the robot since the sides are mounted opposite.
    pub fn turn(&mut self, steps: u8, speed: i32) -> Result<(), Error> {
        let speed = clamp_speed(speed);
        let time = self.cal.turn_step * steps as u32;
        self.hw.motor_set(self.ports.left_drive, speed)?;
        self.hw.motor_set(self.ports.right_drive, speed)?;
        self.hw.delay(time);
        self.hw.motor_stop(self.ports.left_drive)?;
        self.hw.motor_stop(self.ports.right_drive)?;
        Ok(())
    }

    /// Spins up the launcher, pushes a ball into it with the trigger and
    /// pulls the trigger back.
    ///
    /// The launcher is stopped afterwards whether or not the trigger made it.
    pub fn fire(&mut self) -> Result<(), Error> {
        let launcher = self.cal.launcher_speed;
        self.hw.motor_set(self.ports.launcher_a, launcher)?;
        self.hw.motor_set(self.ports.launcher_b, launcher.saturating_neg())?;
        self.hw.delay(self.cal.spin_up);

        let cycled = self.cycle_trigger();

        let stopped = self.stop_launcher();
        cycled.and(stopped)
    }

    fn cycle_trigger(&mut self) -> Result<(), Error> {
        let speed = self.cal.trigger_speed;
        let (shoot, ready) = (self.cal.trigger_shoot, self.cal.trigger_ready);

        let deadline = Deadline::new(self.hw.now(), self.cal.trigger_timeout);
        while self.trigger_position()? > shoot {
            self.hw.motor_set(self.ports.trigger, speed)?;
            self.check_trigger_deadline(deadline)?;
        }

        let deadline = Deadline::new(self.hw.now(), self.cal.trigger_timeout);
        while self.trigger_position()? < ready {
            self.hw.motor_set(self.ports.trigger, speed.saturating_neg())?;
            self.check_trigger_deadline(deadline)?;
        }
        Ok(())
    }

    fn trigger_position(&mut self) -> Result<i32, Error> {
        Ok(self.hw.analog_read(self.ports.trigger_pot)?)
    }

    fn check_trigger_deadline(&self, deadline: Deadline) -> Result<(), Error> {
        if deadline.expired(self.hw.now()) {
            warn!("trigger stroke took longer than {:?}", deadline.limit());
            Err(Error::Timeout(Maneuver::Trigger))
        } else {
            Ok(())
        }
    }

    fn stop_launcher(&mut self) -> Result<(), Error> {
        for port in [self.ports.trigger, self.ports.launcher_a, self.ports.launcher_b] {
            self.hw.motor_stop(port)?;
        }
        Ok(())
    }

    /// The port wiring.
    pub fn ports(&self) -> &TosserPorts {
        &self.ports
    }

    /// The calibration.
    pub fn calibration(&self) -> &TosserCalibration {
        &self.cal
    }
}
