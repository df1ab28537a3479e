use log::{debug, warn};

use super::{Chassis, Direction};
use crate::{
    adi::Hardware,
    error::{Error, Maneuver},
    rtos::Deadline,
};

impl<H: Hardware> Chassis<H> {
    /// Reads both front line sensors, right first.
    pub fn line_sensors(&mut self) -> Result<(i32, i32), Error> {
        let right = self.hw.analog_read(self.ports.line_right)?;
        let left = self.hw.analog_read(self.ports.line_left)?;
        Ok((left, right))
    }

    /// Drives until a front line sensor reaches a line, then squares up so
    /// both sensors sit on it, then brakes.
    ///
    /// Whichever side finds the line first backs off slowly while the other
    /// keeps coming. If the early side slides off the line again the
    /// correction ends there. Without a
    /// [`line`](crate::config::Timeouts::line) timeout a sensor that never
    /// sees a line blocks here forever.
    pub fn drive_to_line(&mut self, direction: Direction) -> Result<(), Error> {
        let (speed, back) = match direction {
            Direction::Forward => (
                self.cal.line_speed as i32,
                -(self.cal.line_back_speed as i32),
            ),
            Direction::Backward => (
                -(self.cal.line_speed as i32),
                self.cal.line_back_speed as i32,
            ),
        };
        debug!("drive to line {:?}", direction);

        let deadline = Deadline::new(self.hw.now(), self.cal.timeouts.line);
        match self.square_up(speed, back, deadline) {
            Ok(()) => self.brake(),
            Err(err) => {
                self.stop_drive()?;
                Err(err)
            }
        }
    }

    fn square_up(&mut self, speed: i32, back: i32, deadline: Deadline) -> Result<(), Error> {
        let cal = self.cal;
        let (mut left, mut right) = self.line_sensors()?;

        while !cal.on_line(left) && !cal.on_line(right) {
            let sense = self.line_sensors()?;
            left = sense.0;
            right = sense.1;
            self.motors_right(speed)?;
            self.motors_left(speed)?;
            self.check_line_deadline(deadline)?;
        }

        if cal.on_line(right) && !cal.on_line(left) {
            debug!("right sensor on line first ({} / {})", left, right);
            while !cal.on_line(left) && cal.on_line(right) {
                let sense = self.line_sensors()?;
                left = sense.0;
                right = sense.1;
                self.motors_right(back)?;
                self.motors_left(speed)?;
                self.check_line_deadline(deadline)?;
            }
        } else if cal.on_line(left) && !cal.on_line(right) {
            debug!("left sensor on line first ({} / {})", left, right);
            while !cal.on_line(right) && cal.on_line(left) {
                let sense = self.line_sensors()?;
                left = sense.0;
                right = sense.1;
                self.motors_left(back)?;
                self.motors_right(speed)?;
                self.check_line_deadline(deadline)?;
            }
        }
        Ok(())
    }

    fn check_line_deadline(&self, deadline: Deadline) -> Result<(), Error> {
        if deadline.expired(self.hw.now()) {
            warn!("no line found within {:?}", deadline.limit());
            Err(Error::Timeout(Maneuver::DriveToLine))
        } else {
            Ok(())
        }
    }
}
