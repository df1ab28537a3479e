//! Motion primitives of the Toss Up robot.
//!
//! A [`Chassis`] owns the hardware handle together with the robot's wiring
//! and calibration. Its methods are the only blocking maneuvers the
//! autonomous routine uses; none of them keeps state between calls apart
//! from the encoder zero points they reset themselves.

use log::{debug, error};

use crate::{
    adi::{clamp_speed, Hardware, Side},
    config::{Calibration, PortMap},
    error::Error,
};

mod arm;
mod drive;
mod line;

/// Alliance colour, selected by the colour jumper.
///
/// The field is mirrored between alliances, so every turn is mirrored too.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Alliance {
    /// Jumper in; the routine is written for blue.
    Blue,
    /// Jumper out; turns are mirrored.
    Red,
}

impl Alliance {
    /// Decodes the colour jumper's digital level.
    pub fn from_jumper(level: bool) -> Self {
        if level {
            Alliance::Red
        } else {
            Alliance::Blue
        }
    }

    /// The other alliance.
    pub fn opposite(self) -> Self {
        match self {
            Alliance::Blue => Alliance::Red,
            Alliance::Red => Alliance::Blue,
        }
    }
}

/// Travel direction for [`Chassis::drive_to_line`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Drive forwards onto the line.
    Forward,
    /// Back up onto the line.
    Backward,
}

/// The Toss Up robot's drive, arm and intake, driven through a [`Hardware`]
/// handle.
pub struct Chassis<H> {
    hw: H,
    ports: PortMap,
    cal: Calibration,
}

impl<H: Hardware> Chassis<H> {
    /// Wraps a hardware handle with the competition wiring and calibration.
    pub fn new(hw: H) -> Self {
        Self::with_config(hw, PortMap::default(), Calibration::default())
    }

    /// Wraps a hardware handle with custom wiring and calibration.
    pub fn with_config(hw: H, ports: PortMap, cal: Calibration) -> Self {
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

    /// Releases the hardware handle.
    pub fn into_inner(self) -> H {
        self.hw
    }

    #[inline]
    /// The wiring this chassis drives.
    pub fn ports(&self) -> &PortMap {
        &self.ports
    }

    #[inline]
    /// The calibration this chassis runs with.
    pub fn calibration(&self) -> &Calibration {
        &self.cal
    }

    /// Drives the left group (front and middle) at `speed`; positive is
    /// forward.
    pub fn motors_left(&mut self, speed: i32) -> Result<(), Error> {
        let speed = clamp_speed(speed);
        self.hw.motor_set(self.ports.drive_front_left, speed)?;
        self.hw.motor_set(self.ports.drive_mid_left, speed)?;
        Ok(())
    }

    /// Drives the right group (front and middle) at `speed`; positive is
    /// forward. The right motors are mounted the other way round.
    pub fn motors_right(&mut self, speed: i32) -> Result<(), Error> {
        let speed = clamp_speed(-speed);
        self.hw.motor_set(self.ports.drive_front_right, speed)?;
        self.hw.motor_set(self.ports.drive_mid_right, speed)?;
        Ok(())
    }

    /// Drives one side at `speed`.
    pub fn motors_side(&mut self, side: Side, speed: i32) -> Result<(), Error> {
        match side {
            Side::Left => self.motors_left(speed),
            Side::Right => self.motors_right(speed),
        }
    }

    /// Drives all four arm motors at `speed`; positive is up.
    pub fn motors_arm(&mut self, speed: i32) -> Result<(), Error> {
        let inverted = clamp_speed(-speed);
        self.hw.motor_set(self.ports.arm_top_left, inverted)?;
        self.hw.motor_set(self.ports.arm_top_right, inverted)?;
        self.hw.motor_set(self.ports.arm_bottom_left, inverted)?;
        self.hw.motor_set(self.ports.arm_bottom_right, clamp_speed(speed))?;
        Ok(())
    }

    /// Stops all four drive motors.
    pub fn stop_drive(&mut self) -> Result<(), Error> {
        self.hw.motor_stop(self.ports.drive_front_left)?;
        self.hw.motor_stop(self.ports.drive_mid_left)?;
        self.hw.motor_stop(self.ports.drive_front_right)?;
        self.hw.motor_stop(self.ports.drive_mid_right)?;
        Ok(())
    }

    /// Runs the intake rollers inwards.
    pub fn intake(&mut self) -> Result<(), Error> {
        let speed = self.cal.intake_speed;
        self.hw.motor_set(self.ports.intake_left, clamp_speed(-(speed as i32)))?;
        self.hw.motor_set(self.ports.intake_right, speed)?;
        Ok(())
    }

    /// Runs the intake rollers outwards, scoring whatever is held.
    pub fn outtake(&mut self) -> Result<(), Error> {
        let speed = self.cal.intake_speed;
        self.hw.motor_set(self.ports.intake_left, speed)?;
        self.hw.motor_set(self.ports.intake_right, clamp_speed(-(speed as i32)))?;
        Ok(())
    }

    /// Stops the intake rollers.
    pub fn stop_intake(&mut self) -> Result<(), Error> {
        self.hw.motor_stop(self.ports.intake_left)?;
        self.hw.motor_stop(self.ports.intake_right)?;
        Ok(())
    }

    /// Resets both drive encoders to zero.
    pub fn clear_encoders(&mut self) -> Result<(), Error> {
        self.hw.encoder_reset(Side::Left)?;
        self.hw.encoder_reset(Side::Right)?;
        Ok(())
    }

    /// Reads one drive encoder, positive meaning forward travel.
    pub fn count(&mut self, side: Side) -> Result<i32, Error> {
        Ok(side.normalize(self.hw.encoder_get(side)?))
    }

    /// Parks every actuator and blocks for
    /// [`emergency_hold`](Calibration::emergency_hold).
    ///
    /// This is the end of the line for an autonomous period: the hold
    /// outlasts the period, so the kernel tears the task down before it
    /// returns. Calling it again is harmless.
    pub fn emergency_stop(&mut self) -> Result<(), Error> {
        error!("emergency stop");
        self.arm_hold()?;
        self.stop_drive()?;
        self.stop_intake()?;
        self.hw.delay(self.cal.emergency_hold);
        debug!("emergency hold elapsed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adi::MotorPort, sim::SimHardware};

    fn port(n: u8) -> MotorPort {
        MotorPort::new(n)
    }

    #[test]
    fn right_side_is_driven_inverted() {
        let mut chassis = Chassis::new(SimHardware::new());
        chassis.motors_left(60).unwrap();
        chassis.motors_right(60).unwrap();
        let plant = chassis.hardware().plant();
        assert_eq!(plant.motor(port(6)), 60);
        assert_eq!(plant.motor(port(7)), 60);
        assert_eq!(plant.motor(port(8)), -60);
        assert_eq!(plant.motor(port(9)), -60);
    }

    #[test]
    fn correction_terms_are_clamped() {
        let mut chassis = Chassis::new(SimHardware::new());
        chassis.motors_left(300).unwrap();
        chassis.motors_right(-300).unwrap();
        let plant = chassis.hardware().plant();
        assert_eq!(plant.motor(port(6)), 127);
        assert_eq!(plant.motor(port(9)), 127);
    }

    #[test]
    fn arm_up_is_inverted_on_three_motors() {
        let mut chassis = Chassis::new(SimHardware::new());
        chassis.motors_arm(40).unwrap();
        let plant = chassis.hardware().plant();
        assert_eq!(plant.motor(port(2)), -40);
        assert_eq!(plant.motor(port(3)), -40);
        assert_eq!(plant.motor(port(4)), -40);
        assert_eq!(plant.motor(port(5)), 40);
    }

    #[test]
    fn intake_and_outtake_are_mirrored() {
        let mut chassis = Chassis::new(SimHardware::new());
        chassis.intake().unwrap();
        assert_eq!(chassis.hardware().plant().motor(port(1)), -127);
        assert_eq!(chassis.hardware().plant().motor(port(10)), 127);
        chassis.outtake().unwrap();
        assert_eq!(chassis.hardware().plant().motor(port(1)), 127);
        assert_eq!(chassis.hardware().plant().motor(port(10)), -127);
        chassis.stop_intake().unwrap();
        assert_eq!(chassis.hardware().plant().motor(port(1)), 0);
    }

    #[test]
    fn emergency_stop_is_idempotent() {
        let cal = Calibration::default();
        let mut chassis = Chassis::new(SimHardware::new());
        chassis.intake().unwrap();
        chassis.motors_left(90).unwrap();
        chassis.motors_right(90).unwrap();

        chassis.emergency_stop().unwrap();
        let first = chassis.hardware().plant().motors();
        chassis.emergency_stop().unwrap();
        let second = chassis.hardware().plant().motors();

        assert_eq!(first, second);
        for drive in [6, 7, 8, 9, 1, 10] {
            assert_eq!(second[drive], 0, "port {} still driven", drive);
        }
        assert_eq!(second[5], cal.arm_idle_speed);
        assert_eq!(second[2], -cal.arm_idle_speed);
        assert_eq!(
            chassis.hardware().delays(),
            vec![cal.emergency_hold, cal.emergency_hold]
        );
        assert!(chassis.hardware().now().as_millis() >= 200_000);
    }

    #[test]
    fn alliance_decodes_the_jumper() {
        assert_eq!(Alliance::from_jumper(false), Alliance::Blue);
        assert_eq!(Alliance::from_jumper(true), Alliance::Red);
        assert_eq!(Alliance::Red.opposite(), Alliance::Blue);
    }
}
