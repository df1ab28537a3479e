use core::time::Duration;

use log::{debug, warn};

use super::{Alliance, Chassis};
use crate::{
    adi::{scale, Hardware, Side},
    error::{Error, Maneuver},
    rtos::Deadline,
};

impl<H: Hardware> Chassis<H> {
    /// Drives `dist` encoder ticks (620 per wheel revolution, negative
    /// backs up) at `speed`, trimming each side by the difference between
    /// the two encoders.
    ///
    /// Low speeds may not overcome friction. Without a
    /// [`straight`](crate::config::Timeouts::straight) timeout a stalled
    /// robot blocks here forever.
    pub fn drive_straight(&mut self, dist: i32, speed: u8) -> Result<(), Error> {
        debug!("drive straight {} ticks at {}", dist, speed);
        let speed = if dist < 0 {
            -(speed as i32)
        } else {
            speed as i32
        };

        self.clear_encoders()?;
        let deadline = Deadline::new(self.hw.now(), self.cal.timeouts.straight);
        let moved = self.straight_loop(dist, speed, deadline);
        let stopped = self.stop_drive();
        moved.and(stopped)
    }

    fn straight_loop(&mut self, dist: i32, speed: i32, deadline: Deadline) -> Result<(), Error> {
        loop {
            let left = self.count(Side::Left)?;
            let right = self.count(Side::Right)?;
            let adjust = left.saturating_sub(right).saturating_mul(self.cal.straight_gain);

            self.motors_left(speed.saturating_sub(adjust))?;
            self.motors_right(speed.saturating_add(adjust))?;

            let average = ((left as i64 + right as i64) / 2) as i32;
            let short = (dist < 0 && average > dist) || (dist > 0 && average < dist);
            if !short {
                return Ok(());
            }
            if deadline.expired(self.hw.now()) {
                warn!("straight drive stalled at {} of {} ticks", average, dist);
                return Err(Error::Timeout(Maneuver::DriveStraight));
            }
        }
    }

    /// Converts a turn angle to the encoder target used by [`Chassis::turn`].
    ///
    /// Positive targets turn counter-clockwise as seen by the blue alliance.
    pub fn turn_target(&self, angle: i32, alliance: Alliance) -> i32 {
        // TODO: confirm the red mirroring on the field; it was never checked
        // against a measured turn.
        let ticks = scale(angle, self.cal.ticks_per_degree);
        match alliance {
            Alliance::Blue => ticks,
            Alliance::Red => ticks.saturating_neg(),
        }
    }

    /// Pivots roughly `angle` degrees on the spot (positive is
    /// counter-clockwise for blue, mirrored for red).
    ///
    /// Only the encoder of the side driving forward is watched and nothing
    /// corrects for wheel slip; accuracy is whatever the ticks-per-degree
    /// scale gives.
    pub fn turn(&mut self, angle: i32, speed: u8, alliance: Alliance) -> Result<(), Error> {
        let target = self.turn_target(angle, alliance);
        debug!("turn {}° ({:?}) -> {} ticks at {}", angle, alliance, target, speed);

        self.clear_encoders()?;
        let deadline = Deadline::new(self.hw.now(), self.cal.timeouts.turn);
        let turned = self.turn_loop(target, speed as i32, deadline);
        let stopped = self.stop_drive();
        turned.and(stopped)
    }

    fn turn_loop(&mut self, target: i32, speed: i32, deadline: Deadline) -> Result<(), Error> {
        let (watched, left, right, goal) = if target > 0 {
            (Side::Right, -speed, speed, target)
        } else {
            (Side::Left, speed, -speed, target.saturating_neg())
        };

        loop {
            let count = self.count(watched)?;
            self.motors_right(right)?;
            self.motors_left(left)?;

            if count >= goal {
                return Ok(());
            }
            if deadline.expired(self.hw.now()) {
                warn!("turn stalled at {} of {} ticks", count, goal);
                return Err(Error::Timeout(Maneuver::Turn));
            }
        }
    }

    /// Throws each side briefly into reverse in proportion to its last
    /// velocity, then stops the drive.
    ///
    /// A side whose encoder has no velocity sample is simply set to zero.
    pub fn brake(&mut self) -> Result<(), Error> {
        for side in Side::BOTH {
            let speed = match self.hw.encoder_velocity(side) {
                Ok(raw) => scale(side.normalize(raw), -self.cal.brake_gain),
                Err(err) => {
                    warn!("{:?} velocity unavailable ({:?}), not braking it", side, err);
                    0
                }
            };
            self.motors_side(side, speed)?;
        }
        self.hw.delay(self.cal.brake_hold);
        self.stop_drive()
    }

    /// Drives each side at a fixed speed for `time`, with no feedback.
    ///
    /// The motors are left running; follow up with a stop, a brake or
    /// another command.
    pub fn dead_reckon(&mut self, left: i32, right: i32, time: Duration) -> Result<(), Error> {
        self.motors_left(left)?;
        self.motors_right(right)?;
        self.hw.delay(time);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adi::MotorPort,
        config::{Calibration, PortMap, Timeouts},
        sim::{DriveModel, Event, SimHardware},
    };

    fn drive_sim() -> SimHardware {
        let ports = PortMap::default();
        SimHardware::new().with_model(
            DriveModel::new(ports.drive_front_left, ports.drive_front_right).into_model(),
        )
    }

    #[test]
    fn straight_drive_terminates_with_the_drive_stopped() {
        let mut chassis = Chassis::new(drive_sim());
        chassis.drive_straight(600, 45).unwrap();

        let hw = chassis.hardware();
        assert!(hw.now().as_millis() < 5_000, "took {}", hw.now());
        for n in [6, 7, 8, 9] {
            assert_eq!(hw.plant().motor(MotorPort::new(n)), 0);
        }
        let travelled = (Side::Left.normalize(hw.plant().encoder(Side::Left))
            + hw.plant().encoder(Side::Right))
            / 2;
        assert!(travelled >= 600, "stopped at {}", travelled);
    }

    #[test]
    fn backwards_straight_drive_reverses_both_sides() {
        let mut chassis = Chassis::new(drive_sim());
        chassis.drive_straight(-50, 20).unwrap();

        let first = chassis
            .hardware()
            .events()
            .iter()
            .find_map(|event| match event {
                Event::MotorSet { port, speed, .. } if port.number() == 6 => Some(*speed),
                _ => None,
            });
        assert_eq!(first, Some(-20));
        let hw = chassis.hardware();
        assert!(Side::Left.normalize(hw.plant().encoder(Side::Left)) < 0);
    }

    #[test]
    fn zero_distance_runs_a_single_iteration() {
        let mut chassis = Chassis::new(SimHardware::new());
        chassis.drive_straight(0, 45).unwrap();
        let sets = chassis
            .hardware()
            .events()
            .iter()
            .filter(|event| matches!(event, Event::MotorSet { .. }))
            .count();
        assert_eq!(sets, 4);
    }

    #[test]
    fn stalled_straight_drive_times_out_when_asked_to() {
        let cal = Calibration::default().with_timeouts(Timeouts {
            straight: Some(Duration::from_millis(500)),
            ..Timeouts::default()
        });
        // No plant model: the wheels never turn.
        let mut chassis = Chassis::with_config(SimHardware::new(), PortMap::default(), cal);
        let err = chassis.drive_straight(600, 45).unwrap_err();
        assert_eq!(err.timed_out(), Some(Maneuver::DriveStraight));
        assert_eq!(chassis.hardware().plant().motor(MotorPort::new(6)), 0);
    }

    #[test]
    fn blue_turn_drives_right_forward() {
        let mut chassis = Chassis::new(drive_sim());
        assert_eq!(chassis.turn_target(90, Alliance::Blue), 225);

        chassis.turn(90, 50, Alliance::Blue).unwrap();
        let hw = chassis.hardware();
        // Right forward is a negative port speed, left backward too.
        assert_eq!(hw.first_speed(MotorPort::new(9)), Some(-50));
        assert_eq!(hw.first_speed(MotorPort::new(6)), Some(-50));
        assert!(hw.plant().encoder(Side::Right) >= 225);
    }

    #[test]
    fn red_turn_is_mirrored() {
        let mut chassis = Chassis::new(drive_sim());
        assert_eq!(chassis.turn_target(90, Alliance::Red), -225);

        chassis.turn(90, 50, Alliance::Red).unwrap();
        let hw = chassis.hardware();
        assert_eq!(hw.first_speed(MotorPort::new(9)), Some(50));
        assert_eq!(hw.first_speed(MotorPort::new(6)), Some(50));
        assert!(Side::Left.normalize(hw.plant().encoder(Side::Left)) >= 225);
        assert_eq!(hw.plant().motor(MotorPort::new(6)), 0);
    }

    #[test]
    fn brake_counters_each_side_with_its_own_velocity() {
        let mut hw = SimHardware::new();
        // Left raw velocity is reversed: -100 is 100 forward.
        hw.plant_mut().set_velocity(Side::Left, Some(-100));
        hw.plant_mut().set_velocity(Side::Right, Some(50));
        let mut chassis = Chassis::new(hw);
        chassis.brake().unwrap();

        let hw = chassis.hardware();
        assert_eq!(hw.first_speed(MotorPort::new(6)), Some(-24));
        // Right side: -(50 * 0.24) = -12 forward, sent inverted.
        assert_eq!(hw.first_speed(MotorPort::new(9)), Some(12));
        assert_eq!(hw.delays(), vec![Duration::from_millis(150)]);
        assert_eq!(hw.plant().motor(MotorPort::new(6)), 0);
        assert_eq!(hw.plant().motor(MotorPort::new(9)), 0);
    }

    #[test]
    fn brake_without_velocity_sets_that_side_to_zero() {
        let mut hw = SimHardware::new();
        hw.plant_mut().set_velocity(Side::Left, None);
        hw.plant_mut().set_velocity(Side::Right, Some(50));
        let mut chassis = Chassis::new(hw);
        chassis.brake().unwrap();
        assert_eq!(chassis.hardware().first_speed(MotorPort::new(6)), Some(0));
        assert_eq!(chassis.hardware().first_speed(MotorPort::new(9)), Some(12));
    }

    #[test]
    fn dead_reckon_leaves_the_motors_running() {
        let mut chassis = Chassis::new(SimHardware::new());
        chassis
            .dead_reckon(-60, 20, Duration::from_millis(700))
            .unwrap();
        let hw = chassis.hardware();
        assert_eq!(hw.plant().motor(MotorPort::new(6)), -60);
        assert_eq!(hw.plant().motor(MotorPort::new(9)), -20);
        assert_eq!(hw.now().as_millis(), 700);
    }
}
