use log::{debug, warn};

use super::Chassis;
use crate::{
    adi::Hardware,
    error::{Error, Maneuver},
    rtos::Deadline,
};

impl<H: Hardware> Chassis<H> {
    /// Holds the arm against gravity with the idle speed.
    pub fn arm_hold(&mut self) -> Result<(), Error> {
        self.motors_arm(self.cal.arm_idle_speed as i32)
    }

    /// Reads the arm potentiometer.
    pub fn arm_position(&mut self) -> Result<i32, Error> {
        Ok(self.hw.analog_read(self.ports.arm_pot)?)
    }

    /// Servos the arm to a potentiometer `target` at `speed`, then holds it
    /// there.
    ///
    /// Bang-bang control within
    /// [`arm_tolerance`](crate::config::Calibration::arm_tolerance). Upward
    /// moves end early when the top limit switch closes. The arm is left at
    /// idle hold on every path out, timeouts included.
    pub fn arm_to(&mut self, target: i32, speed: u8) -> Result<(), Error> {
        debug!("arm to {} at {}", target, speed);
        let deadline = Deadline::new(self.hw.now(), self.cal.timeouts.arm);
        let moved = self.arm_loop(target, speed as i32, deadline);
        let held = self.arm_hold();
        moved.and(held)
    }

    fn arm_loop(&mut self, target: i32, speed: i32, deadline: Deadline) -> Result<(), Error> {
        let tolerance = self.cal.arm_tolerance;
        let mut current = self.arm_position()?;

        if current < target {
            while current.saturating_add(tolerance) < target && self.above_bottom()? {
                current = self.arm_position()?;
                self.motors_arm(-speed)?;
                self.check_arm_deadline(deadline, current)?;
            }
        } else if current > target {
            while current.saturating_sub(tolerance) > target
                && self.hw.digital_read(self.ports.limit_top)?
            {
                current = self.arm_position()?;
                self.motors_arm(speed)?;
                self.check_arm_deadline(deadline, current)?;
            }
        }
        Ok(())
    }

    fn above_bottom(&mut self) -> Result<bool, Error> {
        if self.cal.enforce_bottom_limit {
            Ok(self.hw.digital_read(self.ports.limit_bottom)?)
        } else {
            Ok(true)
        }
    }

    fn check_arm_deadline(&self, deadline: Deadline, current: i32) -> Result<(), Error> {
        if deadline.expired(self.hw.now()) {
            warn!("arm stuck at {}", current);
            Err(Error::Timeout(Maneuver::ArmTo))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::*;
    use crate::{
        adi::MotorPort,
        config::{Calibration, PortMap, Timeouts},
        sim::{ArmModel, Event, SimHardware},
    };

    fn arm_sim(start: i32) -> SimHardware {
        let ports = PortMap::default();
        let mut hw = SimHardware::new()
            .with_model(ArmModel::new(ports.arm_bottom_right, ports.arm_pot).into_model());
        hw.plant_mut().set_analog(ports.arm_pot, start);
        hw
    }

    fn arm_sets(hw: &SimHardware) -> Vec<i8> {
        let bottom_right = PortMap::default().arm_bottom_right;
        hw.events()
            .iter()
            .filter_map(|event| match event {
                Event::MotorSet { port, speed, .. } if *port == bottom_right => Some(*speed),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn pressed_top_limit_goes_straight_to_idle_hold() {
        let ports = PortMap::default();
        let mut hw = arm_sim(3550);
        hw.plant_mut().set_digital(ports.limit_top, false);
        let mut chassis = Chassis::new(hw);
        chassis.arm_to(2000, 127).unwrap();

        let hw = chassis.hardware();
        assert_eq!(arm_sets(hw), vec![8]);
        assert_eq!(hw.plant().motor(MotorPort::new(2)), -8);
        assert_eq!(hw.plant().motor(MotorPort::new(5)), 8);
    }

    #[test]
    fn raising_stops_within_tolerance() {
        let mut chassis = Chassis::new(arm_sim(3550));
        chassis.arm_to(3100, 50).unwrap();

        let hw = chassis.hardware();
        let sets = arm_sets(hw);
        assert_eq!(sets.last(), Some(&8));
        assert!(sets[..sets.len() - 1].iter().all(|speed| *speed == 50));
        let pot = hw.plant().analog(PortMap::default().arm_pot);
        assert!(pot <= 3110, "stopped at {}", pot);
    }

    #[test]
    fn lowering_drives_the_arm_down() {
        let mut chassis = Chassis::new(arm_sim(2000));
        chassis.arm_to(3550, 127).unwrap();

        let sets = arm_sets(chassis.hardware());
        assert_eq!(sets.first(), Some(&-127));
        assert_eq!(sets.last(), Some(&8));
        let pot = chassis.hardware().plant().analog(PortMap::default().arm_pot);
        assert!(pot >= 3540, "stopped at {}", pot);
    }

    #[test]
    fn arm_within_tolerance_does_not_move() {
        let mut chassis = Chassis::new(arm_sim(3105));
        chassis.arm_to(3100, 127).unwrap();
        assert_eq!(arm_sets(chassis.hardware()), vec![8]);
    }

    #[test]
    fn bottom_limit_is_only_checked_when_enabled() {
        let ports = PortMap::default();
        let mut hw = arm_sim(3100);
        hw.plant_mut().set_digital(ports.limit_bottom, false);
        let cal = Calibration::default().with_bottom_limit(true);
        let mut chassis = Chassis::with_config(hw, ports, cal);
        chassis.arm_to(4000, 60).unwrap();
        assert_eq!(arm_sets(chassis.hardware()), vec![8]);

        let mut hw = arm_sim(3100);
        hw.plant_mut().set_digital(ports.limit_bottom, false);
        let mut chassis = Chassis::new(hw);
        chassis.arm_to(4000, 60).unwrap();
        assert!(arm_sets(chassis.hardware()).len() > 1);
    }

    #[test]
    fn stuck_arm_times_out_into_idle_hold() {
        let cal = Calibration::default().with_timeouts(Timeouts {
            arm: Some(Duration::from_millis(200)),
            ..Timeouts::default()
        });
        let ports = PortMap::default();
        let mut hw = SimHardware::new();
        hw.plant_mut().set_analog(ports.arm_pot, 3550);
        let mut chassis = Chassis::with_config(hw, ports, cal);

        let err = chassis.arm_to(1000, 127).unwrap_err();
        assert_eq!(err.timed_out(), Some(Maneuver::ArmTo));
        assert_eq!(chassis.hardware().plant().motor(ports.arm_bottom_right), 8);
    }
}
