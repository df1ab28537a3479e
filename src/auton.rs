//! The Toss Up autonomous routine.
//!
//! Pushes the opponents' large balls, crosses the bump, drives under the
//! bridge to the goal and scores, then swings at the balls on the bridge.
//! Jumpers on the Cortex select the alliance and one of two openings.

use core::{convert::Infallible, time::Duration};

use log::{debug, error, info, warn};

use crate::{
    adi::{Hardware, Side, UltrasonicError},
    config::{Calibration, PortMap},
    error::{Error, Maneuver},
    motion::{Alliance, Chassis, Direction},
    rtos::Deadline,
};

/// Configuration read from the jumpers at the start of the routine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Jumpers {
    /// Alliance colour.
    pub alliance: Alliance,
    /// Open by ramming the large balls instead of collecting from the wall.
    pub ramming: bool,
    /// Print sensor readings forever instead of running the routine.
    pub diagnostics: bool,
}

impl Jumpers {
    /// Reads all three jumpers. An inserted jumper pulls its pin low.
    pub fn read<H: Hardware>(chassis: &mut Chassis<H>) -> Result<Self, Error> {
        let ports = *chassis.ports();
        let hw = chassis.hardware_mut();
        Ok(Self {
            alliance: Alliance::from_jumper(hw.digital_read(ports.colour_jumper)?),
            diagnostics: !hw.digital_read(ports.diagnostics_jumper)?,
            ramming: !hw.digital_read(ports.ram_jumper)?,
        })
    }
}

/// How the routine ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Every step ran.
    Completed,
    /// A maneuver ran out of time and the robot was stopped.
    Halted(Maneuver),
}

/// One round of sensor readings printed in diagnostics mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Telemetry {
    /// Ultrasonic distance in cm, if an echo came back.
    pub ultrasonic: Option<u32>,
    /// Left line sensor.
    pub line_left: i32,
    /// Right line sensor.
    pub line_right: i32,
    /// Arm potentiometer.
    pub arm: i32,
    /// Left encoder, forward positive.
    pub left: i32,
    /// Right encoder, forward positive.
    pub right: i32,
}

/// When a seek reads the clock it checks against its limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stamp {
    /// Before the open-loop step.
    BeforeStep,
    /// After the step, just before the target is looked for.
    AfterStep,
}

/// The Toss Up robot's autonomous program.
pub struct TossUp<H> {
    chassis: Chassis<H>,
}

impl<H: Hardware> TossUp<H> {
    /// Creates the program with the competition wiring and calibration.
    pub fn new(hw: H) -> Self {
        Self {
            chassis: Chassis::new(hw),
        }
    }

    /// Creates the program with custom wiring and calibration.
    pub fn with_config(hw: H, ports: PortMap, cal: Calibration) -> Self {
        Self {
            chassis: Chassis::with_config(hw, ports, cal),
        }
    }

    #[inline]
    /// The chassis the routine drives.
    pub fn chassis(&self) -> &Chassis<H> {
        &self.chassis
    }

    #[inline]
    /// The chassis the routine drives, mutably.
    pub fn chassis_mut(&mut self) -> &mut Chassis<H> {
        &mut self.chassis
    }

    /// Runs the autonomous routine.
    ///
    /// Ends in an emergency stop either way: after the last step, or as soon
    /// as any maneuver times out. Hardware errors are returned as they
    /// happen, without stopping anything. In diagnostics mode this never
    /// returns.
    pub fn run(&mut self) -> Result<Outcome, Error> {
        let jumpers = Jumpers::read(&mut self.chassis)?;
        info!(
            "autonomous: {:?}, {}",
            jumpers.alliance,
            if jumpers.ramming { "ramming" } else { "scoring" }
        );
        self.chassis.clear_encoders()?;

        if jumpers.diagnostics {
            info!("diagnostics jumper in, printing sensors");
            match self.telemetry()? {}
        }

        match self.routine(jumpers) {
            Ok(()) => {
                info!("routine complete");
                self.chassis.emergency_stop()?;
                Ok(Outcome::Completed)
            }
            Err(err) => match err.timed_out() {
                Some(maneuver) => {
                    error!("{}, halting", err);
                    self.chassis.emergency_stop()?;
                    Ok(Outcome::Halted(maneuver))
                }
                None => Err(err),
            },
        }
    }

    fn routine(&mut self, jumpers: Jumpers) -> Result<(), Error> {
        let alliance = jumpers.alliance;
        let cal = *self.chassis.calibration();
        let arm = cal.arm;
        let ms = Duration::from_millis;

        self.chassis.arm_to(arm.low, 127)?;
        self.chassis.arm_to(arm.bottom, 60)?;

        if jumpers.ramming {
            self.chassis.dead_reckon(-127, -127, ms(1900))?;
            self.chassis.intake()?;
            self.chassis.brake()?;
            self.chassis.hardware_mut().delay(ms(500));
            self.chassis.turn(10, 50, alliance)?;
        } else {
            // Two balls off the wall.
            self.chassis.intake()?;
            self.chassis.drive_straight(480, 45)?;
            self.chassis.stop_drive()?;
            self.chassis.hardware_mut().delay(ms(1000));
            self.chassis.drive_straight(-50, 20)?;

            let (left, right) = match alliance {
                Alliance::Red => (20, -60),
                Alliance::Blue => (-60, 20),
            };
            self.chassis.dead_reckon(left, right, ms(700))?;
            self.chassis.hardware_mut().delay(ms(500));

            self.chassis.dead_reckon(-127, -127, ms(1700))?;
            self.chassis.brake()?;
            self.chassis.hardware_mut().delay(ms(500));
            self.chassis.turn(15, 50, alliance)?;
        }

        // Back away from the bump onto the first line. This sensor is the one
        // that does not cross the horizontal line on the way.
        info!("seeking line");
        let sensor = match alliance {
            Alliance::Red => Side::Left,
            Alliance::Blue => Side::Right,
        };
        self.seek(
            Maneuver::LineSeek,
            cal.line_seek_timeout,
            50,
            Stamp::BeforeStep,
            |chassis| {
                let reading = line_sensor(chassis, sensor)?;
                Ok(!cal.on_line(reading))
            },
        )?;

        self.chassis.drive_straight(80, 40)?;
        self.chassis.drive_to_line(Direction::Forward)?;
        self.chassis.stop_drive()?;

        // Face the bump.
        self.chassis.arm_to(arm.low, 127)?;
        self.chassis.drive_straight(-200, 30)?;
        match alliance {
            Alliance::Blue => self.chassis.turn(60, 127, Alliance::Blue)?,
            Alliance::Red => self.chassis.turn(135, 127, Alliance::Red)?,
        }
        self.chassis.brake()?;

        // Over the bump and square up against it.
        self.chassis.dead_reckon(30, 30, ms(1000))?;
        self.chassis.dead_reckon(127, 127, ms(1500))?;
        self.chassis.dead_reckon(-30, -30, ms(2000))?;
        self.chassis.stop_drive()?;
        self.chassis.arm_to(arm.bottom, 60)?;
        self.chassis.hardware_mut().delay(ms(300));

        info!("seeking bridge");
        let sensor = match alliance {
            Alliance::Red => Side::Right,
            Alliance::Blue => Side::Left,
        };
        self.seek(
            Maneuver::BridgeSeek,
            cal.bridge_seek_timeout,
            80,
            Stamp::BeforeStep,
            |chassis| {
                let reading = line_sensor(chassis, sensor)?;
                Ok(!cal.on_line(reading) || reading < cal.line_floor)
            },
        )?;

        self.chassis.drive_straight(500, 50)?;
        self.chassis.arm_to(arm.full, 127)?;

        info!("approaching goal");
        if !goal_in_range(&mut self.chassis)? {
            self.seek(
                Maneuver::GoalApproach,
                cal.goal_approach_timeout,
                30,
                Stamp::AfterStep,
                |chassis| Ok(!goal_in_range(chassis)?),
            )?;
        }
        self.chassis.stop_drive()?;
        self.chassis.outtake()?;
        self.chassis.hardware_mut().delay(cal.score_duration);

        // Knock the large balls off the bridge.
        info!("clearing bridge");
        self.chassis.drive_straight(-250, 50)?;
        self.chassis.turn(270, 50, alliance.opposite())?;
        self.chassis.drive_straight(250, 60)?;
        self.chassis.brake()?;
        self.chassis.arm_to(arm.middle, 50)?;
        self.chassis.turn(150, 70, alliance)?;
        self.chassis.turn(-300, 70, alliance)?;
        Ok(())
    }

    /// Creeps forwards in short open-loop steps while `searching` holds.
    ///
    /// The time is taken at `stamp` and the limit checked after the
    /// following read, so a target found in the same step the limit passes
    /// still counts as a timeout.
    fn seek<F>(
        &mut self,
        maneuver: Maneuver,
        limit: Duration,
        speed: i32,
        stamp: Stamp,
        mut searching: F,
    ) -> Result<(), Error>
    where
        F: FnMut(&mut Chassis<H>) -> Result<bool, Error>,
    {
        let step = self.chassis.calibration().seek_step;
        let deadline = Deadline::new(self.chassis.hardware().now(), Some(limit));
        loop {
            let before = self.chassis.hardware().now();
            self.chassis.dead_reckon(speed, speed, step)?;
            let checked = match stamp {
                Stamp::BeforeStep => before,
                Stamp::AfterStep => self.chassis.hardware().now(),
            };
            let still_searching = searching(&mut self.chassis)?;
            if deadline.expired(checked) {
                warn!("{} gave up after {:?}", maneuver, limit);
                return Err(Error::Timeout(maneuver));
            }
            if !still_searching {
                debug!("{} done after {:?}", maneuver, deadline.elapsed(checked));
                return Ok(());
            }
        }
    }

    /// Takes one round of sensor readings.
    pub fn telemetry_sample(&mut self) -> Result<Telemetry, Error> {
        let ports = *self.chassis.ports();
        let line_left = self.chassis.hardware_mut().analog_read(ports.line_left)?;
        let line_right = self.chassis.hardware_mut().analog_read(ports.line_right)?;
        let left = self.chassis.count(Side::Left)?;
        let right = self.chassis.count(Side::Right)?;
        let arm = self.chassis.arm_position()?;
        let ultrasonic = match self.chassis.hardware_mut().ultrasonic_get(ports.ultrasonic) {
            Ok(distance) => Some(distance),
            Err(UltrasonicError::NoReading) => None,
            Err(err) => return Err(err.into()),
        };
        Ok(Telemetry {
            ultrasonic,
            line_left,
            line_right,
            arm,
            left,
            right,
        })
    }

    /// Prints sensor readings every
    /// [`telemetry_period`](Calibration::telemetry_period), forever.
    pub fn telemetry(&mut self) -> Result<Infallible, Error> {
        let period = self.chassis.calibration().telemetry_period;
        loop {
            let sample = self.telemetry_sample()?;
            info!(
                "ultrasonic: {:?}, line L: {}, line R: {}",
                sample.ultrasonic, sample.line_left, sample.line_right
            );
            debug!(
                "arm: {}, encoder L: {}, encoder R: {}",
                sample.arm, sample.left, sample.right
            );
            self.chassis.hardware_mut().delay(period);
        }
    }
}

fn line_sensor<H: Hardware>(chassis: &mut Chassis<H>, side: Side) -> Result<i32, Error> {
    let port = match side {
        Side::Left => chassis.ports().line_left,
        Side::Right => chassis.ports().line_right,
    };
    Ok(chassis.hardware_mut().analog_read(port)?)
}

fn goal_in_range<H: Hardware>(chassis: &mut Chassis<H>) -> Result<bool, Error> {
    let sensor = chassis.ports().ultrasonic;
    match chassis.hardware_mut().ultrasonic_get(sensor) {
        Ok(distance) => Ok(chassis.calibration().goal_in_range(distance)),
        Err(UltrasonicError::NoReading) => {
            debug!("no ultrasonic echo");
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}
