//! Wiring and calibration tables.
//!
//! Every number the control loops compare against lives here, with its unit,
//! so re-tuning a robot never means touching control flow. `Default` gives
//! the values the robots were competed with.

use core::time::Duration;

use crate::adi::{AnalogPort, DigitalPort, MotorPort, Ultrasonic};

/// Port assignments of the Toss Up robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortMap {
    /// Front left drive motor. Left drive runs forward on positive speeds.
    pub drive_front_left: MotorPort,
    /// Middle left drive motor.
    pub drive_mid_left: MotorPort,
    /// Middle right drive motor. Right drive runs forward on negative speeds.
    pub drive_mid_right: MotorPort,
    /// Front right drive motor.
    pub drive_front_right: MotorPort,
    /// Top left arm motor, mounted inverted.
    pub arm_top_left: MotorPort,
    /// Top right arm motor, mounted inverted.
    pub arm_top_right: MotorPort,
    /// Bottom left arm motor, mounted inverted.
    pub arm_bottom_left: MotorPort,
    /// Bottom right arm motor; positive raises the arm.
    pub arm_bottom_right: MotorPort,
    /// Left intake roller; negative pulls balls in.
    pub intake_left: MotorPort,
    /// Right intake roller; positive pulls balls in.
    pub intake_right: MotorPort,
    /// Arm top limit switch (active low).
    pub limit_top: DigitalPort,
    /// Arm bottom limit switch (active low).
    pub limit_bottom: DigitalPort,
    /// Alliance colour jumper: in (low) for blue, out (high) for red.
    pub colour_jumper: DigitalPort,
    /// Ramming routine jumper (in = low = ram).
    pub ram_jumper: DigitalPort,
    /// Sensor telemetry jumper (in = low = print readings, no routine).
    pub diagnostics_jumper: DigitalPort,
    /// Arm potentiometer.
    pub arm_pot: AnalogPort,
    /// Front left line sensor.
    pub line_left: AnalogPort,
    /// Front right line sensor.
    pub line_right: AnalogPort,
    /// Front ultrasonic rangefinder.
    pub ultrasonic: Ultrasonic,
}

impl Default for PortMap {
    fn default() -> Self {
        Self {
            drive_front_left: MotorPort::new(6),
            drive_mid_left: MotorPort::new(7),
            drive_mid_right: MotorPort::new(8),
            drive_front_right: MotorPort::new(9),
            arm_top_left: MotorPort::new(2),
            arm_top_right: MotorPort::new(3),
            arm_bottom_left: MotorPort::new(4),
            arm_bottom_right: MotorPort::new(5),
            intake_left: MotorPort::new(1),
            intake_right: MotorPort::new(10),
            limit_top: DigitalPort::new(3),
            limit_bottom: DigitalPort::new(2),
            colour_jumper: DigitalPort::new(9),
            ram_jumper: DigitalPort::new(12),
            diagnostics_jumper: DigitalPort::new(5),
            arm_pot: AnalogPort::new(1),
            line_left: AnalogPort::new(2),
            line_right: AnalogPort::new(3),
            ultrasonic: Ultrasonic::new(DigitalPort::new(10), DigitalPort::new(11)),
        }
    }
}

/// Arm potentiometer setpoints. The pot reads *higher* the lower the arm
/// hangs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmSetpoints {
    /// Resting on the floor stops.
    pub bottom: i32,
    /// Just clear of the bump.
    pub low: i32,
    /// Level with the large balls on the bridge.
    pub middle: i32,
    /// Scoring height.
    pub top: i32,
    /// All the way up, past the top setpoint, for the goal.
    pub full: i32,
}

impl Default for ArmSetpoints {
    fn default() -> Self {
        Self {
            bottom: 4000,
            low: 3550,
            middle: 3100,
            top: 2000,
            full: 1000,
        }
    }
}

/// Optional time limits for the primitives which otherwise wait forever on
/// their sensors.
///
/// All `None` by default: a stalled drive or a line sensor that never sees a
/// line blocks until the kernel ends the period, exactly like the unguarded
/// loops always have. Setting a limit turns a stall into
/// [`Error::Timeout`](crate::Error::Timeout), which the autonomous routine
/// escalates to its emergency stop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timeouts {
    /// Limit for [`drive_straight`](crate::motion::Chassis::drive_straight).
    pub straight: Option<Duration>,
    /// Limit for [`drive_to_line`](crate::motion::Chassis::drive_to_line).
    pub line: Option<Duration>,
    /// Limit for [`turn`](crate::motion::Chassis::turn).
    pub turn: Option<Duration>,
    /// Limit for [`arm_to`](crate::motion::Chassis::arm_to).
    pub arm: Option<Duration>,
}

/// Empirical constants of the Toss Up robot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    /// Line sensor reading at or below which a sensor is over a white line.
    pub line_threshold: i32,
    /// Line sensor reading below which the bridge seek treats the sensor as
    /// washed out rather than on a line.
    pub line_floor: i32,
    /// Drive speed while approaching a line.
    pub line_speed: i8,
    /// Reverse speed magnitude of a side that already found the line while
    /// the other side catches up.
    pub line_back_speed: i8,
    /// Correction, in speed units per encoder tick of left/right difference,
    /// applied by the straight drive.
    pub straight_gain: i32,
    /// Encoder ticks per degree of pivot turn.
    pub ticks_per_degree: f64,
    /// Counter-thrust, in speed units per unit of encoder velocity.
    pub brake_gain: f64,
    /// How long the counter-thrust is applied before the drive is stopped.
    pub brake_hold: Duration,
    /// Arm setpoints, in potentiometer counts.
    pub arm: ArmSetpoints,
    /// Potentiometer counts within which the arm counts as arrived.
    pub arm_tolerance: i32,
    /// Upward speed that keeps the arm from sagging when it is not moving.
    pub arm_idle_speed: i8,
    /// Stop lowering the arm when the bottom limit switch closes.
    ///
    /// Off on the competition robot: the switch was never verified.
    pub enforce_bottom_limit: bool,
    /// Intake roller speed.
    pub intake_speed: i8,
    /// How long an emergency stop blocks. Longer than any match period.
    pub emergency_hold: Duration,
    /// Length of one open-loop step inside the guarded seek loops.
    pub seek_step: Duration,
    /// Limit on backing away from the bump to a line.
    pub line_seek_timeout: Duration,
    /// Limit on driving under the bridge to a line.
    pub bridge_seek_timeout: Duration,
    /// Limit on creeping up to the goal.
    pub goal_approach_timeout: Duration,
    /// Closest ultrasonic distance, exclusive, in cm, at which the goal is
    /// in scoring position.
    pub goal_min_cm: u32,
    /// Farthest ultrasonic distance, exclusive, in cm.
    pub goal_max_cm: u32,
    /// How long the intake runs backwards to score.
    pub score_duration: Duration,
    /// Sensor print interval in diagnostics mode.
    pub telemetry_period: Duration,
    /// Optional limits for the unguarded primitives.
    pub timeouts: Timeouts,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            line_threshold: 300,
            line_floor: 50,
            line_speed: 25,
            line_back_speed: 15,
            straight_gain: 1,
            ticks_per_degree: 2.5,
            brake_gain: 0.24,
            brake_hold: Duration::from_millis(150),
            arm: ArmSetpoints::default(),
            arm_tolerance: 10,
            arm_idle_speed: 8,
            enforce_bottom_limit: false,
            intake_speed: 127,
            emergency_hold: Duration::from_secs(100),
            seek_step: Duration::from_millis(1),
            line_seek_timeout: Duration::from_millis(3500),
            bridge_seek_timeout: Duration::from_millis(2000),
            goal_approach_timeout: Duration::from_millis(4000),
            goal_min_cm: 10,
            goal_max_cm: 16,
            score_duration: Duration::from_secs(5),
            telemetry_period: Duration::from_millis(100),
            timeouts: Timeouts::default(),
        }
    }
}

impl Calibration {
    /// Replaces the optional primitive time limits.
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Replaces the emergency stop hold time.
    pub fn with_emergency_hold(mut self, hold: Duration) -> Self {
        self.emergency_hold = hold;
        self
    }

    /// Enables or disables the bottom limit switch on arm moves.
    pub fn with_bottom_limit(mut self, enforce: bool) -> Self {
        self.enforce_bottom_limit = enforce;
        self
    }

    /// Whether a line sensor reading is over a line.
    #[inline]
    pub fn on_line(&self, reading: i32) -> bool {
        reading <= self.line_threshold
    }

    /// Whether an ultrasonic distance puts the goal in scoring position.
    #[inline]
    pub fn goal_in_range(&self, distance_cm: u32) -> bool {
        distance_cm > self.goal_min_cm && distance_cm < self.goal_max_cm
    }
}

/// Port assignments of the ball tosser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TosserPorts {
    /// Left drive motor (2-wire); negative is forward.
    pub left_drive: MotorPort,
    /// Right drive motor (2-wire); positive is forward.
    pub right_drive: MotorPort,
    /// Trigger motor; positive fires.
    pub trigger: MotorPort,
    /// Launcher wheel motor A; positive fires.
    pub launcher_a: MotorPort,
    /// Launcher wheel motor B; negative fires.
    pub launcher_b: MotorPort,
    /// Trigger potentiometer.
    pub trigger_pot: AnalogPort,
    /// Ready handshake output to the companion computer.
    pub ready: DigitalPort,
    /// Command code inputs, least significant bit first.
    pub command: [DigitalPort; 2],
    /// Turn parameter inputs, least significant bit first.
    pub parameter: [DigitalPort; 4],
}

impl Default for TosserPorts {
    fn default() -> Self {
        Self {
            left_drive: MotorPort::new(1),
            right_drive: MotorPort::new(10),
            trigger: MotorPort::new(2),
            launcher_a: MotorPort::new(4),
            launcher_b: MotorPort::new(5),
            trigger_pot: AnalogPort::new(1),
            ready: DigitalPort::new(1),
            command: [DigitalPort::new(2), DigitalPort::new(3)],
            parameter: [
                DigitalPort::new(4),
                DigitalPort::new(5),
                DigitalPort::new(6),
                DigitalPort::new(7),
            ],
        }
    }
}

/// Empirical constants of the ball tosser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TosserCalibration {
    /// Drive speed while turning.
    pub turn_speed: i8,
    /// Turn time per unit of the 4-bit turn parameter.
    pub turn_step: Duration,
    /// Launcher wheel speed.
    pub launcher_speed: i8,
    /// Time given to the launcher wheel to spin up before the trigger moves.
    pub spin_up: Duration,
    /// Trigger motor speed.
    pub trigger_speed: i8,
    /// Trigger pot reading at or below which the ball has been released.
    pub trigger_shoot: i32,
    /// Trigger pot reading at or above which the trigger is cocked again.
    pub trigger_ready: i32,
    /// Optional limit on each trigger stroke.
    pub trigger_timeout: Option<Duration>,
}

impl Default for TosserCalibration {
    fn default() -> Self {
        Self {
            turn_speed: 127,
            turn_step: Duration::from_millis(32),
            launcher_speed: 127,
            spin_up: Duration::from_millis(500),
            trigger_speed: 127,
            trigger_shoot: 300,
            trigger_ready: 500,
            trigger_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive_where_the_robot_compares_inclusively() {
        let cal = Calibration::default();
        assert!(cal.on_line(300));
        assert!(!cal.on_line(301));
        assert!(!cal.goal_in_range(10));
        assert!(cal.goal_in_range(11));
        assert!(cal.goal_in_range(15));
        assert!(!cal.goal_in_range(16));
    }

    #[test]
    fn timeouts_are_opt_in() {
        let cal = Calibration::default();
        assert_eq!(cal.timeouts, Timeouts::default());
        assert!(cal.timeouts.straight.is_none());
        let cal = cal.with_timeouts(Timeouts {
            line: Some(Duration::from_secs(2)),
            ..Timeouts::default()
        });
        assert_eq!(cal.timeouts.line, Some(Duration::from_secs(2)));
    }
}
