use std::time::Duration;

use rstest::rstest;
use tossup::{
    adi::{Hardware, PortError},
    auton::{Outcome, TossUp},
    competition::{Competition, CompetitionStatus, Mode},
    config::{Calibration, PortMap, Timeouts},
    sim::{ArmModel, DriveModel, Event, SimHardware},
    Error, Maneuver,
};

const LINE: i32 = 150;
const TILE: i32 = 900;
const WASHED_OUT: i32 = 20;

/// A field where the line sensors always read `line` and the ultrasonic
/// sees `goal`.
fn field(red: bool, ram: bool, line: i32, goal: Option<u32>) -> SimHardware {
    let ports = PortMap::default();
    let hw = SimHardware::new()
        .with_model(DriveModel::new(ports.drive_front_left, ports.drive_front_right).into_model());
    arena(hw, red, ram, line, goal)
}

/// Sets up the arm, jumpers and sensors on top of whatever drive `hw` has.
fn arena(hw: SimHardware, red: bool, ram: bool, line: i32, goal: Option<u32>) -> SimHardware {
    let ports = PortMap::default();
    let mut hw = hw.with_model(ArmModel::new(ports.arm_bottom_right, ports.arm_pot).into_model());

    let plant = hw.plant_mut();
    plant.set_digital(ports.colour_jumper, red);
    plant.set_digital(ports.ram_jumper, !ram);
    plant.set_analog(ports.arm_pot, 4000);
    plant.set_analog(ports.line_left, line);
    plant.set_analog(ports.line_right, line);
    plant.set_ultrasonic(goal);
    hw
}

fn assert_parked(hw: &SimHardware) {
    let ports = PortMap::default();
    let cal = Calibration::default();
    let plant = hw.plant();
    for port in [
        ports.drive_front_left,
        ports.drive_mid_left,
        ports.drive_mid_right,
        ports.drive_front_right,
        ports.intake_left,
        ports.intake_right,
    ] {
        assert_eq!(plant.motor(port), 0, "{} still running", port);
    }
    assert_eq!(plant.motor(ports.arm_bottom_right), cal.arm_idle_speed);
    assert_eq!(hw.delays().last(), Some(&cal.emergency_hold));
}

#[rstest]
#[case::blue_scoring(false, false)]
#[case::blue_ramming(false, true)]
#[case::red_scoring(true, false)]
#[case::red_ramming(true, true)]
fn full_routine_completes_and_parks(#[case] red: bool, #[case] ram: bool) {
    let mut auton = TossUp::new(field(red, ram, LINE, Some(12)));
    assert_eq!(auton.run().unwrap(), Outcome::Completed);

    let hw = auton.chassis().hardware();
    assert_parked(hw);
    // Scored: intake reversed for the full five seconds.
    assert!(hw.delays().contains(&Duration::from_secs(5)));
    let ports = PortMap::default();
    assert!(hw.events().iter().any(|event| matches!(
        event,
        Event::MotorSet { port, speed: 127, .. } if *port == ports.intake_left
    )));
}

#[test]
fn lost_line_halts_the_routine() {
    let mut auton = TossUp::new(field(false, true, TILE, Some(12)));
    assert_eq!(
        auton.run().unwrap(),
        Outcome::Halted(Maneuver::LineSeek)
    );

    let hw = auton.chassis().hardware();
    assert_parked(hw);
    // Nothing after the seek ran: the arm never went back up to low.
    let delays = hw.delays();
    assert!(!delays.contains(&Duration::from_millis(300)));
}

#[test]
fn washed_out_sensor_never_finds_the_bridge() {
    let mut auton = TossUp::new(field(true, true, WASHED_OUT, Some(12)));
    assert_eq!(
        auton.run().unwrap(),
        Outcome::Halted(Maneuver::BridgeSeek)
    );
    assert_parked(auton.chassis().hardware());
}

#[rstest]
#[case::no_echo(None)]
#[case::too_close(Some(10))]
#[case::too_far(Some(16))]
fn missing_goal_halts_before_scoring(#[case] goal: Option<u32>) {
    let mut auton = TossUp::new(field(false, false, LINE, goal));
    assert_eq!(
        auton.run().unwrap(),
        Outcome::Halted(Maneuver::GoalApproach)
    );

    let hw = auton.chassis().hardware();
    assert_parked(hw);
    assert!(!hw.delays().contains(&Duration::from_secs(5)));
}

#[test]
fn stalled_drive_times_out_the_straight_drive() {
    let cal = Calibration {
        timeouts: Timeouts {
            straight: Some(Duration::from_millis(500)),
            ..Timeouts::default()
        },
        ..Calibration::default()
    };
    // No drive model: the encoders never move.
    let hw = arena(SimHardware::new(), false, false, LINE, Some(12));
    let mut auton = TossUp::with_config(hw, PortMap::default(), cal);
    assert_eq!(
        auton.run().unwrap(),
        Outcome::Halted(Maneuver::DriveStraight)
    );

    let hw = auton.chassis().hardware();
    assert_parked(hw);
    assert!(!hw.delays().contains(&Duration::from_secs(5)));
}

#[test]
fn sensor_fault_ends_the_routine_without_stopping() {
    let ports = PortMap::default();
    let mut hw = field(false, true, LINE, Some(12));
    hw.plant_mut()
        .set_analog_fault(ports.line_right, Some(PortError::Unknown(19)));
    let mut auton = TossUp::new(hw);

    assert!(matches!(auton.run(), Err(Error::System(19))));
    let hw = auton.chassis().hardware();
    assert!(!hw.delays().contains(&Calibration::default().emergency_hold));
    // Still creeping backwards from the seek.
    assert_ne!(hw.plant().motor(ports.drive_front_left), 0);
}

#[test]
#[should_panic(expected = "time limit")]
fn diagnostics_jumper_prints_forever() {
    let ports = PortMap::default();
    let mut hw = SimHardware::new().with_time_limit(Duration::from_secs(2));
    hw.plant_mut().set_digital(ports.diagnostics_jumper, false);
    let mut auton = TossUp::new(hw);
    let _ = auton.run();
}

#[test]
fn competition_runs_the_routine_in_autonomous() {
    let mut competition = Competition::new(TossUp::new(field(false, true, LINE, Some(13))));
    assert_eq!(
        competition.enter(CompetitionStatus::DISABLED).unwrap(),
        Mode::Disabled
    );
    assert!(competition.robot().chassis().hardware().delays().is_empty());

    assert_eq!(
        competition
            .enter(CompetitionStatus::CONNECTED | CompetitionStatus::AUTONOMOUS)
            .unwrap(),
        Mode::Autonomous
    );
    let hw = competition.robot().chassis().hardware();
    assert_parked(hw);
    assert!(hw.now().as_millis() > 100_000);
}
