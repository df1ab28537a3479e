use std::{cell::Cell, rc::Rc, time::Duration};

use tossup::{
    adi::{Hardware, Side},
    config::{Calibration, PortMap},
    motion::{Alliance, Chassis, Direction},
    sim::{DriveModel, Plant, SimHardware},
};

fn drive(ports: &PortMap) -> DriveModel {
    DriveModel::new(ports.drive_front_left, ports.drive_front_right)
}

#[test]
fn straight_drive_holds_a_faster_left_side_in_check() {
    let ports = PortMap::default();
    let divergence = Rc::new(Cell::new(0));
    let worst = divergence.clone();

    let hw = SimHardware::new()
        .with_model(drive(&ports).with_gains(0.022, 0.02).into_model())
        .with_model(Box::new(move |plant: &mut Plant, _| {
            let left = Side::Left.normalize(plant.encoder(Side::Left));
            let right = plant.encoder(Side::Right);
            worst.set(worst.get().max((left - right).abs()));
        }));
    let mut chassis = Chassis::new(hw);
    chassis.drive_straight(1200, 60).unwrap();

    assert!(divergence.get() < 10, "sides diverged by {}", divergence.get());
    let plant = chassis.hardware().plant();
    assert_eq!(plant.motor(ports.drive_front_left), 0);
    assert_eq!(plant.motor(ports.drive_mid_right), 0);
}

#[test]
fn primitives_run_on_a_borrowed_handle() {
    let ports = PortMap::default();
    let mut hw = SimHardware::new().with_model(drive(&ports).into_model());
    {
        let mut chassis = Chassis::new(&mut hw);
        chassis.turn(45, 60, Alliance::Blue).unwrap();
        chassis.brake().unwrap();
    }
    assert!(hw.plant().encoder(Side::Right) >= 112);
    assert_eq!(hw.delays(), vec![Duration::from_millis(150)]);
    assert!(hw.now().as_millis() > 150);
}

#[test]
fn line_follow_up_after_a_straight_drive() {
    let ports = PortMap::default();
    let travelled_to_line = 300;
    let hw = SimHardware::new()
        .with_model(drive(&ports).into_model())
        .with_model(Box::new(move |plant: &mut Plant, _| {
            let level = |side: Side| {
                if side.normalize(plant.encoder(side)) >= travelled_to_line {
                    120
                } else {
                    700
                }
            };
            let (left, right) = (level(Side::Left), level(Side::Right));
            plant.set_analog(ports.line_left, left);
            plant.set_analog(ports.line_right, right);
        }));
    let mut chassis = Chassis::new(hw);

    chassis.drive_straight(100, 40).unwrap();
    chassis.drive_to_line(Direction::Forward).unwrap();

    let cal = Calibration::default();
    let hw = chassis.hardware();
    assert_eq!(hw.delays(), vec![cal.brake_hold]);
    let travelled = Side::Left.normalize(hw.plant().encoder(Side::Left));
    assert!(travelled > 250, "stopped short at {}", travelled);
    let plant = hw.plant();
    assert_eq!(plant.motor(ports.drive_front_left), 0);
    assert_eq!(plant.motor(ports.drive_front_right), 0);
}
