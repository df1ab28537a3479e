//! Simulated hardware for running the robot programs on a desk.
//!
//! [`SimHardware`] keeps a [`Plant`] (the state of every port) and a trace of
//! everything the program commanded. Time only moves when the program
//! blocks: each sensor read costs [`SimHardware::with_read_latency`] and a
//! delay costs its duration. While time moves, the plant [`Model`]s run in
//! one millisecond steps and update the sensors from the motor commands.
//!
//! Without a model nothing moves: encoders stay where they are, the arm
//! never reaches its setpoint and so on, which is what the timeout paths
//! need.

use alloc::{boxed::Box, vec::Vec};
use core::time::Duration;

use crate::{
    adi::{
        AnalogPort, DigitalPort, EncoderError, Hardware, MotorPort, PortError, Side, Ultrasonic,
        UltrasonicError,
    },
    rtos::Instant,
};

/// Encoder ticks per wheel revolution.
pub const TICKS_PER_REV: f64 = 620.0;

const STEP: Duration = Duration::from_millis(1);

/// Evolves the plant over one time step. Runs after the clock has moved.
pub type Model = Box<dyn FnMut(&mut Plant, Duration)>;

/// Something the program did to the hardware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// A motor was given a speed.
    MotorSet {
        /// When.
        at: Instant,
        /// Which motor.
        port: MotorPort,
        /// The commanded speed.
        speed: i8,
    },
    /// A motor was stopped.
    MotorStop {
        /// When.
        at: Instant,
        /// Which motor.
        port: MotorPort,
    },
    /// A digital output was written.
    DigitalWrite {
        /// When.
        at: Instant,
        /// Which pin.
        port: DigitalPort,
        /// The level written.
        value: bool,
    },
    /// An encoder was zeroed.
    EncoderReset {
        /// When.
        at: Instant,
        /// Which encoder.
        side: Side,
    },
    /// The program blocked.
    Delay {
        /// When the delay started.
        at: Instant,
        /// How long it lasted.
        duration: Duration,
    },
}

/// The simulated state of every port.
#[derive(Clone, Debug, PartialEq)]
pub struct Plant {
    now: Instant,
    motors: [i8; MotorPort::MAX as usize + 1],
    analog: [i32; AnalogPort::MAX as usize + 1],
    digital_in: [bool; DigitalPort::MAX as usize + 1],
    digital_out: [Option<bool>; DigitalPort::MAX as usize + 1],
    encoders: [i32; 2],
    velocity: [Option<i32>; 2],
    analog_faults: [Option<PortError>; AnalogPort::MAX as usize + 1],
    ultrasonic: Result<u32, UltrasonicError>,
}

impl Default for Plant {
    fn default() -> Self {
        Self {
            now: Instant::ZERO,
            motors: [0; MotorPort::MAX as usize + 1],
            analog: [0; AnalogPort::MAX as usize + 1],
            // Pull-ups: switches released, jumpers out.
            digital_in: [true; DigitalPort::MAX as usize + 1],
            digital_out: [None; DigitalPort::MAX as usize + 1],
            encoders: [0; 2],
            velocity: [Some(0); 2],
            analog_faults: [None; AnalogPort::MAX as usize + 1],
            ultrasonic: Err(UltrasonicError::NoReading),
        }
    }
}

impl Plant {
    #[inline]
    /// Simulated time since program start.
    pub fn now(&self) -> Instant {
        self.now
    }

    #[inline]
    /// The speed a motor is currently running at.
    pub fn motor(&self, port: MotorPort) -> i8 {
        self.motors[port.index()]
    }

    #[inline]
    /// All motor speeds, indexed by port number. Index 0 is unused.
    pub fn motors(&self) -> [i8; MotorPort::MAX as usize + 1] {
        self.motors
    }

    #[inline]
    /// Raw encoder count.
    pub fn encoder(&self, side: Side) -> i32 {
        self.encoders[side.address()]
    }

    /// Sets a raw encoder count.
    pub fn set_encoder(&mut self, side: Side, raw: i32) {
        self.encoders[side.address()] = raw;
    }

    /// Sets a raw encoder velocity; `None` makes velocity reads fail.
    pub fn set_velocity(&mut self, side: Side, raw: Option<i32>) {
        self.velocity[side.address()] = raw;
    }

    #[inline]
    /// Current analog input level.
    pub fn analog(&self, port: AnalogPort) -> i32 {
        self.analog[port.index()]
    }

    /// Sets an analog input level.
    pub fn set_analog(&mut self, port: AnalogPort, value: i32) {
        self.analog[port.index()] = value;
    }

    /// Makes reads of an analog port fail with `fault`; `None` clears it.
    pub fn set_analog_fault(&mut self, port: AnalogPort, fault: Option<PortError>) {
        self.analog_faults[port.index()] = fault;
    }

    #[inline]
    /// Current digital input level.
    pub fn digital(&self, port: DigitalPort) -> bool {
        self.digital_in[port.index()]
    }

    /// Sets a digital input level. Inputs idle high.
    pub fn set_digital(&mut self, port: DigitalPort, value: bool) {
        self.digital_in[port.index()] = value;
    }

    #[inline]
    /// The last level written to a digital output, if any.
    pub fn digital_output(&self, port: DigitalPort) -> Option<bool> {
        self.digital_out[port.index()]
    }

    /// Sets the ultrasonic distance in centimetres; `None` for no echo.
    pub fn set_ultrasonic(&mut self, distance_cm: Option<u32>) {
        self.ultrasonic = distance_cm.ok_or(UltrasonicError::NoReading);
    }

    /// Makes ultrasonic reads fail with `fault`.
    pub fn set_ultrasonic_fault(&mut self, fault: UltrasonicError) {
        self.ultrasonic = Err(fault);
    }
}

/// Simulated hardware.
pub struct SimHardware {
    plant: Plant,
    models: Vec<Model>,
    events: Vec<Event>,
    read_latency: Duration,
    time_limit: Instant,
}

impl Default for SimHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHardware {
    /// Creates a simulator with an idle plant, 1 ms reads and a one hour
    /// time limit.
    pub fn new() -> Self {
        Self {
            plant: Plant::default(),
            models: Vec::new(),
            events: Vec::new(),
            read_latency: STEP,
            time_limit: Instant::from_millis(3_600_000),
        }
    }

    /// Adds a plant model. Models run in the order they were added.
    pub fn with_model(mut self, model: Model) -> Self {
        self.models.push(model);
        self
    }

    /// Sets how much time each sensor read takes.
    pub fn with_read_latency(mut self, latency: Duration) -> Self {
        self.read_latency = latency;
        self
    }

    /// Sets the simulated time past which the simulator panics. Stops a
    /// program stuck in a loop from hanging the test.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Instant::ZERO + limit;
        self
    }

    #[inline]
    /// The plant.
    pub fn plant(&self) -> &Plant {
        &self.plant
    }

    #[inline]
    /// The plant, mutably, for setting up sensor levels.
    pub fn plant_mut(&mut self) -> &mut Plant {
        &mut self.plant
    }

    #[inline]
    /// Everything commanded so far, oldest first.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The durations of all delays so far.
    pub fn delays(&self) -> Vec<Duration> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Delay { duration, .. } => Some(*duration),
                _ => None,
            })
            .collect()
    }

    /// The first speed a motor was given.
    pub fn first_speed(&self, port: MotorPort) -> Option<i8> {
        self.events.iter().find_map(|event| match event {
            Event::MotorSet { port: p, speed, .. } if *p == port => Some(*speed),
            _ => None,
        })
    }

    /// Runs the clock forward, stepping the models.
    pub fn advance(&mut self, duration: Duration) {
        let mut remaining = duration;
        while remaining > Duration::ZERO {
            let step = remaining.min(STEP);
            self.plant.now += step;
            for model in self.models.iter_mut() {
                model(&mut self.plant, step);
            }
            remaining -= step;
        }
        if self.plant.now > self.time_limit {
            panic!("simulation ran past its time limit at {}", self.plant.now);
        }
    }

    fn read(&mut self) {
        let latency = self.read_latency;
        self.advance(latency);
    }

    fn record(&mut self, event: Event) {
        self.events.push(event);
    }
}

impl Hardware for SimHardware {
    fn digital_read(&mut self, port: DigitalPort) -> Result<bool, PortError> {
        self.read();
        Ok(self.plant.digital(port))
    }

    fn digital_write(&mut self, port: DigitalPort, value: bool) -> Result<(), PortError> {
        self.plant.digital_out[port.index()] = Some(value);
        let at = self.plant.now;
        self.record(Event::DigitalWrite { at, port, value });
        Ok(())
    }

    fn analog_read(&mut self, port: AnalogPort) -> Result<i32, PortError> {
        self.read();
        match self.plant.analog_faults[port.index()] {
            Some(fault) => Err(fault),
            None => Ok(self.plant.analog(port)),
        }
    }

    fn motor_set(&mut self, port: MotorPort, speed: i8) -> Result<(), PortError> {
        self.plant.motors[port.index()] = speed;
        let at = self.plant.now;
        self.record(Event::MotorSet { at, port, speed });
        Ok(())
    }

    fn motor_stop(&mut self, port: MotorPort) -> Result<(), PortError> {
        self.plant.motors[port.index()] = 0;
        let at = self.plant.now;
        self.record(Event::MotorStop { at, port });
        Ok(())
    }

    fn encoder_get(&mut self, side: Side) -> Result<i32, EncoderError> {
        self.read();
        Ok(self.plant.encoder(side))
    }

    fn encoder_reset(&mut self, side: Side) -> Result<(), EncoderError> {
        self.plant.set_encoder(side, 0);
        let at = self.plant.now;
        self.record(Event::EncoderReset { at, side });
        Ok(())
    }

    fn encoder_velocity(&mut self, side: Side) -> Result<i32, EncoderError> {
        self.read();
        self.plant.velocity[side.address()].ok_or(EncoderError::NoVelocity(side))
    }

    fn ultrasonic_get(&mut self, _sensor: Ultrasonic) -> Result<u32, UltrasonicError> {
        self.read();
        self.plant.ultrasonic
    }

    fn now(&self) -> Instant {
        self.plant.now
    }

    fn delay(&mut self, duration: Duration) {
        let at = self.plant.now;
        self.record(Event::Delay { at, duration });
        self.advance(duration);
    }
}

/// A differential drive: each side's encoder advances in proportion to the
/// speed of one motor of that side.
///
/// The right motors and the left encoder are mounted reversed, as on the
/// Toss Up robot.
#[derive(Clone, Debug, PartialEq)]
pub struct DriveModel {
    left: MotorPort,
    right: MotorPort,
    gains: [f64; 2],
    carry: [f64; 2],
}

impl DriveModel {
    /// Default ticks per millisecond per unit of motor speed.
    pub const GAIN: f64 = 0.02;

    /// Creates a drive watching one motor per side.
    pub fn new(left: MotorPort, right: MotorPort) -> Self {
        Self {
            left,
            right,
            gains: [Self::GAIN; 2],
            carry: [0.0; 2],
        }
    }

    /// Sets the ticks per millisecond per unit speed of each side, to
    /// model an uneven drive.
    pub fn with_gains(mut self, left: f64, right: f64) -> Self {
        self.gains = [left, right];
        self
    }

    /// Advances the encoders by `dt` at the current motor speeds.
    pub fn step(&mut self, plant: &mut Plant, dt: Duration) {
        let ms = dt.as_secs_f64() * 1000.0;
        for side in Side::BOTH {
            let i = side.address();
            let forward = match side {
                Side::Left => plant.motor(self.left) as f64,
                Side::Right => -(plant.motor(self.right) as f64),
            };
            let rate = forward * self.gains[i];

            self.carry[i] += rate * ms;
            let whole = self.carry[i] as i32;
            self.carry[i] -= whole as f64;

            let raw = plant.encoder(side).wrapping_add(side.normalize(whole));
            plant.set_encoder(side, raw);
            let rpm = rate * 1000.0 * 60.0 / TICKS_PER_REV;
            plant.set_velocity(side, Some(side.normalize(rpm as i32)));
        }
    }

    /// Boxes the drive for [`SimHardware::with_model`].
    pub fn into_model(mut self) -> Model {
        Box::new(move |plant: &mut Plant, dt: Duration| self.step(plant, dt))
    }
}

/// An arm whose potentiometer falls as the arm rises, driven by one motor
/// where positive speed is up.
#[derive(Clone, Debug, PartialEq)]
pub struct ArmModel {
    motor: MotorPort,
    pot: AnalogPort,
    gain: f64,
    carry: f64,
}

impl ArmModel {
    /// Default pot counts per millisecond per unit of motor speed.
    pub const GAIN: f64 = 0.2;

    /// Highest potentiometer reading.
    pub const POT_MAX: i32 = 4095;

    /// Creates an arm driven by `motor` and measured by `pot`.
    pub fn new(motor: MotorPort, pot: AnalogPort) -> Self {
        Self {
            motor,
            pot,
            gain: Self::GAIN,
            carry: 0.0,
        }
    }

    /// Moves the pot by `dt` at the current motor speed.
    pub fn step(&mut self, plant: &mut Plant, dt: Duration) {
        let ms = dt.as_secs_f64() * 1000.0;
        self.carry += plant.motor(self.motor) as f64 * self.gain * ms;
        let whole = self.carry as i32;
        self.carry -= whole as f64;

        let pot = plant.analog(self.pot).saturating_sub(whole);
        plant.set_analog(self.pot, pot.max(0).min(Self::POT_MAX));
    }

    /// Boxes the arm for [`SimHardware::with_model`].
    pub fn into_model(mut self) -> Model {
        Box::new(move |plant: &mut Plant, dt: Duration| self.step(plant, dt))
    }
}
