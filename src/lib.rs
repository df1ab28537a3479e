//! Competition programs for a VEX Cortex robot pair: the Toss Up scoring
//! robot's autonomous routine and the ball tosser's operator-control loop.
//!
//! Everything talks to the robot through the [`Hardware`](adi::Hardware)
//! trait, so the same code runs against the PROS bindings on the Cortex and
//! against the simulator in `sim` (behind the `sim` feature) on a desk.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

extern crate alloc;

mod error;

pub mod adi;
pub mod auton;
pub mod competition;
pub mod config;
pub mod logging;
pub mod motion;
pub mod opcontrol;
pub mod prelude;
pub mod robot;
pub mod rtos;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use error::*;
