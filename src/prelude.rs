//! Convenient to `use` common components.

pub use crate::adi::*;
pub use crate::auton::*;
pub use crate::competition::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::motion::*;
pub use crate::opcontrol::*;
pub use crate::robot::*;
pub use crate::rtos::*;
