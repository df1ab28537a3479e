//! For use with [`Competition`](crate::competition::Competition).

use log::{error, info};

use crate::{
    adi::Hardware,
    auton::{Outcome, TossUp},
    error::Error,
    opcontrol::BallTosser,
};

/// A trait representing a competition-ready VEX Robot.
pub trait Robot {
    /// Runs once, before the first competition mode.
    fn initialize(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Runs during the autonomous period.
    fn autonomous(&mut self) -> Result<(), Error> {
        info!("autonomous");
        Ok(())
    }

    /// Runs during the opcontrol period.
    fn opcontrol(&mut self) -> Result<(), Error> {
        info!("opcontrol");
        Ok(())
    }

    /// Runs when the robot is disabled.
    fn disabled(&mut self) -> Result<(), Error> {
        info!("disabled");
        Ok(())
    }
}

impl<H: Hardware> Robot for TossUp<H> {
    fn initialize(&mut self) -> Result<(), Error> {
        self.chassis_mut().clear_encoders()
    }

    fn autonomous(&mut self) -> Result<(), Error> {
        match self.run()? {
            Outcome::Completed => info!("autonomous completed"),
            Outcome::Halted(maneuver) => error!("autonomous halted: {} timed out", maneuver),
        }
        Ok(())
    }
}

impl<H: Hardware> Robot for BallTosser<H> {
    fn opcontrol(&mut self) -> Result<(), Error> {
        match self.run()? {}
    }
}
