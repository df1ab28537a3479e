//! Support for logging via the [log](https://docs.rs/log/*/log/) crate.

#![cfg(feature = "logging")]
#![cfg_attr(docsrs, doc(cfg(feature = "logging")))]

use alloc::{format, string::String};
use libc_print::libc_ewrite;
use log::{info, set_logger, set_max_level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::{Mutex, Once};

use crate::rtos::Instant;

static LOGGER: Once<StderrLogger> = Once::new();

/// Writes log records to stderr, each stamped with the time since program
/// start.
pub struct StderrLogger {
    level: LevelFilter,
    clock: fn() -> Instant,
    mtx: Mutex<()>,
}

impl StderrLogger {
    /// Installs the logger. `clock` supplies the timestamps; on the robot
    /// that is the kernel's millisecond counter.
    ///
    /// Fails if a logger is already installed.
    pub fn init(level: LevelFilter, clock: fn() -> Instant) -> Result<(), SetLoggerError> {
        set_logger(LOGGER.call_once(|| Self {
            level,
            clock,
            mtx: Mutex::new(()),
        }))?;
        set_max_level(level);
        info!("Initialized logging at level {}", level);
        Ok(())
    }
}

fn line(now: Instant, record: &Record) -> String {
    format!(
        "{} {} [{}] {}\n",
        now,
        record.level(),
        record.target(),
        record.args(),
    )
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let line = line((self.clock)(), record);
            let _lock = self.mtx.lock();
            libc_ewrite!(line.as_str());
        }
    }

    fn flush(&self) {}
}
