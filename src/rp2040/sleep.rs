//! sleep.rs — deep sleep emulated with a timed wait and a watchdog reset
//!
//! The RP2040 has no timer-woken deep sleep that restarts the firmware, so
//! the wait happens in place and the watchdog then reboots the chip. Either
//! way execution resumes from the reset vector.

use embassy_rp::watchdog::Watchdog;
use embassy_time::{Duration, block_for};

use crate::hal::{DeepSleep, SleepRequest};

pub struct WatchdogSleep {
    watchdog: Watchdog,
}

impl WatchdogSleep {
    pub fn new(watchdog: Watchdog) -> Self {
        Self { watchdog }
    }
}

impl DeepSleep for WatchdogSleep {
    fn enter_deep_sleep(&mut self, request: SleepRequest) {
        block_for(Duration::from_micros(request.as_micros()));
        self.watchdog.trigger_reset();
        loop {
            core::hint::spin_loop();
        }
    }
}
