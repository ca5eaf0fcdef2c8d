//! Firmware entry: one sweep, then deep sleep until the watchdog restarts us.
//!
//! Wiring: relay gate on GPIO 2, servo signal on GPIO 12 (PWM slice 6 A).
#![no_std]
#![no_main]

use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::gpio::Flex;
use embassy_rp::pwm::{self, Pwm};
use embassy_rp::watchdog::Watchdog;
use embassy_time::Delay;
use panic_probe as _;
use servo_sweep::rp2040::{FlexRelay, SlicePwm, WatchdogSleep};
use servo_sweep::{PowerSequencer, SweepConfig, log_error, log_info};

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    log_info!("servo sweep starting");

    let relay = FlexRelay::new(Flex::new(p.PIN_2));
    let servo = SlicePwm::new(Pwm::new_output_a(p.PWM_SLICE6, p.PIN_12, pwm::Config::default()));
    let sleeper = WatchdogSleep::new(Watchdog::new(p.WATCHDOG));

    // Blocking on purpose: nothing else runs on this device
    let sequencer = PowerSequencer::new(relay, servo, Delay, sleeper, &SweepConfig::DEFAULT);
    if let Err(error) = sequencer.run() {
        log_error!("sweep aborted: {}", error);
        panic!("sweep aborted");
    }

    // WatchdogSleep reboots the chip, so getting here means the reset failed
    panic!("deep sleep returned");
}
