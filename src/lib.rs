#![cfg_attr(not(test), no_std)]

//! Timed servo sweep behind a power relay.
//!
//! One run centers the servo with the relay open, closes the relay, sweeps
//! one sine cycle with a dwell at the top, opens the relay and requests deep
//! sleep. Hardware is reached only through the traits in [`hal`]; the
//! `rp2040` feature provides implementations on embassy-rp.

mod logging;

pub mod config;
pub mod duty;
pub mod hal;
pub mod peak;
pub mod sequencer;
pub mod slice;
pub mod trajectory;

#[cfg(feature = "rp2040")]
pub mod rp2040;

#[cfg(test)]
mod mock;

pub use config::{SequenceTiming, ServoTiming, SweepConfig, TrajectorySpec};
pub use duty::{DutyValue, NormalizedPosition, RangeError, position_to_duty, position_to_duty_checked};
pub use hal::{DeepSleep, PwmDriver, RelayPin, SleepRequest};
pub use peak::{PEAK_TOLERANCE, PeakDetection, is_at_peak};
pub use sequencer::{PowerSequencer, PowerState, RunReport, SequenceError, SequencerState, SweepSummary};
pub use trajectory::{Trajectory, TrajectoryStep};
