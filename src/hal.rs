//! hal.rs — collaborator contracts consumed by the power sequencer
//!
//! Each hardware resource is an owned handle moved into the sequencer.
//! Timer, channel and GPIO numbers are bound into the handle when it is
//! created, so the traits only carry what changes at runtime.

use core::fmt;

use embedded_hal::digital::OutputPin;

use crate::duty::DutyValue;

/// Electrical setup of a digital output.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    pub pull_up: bool,
    pub pull_down: bool,
    pub mode: OutputMode,
}

impl PinConfig {
    /// Relay gate: push-pull, pulled down so the relay stays open while floating.
    pub const RELAY: PinConfig = PinConfig {
        pull_up: false,
        pull_down: true,
        mode: OutputMode::PushPull,
    };
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputMode {
    PushPull,
    OpenDrain,
}

/// A digital output that can be (re)configured before use.
pub trait RelayPin: OutputPin {
    fn configure(&mut self, config: &PinConfig) -> Result<(), Self::Error>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Let the driver pick a source that can reach the requested frequency.
    Auto,
    /// Main system clock.
    System,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    pub resolution_bits: u8,
    pub frequency_hz: u32,
    pub clock: ClockSource,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Duty applied as soon as the channel starts.
    pub initial_duty: DutyValue,
    /// Counter value at which the output goes high.
    pub hpoint: u32,
}

/// PWM timer + channel driving the servo signal.
///
/// `set_duty` only stages a value; it reaches the output on `commit_duty`.
pub trait PwmDriver {
    type Error: fmt::Debug;

    fn configure_timer(&mut self, config: &TimerConfig) -> Result<(), Self::Error>;

    fn configure_channel(&mut self, config: &ChannelConfig) -> Result<(), Self::Error>;

    fn set_duty(&mut self, duty: DutyValue) -> Result<(), Self::Error>;

    fn commit_duty(&mut self) -> Result<(), Self::Error>;
}

/// Request handed to [`DeepSleep`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SleepRequest {
    duration_us: u64,
}

impl SleepRequest {
    pub const fn from_secs(secs: u32) -> Self {
        Self {
            duration_us: secs as u64 * 1_000_000,
        }
    }

    pub const fn as_micros(&self) -> u64 {
        self.duration_us
    }

    pub const fn as_secs(&self) -> u64 {
        self.duration_us / 1_000_000
    }
}

/// Device-wide low power state.
///
/// On hardware an implementation must not return: the device restarts from
/// its entry point once the wake timer elapses. Host doubles may return, in
/// which case the sequencer reports the request it issued.
pub trait DeepSleep {
    fn enter_deep_sleep(&mut self, request: SleepRequest);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_request_units() {
        let request = SleepRequest::from_secs(900);
        assert_eq!(request.as_micros(), 900_000_000);
        assert_eq!(request.as_secs(), 900);
    }

    #[test]
    fn test_sleep_request_does_not_overflow() {
        let request = SleepRequest::from_secs(u32::MAX);
        assert_eq!(request.as_micros(), u32::MAX as u64 * 1_000_000);
    }
}
