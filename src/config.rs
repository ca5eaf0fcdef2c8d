//! config.rs — compile-time parameters of the sweep
//!
//! Nothing here is adjustable at runtime. The firmware uses
//! [`SweepConfig::DEFAULT`]; tests build variants from the same constants.

use crate::hal::{ClockSource, PinConfig, SleepRequest, TimerConfig};
use crate::peak::{PEAK_TOLERANCE, PeakDetection};

/// Servo signal timing (all in microseconds / Hz / bits).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ServoTiming {
    /// Pulse width at the center position (e.g. 1500).
    pub center_pulse_us: u32,

    /// Pulse width offset at either extreme (e.g. 600, giving 900..2100).
    pub direction_range_us: u32,

    /// PWM frame frequency (e.g. 50 for a 20 ms frame).
    pub frequency_hz: u32,

    /// PWM timer resolution.
    pub resolution_bits: u8,
}

impl ServoTiming {
    /// Standard hobby servo on a 20-bit, 50 Hz timer.
    pub const HOBBY_STANDARD: ServoTiming = ServoTiming {
        center_pulse_us: 1500,
        direction_range_us: 600,
        frequency_hz: 50,
        resolution_bits: 20,
    };

    pub const fn timer_config(&self) -> TimerConfig {
        TimerConfig {
            resolution_bits: self.resolution_bits,
            frequency_hz: self.frequency_hz,
            clock: ClockSource::Auto,
        }
    }
}

/// Angular range and step of one sweep, in degrees.
///
/// Angles are kept in degrees so every sample angle is exact in `f32`; they
/// are converted to radians per sample.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrajectorySpec {
    /// First sample angle (inclusive).
    pub start_deg: f32,

    /// Upper bound (exclusive).
    pub end_deg: f32,

    /// Increment between samples.
    pub step_deg: f32,
}

impl TrajectorySpec {
    /// One full sine cycle from trough to trough, -π/2 .. 3π/2 in 0.5° steps.
    pub const FULL_CYCLE: TrajectorySpec = TrajectorySpec {
        start_deg: -90.0,
        end_deg: 270.0,
        step_deg: 0.5,
    };

    /// Number of samples, ⌈(end - start) / step⌉. Zero for degenerate specs.
    pub fn sample_count(&self) -> u32 {
        if !(self.step_deg > 0.0) || !(self.end_deg > self.start_deg) {
            return 0;
        }
        libm::ceilf((self.end_deg - self.start_deg) / self.step_deg) as u32
    }
}

/// Fixed waits of the power sequence, in milliseconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SequenceTiming {
    /// Wait after centering, before the relay closes.
    pub center_settle_ms: u32,

    /// Wait after the relay closes, before motion starts.
    pub power_settle_ms: u32,

    /// Wait before every trajectory sample.
    pub step_ms: u32,

    /// Hold time at a detected peak.
    pub dwell_ms: u32,

    /// Wait after the relay opens, before deep sleep.
    pub release_settle_ms: u32,

    /// Deep sleep duration.
    pub sleep_secs: u32,
}

impl SequenceTiming {
    pub const DEFAULT: SequenceTiming = SequenceTiming {
        center_settle_ms: 5000,
        power_settle_ms: 1000,
        step_ms: 10,
        dwell_ms: 3000,
        release_settle_ms: 100,
        sleep_secs: 15 * 60,
    };

    pub const fn sleep_request(&self) -> SleepRequest {
        SleepRequest::from_secs(self.sleep_secs)
    }
}

/// Everything the power sequencer needs to know.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SweepConfig {
    pub servo: ServoTiming,
    pub trajectory: TrajectorySpec,
    pub timing: SequenceTiming,
    pub peak: PeakDetection,
    pub relay_pin: PinConfig,
}

impl SweepConfig {
    pub const DEFAULT: SweepConfig = SweepConfig {
        servo: ServoTiming::HOBBY_STANDARD,
        trajectory: TrajectorySpec::FULL_CYCLE,
        timing: SequenceTiming::DEFAULT,
        peak: PeakDetection::Tolerance(PEAK_TOLERANCE),
        relay_pin: PinConfig::RELAY,
    };
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
