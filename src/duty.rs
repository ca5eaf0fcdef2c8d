//! duty.rs — normalized actuator position to PWM duty count

use core::fmt;

use crate::config::ServoTiming;

/// Actuator position in `[-1.0, 1.0]`.
///
/// -1 is the left extreme, 0 the center and 1 the right extreme.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NormalizedPosition(f32);

impl NormalizedPosition {
    pub const LEFT: Self = Self(-1.0);
    pub const CENTER: Self = Self(0.0);
    pub const RIGHT: Self = Self(1.0);

    /// Validate `value`. NaN and anything outside `[-1, 1]` is rejected.
    pub fn new(value: f32) -> Result<Self, RangeError> {
        if (-1.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RangeError { value })
        }
    }

    /// Clamp `value` into range. NaN maps to center.
    pub fn saturating(value: f32) -> Self {
        if value.is_nan() {
            return Self::CENTER;
        }
        Self(value.clamp(-1.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl fmt::Display for NormalizedPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("Position {value} is outside [-1, 1]")]
pub struct RangeError {
    pub value: f32,
}

/// PWM duty count at the configured timer resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyValue(pub u32);

impl DutyValue {
    pub fn counts(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DutyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Map a position to a duty value using the default hobby-servo timing.
pub fn position_to_duty(position: NormalizedPosition) -> DutyValue {
    ServoTiming::HOBBY_STANDARD.duty_for(position)
}

/// Validate a raw position and map it in one step.
pub fn position_to_duty_checked(position: f32) -> Result<DutyValue, RangeError> {
    NormalizedPosition::new(position).map(position_to_duty)
}

impl ServoTiming {
    /// Full frame period in microseconds (20_000 for 50 Hz).
    pub const fn frame_us(&self) -> u32 {
        1_000_000 / self.frequency_hz
    }

    /// Duty counts per microsecond of pulse width.
    ///
    /// Integer arithmetic: 2^20 / 20_000 truncates to 52.
    pub const fn duty_per_microsecond(&self) -> u32 {
        (1u32 << self.resolution_bits) / self.frame_us()
    }

    /// Largest duty count the timer accepts.
    pub const fn max_duty(&self) -> u32 {
        (1u32 << self.resolution_bits) - 1
    }

    /// Pulse width for `position`, truncated to whole microseconds.
    pub fn pulse_width_us(&self, position: NormalizedPosition) -> u32 {
        (position.value() * self.direction_range_us as f32 + self.center_pulse_us as f32) as u32
    }

    pub fn duty_for(&self, position: NormalizedPosition) -> DutyValue {
        DutyValue(self.pulse_width_us(position) * self.duty_per_microsecond())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duty_per_microsecond_is_truncated() {
        let timing = ServoTiming::HOBBY_STANDARD;
        assert_eq!(timing.frame_us(), 20_000);
        assert_eq!(timing.duty_per_microsecond(), 52);
        assert_eq!(timing.max_duty(), 1_048_575);
    }

    #[test]
    fn test_center_and_extremes() {
        assert_eq!(position_to_duty(NormalizedPosition::CENTER), DutyValue(1500 * 52));
        assert_eq!(position_to_duty(NormalizedPosition::LEFT), DutyValue(900 * 52));
        assert_eq!(position_to_duty(NormalizedPosition::RIGHT), DutyValue(2100 * 52));

        let timing = ServoTiming::HOBBY_STANDARD;
        assert_eq!(timing.pulse_width_us(NormalizedPosition::LEFT), 900);
        assert_eq!(timing.pulse_width_us(NormalizedPosition::RIGHT), 2100);
    }

    #[test]
    fn test_duty_is_monotonic() {
        let mut previous = position_to_duty(NormalizedPosition::LEFT);
        for i in 0..=2000 {
            let p = NormalizedPosition::new(-1.0 + i as f32 * 0.001).unwrap_or(NormalizedPosition::RIGHT);
            let duty = position_to_duty(p);
            assert!(duty >= previous, "duty decreased at {}", p);
            previous = duty;
        }
        assert!(previous.counts() < ServoTiming::HOBBY_STANDARD.max_duty());
    }

    #[test]
    fn test_pulse_width_truncates() {
        let timing = ServoTiming::HOBBY_STANDARD;
        // 0.4999 * 600 + 1500 = 1799.94
        let p = NormalizedPosition::new(0.4999).unwrap();
        assert_eq!(timing.pulse_width_us(p), 1799);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(NormalizedPosition::new(1.01), Err(RangeError { value: 1.01 }));
        assert!(NormalizedPosition::new(-1.5).is_err());
        assert!(NormalizedPosition::new(f32::NAN).is_err());
        assert!(position_to_duty_checked(2.0).is_err());
        assert_eq!(position_to_duty_checked(0.0), Ok(DutyValue(78_000)));
    }

    #[test]
    fn test_saturating() {
        assert_eq!(NormalizedPosition::saturating(3.0), NormalizedPosition::RIGHT);
        assert_eq!(NormalizedPosition::saturating(-3.0), NormalizedPosition::LEFT);
        assert_eq!(NormalizedPosition::saturating(f32::NAN), NormalizedPosition::CENTER);
        assert_eq!(NormalizedPosition::saturating(0.25).value(), 0.25);
    }
}
