//! pwm.rs — servo signal on an embassy-rp PWM slice (channel A)

use embassy_rp::pwm::{Config, Pwm};

use crate::duty::DutyValue;
use crate::hal::{ChannelConfig, PwmDriver, TimerConfig};
use crate::slice::SliceTiming;

/// PWM slice with a staged duty register.
///
/// Duty counts arrive at the configured timer resolution (e.g. 20 bit) and
/// are scaled to the slice TOP when committed. The slice itself only has a
/// 16-bit counter, so resolution above that is rounded away.
pub struct SlicePwm<'d> {
    pwm: Pwm<'d>,
    config: Config,
    timing: Option<SliceTiming>,
    resolution_bits: u8,
    staged: Option<DutyValue>,
}

impl<'d> SlicePwm<'d> {
    /// Wrap a slice created with `Pwm::new_output_a`. The output stays
    /// disabled until the channel is configured.
    pub fn new(mut pwm: Pwm<'d>) -> Self {
        let mut config = Config::default();
        config.enable = false;
        pwm.set_config(&config);
        Self {
            pwm,
            config,
            timing: None,
            resolution_bits: 0,
            staged: None,
        }
    }

    fn timing(&self) -> Result<SliceTiming, SlicePwmError> {
        self.timing.ok_or(SlicePwmError::NotConfigured)
    }

    fn check_duty(&self, duty: DutyValue) -> Result<(), SlicePwmError> {
        if (duty.counts() as u64) < (1u64 << self.resolution_bits) {
            Ok(())
        } else {
            Err(SlicePwmError::DutyOutOfRange)
        }
    }
}

impl PwmDriver for SlicePwm<'_> {
    type Error = SlicePwmError;

    fn configure_timer(&mut self, config: &TimerConfig) -> Result<(), Self::Error> {
        if !(1..=31).contains(&config.resolution_bits) {
            return Err(SlicePwmError::InvalidResolution);
        }
        // Auto and System both run the slice from clk_sys
        let clock_hz = embassy_rp::clocks::clk_sys_freq();
        let timing = SliceTiming::for_frequency(clock_hz, config.frequency_hz)
            .ok_or(SlicePwmError::InvalidFrequency)?;

        self.config.top = timing.top;
        self.config.divider = timing.divider;
        self.config.phase_correct = false;
        self.config.enable = false;
        self.pwm.set_config(&self.config);

        self.timing = Some(timing);
        self.resolution_bits = config.resolution_bits;
        Ok(())
    }

    fn configure_channel(&mut self, config: &ChannelConfig) -> Result<(), Self::Error> {
        let timing = self.timing()?;
        // Edge-aligned slices always go high at counter 0
        if config.hpoint != 0 {
            return Err(SlicePwmError::UnsupportedHpoint);
        }
        self.check_duty(config.initial_duty)?;

        self.config.compare_a = timing.compare_for(config.initial_duty, self.resolution_bits);
        self.config.enable = true;
        self.pwm.set_config(&self.config);
        Ok(())
    }

    fn set_duty(&mut self, duty: DutyValue) -> Result<(), Self::Error> {
        self.timing()?;
        self.check_duty(duty)?;
        self.staged = Some(duty);
        Ok(())
    }

    fn commit_duty(&mut self) -> Result<(), Self::Error> {
        let timing = self.timing()?;
        if let Some(duty) = self.staged.take() {
            self.config.compare_a = timing.compare_for(duty, self.resolution_bits);
            self.pwm.set_config(&self.config);
        }
        Ok(())
    }
}

#[derive(Debug, defmt::Format, thiserror::Error)]
pub enum SlicePwmError {
    #[error("PWM timer not configured")]
    NotConfigured,
    #[error("PWM frequency cannot be reached from clk_sys")]
    InvalidFrequency,
    #[error("PWM resolution must be 1..=31 bits")]
    InvalidResolution,
    #[error("PWM slice only supports hpoint 0")]
    UnsupportedHpoint,
    #[error("Duty exceeds timer resolution")]
    DutyOutOfRange,
}
