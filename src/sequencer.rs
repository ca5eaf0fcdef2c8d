//! sequencer.rs — relay, centering, sweep and deep sleep, in that order
//!
//! The sequencer owns every hardware handle it touches. Each phase checks
//! that the previous one completed, so the relay can only close after the
//! servo was centered and the sweep can only run while the relay is closed.
//! The first collaborator failure aborts the run; if the relay was closed at
//! that point it is released once, best effort.

use core::fmt;

use embedded_hal::delay::DelayNs;

use crate::config::SweepConfig;
use crate::duty::NormalizedPosition;
use crate::hal::{ChannelConfig, DeepSleep, PwmDriver, RelayPin, SleepRequest};
use crate::peak::distance_to_peak;
use crate::trajectory::Trajectory;
use crate::{log_debug, log_error, log_info, log_warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    Unpowered,
    Powered,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequencerState {
    Init,
    /// Relay pin and PWM configured, relay open.
    Initialized,
    /// Servo signal at center, relay open.
    Centered,
    /// Relay closed, sweep not started.
    Energized,
    Sweeping,
    /// Holding at a peak.
    Dwelling,
    /// Trajectory exhausted, relay still closed.
    SweepComplete,
    Deenergized,
    Sleeping,
    Aborted,
}

impl fmt::Display for SequencerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SequencerState::Init => "init",
            SequencerState::Initialized => "initialized",
            SequencerState::Centered => "centered",
            SequencerState::Energized => "energized",
            SequencerState::Sweeping => "sweeping",
            SequencerState::Dwelling => "dwelling",
            SequencerState::SweepComplete => "sweep complete",
            SequencerState::Deenergized => "deenergized",
            SequencerState::Sleeping => "sleeping",
            SequencerState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceError {
    #[error("Failed to configure relay pin")]
    PinConfiguration,
    #[error("Failed to configure PWM timer")]
    TimerConfiguration,
    #[error("Failed to configure PWM channel")]
    ChannelConfiguration,
    #[error("Failed to switch relay")]
    RelaySwitch,
    #[error("Failed to set duty")]
    SetDuty,
    #[error("Failed to commit duty")]
    CommitDuty,
    #[error("Sequencer is {actual}, expected {expected}")]
    OutOfOrder {
        expected: SequencerState,
        actual: SequencerState,
    },
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SweepSummary {
    /// Trajectory samples written to the servo.
    pub samples: u32,
    /// Dwells performed.
    pub peaks: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunReport {
    pub sweep: SweepSummary,
    pub sleep: SleepRequest,
}

pub struct PowerSequencer<R, P, D, S> {
    relay: R,
    pwm: P,
    delay: D,
    sleeper: S,
    config: &'static SweepConfig,
    state: SequencerState,
    power: PowerState,
}

impl<R, P, D, S> PowerSequencer<R, P, D, S>
where
    R: RelayPin,
    P: PwmDriver,
    D: DelayNs,
    S: DeepSleep,
{
    pub fn new(relay: R, pwm: P, delay: D, sleeper: S, config: &'static SweepConfig) -> Self {
        Self {
            relay,
            pwm,
            delay,
            sleeper,
            config,
            state: SequencerState::Init,
            power: PowerState::Unpowered,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn power_state(&self) -> PowerState {
        self.power
    }

    /// Run every phase once. Returns the issued sleep request if the
    /// deep-sleep collaborator returns control.
    pub fn run(mut self) -> Result<RunReport, SequenceError> {
        self.initialize()?;
        self.center()?;
        self.energize()?;
        let sweep = self.sweep()?;
        self.deenergize()?;
        let sleep = self.sleep()?;
        Ok(RunReport { sweep, sleep })
    }

    /// Configure the relay pin (driven low) and the PWM timer and channel.
    pub fn initialize(&mut self) -> Result<(), SequenceError> {
        self.expect_state(SequencerState::Init)?;
        let result = self.configure_outputs();
        self.finish_phase(result, SequencerState::Initialized)
    }

    /// Put the servo signal at center and give the horn time to get there.
    pub fn center(&mut self) -> Result<(), SequenceError> {
        self.expect_state(SequencerState::Initialized)?;
        let result = self.move_to(NormalizedPosition::CENTER);
        if result.is_ok() {
            self.delay.delay_ms(self.config.timing.center_settle_ms);
        }
        self.finish_phase(result, SequencerState::Centered)
    }

    /// Close the relay.
    pub fn energize(&mut self) -> Result<(), SequenceError> {
        self.expect_state(SequencerState::Centered)?;
        log_info!("setting relay pin to high");
        let result = self.relay.set_high().map_err(|_| SequenceError::RelaySwitch);
        if result.is_ok() {
            self.power = PowerState::Powered;
            self.delay.delay_ms(self.config.timing.power_settle_ms);
        }
        self.finish_phase(result, SequencerState::Energized)
    }

    /// Drive the servo through the whole trajectory, dwelling on peaks.
    pub fn sweep(&mut self) -> Result<SweepSummary, SequenceError> {
        self.expect_state(SequencerState::Energized)?;
        self.state = SequencerState::Sweeping;
        let result = self.sweep_trajectory();
        self.finish_phase(result, SequencerState::SweepComplete)
    }

    /// Open the relay once motion is over.
    pub fn deenergize(&mut self) -> Result<(), SequenceError> {
        self.expect_state(SequencerState::SweepComplete)?;
        log_info!("setting relay pin to low");
        let result = self.relay.set_low().map_err(|_| SequenceError::RelaySwitch);
        if result.is_ok() {
            self.power = PowerState::Unpowered;
            self.delay.delay_ms(self.config.timing.release_settle_ms);
        }
        self.finish_phase(result, SequencerState::Deenergized)
    }

    /// Hand the device to deep sleep. Does not return on hardware.
    pub fn sleep(&mut self) -> Result<SleepRequest, SequenceError> {
        self.expect_state(SequencerState::Deenergized)?;
        let request = self.config.timing.sleep_request();
        log_info!("activating deep sleep for {} seconds ...", request.as_secs());
        self.state = SequencerState::Sleeping;
        self.sleeper.enter_deep_sleep(request);
        Ok(request)
    }

    fn configure_outputs(&mut self) -> Result<(), SequenceError> {
        log_info!("initializing relay pin ...");
        self.relay
            .configure(&self.config.relay_pin)
            .map_err(|_| SequenceError::PinConfiguration)?;
        self.relay.set_low().map_err(|_| SequenceError::PinConfiguration)?;

        log_info!("initializing PWM controller ...");
        let servo = &self.config.servo;
        self.pwm
            .configure_timer(&servo.timer_config())
            .map_err(|_| SequenceError::TimerConfiguration)?;
        self.pwm
            .configure_channel(&ChannelConfig {
                initial_duty: servo.duty_for(NormalizedPosition::CENTER),
                hpoint: 0,
            })
            .map_err(|_| SequenceError::ChannelConfiguration)?;
        Ok(())
    }

    fn sweep_trajectory(&mut self) -> Result<SweepSummary, SequenceError> {
        let mut summary = SweepSummary::default();
        let mut previous = None;
        let mut trajectory = Trajectory::new(self.config.trajectory).peekable();

        while let Some(step) = trajectory.next() {
            self.delay.delay_ms(self.config.timing.step_ms);
            self.move_to(step.position)?;
            summary.samples += 1;
            log_debug!(
                "pos = {}, distance to peak = {}",
                step.position.value(),
                distance_to_peak(step.position)
            );

            let next = trajectory.peek().map(|next| next.position);
            if self.config.peak.is_peak(previous, step.position, next) {
                summary.peaks += 1;
                self.dwell();
            }
            previous = Some(step.position);
        }
        if summary.peaks == 0 {
            log_warn!("sweep of {} samples finished without a peak", summary.samples);
        }
        Ok(summary)
    }

    fn dwell(&mut self) {
        log_info!("-- PEAK --");
        self.state = SequencerState::Dwelling;
        self.delay.delay_ms(self.config.timing.dwell_ms);
        self.state = SequencerState::Sweeping;
    }

    /// Stage and commit the duty for `position`.
    fn move_to(&mut self, position: NormalizedPosition) -> Result<(), SequenceError> {
        let duty = self.config.servo.duty_for(position);
        self.pwm.set_duty(duty).map_err(|_| SequenceError::SetDuty)?;
        self.pwm.commit_duty().map_err(|_| SequenceError::CommitDuty)
    }

    fn expect_state(&self, expected: SequencerState) -> Result<(), SequenceError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SequenceError::OutOfOrder {
                expected,
                actual: self.state,
            })
        }
    }

    fn finish_phase<T>(
        &mut self,
        result: Result<T, SequenceError>,
        next: SequencerState,
    ) -> Result<T, SequenceError> {
        match result {
            Ok(value) => {
                self.state = next;
                Ok(value)
            }
            Err(error) => {
                self.abort(error);
                Err(error)
            }
        }
    }

    fn abort(&mut self, error: SequenceError) {
        log_error!("sequence aborted in state {}: {}", self.state, error);
        self.state = SequencerState::Aborted;
        if self.power == PowerState::Powered {
            match self.relay.set_low() {
                Ok(()) => self.power = PowerState::Unpowered,
                Err(_) => log_error!("failed to release relay after abort"),
            }
        }
    }
}
