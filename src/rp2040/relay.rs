//! relay.rs — relay gate on an RP2040 GPIO

use embassy_rp::gpio::{Flex, Pull};
use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};

use crate::hal::{OutputMode, PinConfig, RelayPin};

/// Relay driver on a flexible GPIO, so pulls can be set at configure time.
pub struct FlexRelay<'d> {
    pin: Flex<'d>,
}

impl<'d> FlexRelay<'d> {
    /// Wrap the pin. Nothing is driven until [`RelayPin::configure`].
    pub fn new(pin: Flex<'d>) -> Self {
        Self { pin }
    }
}

impl ErrorType for FlexRelay<'_> {
    type Error = RelayError;
}

impl OutputPin for FlexRelay<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high();
        Ok(())
    }
}

impl RelayPin for FlexRelay<'_> {
    fn configure(&mut self, config: &PinConfig) -> Result<(), Self::Error> {
        let pull = match (config.pull_up, config.pull_down) {
            (false, false) => Pull::None,
            (true, false) => Pull::Up,
            (false, true) => Pull::Down,
            (true, true) => return Err(RelayError::ConflictingPulls),
        };
        if config.mode != OutputMode::PushPull {
            return Err(RelayError::UnsupportedMode);
        }

        self.pin.set_pull(pull);
        // Latch low before enabling the driver so the relay never blips
        self.pin.set_low();
        self.pin.set_as_output();
        Ok(())
    }
}

#[derive(Debug, defmt::Format, thiserror::Error)]
pub enum RelayError {
    #[error("Pull-up and pull-down requested together")]
    ConflictingPulls,
    #[error("Only push-pull outputs are supported")]
    UnsupportedMode,
}

impl digital::Error for RelayError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}
