//! Collaborators backed by embassy-rp on an RP2040.
mod pwm;
mod relay;
mod sleep;

pub use pwm::*;
pub use relay::*;
pub use sleep::*;
