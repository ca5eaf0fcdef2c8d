//! Recording collaborators for host tests
//!
//! All mocks share one call log so tests can assert the exact order of
//! hardware operations across the relay, PWM, delay and sleep handles.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};

use crate::config::SweepConfig;
use crate::duty::DutyValue;
use crate::hal::{ChannelConfig, DeepSleep, PinConfig, PwmDriver, RelayPin, SleepRequest, TimerConfig};
use crate::sequencer::PowerSequencer;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ConfigurePin(PinConfig),
    PinLow,
    PinHigh,
    ConfigureTimer(TimerConfig),
    ConfigureChannel(ChannelConfig),
    SetDuty(DutyValue),
    CommitDuty,
    DelayMs(u32),
    DeepSleep(SleepRequest),
}

/// Fallible operations a test can make fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ConfigurePin,
    PinLow,
    PinHigh,
    ConfigureTimer,
    ConfigureChannel,
    SetDuty,
    CommitDuty,
}

/// Fail the `nth` attempt (zero-based) of `op`. Failed calls are not logged.
#[derive(Debug, Clone, Copy)]
pub struct Fault {
    pub op: Op,
    pub nth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl digital::Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

#[derive(Clone)]
pub struct Bus {
    log: CallLog,
    fault: Option<Fault>,
    attempts: Rc<RefCell<HashMap<Op, usize>>>,
}

impl Bus {
    pub fn new(fault: Option<Fault>) -> Self {
        Self {
            log: CallLog::default(),
            fault,
            attempts: Rc::default(),
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    fn attempt(&self, op: Op, call: Call) -> Result<(), MockError> {
        let mut attempts = self.attempts.borrow_mut();
        let count = attempts.entry(op).or_insert(0);
        let nth = *count;
        *count += 1;
        if let Some(fault) = self.fault {
            if fault.op == op && fault.nth == nth {
                return Err(MockError);
            }
        }
        self.log.borrow_mut().push(call);
        Ok(())
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

pub struct MockRelay(Bus);

impl ErrorType for MockRelay {
    type Error = MockError;
}

impl OutputPin for MockRelay {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.attempt(Op::PinLow, Call::PinLow)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.attempt(Op::PinHigh, Call::PinHigh)
    }
}

impl RelayPin for MockRelay {
    fn configure(&mut self, config: &PinConfig) -> Result<(), Self::Error> {
        self.0.attempt(Op::ConfigurePin, Call::ConfigurePin(*config))
    }
}

pub struct MockPwm(Bus);

impl PwmDriver for MockPwm {
    type Error = MockError;

    fn configure_timer(&mut self, config: &TimerConfig) -> Result<(), Self::Error> {
        self.0.attempt(Op::ConfigureTimer, Call::ConfigureTimer(*config))
    }

    fn configure_channel(&mut self, config: &ChannelConfig) -> Result<(), Self::Error> {
        self.0.attempt(Op::ConfigureChannel, Call::ConfigureChannel(*config))
    }

    fn set_duty(&mut self, duty: DutyValue) -> Result<(), Self::Error> {
        self.0.attempt(Op::SetDuty, Call::SetDuty(duty))
    }

    fn commit_duty(&mut self) -> Result<(), Self::Error> {
        self.0.attempt(Op::CommitDuty, Call::CommitDuty)
    }
}

pub struct MockDelay(Bus);

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.record(Call::DelayMs(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.record(Call::DelayMs(ms));
    }
}

pub struct MockSleep(Bus);

impl DeepSleep for MockSleep {
    fn enter_deep_sleep(&mut self, request: SleepRequest) {
        self.0.record(Call::DeepSleep(request));
    }
}

pub type MockSequencer = PowerSequencer<MockRelay, MockPwm, MockDelay, MockSleep>;

/// Sequencer wired to recording mocks, plus the shared call log.
pub fn harness(config: &'static SweepConfig, fault: Option<Fault>) -> (MockSequencer, CallLog) {
    let bus = Bus::new(fault);
    let sequencer = PowerSequencer::new(
        MockRelay(bus.clone()),
        MockPwm(bus.clone()),
        MockDelay(bus.clone()),
        MockSleep(bus.clone()),
        config,
    );
    (sequencer, bus.log())
}
