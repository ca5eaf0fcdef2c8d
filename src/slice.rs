//! slice.rs — RP2040 PWM slice timing for a servo frame

use core::cmp::{max, min};
use fixed::FixedU16;
use fixed::types::extra::U4;

use crate::duty::DutyValue;

/// Largest divider the slice accepts, 255 + 15/16, in Q4.
const MAX_DIVIDER_Q4: u32 = 255 * 16 + 15;

/// Divider and wrap value for one PWM slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceTiming {
    /// PWM top value (period - 1)
    pub top: u16,
    /// PWM divider (FixedU16 with 4 fractional bits)
    pub divider: FixedU16<U4>,
    /// Tick rate in Hz
    pub tick_hz: u32,
}

impl SliceTiming {
    /// Pick divider and TOP for a frame of `frequency_hz` fed by `clock_hz`.
    ///
    /// Prefers a 1 MHz tick (1 tick = 1 us) and slows the tick down until TOP
    /// fits in u16. Returns `None` for a zero frequency or clock.
    pub fn for_frequency(clock_hz: u32, frequency_hz: u32) -> Option<Self> {
        if clock_hz == 0 || frequency_hz == 0 {
            return None;
        }
        let frame_us = max(1, 1_000_000 / frequency_hz);

        // Largest tick rate for which frame_us * tick_hz / 1e6 <= 65536
        let max_tick_hz_for_top = ((u16::MAX as u64 + 1) * 1_000_000u64 / frame_us as u64) as u32;
        let target_tick_hz = min(1_000_000, max(1, max_tick_hz_for_top));

        // divider_q4 ~= clock_hz * 16 / target_tick_hz, rounded
        let mut divider_q4 = (((clock_hz as u64) * 16u64 + (target_tick_hz as u64 / 2))
            / (target_tick_hz as u64)) as u32;
        divider_q4 = min(max(divider_q4, 16), MAX_DIVIDER_Q4);

        let mut tick_hz: u32;
        let mut top: u32;
        loop {
            tick_hz = ((clock_hz as u64) * 16u64 / divider_q4 as u64) as u32;
            let period_ticks = (frame_us as u64) * (tick_hz as u64) / 1_000_000u64;
            top = period_ticks.saturating_sub(1) as u32;

            if top <= u16::MAX as u32 || divider_q4 >= MAX_DIVIDER_Q4 {
                break;
            }
            divider_q4 += 1;
        }

        Some(Self {
            top: min(top, u16::MAX as u32) as u16,
            divider: FixedU16::<U4>::from_bits(divider_q4 as u16),
            tick_hz,
        })
    }

    /// Scale a duty count at `resolution_bits` to a compare value for this slice.
    ///
    /// The full-scale count 2^bits maps to TOP + 1 (always high).
    pub fn compare_for(&self, duty: DutyValue, resolution_bits: u8) -> u16 {
        let period = self.top as u64 + 1;
        let compare = ((duty.counts() as u64) * period) >> resolution_bits;
        min(compare, period) as u16
    }
}
