// Licensed under the Apache-2.0 license

//! Simulated USART for host tests and downstream driver tests.

use heapless::Vec;

use super::common::Config;
use super::traits::UsartHardware;

/// Transmitted bytes kept by [`SimUsart`].
pub const SIM_TX_CAPACITY: usize = 256;

/// USART model that records configuration and transmitted bytes.
///
/// The transmitter can be made to report "busy" for a fixed number of
/// [`relax`](UsartHardware::relax) spins before every byte.
#[derive(Debug, Default)]
pub struct SimUsart {
    divisor: Option<u16>,
    double_speed: bool,
    enabled: bool,
    busy_polls: u32,
    busy_remaining: u32,
    busy_spins: u32,
    sent: Vec<u8, SIM_TX_CAPACITY>,
}

impl SimUsart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transmitter reports busy for `polls` spins before each byte.
    #[must_use]
    pub fn with_busy_polls(polls: u32) -> Self {
        Self {
            busy_polls: polls,
            busy_remaining: polls,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn divisor(&self) -> Option<u16> {
        self.divisor
    }

    #[must_use]
    pub fn double_speed(&self) -> bool {
        self.double_speed
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn busy_spins(&self) -> u32 {
        self.busy_spins
    }

    /// Bytes written so far; bytes beyond [`SIM_TX_CAPACITY`] are dropped.
    #[must_use]
    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }
}

impl UsartHardware for SimUsart {
    fn configure(&mut self, divisor: u16, config: &Config) {
        self.divisor = Some(divisor);
        self.double_speed = config.high_speed;
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn is_tx_ready(&self) -> bool {
        self.busy_remaining == 0
    }

    fn write_data(&mut self, byte: u8) {
        let _ = self.sent.push(byte);
        self.busy_remaining = self.busy_polls;
    }

    fn relax(&mut self) {
        self.busy_spins += 1;
        self.busy_remaining = self.busy_remaining.saturating_sub(1);
    }
}
