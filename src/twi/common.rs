// Licensed under the Apache-2.0 license

//! Configuration types for the two-wire master.

use crate::common::ConfigurationError;
use fugit::HertzU32;

/// Peripheral clock of the reference board.
pub const DEFAULT_CLOCK: HertzU32 = HertzU32::from_raw(16_000_000);

/// Fixed clock cycles the bit-rate generator adds to every SCL period.
pub const BIT_RATE_BASE_OFFSET: u32 = 16;

/// Bit-rate generator multiplier with the prescaler at 1.
pub const BIT_RATE_PRESCALER_FACTOR: u32 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TwiSpeed {
    Standard,
    Fast,
    Custom(HertzU32),
}

impl TwiSpeed {
    #[must_use]
    pub const fn frequency(self) -> HertzU32 {
        match self {
            Self::Standard => HertzU32::from_raw(100_000),
            Self::Fast => HertzU32::from_raw(400_000),
            Self::Custom(f) => f,
        }
    }
}

/// Number of status polls a bus phase may spend waiting for the interrupt.
///
/// This is a spin count, not a duration: the wall-clock length of a timeout
/// scales with the core clock and with how long one poll takes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PhaseTimeout(u16);

impl PhaseTimeout {
    pub const DEFAULT: Self = Self(1600);

    /// A timeout of zero polls is raised to one so a phase always looks once.
    #[must_use]
    pub const fn from_polls(polls: u16) -> Self {
        if polls == 0 {
            Self(1)
        } else {
            Self(polls)
        }
    }

    #[must_use]
    pub const fn polls(self) -> u16 {
        self.0
    }
}

impl Default for PhaseTimeout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TwiConfig {
    pub speed: TwiSpeed,
    pub clock: HertzU32,
    pub timeout: PhaseTimeout,
}

impl TwiConfig {
    /// Bit-rate register value: `(clock / speed - 16) / 2`.
    ///
    /// # Errors
    ///
    /// Returns an error if the speed is zero, faster than `clock / 16`, or so
    /// slow that the divisor does not fit in eight bits.
    pub fn bit_rate_divisor(&self) -> Result<u8, ConfigurationError> {
        let speed = self.speed.frequency().raw();
        if speed == 0 {
            return Err(ConfigurationError::ZeroRate);
        }
        let divisor = (self.clock.raw() / speed)
            .checked_sub(BIT_RATE_BASE_OFFSET)
            .ok_or(ConfigurationError::RateTooHigh)?
            / BIT_RATE_PRESCALER_FACTOR;

        u8::try_from(divisor).map_err(|_| ConfigurationError::RateTooLow)
    }
}

impl Default for TwiConfig {
    fn default() -> Self {
        TwiConfigBuilder::new().build()
    }
}

pub struct TwiConfigBuilder {
    speed: TwiSpeed,
    clock: HertzU32,
    timeout: PhaseTimeout,
}

impl Default for TwiConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TwiConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            speed: TwiSpeed::Standard,
            clock: DEFAULT_CLOCK,
            timeout: PhaseTimeout::DEFAULT,
        }
    }
    #[must_use]
    pub fn speed(mut self, speed: TwiSpeed) -> Self {
        self.speed = speed;
        self
    }
    #[must_use]
    pub fn clock(mut self, clock: HertzU32) -> Self {
        self.clock = clock;
        self
    }
    #[must_use]
    pub fn timeout(mut self, timeout: PhaseTimeout) -> Self {
        self.timeout = timeout;
        self
    }
    #[must_use]
    pub fn build(self) -> TwiConfig {
        TwiConfig {
            speed: self.speed,
            clock: self.clock,
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fugit::RateExtU32;

    #[test]
    fn test_default_config() {
        let config = TwiConfig::default();

        assert_eq!(config.speed, TwiSpeed::Standard);
        assert_eq!(config.clock, DEFAULT_CLOCK);
        assert_eq!(config.timeout.polls(), 1600);
    }

    #[test]
    fn test_bit_rate_divisor_presets() {
        let standard = TwiConfigBuilder::new().speed(TwiSpeed::Standard).build();
        let fast = TwiConfigBuilder::new().speed(TwiSpeed::Fast).build();

        assert_eq!(standard.bit_rate_divisor(), Ok(72));
        assert_eq!(fast.bit_rate_divisor(), Ok(12));
    }

    #[test]
    fn test_bit_rate_divisor_truncates() {
        let config = TwiConfigBuilder::new()
            .speed(TwiSpeed::Custom(150.kHz()))
            .build();

        // 16 MHz / 150 kHz = 106; (106 - 16) / 2 = 45
        assert_eq!(config.bit_rate_divisor(), Ok(45));
    }

    #[test]
    fn test_bit_rate_divisor_out_of_range() {
        let zero = TwiConfigBuilder::new()
            .speed(TwiSpeed::Custom(0.Hz()))
            .build();
        let too_fast = TwiConfigBuilder::new()
            .speed(TwiSpeed::Custom(2.MHz()))
            .build();
        let too_slow = TwiConfigBuilder::new()
            .speed(TwiSpeed::Custom(10.kHz()))
            .build();

        assert_eq!(zero.bit_rate_divisor(), Err(ConfigurationError::ZeroRate));
        assert_eq!(
            too_fast.bit_rate_divisor(),
            Err(ConfigurationError::RateTooHigh)
        );
        assert_eq!(
            too_slow.bit_rate_divisor(),
            Err(ConfigurationError::RateTooLow)
        );
    }

    #[test]
    fn test_timeout_never_zero() {
        assert_eq!(PhaseTimeout::from_polls(0).polls(), 1);
        assert_eq!(PhaseTimeout::from_polls(25).polls(), 25);
    }
}
