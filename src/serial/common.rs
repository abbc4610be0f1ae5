// Licensed under the Apache-2.0 license

//! Serial link configuration and baud divisor computation.

use crate::common::ConfigurationError;
use fugit::HertzU32;

/// Peripheral clock of the reference board.
pub const DEFAULT_CLOCK: HertzU32 = HertzU32::from_raw(16_000_000);

/// Largest value the 12-bit baud rate register accepts.
pub const MAX_BAUD_DIVISOR: u16 = 0x0FFF;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum WordLength {
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub baud_rate: u32,
    /// Double-speed mode: 8 clock samples per bit instead of 16.
    pub high_speed: bool,
    pub clock: HertzU32,
    pub word_length: WordLength,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl Config {
    /// 8 data bits, even parity, 1 stop bit on the default peripheral clock.
    #[must_use]
    pub const fn new(baud_rate: u32, high_speed: bool) -> Self {
        Self {
            baud_rate,
            high_speed,
            clock: DEFAULT_CLOCK,
            word_length: WordLength::Eight,
            parity: Parity::Even,
            stop_bits: StopBits::One,
        }
    }

    #[must_use]
    pub const fn clock(mut self, clock: HertzU32) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn speed_multiplier(&self) -> u32 {
        if self.high_speed {
            8
        } else {
            16
        }
    }

    /// Baud rate register value: `clock / (multiplier * baud) - 1`.
    ///
    /// # Errors
    ///
    /// Returns an error if the baud rate is zero, faster than the clock allows,
    /// or slow enough that the divisor overflows the 12-bit register.
    pub fn baud_divisor(&self) -> Result<u16, ConfigurationError> {
        if self.baud_rate == 0 {
            return Err(ConfigurationError::ZeroRate);
        }
        let ticks_per_bit = self
            .speed_multiplier()
            .checked_mul(self.baud_rate)
            .ok_or(ConfigurationError::RateTooHigh)?;
        let divisor = (self.clock.raw() / ticks_per_bit)
            .checked_sub(1)
            .ok_or(ConfigurationError::RateTooHigh)?;

        u16::try_from(divisor)
            .ok()
            .filter(|d| *d <= MAX_BAUD_DIVISOR)
            .ok_or(ConfigurationError::RateTooLow)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(9600, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fugit::RateExtU32;

    #[test]
    fn test_default_frame_is_8e1() {
        let config = Config::default();

        assert_eq!(config.word_length, WordLength::Eight);
        assert_eq!(config.parity, Parity::Even);
        assert_eq!(config.stop_bits, StopBits::One);
        assert_eq!(config.clock, 16.MHz::<1, 1>());
    }

    #[test]
    fn test_baud_divisor_normal_speed() {
        assert_eq!(Config::new(9600, false).baud_divisor(), Ok(103));
        assert_eq!(Config::new(115_200, false).baud_divisor(), Ok(7));
    }

    #[test]
    fn test_baud_divisor_high_speed_uses_multiplier_8() {
        let config = Config::new(9600, true);

        assert_eq!(config.speed_multiplier(), 8);
        assert_eq!(config.baud_divisor(), Ok(207));
    }

    #[test]
    fn test_baud_divisor_rejects_out_of_range() {
        assert_eq!(
            Config::new(0, false).baud_divisor(),
            Err(ConfigurationError::ZeroRate)
        );
        assert_eq!(
            Config::new(2_000_000, false).baud_divisor(),
            Err(ConfigurationError::RateTooHigh)
        );
        assert_eq!(
            Config::new(200, false).baud_divisor(),
            Err(ConfigurationError::RateTooLow)
        );
    }

    #[test]
    fn test_custom_clock() {
        let config = Config::new(9600, false).clock(8.MHz());

        assert_eq!(config.baud_divisor(), Ok(51));
    }
}
