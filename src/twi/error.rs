// Licensed under the Apache-2.0 license

//! Two-wire transaction errors.

use core::fmt;
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// Result code surfaced to collaborators for a successful transaction.
pub const OK: u8 = 0;

/// Phase that failed, as reported by the bus engine.
///
/// The discriminants form the ordinal code surface (`OK` is 0) used when a
/// result has to cross a byte-oriented boundary, e.g. reported to the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TwiError {
    /// START was not reported in time, or another status came back.
    Start = 1,
    /// Repeated START was not reported in time, or another status came back.
    RepeatedStart = 2,
    /// Address with read bit was refused or not acknowledged in time.
    AddressRead = 3,
    /// Address with write bit was refused or not acknowledged in time.
    AddressWrite = 4,
    /// A received byte did not complete in time.
    DataRead = 5,
    /// A transmitted byte was refused or not acknowledged in time.
    DataWrite = 6,
    /// The final, not-acknowledged receive did not complete.
    Nack = 7,
}

impl TwiError {
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Start),
            2 => Some(Self::RepeatedStart),
            3 => Some(Self::AddressRead),
            4 => Some(Self::AddressWrite),
            5 => Some(Self::DataRead),
            6 => Some(Self::DataWrite),
            7 => Some(Self::Nack),
            _ => None,
        }
    }
}

/// Collapse a transaction result into its ordinal code.
#[must_use]
pub fn result_code<T>(result: &Result<T, TwiError>) -> u8 {
    match result {
        Ok(_) => OK,
        Err(e) => e.code(),
    }
}

impl fmt::Display for TwiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Start => "start condition timed out",
            Self::RepeatedStart => "repeated start timed out",
            Self::AddressRead => "address+read not acknowledged",
            Self::AddressWrite => "address+write not acknowledged",
            Self::DataRead => "data receive timed out",
            Self::DataWrite => "data byte not acknowledged",
            Self::Nack => "final data receive timed out",
        };
        f.write_str(msg)
    }
}

impl embedded_hal::i2c::Error for TwiError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Start | Self::RepeatedStart => ErrorKind::Bus,
            Self::AddressRead | Self::AddressWrite => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            }
            Self::DataWrite => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            Self::DataRead | Self::Nack => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::Error;

    const ALL: [TwiError; 7] = [
        TwiError::Start,
        TwiError::RepeatedStart,
        TwiError::AddressRead,
        TwiError::AddressWrite,
        TwiError::DataRead,
        TwiError::DataWrite,
        TwiError::Nack,
    ];

    #[test]
    fn test_codes_are_distinct_and_nonzero() {
        for (i, err) in ALL.iter().enumerate() {
            assert_ne!(err.code(), OK);
            assert_eq!(TwiError::from_code(err.code()), Some(*err));
            for other in &ALL[i + 1..] {
                assert_ne!(err.code(), other.code());
            }
        }
        assert_eq!(TwiError::from_code(OK), None);
    }

    #[test]
    fn test_result_code() {
        assert_eq!(result_code::<()>(&Ok(())), OK);
        assert_eq!(result_code::<u8>(&Ok(0x55)), OK);
        assert_eq!(result_code::<()>(&Err(TwiError::DataWrite)), 6);
    }

    #[test]
    fn test_embedded_hal_kind() {
        assert_eq!(
            TwiError::AddressWrite.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );
        assert_eq!(
            TwiError::DataWrite.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
        );
        assert_eq!(TwiError::Start.kind(), ErrorKind::Bus);
        assert_eq!(TwiError::DataRead.kind(), ErrorKind::Other);
        assert_eq!(TwiError::Nack.kind(), ErrorKind::Other);
    }

    #[test]
    fn test_display() {
        assert_eq!(TwiError::Nack.to_string(), "final data receive timed out");
        assert_eq!(
            TwiError::AddressWrite.to_string(),
            "address+write not acknowledged"
        );
    }
}
