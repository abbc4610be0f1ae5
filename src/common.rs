// Licensed under the Apache-2.0 license

//! Shared building blocks for the serial and two-wire drivers.

use core::fmt;

/// Minimal line-oriented logging sink.
///
/// Controllers take a `Logger` type parameter so that firmware can route
/// diagnostics to the host link while tests and size-constrained builds use
/// [`NoOpLogger`].
pub trait Logger {
    fn debug(&mut self, msg: &str);
    fn error(&mut self, msg: &str);
}

/// Logger that discards every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn debug(&mut self, _msg: &str) {}
    fn error(&mut self, _msg: &str) {}
}

impl<L: Logger + ?Sized> Logger for &mut L {
    fn debug(&mut self, msg: &str) {
        (**self).debug(msg);
    }

    fn error(&mut self, msg: &str) {
        (**self).error(msg);
    }
}

/// Rejected peripheral configuration.
///
/// Divisor registers have a fixed width; a requested rate whose divisor
/// does not fit is refused at `init` instead of being silently truncated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Requested baud rate or bus speed is zero.
    ZeroRate,
    /// Requested rate is faster than the peripheral clock can generate.
    RateTooHigh,
    /// Requested rate needs a divisor wider than the register.
    RateTooLow,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroRate => f.write_str("rate must be non-zero"),
            Self::RateTooHigh => f.write_str("rate exceeds what the peripheral clock can generate"),
            Self::RateTooLow => f.write_str("divisor does not fit the rate register"),
        }
    }
}
