// Licensed under the Apache-2.0 license

//! # TWI Hardware Abstraction
//!
//! Register-level seam between [`TwiMaster`](super::TwiMaster) and a
//! two-wire peripheral.
//!
//! Implementations only move bytes into and out of registers. They never
//! wait for the bus: completion of every [`Command`] except
//! [`Command::Stop`] is reported asynchronously by the two-wire interrupt,
//! which records the peripheral status into a
//! [`StatusLatch`](super::StatusLatch). Polling that latch, timeouts and
//! transaction sequencing belong to the engine.

/// Bus action requested from the peripheral.
///
/// Every command also clears the peripheral's interrupt flag, which is what
/// releases the bus state machine to perform the next step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Generate a START (or a repeated START while the bus is held).
    Start,
    /// Generate a STOP and release the bus. No interrupt follows.
    Stop,
    /// Shift out the byte previously loaded with
    /// [`TwiHardware::write_data`], address or data alike.
    Transmit,
    /// Receive one byte and answer with acknowledge.
    ReceiveAck,
    /// Receive one byte and answer with not-acknowledge.
    ReceiveNack,
}

/// Minimal two-wire master register interface.
pub trait TwiHardware {
    /// Program the bit-rate register. The prescaler is left at 1.
    fn set_bit_rate(&mut self, divisor: u8);

    /// Enable the peripheral and its interrupt, and pull up SDA and SCL.
    fn enable(&mut self);

    /// Start the given bus action.
    fn issue(&mut self, command: Command);

    /// Load the data register for the next [`Command::Transmit`].
    fn write_data(&mut self, byte: u8);

    /// Read the data register after a receive completed.
    fn read_data(&mut self) -> u8;

    /// Called once per poll while the engine waits for a status.
    #[inline]
    fn relax(&mut self) {
        core::hint::spin_loop();
    }
}
