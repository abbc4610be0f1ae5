// Licensed under the Apache-2.0 license

//! Two-wire bus transaction engine.
//!
//! Every bus phase is one command issued to the hardware followed by a
//! bounded poll of the [`StatusLatch`] for the status the interrupt handler
//! records when the phase completes. Compound operations chain phases,
//! short-circuit on the first failure and release the bus with exactly one
//! STOP, unless the START itself failed and the bus was never claimed.

use embedded_hal::i2c::{Operation, SevenBitAddress};

use super::common::{PhaseTimeout, TwiConfig};
use super::error::TwiError;
use super::status::{BusStatus, StatusLatch};
use super::traits::{Command, TwiHardware};
use crate::common::ConfigurationError;

/// Address byte on the wire. The top bit of `addr` is discarded.
#[must_use]
pub const fn address_byte(addr: SevenBitAddress, read: bool) -> u8 {
    (addr << 1) | read as u8
}

/// Whether `rest` receives another byte before the next write or STOP.
/// Empty reads put nothing on the wire and are skipped.
fn reads_follow(rest: &[Operation<'_>]) -> bool {
    for op in rest {
        match op {
            Operation::Read(buffer) if buffer.is_empty() => {}
            Operation::Read(_) => return true,
            Operation::Write(_) => return false,
        }
    }
    false
}

pub struct TwiMaster<'a, H: TwiHardware> {
    hardware: H,
    latch: &'a StatusLatch,
    timeout: PhaseTimeout,
}

impl<'a, H: TwiHardware> TwiMaster<'a, H> {
    /// `latch` must be the latch the two-wire interrupt records into.
    pub fn new(hardware: H, latch: &'a StatusLatch) -> Self {
        Self {
            hardware,
            latch,
            timeout: PhaseTimeout::DEFAULT,
        }
    }

    /// Program the bus clock, enable the peripheral with its interrupt and
    /// pull-ups, and adopt the configured phase timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus speed cannot be generated from the clock.
    /// Nothing is written to the hardware in that case.
    pub fn init(&mut self, config: &TwiConfig) -> Result<(), ConfigurationError> {
        let divisor = config.bit_rate_divisor()?;
        self.hardware.set_bit_rate(divisor);
        self.hardware.enable();
        self.timeout = config.timeout;
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> PhaseTimeout {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: PhaseTimeout) {
        self.timeout = timeout;
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    pub fn free(self) -> H {
        self.hardware
    }

    /// Claim the bus.
    ///
    /// # Errors
    ///
    /// [`TwiError::Start`] if the START is not reported in time. No STOP is
    /// sent: the bus was never claimed.
    pub fn start(&mut self) -> Result<(), TwiError> {
        self.run_phase(Command::Start, BusStatus::Start, TwiError::Start)
    }

    /// Issue a repeated START while the bus is held.
    ///
    /// # Errors
    ///
    /// [`TwiError::RepeatedStart`] if it is not reported in time.
    pub fn re_start(&mut self) -> Result<(), TwiError> {
        self.run_phase(
            Command::Start,
            BusStatus::RepeatedStart,
            TwiError::RepeatedStart,
        )
    }

    /// Release the bus. STOP raises no interrupt, so there is nothing to wait for.
    pub fn stop(&mut self) {
        self.hardware.issue(Command::Stop);
    }

    /// Send the address with the write bit and wait for the acknowledge.
    ///
    /// # Errors
    ///
    /// [`TwiError::AddressWrite`] if the device refused, on timeout, or on
    /// any other status.
    pub fn address_write_ack(&mut self, addr: SevenBitAddress) -> Result<(), TwiError> {
        self.hardware.write_data(address_byte(addr, false));
        self.run_phase(
            Command::Transmit,
            BusStatus::AddressWriteAck,
            TwiError::AddressWrite,
        )
    }

    /// Send the address with the read bit and wait for the acknowledge.
    ///
    /// # Errors
    ///
    /// [`TwiError::AddressRead`] if the device refused, on timeout, or on
    /// any other status.
    pub fn address_read_ack(&mut self, addr: SevenBitAddress) -> Result<(), TwiError> {
        self.hardware.write_data(address_byte(addr, true));
        self.run_phase(
            Command::Transmit,
            BusStatus::AddressReadAck,
            TwiError::AddressRead,
        )
    }

    /// Send one data byte and wait for the acknowledge.
    ///
    /// # Errors
    ///
    /// [`TwiError::DataWrite`] if the device refused, on timeout, or on any
    /// other status.
    pub fn data_write_ack(&mut self, byte: u8) -> Result<(), TwiError> {
        self.hardware.write_data(byte);
        self.run_phase(
            Command::Transmit,
            BusStatus::DataWriteAck,
            TwiError::DataWrite,
        )
    }

    /// Receive one data byte, answering with acknowledge when `request_ack`
    /// (more bytes wanted) or not-acknowledge (last byte).
    ///
    /// # Errors
    ///
    /// [`TwiError::DataRead`] when the acknowledge branch does not complete,
    /// [`TwiError::Nack`] when the not-acknowledge branch does not.
    pub fn data_read_ack(&mut self, request_ack: bool) -> Result<u8, TwiError> {
        if request_ack {
            self.run_phase(
                Command::ReceiveAck,
                BusStatus::DataReadAck,
                TwiError::DataRead,
            )?;
        } else {
            self.run_phase(Command::ReceiveNack, BusStatus::DataReadNack, TwiError::Nack)?;
        }
        Ok(self.hardware.read_data())
    }

    /// Write one byte to `addr`.
    ///
    /// # Errors
    ///
    /// The first failing phase.
    pub fn write(&mut self, addr: SevenBitAddress, data: u8) -> Result<(), TwiError> {
        self.with_bus(|bus| {
            bus.address_write_ack(addr)?;
            bus.data_write_ack(data)
        })
    }

    /// Write `data` to `addr`, stopping at the first byte that is not acknowledged.
    ///
    /// # Errors
    ///
    /// The first failing phase. Bytes after a failed one are never sent.
    pub fn write_bytes(&mut self, addr: SevenBitAddress, data: &[u8]) -> Result<(), TwiError> {
        self.with_bus(|bus| {
            bus.address_write_ack(addr)?;
            bus.send_all(data)
        })
    }

    /// Fill `buffer` from `addr`. The last byte is not acknowledged.
    ///
    /// # Errors
    ///
    /// The first failing phase.
    pub fn read(&mut self, addr: SevenBitAddress, buffer: &mut [u8]) -> Result<(), TwiError> {
        self.with_bus(|bus| {
            bus.address_read_ack(addr)?;
            bus.receive_all(buffer, false)
        })
    }

    /// Write `bytes`, then read into `buffer` after a repeated START.
    ///
    /// # Errors
    ///
    /// The first failing phase.
    pub fn write_read(
        &mut self,
        addr: SevenBitAddress,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), TwiError> {
        self.with_bus(|bus| {
            bus.address_write_ack(addr)?;
            bus.send_all(bytes)?;
            bus.re_start()?;
            bus.address_read_ack(addr)?;
            bus.receive_all(buffer, false)
        })
    }

    /// Run `operations` as a single bus transaction.
    ///
    /// Adjacent operations of the same direction are merged; a direction
    /// change sends a repeated START and the address again. The last byte
    /// read before a write or STOP is not acknowledged; empty reads in between
    /// do not count.
    ///
    /// # Errors
    ///
    /// The first failing phase.
    pub fn transaction(
        &mut self,
        addr: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), TwiError> {
        self.with_bus(|bus| {
            let mut previous_read: Option<bool> = None;

            for i in 0..operations.len() {
                let more_reads = operations
                    .get(i + 1..)
                    .is_some_and(|rest| reads_follow(rest));
                let Some(op) = operations.get_mut(i) else {
                    break;
                };
                let is_read = matches!(op, Operation::Read(_));
                if previous_read != Some(is_read) {
                    if previous_read.is_some() {
                        bus.re_start()?;
                    }
                    if is_read {
                        bus.address_read_ack(addr)?;
                    } else {
                        bus.address_write_ack(addr)?;
                    }
                }

                match op {
                    Operation::Write(bytes) => bus.send_all(bytes)?,
                    Operation::Read(buffer) => bus.receive_all(buffer, more_reads)?,
                }
                previous_read = Some(is_read);
            }
            Ok(())
        })
    }

    /// START, then `body`, then exactly one STOP once the result is known.
    fn with_bus<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, TwiError>,
    ) -> Result<T, TwiError> {
        self.start()?;
        let result = body(self);
        self.stop();
        result
    }

    fn send_all(&mut self, bytes: &[u8]) -> Result<(), TwiError> {
        for &b in bytes {
            self.data_write_ack(b)?;
        }
        Ok(())
    }

    /// `continues`: the read goes on in a following operation, so even the
    /// last byte of `buffer` is acknowledged.
    fn receive_all(&mut self, buffer: &mut [u8], continues: bool) -> Result<(), TwiError> {
        let len = buffer.len();
        for (i, slot) in buffer.iter_mut().enumerate() {
            *slot = self.data_read_ack(continues || i + 1 < len)?;
        }
        Ok(())
    }

    fn run_phase(
        &mut self,
        command: Command,
        expected: BusStatus,
        failure: TwiError,
    ) -> Result<(), TwiError> {
        let mark = self.latch.events();
        self.hardware.issue(command);
        self.await_status(mark, expected, failure)
    }

    /// Poll up to `timeout` times for a status recorded after `mark`.
    ///
    /// The first fresh status decides the phase: `expected` passes, anything
    /// else (a refusal included) fails with `failure` without further polling.
    fn await_status(
        &mut self,
        mark: u8,
        expected: BusStatus,
        failure: TwiError,
    ) -> Result<(), TwiError> {
        for _ in 0..self.timeout.polls() {
            if self.latch.events() != mark {
                return match self.latch.status() {
                    Some(status) if status == expected => Ok(()),
                    _ => Err(failure),
                };
            }
            self.hardware.relax();
        }
        Err(failure)
    }
}
