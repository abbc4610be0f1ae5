// Licensed under the Apache-2.0 license

//! `embedded-hal` I2C front end for the two-wire engine.
//!
//! [`TwiMaster`] stays silent and only returns result codes. This wrapper is
//! what collaborators hold: it exposes the standard `I2c` trait and reports
//! failed transactions through an optional [`Logger`].

use core::fmt::Write;

use embedded_hal::i2c::{Operation, SevenBitAddress};
use heapless::String;

use super::common::TwiConfig;
use super::error::{result_code, TwiError};
use super::master::TwiMaster;
use super::traits::TwiHardware;
use crate::common::{ConfigurationError, Logger, NoOpLogger};

pub struct TwiController<'a, H: TwiHardware, L: Logger = NoOpLogger> {
    pub master: TwiMaster<'a, H>,
    pub logger: L,
}

impl<'a, H: TwiHardware> TwiController<'a, H> {
    pub fn without_logger(master: TwiMaster<'a, H>) -> Self {
        Self::new(master, NoOpLogger)
    }
}

impl<'a, H: TwiHardware, L: Logger> TwiController<'a, H, L> {
    pub fn new(master: TwiMaster<'a, H>, logger: L) -> Self {
        Self { master, logger }
    }

    /// Configure the bus, then address `addr` with no payload and return the
    /// result code.
    ///
    /// # Errors
    ///
    /// The rejected configuration. It is logged, and nothing is sent on the bus.
    pub fn bring_up(
        &mut self,
        config: &TwiConfig,
        addr: SevenBitAddress,
    ) -> Result<u8, ConfigurationError> {
        if let Err(e) = self.master.init(config) {
            let mut msg: String<64> = String::new();
            let _ = write!(msg, "twi init: {e}");
            self.logger.error(&msg);
            return Err(e);
        }
        Ok(result_code(&self.probe(addr)))
    }

    /// Address `addr` with no payload to find out whether a device answers.
    ///
    /// # Errors
    ///
    /// The failing phase; [`TwiError::AddressWrite`] when nothing acknowledged.
    pub fn probe(&mut self, addr: SevenBitAddress) -> Result<(), TwiError> {
        let result = self.master.write_bytes(addr, &[]);
        match result {
            Ok(()) => self.report_ok("probe", addr),
            Err(e) => self.report_err("probe", addr, e),
        }
        result
    }

    pub fn free(self) -> (TwiMaster<'a, H>, L) {
        (self.master, self.logger)
    }

    fn check<T>(
        &mut self,
        op: &str,
        addr: SevenBitAddress,
        result: Result<T, TwiError>,
    ) -> Result<T, TwiError> {
        if let Err(e) = &result {
            self.report_err(op, addr, *e);
        }
        result
    }

    fn report_ok(&mut self, op: &str, addr: SevenBitAddress) {
        let mut msg: String<64> = String::new();
        let _ = write!(msg, "twi {op} {addr:#04x}: ok");
        self.logger.debug(&msg);
    }

    fn report_err(&mut self, op: &str, addr: SevenBitAddress, err: TwiError) {
        let mut msg: String<64> = String::new();
        let _ = write!(msg, "twi {op} {addr:#04x}: {err} ({})", err.code());
        self.logger.error(&msg);
    }
}

impl<H: TwiHardware, L: Logger> embedded_hal::i2c::ErrorType for TwiController<'_, H, L> {
    type Error = TwiError;
}

impl<H: TwiHardware, L: Logger> embedded_hal::i2c::I2c for TwiController<'_, H, L> {
    fn read(&mut self, addr: SevenBitAddress, buffer: &mut [u8]) -> Result<(), Self::Error> {
        let result = self.master.read(addr, buffer);
        self.check("read", addr, result)
    }

    fn write(&mut self, addr: SevenBitAddress, bytes: &[u8]) -> Result<(), Self::Error> {
        let result = self.master.write_bytes(addr, bytes);
        self.check("write", addr, result)
    }

    fn write_read(
        &mut self,
        addr: SevenBitAddress,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        let result = self.master.write_read(addr, bytes, buffer);
        self.check("write_read", addr, result)
    }

    fn transaction(
        &mut self,
        addr: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let result = self.master.transaction(addr, operations);
        self.check("transaction", addr, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twi::sim::{BusEvent, Reply, SimTwi};
    use crate::twi::common::{TwiConfigBuilder, TwiSpeed};
    use crate::twi::error::OK;
    use crate::twi::status::{BusStatus, StatusLatch};
    use embedded_hal::i2c::{Error, ErrorKind, I2c, NoAcknowledgeSource};
    use fugit::RateExtU32;

    #[derive(Default)]
    struct RecordingLogger {
        debug: std::vec::Vec<std::string::String>,
        error: std::vec::Vec<std::string::String>,
    }

    impl Logger for RecordingLogger {
        fn debug(&mut self, msg: &str) {
            self.debug.push(msg.to_owned());
        }
        fn error(&mut self, msg: &str) {
            self.error.push(msg.to_owned());
        }
    }

    #[test]
    fn test_i2c_write_through_trait() {
        let latch = StatusLatch::new();
        let mut bus = TwiController::without_logger(TwiMaster::new(SimTwi::new(&latch), &latch));

        bus.write(0x27, &[0xA5, 0x5A]).unwrap();

        assert_eq!(
            bus.master.hardware().log(),
            &[
                BusEvent::Start,
                BusEvent::Address(0x4E),
                BusEvent::Data(0xA5),
                BusEvent::Data(0x5A),
                BusEvent::Stop
            ]
        );
    }

    #[test]
    fn test_failures_are_logged_with_code() {
        let latch = StatusLatch::new();
        let sim = SimTwi::new(&latch).with_script(&[
            Reply::Ack,
            Reply::Status(BusStatus::AddressReadNack.code()),
        ]);
        let mut bus = TwiController::new(TwiMaster::new(sim, &latch), RecordingLogger::default());
        let mut buf = [0u8; 2];

        let err = bus.read(0x50, &mut buf).unwrap_err();

        assert_eq!(err, TwiError::AddressRead);
        assert_eq!(
            err.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );
        assert_eq!(
            bus.logger.error,
            ["twi read 0x50: address+read not acknowledged (3)"]
        );
        assert!(bus.logger.debug.is_empty());
    }

    #[test]
    fn test_success_is_silent() {
        let latch = StatusLatch::new();
        let sim = SimTwi::new(&latch).with_rx_data(&[0x99]);
        let mut bus = TwiController::new(TwiMaster::new(sim, &latch), RecordingLogger::default());
        let mut buf = [0u8; 1];

        bus.write_read(0x27, &[0x00], &mut buf).unwrap();

        assert_eq!(buf, [0x99]);
        assert!(bus.logger.error.is_empty());
        assert!(bus.logger.debug.is_empty());
    }

    #[test]
    fn test_presence_check_addresses_without_payload() {
        let latch = StatusLatch::new();
        let mut bus = TwiController::new(
            TwiMaster::new(SimTwi::new(&latch), &latch),
            RecordingLogger::default(),
        );

        assert_eq!(bus.probe(0x27), Ok(()));
        assert_eq!(
            bus.master.hardware().log(),
            &[BusEvent::Start, BusEvent::Address(0x4E), BusEvent::Stop]
        );
        assert_eq!(bus.logger.debug, ["twi probe 0x27: ok"]);
    }

    #[test]
    fn test_presence_check_missing_device() {
        let latch = StatusLatch::new();
        let sim = SimTwi::new(&latch).with_script(&[Reply::Silent]);
        let mut master = TwiMaster::new(sim, &latch);
        master.set_timeout(crate::twi::PhaseTimeout::from_polls(4));
        let mut bus = TwiController::new(master, RecordingLogger::default());

        assert_eq!(bus.probe(0x27), Err(TwiError::Start));
        assert_eq!(bus.logger.error, ["twi probe 0x27: start condition timed out (1)"]);

        let (master, _) = bus.free();
        assert_eq!(master.hardware().stop_count(), 0);
    }

    #[test]
    fn test_bring_up_checks_configured_bus() {
        let latch = StatusLatch::new();
        let mut bus = TwiController::new(
            TwiMaster::new(SimTwi::new(&latch), &latch),
            RecordingLogger::default(),
        );

        assert_eq!(bus.bring_up(&TwiConfig::default(), 0x27), Ok(OK));
        assert_eq!(bus.master.hardware().bit_rate(), Some(72));
        assert_eq!(
            bus.master.hardware().log(),
            &[BusEvent::Start, BusEvent::Address(0x4E), BusEvent::Stop]
        );
    }

    #[test]
    fn test_bring_up_skips_bus_on_rejected_config() {
        let latch = StatusLatch::new();
        let mut bus = TwiController::new(
            TwiMaster::new(SimTwi::new(&latch), &latch),
            RecordingLogger::default(),
        );
        let config = TwiConfigBuilder::new()
            .speed(TwiSpeed::Custom(2.MHz()))
            .build();

        assert_eq!(
            bus.bring_up(&config, 0x27),
            Err(ConfigurationError::RateTooHigh)
        );
        assert!(bus.master.hardware().log().is_empty());
        assert_eq!(bus.master.hardware().relaxes(), 0);
        assert!(!bus.master.hardware().is_enabled());
        assert_eq!(
            bus.logger.error,
            ["twi init: rate exceeds what the peripheral clock can generate"]
        );
    }

    #[test]
    fn test_bring_up_reports_missing_device_code() {
        let latch = StatusLatch::new();
        let sim = SimTwi::new(&latch).with_script(&[
            Reply::Ack,
            Reply::Status(BusStatus::AddressWriteNack.code()),
        ]);
        let mut bus = TwiController::new(TwiMaster::new(sim, &latch), RecordingLogger::default());

        assert_eq!(
            bus.bring_up(&TwiConfig::default(), 0x27),
            Ok(TwiError::AddressWrite.code())
        );
        assert_eq!(bus.master.hardware().stop_count(), 1);
    }
}
