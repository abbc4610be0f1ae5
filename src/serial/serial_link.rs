// Licensed under the Apache-2.0 license

//! Host serial link: blocking transmit, interrupt-buffered receive.

use core::convert::Infallible;

use super::common::Config;
use super::ring::{SharedRing, RX_BUFFER_SIZE};
use super::traits::UsartHardware;
use crate::common::{ConfigurationError, Logger};

/// Serial link to the host.
///
/// Transmission busy-waits on the hardware. Reception never touches the
/// hardware: the receive interrupt fills `rx` and this type drains it.
///
/// # Liveness
///
/// [`send_byte`](Self::send_byte) spins until the transmitter is ready and has
/// no timeout. A transmitter that never becomes ready hangs the caller; use
/// [`try_send_byte`](Self::try_send_byte) where that is not acceptable.
pub struct SerialLink<'a, H: UsartHardware, const N: usize = RX_BUFFER_SIZE> {
    hardware: H,
    rx: &'a SharedRing<N>,
}

impl<'a, H: UsartHardware, const N: usize> SerialLink<'a, H, N> {
    pub fn new(hardware: H, rx: &'a SharedRing<N>) -> Self {
        Self { hardware, rx }
    }

    /// Configure the divisor and frame, then enable the receive interrupt.
    ///
    /// From this point on the receive interrupt starts filling the ring.
    ///
    /// # Errors
    ///
    /// Returns an error if the baud rate cannot be generated from the clock.
    pub fn init(&mut self, config: &Config) -> Result<(), ConfigurationError> {
        let divisor = config.baud_divisor()?;
        self.hardware.configure(divisor, config);
        self.hardware.enable();
        Ok(())
    }

    /// Transmit one byte, spinning until the data register is empty.
    pub fn send_byte(&mut self, byte: u8) {
        while !self.hardware.is_tx_ready() {
            self.hardware.relax();
        }
        self.hardware.write_data(byte);
    }

    /// Transmit one byte if the data register is empty.
    ///
    /// # Errors
    ///
    /// `nb::Error::WouldBlock` while the transmitter is busy.
    pub fn try_send_byte(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        if !self.hardware.is_tx_ready() {
            return Err(nb::Error::WouldBlock);
        }
        self.hardware.write_data(byte);
        Ok(())
    }

    pub fn send_array(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.send_byte(b);
        }
    }

    /// Transmit the string followed by a terminating NUL byte.
    pub fn send_string(&mut self, s: &str) {
        self.send_array(s.as_bytes());
        self.send_byte(0);
    }

    /// Number of received bytes waiting to be read.
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.rx.pending_count()
    }

    /// Oldest received byte.
    ///
    /// # Errors
    ///
    /// `nb::Error::WouldBlock` when nothing has been received.
    pub fn read_byte(&mut self) -> nb::Result<u8, Infallible> {
        self.rx.pop().ok_or(nb::Error::WouldBlock)
    }

    /// Whether received bytes were overwritten since the last call.
    pub fn take_overrun(&mut self) -> bool {
        self.rx.take_overrun()
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

    fn send_line(&mut self, prefix: &str, msg: &str) {
        self.send_array(prefix.as_bytes());
        self.send_array(msg.as_bytes());
        self.send_array(b"\r\n");
    }
}

impl<H: UsartHardware, const N: usize> embedded_io::ErrorType for SerialLink<'_, H, N> {
    type Error = Infallible;
}

impl<H: UsartHardware, const N: usize> embedded_io::Write for SerialLink<'_, H, N> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.send_array(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<H: UsartHardware, const N: usize> embedded_io::Read for SerialLink<'_, H, N> {
    /// Blocks until at least one byte is buffered, then drains up to `buf.len()`.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.rx.pending_count() == 0 {
            core::hint::spin_loop();
        }

        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.rx.pop() {
                Some(b) => *slot = b,
                None => break,
            }
            count += 1;
        }
        Ok(count)
    }
}

impl<H: UsartHardware, const N: usize> embedded_io::ReadReady for SerialLink<'_, H, N> {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.rx.pending_count() > 0)
    }
}

impl<H: UsartHardware, const N: usize> embedded_io::WriteReady for SerialLink<'_, H, N> {
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.hardware.is_tx_ready())
    }
}

impl<H: UsartHardware, const N: usize> Logger for SerialLink<'_, H, N> {
    fn debug(&mut self, msg: &str) {
        self.send_line("[D] ", msg);
    }

    fn error(&mut self, msg: &str) {
        self.send_line("[E] ", msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::sim::SimUsart;
    use embedded_io::{Read, ReadReady, Write};

    #[test]
    fn test_init_programs_divisor_and_enables() {
        let rx = SharedRing::<8>::new();
        let mut link = SerialLink::new(SimUsart::new(), &rx);

        link.init(&Config::new(9600, false)).unwrap();

        let hw = link.hardware();
        assert_eq!(hw.divisor(), Some(103));
        assert!(!hw.double_speed());
        assert!(hw.is_enabled());
    }

    #[test]
    fn test_init_rejects_bad_baud_and_leaves_hardware_untouched() {
        let rx = SharedRing::<8>::new();
        let mut link = SerialLink::new(SimUsart::new(), &rx);

        assert_eq!(
            link.init(&Config::new(0, true)),
            Err(ConfigurationError::ZeroRate)
        );
        assert_eq!(link.hardware().divisor(), None);
        assert!(!link.hardware().is_enabled());
    }

    #[test]
    fn test_send_string_appends_nul() {
        let rx = SharedRing::<8>::new();
        let mut link = SerialLink::new(SimUsart::new(), &rx);

        link.send_string("Hi\n\r");

        assert_eq!(link.hardware().sent(), b"Hi\n\r\0");
    }

    #[test]
    fn test_send_byte_waits_for_transmitter() {
        let rx = SharedRing::<8>::new();
        let mut link = SerialLink::new(SimUsart::with_busy_polls(5), &rx);

        link.send_array(&[0x10, 0x20]);

        assert_eq!(link.hardware().sent(), &[0x10, 0x20]);
        assert_eq!(link.hardware().busy_spins(), 10);
    }

    #[test]
    fn test_try_send_byte_would_block_while_busy() {
        let rx = SharedRing::<8>::new();
        let mut link = SerialLink::new(SimUsart::with_busy_polls(1), &rx);

        assert_eq!(link.try_send_byte(0x41), Err(nb::Error::WouldBlock));
        link.hardware_mut().relax();
        assert_eq!(link.try_send_byte(0x41), Ok(()));
        assert_eq!(link.hardware().sent(), b"A");
    }

    #[test]
    fn test_read_byte_drains_interrupt_buffer() {
        let rx = SharedRing::<8>::new();
        let mut link = SerialLink::new(SimUsart::new(), &rx);

        assert_eq!(link.read_count(), 0);
        assert_eq!(link.read_byte(), Err(nb::Error::WouldBlock));

        rx.push(b'o');
        rx.push(b'k');
        assert_eq!(link.read_count(), 2);
        assert_eq!(nb::block!(link.read_byte()), Ok(b'o'));
        assert_eq!(nb::block!(link.read_byte()), Ok(b'k'));
        assert_eq!(link.read_count(), 0);
    }

    #[test]
    fn test_echo_loop() {
        let rx = SharedRing::<8>::new();
        let mut link = SerialLink::new(SimUsart::new(), &rx);

        for &b in b"echo" {
            rx.push(b);
        }
        while link.read_count() > 0 {
            if let Ok(b) = link.read_byte() {
                link.send_byte(b);
            }
        }

        assert_eq!(link.hardware().sent(), b"echo");
    }

    #[test]
    fn test_overrun_is_reported_once() {
        let rx = SharedRing::<2>::new();
        let mut link = SerialLink::new(SimUsart::new(), &rx);

        for b in 0..3 {
            rx.push(b);
        }

        assert!(link.take_overrun());
        assert!(!link.take_overrun());
        assert_eq!(link.read_byte(), Ok(1));
        assert_eq!(link.read_byte(), Ok(2));
    }

    #[test]
    fn test_embedded_io_read_and_write() {
        let rx = SharedRing::<8>::new();
        let mut link = SerialLink::new(SimUsart::new(), &rx);

        assert_eq!(link.read_ready(), Ok(false));
        rx.push(1);
        rx.push(2);
        rx.push(3);
        assert_eq!(link.read_ready(), Ok(true));

        let mut buf = [0u8; 2];
        assert_eq!(link.read(&mut buf), Ok(2));
        assert_eq!(buf, [1, 2]);
        let mut buf = [0u8; 4];
        assert_eq!(link.read(&mut buf), Ok(1));
        assert_eq!(buf[0], 3);

        link.write_all(b"ok").unwrap();
        write!(link, "{}", 42).unwrap();
        assert_eq!(link.hardware().sent(), b"ok42");
    }

    #[test]
    fn test_logger_prefixes_lines() {
        let rx = SharedRing::<8>::new();
        let mut link = SerialLink::new(SimUsart::new(), &rx);

        link.debug("ready");
        link.error("bus");

        assert_eq!(link.hardware().sent(), b"[D] ready\r\n[E] bus\r\n");
    }
}
