// Licensed under the Apache-2.0 license

//! Register-level seam between [`SerialLink`](super::SerialLink) and a USART.

use super::common::Config;

/// Minimal USART register interface.
///
/// Implementations touch registers only; buffering, divisor math and
/// framing policy stay in `SerialLink`. The receive path is not part of this
/// trait: received bytes arrive through the receive interrupt, which pushes
/// them into the shared receive ring.
pub trait UsartHardware {
    /// Program the baud divisor, speed doubling and frame format.
    fn configure(&mut self, divisor: u16, config: &Config);

    /// Enable receiver, transmitter and the receive-complete interrupt.
    fn enable(&mut self);

    /// `true` when the transmit data register can accept another byte.
    fn is_tx_ready(&self) -> bool;

    /// Load one byte into the transmit data register.
    fn write_data(&mut self, byte: u8);

    /// Called once per spin while waiting for the transmitter.
    #[inline]
    fn relax(&mut self) {
        core::hint::spin_loop();
    }
}
