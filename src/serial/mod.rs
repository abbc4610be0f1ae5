// Licensed under the Apache-2.0 license

//! Serial link to the host.
//!
//! Transmission is blocking; reception is interrupt driven through the
//! process-wide [`RX_RING`].

pub mod common;
pub mod ring;
pub mod serial_link;
pub mod traits;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use common::{Config, Parity, StopBits, WordLength};
pub use ring::{ReceiveRing, SharedRing, RX_BUFFER_SIZE, RX_RING};
pub use serial_link::SerialLink;
pub use traits::UsartHardware;
