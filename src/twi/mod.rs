// Licensed under the Apache-2.0 license

//! Interrupt-driven two-wire (I2C) master.

pub mod common;
pub mod error;
pub mod i2c_controller;
pub mod master;
pub mod status;
pub mod traits;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use common::{PhaseTimeout, TwiConfig, TwiConfigBuilder, TwiSpeed};
pub use error::{result_code, TwiError, OK};
pub use i2c_controller::TwiController;
pub use master::TwiMaster;
pub use status::{BusStatus, StatusLatch, STATUS_MASK, TWI_STATUS};
pub use traits::{Command, TwiHardware};
