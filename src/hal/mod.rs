// Licensed under the Apache-2.0 license

//! Register bindings for supported microcontrollers.

#[cfg(feature = "atmega328p")]
pub mod atmega328p;
