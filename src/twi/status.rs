// Licensed under the Apache-2.0 license

//! Two-wire bus status codes and the interrupt-fed status latch.

use core::sync::atomic::{AtomicU8, Ordering};

/// Mask applied to the raw status register: drops the prescaler and reserved bits.
pub const STATUS_MASK: u8 = 0xF8;

/// Master-mode status codes reported by the two-wire peripheral.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum BusStatus {
    Start = 0x08,
    RepeatedStart = 0x10,
    AddressWriteAck = 0x18,
    AddressWriteNack = 0x20,
    DataWriteAck = 0x28,
    DataWriteNack = 0x30,
    ArbitrationLost = 0x38,
    AddressReadAck = 0x40,
    AddressReadNack = 0x48,
    DataReadAck = 0x50,
    DataReadNack = 0x58,
    Idle = 0xF8,
}

impl BusStatus {
    /// Every known code, in register order.
    pub const ALL: [BusStatus; 12] = [
        Self::Start,
        Self::RepeatedStart,
        Self::AddressWriteAck,
        Self::AddressWriteNack,
        Self::DataWriteAck,
        Self::DataWriteNack,
        Self::ArbitrationLost,
        Self::AddressReadAck,
        Self::AddressReadNack,
        Self::DataReadAck,
        Self::DataReadNack,
        Self::Idle,
    ];

    /// Decode a masked status byte.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x08 => Some(Self::Start),
            0x10 => Some(Self::RepeatedStart),
            0x18 => Some(Self::AddressWriteAck),
            0x20 => Some(Self::AddressWriteNack),
            0x28 => Some(Self::DataWriteAck),
            0x30 => Some(Self::DataWriteNack),
            0x38 => Some(Self::ArbitrationLost),
            0x40 => Some(Self::AddressReadAck),
            0x48 => Some(Self::AddressReadNack),
            0x50 => Some(Self::DataReadAck),
            0x58 => Some(Self::DataReadNack),
            0xF8 => Some(Self::Idle),
            _ => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Most recent bus status delivered by the two-wire interrupt.
///
/// Single writer (the interrupt handler, through [`record`](Self::record)),
/// single reader (the mainline engine). Besides the status byte the latch
/// keeps an event counter that the handler bumps after every store, so the
/// reader can tell a status delivered after it issued a command from a stale
/// one left over by the previous phase. Only atomic loads and stores are
/// used, which every target with 8-bit atomics provides.
#[derive(Debug)]
pub struct StatusLatch {
    status: AtomicU8,
    events: AtomicU8,
}

impl Default for StatusLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLatch {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: AtomicU8::new(BusStatus::Idle.code()),
            events: AtomicU8::new(0),
        }
    }

    /// Store a raw status register value. Interrupt context only.
    #[inline]
    pub fn record(&self, raw: u8) {
        self.status.store(raw & STATUS_MASK, Ordering::Relaxed);
        let next = self.events.load(Ordering::Relaxed).wrapping_add(1);
        self.events.store(next, Ordering::Release);
    }

    /// Masked status byte as last recorded.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> u8 {
        self.status.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn status(&self) -> Option<BusStatus> {
        BusStatus::from_code(self.raw())
    }

    /// Event counter; changes every time the interrupt records a status.
    #[inline]
    #[must_use]
    pub fn events(&self) -> u8 {
        self.events.load(Ordering::Acquire)
    }
}

/// Process-wide latch written by the two-wire interrupt.
pub static TWI_STATUS: StatusLatch = StatusLatch::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table_round_trips() {
        for status in BusStatus::ALL {
            assert_eq!(BusStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(BusStatus::from_code(0x00), None);
        assert_eq!(BusStatus::from_code(0x60), None);
    }

    #[test]
    fn test_code_values_match_hardware() {
        assert_eq!(BusStatus::Start.code(), 0x08);
        assert_eq!(BusStatus::AddressWriteAck.code(), 0x18);
        assert_eq!(BusStatus::DataWriteAck.code(), 0x28);
        assert_eq!(BusStatus::ArbitrationLost.code(), 0x38);
        assert_eq!(BusStatus::DataReadNack.code(), 0x58);
        assert_eq!(BusStatus::Idle.code(), 0xF8);
    }

    #[test]
    fn test_latch_starts_idle() {
        let latch = StatusLatch::new();

        assert_eq!(latch.status(), Some(BusStatus::Idle));
        assert_eq!(latch.events(), 0);
    }

    #[test]
    fn test_record_masks_prescaler_bits_and_counts_events() {
        let latch = StatusLatch::new();

        latch.record(0x08 | 0x03);
        assert_eq!(latch.raw(), 0x08);
        assert_eq!(latch.status(), Some(BusStatus::Start));
        assert_eq!(latch.events(), 1);

        latch.record(0x28);
        latch.record(0x28);
        assert_eq!(latch.status(), Some(BusStatus::DataWriteAck));
        assert_eq!(latch.events(), 3);
    }

    #[test]
    fn test_event_counter_wraps() {
        let latch = StatusLatch::new();

        for _ in 0..=u8::MAX {
            latch.record(0xF8);
        }

        assert_eq!(latch.events(), 0);
    }
}
