// Licensed under the Apache-2.0 license

//! Receive ring buffer shared between the receive interrupt and mainline code.
//!
//! [`ReceiveRing`] is the plain fixed-capacity structure: a byte arena with a
//! write cursor, a read cursor and a pending count, all advancing modulo `N`.
//! [`SharedRing`] places one behind a `critical_section::Mutex` so that the
//! interrupt handler (producer) and mainline (consumer) observe consistent
//! cursor/count updates without any allocation.
//!
//! # Overrun
//!
//! The producer never blocks and never rejects a byte. Pushing into a full
//! ring overwrites the oldest unread byte: `pending_count` stays at `N` and the
//! read cursor moves past the lost byte, so the surviving bytes are still
//! returned in arrival order. The loss itself is silent for `pop`; it is only
//! recorded in an overrun flag that callers can inspect with
//! [`ReceiveRing::take_overrun`].

use core::cell::RefCell;
use critical_section::Mutex;

/// Capacity of the serial receive buffer.
pub const RX_BUFFER_SIZE: usize = 128;

/// Fixed-capacity circular byte buffer.
pub struct ReceiveRing<const N: usize> {
    buf: [u8; N],
    write_pos: usize,
    read_pos: usize,
    count: usize,
    overrun: bool,
}

impl<const N: usize> Default for ReceiveRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ReceiveRing<N> {
    /// An empty ring. A zero capacity is rejected at compile time:
    ///
    /// ```compile_fail
    /// let ring = atmega_ddk::serial::ReceiveRing::<0>::new();
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        const { assert!(N > 0, "ReceiveRing capacity must be non-zero") };
        Self {
            buf: [0; N],
            write_pos: 0,
            read_pos: 0,
            count: 0,
            overrun: false,
        }
    }

    /// Append one byte, overwriting the oldest unread byte when full.
    pub fn push(&mut self, byte: u8) {
        if let Some(slot) = self.buf.get_mut(self.write_pos) {
            *slot = byte;
        }
        self.write_pos = (self.write_pos + 1) % N;

        if self.count == N {
            self.read_pos = (self.read_pos + 1) % N;
            self.overrun = true;
        } else {
            self.count += 1;
        }
    }

    /// Remove and return the oldest unread byte, or `None` when empty.
    pub fn pop(&mut self) -> Option<u8> {
        if self.count == 0 {
            return None;
        }
        let byte = self.buf.get(self.read_pos).copied();
        self.read_pos = (self.read_pos + 1) % N;
        self.count -= 1;
        byte
    }

    /// Number of bytes waiting to be read, always in `0..=N`.
    #[must_use]
    pub const fn pending_count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Report whether any byte was overwritten since the last call, clearing the flag.
    pub fn take_overrun(&mut self) -> bool {
        core::mem::replace(&mut self.overrun, false)
    }

    /// Discard all pending bytes and the overrun flag.
    pub fn clear(&mut self) {
        self.read_pos = self.write_pos;
        self.count = 0;
        self.overrun = false;
    }
}

/// A [`ReceiveRing`] that can live in a `static` and be reached from an interrupt.
///
/// [`push`](Self::push) is meant for the receive interrupt only; every other
/// method is for mainline code. All accesses run inside a critical section,
/// which on a single-core part only masks interrupts for a few instructions.
pub struct SharedRing<const N: usize> {
    inner: Mutex<RefCell<ReceiveRing<N>>>,
}

impl<const N: usize> Default for SharedRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SharedRing<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(ReceiveRing::new())),
        }
    }

    /// Producer side. Call only from the receive interrupt handler.
    #[inline]
    pub fn push(&self, byte: u8) {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).push(byte));
    }

    pub fn pop(&self) -> Option<u8> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).pop())
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).pending_count())
    }

    pub fn take_overrun(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take_overrun())
    }

    pub fn clear(&self) {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).clear());
    }
}

/// Process-wide receive buffer filled by the USART receive interrupt.
pub static RX_RING: SharedRing<RX_BUFFER_SIZE> = SharedRing::new();
