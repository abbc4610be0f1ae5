// Licensed under the Apache-2.0 license

//! Simulated two-wire peripheral for host tests and downstream driver tests.
//!
//! [`SimTwi`] plays both the register block and the interrupt handler: when a
//! command is issued it decides which status the hardware would report and
//! records it into the shared [`StatusLatch`], the same way the two-wire
//! interrupt handler does on the target. By default every phase is
//! acknowledged like a cooperating device would; a script of [`Reply`]
//! entries overrides that one interrupt at a time.

use heapless::{Deque, Vec};

use super::status::{BusStatus, StatusLatch};
use super::traits::{Command, TwiHardware};

/// Bus events kept by [`SimTwi`].
pub const SIM_LOG_CAPACITY: usize = 64;

/// Scripted replies and queued receive bytes [`SimTwi`] can hold.
pub const SIM_SCRIPT_CAPACITY: usize = 32;

/// What the simulated bus saw, in order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusEvent {
    Start,
    RepeatedStart,
    Stop,
    /// Address byte on the wire: `(address << 1) | read`.
    Address(u8),
    Data(u8),
    /// Byte received and acknowledged by the master.
    ReadAck(u8),
    /// Byte received and not acknowledged by the master.
    ReadNack(u8),
}

/// Interrupt behavior for one issued command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Report the status a cooperating device produces for this phase.
    Ack,
    /// Report this raw status register value.
    Status(u8),
    /// Report `status` only after the engine has polled `polls` times.
    Delayed { polls: u16, status: u8 },
    /// Never raise the interrupt.
    Silent,
}

#[derive(Debug)]
pub struct SimTwi<'a> {
    latch: &'a StatusLatch,
    bit_rate: Option<u8>,
    enabled: bool,
    claimed: bool,
    expect_address: bool,
    data: u8,
    pending: Option<(u16, u8)>,
    relaxes: u32,
    script: Deque<Reply, SIM_SCRIPT_CAPACITY>,
    rx: Deque<u8, SIM_SCRIPT_CAPACITY>,
    log: Vec<BusEvent, SIM_LOG_CAPACITY>,
}

impl<'a> SimTwi<'a> {
    #[must_use]
    pub fn new(latch: &'a StatusLatch) -> Self {
        Self {
            latch,
            bit_rate: None,
            enabled: false,
            claimed: false,
            expect_address: false,
            data: 0,
            pending: None,
            relaxes: 0,
            script: Deque::new(),
            rx: Deque::new(),
            log: Vec::new(),
        }
    }

    /// Queue replies for the next interrupts, in order.
    ///
    /// Replies beyond [`SIM_SCRIPT_CAPACITY`] are dropped.
    #[must_use]
    pub fn with_script(mut self, replies: &[Reply]) -> Self {
        for &reply in replies {
            let _ = self.script.push_back(reply);
        }
        self
    }

    /// Bytes the addressed device returns on reads. `0xFF` once exhausted.
    #[must_use]
    pub fn with_rx_data(mut self, bytes: &[u8]) -> Self {
        for &b in bytes {
            let _ = self.rx.push_back(b);
        }
        self
    }

    #[must_use]
    pub fn bit_rate(&self) -> Option<u8> {
        self.bit_rate
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of times the engine polled without seeing a new status.
    #[must_use]
    pub fn relaxes(&self) -> u32 {
        self.relaxes
    }

    #[must_use]
    pub fn log(&self) -> &[BusEvent] {
        &self.log
    }

    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.log.iter().filter(|e| **e == BusEvent::Stop).count()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
        self.relaxes = 0;
    }

    fn record(&mut self, event: BusEvent) {
        let _ = self.log.push(event);
    }

    fn respond(&mut self, natural: BusStatus) {
        match self.script.pop_front().unwrap_or(Reply::Ack) {
            Reply::Ack => self.latch.record(natural.code()),
            Reply::Status(raw) => self.latch.record(raw),
            Reply::Delayed { polls: 0, status } => self.latch.record(status),
            Reply::Delayed { polls, status } => self.pending = Some((polls, status)),
            Reply::Silent => {}
        }
    }
}

impl TwiHardware for SimTwi<'_> {
    fn set_bit_rate(&mut self, divisor: u8) {
        self.bit_rate = Some(divisor);
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn issue(&mut self, command: Command) {
        self.pending = None;
        let natural = match command {
            Command::Start => {
                let repeated = self.claimed;
                self.claimed = true;
                self.expect_address = true;
                if repeated {
                    self.record(BusEvent::RepeatedStart);
                    BusStatus::RepeatedStart
                } else {
                    self.record(BusEvent::Start);
                    BusStatus::Start
                }
            }
            Command::Stop => {
                self.claimed = false;
                self.expect_address = false;
                self.record(BusEvent::Stop);
                return;
            }
            Command::Transmit if self.expect_address => {
                self.expect_address = false;
                self.record(BusEvent::Address(self.data));
                if self.data & 1 == 1 {
                    BusStatus::AddressReadAck
                } else {
                    BusStatus::AddressWriteAck
                }
            }
            Command::Transmit => {
                self.record(BusEvent::Data(self.data));
                BusStatus::DataWriteAck
            }
            Command::ReceiveAck => {
                self.data = self.rx.pop_front().unwrap_or(0xFF);
                self.record(BusEvent::ReadAck(self.data));
                BusStatus::DataReadAck
            }
            Command::ReceiveNack => {
                self.data = self.rx.pop_front().unwrap_or(0xFF);
                self.record(BusEvent::ReadNack(self.data));
                BusStatus::DataReadNack
            }
        };
        self.respond(natural);
    }

    fn write_data(&mut self, byte: u8) {
        self.data = byte;
    }

    fn read_data(&mut self) -> u8 {
        self.data
    }

    fn relax(&mut self) {
        self.relaxes += 1;
        match self.pending {
            Some((1, status)) => {
                self.pending = None;
                self.latch.record(status);
            }
            Some((polls, status)) => self.pending = Some((polls - 1, status)),
            None => {}
        }
    }
}
