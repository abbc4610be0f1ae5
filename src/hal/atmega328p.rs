// Licensed under the Apache-2.0 license

//! ATmega328P two-wire and USART0 drivers on top of the `avr-device` PAC.
//!
//! The interrupt handler bodies live here as plain functions; the firmware
//! binary wires them to the `TWI` and `USART_RX` vectors.

use avr_device::atmega328p::{PORTC, TWI, USART0};

use crate::serial::{Config, Parity, StopBits, UsartHardware, WordLength, RX_RING};
use crate::twi::{Command, TwiHardware, TWI_STATUS};

/// SDA (PC4) and SCL (PC5) pull-up bits in PORTC.
const TWI_PULLUPS: u8 = (1 << 4) | (1 << 5);

/// Two-wire interrupt body.
///
/// Records the status and masks the interrupt. The interrupt flag stays set
/// until the next command clears it and re-arms the interrupt, so every
/// command produces exactly one latch event.
#[inline(always)]
pub fn on_twi_interrupt() {
    // SAFETY: the handler only reads TWSR and writes TWCR while `Twi0` is
    // waiting on the latch; mainline never touches TWCR during that window.
    let twi = unsafe { &*TWI::ptr() };
    TWI_STATUS.record(twi.twsr().read().bits());
    twi.twcr().write(|w| w.twen().set_bit());
}

/// USART receive-complete interrupt body: one byte into the receive ring.
#[inline(always)]
pub fn on_usart_rx_interrupt() {
    // SAFETY: UDR0 reads belong to this handler; `Usart0` only writes UDR0.
    let usart = unsafe { &*USART0::ptr() };
    RX_RING.push(usart.udr0().read().bits());
}

/// Two-wire peripheral in master mode, with the SDA/SCL port pins.
pub struct Twi0 {
    twi: TWI,
    portc: PORTC,
}

impl Twi0 {
    pub fn new(twi: TWI, portc: PORTC) -> Self {
        Self { twi, portc }
    }

    pub fn free(self) -> (TWI, PORTC) {
        (self.twi, self.portc)
    }
}

impl TwiHardware for Twi0 {
    fn set_bit_rate(&mut self, divisor: u8) {
        // SAFETY: prescaler bits 0 select a prescaler of 1; the status bits
        // are read-only. Any TWBR value is a valid divisor.
        self.twi.twsr().write(|w| unsafe { w.bits(0) });
        self.twi.twbr().write(|w| unsafe { w.bits(divisor) });
    }

    fn enable(&mut self) {
        self.twi.twcr().write(|w| w.twen().set_bit().twie().set_bit());
        // SAFETY: sets only the SDA/SCL pull-up bits.
        self.portc
            .portc()
            .modify(|r, w| unsafe { w.bits(r.bits() | TWI_PULLUPS) });
    }

    fn issue(&mut self, command: Command) {
        self.twi.twcr().write(|w| {
            let w = w.twint().set_bit().twen().set_bit().twie().set_bit();
            match command {
                Command::Start => w.twsta().set_bit(),
                Command::Stop => w.twsto().set_bit(),
                Command::ReceiveAck => w.twea().set_bit(),
                Command::Transmit | Command::ReceiveNack => w,
            }
        });
    }

    fn write_data(&mut self, byte: u8) {
        // SAFETY: any byte is valid data or address.
        self.twi.twdr().write(|w| unsafe { w.bits(byte) });
    }

    fn read_data(&mut self) -> u8 {
        self.twi.twdr().read().bits()
    }
}

/// USART0 transmitter and receive-interrupt setup.
pub struct Usart0 {
    usart: USART0,
}

impl Usart0 {
    pub fn new(usart: USART0) -> Self {
        Self { usart }
    }

    pub fn free(self) -> USART0 {
        self.usart
    }
}

impl UsartHardware for Usart0 {
    fn configure(&mut self, divisor: u16, config: &Config) {
        // SAFETY: `Config::baud_divisor` keeps the divisor within 12 bits.
        self.usart.ubrr0().write(|w| unsafe { w.bits(divisor) });
        self.usart
            .ucsr0a()
            .write(|w| w.u2x0().bit(config.high_speed));
        self.usart.ucsr0c().write(|w| {
            let w = w.umsel0().usart_async();
            let w = match config.parity {
                Parity::None => w.upm0().disabled(),
                Parity::Even => w.upm0().parity_even(),
                Parity::Odd => w.upm0().parity_odd(),
            };
            let w = match config.stop_bits {
                StopBits::One => w.usbs0().stop1(),
                StopBits::Two => w.usbs0().stop2(),
            };
            match config.word_length {
                WordLength::Five => w.ucsz0().chr5(),
                WordLength::Six => w.ucsz0().chr6(),
                WordLength::Seven => w.ucsz0().chr7(),
                WordLength::Eight => w.ucsz0().chr8(),
            }
        });
    }

    fn enable(&mut self) {
        self.usart.ucsr0b().write(|w| {
            w.rxcie0()
                .set_bit()
                .rxen0()
                .set_bit()
                .txen0()
                .set_bit()
        });
    }

    fn is_tx_ready(&self) -> bool {
        self.usart.ucsr0a().read().udre0().bit_is_set()
    }

    fn write_data(&mut self, byte: u8) {
        // SAFETY: any byte is valid transmit data.
        self.usart.udr0().write(|w| unsafe { w.bits(byte) });
    }
}
