// Licensed under the Apache-2.0 license

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

use atmega_ddk::common::Logger;
use atmega_ddk::hal::atmega328p::{on_twi_interrupt, on_usart_rx_interrupt, Twi0, Usart0};
use atmega_ddk::serial::{Config, SerialLink, RX_RING};
use atmega_ddk::twi::{TwiConfigBuilder, TwiController, TwiMaster, TwiSpeed, TWI_STATUS};
use embedded_io::Write;
use panic_halt as _;

const HOST_BAUD: u32 = 9600;
const PROBE_ADDRESS: u8 = 0x27;

#[avr_device::interrupt(atmega328p)]
fn TWI() {
    on_twi_interrupt();
}

#[avr_device::interrupt(atmega328p)]
fn USART_RX() {
    on_usart_rx_interrupt();
}

fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}

#[avr_device::entry]
fn main() -> ! {
    let Some(dp) = avr_device::atmega328p::Peripherals::take() else {
        halt();
    };

    let mut serial = SerialLink::new(Usart0::new(dp.USART0), &RX_RING);
    if serial.init(&Config::new(HOST_BAUD, false)).is_err() {
        halt();
    }

    // SAFETY: all shared state is set up; handlers only push and record.
    unsafe { avr_device::interrupt::enable() };

    serial.send_string("Communication Start\n\r");

    let twi_config = TwiConfigBuilder::new().speed(TwiSpeed::Standard).build();
    let presence = {
        let master = TwiMaster::new(Twi0::new(dp.TWI, dp.PORTC), &TWI_STATUS);
        let mut bus = TwiController::new(master, &mut serial);
        bus.bring_up(&twi_config, PROBE_ADDRESS)
    };
    if let Ok(code) = presence {
        let _ = writeln!(serial, "probe {PROBE_ADDRESS:#04x} -> {code}\r");
    }
    if serial.take_overrun() {
        serial.error("receive overrun");
    }

    loop {
        if serial.read_count() > 0 {
            if let Ok(byte) = serial.read_byte() {
                serial.send_byte(byte);
            }
        }
    }
}
