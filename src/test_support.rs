// Test doubles that model the display end of the bus. The simulated controller decodes the
// expander writes the way a PCF8574T backpack wires them to a HD44780 and keeps its memories,
// so tests can assert on what the display would show instead of on raw bus bytes.
extern crate std;
use std::vec::Vec;

use embedded_hal::{
    delay::DelayNs,
    i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation},
};

const PIN_RS: u8 = 0b0000_0001;
const PIN_ENABLE: u8 = 0b0000_0100;
const PIN_BACKLIGHT: u8 = 0b0000_1000;

/// A HD44780 behind a PCF8574T, seen from the I2C bus.
pub struct SimulatedHD44780 {
    address: u8,
    last_bits: u8,
    four_bit_mode: bool,
    high_nibble: Option<u8>,
    addressing_cgram: bool,
    increment: bool,
    /// every instruction byte received after the switch to 4 bit mode
    pub commands: Vec<u8>,
    pub address_counter: u8,
    pub ddram: [u8; 128],
    pub cgram: [u8; 64],
    pub backlight: bool,
}

impl SimulatedHD44780 {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            last_bits: 0,
            four_bit_mode: false,
            high_nibble: None,
            addressing_cgram: false,
            increment: true,
            commands: Vec::new(),
            address_counter: 0,
            ddram: [b' '; 128],
            cgram: [0; 64],
            backlight: false,
        }
    }

    fn pins_written(&mut self, bits: u8) {
        self.backlight = bits & PIN_BACKLIGHT != 0;
        // the controller latches on the falling edge of enable
        if self.last_bits & PIN_ENABLE != 0 && bits & PIN_ENABLE == 0 {
            self.nibble_latched(self.last_bits & PIN_RS != 0, self.last_bits >> 4);
        }
        self.last_bits = bits;
    }

    fn nibble_latched(&mut self, rs: bool, nibble: u8) {
        if !self.four_bit_mode {
            // in 8 bit mode only D7-D4 are wired, a function set with DL = 0 switches modes
            if !rs && nibble == 0x2 {
                self.four_bit_mode = true;
            }
            return;
        }
        match self.high_nibble.take() {
            None => self.high_nibble = Some(nibble),
            Some(high) => self.byte_received(rs, (high << 4) | nibble),
        }
    }

    fn byte_received(&mut self, rs: bool, value: u8) {
        if rs {
            if self.addressing_cgram {
                self.cgram[(self.address_counter & 0x3F) as usize] = value;
            } else {
                self.ddram[(self.address_counter & 0x7F) as usize] = value;
            }
            let mask = if self.addressing_cgram { 0x3F } else { 0x7F };
            let next = if self.increment {
                self.address_counter.wrapping_add(1)
            } else {
                self.address_counter.wrapping_sub(1)
            };
            self.address_counter = next & mask;
            return;
        }

        self.commands.push(value);
        if value & 0x80 != 0 {
            self.address_counter = value & 0x7F;
            self.addressing_cgram = false;
        } else if value & 0x40 != 0 {
            self.address_counter = value & 0x3F;
            self.addressing_cgram = true;
        } else if value & 0xF0 != 0 {
            // function set and shifts do not touch memory
        } else if value & 0x08 != 0 {
            // display control
        } else if value & 0x04 != 0 {
            self.increment = value & 0x02 != 0;
        } else if value & 0x02 != 0 {
            self.address_counter = 0;
            self.addressing_cgram = false;
        } else if value == 0x01 {
            self.ddram = [b' '; 128];
            self.address_counter = 0;
            self.addressing_cgram = false;
            self.increment = true;
        }
    }
}

impl ErrorType for SimulatedHD44780 {
    type Error = ErrorKind;
}

impl I2c for SimulatedHD44780 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    for &bits in bytes.iter() {
                        self.pins_written(bits);
                    }
                }
                Operation::Read(buffer) => buffer.fill(self.last_bits),
            }
        }
        Ok(())
    }
}

/// Delay that returns at once and remembers every requested wait in nanoseconds.
#[derive(Default)]
pub struct RecordingDelay {
    pub calls: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls.push(ns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_ignores_init_nibbles_until_4bit_mode() {
        let mut sim = SimulatedHD44780::new(0x27);
        // nibble 0x3, then 0x2, each as lines / enable high / enable low
        for nibble in [0x3u8, 0x2] {
            let bits = nibble << 4;
            assert!(sim.write(0x27, &[bits, bits | PIN_ENABLE, bits]).is_ok());
        }
        assert!(sim.four_bit_mode);
        assert!(sim.commands.is_empty());

        // set DDRAM address 0x45, sent as two nibbles
        for nibble in [0xCu8, 0x5] {
            let bits = nibble << 4 | PIN_BACKLIGHT;
            assert!(sim.write(0x27, &[bits, bits | PIN_ENABLE, bits]).is_ok());
        }
        assert_eq!(sim.commands, std::vec![0xC5]);
        assert_eq!(sim.address_counter, 0x45);
        assert!(sim.backlight);
    }

    #[test]
    fn test_simulator_nacks_other_addresses() {
        let mut sim = SimulatedHD44780::new(0x27);
        assert_eq!(
            sim.write(0x3F, &[0x00]),
            Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
        );
    }
}
