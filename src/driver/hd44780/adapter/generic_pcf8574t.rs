use bitfield::bitfield;
use embedded_hal::{delay::DelayNs, i2c};

use crate::{driver::DeviceHardwareTrait, DeviceSetupConfig, DisplayConfig};

use super::HD44780AdapterTrait;

// Pin map of the PCF8574T based 4-bit LCD backpacks: P0-P3 are control lines, P4-P7 carry D4-D7
bitfield! {
    pub struct GenericPCF8574TBitField(u8);
    impl Debug;
    pub rs, set_rs: 0, 0;
    pub rw, set_rw: 1, 1;
    pub enable, set_enable: 2, 2;
    pub backlight, set_backlight: 3, 3;
    pub data, set_data: 7, 4;
}

/// Adapter based on the PCF8574T I2C GPIO expander interfacing with the HD44780 LCD controller
/// via a 4-bit interface.
pub struct GenericPCF8574TAdapter<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    bits: GenericPCF8574TBitField,
    config: DeviceSetupConfig<I2C, DELAY>,
}

impl<I2C, DELAY> DeviceHardwareTrait<I2C, DELAY> for GenericPCF8574TAdapter<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    fn new(config: DeviceSetupConfig<I2C, DELAY>) -> Self {
        Self {
            bits: GenericPCF8574TBitField(0),
            config,
        }
    }

    fn default_i2c_address() -> u8 {
        0x27
    }

    fn display_config(&self) -> DisplayConfig {
        self.config.display
    }

    fn delay(&mut self) -> &mut DELAY {
        &mut self.config.delay
    }

    fn i2c(&mut self) -> &mut I2C {
        &mut self.config.i2c
    }

    fn release(self) -> (I2C, DELAY) {
        (self.config.i2c, self.config.delay)
    }
}

impl<I2C, DELAY> HD44780AdapterTrait<I2C, DELAY> for GenericPCF8574TAdapter<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    fn bits(&self) -> u8 {
        self.bits.0
    }

    fn set_rs(&mut self, value: bool) {
        self.bits.set_rs(value as u8);
    }

    fn set_rw(&mut self, value: bool) {
        self.bits.set_rw(value as u8);
    }

    fn set_enable(&mut self, value: bool) {
        self.bits.set_enable(value as u8);
    }

    fn set_backlight(&mut self, value: bool) {
        self.bits.set_backlight(value as u8);
    }

    fn backlight(&self) -> bool {
        self.bits.backlight() != 0
    }

    fn set_data(&mut self, value: u8) {
        self.bits.set_data(value);
    }
}
