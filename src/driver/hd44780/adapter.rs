pub mod generic_pcf8574t;

use embedded_hal::{delay::DelayNs, i2c};

use crate::{driver::DeviceHardwareTrait, CharacterDisplayError};

/// Enable line high time in microseconds. The HD44780 needs at least 450ns.
const ENABLE_PULSE_US: u32 = 1;
/// Settle time after the enable line falls. Covers the 37us execution time of most commands.
const ENABLE_SETTLE_US: u32 = 50;

/// Trait for implementing an I2C adapter for a HD44780 device. Assumes the connection
/// to the HD44780 controller from the adapter is via a 4 bit interface and the adapter has
/// 8 GPIO pins available for the 4 bit data interface, RS, RW, enable and backlight pins.
///
/// The adapter keeps the level of every pin in a shadow byte. Each write to the expander
/// sends the whole shadow byte, so the backlight line rides along with all bus traffic.
pub trait HD44780AdapterTrait<I2C, DELAY>: DeviceHardwareTrait<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    /// Returns the bitfield value for the adapter
    fn bits(&self) -> u8;

    /// Sets the RS pin for the display. A value of `false` indicates an instruction is being sent, while
    /// a value of `true` indicates data is being sent.
    fn set_rs(&mut self, value: bool);

    /// Sets the RW pin for the display. This driver only ever writes, so this is always `false`.
    fn set_rw(&mut self, value: bool);

    /// Sets the enable pin for the display.
    fn set_enable(&mut self, value: bool);

    /// Sets the backlight pin level in the shadow byte. Nothing is written until the next expander write.
    fn set_backlight(&mut self, value: bool);

    /// Returns the current backlight pin level
    fn backlight(&self) -> bool;

    /// Sets the 4 data lines to the low nibble of `value`
    fn set_data(&mut self, value: u8);

    /// Writes the shadow byte to the expander.
    fn write_bits_to_gpio(&mut self) -> Result<(), CharacterDisplayError<I2C>> {
        let data = [self.bits()];
        let i2c_address = self.i2c_address();
        self.i2c()
            .write(i2c_address, &data)
            .map_err(CharacterDisplayError::I2cError)?;
        Ok(())
    }

    /// Drops every controller line low and writes the result, leaving only the backlight pin
    /// at its current level.
    fn write_backlight_only(&mut self) -> Result<(), CharacterDisplayError<I2C>> {
        self.set_data(0);
        self.set_rs(false);
        self.set_rw(false);
        self.set_enable(false);
        self.write_bits_to_gpio()
    }

    /// Strobes the enable line so the controller latches the nibble currently on the data lines.
    fn pulse_enable(&mut self) -> Result<(), CharacterDisplayError<I2C>> {
        self.set_enable(true);
        self.write_bits_to_gpio()?;
        self.delay().delay_us(ENABLE_PULSE_US);

        self.set_enable(false);
        self.write_bits_to_gpio()?;
        self.delay().delay_us(ENABLE_SETTLE_US);
        Ok(())
    }

    /// writes the lower nibble of `value` to the controller. Used on its own only during
    /// device initialization, before the controller is in 4 bit mode.
    /// If `rs_setting` is `true`, the nibble goes to the data register, otherwise to the
    /// command register.
    fn write_nibble_to_controller(
        &mut self,
        rs_setting: bool,
        value: u8,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.set_rs(rs_setting);
        self.set_rw(false);
        self.set_data(value & 0x0F);
        self.set_enable(false);
        // present the lines first, then latch them
        self.write_bits_to_gpio()?;
        self.pulse_enable()
    }

    /// writes a full byte to the controller, high nibble first. If `rs_setting` is `true`, the data is
    /// written to the data register, either the CGRAM or DDRAM, depending on prior command sent. If
    /// `rs_setting` is `false`, the data is written to command register.
    fn write_byte_to_controller(
        &mut self,
        rs_setting: bool,
        value: u8,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.write_nibble_to_controller(rs_setting, value >> 4)?;
        self.write_nibble_to_controller(rs_setting, value & 0x0F)
    }
}
