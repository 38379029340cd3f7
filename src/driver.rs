pub mod hd44780;

use embedded_hal::{delay::DelayNs, i2c};

use crate::{DeviceSetupConfig, DisplayConfig};

/// Trait for device hardware implementations. Embodies the I2C expander that sits between
/// the bus and the display controller. Owns the bus and delay handles for the lifetime of
/// the display object.
pub trait DeviceHardwareTrait<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    fn new(config: DeviceSetupConfig<I2C, DELAY>) -> Self;

    /// returns the default I2C address for the device
    fn default_i2c_address() -> u8;

    /// returns the display geometry and address the device was created with
    fn display_config(&self) -> DisplayConfig;

    /// returns configured i2c address
    fn i2c_address(&self) -> u8 {
        self.display_config().address
    }

    /// return a mutable reference to the delay object
    fn delay(&mut self) -> &mut DELAY;

    /// returns the i2c object. mostly used for testing
    fn i2c(&mut self) -> &mut I2C;

    /// consumes the device and hands back the bus and delay objects
    fn release(self) -> (I2C, DELAY);
}
