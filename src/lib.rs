//! This Rust `embedded-hal`-based library drives a [HD44780](https://en.wikipedia.org/wiki/Hitachi_HD44780_LCD_controller)
//! compatible character display through a PCF8574T "I2C backpack" in an embedded, `no_std` environment. These adapters are
//! ubiquitous on eBay and AliExpress and have no clear branding. The display 4-bit data pins are connected to P4-P7 of the
//! PCF8574T, with RS, RW, enable and the backlight transistor on P0-P3.
//!
//! Key features include:
//! - Convenient high-level API for controlling the display
//! - Controlled cursor mode: the driver tracks the cursor itself and wraps text from the end of one row to the
//!   start of the next, which the HD44780's own address counter does not do
//! - Support for custom characters
//! - Backlight control
//! - `core::fmt::Write` implementation for easy use with the `write!` macro
//! - Compatible with the `embedded-hal` traits v1.0 and later
//! - Optional support for the `defmt` and `ufmt` logging frameworks
//!
//! ## Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! hd44780-i2c-lcd = { version = "0.1", features = ["defmt"] }
//! ```
//! The `features = ["defmt"]` line is optional and enables the `defmt` feature, which allows the library's errors to be used with the `defmt` logging
//! framework and emits a few debug events. Another optional feature is `features = ["ufmt"]`, which enables the `ufmt` feature, allowing the `uwriteln!`
//! and `uwrite!` macros to be used.
//!
//! Create the display. The constructor runs the controller's power-on initialization sequence, so the display is ready to use
//! once it returns:
//! ```rust
//! use hd44780_i2c_lcd::{CharacterDisplayPCF8574T, DisplayConfig, FontSize, LcdDisplayType};
//!
//! // board setup
//! let i2c = ...; // I2C peripheral
//! let delay = ...; // DelayNs implementation
//!
//! // one of the common display sizes, at the adapter's default address 0x27
//! let mut lcd = CharacterDisplayPCF8574T::new(i2c, LcdDisplayType::Lcd20x4, delay)?;
//! // or any geometry up to 40x4
//! let mut lcd = CharacterDisplayPCF8574T::new_with_config(
//!     i2c,
//!     DisplayConfig::new(0x3F, 24, 2, FontSize::Dots5x8),
//!     delay,
//! )?;
//! ```
//! Use the display. Each method returns a `Result` that wraps the display object in `Ok()`, allowing for easy chaining:
//! ```rust
//! lcd.backlight()?.clear()?.print("Hello, world!")?;
//! // can also use the `core::fmt::write!` macro
//! use core::fmt::Write;
//!
//! write!(lcd, "Hello, world!")?;
//! ```
//!
//! ### Controlled cursor mode
//! The HD44780 lays out its display RAM so that the end of row 0 continues on row 2, not row 1, and text written past
//! the end of a row vanishes into memory that is not shown. With controlled cursor mode enabled, the driver follows
//! the cursor in software and re-positions the controller after every character, so text flows row by row and wraps
//! back to the top after the last row. `scroll_left` and `scroll_right` then move the cursor by one cell instead of
//! shifting the display contents.
//! ```rust
//! lcd.set_controlled_cursor(true)?.home()?.print("lorem ipsum dolor sit amet")?;
//! ```
//!
#![no_std]
use core::fmt::Display;

use embedded_hal::{delay::DelayNs, i2c};

pub mod driver;

pub use driver::hd44780::cursor::CursorPosition;
use driver::{
    hd44780::{adapter::HD44780AdapterTrait, HD44780},
    DeviceHardwareTrait,
};

/// HD44780 based character display using a generic PCF8574T I2C adapter.
pub type CharacterDisplayPCF8574T<I2C, DELAY> = BaseCharacterDisplay<
    I2C,
    DELAY,
    crate::driver::hd44780::adapter::generic_pcf8574t::GenericPCF8574TAdapter<I2C, DELAY>,
>;

/// Largest number of rows the HD44780 row offset table covers
const MAX_ROWS: u8 = 4;
/// Largest number of columns on one HD44780 DDRAM line
const MAX_COLS: u8 = 40;

/// Errors that can occur when using the LCD backpack
pub enum CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    /// I2C error returned from the underlying I2C implementation
    I2cError(I2C::Error),
    /// Formatting error
    FormattingError(core::fmt::Error),
    /// The display has zero rows or columns, more than 4 rows or more than 40 columns
    UnsupportedDimensions,
}

impl<I2C> core::fmt::Debug for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CharacterDisplayError::I2cError(e) => f.debug_tuple("I2cError").field(e).finish(),
            CharacterDisplayError::FormattingError(e) => {
                f.debug_tuple("FormattingError").field(e).finish()
            }
            CharacterDisplayError::UnsupportedDimensions => write!(f, "UnsupportedDimensions"),
        }
    }
}

impl<I2C> From<core::fmt::Error> for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn from(err: core::fmt::Error) -> Self {
        CharacterDisplayError::FormattingError(err)
    }
}

impl<I2C> From<&CharacterDisplayError<I2C>> for &'static str
where
    I2C: i2c::I2c,
{
    fn from(err: &CharacterDisplayError<I2C>) -> Self {
        match err {
            CharacterDisplayError::I2cError(_) => "I2C error",
            CharacterDisplayError::FormattingError(_) => "Formatting error",
            CharacterDisplayError::UnsupportedDimensions => "Unsupported display dimensions",
        }
    }
}

#[cfg(feature = "defmt")]
impl<I2C> defmt::Format for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl<I2C> ufmt::uDisplay for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl<I2C> Display for CharacterDisplayError<I2C>
where
    I2C: i2c::I2c,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Common LCD display sizes. Used as a shorthand for the columns and rows of a `DisplayConfig`.
pub enum LcdDisplayType {
    /// 20x4 display
    Lcd20x4,
    /// 20x2 display
    Lcd20x2,
    /// 16x2 display
    Lcd16x2,
    /// 16x4 display
    Lcd16x4,
    /// 8x2 display
    Lcd8x2,
    /// 40x2 display
    Lcd40x2,
}

impl From<&LcdDisplayType> for &'static str {
    fn from(display_type: &LcdDisplayType) -> Self {
        match display_type {
            LcdDisplayType::Lcd20x4 => "20x4",
            LcdDisplayType::Lcd20x2 => "20x2",
            LcdDisplayType::Lcd16x2 => "16x2",
            LcdDisplayType::Lcd16x4 => "16x4",
            LcdDisplayType::Lcd8x2 => "8x2",
            LcdDisplayType::Lcd40x2 => "40x2",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LcdDisplayType {
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl ufmt::uDisplay for LcdDisplayType {
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl Display for LcdDisplayType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

impl LcdDisplayType {
    /// Get the number of rows for the display type
    pub const fn rows(&self) -> u8 {
        match self {
            LcdDisplayType::Lcd20x4 => 4,
            LcdDisplayType::Lcd20x2 => 2,
            LcdDisplayType::Lcd16x2 => 2,
            LcdDisplayType::Lcd16x4 => 4,
            LcdDisplayType::Lcd8x2 => 2,
            LcdDisplayType::Lcd40x2 => 2,
        }
    }

    /// Get the number of columns for the display type
    pub const fn cols(&self) -> u8 {
        match self {
            LcdDisplayType::Lcd20x4 => 20,
            LcdDisplayType::Lcd20x2 => 20,
            LcdDisplayType::Lcd16x2 => 16,
            LcdDisplayType::Lcd16x4 => 16,
            LcdDisplayType::Lcd8x2 => 8,
            LcdDisplayType::Lcd40x2 => 40,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Default)]
/// Character cell height selected by the function set command.
pub enum FontSize {
    /// 5x8 dot characters
    #[default]
    Dots5x8,
    /// 5x10 dot characters. Most controllers only honor this on single line displays.
    Dots5x10,
}

#[cfg(feature = "defmt")]
impl defmt::Format for FontSize {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            FontSize::Dots5x8 => defmt::write!(fmt, "5x8"),
            FontSize::Dots5x10 => defmt::write!(fmt, "5x10"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Direction the cursor advances after each character.
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

#[cfg(feature = "defmt")]
impl defmt::Format for TextDirection {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            TextDirection::LeftToRight => defmt::write!(fmt, "LeftToRight"),
            TextDirection::RightToLeft => defmt::write!(fmt, "RightToLeft"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Address and geometry of a display. Fixed once the display object is created.
pub struct DisplayConfig {
    /// 7 bit I2C address of the expander
    pub address: u8,
    pub cols: u8,
    pub rows: u8,
    pub font_size: FontSize,
}

impl DisplayConfig {
    pub const fn new(address: u8, cols: u8, rows: u8, font_size: FontSize) -> Self {
        Self {
            address,
            cols,
            rows,
            font_size,
        }
    }

    /// Configuration for one of the common display sizes with 5x8 dot characters.
    pub const fn from_display_type(address: u8, lcd_type: LcdDisplayType) -> Self {
        Self::new(address, lcd_type.cols(), lcd_type.rows(), FontSize::Dots5x8)
    }

    /// Get the DDRAM start address of each row. This always returns an array of length 4,
    /// whatever the number of configured rows. Rows 2 and 3 continue rows 0 and 1.
    /// Offsets wrap at 8 bits for column counts the controller cannot address.
    pub const fn row_offsets(&self) -> [u8; 4] {
        [0x00, 0x40, self.cols, 0x40u8.wrapping_add(self.cols)]
    }

    /// Whether the HD44780 can address a display of this size
    pub const fn is_supported(&self) -> bool {
        self.rows >= 1 && self.rows <= MAX_ROWS && self.cols >= 1 && self.cols <= MAX_COLS
    }
}

/// Everything a device adapter needs to talk to the display. Owned by the adapter.
pub struct DeviceSetupConfig<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    pub i2c: I2C,
    pub delay: DELAY,
    pub display: DisplayConfig,
}

pub struct BaseCharacterDisplay<I2C, DELAY, DEVICE>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
    DEVICE: HD44780AdapterTrait<I2C, DELAY>,
{
    device: DEVICE,
    controller: HD44780<I2C, DELAY, DEVICE>,
}

impl<I2C, DELAY, DEVICE> BaseCharacterDisplay<I2C, DELAY, DEVICE>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
    DEVICE: HD44780AdapterTrait<I2C, DELAY>,
{
    /// Create and initialize a character display with the default I2C address for the adapter.
    pub fn new(
        i2c: I2C,
        lcd_type: LcdDisplayType,
        delay: DELAY,
    ) -> Result<Self, CharacterDisplayError<I2C>> {
        Self::new_with_address(i2c, DEVICE::default_i2c_address(), lcd_type, delay)
    }

    /// Create and initialize a character display with a specific I2C address for the adapter.
    pub fn new_with_address(
        i2c: I2C,
        address: u8,
        lcd_type: LcdDisplayType,
        delay: DELAY,
    ) -> Result<Self, CharacterDisplayError<I2C>> {
        Self::new_with_config(
            i2c,
            DisplayConfig::from_display_type(address, lcd_type),
            delay,
        )
    }

    /// Create and initialize a character display of any supported geometry.
    ///
    /// The controller initialization sequence runs before this returns. If the configuration is
    /// not supported, or any bus write fails, the error is returned and the bus handle is dropped.
    pub fn new_with_config(
        i2c: I2C,
        config: DisplayConfig,
        delay: DELAY,
    ) -> Result<Self, CharacterDisplayError<I2C>> {
        if !config.is_supported() {
            return Err(CharacterDisplayError::UnsupportedDimensions);
        }
        let mut device = DEVICE::new(DeviceSetupConfig {
            i2c,
            delay,
            display: config,
        });
        let mut controller = HD44780::new(&config);
        controller.init(&mut device)?;
        Ok(Self { device, controller })
    }

    /// Consume the display and return the I2C peripheral and delay.
    pub fn release(self) -> (I2C, DELAY) {
        self.device.release()
    }

    /// returns a reference to the I2C peripheral. mostly needed for testing
    #[cfg(test)]
    fn i2c(&mut self) -> &mut I2C {
        self.device.i2c()
    }

    /// returns the configuration used to create the display
    pub fn display_config(&self) -> DisplayConfig {
        self.device.display_config()
    }

    /// returns the cursor position tracked by the driver
    pub fn cursor_position(&self) -> CursorPosition {
        self.controller.cursor_position()
    }

    /// returns whether controlled cursor mode is enabled
    pub fn controlled_cursor(&self) -> bool {
        self.controller.controlled_cursor()
    }

    /// returns the last requested text direction
    pub fn text_direction(&self) -> TextDirection {
        self.controller.text_direction()
    }

    /// returns whether the backlight is on
    pub fn is_backlight_on(&self) -> bool {
        self.device.backlight()
    }

    //--------------------------------------------------------------------------------------------------
    // high level commands, for the user!
    //--------------------------------------------------------------------------------------------------

    /// Clear the display and move the cursor home.
    pub fn clear(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.clear(&mut self.device)?;
        Ok(self)
    }

    /// Set the cursor to the home position.
    pub fn home(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.home(&mut self.device)?;
        Ok(self)
    }

    /// Set the controller's cursor to the specified column and row. Columns and rows are zero-indexed.
    /// A row past the last row selects the last row. This is the raw positioning command; the cursor
    /// tracked for controlled cursor mode is not changed. Use `set_cursor_position` to move both.
    pub fn set_cursor(
        &mut self,
        col: u8,
        row: u8,
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.set_cursor(&mut self.device, col, row)?;
        Ok(self)
    }

    /// Move the cursor and the tracked cursor to the specified column and row. Out of range values
    /// are clamped to the last column and row.
    pub fn set_cursor_position(
        &mut self,
        col: u8,
        row: u8,
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller
            .set_cursor_position(&mut self.device, col, row)?;
        Ok(self)
    }

    /// Step the tracked cursor one cell forward or backward, wrapping across rows. In controlled
    /// cursor mode the display's cursor follows.
    pub fn move_cursor(&mut self, forward: bool) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.move_cursor(&mut self.device, forward)?;
        Ok(self)
    }

    /// Enable or disable controlled cursor mode.
    pub fn set_controlled_cursor(
        &mut self,
        enable: bool,
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller
            .set_controlled_cursor(&mut self.device, enable)?;
        Ok(self)
    }

    /// Scroll the display to the left. In controlled cursor mode, move the cursor one cell back instead.
    pub fn scroll_left(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.scroll_left(&mut self.device)?;
        Ok(self)
    }

    /// Scroll the display to the right. In controlled cursor mode, move the cursor one cell forward instead.
    pub fn scroll_right(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.scroll_right(&mut self.device)?;
        Ok(self)
    }

    /// Shift the display with each character written. Turns off controlled cursor mode.
    pub fn autoscroll(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.autoscroll(&mut self.device)?;
        Ok(self)
    }

    /// Stop shifting the display with each character written.
    pub fn no_autoscroll(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.no_autoscroll(&mut self.device)?;
        Ok(self)
    }

    /// Turn the display on.
    pub fn display(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.show_display(&mut self.device, true)?;
        Ok(self)
    }

    /// Turn the display off. The display contents are kept.
    pub fn no_display(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.show_display(&mut self.device, false)?;
        Ok(self)
    }

    /// Show the underline cursor.
    pub fn cursor(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.show_cursor(&mut self.device, true)?;
        Ok(self)
    }

    /// Hide the underline cursor.
    pub fn no_cursor(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.show_cursor(&mut self.device, false)?;
        Ok(self)
    }

    /// Blink the character cell at the cursor.
    pub fn blink(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.blink_cursor(&mut self.device, true)?;
        Ok(self)
    }

    /// Stop blinking the cursor.
    pub fn no_blink(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.blink_cursor(&mut self.device, false)?;
        Ok(self)
    }

    /// Turn the backlight on.
    pub fn backlight(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.backlight(&mut self.device, true)?;
        Ok(self)
    }

    /// Turn the backlight off.
    pub fn no_backlight(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.backlight(&mut self.device, false)?;
        Ok(self)
    }

    /// Set the text flow direction to left to right.
    pub fn left_to_right(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.left_to_right(&mut self.device)?;
        Ok(self)
    }

    /// Set the text flow direction to right to left.
    pub fn right_to_left(&mut self) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.right_to_left(&mut self.device)?;
        Ok(self)
    }

    /// Create a new custom character in slot `location` (0 to 7, higher values wrap).
    /// Print it with `write_byte(location)` after positioning the cursor.
    pub fn create_char(
        &mut self,
        location: u8,
        charmap: [u8; 8],
    ) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller
            .create_char(&mut self.device, location, charmap)?;
        Ok(self)
    }

    /// Prints a string to the LCD at the current cursor position.
    pub fn print(&mut self, text: &str) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.print(&mut self.device, text)?;
        Ok(self)
    }

    /// Writes one character code, such as a custom character slot, at the current cursor position.
    pub fn write_byte(&mut self, value: u8) -> Result<&mut Self, CharacterDisplayError<I2C>> {
        self.controller.write_char(&mut self.device, value)?;
        Ok(self)
    }
}

/// Implement the `core::fmt::Write` trait for the LCD backpack, allowing it to be used with the `write!` macro.
/// This is a convenience method for printing to the display.
impl<I2C, DELAY, DEVICE> core::fmt::Write for BaseCharacterDisplay<I2C, DELAY, DEVICE>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
    DEVICE: HD44780AdapterTrait<I2C, DELAY>,
{
    fn write_str(&mut self, s: &str) -> Result<(), core::fmt::Error> {
        if let Err(_e) = self.print(s) {
            return Err(core::fmt::Error);
        }
        Ok(())
    }
}

#[cfg(feature = "ufmt")]
/// Implement the `ufmt::uWrite` trait for the LCD backpack, allowing it to be used with the `uwriteln!` and `uwrite!` macros.
impl<I2C, DELAY, DEVICE> ufmt::uWrite for BaseCharacterDisplay<I2C, DELAY, DEVICE>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
    DEVICE: HD44780AdapterTrait<I2C, DELAY>,
{
    type Error = CharacterDisplayError<I2C>;

    fn write_str(&mut self, s: &str) -> Result<(), CharacterDisplayError<I2C>> {
        self.print(s)?;
        Ok(())
    }
}

#[cfg(test)]
mod test_support;
