// HD44780 Support
// This module provides the controller protocol for HD44780-based character displays.
// The HD44780 struct holds the in-memory copy of the controller's flag registers and the
// software cursor, and drives an object implementing HD44780AdapterTrait, which is where the
// wiring of a specific I2C expander is implemented. Every flag change is mirrored to the
// controller immediately, so the two never disagree as long as this driver is the only
// writer on the controller's command stream.
//

pub mod adapter;
pub mod cursor;

use bitfield::bitfield;
use core::marker::PhantomData;
use embedded_hal::{delay::DelayNs, i2c};

use crate::{
    driver::hd44780::{adapter::HD44780AdapterTrait, cursor::CursorPosition},
    CharacterDisplayError, DisplayConfig, FontSize, TextDirection,
};

// commands
const LCD_CMD_CLEARDISPLAY: u8 = 0x01; //  Clear display, set cursor position to zero
const LCD_CMD_RETURNHOME: u8 = 0x02; //  Set cursor position to zero
const LCD_CMD_ENTRYMODESET: u8 = 0x04; //  Sets the entry mode
const LCD_CMD_DISPLAYCONTROL: u8 = 0x08; //  Controls the display; does stuff like turning it off and on
const LCD_CMD_CURSORSHIFT: u8 = 0x10; //  Lets you move the cursor
const LCD_CMD_FUNCTIONSET: u8 = 0x20; //  Used to send the function to set to the display
const LCD_CMD_SETCGRAMADDR: u8 = 0x40; //  Used to set the CGRAM (character generator RAM) with characters
const LCD_CMD_SETDDRAMADDR: u8 = 0x80; //  Used to set the DDRAM (Display Data RAM)

// flags for display/cursor shift
const LCD_FLAG_DISPLAYMOVE: u8 = 0x08; //  Flag for moving the display
const LCD_FLAG_MOVERIGHT: u8 = 0x04; //  Flag for moving right
const LCD_FLAG_MOVELEFT: u8 = 0x00; //  Flag for moving left

// nibbles sent on their own while the controller is still in its power-on 8 bit mode
const LCD_INIT_FUNCTIONRESET: u8 = 0x03; //  Function set, 8 bit interface
const LCD_INIT_4BITMODE: u8 = 0x02; //  Function set, 4 bit interface

// DDRAM addresses are 7 bits wide
const LCD_DDRAM_ADDR_MASK: u8 = 0x7F;

// flags for function set
bitfield! {
    pub struct FunctionFlags(u8);
    impl Debug;
    pub font_5x10, set_font_5x10: 2;
    pub two_line, set_two_line: 3;
}

// flags for display on/off control
bitfield! {
    pub struct DisplayControlFlags(u8);
    impl Debug;
    pub blink_on, set_blink_on: 0;
    pub cursor_on, set_cursor_on: 1;
    pub display_on, set_display_on: 2;
}

// flags for display entry mode
bitfield! {
    pub struct EntryModeFlags(u8);
    impl Debug;
    pub shift_increment, set_shift_increment: 0;
    pub entry_left, set_entry_left: 1;
}

pub struct HD44780<I2C, DELAY, DEVICE>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
    DEVICE: HD44780AdapterTrait<I2C, DELAY>,
{
    cols: u8,
    rows: u8,
    font_size: FontSize,
    row_offsets: [u8; 4],
    display_function: FunctionFlags,
    display_control: DisplayControlFlags,
    display_mode: EntryModeFlags,
    cursor: CursorPosition,
    controlled_cursor: bool,
    direction: TextDirection,
    _marker: PhantomData<I2C>,
    _delay: PhantomData<DELAY>,
    _device: PhantomData<DEVICE>,
}

impl<I2C, DELAY, DEVICE> HD44780<I2C, DELAY, DEVICE>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
    DEVICE: HD44780AdapterTrait<I2C, DELAY>,
{
    /// Creates the controller state for a display. Nothing is sent until `init` runs.
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            cols: config.cols,
            rows: config.rows,
            font_size: config.font_size,
            row_offsets: config.row_offsets(),
            display_function: FunctionFlags(0),
            display_control: DisplayControlFlags(0),
            display_mode: EntryModeFlags(0),
            cursor: CursorPosition::HOME,
            controlled_cursor: false,
            direction: TextDirection::LeftToRight,
            _marker: PhantomData,
            _delay: PhantomData,
            _device: PhantomData,
        }
    }

    /// Runs the power-on reset sequence that puts the controller into 4 bit mode, then applies the
    /// line count and font, turns the display on, clears it and selects left to right entry.
    pub fn init(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "initializing {}x{} HD44780 at {=u8:#x}",
            self.cols,
            self.rows,
            device.i2c_address()
        );

        // only the backlight line is driven while the controller logic settles
        device.write_backlight_only()?;
        device.delay().delay_ms(20);

        // the datasheet asks for three 8 bit function sets with shrinking waits; waits rounded up to whole ms
        for _ in 0..2 {
            device.write_nibble_to_controller(false, LCD_INIT_FUNCTIONRESET)?;
            device.delay().delay_ms(5);
        }
        device.write_nibble_to_controller(false, LCD_INIT_FUNCTIONRESET)?;
        device.delay().delay_ms(1);

        device.write_nibble_to_controller(false, LCD_INIT_4BITMODE)?;
        device.delay().delay_ms(1);

        // from here on every byte goes out as two nibbles
        self.display_function = FunctionFlags(0);
        self.display_function.set_two_line(self.rows > 1);
        self.display_function
            .set_font_5x10(self.font_size == FontSize::Dots5x10);
        self.command(device, LCD_CMD_FUNCTIONSET | self.display_function.0)?;

        self.display_control = DisplayControlFlags(0);
        self.display_control.set_display_on(true);
        self.send_display_control(device)?;

        self.clear(device)?;

        self.display_mode = EntryModeFlags(0);
        self.display_mode.set_entry_left(true);
        self.direction = TextDirection::LeftToRight;
        self.send_entry_mode(device)
    }

    /// Sends a byte to the controller. `rs_setting` selects the data register when `true` and
    /// the instruction register when `false`.
    pub fn send(
        &mut self,
        device: &mut DEVICE,
        value: u8,
        rs_setting: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        device.write_byte_to_controller(rs_setting, value)
    }

    pub fn command(
        &mut self,
        device: &mut DEVICE,
        value: u8,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.send(device, value, false)
    }

    /// Writes a character code at the cursor and advances the tracked cursor in the current
    /// text direction.
    pub fn write_char(
        &mut self,
        device: &mut DEVICE,
        value: u8,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.send(device, value, true)?;
        self.move_cursor(device, self.direction == TextDirection::LeftToRight)
    }

    fn send_display_control(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        self.command(device, LCD_CMD_DISPLAYCONTROL | self.display_control.0)
    }

    fn send_entry_mode(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        self.command(device, LCD_CMD_ENTRYMODESET | self.display_mode.0)
    }

    pub fn clear(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        self.command(device, LCD_CMD_CLEARDISPLAY)?;
        self.cursor = CursorPosition::HOME;
        device.delay().delay_ms(2);
        Ok(())
    }

    pub fn home(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        self.command(device, LCD_CMD_RETURNHOME)?;
        self.cursor = CursorPosition::HOME;
        device.delay().delay_ms(2);
        Ok(())
    }

    /// Points the controller's DDRAM address at `col` on `row`. Rows past the last one are clamped
    /// to the last row. The tracked cursor is left alone; see `set_cursor_position`.
    pub fn set_cursor(
        &mut self,
        device: &mut DEVICE,
        col: u8,
        row: u8,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        // the offset table has 4 entries whatever the configured row count
        let row = row.min(self.rows.saturating_sub(1)).min(3);
        let address = self.row_offsets[row as usize].wrapping_add(col) & LCD_DDRAM_ADDR_MASK;
        self.command(device, LCD_CMD_SETDDRAMADDR | address)
    }

    /// Moves both the tracked cursor and the controller's cursor. The position is clamped into the display.
    pub fn set_cursor_position(
        &mut self,
        device: &mut DEVICE,
        col: u8,
        row: u8,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        let position = CursorPosition::new(col, row).clamped(self.cols, self.rows);
        self.set_cursor(device, position.col, position.row)?;
        self.cursor = position;
        Ok(())
    }

    /// Steps the tracked cursor one cell, wrapping across rows. In controlled cursor mode the
    /// controller is repositioned to match.
    pub fn move_cursor(
        &mut self,
        device: &mut DEVICE,
        forward: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.cursor = self.cursor.step(forward, self.cols, self.rows);
        if self.controlled_cursor {
            self.set_cursor(device, self.cursor.col, self.cursor.row)?;
        }
        Ok(())
    }

    pub fn scroll_left(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        if self.controlled_cursor {
            return self.move_cursor(device, false);
        }
        self.command(
            device,
            LCD_CMD_CURSORSHIFT | LCD_FLAG_DISPLAYMOVE | LCD_FLAG_MOVELEFT,
        )
    }

    pub fn scroll_right(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        if self.controlled_cursor {
            return self.move_cursor(device, true);
        }
        self.command(
            device,
            LCD_CMD_CURSORSHIFT | LCD_FLAG_DISPLAYMOVE | LCD_FLAG_MOVERIGHT,
        )
    }

    /// Turns on the controller's own display shift. Leaves controlled cursor mode, since the two
    /// would fight over the cursor.
    pub fn autoscroll(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        self.controlled_cursor = false;
        // the direction may have changed while controlled mode kept it off the wire
        self.display_mode
            .set_entry_left(self.direction == TextDirection::LeftToRight);
        self.display_mode.set_shift_increment(true);
        self.send_entry_mode(device)
    }

    pub fn no_autoscroll(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        self.display_mode.set_shift_increment(false);
        self.send_entry_mode(device)
    }

    /// Enables or disables controlled cursor mode. Disabling it re-applies the last requested
    /// text direction to the controller.
    pub fn set_controlled_cursor(
        &mut self,
        device: &mut DEVICE,
        enable: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("controlled cursor: {}", enable);

        self.controlled_cursor = enable;
        if enable {
            return Ok(());
        }
        match self.direction {
            TextDirection::LeftToRight => self.left_to_right(device),
            TextDirection::RightToLeft => self.right_to_left(device),
        }
    }

    pub fn left_to_right(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        self.set_direction(device, TextDirection::LeftToRight)
    }

    pub fn right_to_left(&mut self, device: &mut DEVICE) -> Result<(), CharacterDisplayError<I2C>> {
        self.set_direction(device, TextDirection::RightToLeft)
    }

    fn set_direction(
        &mut self,
        device: &mut DEVICE,
        direction: TextDirection,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.direction = direction;
        // in controlled mode the driver positions the cursor itself, the entry mode stays as is
        if self.controlled_cursor {
            return Ok(());
        }
        self.display_mode
            .set_entry_left(direction == TextDirection::LeftToRight);
        self.send_entry_mode(device)
    }

    pub fn show_display(
        &mut self,
        device: &mut DEVICE,
        show_display: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.display_control.set_display_on(show_display);
        self.send_display_control(device)
    }

    pub fn show_cursor(
        &mut self,
        device: &mut DEVICE,
        show_cursor: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.display_control.set_cursor_on(show_cursor);
        self.send_display_control(device)
    }

    pub fn blink_cursor(
        &mut self,
        device: &mut DEVICE,
        blink_cursor: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.display_control.set_blink_on(blink_cursor);
        self.send_display_control(device)
    }

    /// The backlight has no command. Its pin level is stored in the adapter and goes out with
    /// every expander write; one write is issued here so the change is visible right away.
    pub fn backlight(
        &mut self,
        device: &mut DEVICE,
        on: bool,
    ) -> Result<(), CharacterDisplayError<I2C>> {
        device.set_backlight(on);
        device.write_backlight_only()
    }

    /// Stores an 8 row glyph bitmap in one of the 8 CGRAM slots. `location` is masked to 0-7.
    /// Leaves the controller addressing CGRAM, so position the cursor before printing again.
    pub fn create_char(
        &mut self,
        device: &mut DEVICE,
        location: u8,
        charmap: [u8; 8],
    ) -> Result<(), CharacterDisplayError<I2C>> {
        self.command(device, LCD_CMD_SETCGRAMADDR | ((location & 0x7) << 3))?;
        for &charmap_byte in charmap.iter() {
            self.send(device, charmap_byte, true)?;
        }
        Ok(())
    }

    /// Writes each character of `text`. Characters outside the controller's 8 bit code space
    /// are shown as `?`.
    pub fn print(&mut self, device: &mut DEVICE, text: &str) -> Result<(), CharacterDisplayError<I2C>> {
        for c in text.chars() {
            self.write_char(device, u8::try_from(c).unwrap_or(b'?'))?;
        }
        Ok(())
    }

    pub fn cursor_position(&self) -> CursorPosition {
        self.cursor
    }

    pub fn controlled_cursor(&self) -> bool {
        self.controlled_cursor
    }

    pub fn text_direction(&self) -> TextDirection {
        self.direction
    }

    pub fn row_offsets(&self) -> [u8; 4] {
        self.row_offsets
    }
}
