// Software cursor tracking. Mirrors the HD44780 address counter as a (column, row) pair so the
// driver can move the physical cursor itself, wrapping across rows where the controller's own
// auto-increment would run into unused DDRAM.

/// Zero-based cursor position on the display.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct CursorPosition {
    pub col: u8,
    pub row: u8,
}

impl CursorPosition {
    /// The top left character cell.
    pub const HOME: CursorPosition = CursorPosition { col: 0, row: 0 };

    pub const fn new(col: u8, row: u8) -> Self {
        Self { col, row }
    }

    /// Returns the position one cell forward or backward on a `cols` x `rows` display.
    /// Moving past the last column continues on the first column of the next row, and
    /// moving before the first column continues on the last column of the previous row.
    /// Both directions wrap between the first and last row.
    pub fn step(self, forward: bool, cols: u8, rows: u8) -> Self {
        let last_col = cols.saturating_sub(1);
        let last_row = rows.saturating_sub(1);
        if forward {
            if self.col >= last_col {
                let row = if self.row >= last_row { 0 } else { self.row + 1 };
                Self { col: 0, row }
            } else {
                Self {
                    col: self.col + 1,
                    row: self.row,
                }
            }
        } else if self.col == 0 {
            let row = if self.row == 0 { last_row } else { self.row - 1 };
            Self { col: last_col, row }
        } else {
            Self {
                col: self.col - 1,
                row: self.row,
            }
        }
    }

    /// Clamp the position into a `cols` x `rows` display.
    pub fn clamped(self, cols: u8, rows: u8) -> Self {
        Self {
            col: self.col.min(cols.saturating_sub(1)),
            row: self.row.min(rows.saturating_sub(1)),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CursorPosition {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "({}, {})", self.col, self.row);
    }
}
