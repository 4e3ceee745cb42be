// 5x5 icons, one `u8` per row. Bit 4 is the leftmost column.

use super::MATRIX_DIM;

pub type Icon = [u8; MATRIX_DIM];

pub const RING: Icon = [0b01110, 0b10001, 0b10001, 0b10001, 0b01110];
pub const SMALL_CIRCLE: Icon = [0b00000, 0b00100, 0b01010, 0b00100, 0b00000];
pub const CHECK_MARK: Icon = [0b00000, 0b00001, 0b00010, 0b10100, 0b01000];
pub const EXCLAMATION: Icon = [0b00100, 0b00100, 0b00100, 0b00000, 0b00100];
pub const CROSS: Icon = [0b10001, 0b01010, 0b00100, 0b01010, 0b10001];

pub fn is_lit(icon: &Icon, row: usize, col: usize) -> bool {
    icon[row] & (1 << (MATRIX_DIM - 1 - col)) != 0
}
