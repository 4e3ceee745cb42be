/*
 * Frame buffer for a 5x5 WS2812 matrix.
 *
 * The LEDs are chained in a serpentine, starting at the bottom right, and
 * take their colour as a GRB word. Sending the words down the wire is the
 * driver's business, not this module's.
 */

use super::{Colour, MATRIX_DIM, MATRIX_SIZE};

/// Length of a frame encoded for an SPI-driven chain, see `encode_spi`.
pub const SPI_FRAME_LEN: usize = MATRIX_SIZE * SPI_BYTES_PER_LED + SPI_LATCH_BYTES;
const SPI_BYTES_PER_LED: usize = 9;
// at least 50us of low line after the data latches the colours
const SPI_LATCH_BYTES: usize = 16;

/// Overall brightness cap. These LEDs are blinding at full power.
pub const GLOBAL_BRIGHTNESS: f32 = 0.2;

const CHAIN_POSITION: [[usize; MATRIX_DIM]; MATRIX_DIM] = [
    [24, 23, 22, 21, 20],
    [15, 16, 17, 18, 19],
    [14, 13, 12, 11, 10],
    [5, 6, 7, 8, 9],
    [4, 3, 2, 1, 0],
];

impl Colour {
    /// Packs the colour as `0xGGRRBB00`, scaled by `brightness`.
    pub fn to_grb(&self, brightness: f32) -> u32 {
        let brightness = brightness.clamp(0.0, 1.0);
        let channel = |value: f32| ((value * brightness).clamp(0.0, 1.0) * 255.0 + 0.3) as u32;

        (channel(self.green) << 24) | (channel(self.red) << 16) | (channel(self.blue) << 8)
    }
}

pub struct GrbFrame {
    words: [u32; MATRIX_SIZE],
}

impl GrbFrame {
    pub const fn new() -> Self {
        GrbFrame {
            words: [0; MATRIX_SIZE],
        }
    }

    pub fn clear(&mut self) {
        self.words = [0; MATRIX_SIZE];
    }

    /// Positions outside the matrix are ignored.
    pub fn set(&mut self, row: usize, col: usize, colour: Colour, brightness: f32) {
        if row < MATRIX_DIM && col < MATRIX_DIM {
            self.words[CHAIN_POSITION[row][col]] = colour.to_grb(GLOBAL_BRIGHTNESS * brightness);
        }
    }

    /// The words in chain order, first LED first.
    pub fn words(&self) -> &[u32; MATRIX_SIZE] {
        &self.words
    }

    /*
     * Encodes the frame for a chain clocked from an SPI MOSI line at about
     * 2.4 MHz. Every data bit becomes three line bits: `110` for a one and
     * `100` for a zero. The trailing bytes stay zero to latch the frame.
     */
    pub fn encode_spi(&self, out: &mut [u8; SPI_FRAME_LEN]) {
        out.fill(0);
        let mut line_bit = 0;
        for word in &self.words {
            for data_bit in (8..32).rev() {
                let pattern: u8 = if word & (1 << data_bit) != 0 { 0b110 } else { 0b100 };
                for pattern_bit in (0..3).rev() {
                    if pattern & (1 << pattern_bit) != 0 {
                        out[line_bit / 8] |= 0x80 >> (line_bit % 8);
                    }
                    line_bit += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grb_word_layout() {
        let colour = Colour::new(1.0, 0.0, 0.0);
        assert_eq!(colour.to_grb(1.0), 0x00FF_0000);
        assert_eq!(Colour::new(0.0, 1.0, 0.0).to_grb(1.0), 0xFF00_0000);
        assert_eq!(Colour::new(0.0, 0.0, 1.0).to_grb(1.0), 0x0000_FF00);
    }

    #[test]
    fn brightness_scales_and_clamps() {
        let white = Colour::new(1.0, 1.0, 1.0);
        assert_eq!(white.to_grb(0.0), 0);
        assert_eq!(white.to_grb(2.0), white.to_grb(1.0));
        assert_eq!(white.to_grb(0.2) >> 24, 51);
    }

    #[test]
    fn top_left_is_the_last_led_in_the_chain() {
        let mut frame = GrbFrame::new();
        frame.set(0, 0, Colour::new(0.0, 0.0, 1.0), 1.0);
        frame.set(4, 4, Colour::new(0.0, 0.0, 1.0), 1.0);
        frame.set(5, 0, Colour::new(1.0, 1.0, 1.0), 1.0);

        let lit: Vec<usize> = (0..MATRIX_SIZE).filter(|&i| frame.words()[i] != 0).collect();
        assert_eq!(lit, [0usize, 24]);

        frame.clear();
        assert!(frame.words().iter().all(|&word| word == 0));
    }

    #[test]
    fn spi_encoding_of_dark_and_lit_leds() {
        let mut frame = GrbFrame::new();
        let mut out = [0xAA; SPI_FRAME_LEN];

        frame.encode_spi(&mut out);
        // 100 100 100 100 100 100 100 100 across three bytes
        assert_eq!(out[..3], [0b1001_0010, 0b0100_1001, 0b0010_0100]);
        assert!(out[SPI_FRAME_LEN - SPI_LATCH_BYTES..].iter().all(|&byte| byte == 0));

        // the last LED in the chain, full green at the capped brightness
        frame.set(0, 0, Colour::new(0.0, 1.0, 0.0), 1.0 / GLOBAL_BRIGHTNESS);
        frame.encode_spi(&mut out);
        let last_led = &out[24 * SPI_BYTES_PER_LED..25 * SPI_BYTES_PER_LED];
        // green byte 0xFF: 110 110 110 110 110 110 110 110
        assert_eq!(last_led[..3], [0b1101_1011, 0b0110_1101, 0b1011_0110]);
        // red and blue bytes are zero
        assert_eq!(last_led[3..6], [0b1001_0010, 0b0100_1001, 0b0010_0100]);
    }
}
