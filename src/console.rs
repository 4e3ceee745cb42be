/*
 * The serial console.
 *
 * Log records and a character-cell copy of the summary screen both go into
 * one byte pipe. A single task drains that pipe to the USART. Writers never
 * wait: a line or frame that does not fit in the pipe is dropped whole.
 */

use core::fmt::Write;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::pipe::Pipe;
use heapless::String;
use log::{Log, Metadata, Record};

use crate::summary::{CHAR_WIDTH, DISPLAY_HEIGHT, DISPLAY_WIDTH, RenderSurface};

pub const CONSOLE_PIPE_SIZE: usize = 512;
pub type ConsolePipe<M> = Pipe<M, CONSOLE_PIPE_SIZE>;

const LOG_LINE_CAPACITY: usize = 96;

pub struct ConsoleLogger<'a, M: RawMutex> {
    pipe: &'a ConsolePipe<M>,
}

impl<'a, M: RawMutex> ConsoleLogger<'a, M> {
    pub const fn new(pipe: &'a ConsolePipe<M>) -> Self {
        ConsoleLogger { pipe }
    }
}

impl<M: RawMutex + Sync> Log for ConsoleLogger<'_, M> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut line: String<LOG_LINE_CAPACITY> = String::new();
        if write!(Clipped(&mut line), "[{}] {}", record.level(), record.args()).is_err() {
            // keep what fit and mark the cut
            while line.len() > LOG_LINE_CAPACITY - 5 {
                line.pop();
            }
            let _ = line.push_str("...");
        }
        let _ = line.push_str("\r\n");
        write_whole(self.pipe, line.as_bytes());
    }

    fn flush(&self) {}
}

// Fills the line with as much of each piece as fits, cut on a char boundary.
struct Clipped<'a, const N: usize>(&'a mut String<N>);

impl<const N: usize> Write for Clipped<'_, N> {
    fn write_str(&mut self, text: &str) -> core::fmt::Result {
        let room = N - self.0.len();
        if text.len() <= room {
            return self.0.push_str(text).map_err(|_| core::fmt::Error);
        }

        let mut end = room;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let _ = self.0.push_str(&text[..end]);
        Err(core::fmt::Error)
    }
}

// A line goes into the pipe whole or not at all, so a full pipe never
// leaves half a line for the next writer to run into.
fn write_whole<M: RawMutex>(pipe: &ConsolePipe<M>, bytes: &[u8]) {
    if pipe.free_capacity() >= bytes.len() {
        let _ = pipe.try_write(bytes);
    }
}

const ROW_HEIGHT: u8 = 8;
const FRAME_LEN: usize = HOME.len() + CONSOLE_ROWS * (CONSOLE_COLUMNS + 2);
pub const CONSOLE_COLUMNS: usize = (DISPLAY_WIDTH / CHAR_WIDTH) as usize;
pub const CONSOLE_ROWS: usize = (DISPLAY_HEIGHT / ROW_HEIGHT) as usize;

const HOME: &[u8] = b"\x1b[H";
const CLEAR_SCREEN: &[u8] = b"\x1b[2J";

/// A terminal rendition of the summary screen: every 8x8 pixel block of the
/// display becomes one character cell.
pub struct ConsoleSurface<'a, M: RawMutex> {
    pipe: &'a ConsolePipe<M>,
    cells: [[u8; CONSOLE_COLUMNS]; CONSOLE_ROWS],
}

impl<'a, M: RawMutex> ConsoleSurface<'a, M> {
    pub const fn new(pipe: &'a ConsolePipe<M>) -> Self {
        ConsoleSurface {
            pipe,
            cells: [[b' '; CONSOLE_COLUMNS]; CONSOLE_ROWS],
        }
    }

    fn cell(x: u8, y: u8) -> (usize, usize) {
        let row = usize::from(y / ROW_HEIGHT).min(CONSOLE_ROWS - 1);
        let col = usize::from(x / CHAR_WIDTH).min(CONSOLE_COLUMNS - 1);
        (row, col)
    }

    fn put(&mut self, row: usize, col: usize, glyph: u8) {
        if row < CONSOLE_ROWS && col < CONSOLE_COLUMNS {
            self.cells[row][col] = glyph;
        }
    }

    pub fn row_text(&self, row: usize) -> &str {
        // cells only ever hold printable ASCII
        core::str::from_utf8(&self.cells[row]).unwrap_or("")
    }
}

impl<M: RawMutex> RenderSurface for ConsoleSurface<'_, M> {
    fn init(&mut self) {
        self.clear();
        write_whole(self.pipe, CLEAR_SCREEN);
    }

    fn clear(&mut self) {
        self.cells = [[b' '; CONSOLE_COLUMNS]; CONSOLE_ROWS];
    }

    fn draw_text(&mut self, text: &str, x: u8, y: u8) {
        let (row, start) = Self::cell(x, y);
        for (offset, glyph) in text.chars().enumerate() {
            let glyph = if glyph.is_ascii_graphic() || glyph == ' ' {
                glyph as u8
            } else {
                b'?'
            };
            self.put(row, start + offset, glyph);
        }
    }

    fn draw_rect(&mut self, x: u8, y: u8, width: u8, height: u8) {
        let (top, left) = Self::cell(x, y);
        let (bottom, right) = Self::cell(x.saturating_add(width), y.saturating_add(height));

        for col in left..=right {
            self.put(top, col, b'-');
            self.put(bottom, col, b'-');
        }
        for row in top..=bottom {
            self.put(row, left, b'|');
            self.put(row, right, b'|');
        }
        for (row, col) in [(top, left), (top, right), (bottom, left), (bottom, right)] {
            self.put(row, col, b'+');
        }
    }

    fn draw_hline(&mut self, x0: u8, x1: u8, y: u8) {
        let (row, first) = Self::cell(x0.min(x1), y);
        let (_, last) = Self::cell(x0.max(x1), y);
        for col in first..=last {
            self.put(row, col, b'-');
        }
    }

    fn flush(&mut self) {
        let mut frame: heapless::Vec<u8, FRAME_LEN> = heapless::Vec::new();
        let _ = frame.extend_from_slice(HOME);
        for row in &self.cells {
            let _ = frame.extend_from_slice(row);
            let _ = frame.extend_from_slice(b"\r\n");
        }
        write_whole(self.pipe, &frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::draw_panel;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use log::Level;

    fn drain(pipe: &ConsolePipe<CriticalSectionRawMutex>) -> std::string::String {
        let mut bytes = Vec::new();
        let mut buffer = [0u8; 64];
        while let Ok(read) = pipe.try_read(&mut buffer) {
            bytes.extend_from_slice(&buffer[..read]);
        }
        std::string::String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn panel_renders_as_character_grid() {
        let pipe = ConsolePipe::<CriticalSectionRawMutex>::new();
        let mut surface = ConsoleSurface::new(&pipe);

        draw_panel(&mut surface, 2, 5, None);

        assert_eq!(surface.row_text(0), "+Access Control+");
        assert_eq!(surface.row_text(2), "Occupied: 2/5  |");
        assert_eq!(surface.row_text(5), "|  Space left  |");
        assert_eq!(surface.row_text(7), "+--------------+");

        let output = drain(&pipe);
        assert!(output.starts_with("\x1b[H"));
        assert!(output.contains("Free:     3"));
        assert_eq!(output.matches("\r\n").count(), CONSOLE_ROWS);
    }

    #[test]
    fn non_ascii_text_is_replaced() {
        let pipe = ConsolePipe::<CriticalSectionRawMutex>::new();
        let mut surface = ConsoleSurface::new(&pipe);

        surface.draw_text("Ocupação", 0, 0);
        assert!(surface.row_text(0).starts_with("Ocupa??o"));
    }

    #[test]
    fn text_past_the_edge_is_clipped() {
        let pipe = ConsolePipe::<CriticalSectionRawMutex>::new();
        let mut surface = ConsoleSurface::new(&pipe);

        surface.draw_text("0123456789abcdefXYZ", 0, 200);
        assert_eq!(surface.row_text(CONSOLE_ROWS - 1), "0123456789abcdef");
    }

    #[test]
    fn logger_writes_one_line_per_record() {
        let pipe = ConsolePipe::<CriticalSectionRawMutex>::new();
        let logger = ConsoleLogger::new(&pipe);
        log::set_max_level(log::LevelFilter::Info);

        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("entry refused"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Trace)
                .args(format_args!("too chatty"))
                .build(),
        );

        assert_eq!(drain(&pipe), "[WARN] entry refused\r\n");
    }

    #[test]
    fn long_records_are_cut() {
        let pipe = ConsolePipe::<CriticalSectionRawMutex>::new();
        let logger = ConsoleLogger::new(&pipe);
        log::set_max_level(log::LevelFilter::Info);
        let long = "x".repeat(200);

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .args(format_args!("{}", long))
                .build(),
        );

        let output = drain(&pipe);
        assert!(output.starts_with("[INFO] xxxx"));
        assert!(output.ends_with("x...\r\n"));
        assert!(output.len() <= LOG_LINE_CAPACITY);
    }

    #[test]
    fn long_records_are_cut_between_chars() {
        let pipe = ConsolePipe::<CriticalSectionRawMutex>::new();
        let logger = ConsoleLogger::new(&pipe);
        log::set_max_level(log::LevelFilter::Info);
        let long = "é".repeat(100);

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .args(format_args!("{}", long))
                .build(),
        );

        let output = drain(&pipe);
        assert!(output.starts_with("[INFO] éé"));
        assert!(output.ends_with("...\r\n"));
    }

    #[test]
    fn nearly_full_pipe_drops_the_record_whole() {
        let pipe = ConsolePipe::<CriticalSectionRawMutex>::new();
        let logger = ConsoleLogger::new(&pipe);
        log::set_max_level(log::LevelFilter::Info);
        let filler = [b'.'; CONSOLE_PIPE_SIZE - 8];
        assert_eq!(pipe.try_write(&filler), Ok(filler.len()));

        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("entry refused"))
                .build(),
        );

        let output = drain(&pipe);
        assert_eq!(output.len(), filler.len());
        assert!(output.bytes().all(|byte| byte == b'.'));
    }

    #[test]
    fn frame_is_skipped_when_it_does_not_fit() {
        let pipe = ConsolePipe::<CriticalSectionRawMutex>::new();
        let mut surface = ConsoleSurface::new(&pipe);
        let filler = [b'.'; CONSOLE_PIPE_SIZE - FRAME_LEN + 1];
        assert_eq!(pipe.try_write(&filler), Ok(filler.len()));

        draw_panel(&mut surface, 1, 5, None);
        assert_eq!(drain(&pipe).len(), filler.len());

        draw_panel(&mut surface, 1, 5, None);
        let output = drain(&pipe);
        assert_eq!(output.len(), FRAME_LEN);
        assert!(output.ends_with("+--------------+\r\n"));
    }
}
