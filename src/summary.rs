/*
 * Layout of the text summary on the 128x64 render surface.
 *
 * The surface itself is a collaborator behind `RenderSurface`. This module
 * only decides what goes where: a border, a title, the counts and a status
 * line. Callers must hold the display mutex while drawing.
 */

use core::fmt::Write;

use enum_ordinalize::Ordinalize;
use heapless::String;

use crate::occupancy::OccupancyLevel;

pub const DISPLAY_WIDTH: u8 = 128;
pub const DISPLAY_HEIGHT: u8 = 64;
pub const CHAR_WIDTH: u8 = 8;

const STATUS_CAPACITY: usize = 32;
pub type StatusLine = String<STATUS_CAPACITY>;

const TITLE: &str = "Access Control";

pub trait RenderSurface {
    fn init(&mut self);
    fn clear(&mut self);
    fn draw_text(&mut self, text: &str, x: u8, y: u8);
    fn draw_rect(&mut self, x: u8, y: u8, width: u8, height: u8);
    fn draw_hline(&mut self, x0: u8, x1: u8, y: u8);
    fn flush(&mut self);
}

// indexed by `OccupancyLevel::ordinal()`
const DEFAULT_STATUS: [&str; OccupancyLevel::VARIANT_COUNT] =
    ["Free", "Space left", "Last slot!", "Full!"];

pub fn default_status(level: OccupancyLevel) -> &'static str {
    DEFAULT_STATUS[level.ordinal()]
}

fn centred_x(text: &str) -> u8 {
    let text_width = text.len().saturating_mul(CHAR_WIDTH as usize);
    let x = (DISPLAY_WIDTH as usize / 2).saturating_sub(text_width / 2);
    (x as u8).max(2)
}

pub fn draw_panel(
    surface: &mut impl RenderSurface,
    active_occupants: usize,
    capacity: usize,
    status: Option<&str>,
) {
    surface.clear();
    surface.draw_rect(0, 0, DISPLAY_WIDTH - 1, DISPLAY_HEIGHT - 1);

    surface.draw_text(TITLE, centred_x(TITLE), 3);
    surface.draw_hline(2, DISPLAY_WIDTH - 3, 13);

    let mut line: String<24> = String::new();
    let _ = write!(line, "Occupied: {}/{}", active_occupants, capacity);
    surface.draw_text(&line, 5, 19);

    line.clear();
    let _ = write!(line, "Free:     {}", capacity.saturating_sub(active_occupants));
    surface.draw_text(&line, 5, 28);

    surface.draw_hline(2, DISPLAY_WIDTH - 3, 38);

    let status = match status {
        Some(text) if !text.is_empty() => text,
        _ => default_status(OccupancyLevel::classify(active_occupants, capacity)),
    };
    let status = truncate(status, STATUS_CAPACITY - 1);
    surface.draw_text(status, centred_x(status), 45);

    surface.flush();
}

pub fn draw_splash(surface: &mut impl RenderSurface) {
    const LINES: [&str; 3] = ["DESPI-M02", "ACCESS PANEL", "Starting..."];

    surface.clear();
    surface.draw_rect(0, 0, DISPLAY_WIDTH - 1, DISPLAY_HEIGHT - 1);
    for (row, text) in LINES.iter().enumerate() {
        surface.draw_text(text, centred_x(text), 12 + 14 * row as u8);
    }
    surface.flush();
}

fn truncate(text: &str, max_len: usize) -> &str {
    match text.char_indices().nth(max_len) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        texts: Vec<(std::string::String, u8, u8)>,
        rects: usize,
        hlines: Vec<u8>,
        flushes: usize,
    }

    impl RenderSurface for Recorder {
        fn init(&mut self) {}
        fn clear(&mut self) {
            self.texts.clear();
            self.rects = 0;
            self.hlines.clear();
        }
        fn draw_text(&mut self, text: &str, x: u8, y: u8) {
            self.texts.push((text.into(), x, y));
        }
        fn draw_rect(&mut self, _x: u8, _y: u8, _width: u8, _height: u8) {
            self.rects += 1;
        }
        fn draw_hline(&mut self, _x0: u8, _x1: u8, y: u8) {
            self.hlines.push(y);
        }
        fn flush(&mut self) {
            self.flushes += 1;
        }
    }

    #[test]
    fn panel_layout() {
        let mut surface = Recorder::default();
        draw_panel(&mut surface, 2, 5, None);

        let expected: Vec<(std::string::String, u8, u8)> = vec![
            ("Access Control".into(), 8, 3),
            ("Occupied: 2/5".into(), 5, 19),
            ("Free:     3".into(), 5, 28),
            ("Space left".into(), 24, 45),
        ];
        assert_eq!(surface.texts, expected);
        assert_eq!(surface.rects, 1);
        assert_eq!(surface.hlines, [13u8, 38]);
        assert_eq!(surface.flushes, 1);
    }

    #[test]
    fn explicit_status_wins_unless_empty() {
        let mut surface = Recorder::default();

        draw_panel(&mut surface, 5, 5, Some("Entry OK (5/5)"));
        assert_eq!(surface.texts[3].0, "Entry OK (5/5)");

        draw_panel(&mut surface, 5, 5, Some(""));
        assert_eq!(surface.texts[3].0, "Full!");
    }

    #[test]
    fn long_status_is_clipped_and_kept_on_screen() {
        let mut surface = Recorder::default();
        let long = "a status line that is far too long for the display";

        draw_panel(&mut surface, 0, 5, Some(long));
        let (text, x, _) = &surface.texts[3];
        assert_eq!(text.len(), STATUS_CAPACITY - 1);
        assert_eq!(*x, 2);
    }

    #[test]
    fn splash_is_one_frame() {
        let mut surface = Recorder::default();
        draw_splash(&mut surface);
        assert_eq!(surface.texts.len(), 3);
        assert_eq!(surface.flushes, 1);
    }
}
