/*
 * Button latches between the I/O task and the control tasks.
 *
 * The I/O task sees the edges as they happen and latches them. The control
 * tasks poll at their own pace and take the latch, so an edge is seen
 * exactly once no matter how the two schedules line up.
 */

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_time::{Duration, Instant};
use enum_ordinalize::Ordinalize;

#[derive(Ordinalize, Debug, PartialEq, Eq, Clone, Copy)]
#[repr(usize)]
pub enum Button {
    Entry,
    Exit,
    Reset,
}

pub struct PanelInputs {
    pressed: [AtomicBool; Button::VARIANT_COUNT],
}

impl PanelInputs {
    pub const fn new() -> Self {
        PanelInputs {
            pressed: [const { AtomicBool::new(false) }; Button::VARIANT_COUNT],
        }
    }

    pub fn latch(&self, button: Button) {
        self.pressed[button.ordinal()].store(true, Ordering::Release);
    }

    /// Whether the button was pressed since the previous call.
    pub fn take(&self, button: Button) -> bool {
        self.pressed[button.ordinal()].swap(false, Ordering::AcqRel)
    }
}

// Contacts bounce. An edge only counts if the previous accepted edge on the
// same button is at least `hold_off` old.
pub struct Debouncer {
    hold_off: Duration,
    last_accepted: Option<Instant>,
}

impl Debouncer {
    pub const fn new(hold_off: Duration) -> Self {
        Debouncer {
            hold_off,
            last_accepted: None,
        }
    }

    pub fn accept(&mut self, now: Instant) -> bool {
        match self.last_accepted {
            Some(last) if now.saturating_duration_since(last) < self.hold_off => false,
            _ => {
                self.last_accepted = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latch_is_taken_once() {
        let inputs = PanelInputs::new();
        inputs.latch(Button::Exit);

        assert!(!inputs.take(Button::Entry));
        assert!(inputs.take(Button::Exit));
        assert!(!inputs.take(Button::Exit));
    }

    #[test]
    fn repeated_edges_collapse_into_one_press() {
        let inputs = PanelInputs::new();
        inputs.latch(Button::Reset);
        inputs.latch(Button::Reset);

        assert!(inputs.take(Button::Reset));
        assert!(!inputs.take(Button::Reset));
    }

    #[test]
    fn press_latched_on_another_thread_is_taken_here() {
        let inputs = PanelInputs::new();
        std::thread::scope(|scope| {
            scope.spawn(|| inputs.latch(Button::Entry));
        });

        assert!(inputs.take(Button::Entry));
        assert!(!inputs.take(Button::Entry));
        assert!(!inputs.take(Button::Exit));
    }

    #[test]
    fn debouncer_drops_bounces() {
        let mut debouncer = Debouncer::new(Duration::from_millis(50));
        let start = Instant::from_millis(1_000);

        assert!(debouncer.accept(start));
        assert!(!debouncer.accept(start + Duration::from_millis(3)));
        assert!(!debouncer.accept(start + Duration::from_millis(49)));
        assert!(debouncer.accept(start + Duration::from_millis(50)));
        assert!(!debouncer.accept(start + Duration::from_millis(60)));
    }
}
