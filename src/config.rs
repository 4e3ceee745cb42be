//! Compile-time configuration of the panel. There is no runtime
//! configuration: capacity and cadences are fixed for the lifetime of the
//! firmware.

use embassy_time::Duration;

use crate::audio::Tone;

/// Number of slots in the space.
pub const MAX_OCCUPANTS: usize = 5;

/// How long an entry may wait for a slot before the space counts as full.
pub const ADMISSION_TIMEOUT: Duration = Duration::from_millis(50);

// Control tasks poll their button latch at this rate, which is also the
// coarsest debounce at the control layer.
pub const BUTTON_POLL_PERIOD: Duration = Duration::from_millis(50);
pub const DEBOUNCE_TIME: Duration = Duration::from_millis(50);

pub const INDICATOR_PERIOD: Duration = Duration::from_millis(200);
pub const SUMMARY_PERIOD: Duration = Duration::from_millis(500);

pub const MATRIX_TICK_PERIOD: Duration = Duration::from_millis(20);
/// Number of matrix ticks in one pulse of the brightness envelope.
pub const ANIMATION_PERIOD: u8 = 100;
/// Number of matrix ticks the reset overlay stays up.
pub const RESET_OVERLAY_TICKS: u8 = 50;

pub const CAPACITY_FULL_TONE: Tone = Tone::new(1000, Duration::from_millis(100));
pub const RESET_TONE: Tone = Tone::new(1500, Duration::from_millis(150));
pub const RESET_TONE_GAP: Duration = Duration::from_millis(100);

pub const SPLASH_DURATION: Duration = Duration::from_millis(2000);
