/*
 * The pixel-matrix channel: an animated 5x5 icon per occupancy level.
 *
 * Every tick advances an animation phase that wraps after
 * `ANIMATION_PERIOD` ticks. Most icons pulse with a sine envelope over that
 * period, the last-slot warning blinks instead.
 *
 * There is no signal from the reset control to this channel. The matrix
 * infers a reset when the active count drops from something to zero between
 * two ticks, and shows a short white overlay. The last person leaving
 * normally looks exactly the same and gets the same overlay.
 *
 * As with the other channels, all timing stays outside the state machine:
 * `MatrixAnimator::tick` is called once per tick by `run_matrix`, which keeps
 * the animation testable without a clock.
 */

pub mod grb;
pub mod icons;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Timer;
use log::{debug, info};

use crate::config::{ANIMATION_PERIOD, MATRIX_TICK_PERIOD, RESET_OVERLAY_TICKS};
use crate::occupancy::OccupancyLevel;
use crate::panel::gate::OccupancyGate;
use icons::{CHECK_MARK, CROSS, EXCLAMATION, Icon, RING, SMALL_CIRCLE, is_lit};

pub const MATRIX_DIM: usize = 5;
pub const MATRIX_SIZE: usize = MATRIX_DIM * MATRIX_DIM;

/// Lowest point of the pulse envelope, as a fraction of full brightness.
const MIN_PULSE_BRIGHTNESS: f32 = 0.2;

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Colour {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Colour {
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Colour { red, green, blue }
    }
}

pub const BLUE: Colour = Colour::new(0.1, 0.1, 1.0);
pub const GREEN: Colour = Colour::new(0.0, 1.0, 0.1);
pub const YELLOW: Colour = Colour::new(1.0, 0.8, 0.0);
pub const RED: Colour = Colour::new(1.0, 0.0, 0.0);
pub const WHITE: Colour = Colour::new(1.0, 1.0, 1.0);

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MatrixState {
    Steady(OccupancyLevel),
    Resetting,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Pixel {
    pub colour: Colour,
    pub brightness: f32,
}

pub type Frame = [[Option<Pixel>; MATRIX_DIM]; MATRIX_DIM];

pub trait PixelMatrix {
    fn set_pixel(&mut self, row: usize, col: usize, colour: Colour, brightness: f32);
    fn clear(&mut self);
    fn flush(&mut self);
}

pub struct MatrixAnimator {
    phase: u8,
    previous_active: usize,
    overlay_ticks_left: u8,
}

impl MatrixAnimator {
    pub const fn new() -> Self {
        MatrixAnimator {
            // the first tick wraps this to zero
            phase: ANIMATION_PERIOD - 1,
            previous_active: 0,
            overlay_ticks_left: 0,
        }
    }

    pub fn phase(&self) -> u8 {
        self.phase
    }

    pub fn tick(&mut self, active_occupants: usize, capacity: usize) -> MatrixState {
        self.phase = (self.phase + 1) % ANIMATION_PERIOD;

        if self.overlay_ticks_left == 0 && self.previous_active > 0 && active_occupants == 0 {
            debug!("occupancy dropped from {} to zero", self.previous_active);
            self.overlay_ticks_left = RESET_OVERLAY_TICKS;
        }
        self.previous_active = active_occupants;

        if self.overlay_ticks_left > 0 {
            self.overlay_ticks_left -= 1;
            MatrixState::Resetting
        } else {
            MatrixState::Steady(OccupancyLevel::classify(active_occupants, capacity))
        }
    }
}

/// Sine envelope over one animation period, between the minimum pulse
/// brightness and full brightness.
pub fn pulse_brightness(phase: u8) -> f32 {
    let angle = f32::from(phase) * (2.0 * core::f32::consts::PI / f32::from(ANIMATION_PERIOD));
    let wave = (libm::sinf(angle) + 1.0) / 2.0;
    MIN_PULSE_BRIGHTNESS + (1.0 - MIN_PULSE_BRIGHTNESS) * wave
}

fn alternate(phase: u8, steps: u8, first: &'static Icon, second: &'static Icon) -> &'static Icon {
    if (phase / steps) % 2 == 0 { first } else { second }
}

pub fn compose(state: MatrixState, phase: u8) -> Frame {
    let mut frame: Frame = [[None; MATRIX_DIM]; MATRIX_DIM];

    let (icon, colour, brightness) = match state {
        MatrixState::Steady(OccupancyLevel::Empty) => {
            (alternate(phase, 15, &RING, &SMALL_CIRCLE), BLUE, pulse_brightness(phase))
        }
        MatrixState::Steady(OccupancyLevel::HasSpace) => {
            (&CHECK_MARK, GREEN, pulse_brightness(phase))
        }
        MatrixState::Steady(OccupancyLevel::LastSlot) => {
            if (phase / 10) % 2 != 0 {
                return frame;
            }
            (&EXCLAMATION, YELLOW, 1.0)
        }
        MatrixState::Steady(OccupancyLevel::Full) => (&CROSS, RED, pulse_brightness(phase)),
        MatrixState::Resetting => (alternate(phase, 5, &SMALL_CIRCLE, &RING), WHITE, 1.0),
    };

    for (row, pixels) in frame.iter_mut().enumerate() {
        for (col, pixel) in pixels.iter_mut().enumerate() {
            if is_lit(icon, row, col) {
                *pixel = Some(Pixel { colour, brightness });
            }
        }
    }
    frame
}

pub fn draw(matrix: &mut impl PixelMatrix, frame: &Frame) {
    matrix.clear();
    for (row, pixels) in frame.iter().enumerate() {
        for (col, pixel) in pixels.iter().enumerate() {
            if let Some(Pixel { colour, brightness }) = pixel {
                matrix.set_pixel(row, col, *colour, *brightness);
            }
        }
    }
    matrix.flush();
}

pub async fn run_matrix<M: RawMutex>(gate: &OccupancyGate<M>, matrix: &mut impl PixelMatrix) -> ! {
    info!("matrix channel started");
    let mut animator = MatrixAnimator::new();
    loop {
        let state = animator.tick(gate.active_occupants(), gate.capacity());
        draw(matrix, &compose(state, animator.phase()));
        Timer::after(MATRIX_TICK_PERIOD).await;
    }
}
