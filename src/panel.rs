/*
 * The control side of the panel: entry, exit and reset, plus the periodic
 * summary redraw.
 *
 * A `Panel` ties the occupancy gate to the shared render surface. Each
 * operation first changes the gate and then redraws the surface while
 * holding the display mutex. The gate's own critical section and the display
 * mutex are never held at the same time.
 *
 * The `run_*` functions are the task bodies. They never return. The
 * single-event functions next to them are what those loops call, and what
 * the tests drive directly.
 */

pub mod gate;

use core::fmt::Write;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Timer;
use log::{error, info, warn};

use crate::audio::ToneOutput;
use crate::config::{
    ADMISSION_TIMEOUT, BUTTON_POLL_PERIOD, CAPACITY_FULL_TONE, RESET_TONE, RESET_TONE_GAP,
    SUMMARY_PERIOD,
};
use crate::inputs::{Button, PanelInputs};
use crate::summary::{RenderSurface, StatusLine, draw_panel, draw_splash};
use gate::{Admission, GateError, OccupancyGate, Release};

/// Exclusive access to the one render surface shared by the control tasks
/// and the summary channel.
pub type DisplayMutex<M, S> = Mutex<M, S>;

pub struct Panel<'a, M: RawMutex, S: RenderSurface> {
    gate: &'a OccupancyGate<M>,
    display: &'a DisplayMutex<M, S>,
}

impl<'a, M: RawMutex, S: RenderSurface> Panel<'a, M, S> {
    pub const fn new(gate: &'a OccupancyGate<M>, display: &'a DisplayMutex<M, S>) -> Self {
        Panel { gate, display }
    }

    pub async fn boot_screen(&self) {
        let mut surface = self.display.lock().await;
        surface.init();
        draw_splash(&mut *surface);
    }

    pub async fn admit(&self, audio: &impl ToneOutput) -> Admission {
        let admission = self.gate.try_enter(ADMISSION_TIMEOUT).await;

        let mut status = StatusLine::new();
        match admission {
            Admission::Admitted => {
                let active = self.gate.active_occupants();
                info!(
                    "entry ok, {} occupants, {} free",
                    active,
                    self.gate.free_slots()
                );
                let _ = write!(status, "Entry OK ({}/{})", active, self.gate.capacity());
            }
            Admission::CapacityFull => {
                warn!("entry refused, space is full");
                audio.sound_tone(CAPACITY_FULL_TONE);
                let _ = status.push_str("Full!");
            }
        }

        self.redraw(&status).await;
        admission
    }

    pub async fn release(&self) -> Release {
        let release = self.gate.try_exit();

        let mut status = StatusLine::new();
        match release {
            Release::Released => {
                let active = self.gate.active_occupants();
                info!(
                    "exit ok, {} occupants, {} free",
                    active,
                    self.gate.free_slots()
                );
                let _ = write!(status, "Exit OK ({}/{})", active, self.gate.capacity());
            }
            Release::NoOccupantsToRelease => {
                info!("exit ignored, nobody inside");
                let _ = status.push_str("Empty");
            }
        }

        self.redraw(&status).await;
        release
    }

    /*
     * The confirmation chirp plays before the count is touched, so the
     * operator hears the reset being accepted. The gate is reset in its own
     * critical section, and only after that ends is the display locked.
     */
    pub async fn reset(&self, audio: &impl ToneOutput) -> Result<(), GateError> {
        warn!("reset requested");

        audio.play_tone(RESET_TONE).await;
        Timer::after(RESET_TONE_GAP).await;
        audio.play_tone(RESET_TONE).await;

        self.gate.reset_all()?;
        info!(
            "occupancy reset, {} of {} free",
            self.gate.free_slots(),
            self.gate.capacity()
        );

        let mut surface = self.display.lock().await;
        draw_panel(&mut *surface, 0, self.gate.capacity(), Some("System reset"));
        Ok(())
    }

    /// Redraws the summary with the status derived from the occupancy level.
    pub async fn refresh_summary(&self) {
        let active = self.gate.active_occupants();

        let mut surface = self.display.lock().await;
        draw_panel(&mut *surface, active, self.gate.capacity(), None);
    }

    // The count is read again after the operation, before the display is
    // locked, so the gate's critical section never nests inside the mutex.
    async fn redraw(&self, status: &str) {
        let active = self.gate.active_occupants();

        let mut surface = self.display.lock().await;
        draw_panel(&mut *surface, active, self.gate.capacity(), Some(status));
    }

    pub async fn run_entry_control(&self, inputs: &PanelInputs, audio: &impl ToneOutput) -> ! {
        info!("entry control started");
        loop {
            if inputs.take(Button::Entry) {
                self.admit(audio).await;
            }
            Timer::after(BUTTON_POLL_PERIOD).await;
        }
    }

    pub async fn run_exit_control(&self, inputs: &PanelInputs) -> ! {
        info!("exit control started");
        loop {
            if inputs.take(Button::Exit) {
                self.release().await;
            }
            Timer::after(BUTTON_POLL_PERIOD).await;
        }
    }

    pub async fn run_reset_control(&self, inputs: &PanelInputs, audio: &impl ToneOutput) -> ! {
        info!("reset control started");
        loop {
            if inputs.take(Button::Reset) {
                if let Err(reset_error) = self.reset(audio).await {
                    error!("reset aborted: {:?}", reset_error);
                    panic!("occupancy reset aborted");
                }
            }
            Timer::after(BUTTON_POLL_PERIOD).await;
        }
    }

    pub async fn run_summary(&self) -> ! {
        info!("summary channel started");
        loop {
            self.refresh_summary().await;
            Timer::after(SUMMARY_PERIOD).await;
        }
    }
}
