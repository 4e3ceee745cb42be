/*
 * The RGB indicator: one LED that shows the occupancy level as a colour.
 *
 * It only reads the gate and owns its own pins, so it needs no lock. Each
 * sample is independent of the previous one.
 */

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Timer;
use log::info;

use crate::config::INDICATOR_PERIOD;
use crate::occupancy::OccupancyLevel;
use crate::panel::gate::OccupancyGate;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Rgb {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl Rgb {
    pub const fn new(red: bool, green: bool, blue: bool) -> Self {
        Rgb { red, green, blue }
    }
}

pub trait IndicatorLight {
    fn show(&mut self, colour: Rgb);
}

pub fn indicator_colour(level: OccupancyLevel) -> Rgb {
    match level {
        OccupancyLevel::Empty => Rgb::new(false, false, true),
        OccupancyLevel::HasSpace => Rgb::new(false, true, false),
        OccupancyLevel::LastSlot => Rgb::new(true, true, false),
        OccupancyLevel::Full => Rgb::new(true, false, false),
    }
}

pub fn sample<M: RawMutex>(gate: &OccupancyGate<M>, light: &mut impl IndicatorLight) -> OccupancyLevel {
    let level = OccupancyLevel::classify(gate.active_occupants(), gate.capacity());
    light.show(indicator_colour(level));
    level
}

pub async fn run_indicator<M: RawMutex>(gate: &OccupancyGate<M>, light: &mut impl IndicatorLight) -> ! {
    info!("indicator channel started");
    loop {
        sample(gate, light);
        Timer::after(INDICATOR_PERIOD).await;
    }
}
