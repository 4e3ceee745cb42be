/*
 * Hardware-independent core of the access-control panel.
 *
 * The panel counts occupants of a space with a fixed number of slots and
 * shows the occupancy on an RGB indicator, an animated 5x5 pixel matrix, a
 * text summary and a buzzer. Everything in this library is free of board
 * specifics, so that it can be tested on the host. The firmware binary wires
 * it to the actual pins in `io.rs`.
 */

#![cfg_attr(not(test), no_std)]

pub mod audio;
pub mod config;
pub mod console;
pub mod indicator;
pub mod inputs;
pub mod matrix;
pub mod occupancy;
pub mod panel;
pub mod summary;

pub use occupancy::OccupancyLevel;
pub use panel::Panel;
pub use panel::gate::{Admission, GateError, OccupancyGate, Release};
