/*
 * The I/O module for the access panel.
 *
 * This is the only part of the firmware that knows about the board. It owns
 * the buttons, the buzzer, the RGB indicator pins, the WS2812 matrix on SPI1
 * and the USART console. The rest of the program talks to it through the
 * latches, channels and traits from the library.
 */

use embassy_futures::select::{Either3, select3};
use embassy_stm32::{
    exti::ExtiInput,
    gpio::{Level, Output},
    mode::{Async, Blocking},
    spi::Spi,
    usart::Uart,
};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Instant, Timer};
use enum_ordinalize::Ordinalize;

use access_panel::audio::ToneChannel;
use access_panel::config::DEBOUNCE_TIME;
use access_panel::console::ConsolePipe;
use access_panel::indicator::{IndicatorLight, Rgb};
use access_panel::inputs::{Button, Debouncer, PanelInputs};
use access_panel::matrix::grb::{GrbFrame, SPI_FRAME_LEN};
use access_panel::matrix::{Colour, PixelMatrix};

// Each button gets its own debouncer, so a bouncing entry button does not
// swallow a press on the exit button.
#[embassy_executor::task]
pub async fn button_task(
    mut entry: ExtiInput<'static>,
    mut exit: ExtiInput<'static>,
    mut reset: ExtiInput<'static>,
    inputs: &'static PanelInputs,
) -> ! {
    let mut debouncers = [const { Debouncer::new(DEBOUNCE_TIME) }; Button::VARIANT_COUNT];

    loop {
        let button = match select3(
            entry.wait_for_falling_edge(),
            exit.wait_for_falling_edge(),
            reset.wait_for_falling_edge(),
        )
        .await
        {
            Either3::First(_) => Button::Entry,
            Either3::Second(_) => Button::Exit,
            Either3::Third(_) => Button::Reset,
        };

        if debouncers[button.ordinal()].accept(Instant::now()) {
            inputs.latch(button);
        }
    }
}

/*
 * Plays queued tones on a passive buzzer by toggling its pin. The timer
 * resolution limits how clean the square wave is, but a beep is a beep.
 */
#[embassy_executor::task]
pub async fn buzzer_task(
    mut buzzer: Output<'static>,
    tones: &'static ToneChannel<CriticalSectionRawMutex>,
) -> ! {
    loop {
        let tone = tones.next().await;
        let half_period = Duration::from_micros(tone.half_period_micros());
        let end = Instant::now() + tone.duration;

        while Instant::now() < end {
            buzzer.toggle();
            Timer::after(half_period).await;
        }
        buzzer.set_low();
    }
}

#[embassy_executor::task]
pub async fn console_task(
    mut usart: Uart<'static, Async>,
    console: &'static ConsolePipe<CriticalSectionRawMutex>,
) -> ! {
    let mut buffer = [0u8; 64];
    loop {
        let count = console.read(&mut buffer).await;
        // Nobody to tell if the console itself fails.
        let _ = usart.write(&buffer[..count]).await;
    }
}

// Deal with active-high or active-low, so that the channels can just use
// easy to understand `true` for on logic.
fn light(led: &mut Output, on: bool) {
    led.set_level(if on { Level::High } else { Level::Low });
}

pub struct IndicatorPins {
    red: Output<'static>,
    green: Output<'static>,
    blue: Output<'static>,
}

impl IndicatorPins {
    pub fn new(red: Output<'static>, green: Output<'static>, blue: Output<'static>) -> Self {
        IndicatorPins { red, green, blue }
    }
}

impl IndicatorLight for IndicatorPins {
    fn show(&mut self, colour: Rgb) {
        light(&mut self.red, colour.red);
        light(&mut self.green, colour.green);
        light(&mut self.blue, colour.blue);
    }
}

pub struct Ws2812Matrix {
    spi: Spi<'static, Blocking>,
    frame: GrbFrame,
    encoded: [u8; SPI_FRAME_LEN],
}

impl Ws2812Matrix {
    pub fn new(spi: Spi<'static, Blocking>) -> Self {
        Ws2812Matrix {
            spi,
            frame: GrbFrame::new(),
            encoded: [0; SPI_FRAME_LEN],
        }
    }
}

impl PixelMatrix for Ws2812Matrix {
    fn set_pixel(&mut self, row: usize, col: usize, colour: Colour, brightness: f32) {
        self.frame.set(row, col, colour, brightness);
    }

    fn clear(&mut self) {
        self.frame.clear();
    }

    fn flush(&mut self) {
        self.frame.encode_spi(&mut self.encoded);
        // A dropped frame is replaced by the next tick.
        let _ = self.spi.blocking_write(&self.encoded);
    }
}
