#![no_std]
#![no_main]

// https://github.com/embassy-rs/embassy/blob/main/examples/stm32f4/src/bin/multiprio.rs

use access_panel::audio::ToneChannel;
use access_panel::config::{MAX_OCCUPANTS, SPLASH_DURATION};
use access_panel::console::{ConsoleLogger, ConsolePipe, ConsoleSurface};
use access_panel::indicator::run_indicator;
use access_panel::inputs::PanelInputs;
use access_panel::matrix::run_matrix;
use access_panel::panel::DisplayMutex;
use access_panel::{OccupancyGate, Panel};
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Level, Output, Pull, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use embassy_stm32::usart::{Config, Uart};
use embassy_stm32::{bind_interrupts, peripherals, usart};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Timer;
use log::{LevelFilter, info};
use panic_halt as _;

mod io;

// The control tasks preempt the render channels, so everything they share
// must be safe across executors.
type PanelMutex = CriticalSectionRawMutex;
type Surface = ConsoleSurface<'static, PanelMutex>;

static CONSOLE: ConsolePipe<PanelMutex> = ConsolePipe::new();
static LOGGER: ConsoleLogger<'static, PanelMutex> = ConsoleLogger::new(&CONSOLE);

static GATE: OccupancyGate<PanelMutex> = OccupancyGate::new(MAX_OCCUPANTS);
static DISPLAY: DisplayMutex<PanelMutex, Surface> = DisplayMutex::new(ConsoleSurface::new(&CONSOLE));
static PANEL: Panel<'static, PanelMutex, Surface> = Panel::new(&GATE, &DISPLAY);

static INPUTS: PanelInputs = PanelInputs::new();
static TONES: ToneChannel<PanelMutex> = ToneChannel::new();

static CONTROL_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn USART3() {
    unsafe { CONTROL_EXECUTOR.on_interrupt() }
}

#[embassy_executor::task]
async fn entry_task() -> ! {
    PANEL.run_entry_control(&INPUTS, &TONES).await
}

#[embassy_executor::task]
async fn exit_task() -> ! {
    PANEL.run_exit_control(&INPUTS).await
}

#[embassy_executor::task]
async fn reset_task() -> ! {
    PANEL.run_reset_control(&INPUTS, &TONES).await
}

#[embassy_executor::task]
async fn summary_task() -> ! {
    PANEL.run_summary().await
}

#[embassy_executor::task]
async fn indicator_task(mut light: io::IndicatorPins) -> ! {
    run_indicator(&GATE, &mut light).await
}

#[embassy_executor::task]
async fn matrix_task(mut matrix: io::Ws2812Matrix) -> ! {
    run_matrix(&GATE, &mut matrix).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let peripherals = embassy_stm32::init(Default::default());

    bind_interrupts!(struct Irqs {
        USART1 => usart::InterruptHandler<peripherals::USART1>;
    });
    let usart = Uart::new(
        peripherals.USART1,
        peripherals.PA10,
        peripherals.PA9,
        Irqs,
        peripherals.DMA1_CH4,
        peripherals.DMA1_CH5,
        Config::default(), // 115200 baud
    )
    .unwrap();
    spawner.spawn(io::console_task(usart, &CONSOLE)).unwrap();

    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Info);
    info!("initialising access panel, {} slots", MAX_OCCUPANTS);

    let entry = ExtiInput::new(peripherals.PE11, peripherals.EXTI11, Pull::Up);
    let exit = ExtiInput::new(peripherals.PE13, peripherals.EXTI13, Pull::Up);
    let reset = ExtiInput::new(peripherals.PE15, peripherals.EXTI15, Pull::Up);
    spawner.spawn(io::button_task(entry, exit, reset, &INPUTS)).unwrap();

    let buzzer = Output::new(peripherals.PB8, Level::Low, Speed::Low);
    spawner.spawn(io::buzzer_task(buzzer, &TONES)).unwrap();

    PANEL.boot_screen().await;
    Timer::after(SPLASH_DURATION).await;

    let indicator = io::IndicatorPins::new(
        Output::new(peripherals.PB10, Level::Low, Speed::Low),
        Output::new(peripherals.PB14, Level::Low, Speed::Low),
        Output::new(peripherals.PB12, Level::Low, Speed::Low),
    );
    spawner.spawn(indicator_task(indicator)).unwrap();

    let mut spi_config = spi::Config::default();
    spi_config.frequency = Hertz(2_400_000);
    let spi = Spi::new_blocking_txonly(peripherals.SPI1, peripherals.PA5, peripherals.PA7, spi_config);
    spawner.spawn(matrix_task(io::Ws2812Matrix::new(spi))).unwrap();

    spawner.spawn(summary_task()).unwrap();

    interrupt::USART3.set_priority(Priority::P6);
    let control = CONTROL_EXECUTOR.start(interrupt::USART3);
    control.spawn(entry_task()).unwrap();
    control.spawn(exit_task()).unwrap();
    control.spawn(reset_task()).unwrap();

    info!("all tasks started");
}
