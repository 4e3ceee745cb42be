/*
 * Tones for the buzzer.
 *
 * Several control tasks beep, but there is only one buzzer. Tones are queued
 * on a channel that a single buzzer task drains, the same way the I/O task
 * owns all pins and other tasks talk to it through channels.
 */

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Timer};
use log::warn;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration: Duration,
}

impl Tone {
    pub const fn new(frequency_hz: u32, duration: Duration) -> Self {
        Tone {
            frequency_hz,
            duration,
        }
    }

    /// Half of one period of the square wave, in microseconds.
    pub fn half_period_micros(&self) -> u64 {
        500_000 / u64::from(self.frequency_hz.max(1))
    }
}

/// Something that can sound a tone. `play_tone` completes once the tone has
/// finished, so callers can sequence tones and pauses. `sound_tone` only
/// starts the tone and returns at once; a tone that cannot be started is
/// dropped.
#[allow(async_fn_in_trait)]
pub trait ToneOutput {
    async fn play_tone(&self, tone: Tone);
    fn sound_tone(&self, tone: Tone);
}

pub const TONE_QUEUE_DEPTH: usize = 4;

pub struct ToneChannel<M: RawMutex> {
    requests: Channel<M, Tone, TONE_QUEUE_DEPTH>,
}

impl<M: RawMutex> ToneChannel<M> {
    pub const fn new() -> Self {
        ToneChannel {
            requests: Channel::new(),
        }
    }

    /// Waits for the next tone the buzzer should play.
    pub async fn next(&self) -> Tone {
        self.requests.receive().await
    }
}

impl<M: RawMutex> ToneOutput for ToneChannel<M> {
    async fn play_tone(&self, tone: Tone) {
        self.requests.send(tone).await;
        Timer::after(tone.duration).await;
    }

    fn sound_tone(&self, tone: Tone) {
        if self.requests.try_send(tone).is_err() {
            warn!("tone queue full, dropped {} Hz tone", tone.frequency_hz);
        }
    }
}
