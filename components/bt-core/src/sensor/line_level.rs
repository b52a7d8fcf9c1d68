use embassy_sync::{
    blocking_mutex::raw::NoopRawMutex,
    channel::{Channel, Receiver, Sender},
};
use embassy_time::{Duration, Timer};
use embedded_hal::digital::InputPin;

/// Instantaneous logic level of the monitored line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

/// One reading of the line, taken at the moment of the pin read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    pub level: Level,
}

impl Sample {
    /// ASCII digit the plotter line carries for this sample.
    pub fn digit(&self) -> u8 {
        match self.level {
            Level::Low => b'0',
            Level::High => b'1',
        }
    }
}

pub struct Runner<'a, Pin: InputPin, const N: usize> {
    pin: Pin,
    sample_interval: Duration,
    tx: Sender<'a, NoopRawMutex, Sample, N>,
}

impl<Pin: InputPin, const N: usize> Runner<'_, Pin, N> {
    pub async fn run(mut self) {
        loop {
            self.sample_once().await;
            Timer::after(self.sample_interval).await;
        }
    }

    pub async fn sample_once(&mut self) {
        match self.pin.is_high() {
            Ok(high) => {
                let sample = Sample { level: Level::from(high) };
                trace!("Line> {:?}", sample);
                self.tx.send(sample).await;
            }
            Err(_) => {
                warn!("Line> pin read error, skipping sample");
            }
        }
    }
}

pub struct State<const N: usize> {
    channel: Channel<NoopRawMutex, Sample, N>,
}

impl<const N: usize> State<N> {
    pub fn new() -> Self {
        State { channel: Channel::new() }
    }
}

impl<const N: usize> Default for State<N> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn new<'a, Pin: InputPin, const N: usize>(
    state: &'a mut State<N>,
    pin: Pin,
    sample_interval: Duration,
) -> (Runner<'a, Pin, N>, Receiver<'a, NoopRawMutex, Sample, N>) {
    (
        Runner {
            pin,
            sample_interval,
            tx: state.channel.sender(),
        },
        state.channel.receiver(),
    )
}
