#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_futures::join::join3;
use embassy_rp::{
    bind_interrupts,
    gpio::{Input, Level, Output, Pull},
    peripherals::UART0,
    uart::{self, BufferedInterruptHandler, BufferedUart},
};
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

// Program metadata for `picotool info`.
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"Pin Monitor"),
    embassy_rp::binary_info::rp_program_description!(
        c"Streams the logic level of gpio 9 over UART0 for the serial plotter"
    ),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

const BAUD_RATE: u32 = 300;
const SAMPLE_INTERVAL: Duration = Duration::from_millis(1);

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    let mut led = Output::new(p.PIN_25, Level::Low);
    let line = Input::new(p.PIN_9, Pull::None);

    let mut config = uart::Config::default();
    config.baudrate = BAUD_RATE;
    let mut tx_buffer = [0u8; 64];
    let mut rx_buffer = [0u8; 16];
    let uart = BufferedUart::new(p.UART0, p.PIN_0, p.PIN_1, Irqs, &mut tx_buffer, &mut rx_buffer, config);

    let mut line_state = bt_core::sensor::line_level::State::<4>::new();
    let (sampler, sample_receiver) = bt_core::sensor::line_level::new(&mut line_state, line, SAMPLE_INTERVAL);
    let plotter = bt_core::plotter::new(sample_receiver, uart);

    let heartbeat = async {
        loop {
            led.set_high();
            Timer::after_millis(1000).await;
            led.set_low();
            Timer::after_millis(1000).await;
        }
    };

    join3(sampler.run(), plotter.run(), heartbeat).await;
}
