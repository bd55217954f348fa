//! fire-keys - play the computer keyboard like a piano
//!
//! Run with: cargo run --bin fire-keys
//! Log level comes from RUST_LOG (default: warn).

mod audio;
mod keyboard;

use color_eyre::eyre::WrapErr;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use fire_keys::{
    config::SynthConfig,
    synth::{engine, monitor::monitor},
};

/// Pending render reports kept between UI polls.
const REPORT_RING_SIZE: usize = 64;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()?;

    let device = audio::OutputDevice::open_default()?;
    let config = SynthConfig::default().sample_rate(device.sample_rate());

    let (handle, renderer) = engine(config.clone()).wrap_err("invalid synth configuration")?;
    let (render_monitor, reports) = monitor(REPORT_RING_SIZE);
    let stream = device.play(&config, renderer, render_monitor)?;

    println!("=== Fire Keys ===");
    println!("Sample rate: {} Hz", config.sample_rate);
    println!("Block size: {} frames", config.block_size);
    println!("Keys: z..m , . / (C3-E4)  q..u (F4-E5)");
    println!("SPACE = sustain | UP/DOWN = octave | ESC = quit");
    println!();

    let result = keyboard::run(&handle, reports);

    handle.all_notes_off();
    drop(stream);
    println!("Stopped.");
    result
}
