use std::io;
use std::process::ExitCode;
use std::thread;

use clap::Parser;
use embassy_futures::block_on;
use gesture_core::{ControlMode, GestureBridge, LandmarkSource, StopReason};
use log::info;
use serialport::SerialPort;

use gesture_to_uart::{
    open_serial, Args, Detector, HostConfig, HostResult, JsonLandmarkSource, SerialLink, StdDelay,
};

fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG still wins over the default level.
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .init();

    match run(&args) {
        Ok(reason) => {
            info!("Stopped: {}", reason);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("gesture-to-uart: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> HostResult<StopReason> {
    let config = HostConfig::load(args)?;

    print_banner();

    let link = open_serial(&config.port, config.baud, config.read_timeout)?;
    info!("Connected to {} at {} baud", config.port, config.baud);
    info!("Waiting {:?} for the microcontroller to reset", config.settle);
    thread::sleep(config.settle);

    match &config.detector {
        Some(command) => {
            let (detector, source) = Detector::spawn(command, config.filter)?;
            let result = drive(source, link, &config);
            detector.shutdown();
            info!("Detector stopped");
            result
        }
        None => {
            info!("Reading landmark frames from stdin");
            let source = JsonLandmarkSource::with_filter(io::stdin().lock(), config.filter);
            drive(source, link, &config)
        }
    }
}

fn drive<S: LandmarkSource>(
    source: S,
    link: SerialLink<Box<dyn SerialPort>>,
    config: &HostConfig,
) -> HostResult<StopReason> {
    let mut bridge = GestureBridge::with_config(source, link, StdDelay, config.bridge);
    let result = block_on(bridge.run());

    if let Some(command) = bridge.last_sent() {
        info!("Last command: {} ({})", command, command.mode());
    }

    let (_, link, _) = bridge.into_parts();
    drop(link);
    info!("Serial port closed");

    Ok(result?)
}

fn print_banner() {
    println!("gesture-to-uart v{}", env!("CARGO_PKG_VERSION"));
    println!("Raise fingers in front of the camera to pick a mode:");
    for mode in ControlMode::ALL {
        let fingers = mode.command().value();
        println!(
            "  {} finger{} -> {}",
            fingers,
            if fingers == 1 { " " } else { "s" },
            mode
        );
    }
    println!();
}
