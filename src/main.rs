use std::{io, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use dxl_jog_controller::{
    config::{DEFAULT_BAUD_RATE, DEFAULT_PORT},
    ControllerConfig, DynamixelProtocol, Exit, JogController, ProtocolVersion, SerialPortHandler, StreamKeyboard,
    TerminalKeyboard,
};

/// Jog Dynamixel goal positions from the keyboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serial port of the servo bus
    #[arg(short, long, default_value = DEFAULT_PORT)]
    port: String,

    /// Bus baudrate
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baudrate: u32,

    /// Dynamixel protocol version
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=2))]
    protocol: u8,

    /// Serial read timeout in milliseconds
    #[arg(long, default_value_t = 100)]
    timeout_ms: u64,

    /// Write jog targets without clamping them to the position limits
    #[arg(long)]
    no_limits: bool,

    /// Jog servos even when enabling their torque failed
    #[arg(long)]
    ungated: bool,

    /// Read keys from stdin instead of the terminal (one key per line works)
    #[arg(long)]
    stdin: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    let defaults = ControllerConfig::default();
    let cfg = ControllerConfig {
        port: args.port,
        baud_rate: args.baudrate,
        protocol: if args.protocol == 1 { ProtocolVersion::V1 } else { ProtocolVersion::V2 },
        timeout: Duration::from_millis(args.timeout_ms),
        position_limits: if args.no_limits { None } else { defaults.position_limits },
        require_torque: !args.ungated,
        ..defaults
    };

    let port = SerialPortHandler::new(&cfg.port, cfg.timeout);
    let client = DynamixelProtocol::new(cfg.protocol);
    let mut controller = JogController::new(port, client, cfg).context("Invalid controller configuration")?;

    let exit = if args.stdin {
        controller.run(&mut StreamKeyboard::new(io::stdin().lock()))
    } else {
        controller.run(&mut TerminalKeyboard)
    };

    match exit {
        Exit::Finished => {}
        Exit::StartupFailed => warn!("terminated before any servo was enabled"),
        Exit::KeyboardFailed => warn!("keyboard input failed, servos were released"),
    }

    Ok(())
}
