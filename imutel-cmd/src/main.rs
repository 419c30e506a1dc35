mod output;

use std::fs::File;
use std::io::{stderr, stdout, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use imutel::packet::{read_packets, DecodedPacket};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Decode binary IMU telemetry into CSV records.
///
/// The input is scanned for sensor packets; each decoded packet becomes one
/// semicolon-delimited CSV row holding its timestamp and the first
/// accelerometer and gyroscope readings it contains. Packets that cannot be
/// decoded are dropped with a warning and processing continues.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Input file with binary data from the sensors.
    input: PathBuf,

    /// Output file for decoded data in CSV format.
    ///
    /// A .csv extension is appended when not already present. Without this
    /// option the CSV records are written to stdout.
    #[arg(short, long, value_name = "path")]
    output: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, action)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("IMUTEL_LOG")
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let file = File::open(&cli.input)
        .with_context(|| format!("failed to open input {:?}", cli.input))?;

    let mut decoded: Vec<DecodedPacket> = Vec::new();
    let mut dropped = 0usize;
    for zult in read_packets(BufReader::new(file)) {
        match zult {
            Ok(packet) => {
                debug!("decoded {packet}");
                decoded.push(packet);
            }
            Err(imutel::Error::Io(err)) => return Err(err).context("reading input"),
            Err(err) => {
                warn!("dropping invalid packet: {err}");
                dropped += 1;
            }
        }
    }
    info!(decoded = decoded.len(), dropped, "finished decoding");

    match cli.output {
        Some(path) => {
            let path = output::with_csv_extension(&path);
            let dest = File::create(&path)
                .with_context(|| format!("failed to create output {path:?}"))?;
            output::write_csv(dest, &decoded)?;
            info!("wrote {} records to {path:?}", decoded.len());
        }
        None => output::write_csv(stdout(), &decoded)?,
    }

    Ok(())
}
