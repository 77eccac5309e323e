//! wavslot: PCM-to-WAV encoding and revocable result slots.
//!
//! This binary can run in three modes:
//! - Encode mode: convert a base64 PCM payload file into a WAV file
//! - Inspect mode: print the header of an existing WAV file
//! - Daemon mode: JSON-RPC server managing result slots

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use wavslot::audio::{decode_base64, encode_wav, probe, samples_to_duration, write_wav, WavHeader};
use wavslot::cli::Cli;
use wavslot::config::DaemonConfig;
use wavslot::rpc::{run_server, ServerState};

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Installs a stderr subscriber; stdout carries JSON-RPC traffic.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    if cli.is_daemon_mode() {
        run_daemon_mode()
    } else if cli.is_inspect_mode() {
        run_inspect_mode(&cli)
    } else if cli.is_encode_mode() {
        run_encode_mode(&cli)
    } else {
        print_usage();
        Ok(())
    }
}

/// Decodes a base64 payload and writes it as a WAV file.
fn run_encode_mode(cli: &Cli) -> anyhow::Result<()> {
    let payload = read_payload(cli)?;
    let format = cli.format();
    let output_path = cli.output_path();

    let samples = decode_base64(&payload)?;
    let container = encode_wav(samples.as_bytes(), &format)?;
    write_wav(&container, &output_path)?;

    tracing::info!(
        output = %output_path.display(),
        format = %container.format(),
        bytes = container.len(),
        duration_sec = samples_to_duration(samples.len(), &format),
        "wrote WAV file"
    );
    Ok(())
}

fn read_payload(cli: &Cli) -> anyhow::Result<String> {
    let mut payload = String::new();
    if cli.reads_stdin() {
        std::io::stdin()
            .read_to_string(&mut payload)
            .context("Failed to read payload from stdin")?;
    } else if let Some(ref path) = cli.input {
        payload = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload from {}", path.display()))?;
    }
    Ok(payload)
}

/// Prints the header fields and decoder view of a WAV file.
fn run_inspect_mode(cli: &Cli) -> anyhow::Result<()> {
    let Some(ref path) = cli.inspect else {
        return Ok(());
    };
    let bytes = read_file(path)?;

    let header = WavHeader::parse(&bytes)?;
    let info = probe(&bytes)?;

    println!("file:            {}", path.display());
    println!("sample rate:     {} Hz", header.format.sample_rate);
    println!("channels:        {}", header.format.channels);
    println!("bits per sample: {}", header.format.bits_per_sample);
    println!("byte rate:       {}", header.byte_rate);
    println!("block align:     {}", header.block_align);
    println!("data bytes:      {}", header.data_len);
    println!("frames:          {}", info.frames);
    println!("duration:        {:.3}s", info.duration_sec);
    Ok(())
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Runs the daemon mode (JSON-RPC server).
fn run_daemon_mode() -> anyhow::Result<()> {
    let config = DaemonConfig::from_env();
    if let Some(problem) = config.validate() {
        anyhow::bail!("invalid configuration: {}", problem);
    }

    tracing::info!(
        store = %config.store,
        default_format = %config.default_format,
        "starting wavslot daemon"
    );
    if config.store == wavslot::StoreKind::Disk {
        tracing::info!(cache_path = %config.effective_cache_path().display(), "using disk store");
    }

    let state = ServerState::new(config);
    run_server(state)?;
    Ok(())
}

/// Prints usage information.
fn print_usage() {
    eprintln!("wavslot: PCM-to-WAV encoding and revocable result slots");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  Encode a base64 speech payload (24 kHz mono 16-bit by default):");
    eprintln!("    wavslot --input payload.b64 --output speech.wav");
    eprintln!();
    eprintln!("  Inspect a WAV file:");
    eprintln!("    wavslot --inspect audiobook.wav");
    eprintln!();
    eprintln!("  Daemon mode (JSON-RPC server):");
    eprintln!("    wavslot --daemon");
    eprintln!();
    eprintln!("Run 'wavslot --help' for full options.");
}
