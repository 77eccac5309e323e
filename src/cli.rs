//! CLI argument parser.
//!
//! Provides command-line access to the encoder for one-off conversions and
//! inspection, plus the switch into JSON-RPC daemon mode.

use std::path::PathBuf;

use clap::Parser;

use crate::types::AudioFormat;

/// wavslot: PCM-to-WAV encoding and revocable result slots
#[derive(Parser, Debug)]
#[command(name = "wavslot")]
#[command(about = "Encode generated speech into WAV and manage revocable result slots")]
#[command(version)]
pub struct Cli {
    /// File holding a base64 PCM payload ("-" reads stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output WAV file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Sample rate of the decoded PCM in Hz
    #[arg(short = 'r', long, default_value_t = AudioFormat::SPEECH.sample_rate)]
    pub sample_rate: u32,

    /// Channel count of the decoded PCM
    #[arg(short, long, default_value_t = AudioFormat::SPEECH.channels)]
    pub channels: u16,

    /// Bits per sample of the decoded PCM (8, 16 or 32)
    #[arg(short, long, default_value_t = AudioFormat::SPEECH.bits_per_sample)]
    pub bits: u16,

    /// Print the header of an existing WAV file
    #[arg(long)]
    pub inspect: Option<PathBuf>,

    /// Run in daemon mode (JSON-RPC over stdio)
    #[arg(long)]
    pub daemon: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Returns true if running in encode mode.
    pub fn is_encode_mode(&self) -> bool {
        !self.daemon && self.input.is_some()
    }

    /// Returns true if running in inspect mode.
    pub fn is_inspect_mode(&self) -> bool {
        !self.daemon && self.inspect.is_some()
    }

    /// Returns true if running in daemon mode.
    pub fn is_daemon_mode(&self) -> bool {
        self.daemon
    }

    /// Returns true if the payload should be read from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.input.as_deref().is_some_and(|p| p.as_os_str() == "-")
    }

    /// Returns the PCM format given on the command line.
    pub fn format(&self) -> AudioFormat {
        AudioFormat::new(self.sample_rate, self.channels, self.bits)
    }

    /// Returns the effective output path.
    ///
    /// Defaults to "speech.wav" in the current directory if not specified.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from("speech.wav"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_speech_format() {
        let cli = Cli::parse_from(["wavslot", "--input", "payload.b64"]);
        assert_eq!(cli.format(), AudioFormat::SPEECH);
        assert!(cli.is_encode_mode());
        assert!(!cli.is_daemon_mode());
        assert!(!cli.reads_stdin());
    }

    #[test]
    fn output_path_default() {
        let cli = Cli::parse_from(["wavslot", "--input", "-"]);
        assert_eq!(cli.output_path(), PathBuf::from("speech.wav"));
        assert!(cli.reads_stdin());
    }

    #[test]
    fn explicit_format() {
        let cli = Cli::parse_from([
            "wavslot", "-i", "a.b64", "-o", "audiobook.wav", "-r", "16000", "-c", "2", "-b", "16",
        ]);
        assert_eq!(cli.format(), AudioFormat::new(16000, 2, 16));
        assert_eq!(cli.output_path(), PathBuf::from("audiobook.wav"));
    }

    #[test]
    fn mode_detection() {
        let daemon = Cli::parse_from(["wavslot", "--daemon"]);
        assert!(daemon.is_daemon_mode());
        assert!(!daemon.is_encode_mode());

        let inspect = Cli::parse_from(["wavslot", "--inspect", "speech.wav"]);
        assert!(inspect.is_inspect_mode());
        assert!(!inspect.is_encode_mode());
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
