use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use framewire_frame::{ByteOrder, FrameConfig, MAX_FRAME};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod echo;
pub mod encode;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a single frame.
    Send(SendArgs),
    /// Listen and print received frames.
    Listen(ListenArgs),
    /// Start an echo server.
    Echo(EchoArgs),
    /// Print the wire encoding of a payload.
    Encode(EncodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Echo(args) => echo::run(args),
        Command::Encode(args) => encode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Wire byte order of the length prefix.
#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum ByteOrderArg {
    #[default]
    Little,
    Big,
}

impl ByteOrderArg {
    pub fn name(self) -> &'static str {
        match self {
            ByteOrderArg::Little => "little",
            ByteOrderArg::Big => "big",
        }
    }
}

impl From<ByteOrderArg> for ByteOrder {
    fn from(arg: ByteOrderArg) -> Self {
        match arg {
            ByteOrderArg::Little => ByteOrder::Little,
            ByteOrderArg::Big => ByteOrder::Big,
        }
    }
}

/// Where a payload comes from.
#[derive(Args, Debug, Default)]
pub struct PayloadArgs {
    /// JSON payload (validated before sending).
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub json: Option<String>,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["json", "file"])]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["json", "data"])]
    pub file: Option<PathBuf>,
}

impl PayloadArgs {
    pub fn resolve(&self) -> CliResult<Vec<u8>> {
        if let Some(json) = &self.json {
            serde_json::from_str::<serde_json::Value>(json)
                .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")))?;
            return Ok(json.as_bytes().to_vec());
        }
        if let Some(data) = &self.data {
            return Ok(data.as_bytes().to_vec());
        }
        if let Some(path) = &self.file {
            return fs::read(path).map_err(|err| {
                crate::exit::io_error(&format!("failed reading {}", path.display()), err)
            });
        }
        Ok(Vec::new())
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Socket path to connect to.
    pub path: PathBuf,
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// Byte order of the length prefix.
    #[arg(long, value_enum, default_value_t = ByteOrderArg::Little)]
    pub byte_order: ByteOrderArg,
    /// Wait for one response frame and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for the response when --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    /// Exit after receiving N frames (at least 1).
    #[arg(long)]
    pub count: Option<NonZeroUsize>,
    /// Receive buffer capacity in bytes, header included.
    #[arg(long, default_value_t = MAX_FRAME)]
    pub capacity: usize,
    /// Byte order of the length prefix.
    #[arg(long, value_enum, default_value_t = ByteOrderArg::Little)]
    pub byte_order: ByteOrderArg,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    /// Byte order of the length prefix.
    #[arg(long, value_enum, default_value_t = ByteOrderArg::Little)]
    pub byte_order: ByteOrderArg,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// Byte order of the length prefix.
    #[arg(long, value_enum, default_value_t = ByteOrderArg::Little)]
    pub byte_order: ByteOrderArg,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn frame_config(byte_order: ByteOrderArg, read_timeout: Option<Duration>) -> FrameConfig {
    FrameConfig {
        byte_order: byte_order.into(),
        read_timeout,
        ..FrameConfig::default()
    }
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn payload_defaults_to_empty() {
        assert!(PayloadArgs::default().resolve().unwrap().is_empty());
    }

    #[test]
    fn invalid_json_payload_is_usage_error() {
        let args = PayloadArgs {
            json: Some("{not json".to_string()),
            ..PayloadArgs::default()
        };
        assert_eq!(args.resolve().unwrap_err().code, USAGE);
    }

    #[test]
    fn byte_order_arg_converts() {
        assert_eq!(ByteOrder::from(ByteOrderArg::Big), ByteOrder::Big);
        assert_eq!(ByteOrder::from(ByteOrderArg::default()), ByteOrder::Little);
    }
}
