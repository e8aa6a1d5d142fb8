mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::LoggingArgs;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "framewire", version, about = "Length-prefixed framing CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    #[command(flatten)]
    logging: LoggingArgs,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    cli.logging.init();

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "framewire",
            "send",
            "/tmp/test.sock",
            "--data",
            "hello",
            "--byte-order",
            "big",
        ])
        .expect("send args should parse");

        assert!(matches!(cli.command, Command::Send(_)));
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "framewire",
            "send",
            "/tmp/test.sock",
            "--json",
            "{\"x\":1}",
            "--data",
            "hello",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_unknown_byte_order() {
        let err = Cli::try_parse_from(["framewire", "encode", "--byte-order", "middle"])
            .expect_err("unknown byte order should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn listen_capacity_defaults_to_max_frame() {
        let cli = Cli::try_parse_from(["framewire", "listen", "/tmp/test.sock"])
            .expect("listen args should parse");
        match cli.command {
            Command::Listen(args) => assert_eq!(args.capacity, framewire_frame::MAX_FRAME),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn listen_rejects_zero_count() {
        let err = Cli::try_parse_from(["framewire", "listen", "/tmp/test.sock", "--count", "0"])
            .expect_err("zero count should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let cli = Cli::try_parse_from(["framewire", "listen", "/tmp/test.sock", "--count", "2"])
            .expect("positive count should parse");
        match cli.command {
            Command::Listen(args) => assert_eq!(args.count.map(|n| n.get()), Some(2)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_log_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "framewire",
            "version",
            "--log-level",
            "trace",
            "--log-format",
            "json",
        ])
        .expect("global flags should parse");
        assert!(matches!(cli.logging.log_format, logging::LogFormat::Json));
    }
}
