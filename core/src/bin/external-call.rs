//! Fetch a URL through `ExternalClient` and print the JSON body.
//!
//! Transport settings come from `EXTERNAL_CALL_TIMEOUT_SECS` and
//! `EXTERNAL_CALL_HTTP_ERRORS`; log filtering from `RUST_LOG`.

use std::process::ExitCode;

use clap::Parser;
use external_call::telemetry::init_tracing;
use external_call::{
    ExternalCall, ExternalClient, JsonRequestFactory, JsonResponseHandler, ThrowOnError,
    TracingLogHandler, TransportConfig, UreqTransport,
};
use serde_json::Value;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "external-call")]
#[command(about = "GET a JSON resource through the external call lifecycle", long_about = None)]
#[command(version)]
struct Cli {
    /// URL to fetch
    url: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.json_logs, Level::INFO);

    let config = match TransportConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    let client: ExternalClient<(), Value, Value> = ExternalClient::new(
        JsonRequestFactory::new(&cli.url),
        UreqTransport::new(config),
        JsonResponseHandler::new(),
        ThrowOnError,
        TracingLogHandler,
    );
    let mut call = ExternalCall::for_output::<Value>("cli.get", "");

    match client.get(&mut call) {
        Ok(outcome) => {
            let body = outcome.into_result().unwrap_or_else(|fallback| fallback);
            println!("{body:#}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_url_and_json_logs() {
        let cli = Cli::try_parse_from(["external-call", "--json-logs", "http://h/"]).unwrap();
        assert_eq!(cli.url, "http://h/");
        assert!(cli.json_logs);

        let cli = Cli::try_parse_from(["external-call", "http://h/"]).unwrap();
        assert!(!cli.json_logs);
    }

    #[test]
    fn misspelled_flag_is_rejected() {
        let err = Cli::try_parse_from(["external-call", "--jsn-logs", "http://h/"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn url_is_required() {
        let err = Cli::try_parse_from(["external-call", "--json-logs"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn help_is_not_a_usage_error() {
        let err = Cli::try_parse_from(["external-call", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }
}
