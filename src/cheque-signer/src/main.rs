use std::process::ExitCode;

use anyhow::Context;
use cheque_signer::config::{self, ChequeSignerConfig};
use cheque_signer::ChequeReport;
use clap::Parser;
use env_logger::Builder;
use log::SetLoggerError;

fn main() -> ExitCode {
    let config = match ChequeSignerConfig::try_parse() {
        Ok(config) => config,
        Err(err) if config::is_informational(&err) => err.exit(),
        Err(err) => {
            println!("{}", config::usage_message(&err));
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logger(&config.logger_filter) {
        eprintln!("failed to initialize logger: {err}");
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logger
fn init_logger(logger_filter: &str) -> Result<(), SetLoggerError> {
    Builder::new().parse_filters(logger_filter).try_init()
}

/// Hashes and signs the cheque, prints the report and checks the recovered signer.
fn run(config: &ChequeSignerConfig) -> anyhow::Result<()> {
    let cheque = config.cheque().context("invalid cheque parameters")?;
    let signer = config.signer().context("failed to load signing key")?;
    let provided_signature = config.signature().context("invalid --signature")?;
    log::info!(
        "signing cheque from {:?} to {:?}, amount {}, nonce {}",
        cheque.from,
        cheque.to,
        cheque.amount,
        cheque.nonce
    );

    let report = ChequeReport::build(cheque, &signer).context("failed to sign cheque")?;

    if config.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{report}");
    }

    report
        .verify()
        .context("recovered signer does not match the cheque issuer")?;
    log::info!("signature recovers to {:?}", report.recovered_address);

    if let Some(signature) = provided_signature {
        report
            .verify_signature(&signature)
            .context("provided signature does not recover to the cheque issuer")?;
        log::info!("provided signature recovers to {:?}", report.cheque.from);
    }

    Ok(())
}
