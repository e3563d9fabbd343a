use std::fmt;

use clap::error::ErrorKind;
use clap::Parser;

use ethers_core::types::Signature;

use crate::cheque::ChequeParameters;
use crate::error::{ChequeError, Result};
use crate::signer::{parse_signature, ChequeSigner};

pub const USAGE: &str = "Usage: cheque-signer <to> <amount> <nonce>";
pub const USAGE_EXAMPLE: &str =
    "Example: cheque-signer 0x4B20993Bc481177ec7E8f571ceCaE8A9e22C02db 1000000000000000000 1";

/// A tool that hashes a BotPayMaster cheque, signs the hash with and without
/// the Ethereum message prefix, and recovers the signer from both signatures.
///
/// Use the NON-PREFIXED signature with the `cashCheque` contract function.
#[derive(Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct ChequeSignerConfig {
    /// Address of the cheque receiver.
    pub to: String,

    /// Amount in wei, decimal or 0x prefixed hex.
    pub amount: String,

    /// Cheque nonce, decimal or 0x prefixed hex.
    pub nonce: String,

    /// Address of the cheque issuer.
    #[arg(long, env = "FROM_ADDRESS")]
    pub from: String,

    /// Hex encoded private key of the cheque issuer.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Sets the logger filter.
    /// Valid values: trace, debug, info, warn, error
    /// Example of a valid filter: "warn,cheque_signer=debug".
    #[clap(long, default_value = "info")]
    pub logger_filter: String,

    /// Print the report as JSON instead of the console layout.
    #[arg(long)]
    pub json: bool,

    /// Hex encoded non-prefixed signature to check against the cheque issuer,
    /// e.g. one produced by another signer before calling `cashCheque`.
    #[arg(long)]
    pub signature: Option<String>,
}

impl ChequeSignerConfig {
    pub fn cheque(&self) -> Result<ChequeParameters> {
        ChequeParameters::parse(&self.from, &self.to, &self.amount, &self.nonce)
    }

    pub fn signer(&self) -> Result<ChequeSigner> {
        self.private_key.parse()
    }

    pub fn signature(&self) -> Result<Option<Signature>> {
        self.signature.as_deref().map(parse_signature).transpose()
    }
}

impl fmt::Debug for ChequeSignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChequeSignerConfig")
            .field("to", &self.to)
            .field("amount", &self.amount)
            .field("nonce", &self.nonce)
            .field("from", &self.from)
            .field("private_key", &"<redacted>")
            .field("logger_filter", &self.logger_filter)
            .field("json", &self.json)
            .field("signature", &self.signature)
            .finish()
    }
}

/// Returns `true` if the parse error is a regular help or version request.
pub fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}

pub fn usage_error(err: &clap::Error) -> ChequeError {
    let rendered = err.render().to_string();
    ChequeError::Usage(rendered.trim().trim_start_matches("error: ").to_string())
}

/// Usage message printed when the command line can't be parsed.
pub fn usage_message(err: &clap::Error) -> String {
    format!("{USAGE}\n{USAGE_EXAMPLE}\n\n{}", usage_error(err))
}
