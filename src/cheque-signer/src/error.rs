use ethers_core::k256::ecdsa;
use ethers_core::types::Address;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChequeError>;

/// Cheque signing error.
#[derive(Debug, Error)]
pub enum ChequeError {
    #[error("invalid {field} '{value}': {reason}")]
    InvalidParameter {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("signing error: {0}")]
    Signing(#[from] SigningError),

    #[error("recovery error: {0}")]
    Recovery(#[from] RecoveryError),

    #[error("usage error: {0}")]
    Usage(String),
}

impl ChequeError {
    pub fn invalid_parameter(
        field: &'static str,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidParameter {
            field,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// Variant of `Signing` error
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("malformed private key: {0}")]
    MalformedKey(String),

    #[error("digest must be exactly 32 bytes, got {0}")]
    InvalidDigestLength(usize),

    #[error("ecdsa error: {0}")]
    Ecdsa(#[from] ecdsa::Error),
}

/// Variant of `Recovery` error
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("recovery id must be one of 0, 1, 27, 28, got {0}")]
    InvalidRecoveryId(u64),

    #[error("signature must be exactly 65 bytes, got {0}")]
    InvalidSignatureLength(usize),

    #[error("malformed signature hex: {0}")]
    MalformedSignature(#[from] hex::FromHexError),

    #[error("r and s must lie in the curve order range: {0}")]
    InvalidScalars(ecdsa::Error),

    #[error("public key recovery failed: {0}")]
    Failed(ecdsa::Error),

    #[error("recovered address {recovered:?} does not match expected signer {expected:?}")]
    AddressMismatch {
        expected: Address,
        recovered: Address,
    },
}
