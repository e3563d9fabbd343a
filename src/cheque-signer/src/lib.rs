//! Cheque hashing, signing and signer recovery for BotPayMaster payment claims.
//!
//! A cheque is `(from, to, amount, nonce)`. Its hash is
//! `keccak256(abi.encodePacked(from, to, amount, nonce))`, which is signed both
//! with the EIP-191 message prefix and as a raw digest. The raw signature is the
//! one `cashCheque` verifies on chain.

pub mod cheque;
pub mod config;
pub mod error;
pub mod report;
pub mod signer;

pub use cheque::ChequeParameters;
pub use error::{ChequeError, RecoveryError, Result, SigningError};
pub use report::ChequeReport;
pub use signer::{recover_public_key, ChequeSigner, SignatureScheme};
