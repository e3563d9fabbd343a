use std::fmt;

use ethers_core::types::{Address, Signature, H256};
use ethers_core::utils::{public_key_to_address, to_checksum};
use serde::Serialize;

use crate::cheque::ChequeParameters;
use crate::error::Result;
use crate::signer::{
    encode_public_key, encode_signature, recover_public_key, verify_signer, ChequeSigner,
    SignatureScheme,
};

/// Everything the signing run produces for one cheque.
#[derive(Debug, Clone)]
pub struct ChequeReport {
    pub cheque: ChequeParameters,
    pub hash: H256,
    pub prefixed_signature: Signature,
    pub raw_signature: Signature,
    pub prefixed_public_key: String,
    pub raw_public_key: String,
    /// Address recovered from the raw signature, expected to be `cheque.from`.
    pub recovered_address: Address,
}

impl ChequeReport {
    /// Hashes the cheque, signs it both ways and recovers the signer from both signatures.
    pub fn build(cheque: ChequeParameters, signer: &ChequeSigner) -> Result<Self> {
        let hash = cheque.hash();
        log::debug!("cheque hash: {hash:?}");

        let prefixed_signature = signer.sign_prefixed(hash)?;
        let raw_signature = signer.sign_raw(hash)?;
        log::debug!("cheque signed by {:?}", signer.address());

        let prefixed_key = recover_public_key(hash, &prefixed_signature, SignatureScheme::Prefixed)?;
        let raw_key = recover_public_key(hash, &raw_signature, SignatureScheme::Raw)?;

        Ok(Self {
            cheque,
            hash,
            prefixed_signature,
            raw_signature,
            prefixed_public_key: encode_public_key(&prefixed_key),
            raw_public_key: encode_public_key(&raw_key),
            recovered_address: public_key_to_address(&raw_key),
        })
    }

    /// Checks that the raw signature recovers to the cheque issuer.
    pub fn verify(&self) -> Result<()> {
        self.verify_signature(&self.raw_signature)
    }

    /// Checks that a non-prefixed signature over this cheque recovers to the issuer.
    pub fn verify_signature(&self, signature: &Signature) -> Result<()> {
        verify_signer(self.hash, signature, SignatureScheme::Raw, self.cheque.from)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&ChequeReportJson::from(self))
    }
}

impl fmt::Display for ChequeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FROM\t: {}", to_checksum(&self.cheque.from, None))?;
        writeln!(f, "TO\t: {}", to_checksum(&self.cheque.to, None))?;
        writeln!(f, "AMOUNT\t: {}", self.cheque.amount)?;
        writeln!(f, "NONCE\t: {}", self.cheque.nonce)?;
        writeln!(f, "HASH\t: {:?}", self.hash)?;
        writeln!(f)?;
        writeln!(f, "== SIGNATURES ==")?;
        writeln!(f, "PREFIXED:\n {}", encode_signature(&self.prefixed_signature))?;
        writeln!(
            f,
            "NON-PREFIXED (use this with BotPayMaster):\n {}",
            encode_signature(&self.raw_signature)
        )?;
        writeln!(f)?;
        writeln!(f, "== RECOVERY ==")?;
        writeln!(f, "PREFIXED PUBLIC KEY:\n {}", self.prefixed_public_key)?;
        writeln!(f, "NON-PREFIXED PUBLIC KEY:\n {}", self.raw_public_key)?;
        write!(
            f,
            "RECOVERED ADDRESS:\n {}",
            to_checksum(&self.recovered_address, None)
        )
    }
}

/// Serializable view of [`ChequeReport`], all values as strings.
#[derive(Debug, Serialize)]
struct ChequeReportJson {
    from: String,
    to: String,
    amount: String,
    nonce: String,
    hash: String,
    prefixed_signature: String,
    non_prefixed_signature: String,
    prefixed_public_key: String,
    non_prefixed_public_key: String,
    recovered_address: String,
}

impl From<&ChequeReport> for ChequeReportJson {
    fn from(report: &ChequeReport) -> Self {
        Self {
            from: to_checksum(&report.cheque.from, None),
            to: to_checksum(&report.cheque.to, None),
            amount: report.cheque.amount.to_string(),
            nonce: report.cheque.nonce.to_string(),
            hash: format!("{:?}", report.hash),
            prefixed_signature: encode_signature(&report.prefixed_signature),
            non_prefixed_signature: encode_signature(&report.raw_signature),
            prefixed_public_key: report.prefixed_public_key.clone(),
            non_prefixed_public_key: report.raw_public_key.clone(),
            recovered_address: to_checksum(&report.recovered_address, None),
        }
    }
}
