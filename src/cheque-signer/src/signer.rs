//! Local secp256k1 signer for cheque hashes and public key recovery.
use std::fmt;
use std::str::FromStr;

use ethers_core::k256::ecdsa::{self, RecoveryId, SigningKey, VerifyingKey};
use ethers_core::types::{Address, Signature, H256, U256};
use ethers_core::utils::{hash_message, public_key_to_address, secret_key_to_address};

use crate::error::{ChequeError, RecoveryError, Result, SigningError};

/// Size of a serialized `r || s || v` signature.
pub const SIGNATURE_SIZE: usize = 65;

/// Offset added to the recovery id of emitted signatures, as `ecrecover` expects.
const RECOVERY_ID_OFFSET: u64 = 27;

/// Digest a signature is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// EIP-191 personal message: `keccak256("\x19Ethereum Signed Message:\n32" || hash)`.
    Prefixed,
    /// The cheque hash itself. `cashCheque` recovers the signer from this one.
    Raw,
}

impl SignatureScheme {
    /// Returns the digest which is actually signed for `hash`.
    pub fn digest(self, hash: H256) -> H256 {
        match self {
            Self::Prefixed => hash_message(hash),
            Self::Raw => hash,
        }
    }
}

/// A cheque signer instantiated with a locally stored private key
#[derive(Clone)]
pub struct ChequeSigner {
    signer: SigningKey,
    address: Address,
}

impl ChequeSigner {
    /// Creates a new signer from a raw scalar value (big endian).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(SigningError::MalformedKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            ))
            .into());
        }

        let signer = SigningKey::from_slice(bytes).map_err(SigningError::from)?;
        Ok(signer.into())
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> VerifyingKey {
        self.signer.verifying_key().clone()
    }

    /// Signs the EIP-191 prefixed hash, like `wallet.signMessage(hash)` does.
    pub fn sign_prefixed(&self, hash: H256) -> Result<Signature> {
        self.sign(hash, SignatureScheme::Prefixed)
    }

    /// Signs the hash directly, without prefix and without re-hashing.
    pub fn sign_raw(&self, hash: H256) -> Result<Signature> {
        self.sign(hash, SignatureScheme::Raw)
    }

    /// Same as [`Self::sign_raw`] for a digest of unchecked length.
    pub fn sign_raw_slice(&self, digest: &[u8]) -> Result<Signature> {
        self.sign_digest(digest)
    }

    pub fn sign(&self, hash: H256, scheme: SignatureScheme) -> Result<Signature> {
        self.sign_digest(scheme.digest(hash).as_bytes())
    }

    /// RFC 6979 deterministic signature with normalized low `s`.
    /// The digest must be exactly 32 bytes.
    fn sign_digest(&self, digest: &[u8]) -> Result<Signature> {
        if digest.len() != 32 {
            return Err(SigningError::InvalidDigestLength(digest.len()).into());
        }

        let (signature, recovery_id) = self
            .signer
            .sign_prehash_recoverable(digest)
            .map_err(SigningError::from)?;

        let bytes = signature.to_bytes();
        Ok(Signature {
            r: U256::from_big_endian(&bytes[..32]),
            s: U256::from_big_endian(&bytes[32..]),
            v: u64::from(recovery_id.to_byte()) + RECOVERY_ID_OFFSET,
        })
    }
}

impl From<SigningKey> for ChequeSigner {
    fn from(signer: SigningKey) -> Self {
        let address = secret_key_to_address(&signer);
        Self { signer, address }
    }
}

impl FromStr for ChequeSigner {
    type Err = ChequeError;

    fn from_str(src: &str) -> Result<Self> {
        let src = src
            .strip_prefix("0x")
            .or_else(|| src.strip_prefix("0X"))
            .unwrap_or(src);
        let bytes = hex::decode(src).map_err(|e| SigningError::MalformedKey(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Debug for ChequeSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChequeSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Recovers the public key which produced `signature` over `hash`.
///
/// Accepts recovery ids in both the `{0, 1}` and the `{27, 28}` conventions.
/// High `s` signatures are accepted, as `ecrecover` does.
pub fn recover_public_key(
    hash: H256,
    signature: &Signature,
    scheme: SignatureScheme,
) -> Result<VerifyingKey> {
    let mut is_y_odd = match signature.v {
        0 | 27 => false,
        1 | 28 => true,
        v => return Err(RecoveryError::InvalidRecoveryId(v).into()),
    };

    let bytes = <[u8; SIGNATURE_SIZE]>::from(signature);
    let mut ecdsa_signature =
        ecdsa::Signature::from_slice(&bytes[..64]).map_err(RecoveryError::InvalidScalars)?;

    // k256 only recovers from low `s`, negating `s` flips the parity of `R.y`
    if let Some(normalized) = ecdsa_signature.normalize_s() {
        ecdsa_signature = normalized;
        is_y_odd = !is_y_odd;
    }

    let digest = scheme.digest(hash);
    let public_key = VerifyingKey::recover_from_prehash(
        digest.as_bytes(),
        &ecdsa_signature,
        RecoveryId::new(is_y_odd, false),
    )
    .map_err(RecoveryError::Failed)?;

    Ok(public_key)
}

/// Recovers the signer address and checks it against `expected`.
pub fn verify_signer(
    hash: H256,
    signature: &Signature,
    scheme: SignatureScheme,
    expected: Address,
) -> Result<()> {
    let recovered = public_key_to_address(&recover_public_key(hash, signature, scheme)?);
    if recovered != expected {
        return Err(RecoveryError::AddressMismatch {
            expected,
            recovered,
        }
        .into());
    }

    Ok(())
}

/// Uncompressed SEC1 encoding of the public key, `0x04` tagged.
pub fn encode_public_key(public_key: &VerifyingKey) -> String {
    format!(
        "0x{}",
        hex::encode(public_key.to_encoded_point(false).as_bytes())
    )
}

/// Serializes the signature as `0x` prefixed `r || s || v`.
pub fn encode_signature(signature: &Signature) -> String {
    format!("0x{}", hex::encode(<[u8; SIGNATURE_SIZE]>::from(signature)))
}

/// Decodes a `0x` prefixed (or bare) hex `r || s || v` signature.
pub fn parse_signature(src: &str) -> Result<Signature> {
    let src = src
        .strip_prefix("0x")
        .or_else(|| src.strip_prefix("0X"))
        .unwrap_or(src);
    let bytes = hex::decode(src).map_err(RecoveryError::from)?;
    if bytes.len() != SIGNATURE_SIZE {
        return Err(RecoveryError::InvalidSignatureLength(bytes.len()).into());
    }

    Ok(Signature {
        r: U256::from_big_endian(&bytes[..32]),
        s: U256::from_big_endian(&bytes[32..64]),
        v: u64::from(bytes[64]),
    })
}
