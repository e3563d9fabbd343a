use ethers_core::types::{Address, H256, U256};
use ethers_core::utils::{keccak256, to_checksum};

use crate::error::{ChequeError, Result};

/// Data which should be hashed, signed and provided to the
/// `BotPayMaster.cashCheque()` call to claim a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChequeParameters {
    /// Signer of the cheque, the account the payment is drawn from.
    pub from: Address,

    /// Receiver of the payment.
    pub to: Address,

    /// Amount to pay, in wei.
    pub amount: U256,

    /// Value to prevent double cashing of the same cheque.
    pub nonce: U256,
}

impl ChequeParameters {
    pub const ENCODED_DATA_SIZE: usize = 104;

    pub fn new(from: Address, to: Address, amount: U256, nonce: U256) -> Self {
        Self {
            from,
            to,
            amount,
            nonce,
        }
    }

    /// Builds parameters from user supplied strings.
    ///
    /// Addresses are 40 hex digits with an optional `0x` prefix. Integers are
    /// decimal or `0x` prefixed hex.
    pub fn parse(from: &str, to: &str, amount: &str, nonce: &str) -> Result<Self> {
        Ok(Self {
            from: parse_address("from", from)?,
            to: parse_address("to", to)?,
            amount: parse_uint("amount", amount)?,
            nonce: parse_uint("nonce", nonce)?,
        })
    }

    /// Encodes cheque data the way `abi.encodePacked(address, address, uint256, uint256)` does.
    /// Encoded data layout:
    /// ```ignore
    /// [
    ///     0..20 bytes of from,
    ///     20..40 bytes of to,
    ///     40..72 bytes of amount,
    ///     72..104 bytes of nonce,
    /// ]
    /// ```
    ///
    /// All integers encoded in big-endian format.
    pub fn encode_packed(&self) -> [u8; Self::ENCODED_DATA_SIZE] {
        let mut buf = [0; Self::ENCODED_DATA_SIZE];

        buf[..20].copy_from_slice(self.from.as_bytes());
        buf[20..40].copy_from_slice(self.to.as_bytes());
        self.amount.to_big_endian(&mut buf[40..72]);
        self.nonce.to_big_endian(&mut buf[72..104]);

        buf
    }

    /// KECCAK hash of the packed cheque data.
    pub fn hash(&self) -> H256 {
        H256::from(keccak256(self.encode_packed()))
    }
}

/// Parses a 20 bytes address.
/// A mixed-case address must carry a valid EIP-55 checksum.
pub fn parse_address(field: &'static str, value: &str) -> Result<Address> {
    let digits = strip_hex_prefix(value).unwrap_or(value);

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(digits, &mut bytes)
        .map_err(|e| ChequeError::invalid_parameter(field, value, e))?;
    let address = Address::from(bytes);

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum(&address, None)[2..] != *digits {
        return Err(ChequeError::invalid_parameter(
            field,
            value,
            "bad EIP-55 checksum",
        ));
    }

    Ok(address)
}

/// Parses an unsigned 256 bits integer.
pub fn parse_uint(field: &'static str, value: &str) -> Result<U256> {
    let invalid = |reason: String| ChequeError::invalid_parameter(field, value, reason);

    match strip_hex_prefix(value) {
        Some("") => Err(invalid("empty hex number".into())),
        Some(digits) => U256::from_str_radix(digits, 16).map_err(|e| invalid(format!("{e:?}"))),
        None if value.is_empty() => Err(invalid("empty number".into())),
        None => U256::from_dec_str(value).map_err(|e| invalid(format!("{e:?}"))),
    }
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

#[cfg(test)]
mod test {
    use ethers_core::abi::{encode_packed, Token};
    use proptest::prelude::*;

    use super::*;

    const FROM: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const TO: &str = "0x4B20993Bc481177ec7E8f571ceCaE8A9e22C02db";

    fn golden_cheque() -> ChequeParameters {
        ChequeParameters::parse(FROM, TO, "1000000000000000000", "1").unwrap()
    }

    #[test]
    fn test_should_compute_golden_hash() {
        let hash = golden_cheque().hash();
        assert_eq!(
            hex::encode(hash.as_bytes()),
            "b6d3bbfbf6f473a998021707e33d336c658fe48a89b481e6c8c310f66374f64c"
        );
    }

    #[test]
    fn test_should_encode_like_abi_encode_packed() {
        let cheque = golden_cheque();
        // packed `Token::Uint` is minimal width, uint256 words are passed as 32 fixed bytes
        let word = |value: U256| {
            let mut buf = [0u8; 32];
            value.to_big_endian(&mut buf);
            Token::FixedBytes(buf.to_vec())
        };
        let expected = encode_packed(&[
            Token::Address(cheque.from),
            Token::Address(cheque.to),
            word(cheque.amount),
            word(cheque.nonce),
        ])
        .unwrap();

        assert_eq!(expected.len(), ChequeParameters::ENCODED_DATA_SIZE);
        assert_eq!(cheque.encode_packed().as_slice(), expected.as_slice());
    }

    #[test]
    fn test_should_encode_golden_cheque() {
        assert_eq!(
            hex::encode(golden_cheque().encode_packed()),
            concat!(
                "f39fd6e51aad88f6f4ce6ab8827279cfffb92266",
                "4b20993bc481177ec7e8f571cecae8a9e22c02db",
                "0000000000000000000000000000000000000000000000000de0b6b3a7640000",
                "0000000000000000000000000000000000000000000000000000000000000001",
            )
        );
    }

    #[test]
    fn test_should_lay_out_fields_in_order() {
        let cheque = ChequeParameters::new(
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            U256::from(3u64),
            U256::from(4u64),
        );
        let buf = cheque.encode_packed();

        assert_eq!(&buf[..20], &[1; 20]);
        assert_eq!(&buf[20..40], &[2; 20]);
        assert_eq!(&buf[40..71], &[0; 31]);
        assert_eq!(buf[71], 3);
        assert_eq!(&buf[72..103], &[0; 31]);
        assert_eq!(buf[103], 4);
    }

    #[test]
    fn test_should_parse_hex_and_decimal_integers() {
        assert_eq!(parse_uint("amount", "1000").unwrap(), U256::from(1000u64));
        assert_eq!(parse_uint("amount", "0x3e8").unwrap(), U256::from(1000u64));
        assert_eq!(parse_uint("amount", "0X3E8").unwrap(), U256::from(1000u64));
        assert_eq!(
            parse_uint(
                "nonce",
                "115792089237316195423570985008687907853269984665640564039457584007913129639935"
            )
            .unwrap(),
            U256::MAX
        );
    }

    #[test]
    fn test_should_reject_out_of_range_integers() {
        let err = parse_uint(
            "amount",
            "115792089237316195423570985008687907853269984665640564039457584007913129639936",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ChequeError::InvalidParameter {
                field: "amount",
                ..
            }
        ));

        let too_long = format!("0x1{}", "0".repeat(64));
        assert!(parse_uint("nonce", &too_long).is_err());
    }

    #[test]
    fn test_should_reject_malformed_integers() {
        for value in ["", "0x", "-1", "1.5", "one", "1e18"] {
            assert!(
                matches!(
                    parse_uint("nonce", value),
                    Err(ChequeError::InvalidParameter { field: "nonce", .. })
                ),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn test_should_parse_addresses_in_any_single_case() {
        let checksummed = parse_address("to", TO).unwrap();
        let lower = parse_address("to", &TO.to_lowercase()).unwrap();
        let upper = parse_address("to", &format!("0x{}", TO[2..].to_uppercase())).unwrap();
        let unprefixed = parse_address("to", &TO[2..]).unwrap();

        assert_eq!(checksummed, lower);
        assert_eq!(checksummed, upper);
        assert_eq!(checksummed, unprefixed);
    }

    #[test]
    fn test_should_reject_bad_checksum() {
        // last letter case flipped
        let tampered = "0x4B20993Bc481177ec7E8f571ceCaE8A9e22C02dB";
        let err = parse_address("to", tampered).unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_should_reject_malformed_addresses() {
        for value in [
            "",
            "0x",
            "0x4B20993Bc481177ec7E8f571ceCaE8A9e22C02",
            "0x4B20993Bc481177ec7E8f571ceCaE8A9e22C02db00",
            "0xZZ20993Bc481177ec7E8f571ceCaE8A9e22C02db",
        ] {
            assert!(
                matches!(
                    parse_address("from", value),
                    Err(ChequeError::InvalidParameter { field: "from", .. })
                ),
                "{value} should be rejected"
            );
        }
    }

    fn any_cheque() -> impl Strategy<Value = ChequeParameters> {
        (
            any::<[u8; 20]>(),
            any::<[u8; 20]>(),
            any::<[u64; 4]>(),
            any::<[u64; 4]>(),
        )
            .prop_map(|(from, to, amount, nonce)| {
                ChequeParameters::new(from.into(), to.into(), U256(amount), U256(nonce))
            })
    }

    proptest! {
        #[test]
        fn test_hash_is_deterministic(cheque in any_cheque()) {
            prop_assert_eq!(cheque.hash(), cheque.hash());
        }

        #[test]
        fn test_hash_changes_with_any_field(cheque in any_cheque()) {
            let hash = cheque.hash();

            let mut other = cheque;
            other.amount = cheque.amount.overflowing_add(U256::one()).0;
            prop_assert_ne!(hash, other.hash());

            let mut other = cheque;
            other.nonce = cheque.nonce.overflowing_add(U256::one()).0;
            prop_assert_ne!(hash, other.hash());

            let mut other = cheque;
            other.to.0[19] ^= 1;
            prop_assert_ne!(hash, other.hash());

            let mut other = cheque;
            other.from.0[0] ^= 0x80;
            prop_assert_ne!(hash, other.hash());
        }
    }
}
