//! Deployer-bound CREATE2 salts.
//!
//! The immutable factory only lets a salt be consumed by the account embedded in its first 20
//! bytes, or by anyone when those bytes are zero. Publishing a predicted address is therefore
//! safe: nobody else can front-run the deployment to it.
//!
//! ```text
//! | 0 ............. 19 | 20 ........ 31 |
//! | authorized sender  |   seed tail    |
//! ```

use core::{fmt, str::FromStr};

use alloy_primitives::{keccak256, Address, FixedBytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{DeployError, Result};

/// Width of the seed tail in bytes.
pub const SALT_TAIL_LEN: usize = 12;

/// Maximum bit length of an integer seed.
pub const MAX_SEED_BITS: usize = SALT_TAIL_LEN * 8;

/// A 32-byte CREATE2 salt whose high 20 bytes name the account allowed to consume it.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Deref,
    derive_more::From,
    derive_more::Into,
)]
#[serde(transparent)]
pub struct Salt(B256);

impl Salt {
    /// Builds a salt from its two halves.
    pub fn from_parts(deployer: Address, tail: FixedBytes<SALT_TAIL_LEN>) -> Self {
        let mut salt = B256::ZERO;
        salt[..20].copy_from_slice(deployer.as_slice());
        salt[20..].copy_from_slice(tail.as_slice());
        Self(salt)
    }

    /// The account allowed to consume this salt.
    pub fn deployer(&self) -> Address {
        Address::from_slice(&self.0[..20])
    }

    /// The low-order bytes derived from the seed.
    pub fn tail(&self) -> FixedBytes<SALT_TAIL_LEN> {
        FixedBytes::from_slice(&self.0[20..])
    }

    /// Whether any sender may consume this salt.
    pub fn is_unlocked(&self) -> bool {
        self.deployer() == Address::ZERO
    }

    /// Applies the factory's sender check: the embedded deployer must be `sender`, or the salt
    /// must be unlocked.
    pub fn check_sender(&self, sender: Address) -> Result<()> {
        let salt_deployer = self.deployer();
        if salt_deployer == sender || self.is_unlocked() {
            Ok(())
        } else {
            Err(DeployError::SaltSenderMismatch { salt_deployer, sender })
        }
    }

    /// The raw 32-byte value.
    pub const fn as_b256(&self) -> B256 {
        self.0
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Salt {
    type Err = <B256 as FromStr>::Err;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        B256::from_str(s.trim()).map(Self)
    }
}

/// A caller-chosen salt seed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Seed {
    /// An integer seed, stored big-endian in the salt tail.
    Integer(U256),
    /// A free-form label; the salt tail is the low 12 bytes of its keccak256 hash.
    Label(String),
}

impl Seed {
    /// Returns the 12-byte salt tail for this seed.
    pub fn tail(&self) -> Result<FixedBytes<SALT_TAIL_LEN>> {
        match self {
            Self::Integer(value) => {
                if value.bit_len() > MAX_SEED_BITS {
                    return Err(DeployError::InvalidSeed {
                        seed: value.to_string(),
                        reason: "integer does not fit the 12-byte salt tail",
                    });
                }
                let word = value.to_be_bytes::<32>();
                Ok(FixedBytes::from_slice(&word[32 - SALT_TAIL_LEN..]))
            }
            Self::Label(label) => {
                let hash = keccak256(label.as_bytes());
                Ok(FixedBytes::from_slice(&hash[32 - SALT_TAIL_LEN..]))
            }
        }
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

impl From<u64> for Seed {
    fn from(value: u64) -> Self {
        Self::Integer(U256::from(value))
    }
}

impl From<U256> for Seed {
    fn from(value: U256) -> Self {
        Self::Integer(value)
    }
}

impl FromStr for Seed {
    type Err = DeployError;

    /// Decimal and `0x`-prefixed hex strings are integers; any other non-empty text is a label.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = |reason| DeployError::InvalidSeed { seed: s.to_string(), reason };

        if s.is_empty() {
            return Err(invalid("seed is empty"));
        }
        if s.starts_with('-') {
            return Err(invalid("seed must be non-negative"));
        }
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid("malformed hex integer"));
            }
            return U256::from_str_radix(hex, 16)
                .map(Self::Integer)
                .map_err(|_| invalid("integer does not fit 256 bits"));
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            return U256::from_str_radix(s, 10)
                .map(Self::Integer)
                .map_err(|_| invalid("integer does not fit 256 bits"));
        }
        Ok(Self::Label(s.to_string()))
    }
}

/// The two halves of a salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedSalt {
    /// The account allowed to consume the salt (zero when unlocked)
    pub authorized_deployer: Address,
    /// The seed-derived tail
    pub seed_tail: FixedBytes<SALT_TAIL_LEN>,
}

/// Encodes a salt that only `deployer` can consume.
pub fn encode_salt(seed: &Seed, deployer: Address) -> Result<Salt> {
    Ok(Salt::from_parts(deployer, seed.tail()?))
}

/// Encodes a salt from textual inputs, as supplied on a command line or in a deploy script.
pub fn encode_salt_str(seed: &str, deployer: &str) -> Result<Salt> {
    let seed = Seed::from_str(seed)?;
    let deployer = parse_address(deployer)?;
    encode_salt(&seed, deployer)
}

/// Splits a salt into its authorized deployer and seed tail.
pub fn decode_salt(salt: &Salt) -> DecodedSalt {
    DecodedSalt { authorized_deployer: salt.deployer(), seed_tail: salt.tail() }
}

/// Parses a `0x`-prefixed 20-byte hex address in any letter case.
pub fn parse_address(s: &str) -> Result<Address> {
    let trimmed = s.trim();
    if !(trimmed.starts_with("0x") || trimmed.starts_with("0X")) {
        return Err(DeployError::InvalidAddress(s.to_string()));
    }
    Address::from_str(trimmed).map_err(|_| DeployError::InvalidAddress(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, fixed_bytes};

    const DEPLOYER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    #[test]
    fn test_integer_seed_layout() {
        let salt = encode_salt(&Seed::from(1u64), DEPLOYER).unwrap();
        assert_eq!(
            salt.as_b256(),
            b256!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266000000000000000000000001")
        );
        assert_eq!(salt.deployer(), DEPLOYER);
        assert_eq!(salt.tail(), fixed_bytes!("000000000000000000000001"));
    }

    #[test]
    fn test_decimal_and_hex_seeds_agree() {
        let decimal = encode_salt_str("255", "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap();
        let hex = encode_salt_str("0xff", "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap();
        assert_eq!(decimal, hex);
        assert_eq!(decimal, encode_salt(&Seed::from(255u64), DEPLOYER).unwrap());
    }

    #[test]
    fn test_label_seed_is_hashed() {
        let salt = encode_salt(&"hola".parse().unwrap(), DEPLOYER).unwrap();
        let hash = keccak256("hola");
        assert_eq!(salt.tail().as_slice(), &hash[20..]);
        assert_eq!(salt.deployer(), DEPLOYER);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = encode_salt_str("hola", "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap();
        let b = encode_salt_str("hola", "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap();
        assert_eq!(a, b);

        let other = encode_salt_str("hola", "0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap();
        assert_ne!(a, other);
        assert_eq!(a.tail(), other.tail());
    }

    #[test]
    fn test_largest_integer_seed_fits() {
        let max = (U256::from(1) << MAX_SEED_BITS) - U256::from(1);
        let salt = encode_salt(&Seed::Integer(max), DEPLOYER).unwrap();
        assert_eq!(salt.tail(), FixedBytes::<SALT_TAIL_LEN>::repeat_byte(0xff));
        assert_eq!(salt.deployer(), DEPLOYER);
    }

    #[test]
    fn test_oversized_integer_seed_is_rejected() {
        let too_big = Seed::Integer(U256::from(1) << MAX_SEED_BITS);
        assert!(matches!(encode_salt(&too_big, DEPLOYER), Err(DeployError::InvalidSeed { .. })));

        let decimal = "79228162514264337593543950336"; // 2^96
        assert!(matches!(
            encode_salt_str(decimal, "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            Err(DeployError::InvalidSeed { .. })
        ));
    }

    #[test]
    fn test_malformed_seeds_are_rejected() {
        for seed in ["", "   ", "-1", "0xzz", "0x"] {
            assert!(
                matches!(Seed::from_str(seed), Err(DeployError::InvalidSeed { .. })),
                "seed {seed:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_malformed_deployer_is_rejected() {
        for deployer in ["", "0x1234", "f39Fd6e51aad88F6F4ce6aB8827279cffFb92266", "0xnothex"] {
            assert!(
                matches!(encode_salt_str("1", deployer), Err(DeployError::InvalidAddress(_))),
                "deployer {deployer:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_decode_is_total() {
        let salt = Salt::from(B256::repeat_byte(0xab));
        let decoded = decode_salt(&salt);
        assert_eq!(decoded.authorized_deployer, Address::repeat_byte(0xab));
        assert_eq!(decoded.seed_tail, FixedBytes::<SALT_TAIL_LEN>::repeat_byte(0xab));
        assert_eq!(Salt::from_parts(decoded.authorized_deployer, decoded.seed_tail), salt);
    }

    #[test]
    fn test_sender_check() {
        let other = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

        let locked = encode_salt(&Seed::from(7u64), DEPLOYER).unwrap();
        assert!(locked.check_sender(DEPLOYER).is_ok());
        assert!(matches!(
            locked.check_sender(other),
            Err(DeployError::SaltSenderMismatch { salt_deployer, sender })
                if salt_deployer == DEPLOYER && sender == other
        ));

        let unlocked = encode_salt(&Seed::from(7u64), Address::ZERO).unwrap();
        assert!(unlocked.is_unlocked());
        assert!(unlocked.check_sender(DEPLOYER).is_ok());
        assert!(unlocked.check_sender(other).is_ok());
    }

    #[test]
    fn test_hex_round_trip() {
        let salt = encode_salt(&Seed::from(42u64), DEPLOYER).unwrap();
        let text = salt.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 66);
        assert_eq!(text.parse::<Salt>().unwrap(), salt);
    }
}
