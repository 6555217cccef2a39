//! CREATE2 address derivation.
//!
//! `address = keccak256(0xff ++ factory ++ salt ++ keccak256(init_code))[12..]`
//!
//! This has to match the factory's own `findCreate2Address` byte for byte.

use core::{cmp::Ordering, ops::Range};

use alloy_primitives::{keccak256, Address, B256, U256};

use crate::{InitCode, Result, Salt, Seed};

/// Prefix byte that keeps CREATE2 preimages disjoint from RLP-encoded CREATE preimages.
pub const CREATE2_PREFIX: u8 = 0xff;

/// Length of the CREATE2 preimage: prefix, factory, salt and init code hash.
const PREIMAGE_LEN: usize = 1 + 20 + 32 + 32;

/// Computes the address the factory at `factory` deploys `init_code` to for `salt`.
pub fn derive_address(factory: Address, salt: &Salt, init_code: &InitCode) -> Address {
    derive_address_from_hash(factory, salt, init_code.hash())
}

/// Same as [`derive_address`], for a precomputed `keccak256(init_code)`.
pub fn derive_address_from_hash(factory: Address, salt: &Salt, init_code_hash: B256) -> Address {
    let mut preimage = [0u8; PREIMAGE_LEN];
    preimage[0] = CREATE2_PREFIX;
    preimage[1..21].copy_from_slice(factory.as_slice());
    preimage[21..53].copy_from_slice(salt.as_slice());
    preimage[53..].copy_from_slice(init_code_hash.as_slice());

    let hash = keccak256(preimage);
    Address::from_slice(&hash[12..])
}

/// Renders an address with EIP-55 mixed-case checksum.
pub fn checksum(address: &Address) -> String {
    address.to_checksum(None)
}

/// Orders two addresses as 160-bit big-endian numbers, comparing byte by byte from the most
/// significant end.
pub fn cmp_addresses(a: &Address, b: &Address) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Number of leading zero bytes of an address.
pub fn leading_zero_bytes(address: &Address) -> usize {
    address.iter().take_while(|b| **b == 0).count()
}

/// A salt seed together with the address it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedMatch {
    /// Integer seed
    pub seed: u64,
    /// Salt built from the seed and the deployer
    pub salt: Salt,
    /// Resulting deployment address
    pub address: Address,
}

/// Derives the address for every integer seed in `seeds` and returns the smallest one under
/// [`cmp_addresses`]. Returns `Ok(None)` for an empty range.
pub fn search_min_address(
    factory: Address,
    deployer: Address,
    init_code: &InitCode,
    seeds: Range<u64>,
) -> Result<Option<SeedMatch>> {
    let init_code_hash = init_code.hash();
    let mut best: Option<SeedMatch> = None;

    for seed in seeds {
        let candidate = derive_for_seed(factory, deployer, init_code_hash, seed)?;
        let better = best
            .as_ref()
            .is_none_or(|b| cmp_addresses(&candidate.address, &b.address) == Ordering::Less);
        if better {
            best = Some(candidate);
        }
    }

    Ok(best)
}

/// Returns the first seed in `seeds` whose address starts with at least `zero_bytes` zero bytes.
pub fn search_leading_zeros(
    factory: Address,
    deployer: Address,
    init_code: &InitCode,
    zero_bytes: usize,
    seeds: Range<u64>,
) -> Result<Option<SeedMatch>> {
    let init_code_hash = init_code.hash();

    for seed in seeds {
        let candidate = derive_for_seed(factory, deployer, init_code_hash, seed)?;
        if leading_zero_bytes(&candidate.address) >= zero_bytes {
            return Ok(Some(candidate));
        }
    }

    Ok(None)
}

fn derive_for_seed(
    factory: Address,
    deployer: Address,
    init_code_hash: B256,
    seed: u64,
) -> Result<SeedMatch> {
    let salt = crate::encode_salt(&Seed::Integer(U256::from(seed)), deployer)?;
    let address = derive_address_from_hash(factory, &salt, init_code_hash);
    Ok(SeedMatch { seed, salt, address })
}
