//! Contract creation payloads: compiled bytecode followed by ABI-encoded constructor arguments.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{keccak256, Bytes, B256};
use serde::{Deserialize, Serialize};

use crate::{DeployError, Result};

/// The exact payload the factory hashes and executes.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Deref,
    derive_more::From,
    derive_more::Into,
)]
#[serde(transparent)]
pub struct InitCode(Bytes);

impl InitCode {
    /// `keccak256` of the init code, the last input of the CREATE2 formula.
    pub fn hash(&self) -> B256 {
        keccak256(&self.0)
    }

    /// The raw bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.0
    }
}

/// Appends the ABI encoding of `args` (typed by `types`) to `bytecode`.
///
/// Arguments are encoded as a parameter tuple, the same way `abi.encode(args...)` does in
/// Solidity: static values inline, dynamic values as an offset into a trailing data section.
pub fn assemble(bytecode: &[u8], types: &[DynSolType], args: &[DynSolValue]) -> Result<InitCode> {
    if types.len() != args.len() {
        return Err(DeployError::ArityMismatch { expected: types.len(), got: args.len() });
    }

    for (index, (ty, arg)) in types.iter().zip(args).enumerate() {
        check_value(index, ty, arg)?;
    }

    let encoded = DynSolValue::Tuple(args.to_vec()).abi_encode_params();
    let mut code = Vec::with_capacity(bytecode.len() + encoded.len());
    code.extend_from_slice(bytecode);
    code.extend_from_slice(&encoded);
    Ok(InitCode(code.into()))
}

/// Like [`assemble`], but with type tags (`"uint256"`, `"address"`, `"bytes"`, ...) and
/// arguments given as strings.
pub fn assemble_from_strs<T, A>(bytecode: &[u8], types: &[T], args: &[A]) -> Result<InitCode>
where
    T: AsRef<str>,
    A: AsRef<str>,
{
    if types.len() != args.len() {
        return Err(DeployError::ArityMismatch { expected: types.len(), got: args.len() });
    }

    let mut parsed_types = Vec::with_capacity(types.len());
    let mut values = Vec::with_capacity(args.len());
    for (index, (ty, arg)) in types.iter().zip(args).enumerate() {
        let ty = DynSolType::parse(ty.as_ref()).map_err(|e| {
            DeployError::Encoding(format!("argument {index}: unknown type '{}': {e}", ty.as_ref()))
        })?;
        let value = ty.coerce_str(arg.as_ref()).map_err(|e| {
            DeployError::Encoding(format!(
                "argument {index}: '{}' is not a valid {}: {e}",
                arg.as_ref(),
                ty.sol_type_name()
            ))
        })?;
        parsed_types.push(ty);
        values.push(value);
    }

    assemble(bytecode, &parsed_types, &values)
}

fn check_value(index: usize, ty: &DynSolType, value: &DynSolValue) -> Result<()> {
    if !ty.matches(value) {
        return Err(DeployError::Encoding(format!(
            "argument {index}: value does not match declared type {}",
            ty.sol_type_name()
        )));
    }
    check_width(index, ty, value)
}

/// `matches` only compares shapes, so integers are checked against their declared width here,
/// including those nested in arrays and tuples.
fn check_width(index: usize, ty: &DynSolType, value: &DynSolValue) -> Result<()> {
    match (ty, value) {
        (DynSolType::Uint(bits), DynSolValue::Uint(v, _)) if v.bit_len() > *bits => Err(
            DeployError::Encoding(format!("argument {index}: {v} overflows uint{bits}")),
        ),
        (DynSolType::Int(bits), DynSolValue::Int(v, _)) => {
            // Two's complement: a negative `v` fits iff `!v` (= -v - 1) fits the positive range.
            let raw = v.into_raw();
            let magnitude = if v.is_negative() { !raw } else { raw };
            if magnitude.bit_len() >= *bits {
                return Err(DeployError::Encoding(format!(
                    "argument {index}: {v} overflows int{bits}"
                )));
            }
            Ok(())
        }
        (DynSolType::Array(inner), DynSolValue::Array(values))
        | (DynSolType::FixedArray(inner, _), DynSolValue::FixedArray(values)) => {
            values.iter().try_for_each(|value| check_width(index, inner, value))
        }
        (DynSolType::Tuple(types), DynSolValue::Tuple(values)) => {
            types.iter().zip(values).try_for_each(|(ty, value)| check_width(index, ty, value))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes, hex, I256, U256};

    const BYTECODE: Bytes = bytes!("6080604052");

    #[test]
    fn test_no_arguments_is_bytecode() {
        let empty: [&str; 0] = [];
        let code = assemble_from_strs(&BYTECODE, &empty, &empty).unwrap();
        assert_eq!(code.bytes(), &BYTECODE);
    }

    #[test]
    fn test_uint256_argument() {
        let code = assemble_from_strs(&BYTECODE, &["uint256"], &["2100000000"]).unwrap();
        let mut expected = BYTECODE.to_vec();
        expected.extend_from_slice(&U256::from(2_100_000_000u64).to_be_bytes::<32>());
        assert_eq!(&code[..], expected.as_slice());
    }

    #[test]
    fn test_address_argument_is_left_padded() {
        let owner = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        let code = assemble(&BYTECODE, &[DynSolType::Address], &[DynSolValue::Address(owner)])
            .unwrap();
        assert_eq!(code.len(), BYTECODE.len() + 32);
        assert_eq!(&code[BYTECODE.len()..BYTECODE.len() + 12], &[0u8; 12]);
        assert_eq!(&code[BYTECODE.len() + 12..], owner.as_slice());
    }

    #[test]
    fn test_dynamic_bytes_use_offsets() {
        let code = assemble_from_strs(&[], &["uint8", "bytes", "bool"], &["7", "0xdeadbeef", "true"])
            .unwrap();
        let expected = hex!(
            "0000000000000000000000000000000000000000000000000000000000000007"
            "0000000000000000000000000000000000000000000000000000000000000060"
            "0000000000000000000000000000000000000000000000000000000000000001"
            "0000000000000000000000000000000000000000000000000000000000000004"
            "deadbeef00000000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(&code[..], expected.as_slice());
    }

    #[test]
    fn test_arity_mismatch() {
        let err = assemble_from_strs(&BYTECODE, &["uint256", "address"], &["1"]).unwrap_err();
        assert!(matches!(err, DeployError::ArityMismatch { expected: 2, got: 1 }));

        let err = assemble(&BYTECODE, &[], &[DynSolValue::Bool(true)]).unwrap_err();
        assert!(matches!(err, DeployError::ArityMismatch { expected: 0, got: 1 }));
    }

    #[test]
    fn test_value_of_wrong_type() {
        let err = assemble_from_strs(&BYTECODE, &["address"], &["hello"]).unwrap_err();
        assert!(matches!(err, DeployError::Encoding(_)));

        let err =
            assemble(&BYTECODE, &[DynSolType::Address], &[DynSolValue::Bool(true)]).unwrap_err();
        assert!(matches!(err, DeployError::Encoding(_)));
    }

    #[test]
    fn test_unknown_type_tag() {
        let err = assemble_from_strs(&BYTECODE, &["uint257"], &["1"]).unwrap_err();
        assert!(matches!(err, DeployError::Encoding(_)));
    }

    #[test]
    fn test_uint_overflow() {
        let err = assemble(
            &BYTECODE,
            &[DynSolType::Uint(8)],
            &[DynSolValue::Uint(U256::from(300), 8)],
        )
        .unwrap_err();
        assert!(matches!(err, DeployError::Encoding(_)));
    }

    fn int8(value: i64) -> DynSolValue {
        DynSolValue::Int(I256::try_from(value).unwrap(), 8)
    }

    #[test]
    fn test_int_width() {
        for value in [-128, -1, 0, 127] {
            assemble(&BYTECODE, &[DynSolType::Int(8)], &[int8(value)]).unwrap();
        }
        for value in [-129, 128, 1000] {
            let err = assemble(&BYTECODE, &[DynSolType::Int(8)], &[int8(value)]).unwrap_err();
            assert!(matches!(err, DeployError::Encoding(_)), "{value}: {err}");
        }

        let min = DynSolValue::Int(I256::MIN, 256);
        assemble(&BYTECODE, &[DynSolType::Int(256)], &[min]).unwrap();
    }

    #[test]
    fn test_nested_integer_overflow() {
        let uint8s = DynSolType::Array(Box::new(DynSolType::Uint(8)));
        let values = |v: u64| DynSolValue::Array(vec![DynSolValue::Uint(U256::from(v), 8)]);
        assemble(&BYTECODE, std::slice::from_ref(&uint8s), &[values(255)]).unwrap();
        let err = assemble(&BYTECODE, &[uint8s], &[values(300)]).unwrap_err();
        assert!(matches!(err, DeployError::Encoding(_)), "{err}");

        let fixed = DynSolType::FixedArray(Box::new(DynSolType::Int(8)), 2);
        let err = assemble(
            &BYTECODE,
            &[fixed],
            &[DynSolValue::FixedArray(vec![int8(1), int8(200)])],
        )
        .unwrap_err();
        assert!(matches!(err, DeployError::Encoding(_)), "{err}");

        let tuple = DynSolType::Tuple(vec![DynSolType::Address, DynSolType::Uint(16)]);
        let err = assemble(
            &BYTECODE,
            &[tuple],
            &[DynSolValue::Tuple(vec![
                DynSolValue::Address(Default::default()),
                DynSolValue::Uint(U256::from(70_000), 16),
            ])],
        )
        .unwrap_err();
        assert!(matches!(err, DeployError::Encoding(_)), "{err}");
    }

    #[test]
    fn test_hash_is_keccak_of_bytes() {
        let code = InitCode::from(BYTECODE);
        assert_eq!(code.hash(), keccak256(BYTECODE));
    }
}
