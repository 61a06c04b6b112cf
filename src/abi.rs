//! Canonical function-signature parsing and call-data encoding.
//!
//! Signatures are the usual `name(type,type)` form with no whitespace. The
//! argument set is deliberately small: every governance action this tool
//! composes passes only static 32-byte word types, so the per-action encoder
//! handles exactly those. The governor's own `propose` call is the one place
//! dynamic types appear, and it is encoded by a dedicated routine.

use alloy_primitives::{keccak256, Address, U256};
use std::fmt;

/// Canonical signature of the governor's multi-action proposal entry point.
pub const PROPOSE_SIGNATURE: &str = "propose(address[],bytes[],string[],string)";

const WORD_BYTES: usize = 32;

/// An argument value for a single proposal action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Uint(U256),
    Bool(bool),
}

impl AbiValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            AbiValue::Address(_) => "address",
            AbiValue::Uint(_) => "uint256",
            AbiValue::Bool(_) => "bool",
        }
    }

    fn encode_word(&self) -> [u8; WORD_BYTES] {
        match self {
            AbiValue::Address(address) => address.into_word().0,
            AbiValue::Uint(value) => value.to_be_bytes::<WORD_BYTES>(),
            AbiValue::Bool(value) => U256::from(u8::from(*value)).to_be_bytes::<WORD_BYTES>(),
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Address(address) => write!(f, "{address}"),
            AbiValue::Uint(value) => write!(f, "{value}"),
            AbiValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParamType {
    Address,
    Uint256,
    Bool,
}

impl ParamType {
    fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "address" => Ok(ParamType::Address),
            // uint is canonicalized to uint256, as ABI tooling conventionally does
            "uint256" | "uint" => Ok(ParamType::Uint256),
            "bool" => Ok(ParamType::Bool),
            other => Err(format!("unsupported parameter type {other:?}")),
        }
    }

    fn matches(&self, value: &AbiValue) -> bool {
        matches!(
            (self, value),
            (ParamType::Address, AbiValue::Address(_))
                | (ParamType::Uint256, AbiValue::Uint(_))
                | (ParamType::Bool, AbiValue::Bool(_))
        )
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::Address => "address",
            ParamType::Uint256 => "uint256",
            ParamType::Bool => "bool",
        };
        f.write_str(name)
    }
}

struct ParsedSignature {
    params: Vec<ParamType>,
}

fn parse_signature(signature: &str) -> Result<ParsedSignature, String> {
    if signature.chars().any(char::is_whitespace) {
        return Err("signature must not contain whitespace".to_string());
    }
    let open = signature
        .find('(')
        .ok_or_else(|| "signature must include a parenthesized parameter list".to_string())?;
    if !signature.ends_with(')') || open + 1 > signature.len() - 1 {
        return Err("signature parameter list must be closed".to_string());
    }
    let name = &signature[..open];
    let name_ok = !name.is_empty()
        && name
            .chars()
            .next()
            .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && name
            .chars()
            .all(|char| char.is_ascii_alphanumeric() || char == '_');
    if !name_ok {
        return Err(format!("invalid function name {name:?}"));
    }
    let params_raw = &signature[open + 1..signature.len() - 1];
    if params_raw.contains('(') {
        return Err("nested parameter lists are not supported".to_string());
    }
    let params = if params_raw.is_empty() {
        Vec::new()
    } else {
        params_raw
            .split(',')
            .map(ParamType::parse)
            .collect::<Result<Vec<_>, _>>()?
    };
    Ok(ParsedSignature { params })
}

/// First four bytes of the keccak-256 hash of the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash.as_slice()[..4]);
    out
}

/// Encode a single action call: selector plus one 32-byte word per argument.
/// Fails when the argument list does not match the signature's parameter
/// list, in arity or in type.
pub fn encode_call(signature: &str, args: &[AbiValue]) -> Result<Vec<u8>, EncodeError> {
    let parsed = parse_signature(signature).map_err(|reason| EncodeError {
        signature: signature.to_string(),
        reason,
    })?;
    if parsed.params.len() != args.len() {
        return Err(EncodeError {
            signature: signature.to_string(),
            reason: format!(
                "expected {} arguments, got {}",
                parsed.params.len(),
                args.len()
            ),
        });
    }
    let mut data = selector(signature).to_vec();
    for (index, (param, value)) in parsed.params.iter().zip(args).enumerate() {
        if !param.matches(value) {
            return Err(EncodeError {
                signature: signature.to_string(),
                reason: format!(
                    "argument {index}: expected {param}, got {}",
                    value.type_name()
                ),
            });
        }
        data.extend_from_slice(&value.encode_word());
    }
    Ok(data)
}

/// Signature/argument mismatch detail, wrapped into the crate error type by
/// the encoder.
#[derive(Clone, Debug)]
pub struct EncodeError {
    pub signature: String,
    pub reason: String,
}

/// Encode the governor's `propose(address[],bytes[],string[],string)` call.
///
/// All four arguments are dynamic, so the argument area is four offset words
/// followed by the tails, offsets measured from the start of the argument
/// area per standard ABI rules.
pub fn encode_propose(
    targets: &[Address],
    call_datas: &[Vec<u8>],
    signatures: &[String],
    description: &str,
) -> Vec<u8> {
    let parts = [
        encode_address_array(targets),
        encode_bytes_array(call_datas.iter().map(Vec::as_slice)),
        encode_bytes_array(signatures.iter().map(String::as_bytes)),
        encode_dyn_bytes(description.as_bytes()),
    ];

    let mut data = selector(PROPOSE_SIGNATURE).to_vec();
    let mut offset = parts.len() * WORD_BYTES;
    for part in &parts {
        data.extend_from_slice(&u256_word(offset as u64));
        offset += part.len();
    }
    for part in &parts {
        data.extend_from_slice(part);
    }
    data
}

fn u256_word(value: u64) -> [u8; WORD_BYTES] {
    U256::from(value).to_be_bytes::<WORD_BYTES>()
}

fn encode_address_array(items: &[Address]) -> Vec<u8> {
    let mut out = u256_word(items.len() as u64).to_vec();
    for address in items {
        out.extend_from_slice(&address.into_word().0);
    }
    out
}

/// Length word plus right-padded content. Also how `string` encodes, over its
/// UTF-8 bytes.
fn encode_dyn_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = u256_word(data.len() as u64).to_vec();
    out.extend_from_slice(data);
    let remainder = data.len() % WORD_BYTES;
    if remainder != 0 {
        out.extend(std::iter::repeat_n(0u8, WORD_BYTES - remainder));
    }
    out
}

fn encode_bytes_array<'a>(items: impl Iterator<Item = &'a [u8]>) -> Vec<u8> {
    let encoded: Vec<Vec<u8>> = items.map(encode_dyn_bytes).collect();
    let mut out = u256_word(encoded.len() as u64).to_vec();
    let mut offset = encoded.len() * WORD_BYTES;
    for element in &encoded {
        out.extend_from_slice(&u256_word(offset as u64));
        offset += element.len();
    }
    for element in encoded {
        out.extend(element);
    }
    out
}
