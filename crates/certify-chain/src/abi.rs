//! # Contract ABI
//!
//! Just enough of the Solidity ABI to talk to the certificate registry:
//! addresses with EIP-55 checksums, Keccak-256 function selectors, and
//! head/tail encoding of `address`, `uint`, `bool`, `string` and `bytes32`.
//!
//! ## Encoding
//!
//! Each argument occupies one 32-byte head word. Static values are stored
//! in the head directly. A `string` stores the byte offset of its tail in
//! the head; the tail holds the length followed by the UTF-8 bytes padded
//! to a word boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use sha3::{Digest, Keccak256};

use crate::error::AbiError;

const WORD: usize = 32;

/// Keccak-256 hash.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// First four bytes of `keccak256(signature)`.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account or contract address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Wrap raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse `0x` followed by 40 hex characters.
    ///
    /// All-lowercase and all-uppercase input is accepted as is. Mixed-case
    /// input must carry a valid EIP-55 checksum.
    pub fn parse(input: &str) -> Result<Self, AbiError> {
        let digits = input
            .strip_prefix("0x")
            .ok_or_else(|| AbiError::InvalidAddress(input.to_string()))?;
        let mut bytes = [0u8; 20];
        if digits.len() != 40 || hex::decode_to_slice(digits, &mut bytes).is_err() {
            return Err(AbiError::InvalidAddress(input.to_string()));
        }
        let address = Self(bytes);

        let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper && address.to_checksum() != input {
            return Err(AbiError::BadChecksum(input.to_string()));
        }
        Ok(address)
    }

    /// EIP-55 mixed-case rendering.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl FromStr for Address {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Types and tokens
// ---------------------------------------------------------------------------

/// Solidity parameter types understood by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// `address`
    Address,
    /// `uintN`, with N in bits.
    Uint(usize),
    /// `bool`
    Bool,
    /// `string`
    String,
    /// `bytesN` for 1 <= N <= 32.
    FixedBytes(usize),
}

impl ParamType {
    /// Parse a canonical Solidity type name.
    pub fn parse(name: &str) -> Result<Self, AbiError> {
        let unsupported = || AbiError::UnsupportedType(name.to_string());
        match name {
            "address" => Ok(Self::Address),
            "bool" => Ok(Self::Bool),
            "string" => Ok(Self::String),
            "uint" => Ok(Self::Uint(256)),
            _ => {
                if let Some(bits) = name.strip_prefix("uint") {
                    let bits: usize = bits.parse().map_err(|_| unsupported())?;
                    if bits == 0 || bits > 256 || bits % 8 != 0 {
                        return Err(unsupported());
                    }
                    Ok(Self::Uint(bits))
                } else if let Some(len) = name.strip_prefix("bytes") {
                    let len: usize = len.parse().map_err(|_| unsupported())?;
                    if len == 0 || len > WORD {
                        return Err(unsupported());
                    }
                    Ok(Self::FixedBytes(len))
                } else {
                    Err(unsupported())
                }
            }
        }
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, Self::String)
    }
}

/// A decoded or to-be-encoded ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `address`
    Address(Address),
    /// Any `uintN` that fits in 128 bits.
    Uint(u128),
    /// `bool`
    Bool(bool),
    /// `string`
    String(String),
    /// `bytesN`, right-padded to a word when encoded.
    FixedBytes(Vec<u8>),
}

impl Token {
    /// The address, if this is an address token.
    pub fn into_address(self) -> Option<Address> {
        match self {
            Self::Address(a) => Some(a),
            _ => None,
        }
    }

    /// The integer, if this is a uint token.
    pub fn into_uint(self) -> Option<u128> {
        match self {
            Self::Uint(n) => Some(n),
            _ => None,
        }
    }

    /// The flag, if this is a bool token.
    pub fn into_bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// The string, if this is a string token.
    pub fn into_string(self) -> Option<String> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, Self::String(_))
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn uint_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn encode_static(token: &Token) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    match token {
        Token::Address(a) => word[12..].copy_from_slice(a.as_bytes()),
        Token::Uint(n) => word = uint_word(*n),
        Token::Bool(b) => word[31] = u8::from(*b),
        Token::FixedBytes(bytes) => {
            let len = bytes.len().min(WORD);
            word[..len].copy_from_slice(&bytes[..len]);
        }
        // Dynamic tokens never reach here; their head word is an offset.
        Token::String(_) => {}
    }
    word
}

/// Head/tail encode a sequence of values.
///
/// This is also the layout of a function's return data.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let mut head = Vec::with_capacity(tokens.len() * WORD);
    let mut tail = Vec::new();
    let head_len = tokens.len() * WORD;

    for token in tokens {
        if let Token::String(s) = token {
            head.extend_from_slice(&uint_word((head_len + tail.len()) as u128));
            tail.extend_from_slice(&uint_word(s.len() as u128));
            tail.extend_from_slice(s.as_bytes());
            let pad = (WORD - s.len() % WORD) % WORD;
            tail.resize(tail.len() + pad, 0);
        } else {
            debug_assert!(!token.is_dynamic());
            head.extend_from_slice(&encode_static(token));
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// ABI-encode a call: selector followed by the encoded arguments.
pub fn encode_call(selector: [u8; 4], tokens: &[Token]) -> Vec<u8> {
    let args = encode(tokens);
    let mut out = Vec::with_capacity(4 + args.len());
    out.extend_from_slice(&selector);
    out.extend_from_slice(&args);
    out
}

/// `0x`-prefixed hex rendering of call data, as sent in `data`.
pub fn to_hex_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode `0x`-prefixed hex return data.
pub fn from_hex_data(data: &str) -> Result<Vec<u8>, AbiError> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    hex::decode(digits).map_err(|e| AbiError::InvalidHex(e.to_string()))
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn read_word(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    data.get(offset..offset.saturating_add(WORD))
        .filter(|w| w.len() == WORD)
        .ok_or(AbiError::Truncated {
            offset,
            needed: WORD,
            len: data.len(),
        })
}

fn word_to_u128(word: &[u8]) -> Result<u128, AbiError> {
    if word[..16].iter().any(|&b| b != 0) {
        return Err(AbiError::Overflow);
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(low))
}

fn word_to_usize(word: &[u8]) -> Result<usize, AbiError> {
    usize::try_from(word_to_u128(word)?).map_err(|_| AbiError::Overflow)
}

fn decode_string(data: &[u8], offset: usize) -> Result<String, AbiError> {
    let len = word_to_usize(read_word(data, offset)?)?;
    let start = offset + WORD;
    let bytes = data
        .get(start..start.saturating_add(len))
        .filter(|b| b.len() == len)
        .ok_or(AbiError::Truncated {
            offset: start,
            needed: len,
            len: data.len(),
        })?;
    String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::InvalidUtf8)
}

/// Decode return data into tokens of the given types.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    let mut tokens = Vec::with_capacity(types.len());
    for (i, ty) in types.iter().enumerate() {
        let word = read_word(data, i * WORD)?;
        let token = match ty {
            ParamType::Address => {
                let mut bytes = [0u8; 20];
                bytes.copy_from_slice(&word[12..]);
                Token::Address(Address(bytes))
            }
            ParamType::Uint(_) => Token::Uint(word_to_u128(word)?),
            ParamType::Bool => match word_to_u128(word) {
                Ok(0) => Token::Bool(false),
                Ok(1) => Token::Bool(true),
                _ => return Err(AbiError::InvalidBool),
            },
            ParamType::FixedBytes(len) => Token::FixedBytes(word[..*len].to_vec()),
            ParamType::String => {
                debug_assert!(ty.is_dynamic());
                Token::String(decode_string(data, word_to_usize(word)?)?)
            }
        };
        tokens.push(token);
    }
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// ABI JSON and the registry interface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct AbiParam {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AbiEntry {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
}

/// A function entry from a contract ABI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiFunction {
    /// Function name.
    pub name: String,
    /// Input type names, as written in the ABI.
    pub inputs: Vec<String>,
    /// Output type names, as written in the ABI.
    pub outputs: Vec<String>,
}

impl AbiFunction {
    /// Parse every `type == "function"` entry of an ABI.
    pub fn parse_all(abi: &[Value]) -> Result<Vec<Self>, AbiError> {
        let mut functions = Vec::new();
        for entry in abi {
            let entry: AbiEntry = serde_json::from_value(entry.clone())
                .map_err(|e| AbiError::Malformed(e.to_string()))?;
            if entry.kind == "function" {
                functions.push(Self {
                    name: entry.name,
                    inputs: entry.inputs.into_iter().map(|p| p.kind).collect(),
                    outputs: entry.outputs.into_iter().map(|p| p.kind).collect(),
                });
            }
        }
        Ok(functions)
    }

    /// Canonical signature, e.g. `issueCertificate(string,string)`.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.inputs.join(","))
    }

    /// Selector of [`AbiFunction::signature`].
    pub fn selector(&self) -> [u8; 4] {
        function_selector(&self.signature())
    }
}

/// A registry function resolved against the deployed ABI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundFunction {
    /// Canonical signature.
    pub signature: String,
    /// 4-byte selector.
    pub selector: [u8; 4],
    /// Declared output types.
    pub outputs: Vec<ParamType>,
}

impl BoundFunction {
    fn from_abi(function: &AbiFunction) -> Result<Self, AbiError> {
        let outputs = function
            .outputs
            .iter()
            .map(|t| ParamType::parse(t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            signature: function.signature(),
            selector: function.selector(),
            outputs,
        })
    }

    /// Encode a call to this function.
    pub fn encode(&self, args: &[Token]) -> Vec<u8> {
        encode_call(self.selector, args)
    }

    /// Decode this function's return data.
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>, AbiError> {
        decode(&self.outputs, data)
    }
}

/// Registry function signatures.
pub mod signatures {
    /// Register a certificate hash with metadata.
    pub const ISSUE_CERTIFICATE: &str = "issueCertificate(string,string)";
    /// Read the registry entry for a hash.
    pub const VERIFY_CERTIFICATE: &str = "verifyCertificate(string)";
    /// Mark a certificate revoked.
    pub const REVOKE_CERTIFICATE: &str = "revokeCertificate(string)";
    /// Whether a hash was ever issued.
    pub const CERTIFICATE_EXISTS: &str = "certificateExists(string)";
    /// Contract owner.
    pub const OWNER: &str = "owner()";
    /// Whether an address may issue.
    pub const AUTHORIZED_ISSUERS: &str = "authorizedIssuers(address)";
    /// Grant issuing rights (owner only).
    pub const AUTHORIZE_ISSUER: &str = "authorizeIssuer(address)";
}

/// The registry contract's functions, resolved from its ABI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInterface {
    /// `issueCertificate(string,string)`
    pub issue_certificate: BoundFunction,
    /// `verifyCertificate(string)`
    pub verify_certificate: BoundFunction,
    /// `revokeCertificate(string)`
    pub revoke_certificate: BoundFunction,
    /// `certificateExists(string)`
    pub certificate_exists: BoundFunction,
    /// `owner()`
    pub owner: BoundFunction,
    /// `authorizedIssuers(address)`, when the contract has one.
    pub authorized_issuers: Option<BoundFunction>,
    /// `authorizeIssuer(address)`, when the contract has one.
    pub authorize_issuer: Option<BoundFunction>,
}

impl ContractInterface {
    /// Resolve the registry functions from an ABI.
    pub fn from_abi(abi: &[Value]) -> Result<Self, AbiError> {
        let functions = AbiFunction::parse_all(abi)?;
        let find = |signature: &str| -> Result<Option<BoundFunction>, AbiError> {
            functions
                .iter()
                .find(|f| f.signature() == signature)
                .map(BoundFunction::from_abi)
                .transpose()
        };
        let require = |signature: &str| -> Result<BoundFunction, AbiError> {
            find(signature)?.ok_or_else(|| AbiError::MissingFunction(signature.to_string()))
        };

        Ok(Self {
            issue_certificate: require(signatures::ISSUE_CERTIFICATE)?,
            verify_certificate: require(signatures::VERIFY_CERTIFICATE)?,
            revoke_certificate: require(signatures::REVOKE_CERTIFICATE)?,
            certificate_exists: require(signatures::CERTIFICATE_EXISTS)?,
            owner: require(signatures::OWNER)?,
            authorized_issuers: find(signatures::AUTHORIZED_ISSUERS)?,
            authorize_issuer: find(signatures::AUTHORIZE_ISSUER)?,
        })
    }
}
