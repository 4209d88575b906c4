//! Chain client error types.

use std::path::PathBuf;

use certify_core::CertifyError;

/// Errors from JSON-RPC calls and registry operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The node could not be reached or the request timed out.
    #[error("RPC transport error calling {method}: {source}")]
    Transport {
        /// JSON-RPC method.
        method: String,
        /// Underlying HTTP error.
        source: reqwest::Error,
    },

    /// The node answered with a non-2xx HTTP status.
    #[error("RPC endpoint returned HTTP {status} for {method}")]
    HttpStatus {
        /// JSON-RPC method.
        method: String,
        /// HTTP status code.
        status: u16,
    },

    /// The node answered with a JSON-RPC error object (reverts land here).
    #[error("{message}")]
    Rpc {
        /// JSON-RPC method.
        method: String,
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the node, e.g. a revert reason.
        message: String,
    },

    /// The response is not a well-formed JSON-RPC result.
    #[error("malformed response to {method}: {detail}")]
    MalformedResponse {
        /// JSON-RPC method.
        method: String,
        /// What was wrong.
        detail: String,
    },

    /// `eth_accounts` returned an empty list.
    #[error("node has no unlocked accounts to sign with")]
    NoAccounts,

    /// The configured signer index is past the end of `eth_accounts`.
    #[error("signer index {index} out of range: node has {available} account(s)")]
    SignerIndexOutOfRange {
        /// Configured index.
        index: usize,
        /// Number of accounts the node returned.
        available: usize,
    },

    /// A mined transaction reported failure.
    #[error("transaction {tx_hash} reverted in block {block_number}")]
    TransactionReverted {
        /// Transaction hash.
        tx_hash: String,
        /// Block the transaction was mined in.
        block_number: u64,
    },

    /// No receipt appeared within the configured wait.
    #[error("no receipt for transaction {tx_hash} after {waited_secs}s")]
    ReceiptTimeout {
        /// Transaction hash.
        tx_hash: String,
        /// Seconds waited.
        waited_secs: u64,
    },

    /// The registry does not expose an optional function.
    #[error("contract does not expose {0}")]
    Unsupported(&'static str),

    /// ABI encoding or decoding failed.
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// Contract artifact could not be loaded.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Registry data could not be mapped into a certificate result.
    #[error(transparent)]
    Certificate(#[from] CertifyError),

    /// HTTP client construction failed.
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

/// ABI encoding and decoding errors.
#[derive(Debug, thiserror::Error)]
pub enum AbiError {
    /// An address string is not `0x` followed by 40 hex characters.
    #[error("invalid address \"{0}\": expected 0x followed by 40 hex characters")]
    InvalidAddress(String),

    /// A mixed-case address fails its EIP-55 checksum.
    #[error("address \"{0}\" has an invalid EIP-55 checksum")]
    BadChecksum(String),

    /// A required registry function is missing from the ABI.
    #[error("contract ABI is missing function {0}")]
    MissingFunction(String),

    /// A Solidity type this client does not handle.
    #[error("unsupported ABI type \"{0}\"")]
    UnsupportedType(String),

    /// The ABI JSON itself is malformed.
    #[error("malformed ABI: {0}")]
    Malformed(String),

    /// Return data ended before all values were read.
    #[error("return data truncated: needed {needed} bytes at offset {offset}, have {len}")]
    Truncated {
        /// Offset where the read started.
        offset: usize,
        /// Bytes required.
        needed: usize,
        /// Total data length.
        len: usize,
    },

    /// A uint does not fit in 128 bits.
    #[error("uint value exceeds 128 bits")]
    Overflow,

    /// A bool word is neither 0 nor 1.
    #[error("invalid bool encoding")]
    InvalidBool,

    /// A string value is not valid UTF-8.
    #[error("string value is not valid UTF-8")]
    InvalidUtf8,

    /// Hex data could not be decoded.
    #[error("invalid hex data: {0}")]
    InvalidHex(String),

    /// Decoded values do not match the expected shape.
    #[error("unexpected return values from {function}: expected {expected}")]
    UnexpectedOutput {
        /// Function signature.
        function: String,
        /// Description of what was expected.
        expected: &'static str,
    },
}

/// Contract artifact loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// The artifact file does not exist.
    #[error("contract info not found at {}: deploy the contract first", .0.display())]
    NotFound(PathBuf),

    /// The artifact file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The artifact is not valid JSON of the expected shape.
    #[error("invalid contract info: {0}")]
    Invalid(String),

    /// The artifact's address or ABI is malformed.
    #[error("invalid contract info: {0}")]
    Abi(#[from] AbiError),
}

impl ChainError {
    /// Whether the error is a transport failure worth retrying.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_displays_node_message() {
        let err = ChainError::Rpc {
            method: "eth_sendTransaction".into(),
            code: -32603,
            message: "Error: VM Exception while processing transaction: reverted with reason string 'Certificate already exists'".into(),
        };
        assert!(format!("{err}").contains("Certificate already exists"));
    }

    #[test]
    fn artifact_not_found_hints_at_deploy() {
        let err = ArtifactError::NotFound(PathBuf::from("./contract-info.json"));
        let msg = format!("{err}");
        assert!(msg.contains("contract-info.json"));
        assert!(msg.contains("deploy the contract first"));
    }

    #[test]
    fn signer_index_out_of_range_display() {
        let err = ChainError::SignerIndexOutOfRange {
            index: 3,
            available: 1,
        };
        assert_eq!(
            format!("{err}"),
            "signer index 3 out of range: node has 1 account(s)"
        );
    }

    #[test]
    fn abi_error_converts_into_chain_error() {
        let err: ChainError = AbiError::MissingFunction("owner()".into()).into();
        assert!(matches!(err, ChainError::Abi(_)));
        assert!(!err.is_transport());
    }
}
