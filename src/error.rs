/*
    Crate wide error type.

    Sub-domain errors (base58 and hd wallet) keep their own enums
    and convert into this one so `?` works across module boundaries.
*/

use thiserror::Error;

use crate::{
    encoding::base58::Base58Error,
    hdwallet::HDWError
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Base58(#[from] Base58Error),

    #[error(transparent)]
    HDWallet(#[from] HDWError),

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unknown {kind} prefix {prefix:02x?}")]
    UnknownPrefix { kind: &'static str, prefix: Vec<u8> },

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("point is not on the curve")]
    NotOnCurve,

    #[error("secp256k1: {0}")]
    Secp256k1(#[from] secp256k1::Error),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid P2PKH address: {0}")]
    InvalidAddress(String),

    #[error("invalid script arguments: {0}")]
    InvalidScript(String),

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("can't estimate byte length of input {0} without private keys")]
    MissingKeys(usize),

    #[error("index {index} out of range for {len} items")]
    OutOfRange { index: usize, len: usize },

    #[error("malformed transaction: {0}")]
    Deserialize(String),

    #[error("insufficient funds: {required} satoshi required, {available} available (short by {shortfall})")]
    InsufficientFunds { required: u64, available: i64, shortfall: u64 },

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Config(#[from] ::config::ConfigError)
}
