/*
    Module that bundles script construction:
        - Script, an opaque byte buffer compared by bytes
        - Builder and opcodes
        - The standard script types and their locking/unlocking templates
*/

pub mod builder;
pub mod script_type;

pub use builder::{
    encode_int,
    encode_pushdata,
    get_pushdata_code,
    opcodes,
    Builder as ScriptBuilder,
    Opcode
};
pub use script_type::{
    Locking,
    ScriptType,
    UnlockingParams
};

use std::fmt;

use crate::{
    error::Result,
    hash,
    util::encode_varint
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Script {
    code: Vec<u8>
}

impl Script {
    /**
        Create a new instance of self
    */
    pub fn new(code: Vec<u8>) -> Self {
        Self { code }
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        Ok(Self::new(hex::decode(hex)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.code
    }

    /**
        Raw script bytes, without a length prefix.
    */
    pub fn serialize(&self) -> Vec<u8> {
        self.code.clone()
    }

    pub fn hex(&self) -> String {
        hex::encode(&self.code)
    }

    pub fn byte_length(&self) -> usize {
        self.code.len()
    }

    /**
        Varint length prefix used where a script is embedded in a transaction.
    */
    pub fn byte_length_varint(&self) -> Vec<u8> {
        encode_varint(self.code.len() as u64)
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /**
        Hash the script with Hash160
    */
    pub fn hash(&self) -> [u8; 20] {
        hash::hash160(&self.code)
    }
}

impl From<Vec<u8>> for Script {
    fn from(code: Vec<u8>) -> Self {
        Self::new(code)
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.code
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex())
    }
}
