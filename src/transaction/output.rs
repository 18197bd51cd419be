use std::fmt;

use crate::{
    error::Result,
    script::{Locking, Script, ScriptType},
    transaction::reader::ByteReader
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    pub satoshi: u64,
    pub locking_script: Script,
    pub script_type: ScriptType
}

impl TxOutput {
    pub fn new(locking_script: Script, satoshi: u64, script_type: ScriptType) -> Self {
        Self { satoshi, locking_script, script_type }
    }

    /// P2PKH payment to an address
    pub fn to_address(address: &str, satoshi: u64) -> Result<Self> {
        Self::from_locking(&Locking::p2pkh_address(address)?, satoshi)
    }

    /// Zero value OP_RETURN carrying the given pushes
    pub fn op_return<I, T>(pushdatas: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>
    {
        Self::from_locking(&Locking::op_return(pushdatas), 0)
    }

    pub fn from_locking(locking: &Locking, satoshi: u64) -> Result<Self> {
        Ok(Self::new(locking.script()?, satoshi, locking.script_type()))
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = self.satoshi.to_le_bytes().to_vec();
        bytes.extend(self.locking_script.byte_length_varint());
        bytes.extend_from_slice(self.locking_script.as_bytes());
        bytes
    }

    pub(crate) fn read(reader: &mut ByteReader) -> Result<Self> {
        let satoshi = reader.read_u64_le()?;
        let locking_script = Script::new(reader.read_var_bytes()?.to_vec());
        let script_type = ScriptType::classify(&locking_script);
        Ok(Self::new(locking_script, satoshi, script_type))
    }
}

impl fmt::Display for TxOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<TxOutput satoshi={} locking_script={}>", self.satoshi, self.locking_script)
    }
}
