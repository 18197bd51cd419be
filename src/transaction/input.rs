use std::fmt;

use crate::{
    error::Result,
    key::PrivKey,
    script::{Script, ScriptType},
    transaction::{
        reader::ByteReader,
        SigHash,
        Txid,
        Unspent
    },
    util::encode_varint
};

pub const DEFAULT_SEQUENCE: u32 = 0xffff_ffff;

#[derive(Debug, Clone)]
pub struct TxInput {
    pub txid: Txid,
    pub vout: u32,
    /// Value of the output being spent
    pub satoshi: u64,
    pub height: i64,
    pub confirmations: u64,
    pub private_keys: Vec<PrivKey>,
    pub script_type: ScriptType,
    pub locking_script: Script,
    /// None until signed, or when parsed from a raw transaction
    pub unlocking_script: Option<Script>,
    pub sequence: u32,
    pub sighash: SigHash
}

impl TxInput {
    pub fn new(unspent: Unspent) -> Self {
        Self {
            txid: unspent.txid,
            vout: unspent.vout,
            satoshi: unspent.satoshi,
            height: unspent.height,
            confirmations: unspent.confirmations,
            private_keys: unspent.private_keys,
            script_type: unspent.script_type,
            locking_script: unspent.locking_script,
            unlocking_script: None,
            sequence: DEFAULT_SEQUENCE,
            sighash: SigHash::ALL
        }
    }

    pub fn with_private_keys(mut self, private_keys: Vec<PrivKey>) -> Self {
        self.private_keys = private_keys;
        self
    }

    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_sighash(mut self, sighash: SigHash) -> Self {
        self.sighash = sighash;
        self
    }

    pub fn with_unlocking_script(mut self, unlocking_script: Script) -> Self {
        self.unlocking_script = Some(unlocking_script);
        self
    }

    pub fn is_signed(&self) -> bool {
        self.unlocking_script.is_some()
    }

    /// Reversed txid followed by the little endian vout
    pub fn outpoint(&self) -> [u8; 36] {
        let mut outpoint = [0u8; 36];
        outpoint[0..32].copy_from_slice(&self.txid.to_wire());
        outpoint[32..36].copy_from_slice(&self.vout.to_le_bytes());
        outpoint
    }

    /**
        Wire form. An input without an unlocking script writes an empty one.
    */
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = self.outpoint().to_vec();
        match &self.unlocking_script {
            Some(script) => {
                bytes.extend(script.byte_length_varint());
                bytes.extend_from_slice(script.as_bytes());
            },
            None => bytes.extend(encode_varint(0))
        }
        bytes.extend_from_slice(&self.sequence.to_le_bytes());
        bytes
    }

    /**
        Parses an input. The spent output is unknown, so its value is zero
        and its script type Unknown.
    */
    pub(crate) fn read(reader: &mut ByteReader) -> Result<Self> {
        let txid = Txid::from_wire(reader.read_array()?);
        let vout = reader.read_u32_le()?;
        let unlocking_script = Script::new(reader.read_var_bytes()?.to_vec());
        let sequence = reader.read_u32_le()?;

        Ok(Self {
            txid,
            vout,
            satoshi: 0,
            height: -1,
            confirmations: 0,
            private_keys: Vec::new(),
            script_type: ScriptType::Unknown,
            locking_script: Script::default(),
            unlocking_script: Some(unlocking_script),
            sequence,
            sighash: SigHash::ALL
        })
    }
}

impl From<Unspent> for TxInput {
    fn from(unspent: Unspent) -> Self {
        Self::new(unspent)
    }
}

impl fmt::Display for TxInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<TxInput outpoint={}:{} satoshi={} locking_script={}>", self.txid, self.vout, self.satoshi, self.locking_script)
    }
}
