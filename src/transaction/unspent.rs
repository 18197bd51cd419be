use std::{
    fmt,
    hash::{Hash, Hasher}
};

use crate::{
    error::{Error, Result},
    key::PrivKey,
    provider::{Provider, UnspentCriteria, UnspentRecord},
    script::{Locking, Script, ScriptType},
    transaction::Txid
};

/**
    A spendable output together with what is needed to spend it.

    For P2PKH either an address or one private key is enough, the locking
    script is derived from it. Other script types need both the script type
    and the locking script.
*/
#[derive(Debug, Clone)]
pub struct Unspent {
    pub txid: Txid,
    pub vout: u32,
    pub satoshi: u64,
    /// -1 while unconfirmed
    pub height: i64,
    pub confirmations: u64,
    pub private_keys: Vec<PrivKey>,
    pub address: Option<String>,
    pub script_type: ScriptType,
    pub locking_script: Script
}

impl Unspent {
    /**
        Any locking script is accepted, an empty one included.
    */
    pub fn new(txid: Txid, vout: u32, satoshi: u64, script_type: ScriptType, locking_script: Script) -> Self {
        Self {
            txid,
            vout,
            satoshi,
            height: -1,
            confirmations: 0,
            private_keys: Vec::new(),
            address: None,
            script_type,
            locking_script
        }
    }

    /// P2PKH output paying to `address`
    pub fn from_address(txid: Txid, vout: u32, satoshi: u64, address: &str) -> Result<Self> {
        let locking_script = Locking::p2pkh_address(address)?.script()?;
        let mut unspent = Self::new(txid, vout, satoshi, ScriptType::P2pkh, locking_script);
        unspent.address = Some(address.to_string());
        Ok(unspent)
    }

    /// P2PKH output paying to the first key, spendable with the given keys
    pub fn from_keys(txid: Txid, vout: u32, satoshi: u64, private_keys: Vec<PrivKey>) -> Result<Self> {
        let address = private_keys.first()
            .map(|key| key.address())
            .ok_or_else(|| Error::InvalidPrivateKey("no private keys given".to_string()))?;
        Ok(Self::from_address(txid, vout, satoshi, &address)?.with_private_keys(private_keys))
    }

    /**
        Binds a provider record to the criteria it was looked up with.
    */
    pub fn from_record(record: &UnspentRecord, criteria: &UnspentCriteria, address: &str) -> Result<Self> {
        let mut unspent = Self::from_address(record.txid, record.vout, record.satoshi, address)?
            .with_private_keys(criteria.private_keys.clone());
        unspent.height = record.height;
        Ok(unspent)
    }

    pub fn with_private_keys(mut self, private_keys: Vec<PrivKey>) -> Self {
        self.private_keys = private_keys;
        self
    }

    pub fn outpoint(&self) -> String {
        format!("{}:{}", self.txid, self.vout)
    }

    /**
        Fetches the unspent outputs matching `criteria`, bound to its keys.
    */
    pub fn get_unspents<P: Provider + ?Sized>(provider: &P, criteria: &UnspentCriteria) -> Result<Vec<Self>> {
        let address = criteria.resolve_address(provider.network())
            .ok_or_else(|| Error::Provider("either an address or a private key is required".to_string()))?;
        provider.get_unspents(criteria)?
            .iter()
            .map(|record| Self::from_record(record, criteria, &address))
            .collect()
    }
}

// Identity is the outpoint
impl PartialEq for Unspent {
    fn eq(&self, other: &Self) -> bool {
        self.txid == other.txid && self.vout == other.vout
    }
}

impl Eq for Unspent {}

impl Hash for Unspent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.txid.hash(state);
        self.vout.hash(state);
    }
}

impl fmt::Display for Unspent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Unspent outpoint={} satoshi={} script={}>", self.outpoint(), self.satoshi, self.locking_script)
    }
}
