/*
    Boundary to a chain data service.

    The core never talks to the network itself. Anything that can list
    unspent outputs and relay raw transactions implements `Provider`.
*/

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    key::PrivKey,
    transaction::Txid,
    util::Network
};

fn unconfirmed_height() -> i64 {
    -1
}

/**
    An unspent output as reported by a provider.
*/
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnspentRecord {
    pub txid: Txid,
    pub vout: u32,
    pub satoshi: u64,
    #[serde(default = "unconfirmed_height")]
    pub height: i64
}

/// `(true, txid)` when relayed, `(false, error message)` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    pub propagated: bool,
    pub data: String
}

/**
    What to look up. The address is taken from the first private key when
    it is not given.
*/
#[derive(Debug, Clone, Default)]
pub struct UnspentCriteria {
    pub address: Option<String>,
    pub private_keys: Vec<PrivKey>
}

impl UnspentCriteria {
    pub fn from_address(address: &str) -> Self {
        Self { address: Some(address.to_string()), private_keys: Vec::new() }
    }

    pub fn from_keys(private_keys: Vec<PrivKey>) -> Self {
        Self { address: None, private_keys }
    }

    pub fn resolve_address(&self, network: Network) -> Option<String> {
        self.address.clone().or_else(|| {
            self.private_keys.first().map(|key| key.public_key().address(network))
        })
    }
}

pub trait Provider {
    fn network(&self) -> Network;

    fn get_unspents(&self, criteria: &UnspentCriteria) -> Result<Vec<UnspentRecord>>;

    fn get_balance(&self, criteria: &UnspentCriteria) -> Result<u64>;

    fn broadcast(&self, raw: &str) -> Result<BroadcastResult>;
}
