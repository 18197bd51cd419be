/*
    Pay-to-public-key-hash addresses.

        Base58Check( version byte | Ripemd160( Sha256( Public Key ) ) )
*/

use std::{fmt, str::FromStr};

use crate::{
    encoding::{
        base58::Base58,
        version_prefix::VersionPrefix,
        ToVersionPrefix
    },
    error::{Error, Result},
    util::Network
};

const BASE58_CHARS: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub public_key_hash: [u8; 20],
    pub network: Network
}

impl Address {
    pub fn new(public_key_hash: [u8; 20], network: Network) -> Self {
        Self { public_key_hash, network }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = Base58::new(Some(self.network.address_prefix()), &self.public_key_hash).check_encode();
        write!(f, "{}", encoded)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(address: &str) -> Result<Self> {
        // Leading char and length rule out anything that is not a P2PKH address before decoding.
        let plausible = matches!(address.chars().next(), Some('1') | Some('m') | Some('n'))
            && (25..=34).contains(&address.len())
            && address.chars().all(|c| BASE58_CHARS.contains(c));
        if !plausible { return Err(Error::InvalidAddress(address.to_string())) }

        let decoded = Base58::check_decode(address)?;
        if decoded.len() != 21 { return Err(Error::InvalidAddress(address.to_string())) }

        let network = match VersionPrefix::from_byte(decoded[0]) {
            Some(p @ VersionPrefix::Address) | Some(p @ VersionPrefix::TestnetAddress) => p.network(),
            _ => return Err(Error::UnknownPrefix { kind: "address", prefix: vec![decoded[0]] })
        };

        let mut public_key_hash = [0u8; 20];
        public_key_hash.copy_from_slice(&decoded[1..]);
        Ok(Self { public_key_hash, network })
    }
}

pub fn public_key_hash_to_address(public_key_hash: &[u8; 20], network: Network) -> String {
    Address::new(*public_key_hash, network).to_string()
}

/**
    Decodes a P2PKH address into its public key hash and network.
*/
pub fn decode_address(address: &str) -> Result<([u8; 20], Network)> {
    let decoded: Address = address.parse()?;
    Ok((decoded.public_key_hash, decoded.network))
}

pub fn address_to_public_key_hash(address: &str) -> Result<[u8; 20]> {
    Ok(decode_address(address)?.0)
}

/**
    True if the address decodes, and belongs to the network when one is given.
*/
pub fn validate_address(address: &str, network: Option<Network>) -> bool {
    match decode_address(address) {
        Ok((_, decoded)) => network.map_or(true, |n| n == decoded),
        Err(_) => false
    }
}
