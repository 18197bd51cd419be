/*
    This module implements extended keys that are
    used in BIP32 hierarchal deterministic wallets.

    An extended key is a key paired with a 32 byte chain code plus the
    metadata needed to place it in the tree. Serialized it is 78 bytes:

        version(4) | depth(1) | parent fingerprint(4) | index(4) | chain code(32) | key(33)

    Private key material is the 32 byte scalar behind a 0x00 pad,
    public key material is a compressed point.
*/

use std::{fmt, str::FromStr};

use crate::{
    encoding::{
        base58::Base58,
        version_prefix::VersionPrefix,
        ToVersionPrefix
    },
    hash,
    hdwallet::{
        ckd::{derive_xprv, derive_xpub},
        ChildOptions,
        HDWError,
        Path
    },
    key::{PrivKey, PubKey},
    util::Network
};

const PAYLOAD_LENGTH: usize = 78;
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xprv {
    key: PrivKey,
    chain_code: [u8; 32],
    pub depth: u8,
    pub parent_fingerprint: [u8; 4],
    pub index: u32
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xpub {
    key: PubKey,
    chain_code: [u8; 32],
    pub depth: u8,
    pub parent_fingerprint: [u8; 4],
    pub index: u32,
    pub network: Network
}

pub trait ExtendedKey: Sized + Clone {
    fn depth(&self) -> u8;
    fn parent_fingerprint(&self) -> [u8; 4];
    fn index(&self) -> u32;
    fn chain_code(&self) -> &[u8; 32];
    fn network(&self) -> Network;

    /**
        Return the non extended public key of self. Always compressed.
    */
    fn public_key(&self) -> PubKey;

    /**
        The 78 byte BIP32 serialization, version prefix included.
    */
    fn payload(&self) -> Vec<u8>;

    /**
        Derives the child key of self
    */
    fn ckd(&self, option: ChildOptions) -> Result<Self, HDWError>;

    /// First four bytes of hash160 of the public key. Children store this as their parent fingerprint.
    fn fingerprint(&self) -> [u8; 4] {
        let mut fingerprint = [0u8; 4];
        fingerprint.copy_from_slice(&hash::hash160(self.public_key().serialize_with(true))[0..4]);
        fingerprint
    }

    fn address(&self) -> String {
        self.public_key().address(self.network())
    }

    /**
        A master key sits at depth 0 with no parent and index 0.
    */
    fn is_master(&self) -> bool {
        self.depth() == 0 && self.parent_fingerprint() == [0u8; 4] && self.index() == 0
    }

    /**
        Derive the key at the given path.
        Absolute paths (starting with "m") are only valid from a master key.
    */
    fn derive_from_path(&self, path: &Path) -> Result<Self, HDWError> {
        if path.absolute && !self.is_master() {
            return Err(HDWError::NotMaster)
        }

        path.children.iter().try_fold(self.clone(), |key, child| key.ckd(*child))
    }
}

impl Xprv {
    pub(crate) fn new(key: PrivKey, chain_code: [u8; 32], depth: u8, parent_fingerprint: [u8; 4], index: u32) -> Self {
        Self {
            key: key.with_compressed(true),
            chain_code,
            depth,
            parent_fingerprint,
            index
        }
    }

    /**
        Master private key from a seed.
        The seed is usually the output of a mnemonic and must be 16 to 64 bytes.
    */
    pub fn from_seed(seed: &[u8], network: Network) -> Result<Self, HDWError> {
        if !(16..=64).contains(&seed.len()) {
            return Err(HDWError::BadSeedLength(seed.len()))
        }

        let digest = hash::hmac_sha512(seed, MASTER_HMAC_KEY);
        let key = PrivKey::from_slice(&digest[0..32])
            .map_err(|_| HDWError::BadKey("seed produced an invalid master key".to_string()))?
            .with_network(network);

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&digest[32..64]);

        Ok(Self::new(key, chain_code, 0, [0u8; 4], 0))
    }

    /**
        Return the private key part of self
    */
    pub fn private_key(&self) -> &PrivKey {
        &self.key
    }

    /**
        The extended public key sharing this key's chain code and position.
    */
    pub fn xpub(&self) -> Xpub {
        Xpub::new(
            self.key.public_key(),
            self.chain_code,
            self.depth,
            self.parent_fingerprint,
            self.index,
            self.key.network
        )
    }
}

impl ExtendedKey for Xprv {
    fn depth(&self) -> u8 { self.depth }
    fn parent_fingerprint(&self) -> [u8; 4] { self.parent_fingerprint }
    fn index(&self) -> u32 { self.index }
    fn chain_code(&self) -> &[u8; 32] { &self.chain_code }
    fn network(&self) -> Network { self.key.network }

    fn public_key(&self) -> PubKey {
        self.key.public_key()
    }

    fn payload(&self) -> Vec<u8> {
        let mut key_material = vec![0x00];
        key_material.extend_from_slice(&self.key.serialize());

        payload(self.key.network.xprv_prefix(), self.depth, self.parent_fingerprint, self.index, &self.chain_code, &key_material)
    }

    fn ckd(&self, option: ChildOptions) -> Result<Self, HDWError> {
        derive_xprv(self, option)
    }
}

impl Xpub {
    pub(crate) fn new(key: PubKey, chain_code: [u8; 32], depth: u8, parent_fingerprint: [u8; 4], index: u32, network: Network) -> Self {
        let mut key = key;
        key.compressed = true;

        Self {
            key,
            chain_code,
            depth,
            parent_fingerprint,
            index,
            network
        }
    }
}

impl ExtendedKey for Xpub {
    fn depth(&self) -> u8 { self.depth }
    fn parent_fingerprint(&self) -> [u8; 4] { self.parent_fingerprint }
    fn index(&self) -> u32 { self.index }
    fn chain_code(&self) -> &[u8; 32] { &self.chain_code }
    fn network(&self) -> Network { self.network }

    fn public_key(&self) -> PubKey {
        self.key.clone()
    }

    fn payload(&self) -> Vec<u8> {
        payload(self.network.xpub_prefix(), self.depth, self.parent_fingerprint, self.index, &self.chain_code, &self.key.serialize_with(true))
    }

    fn ckd(&self, option: ChildOptions) -> Result<Self, HDWError> {
        derive_xpub(self, option)
    }
}

fn payload(prefix: VersionPrefix, depth: u8, parent_fingerprint: [u8; 4], index: u32, chain_code: &[u8; 32], key_material: &[u8]) -> Vec<u8> {
    let mut payload: Vec<u8> = Vec::with_capacity(PAYLOAD_LENGTH);
    payload.extend(prefix.to_bytes());
    payload.push(depth);
    payload.extend_from_slice(&parent_fingerprint);
    payload.extend_from_slice(&index.to_be_bytes());
    payload.extend_from_slice(chain_code);
    payload.extend_from_slice(key_material);
    payload
}

/// Fields of a decoded extended key before the key material is interpreted.
struct Decoded {
    prefix: VersionPrefix,
    depth: u8,
    parent_fingerprint: [u8; 4],
    index: u32,
    chain_code: [u8; 32],
    key_material: [u8; 33]
}

fn decode(encoded: &str) -> Result<Decoded, HDWError> {
    let bytes = Base58::check_decode(encoded).map_err(|e| HDWError::BadKey(e.to_string()))?;
    if bytes.len() != PAYLOAD_LENGTH {
        return Err(HDWError::BadLength(bytes.len()))
    }

    let mut version = [0u8; 4];
    version.copy_from_slice(&bytes[0..4]);
    let prefix = VersionPrefix::from_int(u32::from_be_bytes(version))
        .ok_or_else(|| HDWError::BadPrefix(version.to_vec()))?;

    let mut parent_fingerprint = [0u8; 4];
    parent_fingerprint.copy_from_slice(&bytes[5..9]);
    let mut index = [0u8; 4];
    index.copy_from_slice(&bytes[9..13]);
    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&bytes[13..45]);
    let mut key_material = [0u8; 33];
    key_material.copy_from_slice(&bytes[45..78]);

    Ok(Decoded {
        prefix,
        depth: bytes[4],
        parent_fingerprint,
        index: u32::from_be_bytes(index),
        chain_code,
        key_material
    })
}

impl FromStr for Xprv {
    type Err = HDWError;

    /**
        Import an extended private key from a string.
        "xprv[...]" or "tprv[...]"
    */
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = decode(s)?;
        match decoded.prefix {
            VersionPrefix::Xprv | VersionPrefix::Tprv => {},
            other => return Err(HDWError::BadPrefix(other.to_bytes()))
        }
        if decoded.key_material[0] != 0x00 {
            return Err(HDWError::BadKey("private key material must start with 0x00".to_string()))
        }

        let key = PrivKey::from_slice(&decoded.key_material[1..])
            .map_err(|e| HDWError::BadKey(e.to_string()))?
            .with_network(decoded.prefix.network());

        Ok(Self::new(key, decoded.chain_code, decoded.depth, decoded.parent_fingerprint, decoded.index))
    }
}

impl FromStr for Xpub {
    type Err = HDWError;

    /**
        Import an extended public key from a string.
        "xpub[...]" or "tpub[...]"
    */
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = decode(s)?;
        match decoded.prefix {
            VersionPrefix::Xpub | VersionPrefix::Tpub => {},
            other => return Err(HDWError::BadPrefix(other.to_bytes()))
        }
        if !matches!(decoded.key_material[0], 0x02 | 0x03) {
            return Err(HDWError::BadKey("public key material must be a compressed point".to_string()))
        }

        let key = PubKey::from_slice(&decoded.key_material).map_err(|e| HDWError::BadKey(e.to_string()))?;

        Ok(Self::new(key, decoded.chain_code, decoded.depth, decoded.parent_fingerprint, decoded.index, decoded.prefix.network()))
    }
}

impl fmt::Display for Xprv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Base58::new(None, &self.payload()).check_encode())
    }
}

impl fmt::Display for Xpub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Base58::new(None, &self.payload()).check_encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = "4fc3bea5ae2df6c5a93602e87085de5a7c1e94bb7ab5e6122364753cc51aa5e210c32aec1c58ed570c83084ec3b60b4ad69075bc62c05edb8e538ae2843f4f59";
    const MASTER_XPRV: &str = "xprv9s21ZrQH143K4SSfHuCgyJKsown12SFNpzCf3XYJT67mkaVaWCCBqiGBRZRmgk2ypzXoWzAccyVPGBW69A6LLRMnbY6GZ27q6UkiJDnPjhT";
    const MASTER_XPUB: &str = "xpub661MyMwAqRbcGvX8PvjhLSGcMycVRtyECD8Fquwv1RekdNpj3jWSPWafGsdNa6TNVmDN9HpPe2tRPofzHTYAUeQFUsAQpzuVSDDyUCt975T";

    fn master() -> Xprv {
        Xprv::from_seed(&hex::decode(SEED).unwrap(), Network::Mainnet).unwrap()
    }

    #[test]
    fn master_from_seed() {
        let master = master();
        assert_eq!(master.to_string(), MASTER_XPRV);
        assert_eq!(master.xpub().to_string(), MASTER_XPUB);
        assert!(master.is_master());
        assert!(master.xpub().is_master());
        assert_eq!(master.depth(), 0);
        assert_eq!(master.payload().len(), 78);
    }

    #[test]
    fn testnet_prefixes() {
        let master = Xprv::from_seed(&hex::decode(SEED).unwrap(), Network::Testnet).unwrap();
        let tprv = "tprv8ZgxMBicQKsPfFgBxU4C8wws85CDFxHPAY7muwxkw4cFYBEfVZXwMTddLjbRh7RJCS4aX5nNnL5Bj33qGNSH9UdP8BJaDNqt1aW8jxhAPRa";
        let tpub = "tpubD6NzVbkrYhZ4Yihyr7inYMbyh6i9RHUHjqiZCU14MLQeNfVS7xMXXxFVWuiA6bQcHfkGksLGB8iU5zAbgKPQN5rYYTuiWXZj2ApPEBDNxet";
        assert_eq!(master.to_string(), tprv);
        assert_eq!(master.xpub().to_string(), tpub);

        let parsed: Xprv = tprv.parse().unwrap();
        assert_eq!(parsed.network(), Network::Testnet);
        assert_eq!(parsed.private_key().network, Network::Testnet);
        assert_eq!(tpub.parse::<Xpub>().unwrap().network, Network::Testnet);
    }

    #[test]
    fn string_round_trip() {
        let xprv: Xprv = MASTER_XPRV.parse().unwrap();
        assert_eq!(xprv, master());
        assert_eq!(xprv.to_string(), MASTER_XPRV);

        let xpub: Xpub = MASTER_XPUB.parse().unwrap();
        assert_eq!(xpub, master().xpub());
        assert_eq!(xpub.to_string(), MASTER_XPUB);
    }

    #[test]
    fn parse_rejects() {
        // wrong kind for the type
        assert!(matches!(MASTER_XPUB.parse::<Xprv>(), Err(HDWError::BadPrefix(_))));
        assert!(matches!(MASTER_XPRV.parse::<Xpub>(), Err(HDWError::BadPrefix(_))));

        // valid base58check of the wrong length
        let short = Base58::new(None, &[0x04, 0x88, 0xad, 0xe4, 0x00]).check_encode();
        assert_eq!(short.parse::<Xprv>(), Err(HDWError::BadLength(5)));

        // unknown version bytes
        let mut payload = master().payload();
        payload[0..4].copy_from_slice(&[0x01, 0x02, 0x03, 0x04]);
        let unknown = Base58::new(None, &payload).check_encode();
        assert_eq!(unknown.parse::<Xprv>(), Err(HDWError::BadPrefix(vec![0x01, 0x02, 0x03, 0x04])));

        // private key material without the 0x00 pad
        let mut payload = master().payload();
        payload[45] = 0x01;
        let unpadded = Base58::new(None, &payload).check_encode();
        assert!(matches!(unpadded.parse::<Xprv>(), Err(HDWError::BadKey(_))));

        // public key material that is not a compressed point
        let mut payload = master().xpub().payload();
        payload[45] = 0x04;
        let uncompressed = Base58::new(None, &payload).check_encode();
        assert!(matches!(uncompressed.parse::<Xpub>(), Err(HDWError::BadKey(_))));

        // checksum
        let mut corrupted = MASTER_XPRV.to_string();
        corrupted.pop();
        corrupted.push('U');
        assert!(matches!(corrupted.parse::<Xprv>(), Err(HDWError::BadKey(_))));
    }

    #[test]
    fn seed_length() {
        assert_eq!(Xprv::from_seed(&[0u8; 15], Network::Mainnet), Err(HDWError::BadSeedLength(15)));
        assert_eq!(Xprv::from_seed(&[0u8; 65], Network::Mainnet), Err(HDWError::BadSeedLength(65)));
        assert!(Xprv::from_seed(&[1u8; 16], Network::Mainnet).is_ok());
    }
}
