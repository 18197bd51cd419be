use crate::{
    util::Network
};

/**
    Version prefixes prepended to base58check payloads.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionPrefix {
    //One byte version prefixes
        Address = 0x00,
        TestnetAddress = 0x6F,
        Wif = 0x80,
        TestnetWif = 0xEF,

    //Four byte version prefixes (BIP-32)
        Xprv = 0x0488ADE4,
        Xpub = 0x0488B21E,
        Tprv = 0x04358394,
        Tpub = 0x043587CF
}

impl VersionPrefix {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            VersionPrefix::Address |
            VersionPrefix::TestnetAddress |
            VersionPrefix::Wif |
            VersionPrefix::TestnetWif => vec![*self as u8],

            _ => (*self as u32).to_be_bytes().to_vec()
        }
    }

    /**
        Matches a single version byte to an address or WIF prefix.
    */
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(VersionPrefix::Address),
            0x6F => Some(VersionPrefix::TestnetAddress),
            0x80 => Some(VersionPrefix::Wif),
            0xEF => Some(VersionPrefix::TestnetWif),
            _ => None
        }
    }

    /**
        Matches a four byte version integer to an extended key prefix.
    */
    pub fn from_int(int: u32) -> Option<Self> {
        match int {
            0x0488ADE4 => Some(VersionPrefix::Xprv),
            0x0488B21E => Some(VersionPrefix::Xpub),
            0x04358394 => Some(VersionPrefix::Tprv),
            0x043587CF => Some(VersionPrefix::Tpub),
            _ => None
        }
    }

    pub fn network(&self) -> Network {
        match self {
            VersionPrefix::Address |
            VersionPrefix::Wif |
            VersionPrefix::Xprv |
            VersionPrefix::Xpub => Network::Mainnet,
            _ => Network::Testnet
        }
    }
}

/**
    Selects the version prefix for each kind of encoded object on a network.
*/
pub trait ToVersionPrefix {
    fn address_prefix(&self) -> VersionPrefix;
    fn wif_prefix(&self) -> VersionPrefix;
    fn xprv_prefix(&self) -> VersionPrefix;
    fn xpub_prefix(&self) -> VersionPrefix;
}

impl ToVersionPrefix for Network {
    fn address_prefix(&self) -> VersionPrefix {
        match self {
            Network::Mainnet => VersionPrefix::Address,
            Network::Testnet => VersionPrefix::TestnetAddress
        }
    }

    fn wif_prefix(&self) -> VersionPrefix {
        match self {
            Network::Mainnet => VersionPrefix::Wif,
            Network::Testnet => VersionPrefix::TestnetWif
        }
    }

    fn xprv_prefix(&self) -> VersionPrefix {
        match self {
            Network::Mainnet => VersionPrefix::Xprv,
            Network::Testnet => VersionPrefix::Tprv
        }
    }

    fn xpub_prefix(&self) -> VersionPrefix {
        match self {
            Network::Mainnet => VersionPrefix::Xpub,
            Network::Testnet => VersionPrefix::Tpub
        }
    }
}
