/*
    Library for Bitcoin SV keys and transactions.

    Covers secp256k1 keys and ECDSA on top of libsecp256k1, big integer
    curve arithmetic, addresses and WIF, signed text messages, BIE1 message encryption,
    standard locking and unlocking scripts, transaction building and
    signing with the fork-id sighash, and BIP32 key derivation.

    Network access is left to an implementation of `provider::Provider`.

    References:
        - The Bitcoin Book (https://github.com/bitcoinbook/bitcoinbook/)
            most of the general concepts come from here

        - learn me a bitcoin (https://learnmeabitcoin.com/)
            for great visualisation of the transaction and script layouts

        - BIP143 (https://github.com/bitcoin/bips/blob/master/bip-0143.mediawiki)
            for the signature digest used with SIGHASH_FORKID
*/

//Outward facing modules
pub mod key;
pub mod address;
pub mod ecdsa;
pub mod ecies;
pub mod message;
pub mod script;
pub mod transaction;
pub mod provider;
pub mod hdwallet;
pub mod config;
pub mod error;
pub mod prelude;

//Building blocks, public for callers that need the raw pieces
pub mod curve;
pub mod encoding;
pub mod hash;
pub mod util;

//Modules for internal use
mod entropy;

//Dependencies
use once_cell::sync::Lazy;
use secp256k1::{All, Secp256k1};

/// libsecp256k1 context shared by every key operation.
static SECP: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

pub use error::{Error, Result};
