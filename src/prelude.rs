/*
    This module contains the default imports for the library.

    Import the library using:
        use bsv_keytx::prelude::*;
    to quickly import the essential parts of the library.
*/

pub use crate::{

    key::{
        PubKey,
        PrivKey
    },

    address::Address,

    ecdsa::{
        RecoverableSignature,
        Signature
    },

    message::verify_signed_text,

    script::{
        Locking,
        Script,
        ScriptType
    },

    transaction::{
        SigHash,
        Transaction,
        TxInput,
        TxOutput,
        Txid,
        Unspent
    },

    provider::{
        BroadcastResult,
        Provider,
        UnspentCriteria,
        UnspentRecord
    },

    hdwallet::{
        ckd_path,
        derive_xkeys_from_xkey,
        ChildOptions,
        ExtendedKey,
        HDWError,
        Path,
        Xprv,
        Xpub
    },

    encoding::{
        version_prefix::VersionPrefix,
        ToVersionPrefix
    },

    config::Settings,

    error::{
        Error,
        Result
    },

    util::Network

};
