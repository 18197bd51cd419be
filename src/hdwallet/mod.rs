/*
    This module implements hierarchical deterministic keys
    under the BIP 32 standard.

    Reference:
        https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki
*/

pub mod ckd;
pub mod extended_keys;
pub mod path;
pub mod derive_children;

pub use ckd::{derive_xprv, derive_xpub};
pub use extended_keys::{ExtendedKey, Xprv, Xpub};
pub use path::{ckd_path, step_to_index, Path};
pub use derive_children::derive_xkeys_from_xkey;

use thiserror::Error;

/// Indexes at or above this are hardened.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/**
    Enum to pattern match child key deriveration options.
    The wrapped number is the index without the hardened offset.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOptions {
    Normal(u32),
    Hardened(u32)
}

impl ChildOptions {
    /// From a full 32 bit child index
    pub fn from_index(index: u32) -> Self {
        if index >= HARDENED_OFFSET {
            ChildOptions::Hardened(index - HARDENED_OFFSET)
        } else {
            ChildOptions::Normal(index)
        }
    }

    /**
        Full 32 bit child index. Errors if the wrapped number already
        reaches into the hardened range.
    */
    pub fn index(&self) -> Result<u32, HDWError> {
        match *self {
            ChildOptions::Normal(x) if x < HARDENED_OFFSET => Ok(x),
            ChildOptions::Hardened(x) if x < HARDENED_OFFSET => Ok(x + HARDENED_OFFSET),
            ChildOptions::Normal(x) | ChildOptions::Hardened(x) => Err(HDWError::IndexTooLarge(x))
        }
    }

    pub fn is_hardened(&self) -> bool {
        matches!(self, ChildOptions::Hardened(_))
    }
}

/**
    Enum for handling deriveration errors
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HDWError {
    #[error("can't make hardened derivation from xpub")]
    HardenedFromPublic,

    #[error("index {0} must be less than 2^31")]
    IndexTooLarge(u32),

    #[error("bad derivation path: {0}")]
    BadPath(String),

    #[error("absolute path for non-master key")]
    NotMaster,

    #[error("child {0:#010x} is invalid, derive the next index instead")]
    InvalidChild(u32),

    #[error("maximum depth reached")]
    DepthOverflow,

    #[error("invalid seed length {0}, expected 16 to 64 bytes")]
    BadSeedLength(usize),

    #[error("invalid extended key length {0}")]
    BadLength(usize),

    #[error("unknown extended key prefix {0:02x?}")]
    BadPrefix(Vec<u8>),

    #[error("invalid key material: {0}")]
    BadKey(String)
}
