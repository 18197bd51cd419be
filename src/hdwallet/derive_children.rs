/*
    Batch derivation of wallet keys below an account key.
*/

use crate::hdwallet::{
    ChildOptions,
    ExtendedKey,
    HDWError
};

/**
    Derives the keys at ./change/i for every full index i in start..end.

    Indexes are full 32 bit values so a hardened range is written as
    `step_to_index("1'")?..step_to_index("3'")?`. An empty range gives no keys.
*/
pub fn derive_xkeys_from_xkey<K: ExtendedKey>(xkey: &K, start: u32, end: u32, change: u32) -> Result<Vec<K>, HDWError> {
    if start >= end {
        return Ok(vec![])
    }

    let branch = xkey.ckd(ChildOptions::from_index(change))?;
    let keys = (start..end)
        .map(|index| branch.ckd(ChildOptions::from_index(index)))
        .collect::<Result<Vec<K>, HDWError>>()?;

    log::debug!("derived {} keys on branch {:#x} at depth {}", keys.len(), change, branch.depth());
    Ok(keys)
}
