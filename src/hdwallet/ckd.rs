/*
    This module implements child key deriveration
    from parent extended private and public keys
    under the BIP32 standard.

    Reference:
        https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki
*/

use secp256k1::Scalar;

use crate::{
    hash::hmac_sha512,
    hdwallet::{
        ChildOptions,
        ExtendedKey,
        HDWError,
        Xprv,
        Xpub
    },
    key::{PrivKey, PubKey},
    SECP
};

/**
    Function to derive new child xprv keys from parent xprv keys.
    Hardened children commit to the parent private key, normal children to the parent public key.
*/
pub fn derive_xprv(parent: &Xprv, option: ChildOptions) -> Result<Xprv, HDWError> {
    let index = option.index()?;
    let depth = child_depth(parent.depth)?;

    //Normal child data is [parent pub bytes || index bytes]
    //Hardened child data is [0x00 || parent priv bytes || index bytes]
    let mut data: Vec<u8> = Vec::with_capacity(37);
    if option.is_hardened() {
        data.push(0x00);
        data.extend_from_slice(&parent.private_key().serialize());
    } else {
        data.extend_from_slice(&parent.public_key().serialize_with(true));
    }
    data.extend_from_slice(&index.to_be_bytes());

    let (offset, chain_code) = split_hmac(&data, parent.chain_code(), index)?;

    //child = (parent + offset) mod n, zero is refused by libsecp256k1
    let child = parent.private_key().secret_key()
        .add_tweak(&offset)
        .map_err(|_| invalid_child(index))?;
    let key = PrivKey::from_secret_key(child, parent.network());

    log::trace!("derived xprv child {:#010x} at depth {}", index, depth);
    Ok(Xprv::new(key, chain_code, depth, parent.fingerprint(), index))
}

/**
    Function to derive new child xpub keys from parent xpub keys.
    Only normal children can be derived without the private key.
*/
pub fn derive_xpub(parent: &Xpub, option: ChildOptions) -> Result<Xpub, HDWError> {
    let index = match option {
        ChildOptions::Hardened(_) => return Err(HDWError::HardenedFromPublic),
        ChildOptions::Normal(_) => option.index()?
    };
    let depth = child_depth(parent.depth)?;

    let parent_key = parent.public_key();
    let mut data: Vec<u8> = parent_key.serialize_with(true);
    data.extend_from_slice(&index.to_be_bytes());

    let (offset, chain_code) = split_hmac(&data, parent.chain_code(), index)?;

    //child = parent + offset * G
    let child = parent_key.public_key()
        .add_exp_tweak(&*SECP, &offset)
        .map_err(|_| invalid_child(index))?;
    let key = PubKey::from_public_key(child);

    log::trace!("derived xpub child {:#010x} at depth {}", index, depth);
    Ok(Xpub::new(key, chain_code, depth, parent.fingerprint(), index, parent.network))
}

/**
    HMAC-SHA512 keyed with the parent chain code. The left half is the key offset,
    the right half becomes the child chain code. An offset of at least n
    makes the index unusable.
*/
fn split_hmac(data: &[u8], chain_code: &[u8; 32], index: u32) -> Result<(Scalar, [u8; 32]), HDWError> {
    let hash: [u8; 64] = hmac_sha512(data, chain_code);

    let mut left = [0u8; 32];
    left.copy_from_slice(&hash[0..32]);
    let offset = Scalar::from_be_bytes(left).map_err(|_| invalid_child(index))?;

    let mut child_chain_code = [0u8; 32];
    child_chain_code.copy_from_slice(&hash[32..64]);

    Ok((offset, child_chain_code))
}

fn invalid_child(index: u32) -> HDWError {
    log::warn!("child index {:#010x} gives an invalid key, the next index should be used", index);
    HDWError::InvalidChild(index)
}

fn child_depth(depth: u8) -> Result<u8, HDWError> {
    depth.checked_add(1).ok_or(HDWError::DepthOverflow)
}
