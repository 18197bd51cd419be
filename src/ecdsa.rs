/*
    ECDSA over secp256k1, signed and checked by libsecp256k1.

    Signing is non-deterministic: fresh nonce data from OsRng is mixed into
    the nonce of every signature. Every produced signature is low-S.

    Signature codecs:
        - strict DER                 30 len 02 rlen r 02 slen s
        - compact                    r(32) | s(32)
        - recoverable (compact)      r(32) | s(32) | recovery id(1)
*/

use num_bigint::BigInt;
use secp256k1::{
    ecdsa::{self, RecoveryId},
    Message,
    PublicKey,
    SecretKey
};

use crate::{
    entropy::nonce_data,
    error::{Error, Result},
    util::bytes_to_int,
    SECP
};

/**
    Plain (r, s) signature.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature(ecdsa::Signature);

/**
    Signature carrying the information needed to recover the signing public key.
    Bit 0 of the recovery id is the parity of the nonce point's y,
    bit 1 is set when the nonce point's x was not below the curve order.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature(ecdsa::RecoverableSignature);

impl Signature {
    /**
        Parses r(32) | s(32). Values at or above the curve order are rejected.
    */
    pub fn from_compact(bytes: &[u8]) -> Result<Self> {
        ecdsa::Signature::from_compact(bytes)
            .map(Self)
            .map_err(|e| Error::InvalidSignature(format!("invalid compact signature: {}", e)))
    }

    pub fn to_compact(&self) -> [u8; 64] {
        self.0.serialize_compact()
    }

    pub fn r(&self) -> BigInt {
        bytes_to_int(&self.to_compact()[0..32])
    }

    pub fn s(&self) -> BigInt {
        bytes_to_int(&self.to_compact()[32..64])
    }

    pub fn is_low_s(&self) -> bool {
        self.normalized() == *self
    }

    fn normalized(&self) -> Self {
        let mut low = self.0;
        low.normalize_s();
        Self(low)
    }

    /**
        Strict DER encoding. s is replaced with n - s when it is in the upper half of the order.
    */
    pub fn to_der(&self) -> Vec<u8> {
        self.normalized().0.serialize_der().to_vec()
    }

    /**
        Parses a strict DER encoded signature.
    */
    pub fn from_der(der: &[u8]) -> Result<Self> {
        ecdsa::Signature::from_der(der)
            .map(Self)
            .map_err(|e| Error::InvalidSignature(format!("invalid DER encoded: {}", e)))
    }
}

fn recovery_byte(recovery_id: RecoveryId) -> u8 {
    let id = recovery_id.to_i32();
    debug_assert!((0..=3).contains(&id));
    id as u8
}

impl RecoverableSignature {
    pub fn signature(&self) -> Signature {
        Signature(self.0.to_standard())
    }

    pub fn recovery_id(&self) -> u8 {
        recovery_byte(self.0.serialize_compact().0)
    }

    /// r(32) | s(32) | recovery id(1)
    pub fn serialize(&self) -> Vec<u8> {
        let (recovery_id, compact) = self.0.serialize_compact();
        let mut out = compact.to_vec();
        out.push(recovery_byte(recovery_id));
        out
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 65 {
            return Err(Error::InvalidSignature(format!("invalid recoverable signature length {}", bytes.len())))
        }
        let recovery_id = RecoveryId::from_i32(i32::from(bytes[64]))
            .map_err(|_| Error::InvalidSignature(format!("invalid recovery id {}", bytes[64])))?;

        ecdsa::RecoverableSignature::from_compact(&bytes[0..64], recovery_id)
            .map(Self)
            .map_err(|e| Error::InvalidSignature(format!("invalid recoverable signature: {}", e)))
    }
}

pub(crate) fn sign_digest(key: &SecretKey, digest: [u8; 32]) -> Signature {
    let message = Message::from_digest(digest);
    Signature(SECP.sign_ecdsa_with_noncedata(&message, key, &nonce_data()))
}

pub(crate) fn sign_recoverable_digest(key: &SecretKey, digest: [u8; 32]) -> RecoverableSignature {
    let message = Message::from_digest(digest);
    RecoverableSignature(SECP.sign_ecdsa_recoverable_with_noncedata(&message, key, &nonce_data()))
}

/**
    Standard ECDSA verification of a 32 byte digest.
    High-S signatures are normalised first so (r, s) and (r, n - s) both verify.
*/
pub(crate) fn verify_digest(key: &PublicKey, digest: [u8; 32], signature: &Signature) -> bool {
    let message = Message::from_digest(digest);
    SECP.verify_ecdsa(&message, &signature.normalized().0, key).is_ok()
}

/**
    Recovers the public key that produced the signature over the digest.
*/
pub(crate) fn recover_digest(signature: &RecoverableSignature, digest: [u8; 32]) -> Result<PublicKey> {
    let message = Message::from_digest(digest);
    SECP.recover_ecdsa(&message, &signature.0)
        .map_err(|e| Error::InvalidSignature(format!("public key recovery failed: {}", e)))
}
