/*
    Bitcoin signed messages.

    The digest signed is
        varint(len) "Bitcoin Signed Message:\n" | varint(len) text
    hashed with hash256. Signatures travel as
        base64( 27 + recovery id (+4 if compressed) | r | s )
*/

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::{
    ecdsa::RecoverableSignature,
    error::{Error, Result},
    key::{PrivKey, PubKey},
    address::decode_address,
    util::encode_varint
};

const MESSAGE_MAGIC: &[u8] = b"Bitcoin Signed Message:\n";

pub fn text_digest(text: &str) -> Vec<u8> {
    let mut digest = encode_varint(MESSAGE_MAGIC.len() as u64);
    digest.extend_from_slice(MESSAGE_MAGIC);
    digest.extend(encode_varint(text.len() as u64));
    digest.extend_from_slice(text.as_bytes());
    digest
}

/**
    Base64 text form of a serialized recoverable signature.
*/
pub fn stringify_recoverable(serialized: &[u8], compressed: bool) -> Result<String> {
    let signature = RecoverableSignature::deserialize(serialized)?;
    let prefix = 27 + signature.recovery_id() + if compressed { 4 } else { 0 };

    let mut bytes = vec![prefix];
    bytes.extend_from_slice(&serialized[0..64]);
    Ok(STANDARD.encode(bytes))
}

/**
    Parses the base64 text form back into (serialized recoverable signature, compressed).
*/
pub fn unstringify_recoverable(text: &str) -> Result<(Vec<u8>, bool)> {
    let bytes = STANDARD.decode(text)?;
    if bytes.len() != 65 {
        return Err(Error::InvalidSignature(format!("invalid signed message length {}", bytes.len())))
    }
    let prefix = bytes[0];
    if !(27..35).contains(&prefix) {
        return Err(Error::InvalidSignature(format!("invalid signed message prefix {}", prefix)))
    }

    let compressed = prefix >= 31;
    let recovery_id = (prefix - 27) & 0x03;
    let mut serialized = bytes[1..65].to_vec();
    serialized.push(recovery_id);
    Ok((serialized, compressed))
}

impl PrivKey {
    /**
        Signs text with the message digest. Returns (address, signature).
    */
    pub fn sign_text(&self, text: &str) -> Result<(String, String)> {
        let signature = self.sign_recoverable(&text_digest(text));
        let stringified = stringify_recoverable(&signature.serialize(), self.compressed)?;
        Ok((self.address(), stringified))
    }
}

/**
    Recovers the signing key, checks the signature and compares the resulting address.
*/
pub fn verify_signed_text(text: &str, address: &str, signature: &str) -> Result<bool> {
    let (_, network) = decode_address(address)?;
    let (serialized, compressed) = unstringify_recoverable(signature)?;
    let recoverable = RecoverableSignature::deserialize(&serialized)?;

    let message = text_digest(text);
    let mut public_key = PubKey::recover(&recoverable, &message)?;
    public_key.compressed = compressed;

    Ok(public_key.verify(&recoverable.signature(), &message) && public_key.address(network) == address)
}
