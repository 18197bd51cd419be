/*
    Electrum compatible ECIES ("BIE1") message encryption.

        ecdh key      = compressed( receiver public key * ephemeral private key )
        iv | ke | km  = sha512( ecdh key )  split 16 | 16 | 32
        encrypted     = "BIE1" | ephemeral public key (33) | AES-128-CBC(ke, iv, message)
        output        = encrypted | HMAC-SHA256(km, encrypted)
*/

use aes::Aes128;
use base64::{engine::general_purpose::STANDARD, Engine};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::{
    error::{Error, Result},
    hash::{hmac_sha256, sha512, verify_hmac_sha256},
    key::{PrivKey, PubKey},
    util::Network
};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

const MAGIC: &[u8; 4] = b"BIE1";
// magic + ephemeral public key + one cipher block + mac
const MIN_LENGTH: usize = 4 + 33 + 16 + 32;

/**
    AES-128-CBC with PKCS7 padding.
*/
pub fn aes_encrypt_with_iv(key: &[u8], iv: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes128CbcEnc::new_from_slices(key, iv)
        .map_err(|e| Error::Encryption(format!("bad aes key or iv: {}", e)))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(message))
}

pub fn aes_decrypt_with_iv(key: &[u8], iv: &[u8], cipher_text: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes128CbcDec::new_from_slices(key, iv)
        .map_err(|e| Error::Decryption(format!("bad aes key or iv: {}", e)))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(cipher_text)
        .map_err(|_| Error::Decryption("invalid padding".to_string()))
}

struct SessionKeys {
    iv: [u8; 16],
    encryption: [u8; 16],
    mac: [u8; 32]
}

fn session_keys(ecdh_key: &[u8]) -> SessionKeys {
    let digest = sha512(ecdh_key);
    let mut keys = SessionKeys { iv: [0; 16], encryption: [0; 16], mac: [0; 32] };
    keys.iv.copy_from_slice(&digest[0..16]);
    keys.encryption.copy_from_slice(&digest[16..32]);
    keys.mac.copy_from_slice(&digest[32..64]);
    keys
}

pub(crate) fn encrypt_with_ephemeral(receiver: &PubKey, message: &[u8], ephemeral: &PrivKey) -> Result<Vec<u8>> {
    let keys = session_keys(&ephemeral.ecdh_key(receiver)?);
    let cipher_text = aes_encrypt_with_iv(&keys.encryption, &keys.iv, message)?;

    let mut encrypted = MAGIC.to_vec();
    encrypted.extend(ephemeral.public_key().serialize_with(true));
    encrypted.extend(cipher_text);
    let mac = hmac_sha256(&encrypted, &keys.mac);
    encrypted.extend_from_slice(&mac);
    Ok(encrypted)
}

impl PubKey {
    /**
        Encrypts a message only the holder of the matching private key can read.
        A new ephemeral key is drawn for every call.
    */
    pub fn encrypt(&self, message: &[u8]) -> Result<Vec<u8>> {
        encrypt_with_ephemeral(self, message, &PrivKey::new_rand(Network::Mainnet))
    }

    pub fn encrypt_text(&self, text: &str) -> Result<String> {
        Ok(STANDARD.encode(self.encrypt(text.as_bytes())?))
    }
}

impl PrivKey {
    /**
        Decrypts a BIE1 message. The MAC is checked before anything is decrypted.
    */
    pub fn decrypt(&self, encrypted: &[u8]) -> Result<Vec<u8>> {
        if encrypted.len() < MIN_LENGTH {
            return Err(Error::Decryption(format!("invalid encrypted length {}", encrypted.len())))
        }
        if &encrypted[0..4] != MAGIC {
            return Err(Error::Decryption("invalid magic bytes".to_string()))
        }

        let ephemeral = PubKey::from_slice(&encrypted[4..37])
            .map_err(|e| Error::Decryption(format!("invalid ephemeral public key: {}", e)))?;
        let keys = session_keys(&self.ecdh_key(&ephemeral)?);

        let (authenticated, mac) = encrypted.split_at(encrypted.len() - 32);
        if !verify_hmac_sha256(authenticated, &keys.mac, mac) {
            return Err(Error::Decryption("incorrect hmac checksum".to_string()))
        }

        aes_decrypt_with_iv(&keys.encryption, &keys.iv, &authenticated[37..])
    }

    pub fn decrypt_text(&self, text: &str) -> Result<String> {
        let decrypted = self.decrypt(&STANDARD.decode(text)?)?;
        String::from_utf8(decrypted).map_err(|e| Error::Decryption(format!("message is not utf-8: {}", e)))
    }
}
