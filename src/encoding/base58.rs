use thiserror::Error;

use crate::{
    encoding::{
        version_prefix::VersionPrefix
    },
    hash
};

#[derive(Debug)]
pub struct Base58 {
    prefix: Option<VersionPrefix>,
    payload: Vec<u8>
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Base58Error {
    #[error("invalid base58 character {0:?} at {1}")]
    BadChar(char, usize),

    #[error("invalid base58 encoded: {0}")]
    Invalid(String),

    #[error("base58check payload too short ({0} bytes)")]
    TooShort(usize),

    #[error("unmatched base58 checksum, expected {expected} but actually {actual}")]
    BadChecksum { expected: String, actual: String }
}

impl From<bs58::decode::Error> for Base58Error {
    fn from(e: bs58::decode::Error) -> Self {
        match e {
            bs58::decode::Error::InvalidCharacter { character, index } => Base58Error::BadChar(character, index),
            other => Base58Error::Invalid(other.to_string())
        }
    }
}

impl Base58 {
    pub fn new(prefix: Option<VersionPrefix>, payload: &[u8]) -> Base58 {
        Base58 {
            prefix,
            payload: payload.to_vec()
        }
    }

    fn bytes(self) -> Vec<u8> {
        match self.prefix {
            Some(x) => {
                let mut d = x.to_bytes();
                d.extend_from_slice(&self.payload);
                d
            },
            None => self.payload
        }
    }

    /// Check encode data by appending the first four bytes of its hash256.
    pub fn check_encode(self) -> String {
        let mut bytes = self.bytes();
        let checksum = hash::hash256(&bytes);
        bytes.extend_from_slice(&checksum[0..4]);

        bs58::encode(bytes).into_string()
    }

    /// Encode data in base58 format. Leading zero bytes become '1'.
    pub fn encode(self) -> String {
        bs58::encode(self.bytes()).into_string()
    }

    /// Decodes a base58 string into a byte vector.
    /// DOES NOT remove the checksum or version prefix if present.
    pub fn decode(encoded: &str) -> Result<Vec<u8>, Base58Error> {
        Ok(bs58::decode(encoded).into_vec()?)
    }

    /// Checks if a base58 check encoded string is valid
    pub fn validate_checksum(encoded: &str) -> Result<bool, Base58Error> {
        let bytes = Base58::decode(encoded)?;
        if bytes.len() < 4 { return Err(Base58Error::TooShort(bytes.len())) }

        let (payload, checksum) = bytes.split_at(bytes.len() - 4);
        Ok(hash::hash256(payload)[0..4] == *checksum)
    }

    /// Returns the decoded payload with the checksum removed.
    /// Version prefix is NOT removed as it is variable length depending on context.
    pub fn check_decode(encoded: &str) -> Result<Vec<u8>, Base58Error> {
        let mut bytes = Base58::decode(encoded)?;
        if bytes.len() < 4 { return Err(Base58Error::TooShort(bytes.len())) }

        let checksum = bytes.split_off(bytes.len() - 4);
        let expected = &hash::hash256(&bytes)[0..4];
        if expected != checksum.as_slice() {
            return Err(Base58Error::BadChecksum {
                expected: hex::encode(expected),
                actual: hex::encode(checksum)
            })
        }

        Ok(bytes)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Sourced from https://tools.ietf.org/id/draft-msporny-base58-01.html
    fn base58_ietf_test_vectors() {
        let hello_world = b"Hello World!";
        let fox = b"The quick brown fox jumps over the lazy dog.";
        let int = [0x00, 0x00, 0x28, 0x7f, 0xb4, 0xcd];

        assert_eq!(Base58::new(None, hello_world).encode(), "2NEpo7TZRRrLZSi2U");
        assert_eq!(Base58::new(None, fox).encode(), "USm3fpXnKG5EUBx2ndxBDMPVciP5hGey2Jh4NDv6gmeo1LkMeiKrLJUUBk6Z");
        assert_eq!(Base58::new(None, &int).encode(), "11233QC4");
        assert_eq!(Base58::decode("11233QC4").unwrap(), int.to_vec());
    }

    #[test]
    fn check_encoding() {
        let hash = hex::decode("6a176cd51593e00542b8e1958b7da2be97452d05").unwrap();
        let address = Base58::new(Some(VersionPrefix::Address), &hash).check_encode();
        assert_eq!(address, "1AfxgwYJrBgriZDLryfyKuSdBsi59jeBX9");

        let decoded = Base58::check_decode(&address).unwrap();
        assert_eq!(decoded[0], 0x00);
        assert_eq!(decoded[1..], hash[..]);
        assert!(Base58::validate_checksum(&address).unwrap());
    }

    #[test]
    fn bad_inputs() {
        assert!(matches!(Base58::decode("0OIl"), Err(Base58Error::BadChar('0', 0))));
        assert!(matches!(
            Base58::check_decode("1AfxgwYJrBgriZDLryfyKuSdBsi59jeBX8"),
            Err(Base58Error::BadChecksum { .. })
        ));
        assert_eq!(Base58::check_decode("11"), Err(Base58Error::TooShort(2)));
    }

    #[test]
    fn any_checksum_byte_corruption_fails() {
        let payload = hex::decode("6a176cd51593e00542b8e1958b7da2be97452d05").unwrap();
        let encoded = Base58::new(Some(VersionPrefix::Address), &payload).check_encode();
        let raw = Base58::decode(&encoded).unwrap();
        assert_eq!(raw.len(), 1 + payload.len() + 4);

        for position in raw.len() - 4..raw.len() {
            for flip in [0x01u8, 0x80, 0xff] {
                let mut corrupted = raw.clone();
                corrupted[position] ^= flip;
                let reencoded = Base58::new(None, &corrupted).encode();

                assert!(
                    matches!(Base58::check_decode(&reencoded), Err(Base58Error::BadChecksum { .. })),
                    "checksum byte {} xor {:#04x} was accepted", position, flip
                );
                assert_eq!(Base58::validate_checksum(&reencoded), Ok(false));
            }
        }
    }
}
