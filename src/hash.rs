/*
    Hash functions used for keys, addresses, transactions
    and the BIP32 key tree.
*/

use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/*
    Takes in a byte array and returns the sha256 hash of it
*/
pub fn sha256<T>(input: T) -> [u8; 32]
where T: AsRef<[u8]>
{
    Sha256::digest(input).into()
}

/**
    Double sha256, used for checksums, txids and signature digests.
*/
pub fn hash256<T>(input: T) -> [u8; 32]
where T: AsRef<[u8]>
{
    sha256(sha256(input))
}

pub fn ripemd160<T>(input: T) -> [u8; 20]
where T: AsRef<[u8]>
{
    Ripemd160::digest(input).into()
}

/**
    ripemd160(sha256(input)), used for public key and script hashes.
*/
pub fn hash160<T>(input: T) -> [u8; 20]
where T: AsRef<[u8]>
{
    ripemd160(sha256(input))
}

pub fn sha512<T>(input: T) -> [u8; 64]
where T: AsRef<[u8]>
{
    Sha512::digest(input).into()
}

/**
    HMAC-SHA512 of data under key. Used by BIP32.
*/
pub fn hmac_sha512(data: &[u8], key: &[u8]) -> [u8; 64] {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/**
    HMAC-SHA256 of data under key. Used to authenticate BIE1 messages.
*/
pub fn hmac_sha256(data: &[u8], key: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/**
    Constant time comparison of an HMAC-SHA256 tag.
*/
pub fn verify_hmac_sha256(data: &[u8], key: &[u8], tag: &[u8]) -> bool {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.verify_slice(tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_vectors() {
        let message = b"hello";
        assert_eq!(hex::encode(sha256(message)), "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824");
        assert_eq!(hex::encode(hash256(message)), "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50");
        assert_eq!(hex::encode(ripemd160(message)), "108f07b8382412612c048d07d13f814118445acd");
        assert_eq!(hex::encode(hash160(message)), "b6a9c8c230722b7c748331a8b450f05566dc7d0f");
    }

    #[test]
    fn hmac_vectors() {
        // RFC 4231 test case 2
        let key = b"Jefe";
        let data = b"what do ya want for nothing?";
        assert_eq!(
            hex::encode(hmac_sha256(data, key)),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
        assert_eq!(
            hex::encode(hmac_sha512(data, key)),
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea2505549758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }
}
