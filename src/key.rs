/*
    Private and public keys on secp256k1, backed by libsecp256k1.

    A private key carries the network and the compression flag it was
    created or imported with, so the WIF, address and public key
    serialization derived from it stay consistent.
*/

use num_bigint::BigInt;
use num_traits::Signed;
use secp256k1::{PublicKey, Scalar, SecretKey};
use std::fmt;

use crate::{
    address::Address,
    curve::{on_curve, Point, CURVE},
    ecdsa::{
        recover_digest,
        sign_digest,
        sign_recoverable_digest,
        verify_digest,
        RecoverableSignature,
        Signature
    },
    encoding::{
        base58::Base58,
        version_prefix::VersionPrefix,
        ToVersionPrefix
    },
    entropy::random_secret_key,
    error::{Error, Result},
    hash,
    script::{Locking, Script},
    util::{
        bytes_to_int,
        int_to_bytes32,
        Network
    },
    SECP
};

/**
    Hash function applied to a message before it is signed or verified.
*/
pub type Hasher = fn(&[u8]) -> [u8; 32];

/// Double sha256, the hasher used unless another is given.
pub fn default_hasher(message: &[u8]) -> [u8; 32] {
    hash::hash256(message)
}

fn secret_key(bytes: &[u8]) -> Result<SecretKey> {
    SecretKey::from_slice(bytes)
        .map_err(|_| Error::InvalidPrivateKey("scalar out of range [1, n-1]".to_string()))
}

#[derive(Clone, PartialEq, Eq)]
pub struct PrivKey {
    key: SecretKey,
    pub network: Network,
    pub compressed: bool
}

impl fmt::Debug for PrivKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivKey")
            .field("public_key", &self.public_key().hex())
            .field("network", &self.network)
            .field("compressed", &self.compressed)
            .finish()
    }
}

impl PrivKey {
    /**
        Generates a uniformly random private key from OsRng.
    */
    pub fn new_rand(network: Network) -> Self {
        Self::from_secret_key(random_secret_key(), network)
    }

    pub(crate) fn from_secret_key(key: SecretKey, network: Network) -> Self {
        Self { key, network, compressed: true }
    }

    /**
        Uses an integer in [1, n-1] as the private key.
    */
    pub fn from_int(scalar: BigInt, network: Network) -> Result<Self> {
        if !scalar.is_positive() || scalar >= CURVE.n {
            return Err(Error::InvalidPrivateKey("scalar out of range [1, n-1]".to_string()))
        }
        Ok(Self::from_secret_key(secret_key(&int_to_bytes32(&scalar))?, network))
    }

    /**
        Use a predefined 32 byte array as the private key. Mainnet, compressed.
    */
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(Error::InvalidPrivateKey(format!("expected 32 bytes, found {}", bytes.len())))
        }
        Ok(Self::from_secret_key(secret_key(bytes)?, Network::Mainnet))
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        Self::from_slice(&hex::decode(hex)?)
    }

    /**
        Imports a wallet-import-format key.
        The version byte selects the network, a trailing 0x01 marks a compressed key.
    */
    pub fn from_wif(wif: &str) -> Result<Self> {
        let decoded = Base58::check_decode(wif)?;
        if decoded.is_empty() {
            return Err(Error::InvalidPrivateKey("empty WIF".to_string()))
        }

        let network = match VersionPrefix::from_byte(decoded[0]) {
            Some(p @ VersionPrefix::Wif) | Some(p @ VersionPrefix::TestnetWif) => p.network(),
            _ => return Err(Error::UnknownPrefix { kind: "WIF", prefix: vec![decoded[0]] })
        };

        let compressed = match decoded.len() {
            34 if decoded[33] == 0x01 => true,
            33 => false,
            n => return Err(Error::InvalidPrivateKey(format!("bad WIF payload length {}", n)))
        };

        let key = Self::from_secret_key(secret_key(&decoded[1..33])?, network);
        Ok(key.with_compressed(compressed))
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn with_compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.key
    }

    pub fn scalar(&self) -> BigInt {
        bytes_to_int(&self.serialize())
    }

    /**
        Serializes the private key into a array of bytes.
    */
    pub fn serialize(&self) -> [u8; 32] {
        self.key.secret_bytes()
    }

    pub fn hex(&self) -> String {
        hex::encode(self.serialize())
    }

    /**
        Export the private key as wallet-import-format using its own network and compression flag.
    */
    pub fn wif(&self) -> String {
        self.to_wif(self.compressed, self.network)
    }

    pub fn to_wif(&self, compressed: bool, network: Network) -> String {
        let mut key: Vec<u8> = self.serialize().to_vec();
        if compressed {
            key.push(0x01);
        }

        Base58::new(Some(network.wif_prefix()), &key).check_encode()
    }

    /**
        k * G, carrying over the compression flag.
    */
    pub fn public_key(&self) -> PubKey {
        PubKey {
            key: PublicKey::from_secret_key(&*SECP, &self.key),
            compressed: self.compressed
        }
    }

    pub fn address(&self) -> String {
        self.public_key().address(self.network)
    }

    pub fn locking_script(&self) -> Result<Script> {
        self.public_key().locking_script()
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.sign_with_hasher(message, default_hasher)
    }

    pub fn sign_with_hasher(&self, message: &[u8], hasher: Hasher) -> Signature {
        sign_digest(&self.key, hasher(message))
    }

    pub fn sign_recoverable(&self, message: &[u8]) -> RecoverableSignature {
        self.sign_recoverable_with_hasher(message, default_hasher)
    }

    pub fn sign_recoverable_with_hasher(&self, message: &[u8], hasher: Hasher) -> RecoverableSignature {
        sign_recoverable_digest(&self.key, hasher(message))
    }

    pub fn verify(&self, signature: &Signature, message: &[u8]) -> bool {
        self.public_key().verify(signature, message)
    }

    pub fn verify_recoverable(&self, signature: &RecoverableSignature, message: &[u8]) -> bool {
        self.public_key().verify_recoverable(signature, message)
    }

    /**
        Shared secret with another party: compressed serialization of k * their public key.
    */
    pub fn ecdh_key(&self, public_key: &PubKey) -> Result<Vec<u8>> {
        public_key.ecdh_key(self)
    }
}

#[derive(Debug, Clone)]
pub struct PubKey {
    key: PublicKey,
    pub compressed: bool
}

impl PartialEq for PubKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for PubKey {}

impl PubKey {
    pub(crate) fn from_public_key(key: PublicKey) -> Self {
        Self { key, compressed: true }
    }

    pub(crate) fn public_key(&self) -> &PublicKey {
        &self.key
    }

    /**
        Wraps a curve point. The point at infinity is not a public key.
    */
    pub fn from_point(point: Point) -> Result<Self> {
        if !on_curve(&point) { return Err(Error::NotOnCurve) }
        let (x, y) = match &point {
            Point::Coordinates(x, y) => (x, y),
            Point::Infinity => return Err(Error::InvalidPublicKey("point at infinity".to_string()))
        };

        let mut bytes = vec![0x04];
        bytes.extend_from_slice(&int_to_bytes32(x));
        bytes.extend_from_slice(&int_to_bytes32(y));
        let key = PublicKey::from_slice(&bytes).map_err(|_| Error::NotOnCurve)?;
        Ok(Self::from_public_key(key))
    }

    /**
        Parses a 33 byte compressed (02/03) or 65 byte uncompressed (04) public key.
    */
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let compressed = match (bytes.len(), bytes.first()) {
            (33, Some(0x02 | 0x03)) => true,
            (65, Some(0x04)) => false,
            (len, prefix) => return Err(Error::InvalidPublicKey(
                format!("unsupported encoding of {} bytes with prefix {:02x?}", len, prefix)
            ))
        };

        let key = PublicKey::from_slice(bytes).map_err(|_| Error::NotOnCurve)?;
        Ok(Self { key, compressed })
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        Self::from_slice(&hex::decode(hex)?)
    }

    /**
        The affine point, for arithmetic with the curve module.
    */
    pub fn point(&self) -> Point {
        let bytes = self.key.serialize_uncompressed();
        Point::Coordinates(bytes_to_int(&bytes[1..33]), bytes_to_int(&bytes[33..65]))
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.serialize_with(self.compressed)
    }

    /**
        02/03 | x  when compressed, 04 | x | y otherwise.
    */
    pub fn serialize_with(&self, compressed: bool) -> Vec<u8> {
        if compressed {
            self.key.serialize().to_vec()
        } else {
            self.key.serialize_uncompressed().to_vec()
        }
    }

    pub fn hex(&self) -> String {
        hex::encode(self.serialize())
    }

    pub fn hash160(&self) -> [u8; 20] {
        hash::hash160(self.serialize())
    }

    pub fn address(&self, network: Network) -> String {
        Address::new(self.hash160(), network).to_string()
    }

    /**
        P2PKH locking script paying to this key.
    */
    pub fn locking_script(&self) -> Result<Script> {
        Locking::P2pkh { public_key_hash: self.hash160() }.script()
    }

    pub fn verify(&self, signature: &Signature, message: &[u8]) -> bool {
        self.verify_with_hasher(signature, message, default_hasher)
    }

    pub fn verify_with_hasher(&self, signature: &Signature, message: &[u8], hasher: Hasher) -> bool {
        verify_digest(&self.key, hasher(message), signature)
    }

    /**
        The signature must verify and recover to this key.
    */
    pub fn verify_recoverable(&self, signature: &RecoverableSignature, message: &[u8]) -> bool {
        self.verify(&signature.signature(), message)
            && Self::recover(signature, message).map_or(false, |recovered| recovered == *self)
    }

    pub fn recover(signature: &RecoverableSignature, message: &[u8]) -> Result<Self> {
        Self::recover_with_hasher(signature, message, default_hasher)
    }

    pub fn recover_with_hasher(signature: &RecoverableSignature, message: &[u8], hasher: Hasher) -> Result<Self> {
        Ok(Self::from_public_key(recover_digest(signature, hasher(message))?))
    }

    /**
        Shared secret with a private key holder: compressed serialization of k * self.
    */
    pub fn ecdh_key(&self, private_key: &PrivKey) -> Result<Vec<u8>> {
        let tweak = Scalar::from_be_bytes(private_key.serialize())
            .map_err(|_| Error::InvalidPrivateKey("scalar out of range [1, n-1]".to_string()))?;
        let shared = self.key.mul_tweak(&*SECP, &tweak)?;
        Ok(shared.serialize().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::point_multiply;
    use num_traits::Zero;

    const PRIVATE_KEY_HEX: &str = "f97c89aaacf0cd2e47ddbacc97dae1f88bec49106ac37716c451dcdd008a4b62";
    const X: &str = "e46dcd7991e5a4bd642739249b0158312e1aee56a60fd1bf622172ffe65bd789";
    const Y: &str = "97693d32c540ac253de7a3dc73f7e4ba7b38d2dc1ecc8e07920b496fb107d6b2";

    const ADDRESS_COMPRESSED_MAIN: &str = "1AfxgwYJrBgriZDLryfyKuSdBsi59jeBX9";
    const ADDRESS_UNCOMPRESSED_MAIN: &str = "1BVHzn1J8VZWRuVWbPrj2Szx1j7hHdt5zP";
    const ADDRESS_COMPRESSED_TEST: &str = "mqBuyzdHfD87VfgxaYeM9pex3sJn4ihYHY";
    const ADDRESS_UNCOMPRESSED_TEST: &str = "mr1FHq6GwWzmD1y8Jxq6rNDGsiiQ9caF7r";

    const WIF_COMPRESSED_MAIN: &str = "L5agPjZKceSTkhqZF2dmFptT5LFrbr6ZGPvP7u4A6dvhTrr71WZ9";
    const WIF_UNCOMPRESSED_MAIN: &str = "5KiANv9EHEU4o9oLzZ6A7z4xJJ3uvfK2RLEubBtTz1fSwAbpJ2U";
    const WIF_COMPRESSED_TEST: &str = "cVwfreZB3i8iv9JpdSStd9PWhZZGGJCFLS4rEKWfbkahibwhticA";
    const WIF_UNCOMPRESSED_TEST: &str = "93UnxexmsTYCmDJdctz4zacuwxQd5prDmH6rfpEyKkQViAVA3me";

    fn private_key() -> PrivKey {
        PrivKey::from_hex(PRIVATE_KEY_HEX).unwrap()
    }

    #[test]
    fn public_key_encodings() -> Result<()> {
        let public_key = private_key().public_key();
        assert_eq!(public_key.hex(), format!("02{}", X));
        assert_eq!(hex::encode(public_key.serialize_with(false)), format!("04{}{}", X, Y));

        assert_eq!(PubKey::from_hex(&format!("02{}", X))?, public_key);
        let uncompressed = PubKey::from_hex(&format!("04{}{}", X, Y))?;
        assert_eq!(uncompressed, public_key);
        assert!(!uncompressed.compressed);
        assert_eq!(uncompressed.address(Network::Mainnet), ADDRESS_UNCOMPRESSED_MAIN);

        assert_eq!(public_key.address(Network::Mainnet), ADDRESS_COMPRESSED_MAIN);
        assert_eq!(public_key.address(Network::Testnet), ADDRESS_COMPRESSED_TEST);
        Ok(())
    }

    #[test]
    fn bad_public_keys() {
        assert!(PubKey::from_hex(&format!("05{}", X)).is_err());
        assert!(PubKey::from_hex(&format!("04{}{}", X, X)).is_err());
        assert!(PubKey::from_point(Point::Infinity).is_err());
        assert!(matches!(
            PubKey::from_point(Point::Coordinates(BigInt::from(1), BigInt::from(1))),
            Err(Error::NotOnCurve)
        ));
        assert!(PubKey::from_slice(&[0x02; 20]).is_err());
    }

    #[test]
    fn wif_encodings() -> Result<()> {
        let key = private_key();
        assert_eq!(key.wif(), WIF_COMPRESSED_MAIN);
        assert_eq!(key.to_wif(false, Network::Mainnet), WIF_UNCOMPRESSED_MAIN);
        assert_eq!(key.to_wif(true, Network::Testnet), WIF_COMPRESSED_TEST);
        assert_eq!(key.to_wif(false, Network::Testnet), WIF_UNCOMPRESSED_TEST);

        let cases = [
            (WIF_COMPRESSED_MAIN, ADDRESS_COMPRESSED_MAIN, Network::Mainnet, true),
            (WIF_UNCOMPRESSED_MAIN, ADDRESS_UNCOMPRESSED_MAIN, Network::Mainnet, false),
            (WIF_COMPRESSED_TEST, ADDRESS_COMPRESSED_TEST, Network::Testnet, true),
            (WIF_UNCOMPRESSED_TEST, ADDRESS_UNCOMPRESSED_TEST, Network::Testnet, false)
        ];
        for (wif, address, network, compressed) in cases.iter() {
            let imported = PrivKey::from_wif(wif)?;
            assert_eq!(imported.scalar(), key.scalar());
            assert_eq!(imported.wif(), *wif);
            assert_eq!(imported.address(), *address);
            assert_eq!(imported.network, *network);
            assert_eq!(imported.compressed, *compressed);
        }
        Ok(())
    }

    #[test]
    fn bad_private_keys() {
        assert!(PrivKey::from_int(BigInt::zero(), Network::Mainnet).is_err());
        assert!(PrivKey::from_int(CURVE.n.clone(), Network::Mainnet).is_err());
        assert!(PrivKey::from_slice(&[1u8; 31]).is_err());

        // Valid base58check with an address prefix instead of a WIF prefix
        assert!(matches!(
            PrivKey::from_wif(ADDRESS_COMPRESSED_MAIN),
            Err(Error::UnknownPrefix { kind: "WIF", .. })
        ));
    }

    #[test]
    fn sign_and_verify() {
        let key = private_key();
        let message = b"hello world";
        let signature = key.sign(message);

        assert!(key.verify(&signature, message));
        assert!(key.public_key().verify(&signature, message));
        assert!(!key.verify(&signature, b"hello world!"));
        assert!(!PrivKey::new_rand(Network::Mainnet).verify(&signature, message));

        let single_sha = |m: &[u8]| hash::sha256(m);
        let sha_signature = key.sign_with_hasher(message, single_sha);
        assert!(key.public_key().verify_with_hasher(&sha_signature, message, single_sha));
        assert!(!key.public_key().verify(&sha_signature, message));
    }

    #[test]
    fn recoverable_signatures() -> Result<()> {
        let key = private_key();
        let message = b"hello world";
        let signature = key.sign_recoverable(message);

        assert!(key.verify_recoverable(&signature, message));
        assert_eq!(PubKey::recover(&signature, message)?, key.public_key());
        assert!(!PrivKey::new_rand(Network::Mainnet).verify_recoverable(&signature, message));
        Ok(())
    }

    #[test]
    fn ecdh_is_symmetric() -> Result<()> {
        let alice = PrivKey::new_rand(Network::Mainnet);
        let bob = PrivKey::new_rand(Network::Mainnet);

        let shared = alice.ecdh_key(&bob.public_key())?;
        assert_eq!(shared.len(), 33);
        assert_eq!(shared, bob.ecdh_key(&alice.public_key())?);

        // k * P computed with the curve module
        let point = point_multiply(&alice.scalar(), &bob.public_key().point());
        assert_eq!(shared, PubKey::from_point(point)?.serialize_with(true));
        Ok(())
    }

    #[test]
    fn public_key_matches_curve_arithmetic() -> Result<()> {
        for key in [private_key(), PrivKey::from_int(BigInt::from(1), Network::Mainnet)?, PrivKey::new_rand(Network::Mainnet)] {
            let point = point_multiply(&key.scalar(), &Point::generator());
            assert_eq!(key.public_key().point(), point);
            assert_eq!(PubKey::from_point(point)?, key.public_key());
        }
        assert_eq!(
            PrivKey::from_int(BigInt::from(1), Network::Mainnet)?.public_key().point(),
            Point::generator()
        );
        Ok(())
    }

    #[test]
    fn random_keys_differ() {
        let a = PrivKey::new_rand(Network::Testnet);
        let b = PrivKey::new_rand(Network::Testnet);
        assert_ne!(a, b);
        assert!(a.address().starts_with('m') || a.address().starts_with('n'));
    }
}
