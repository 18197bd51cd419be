//! Checks the big integer curve arithmetic and the signature codecs against libsecp256k1 directly.

use bsv_keytx::{
    curve::{get_y, point_add, point_multiply, Point},
    ecdsa::{RecoverableSignature as OurRecoverable, Signature},
    hash,
    key::{PrivKey, PubKey},
    util::bytes_to_int
};
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, PublicKey, Secp256k1, SecretKey
};

const KEYS: [&str; 3] = [
    "f97c89aaacf0cd2e47ddbacc97dae1f88bec49106ac37716c451dcdd008a4b62",
    "0000000000000000000000000000000000000000000000000000000000000001",
    "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140"
];

const MESSAGES: [&[u8]; 3] = [b"hello world", b"", b"a somewhat longer message to sign over"];

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn single_sha(message: &[u8]) -> [u8; 32] {
    hash::sha256(message)
}

fn secp_message(message: &[u8]) -> Message {
    Message::from_digest_slice(&single_sha(message)).unwrap()
}

fn secp_keys(key_hex: &str) -> (SecretKey, PublicKey) {
    let secp = Secp256k1::new();
    let secret = SecretKey::from_slice(&hex::decode(key_hex).unwrap()).unwrap();
    let public = PublicKey::from_secret_key(&secp, &secret);
    (secret, public)
}

fn to_point(public: &PublicKey) -> Point {
    let bytes = public.serialize_uncompressed();
    Point::new(bytes_to_int(&bytes[1..33]), bytes_to_int(&bytes[33..65])).unwrap()
}

#[test]
fn scalar_multiplication_matches() {
    init();
    for key_hex in KEYS {
        let (_, public) = secp_keys(key_hex);
        let k = bytes_to_int(&hex::decode(key_hex).unwrap());

        let point = point_multiply(&k, &Point::generator());
        assert_eq!(point, to_point(&public));
        assert_eq!(PubKey::from_point(point).unwrap().serialize(), public.serialize().to_vec());
        assert_eq!(PrivKey::from_hex(key_hex).unwrap().public_key().point(), to_point(&public));
    }
}

#[test]
fn point_addition_matches() {
    init();
    let publics: Vec<PublicKey> = KEYS.iter().map(|k| secp_keys(k).1).collect();
    for a in &publics {
        for b in &publics {
            let ours = point_add(&to_point(a), &to_point(b));
            match a.combine(b) {
                Ok(sum) => assert_eq!(ours, to_point(&sum)),
                // only P + (-P)
                Err(_) => assert!(ours.is_infinity())
            }
        }
    }
}

#[test]
fn decompression_matches() {
    init();
    for key_hex in KEYS {
        let (_, public) = secp_keys(key_hex);
        let compressed = public.serialize();
        let x = bytes_to_int(&compressed[1..33]);

        let y = get_y(&x, compressed[0] == 0x02).unwrap();
        assert_eq!(Point::new(x, y).unwrap(), to_point(&public));
    }
}

#[test]
fn signatures_interoperate() {
    init();
    let secp = Secp256k1::new();
    for key_hex in KEYS {
        let (secret, public) = secp_keys(key_hex);
        let private = PrivKey::from_hex(key_hex).unwrap();

        for message in MESSAGES {
            let der = private.sign_with_hasher(message, single_sha).to_der();
            let signature = secp256k1::ecdsa::Signature::from_der(&der).unwrap();
            assert!(secp.verify_ecdsa(&secp_message(message), &signature, &public).is_ok());

            let theirs = secp.sign_ecdsa(&secp_message(message), &secret);
            let ours = Signature::from_compact(&theirs.serialize_compact()).unwrap();
            assert!(private.public_key().verify_with_hasher(&ours, message, single_sha));
            assert_eq!(Signature::from_der(&theirs.serialize_der()).unwrap(), ours);
            assert!(!private.public_key().verify_with_hasher(&ours, b"something else", single_sha));
        }
    }
}

#[test]
fn recovery_ids_agree() {
    init();
    let secp = Secp256k1::new();
    for key_hex in KEYS {
        let (secret, public) = secp_keys(key_hex);
        let private = PrivKey::from_hex(key_hex).unwrap();

        for message in MESSAGES {
            let serialized = private.sign_recoverable_with_hasher(message, single_sha).serialize();
            let recovery_id = RecoveryId::from_i32(serialized[64] as i32).unwrap();
            let recoverable = RecoverableSignature::from_compact(&serialized[0..64], recovery_id).unwrap();
            assert_eq!(secp.recover_ecdsa(&secp_message(message), &recoverable).unwrap(), public);

            let (id, compact) = secp.sign_ecdsa_recoverable(&secp_message(message), &secret).serialize_compact();
            let mut theirs = compact.to_vec();
            theirs.push(id.to_i32() as u8);
            let ours = OurRecoverable::deserialize(&theirs).unwrap();
            assert_eq!(PubKey::recover_with_hasher(&ours, message, single_sha).unwrap(), private.public_key());
        }
    }
}
