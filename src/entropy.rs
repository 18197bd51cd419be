use rand::{rngs::OsRng, RngCore};
use secp256k1::SecretKey;

/**
    Fresh nonce data from OsRng, mixed into every signature so that signing
    the same digest twice gives different signatures.
*/
pub fn nonce_data() -> [u8; 32] {
    let mut data = [0u8; 32];
    OsRng.fill_bytes(&mut data);
    data
}

/**
    Uniform random secret key in [1, n-1]. libsecp256k1 redraws out of range candidates.
*/
pub fn random_secret_key() -> SecretKey {
    SecretKey::new(&mut OsRng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_randomness() {
        assert_ne!(nonce_data(), nonce_data());
        assert_ne!(random_secret_key(), random_secret_key());
    }
}
