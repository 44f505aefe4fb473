use ct_codecs::{Base64UrlSafeNoPadding, Encoder};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// 128 bits of randomness, base64url encoded. Used as SD-JWT disclosure salt.
pub fn generate_salt_base64_16() -> String {
    let seed = generate_random_seed_16();

    // encoding a fixed 16 byte buffer cannot overflow the output
    Base64UrlSafeNoPadding::encode_to_string(seed).unwrap_or_default()
}

pub fn generate_random_seed_16() -> [u8; 16] {
    let mut rng = ChaCha20Rng::from_entropy();
    let mut seed = [0u8; 16];
    rng.fill_bytes(&mut seed);
    seed
}
