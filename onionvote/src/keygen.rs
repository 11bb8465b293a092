use crate::constants::ENCRYPTION_KEY_BITS;
use crate::elgamal::{Group, SigningKey, VerifyingKey};
use crate::CryptoError;
use num_bigint::RandBigInt;
use num_bigint::BigUint;
use num_traits::One;
use rand::{CryptoRng, RngCore};
use rsa::{RsaPrivateKey, RsaPublicKey};

/// Generate a voter encryption keypair (RSA, `ENCRYPTION_KEY_BITS` modulus)
pub fn generate_encryption_keypair<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<(RsaPrivateKey, RsaPublicKey), CryptoError> {
    let secret = RsaPrivateKey::new(rng, ENCRYPTION_KEY_BITS)
        .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
    let public = RsaPublicKey::from(&secret);
    Ok((secret, public))
}

/// Generate a voter signature keypair in the fixed group
pub fn generate_signing_keypair<R: RngCore + CryptoRng>(rng: &mut R) -> (SigningKey, VerifyingKey) {
    let group = Group::fixed();
    let upper = &group.p - BigUint::one();
    let x = rng.gen_biguint_range(&BigUint::from(2u8), &upper);
    let secret = SigningKey::from_exponent(x);
    let public = secret.verifying_key().clone();
    (secret, public)
}
