//! ElGamal signatures over a fixed safe-prime group.
//!
//! Every key pair lives in the same group: the 1024-bit MODP prime of
//! RFC 2409 (Oakley group 2) with generator 2. Messages are hashed with SHA-256
//! and signatures are `r ‖ s`, each left-padded to `SIGNATURE_PART_SIZE`.

use crate::constants::*;
use crate::CryptoError;
use digest::Digest;
use lazy_static::lazy_static;
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use sha2::Sha256;

const OAKLEY_GROUP_2_PRIME: &str = "\
    FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1\
    29024E088A67CC74020BBEA63B139B22514A08798E3404DD\
    EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245\
    E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
    EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE65381\
    FFFFFFFFFFFFFFFF";

lazy_static! {
    static ref GROUP: Group = Group::oakley_group_2();
}

/// Public group parameters shared by all signature key pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub p: BigUint,
    pub g: BigUint,
}

impl Group {
    fn oakley_group_2() -> Self {
        let p = BigUint::parse_bytes(OAKLEY_GROUP_2_PRIME.as_bytes(), 16)
            .expect("onionvote: group prime is valid hex");
        Group {
            p,
            g: BigUint::from(2u8),
        }
    }

    /// The group every key pair of a run is generated in
    pub fn fixed() -> &'static Group {
        &GROUP
    }

    fn order(&self) -> BigUint {
        &self.p - BigUint::one()
    }
}

/// Public half of a signature key pair: `y = g^x mod p`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyingKey {
    y: BigUint,
}

impl VerifyingKey {
    pub fn from_element(y: BigUint) -> Self {
        VerifyingKey { y }
    }

    pub fn element(&self) -> &BigUint {
        &self.y
    }
}

/// Private half of a signature key pair
///
/// Deliberately neither `Debug` nor `Clone`.
pub struct SigningKey {
    x: BigUint,
    public: VerifyingKey,
}

impl SigningKey {
    /// Build a signing key from its exponent, deriving the public element.
    pub fn from_exponent(x: BigUint) -> Self {
        let group = Group::fixed();
        let y = group.g.modpow(&x, &group.p);
        SigningKey {
            x,
            public: VerifyingKey::from_element(y),
        }
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.public
    }
}

/// Sign a message.
///
/// Retries with a fresh ephemeral secret whenever `s` comes out as zero.
pub fn sign<R: RngCore + CryptoRng>(
    rng: &mut R,
    message: &[u8],
    key: &SigningKey,
) -> Result<Vec<u8>, CryptoError> {
    let group = Group::fixed();
    let order = group.order();

    let h = hash_to_int(message);
    if h >= group.p {
        return Err(CryptoError::InvalidInput);
    }

    loop {
        let k = ephemeral_secret(rng, &order);
        let k_inv = match k.modinv(&order) {
            Some(k_inv) => k_inv,
            None => continue,
        };

        let r = group.g.modpow(&k, &group.p);

        // (h - x*r) mod (p-1), kept non-negative
        let xr = (&key.x * &r) % &order;
        let diff = ((&h % &order) + &order - xr) % &order;
        let s = (diff * k_inv) % &order;

        if s.is_zero() {
            log::trace!("elgamal: s == 0, drawing a new ephemeral secret");
            continue;
        }

        let mut signature = Vec::with_capacity(SIGNATURE_SIZE);
        signature.extend(left_pad(&r));
        signature.extend(left_pad(&s));
        return Ok(signature);
    }
}

/// Verify a signature. Malformed signatures simply fail to verify.
pub fn verify(message: &[u8], signature: &[u8], key: &VerifyingKey) -> bool {
    if signature.len() != SIGNATURE_SIZE {
        return false;
    }
    let group = Group::fixed();

    let (r, s) = signature.split_at(SIGNATURE_PART_SIZE);
    let r = BigUint::from_bytes_be(r);
    let s = BigUint::from_bytes_be(s);
    if r >= group.p || s >= group.order() {
        return false;
    }

    let h = hash_to_int(message);

    let left = (key.y.modpow(&r, &group.p) * r.modpow(&s, &group.p)) % &group.p;
    let right = group.g.modpow(&h, &group.p);

    left == right
}

/// Draw `k` uniformly from `[2, p-2]` with `gcd(k, p-1) = 1`
fn ephemeral_secret<R: RngCore + CryptoRng>(rng: &mut R, order: &BigUint) -> BigUint {
    let low = BigUint::from(2u8);
    loop {
        let k = rng.gen_biguint_range(&low, order);
        if k.gcd(order).is_one() {
            return k;
        }
        log::trace!("elgamal: ephemeral secret not coprime to p-1, retrying");
    }
}

fn hash_to_int(message: &[u8]) -> BigUint {
    BigUint::from_bytes_be(&Sha256::digest(message))
}

fn left_pad(value: &BigUint) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    let mut padded = vec![0u8; SIGNATURE_PART_SIZE - bytes.len()];
    padded.extend(bytes);
    padded
}
