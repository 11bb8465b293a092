use crate::codec::encode_batch;
use crate::elgamal::{self, SigningKey, VerifyingKey};
use crate::Error;
use rand::{CryptoRng, RngCore};

/// A payload together with the signature of the voter who produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signed<T> {
    pub payload: T,
    pub signature: Vec<u8>,
}

impl<T> Signed<T> {
    pub fn new(payload: T, signature: Vec<u8>) -> Self {
        Signed { payload, signature }
    }

    /// Get a reference to the signed payload
    pub fn inner(&self) -> &T {
        &self.payload
    }

    pub fn into_inner(self) -> T {
        self.payload
    }
}

/// A shuffled list of ballots, signed by the voter who peeled it
pub type SignedBatch = Signed<Vec<Vec<u8>>>;

impl SignedBatch {
    /// Sign a batch of ballots over its wire encoding
    pub fn sign<R: RngCore + CryptoRng>(
        rng: &mut R,
        key: &SigningKey,
        batch: Vec<Vec<u8>>,
    ) -> Result<Self, Error> {
        let signature = elgamal::sign(rng, &encode_batch(&batch)?, key)?;
        Ok(Signed::new(batch, signature))
    }

    /// Check the signature over the batch
    pub fn verify_signature(&self, key: &VerifyingKey) -> bool {
        match encode_batch(&self.payload) {
            Ok(bytes) => elgamal::verify(&bytes, &self.signature, key),
            Err(_) => false,
        }
    }
}
