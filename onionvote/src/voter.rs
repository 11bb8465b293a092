use crate::elgamal::{SigningKey, VerifyingKey};
use crate::keygen::{generate_encryption_keypair, generate_signing_keypair};
use crate::CryptoError;
use rand::{CryptoRng, RngCore};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;

/// A voter is both a ballot caster and a mix node.
///
/// Each voter holds its own signing and encryption keys. Peers only ever see
/// the public halves, through the election's roster.
pub struct Voter {
    name: String,
    signing_key: SigningKey,
    encryption_key: RsaPrivateKey,
    encryption_public: RsaPublicKey,
}

impl Voter {
    pub fn new(name: impl Into<String>, signing_key: SigningKey, encryption_key: RsaPrivateKey) -> Self {
        let encryption_public = RsaPublicKey::from(&encryption_key);
        Voter {
            name: name.into(),
            signing_key,
            encryption_key,
            encryption_public,
        }
    }

    /// Create a new voter with freshly generated keys
    pub fn generate<R: RngCore + CryptoRng>(
        rng: &mut R,
        name: impl Into<String>,
    ) -> Result<Self, CryptoError> {
        let (signing_key, _) = generate_signing_keypair(rng);
        let (encryption_key, _) = generate_encryption_keypair(rng)?;
        Ok(Voter::new(name, signing_key, encryption_key))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn encryption_public(&self) -> &RsaPublicKey {
        &self.encryption_public
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub(crate) fn encryption_key(&self) -> &RsaPrivateKey {
        &self.encryption_key
    }
}

impl fmt::Debug for Voter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Voter").field("name", &self.name).finish()
    }
}
