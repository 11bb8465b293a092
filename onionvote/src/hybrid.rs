//! AES-with-RSA hybrid encryption.
//!
//! The payload is encrypted with AES-256-CBC (PKCS#7 block padding) under a
//! fresh key and IV. The `key ‖ IV` pair is then wrapped with the recipient's
//! RSA public key using PKCS#1 v1.5, producing exactly one RSA block.
//!   - The wrapped block is always `WRAPPED_KEY_SIZE` bytes, so the wire codec
//!     can split a ciphertext without a length prefix.
//!   - Key material is always ordered `key ‖ IV`, on both sides.

use crate::constants::*;
use crate::CryptoError;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{CryptoRng, RngCore};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Output of [`encrypt`]: wrapped key material and the symmetric cipher body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HybridCiphertext {
    pub wrapped_key: Vec<u8>,
    pub cipher_body: Vec<u8>,
}

impl HybridCiphertext {
    pub fn new(wrapped_key: Vec<u8>, cipher_body: Vec<u8>) -> Self {
        HybridCiphertext {
            wrapped_key,
            cipher_body,
        }
    }
}

/// Encrypt a message so that only the holder of the matching private key can read it.
pub fn encrypt<R: RngCore + CryptoRng>(
    rng: &mut R,
    plaintext: &[u8],
    recipient: &RsaPublicKey,
) -> Result<HybridCiphertext, CryptoError> {
    if recipient.size() != WRAPPED_KEY_SIZE {
        return Err(CryptoError::EncryptionFailure(
            "recipient key does not match the wrapped key size",
        ));
    }
    if recipient.size() < WRAPPED_MATERIAL_SIZE + PKCS1_OVERHEAD {
        return Err(CryptoError::EncryptionFailure(
            "recipient key block is too small for the AES key and IV",
        ));
    }

    let mut material = [0u8; WRAPPED_MATERIAL_SIZE];
    rng.fill_bytes(&mut material);
    let (key, iv) = material.split_at(AES_KEY_SIZE);

    let cipher_body = aes_encrypt(key, iv, plaintext)?;
    let wrapped_key = recipient
        .encrypt(rng, Pkcs1v15Encrypt, &material)
        .map_err(|_| CryptoError::EncryptionFailure("RSA key wrapping failed"))?;

    Ok(HybridCiphertext::new(wrapped_key, cipher_body))
}

/// Decrypt a hybrid ciphertext with the recipient's private key.
pub fn decrypt(
    ciphertext: &HybridCiphertext,
    recipient: &RsaPrivateKey,
) -> Result<Vec<u8>, CryptoError> {
    let material = recipient
        .decrypt(Pkcs1v15Encrypt, &ciphertext.wrapped_key)
        .map_err(|_| CryptoError::DecryptionFailure("RSA key unwrapping failed"))?;

    if material.len() != WRAPPED_MATERIAL_SIZE {
        return Err(CryptoError::DecryptionFailure(
            "unwrapped key material has the wrong length",
        ));
    }
    let (key, iv) = material.split_at(AES_KEY_SIZE);

    aes_decrypt(key, iv, &ciphertext.cipher_body)
}

fn aes_encrypt(key: &[u8], iv: &[u8], msg: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|_| CryptoError::EncryptionFailure("invalid AES key or IV length"))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(msg))
}

fn aes_decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|_| CryptoError::DecryptionFailure("invalid AES key or IV length"))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::DecryptionFailure("bad block padding"))
}
