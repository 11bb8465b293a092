//! Wire constants shared by every participant of a run.
//!
//! All voters must be built with the same values: ciphertext and signature
//! widths are not length-prefixed on the wire.

/// AES-256 key length in bytes
pub const AES_KEY_SIZE: usize = 32;

/// AES block length in bytes, also the CBC IV length
pub const AES_BLOCK_SIZE: usize = 16;

/// Length of the `key ‖ IV` material wrapped by the public-key primitive
pub const WRAPPED_MATERIAL_SIZE: usize = AES_KEY_SIZE + AES_BLOCK_SIZE;

/// RSA modulus size for voter encryption keys
pub const ENCRYPTION_KEY_BITS: usize = 1024;

/// Length of an RSA-wrapped `key ‖ IV` block
pub const WRAPPED_KEY_SIZE: usize = ENCRYPTION_KEY_BITS / 8;

/// Bytes of every RSA block consumed by PKCS#1 v1.5 encryption padding
pub const PKCS1_OVERHEAD: usize = 11;

/// Bit size of the signature group modulus
pub const SIGNATURE_GROUP_BITS: usize = 1024;

/// Width of each of the two signature halves (`r` and `s`)
pub const SIGNATURE_PART_SIZE: usize = (SIGNATURE_GROUP_BITS + 8 - 1) / 8;

/// Total signature length
pub const SIGNATURE_SIZE: usize = 2 * SIGNATURE_PART_SIZE;

/// SHA-256 output length
pub const HASH_SIZE: usize = 32;

/// Length of the self-verification padding appended in every layer
pub const PADDING_SIZE: usize = 32;

/// Length of an encoded ballot
pub const BALLOT_SIZE: usize = 4;

const _: () = assert!(WRAPPED_MATERIAL_SIZE <= WRAPPED_KEY_SIZE - PKCS1_OVERHEAD);
const _: () = assert!(HASH_SIZE * 8 < SIGNATURE_GROUP_BITS);
