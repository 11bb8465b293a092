//! Byte encoding of protocol values.
//!
//! The supported shapes are closed: ballots, raw bytes, hybrid ciphertexts,
//! ballot batches and signed envelopes around one of those. Decoding is
//! directed by a [`WireTag`]; the bytes themselves carry no type information.

use crate::constants::*;
use crate::hybrid::HybridCiphertext;
use crate::{Ballot, Error, Signed, SignedBatch};
use std::convert::TryFrom;
use std::fmt;

/// A value that can travel between voters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    Ballot(Ballot),
    Bytes(Vec<u8>),
    Hybrid(HybridCiphertext),
    Batch(Vec<Vec<u8>>),
    Signed(Box<Signed<WireValue>>),
}

/// The shape to decode bytes into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireTag {
    Ballot,
    Bytes,
    Hybrid,
    Batch,
    Signed(Box<WireTag>),
}

impl WireValue {
    /// Get the tag describing this value
    pub fn tag(&self) -> WireTag {
        match self {
            WireValue::Ballot(_) => WireTag::Ballot,
            WireValue::Bytes(_) => WireTag::Bytes,
            WireValue::Hybrid(_) => WireTag::Hybrid,
            WireValue::Batch(_) => WireTag::Batch,
            WireValue::Signed(signed) => WireTag::Signed(Box::new(signed.payload.tag())),
        }
    }

    pub fn signed(payload: WireValue, signature: Vec<u8>) -> Self {
        WireValue::Signed(Box::new(Signed::new(payload, signature)))
    }
}

impl fmt::Display for WireTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WireTag::Ballot => write!(f, "ballot"),
            WireTag::Bytes => write!(f, "bytes"),
            WireTag::Hybrid => write!(f, "hybrid ciphertext"),
            WireTag::Batch => write!(f, "batch"),
            WireTag::Signed(inner) => write!(f, "signed {}", inner),
        }
    }
}

/// Encode a value to bytes
pub fn encode(value: &WireValue) -> Result<Vec<u8>, Error> {
    match value {
        WireValue::Ballot(ballot) => Ok(encode_ballot(ballot)),
        WireValue::Bytes(bytes) => Ok(bytes.clone()),
        WireValue::Hybrid(ciphertext) => Ok(encode_hybrid(ciphertext)),
        WireValue::Batch(batch) => encode_batch(batch),
        WireValue::Signed(signed) => {
            if let WireValue::Signed(_) = signed.payload {
                return Err(Error::UnsupportedType(value.tag().to_string()));
            }
            if signed.signature.len() != SIGNATURE_SIZE {
                return Err(Error::MalformedEncoding {
                    kind: "signature",
                    expected: SIGNATURE_SIZE,
                    found: signed.signature.len(),
                });
            }
            let mut bytes = encode(&signed.payload)?;
            bytes.extend_from_slice(&signed.signature);
            Ok(bytes)
        }
    }
}

/// Decode bytes as the shape described by `tag`
pub fn decode(tag: &WireTag, bytes: &[u8]) -> Result<WireValue, Error> {
    match tag {
        WireTag::Ballot => decode_ballot(bytes).map(WireValue::Ballot),
        WireTag::Bytes => Ok(WireValue::Bytes(bytes.to_vec())),
        WireTag::Hybrid => decode_hybrid(bytes).map(WireValue::Hybrid),
        WireTag::Batch => decode_batch(bytes).map(WireValue::Batch),
        WireTag::Signed(inner) => {
            if let WireTag::Signed(_) = **inner {
                return Err(Error::UnsupportedType(tag.to_string()));
            }
            if bytes.len() < SIGNATURE_SIZE {
                return Err(Error::MalformedEncoding {
                    kind: "signed envelope",
                    expected: SIGNATURE_SIZE,
                    found: bytes.len(),
                });
            }
            let (payload, signature) = bytes.split_at(bytes.len() - SIGNATURE_SIZE);
            let payload = decode(inner, payload)?;
            Ok(WireValue::signed(payload, signature.to_vec()))
        }
    }
}

pub fn encode_ballot(ballot: &Ballot) -> Vec<u8> {
    ballot.candidate_id.to_le_bytes().to_vec()
}

pub fn decode_ballot(bytes: &[u8]) -> Result<Ballot, Error> {
    let bytes = <[u8; BALLOT_SIZE]>::try_from(bytes).map_err(|_| Error::MalformedEncoding {
        kind: "ballot",
        expected: BALLOT_SIZE,
        found: bytes.len(),
    })?;
    Ok(Ballot::new(i32::from_le_bytes(bytes)))
}

pub fn encode_hybrid(ciphertext: &HybridCiphertext) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(ciphertext.wrapped_key.len() + ciphertext.cipher_body.len());
    bytes.extend_from_slice(&ciphertext.wrapped_key);
    bytes.extend_from_slice(&ciphertext.cipher_body);
    bytes
}

pub fn decode_hybrid(bytes: &[u8]) -> Result<HybridCiphertext, Error> {
    if bytes.len() < WRAPPED_KEY_SIZE {
        return Err(Error::MalformedEncoding {
            kind: "hybrid ciphertext",
            expected: WRAPPED_KEY_SIZE,
            found: bytes.len(),
        });
    }
    let (wrapped_key, cipher_body) = bytes.split_at(WRAPPED_KEY_SIZE);
    Ok(HybridCiphertext::new(
        wrapped_key.to_vec(),
        cipher_body.to_vec(),
    ))
}

/// Encode a batch as `count ‖ (len ‖ bytes)*`, with little-endian `u32` counts and lengths
pub fn encode_batch(batch: &[Vec<u8>]) -> Result<Vec<u8>, Error> {
    let total: usize = batch.iter().map(|entry| 4 + entry.len()).sum();
    let mut bytes = Vec::with_capacity(4 + total);
    bytes.extend_from_slice(&length_prefix(batch.len())?);
    for entry in batch {
        bytes.extend_from_slice(&length_prefix(entry.len())?);
        bytes.extend_from_slice(entry);
    }
    Ok(bytes)
}

pub fn decode_batch(bytes: &[u8]) -> Result<Vec<Vec<u8>>, Error> {
    let (count, mut rest) = read_length(bytes)?;
    // Every entry needs at least its length prefix
    if count > rest.len() / 4 {
        return Err(Error::MalformedEncoding {
            kind: "batch",
            expected: count * 4,
            found: rest.len(),
        });
    }

    let mut batch = Vec::with_capacity(count);
    for _ in 0..count {
        let (len, tail) = read_length(rest)?;
        if tail.len() < len {
            return Err(Error::MalformedEncoding {
                kind: "batch entry",
                expected: len,
                found: tail.len(),
            });
        }
        let (entry, tail) = tail.split_at(len);
        batch.push(entry.to_vec());
        rest = tail;
    }

    if !rest.is_empty() {
        return Err(Error::MalformedEncoding {
            kind: "batch",
            expected: bytes.len() - rest.len(),
            found: bytes.len(),
        });
    }
    Ok(batch)
}

fn length_prefix(len: usize) -> Result<[u8; 4], Error> {
    u32::try_from(len)
        .map(u32::to_le_bytes)
        .map_err(|_| Error::UnsupportedType(format!("batch entry of {} bytes", len)))
}

fn read_length(bytes: &[u8]) -> Result<(usize, &[u8]), Error> {
    if bytes.len() < 4 {
        return Err(Error::MalformedEncoding {
            kind: "length prefix",
            expected: 4,
            found: bytes.len(),
        });
    }
    let (prefix, rest) = bytes.split_at(4);
    let mut len = [0u8; 4];
    len.copy_from_slice(prefix);
    Ok((u32::from_le_bytes(len) as usize, rest))
}

impl From<Ballot> for WireValue {
    fn from(ballot: Ballot) -> Self {
        WireValue::Ballot(ballot)
    }
}

impl From<HybridCiphertext> for WireValue {
    fn from(ciphertext: HybridCiphertext) -> Self {
        WireValue::Hybrid(ciphertext)
    }
}

impl From<Vec<u8>> for WireValue {
    fn from(bytes: Vec<u8>) -> Self {
        WireValue::Bytes(bytes)
    }
}

impl TryFrom<WireValue> for Ballot {
    type Error = Error;

    fn try_from(value: WireValue) -> Result<Self, Error> {
        match value {
            WireValue::Ballot(ballot) => Ok(ballot),
            other => Err(Error::UnsupportedType(format!("{} is not a ballot", other.tag()))),
        }
    }
}

impl TryFrom<WireValue> for HybridCiphertext {
    type Error = Error;

    fn try_from(value: WireValue) -> Result<Self, Error> {
        match value {
            WireValue::Hybrid(ciphertext) => Ok(ciphertext),
            other => Err(Error::UnsupportedType(format!(
                "{} is not a hybrid ciphertext",
                other.tag()
            ))),
        }
    }
}

impl TryFrom<WireValue> for Vec<u8> {
    type Error = Error;

    fn try_from(value: WireValue) -> Result<Self, Error> {
        match value {
            WireValue::Bytes(bytes) => Ok(bytes),
            other => Err(Error::UnsupportedType(format!("{} is not raw bytes", other.tag()))),
        }
    }
}

impl From<SignedBatch> for WireValue {
    fn from(envelope: SignedBatch) -> Self {
        WireValue::signed(WireValue::Batch(envelope.payload), envelope.signature)
    }
}

impl TryFrom<WireValue> for SignedBatch {
    type Error = Error;

    fn try_from(value: WireValue) -> Result<Self, Error> {
        match value {
            WireValue::Signed(signed) => match *signed {
                Signed {
                    payload: WireValue::Batch(batch),
                    signature,
                } => Ok(Signed::new(batch, signature)),
                other => Err(Error::UnsupportedType(format!(
                    "signed {} is not a signed batch",
                    other.payload.tag()
                ))),
            },
            other => Err(Error::UnsupportedType(format!(
                "{} is not a signed batch",
                other.tag()
            ))),
        }
    }
}
