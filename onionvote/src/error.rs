use thiserror::Error;

/// Failures of the cryptographic primitives
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("onionvote: hybrid encryption failed: {0}")]
    EncryptionFailure(&'static str),

    #[error("onionvote: hybrid decryption failed: {0}")]
    DecryptionFailure(&'static str),

    #[error("onionvote: message hash does not fit the signature group")]
    InvalidInput,

    #[error("onionvote: key generation failed: {0}")]
    KeyGeneration(String),
}

/// Protocol errors
///
/// Every round operation returns one of these on failure. None of them is
/// recoverable: the orchestrator must stop the run on the first one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("onionvote: {0}")]
    Crypto(#[from] CryptoError),

    #[error("onionvote: expected {expected} ballots in the round, found {found}")]
    MalformedRound { expected: usize, found: usize },

    #[error("onionvote: the ballot of voter {0} was not found")]
    BallotNotFound(String),

    #[error("onionvote: the ballot of voter {0} was changed")]
    BallotTampered(String),

    #[error("onionvote: signature of voter {0} is not authentic")]
    SignatureInvalid(String),

    #[error("onionvote: unsupported wire type: {0}")]
    UnsupportedType(String),

    #[error("onionvote: malformed {kind} encoding: need {expected} bytes, found {found}")]
    MalformedEncoding {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("onionvote: candidate {0} was not found")]
    UnknownCandidate(i32),

    #[error("onionvote: no voter at roster index {0}")]
    UnknownVoter(usize),

    #[error("onionvote: voter {0} acted out of turn")]
    OutOfTurn(String),
}
