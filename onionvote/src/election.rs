//! The voting protocol state machine.
//!
//! An [`Election`] owns every voter of a run together with each voter's
//! [`VerificationTrail`]. A run goes through four phases, each driven by one
//! call per voter in roster order:
//!
//!  1. `prepare_ballot`: every voter seals its ballot in `2N` layers.
//!  2. `decrypt`: voter `k` peels one layer off every ballot, checks its own
//!     ballot is intact, strips the per-layer padding and shuffles.
//!  3. `decrypt_and_sign` / `verify_decrypt_and_sign`: voter `k` checks the
//!     previous voter's signature, peels one more layer, checks its own ballot
//!     and signs the shuffled result.
//!  4. `complete_voting`: every voter checks the last voter's signature, finds
//!     its own plaintext ballot and tallies.
//!
//! Self-checks run against peeked trail entries. Trails are only popped once a
//! round has fully succeeded, so a failed call leaves the election unchanged.

use crate::codec::{decode_ballot, decode_hybrid, encode_ballot, encode_hybrid};
use crate::constants::PADDING_SIZE;
use crate::hybrid;
use crate::*;
use rand::seq::SliceRandom;
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Coordinator of one voting run
pub struct Election<R: RngCore + CryptoRng = ChaCha20Rng> {
    candidates: Vec<Candidate>,
    voters: Vec<Voter>,
    trails: Vec<VerificationTrail>,

    /// Set once the last voter has signed, cleared by `prepare_ballot`
    tally_open: bool,

    rng: R,
}

impl Election<ChaCha20Rng> {
    /// Create a new election seeded from the operating system's entropy source
    pub fn new(candidates: Vec<Candidate>, voters: Vec<Voter>) -> Self {
        Election::with_rng(candidates, voters, ChaCha20Rng::from_entropy())
    }
}

impl<R: RngCore + CryptoRng> Election<R> {
    pub fn with_rng(candidates: Vec<Candidate>, voters: Vec<Voter>, rng: R) -> Self {
        let trails = voters
            .iter()
            .map(|_| VerificationTrail::with_capacity(voters.len()))
            .collect();

        Election {
            candidates,
            voters,
            trails,
            tally_open: false,
            rng,
        }
    }

    /// The roster, in turn order
    pub fn voters(&self) -> &[Voter] {
        &self.voters
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Get the verification trail of the voter at the given roster index
    pub fn trail(&self, voter: usize) -> Option<&VerificationTrail> {
        self.trails.get(voter)
    }

    /// Seal a ballot for the given voter.
    ///
    /// The ballot is first wrapped once under every roster member's key, last
    /// member innermost. A second set of layers is then added in the same
    /// order, each one carrying a fresh padding so its owner can recognise it.
    pub fn prepare_ballot(&mut self, voter: usize, candidate_id: i32) -> Result<Vec<u8>, Error> {
        let name = self.voter(voter)?.name().to_string();
        let last = self.voters.len() - 1;
        let mut trail = VerificationTrail::with_capacity(self.voters.len());

        let mut bytes = encode_ballot(&Ballot::new(candidate_id));
        trail.record_snapshot(bytes.clone());
        let padding = fresh_padding(&mut self.rng);
        bytes.extend_from_slice(&padding);
        trail.record_padding(padding);

        for member in self.voters.iter().rev() {
            let ciphertext = hybrid::encrypt(&mut self.rng, &bytes, member.encryption_public())?;
            bytes = encode_hybrid(&ciphertext);
            trail.record_snapshot(bytes.clone());
        }

        for (index, member) in self.voters.iter().enumerate().rev() {
            let padding = fresh_padding(&mut self.rng);
            // The innermost padded layer wraps the last snapshot recorded above
            if index != last {
                trail.record_snapshot(bytes.clone());
            }
            bytes.extend_from_slice(&padding);
            trail.record_padding(padding);

            let ciphertext = hybrid::encrypt(&mut self.rng, &bytes, member.encryption_public())?;
            bytes = encode_hybrid(&ciphertext);
        }

        log::debug!(
            "{} prepared a ballot of {} bytes: {}..",
            name,
            bytes.len(),
            hex::encode(&bytes[..bytes.len().min(8)])
        );

        self.trails[voter] = trail;
        self.tally_open = false;
        Ok(bytes)
    }

    /// Peel one layer off every ballot, as voter `voter` of the first `N` rounds.
    pub fn decrypt(&mut self, voter: usize, ballots: &[Vec<u8>]) -> Result<Vec<Vec<u8>>, Error> {
        let n = self.voters.len();
        let name = self.voter(voter)?.name().to_string();
        self.expect_count(ballots)?;
        self.expect_depth(voter, n + 1 - voter, 2 * n - voter)?;

        let mut peeled = self.peel(voter, ballots)?;

        {
            let trail = &self.trails[voter];
            let padding = trail.peek_padding().unwrap_or_default();
            let snapshot = trail.peek_snapshot().unwrap_or_default();

            let own = locate_own(&peeled, padding).ok_or_else(|| {
                log::warn!("{} could not find its ballot in peel round {}", name, voter);
                Error::BallotNotFound(name.clone())
            })?;
            if strip_padding(own)? != snapshot {
                log::warn!("{} found its ballot altered in peel round {}", name, voter);
                return Err(Error::BallotTampered(name));
            }
        }

        for entry in peeled.iter_mut() {
            let len = strip_padding(entry)?.len();
            entry.truncate(len);
        }
        mix(&mut self.rng, &mut peeled);

        for trail in self.trails.iter_mut() {
            trail.pop_padding();
            trail.pop_snapshot();
        }

        log::debug!("{} peeled {} ballots", name, peeled.len());
        Ok(peeled)
    }

    /// Open the signing rounds: the first voter peels and signs.
    pub fn decrypt_and_sign(&mut self, voter: usize, ballots: &[Vec<u8>]) -> Result<SignedBatch, Error> {
        let name = self.voter(voter)?.name().to_string();
        if voter != 0 {
            return Err(Error::OutOfTurn(name));
        }
        self.expect_count(ballots)?;
        self.expect_signing_turn(voter)?;
        self.sign_round(voter, ballots)
    }

    /// Continue the signing rounds from the previous voter's signed batch.
    pub fn verify_decrypt_and_sign(
        &mut self,
        voter: usize,
        envelope: &SignedBatch,
    ) -> Result<SignedBatch, Error> {
        let name = self.voter(voter)?.name().to_string();
        if voter == 0 {
            return Err(Error::OutOfTurn(name));
        }

        let previous = &self.voters[voter - 1];
        if !envelope.verify_signature(previous.verifying_key()) {
            log::warn!("{} rejected the signature of {}", name, previous.name());
            return Err(Error::SignatureInvalid(previous.name().to_string()));
        }

        self.expect_count(&envelope.payload)?;
        self.expect_signing_turn(voter)?;
        self.sign_round(voter, &envelope.payload)
    }

    /// Check the final signed batch, find the voter's own ballot and tally.
    pub fn complete_voting(&mut self, voter: usize, envelope: &SignedBatch) -> Result<VotingResults, Error> {
        let name = self.voter(voter)?.name().to_string();
        if !self.tally_open || !self.trails[voter].is_at(1, 1) {
            return Err(Error::OutOfTurn(name));
        }

        let signer = &self.voters[self.voters.len() - 1];
        if !envelope.verify_signature(signer.verifying_key()) {
            log::warn!("{} rejected the final signature of {}", name, signer.name());
            return Err(Error::SignatureInvalid(signer.name().to_string()));
        }

        let ballots = &envelope.payload;
        self.expect_count(ballots)?;

        {
            let trail = &self.trails[voter];
            let padding = trail.peek_padding().unwrap_or_default();
            let snapshot = trail.peek_snapshot().unwrap_or_default();

            let own = locate_own(ballots, padding).ok_or_else(|| {
                log::warn!("{} could not find its ballot in the final batch", name);
                Error::BallotNotFound(name.clone())
            })?;
            if strip_padding(own)? != snapshot {
                log::warn!("{} found its ballot altered in the final batch", name);
                return Err(Error::BallotTampered(name));
            }
        }

        let mut results = VotingResults::seeded(&self.candidates);
        for entry in ballots {
            results.record(decode_ballot(strip_padding(entry)?)?)?;
        }

        let trail = &mut self.trails[voter];
        trail.pop_padding();
        trail.pop_snapshot();

        log::debug!("{} tallied {} ballots", name, results.total_votes());
        Ok(results)
    }

    fn sign_round(&mut self, voter: usize, ballots: &[Vec<u8>]) -> Result<SignedBatch, Error> {
        let last = voter == self.voters.len() - 1;
        let name = self.voters[voter].name().to_string();

        let mut peeled = self.peel(voter, ballots)?;

        let found = {
            let trail = &self.trails[voter];
            let snapshot = trail.peek_snapshot().unwrap_or_default();
            if last {
                // The innermost layer still carries the padding of `prepare_ballot`
                let padding = trail.peek_padding().unwrap_or_default();
                peeled.iter().any(|entry| {
                    entry.len() == snapshot.len() + padding.len()
                        && entry.starts_with(snapshot)
                        && entry.ends_with(padding)
                })
            } else {
                peeled.iter().any(|entry| entry.as_slice() == snapshot)
            }
        };
        if !found {
            log::warn!("{} could not find its ballot in signing round {}", name, voter);
            return Err(Error::BallotNotFound(name));
        }

        mix(&mut self.rng, &mut peeled);
        let signed = SignedBatch::sign(&mut self.rng, self.voters[voter].signing_key(), peeled)?;

        if last {
            self.tally_open = true;
        } else {
            for trail in self.trails.iter_mut() {
                trail.pop_snapshot();
            }
        }

        log::debug!("{} signed {} ballots", name, signed.payload.len());
        Ok(signed)
    }

    fn peel(&self, voter: usize, ballots: &[Vec<u8>]) -> Result<Vec<Vec<u8>>, Error> {
        let key = self.voters[voter].encryption_key();
        ballots
            .iter()
            .map(|bytes| {
                let ciphertext = decode_hybrid(bytes)?;
                Ok(hybrid::decrypt(&ciphertext, key)?)
            })
            .collect()
    }

    fn voter(&self, voter: usize) -> Result<&Voter, Error> {
        self.voters.get(voter).ok_or(Error::UnknownVoter(voter))
    }

    fn expect_count(&self, ballots: &[Vec<u8>]) -> Result<(), Error> {
        if ballots.len() != self.voters.len() {
            return Err(Error::MalformedRound {
                expected: self.voters.len(),
                found: ballots.len(),
            });
        }
        Ok(())
    }

    fn expect_signing_turn(&self, voter: usize) -> Result<(), Error> {
        if self.tally_open {
            return Err(Error::OutOfTurn(self.voters[voter].name().to_string()));
        }
        self.expect_depth(voter, 1, self.voters.len() - voter)
    }

    /// Every trail must sit at the given depths for `voter` to take its turn
    fn expect_depth(&self, voter: usize, padding: usize, snapshot: usize) -> Result<(), Error> {
        if self.trails.iter().all(|trail| trail.is_at(padding, snapshot)) {
            Ok(())
        } else {
            Err(Error::OutOfTurn(self.voters[voter].name().to_string()))
        }
    }
}

fn fresh_padding<R: RngCore>(rng: &mut R) -> Vec<u8> {
    let mut padding = vec![0u8; PADDING_SIZE];
    rng.fill_bytes(&mut padding);
    padding
}

fn locate_own<'a>(entries: &'a [Vec<u8>], padding: &[u8]) -> Option<&'a [u8]> {
    entries
        .iter()
        .find(|entry| entry.len() >= PADDING_SIZE && entry.ends_with(padding))
        .map(|entry| entry.as_slice())
}

fn strip_padding(entry: &[u8]) -> Result<&[u8], Error> {
    if entry.len() < PADDING_SIZE {
        return Err(Error::MalformedEncoding {
            kind: "padded ballot",
            expected: PADDING_SIZE,
            found: entry.len(),
        });
    }
    Ok(&entry[..entry.len() - PADDING_SIZE])
}

/// Shuffle a batch so output positions say nothing about input positions
fn mix<R: RngCore>(rng: &mut R, batch: &mut [Vec<u8>]) {
    batch.shuffle(rng);
}
