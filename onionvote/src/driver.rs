use crate::*;
use rand::{CryptoRng, RngCore};
use std::fmt;

/// A step of a run, as seen by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Round {
    Prepare,
    Peel(usize),
    Sign(usize),
    Complete,
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Round::Prepare => write!(f, "ballot preparation"),
            Round::Peel(k) => write!(f, "peel round {}", k),
            Round::Sign(k) => write!(f, "signing round {}", k),
            Round::Complete => write!(f, "tally"),
        }
    }
}

/// The first failure of a run, with the voter and round it happened in
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("onionvote: voter {voter} failed in {round}: {source}")]
pub struct RoundFailure {
    pub voter: usize,
    pub round: Round,
    pub source: Error,
}

/// Drive a full run in process, one ballot choice per voter.
///
/// Returns every voter's results in roster order.
pub fn run_election<R: RngCore + CryptoRng>(
    election: &mut Election<R>,
    choices: &[i32],
) -> Result<Vec<VotingResults>, RoundFailure> {
    run_election_with(election, choices, |_, _| {})
}

/// Drive a full run, handing every batch to `transport` before it reaches the next voter.
///
/// `transport` stands in for the network: it may reorder, drop or alter entries.
/// After signing rounds it only sees the payload; the signature travels untouched.
pub fn run_election_with<R, F>(
    election: &mut Election<R>,
    choices: &[i32],
    mut transport: F,
) -> Result<Vec<VotingResults>, RoundFailure>
where
    R: RngCore + CryptoRng,
    F: FnMut(Round, &mut Vec<Vec<u8>>),
{
    let n = election.voters().len();
    if choices.len() != n {
        return Err(RoundFailure {
            voter: choices.len().min(n),
            round: Round::Prepare,
            source: Error::MalformedRound {
                expected: n,
                found: choices.len(),
            },
        });
    }

    let mut batch = Vec::with_capacity(n);
    for (voter, choice) in choices.iter().enumerate() {
        let ballot = election
            .prepare_ballot(voter, *choice)
            .map_err(failed(voter, Round::Prepare))?;
        batch.push(ballot);
    }
    transport(Round::Prepare, &mut batch);

    for voter in 0..n {
        let round = Round::Peel(voter);
        batch = election.decrypt(voter, &batch).map_err(failed(voter, round))?;
        transport(round, &mut batch);
    }

    let mut envelope: Option<SignedBatch> = None;
    for voter in 0..n {
        let round = Round::Sign(voter);
        let signed = match &envelope {
            None => election.decrypt_and_sign(voter, &batch),
            Some(previous) => election.verify_decrypt_and_sign(voter, previous),
        };
        let mut signed = signed.map_err(failed(voter, round))?;
        transport(round, &mut signed.payload);
        envelope = Some(signed);
    }

    let envelope = match envelope {
        Some(envelope) => envelope,
        None => return Ok(vec![]),
    };

    let mut results = Vec::with_capacity(n);
    for voter in 0..n {
        let result = election
            .complete_voting(voter, &envelope)
            .map_err(failed(voter, Round::Complete))?;
        log::info!(
            "{} counted {} ballots",
            election.voters()[voter].name(),
            result.total_votes()
        );
        results.push(result);
    }

    Ok(results)
}

fn failed(voter: usize, round: Round) -> impl FnOnce(Error) -> RoundFailure {
    move |source| {
        log::error!("voter {} failed in {}: {}", voter, round, source);
        RoundFailure {
            voter,
            round,
            source,
        }
    }
}
