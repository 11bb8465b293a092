use crate::*;
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CandidateResult {
    pub candidate: Candidate,
    pub votes: u32,
}

/// The outcome of a run as computed by one voter.
///
/// Voters tally independently; two results compare equal only if both the
/// per-candidate counts and the revealed ballot sequence match.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VotingResults {
    pub candidates: BTreeMap<i32, CandidateResult>,
    pub ballots: Vec<Ballot>,
}

impl VotingResults {
    /// Start a tally with zero votes for every candidate
    pub fn seeded(candidates: &[Candidate]) -> Self {
        let candidates = candidates
            .iter()
            .map(|candidate| {
                (
                    candidate.id,
                    CandidateResult {
                        candidate: candidate.clone(),
                        votes: 0,
                    },
                )
            })
            .collect();

        VotingResults {
            candidates,
            ballots: vec![],
        }
    }

    /// Count one revealed ballot
    pub fn record(&mut self, ballot: Ballot) -> Result<(), Error> {
        let result = self
            .candidates
            .get_mut(&ballot.candidate_id)
            .ok_or(Error::UnknownCandidate(ballot.candidate_id))?;
        result.votes += 1;
        self.ballots.push(ballot);
        Ok(())
    }

    pub fn votes_for(&self, candidate_id: i32) -> Option<u32> {
        self.candidates.get(&candidate_id).map(|result| result.votes)
    }

    pub fn total_votes(&self) -> usize {
        self.ballots.len()
    }

    /// Candidates ordered by descending vote count, ties broken by id
    pub fn ranked(&self) -> Vec<&CandidateResult> {
        let mut ranked: Vec<&CandidateResult> = self.candidates.values().collect();
        ranked.sort_by(|a, b| b.votes.cmp(&a.votes).then(a.candidate.id.cmp(&b.candidate.id)));
        ranked
    }
}
