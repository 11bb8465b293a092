use super::*;
use crate::codec::{decode_ballot, decode_hybrid, encode_hybrid};
use crate::constants::*;
use crate::keygen::generate_signing_keypair;
use lazy_static::lazy_static;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rsa::RsaPrivateKey;
use std::convert::TryFrom;

const NAMES: [&str; 4] = [
    "Jasper Lambert",
    "Jonty Levine",
    "Nathaniel Middleton",
    "Nathan Bass",
];

lazy_static! {
    // RSA key generation dominates test time, so every test shares one pool
    static ref ENCRYPTION_KEYS: Vec<RsaPrivateKey> = {
        let mut rng = ChaCha20Rng::seed_from_u64(0x5eed);
        (0..NAMES.len())
            .map(|_| RsaPrivateKey::new(&mut rng, ENCRYPTION_KEY_BITS).unwrap())
            .collect()
    };
}

/// A 1024-bit encryption key from the shared pool
pub fn encryption_key(index: usize) -> RsaPrivateKey {
    ENCRYPTION_KEYS[index % ENCRYPTION_KEYS.len()].clone()
}

pub fn rng() -> ChaCha20Rng {
    ChaCha20Rng::from_entropy()
}

fn voters(n: usize) -> Vec<Voter> {
    let mut rng = ChaCha20Rng::seed_from_u64(n as u64);
    (0..n)
        .map(|i| {
            let (signing_key, _) = generate_signing_keypair(&mut rng);
            Voter::new(NAMES[i], signing_key, encryption_key(i))
        })
        .collect()
}

fn candidates() -> Vec<Candidate> {
    vec![
        Candidate::new(1, "Ishaan Allison"),
        Candidate::new(2, "Oliver Mendez"),
    ]
}

fn election(n: usize) -> Election {
    Election::with_rng(candidates(), voters(n), rng())
}

fn assert_depths(election: &Election, padding: usize, snapshot: usize) {
    for (i, _) in election.voters().iter().enumerate() {
        let trail = election.trail(i).unwrap();
        assert_eq!(
            (trail.padding_depth(), trail.snapshot_depth()),
            (padding, snapshot),
            "trail of voter {}",
            i
        );
    }
}

#[test]
fn end_to_end_two_voters() {
    let mut election = election(2);
    let results = run_election(&mut election, &[1, 2]).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0], results[1]);
    assert_eq!(results[0].votes_for(1), Some(1));
    assert_eq!(results[0].votes_for(2), Some(1));
    assert_depths(&election, 0, 0);
}

#[test]
fn end_to_end_demo_roster() {
    let mut election = election(4);
    let results = run_election(&mut election, &[1, 1, 2, 1]).unwrap();

    for result in &results {
        assert_eq!(result, &results[0]);
    }
    assert_eq!(results[0].votes_for(1), Some(3));
    assert_eq!(results[0].votes_for(2), Some(1));

    let ranked: Vec<&str> = results[0]
        .ranked()
        .iter()
        .map(|r| r.candidate.name.as_str())
        .collect();
    assert_eq!(ranked, vec!["Ishaan Allison", "Oliver Mendez"]);
}

#[test]
fn end_to_end_single_voter() {
    let mut election = election(1);
    let results = run_election(&mut election, &[2]).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].votes_for(1), Some(0));
    assert_eq!(results[0].votes_for(2), Some(1));
    assert_eq!(results[0].ballots, vec![Ballot::new(2)]);
}

#[test]
fn trail_depths_follow_rounds() {
    let n = 3;
    let mut election = election(n);

    let mut batch: Vec<Vec<u8>> = (0..n)
        .map(|i| election.prepare_ballot(i, 1).unwrap())
        .collect();

    for k in 0..n {
        assert_depths(&election, n + 1 - k, 2 * n - k);
        let before = batch[0].len();
        batch = election.decrypt(k, &batch).unwrap();
        assert_eq!(batch.len(), n);
        assert!(batch.iter().all(|entry| entry.len() < before));
    }

    assert_depths(&election, 1, n);
    let mut envelope = election.decrypt_and_sign(0, &batch).unwrap();
    for k in 1..n {
        assert_depths(&election, 1, n - k);
        envelope = election.verify_decrypt_and_sign(k, &envelope).unwrap();
    }
    assert_depths(&election, 1, 1);

    for i in 0..n {
        let results = election.complete_voting(i, &envelope).unwrap();
        assert_eq!(results.votes_for(1), Some(n as u32));
        assert!(election.trail(i).unwrap().is_at(0, 0));
    }
}

#[test]
fn innermost_layers_follow_reverse_roster() {
    let n = 2;
    let mut election = election(n);
    let mut bytes = election.prepare_ballot(0, 2).unwrap();

    let peel = |bytes: &[u8], voter: usize| -> Vec<u8> {
        let ciphertext = decode_hybrid(bytes).unwrap();
        hybrid::decrypt(&ciphertext, &encryption_key(voter)).unwrap()
    };

    // Padded layers, outermost first
    for voter in 0..n {
        bytes = peel(&bytes, voter);
        bytes.truncate(bytes.len() - PADDING_SIZE);
    }

    // The first voter's key wraps everything else; the last voter's key is innermost
    let ciphertext = decode_hybrid(&bytes).unwrap();
    assert!(hybrid::decrypt(&ciphertext, &encryption_key(1)).is_err());

    bytes = peel(&bytes, 0);
    bytes = peel(&bytes, 1);
    assert_eq!(bytes.len(), BALLOT_SIZE + PADDING_SIZE);
    assert_eq!(decode_ballot(&bytes[..BALLOT_SIZE]).unwrap(), Ballot::new(2));
}

#[test]
fn missing_ballot_breaks_next_round() {
    let n = 3;
    let rounds = vec![Round::Prepare, Round::Peel(0), Round::Peel(1), Round::Peel(2)];
    let expected = vec![Round::Peel(0), Round::Peel(1), Round::Peel(2), Round::Sign(0)];

    for (dropped_at, failing) in rounds.into_iter().zip(expected) {
        let mut election = election(n);
        let failure = run_election_with(&mut election, &[1, 2, 1], |round, batch| {
            if round == dropped_at {
                batch.remove(0);
            }
        })
        .unwrap_err();

        assert_eq!(failure.round, failing);
        assert_eq!(
            failure.source,
            Error::MalformedRound {
                expected: n,
                found: n - 1
            }
        );
    }
}

#[test]
fn wrong_number_of_choices() {
    let mut election = election(2);
    let failure = run_election(&mut election, &[1]).unwrap_err();
    assert_eq!(failure.round, Round::Prepare);
    assert_eq!(
        failure.source,
        Error::MalformedRound {
            expected: 2,
            found: 1
        }
    );
}

#[test]
fn owner_detects_altered_ballot() {
    let mut election = election(2);
    let failure = run_election_with(&mut election, &[1, 2], |round, batch| {
        if round == Round::Prepare {
            // First byte of the symmetric body; the CBC padding block stays intact
            batch[0][WRAPPED_KEY_SIZE] ^= 0x01;
        }
    })
    .unwrap_err();

    assert_eq!(failure.voter, 0);
    assert_eq!(failure.round, Round::Peel(0));
    assert_eq!(failure.source, Error::BallotTampered(NAMES[0].to_string()));
}

#[test]
fn failed_round_leaves_trails_untouched() {
    let mut election = election(2);
    let mut batch: Vec<Vec<u8>> = (0..2)
        .map(|i| election.prepare_ballot(i, 1).unwrap())
        .collect();
    batch[0][WRAPPED_KEY_SIZE] ^= 0x80;

    assert_eq!(
        election.decrypt(0, &batch),
        Err(Error::BallotTampered(NAMES[0].to_string()))
    );
    assert_depths(&election, 3, 4);
}

#[test]
fn owner_detects_substituted_ballot() {
    let mut election = election(2);
    let mut batch: Vec<Vec<u8>> = (0..2)
        .map(|i| election.prepare_ballot(i, 1).unwrap())
        .collect();
    let recipient = election.voters()[0].encryption_public().clone();
    let mut rng = rng();

    // An entry that decrypts fine but carries none of the owner's paddings
    let forged = hybrid::encrypt(&mut rng, &[5u8; 200], &recipient).unwrap();
    batch[0] = encode_hybrid(&forged);
    assert_eq!(
        election.decrypt(0, &batch),
        Err(Error::BallotNotFound(NAMES[0].to_string()))
    );

    // The right padding around the wrong content
    let mut payload = vec![5u8; 200];
    payload.extend_from_slice(election.trail(0).unwrap().peek_padding().unwrap());
    let forged = hybrid::encrypt(&mut rng, &payload, &recipient).unwrap();
    batch[0] = encode_hybrid(&forged);
    assert_eq!(
        election.decrypt(0, &batch),
        Err(Error::BallotTampered(NAMES[0].to_string()))
    );

    assert_depths(&election, 3, 4);
}

#[test]
fn broken_signature_chain() {
    let mut election = election(2);
    let failure = run_election_with(&mut election, &[1, 2], |round, batch| {
        if round == Round::Sign(0) {
            batch.swap(0, 1);
        }
    })
    .unwrap_err();

    assert_eq!(failure.voter, 1);
    assert_eq!(failure.round, Round::Sign(1));
    assert_eq!(failure.source, Error::SignatureInvalid(NAMES[0].to_string()));
}

#[test]
fn broken_final_signature() {
    let mut election = election(2);
    let failure = run_election_with(&mut election, &[1, 2], |round, batch| {
        if round == Round::Sign(1) {
            batch[1].push(0);
        }
    })
    .unwrap_err();

    assert_eq!(failure.voter, 0);
    assert_eq!(failure.round, Round::Complete);
    assert_eq!(failure.source, Error::SignatureInvalid(NAMES[1].to_string()));
}

#[test]
fn unknown_candidate_fails_tally() {
    let mut election = election(2);
    let failure = run_election(&mut election, &[1, 9]).unwrap_err();

    assert_eq!(failure.round, Round::Complete);
    assert_eq!(failure.source, Error::UnknownCandidate(9));
}

#[test]
fn out_of_turn_calls_are_rejected() {
    let mut election = election(2);
    let first = election.prepare_ballot(0, 1).unwrap();

    // Not every voter has prepared yet
    assert_eq!(
        election.decrypt(0, &[first.clone(), first.clone()]),
        Err(Error::OutOfTurn(NAMES[0].to_string()))
    );

    let second = election.prepare_ballot(1, 2).unwrap();
    let batch = vec![first, second];

    assert_eq!(
        election.decrypt(1, &batch),
        Err(Error::OutOfTurn(NAMES[1].to_string()))
    );
    assert_eq!(
        election.decrypt_and_sign(0, &batch).unwrap_err(),
        Error::OutOfTurn(NAMES[0].to_string())
    );
    assert_eq!(election.decrypt(2, &batch), Err(Error::UnknownVoter(2)));
    assert_depths(&election, 3, 4);

    let batch = election.decrypt(0, &batch).unwrap();
    let batch = election.decrypt(1, &batch).unwrap();

    assert_eq!(
        election.decrypt_and_sign(1, &batch).unwrap_err(),
        Error::OutOfTurn(NAMES[1].to_string())
    );
    let opening = election.decrypt_and_sign(0, &batch).unwrap();

    assert_eq!(
        election.verify_decrypt_and_sign(0, &opening).unwrap_err(),
        Error::OutOfTurn(NAMES[0].to_string())
    );
    assert_eq!(
        election.complete_voting(0, &opening).unwrap_err(),
        Error::OutOfTurn(NAMES[0].to_string())
    );

    let envelope = election.verify_decrypt_and_sign(1, &opening).unwrap();
    assert_eq!(
        election.verify_decrypt_and_sign(1, &opening).unwrap_err(),
        Error::OutOfTurn(NAMES[1].to_string())
    );

    let results = election.complete_voting(0, &envelope).unwrap();
    assert_eq!(
        election.complete_voting(0, &envelope).unwrap_err(),
        Error::OutOfTurn(NAMES[0].to_string())
    );
    assert_eq!(election.complete_voting(1, &envelope).unwrap(), results);
}

#[test]
fn complete_voting_checks_batch_size() {
    let mut election = election(2);
    let mut batch: Vec<Vec<u8>> = (0..2)
        .map(|i| election.prepare_ballot(i, 1).unwrap())
        .collect();
    for k in 0..2 {
        batch = election.decrypt(k, &batch).unwrap();
    }
    let envelope = election.decrypt_and_sign(0, &batch).unwrap();
    let envelope = election.verify_decrypt_and_sign(1, &envelope).unwrap();

    // Correctly signed by the last voter, but one ballot short
    let mut short = envelope.into_inner();
    short.pop();
    let short = SignedBatch::sign(&mut rng(), election.voters()[1].signing_key(), short).unwrap();

    assert_eq!(
        election.complete_voting(0, &short).unwrap_err(),
        Error::MalformedRound {
            expected: 2,
            found: 1
        }
    );
    assert!(election.trail(0).unwrap().is_at(1, 1));
}

#[test]
fn short_batch_is_malformed_for_every_voter() {
    let n = 3;
    let mut election = election(n);
    let batch: Vec<Vec<u8>> = (0..n)
        .map(|i| election.prepare_ballot(i, 1).unwrap())
        .collect();
    let short = Error::MalformedRound {
        expected: n,
        found: n - 1,
    };

    for k in 0..n {
        assert_eq!(election.decrypt(k, &batch[..n - 1]).unwrap_err(), short, "voter {}", k);
    }
    assert_eq!(
        election.decrypt_and_sign(0, &batch[..n - 1]).unwrap_err(),
        short
    );
    assert_depths(&election, n + 1, 2 * n);
}

/// Flip the first byte of every entry's symmetric body.
///
/// The CBC padding block stays intact, so every entry still decrypts but the
/// head of the revealed layer is garbled.
fn garble_all(batch: &mut [Vec<u8>]) {
    for entry in batch.iter_mut() {
        entry[WRAPPED_KEY_SIZE] ^= 0x01;
    }
}

#[test]
fn owner_detects_ballot_altered_between_peel_rounds() {
    let mut election = election(3);
    let failure = run_election_with(&mut election, &[1, 2, 1], |round, batch| {
        if round == Round::Peel(0) {
            garble_all(batch);
        }
    })
    .unwrap_err();

    assert_eq!(failure.voter, 1);
    assert_eq!(failure.round, Round::Peel(1));
    assert_eq!(failure.source, Error::BallotTampered(NAMES[1].to_string()));
}

#[test]
fn owner_misses_ballot_altered_before_signing() {
    let mut election = election(3);
    let failure = run_election_with(&mut election, &[1, 2, 1], |round, batch| {
        if round == Round::Peel(2) {
            garble_all(batch);
        }
    })
    .unwrap_err();

    assert_eq!(failure.voter, 0);
    assert_eq!(failure.round, Round::Sign(0));
    assert_eq!(failure.source, Error::BallotNotFound(NAMES[0].to_string()));
}

#[test]
fn last_signer_misses_its_altered_ballot() {
    let n = 2;
    let mut election = election(n);
    let mut batch: Vec<Vec<u8>> = (0..n)
        .map(|i| election.prepare_ballot(i, 1).unwrap())
        .collect();
    for k in 0..n {
        batch = election.decrypt(k, &batch).unwrap();
    }
    let opening = election.decrypt_and_sign(0, &batch).unwrap();

    // Find the last voter's entry by the padding it recorded at preparation
    let padding = election.trail(1).unwrap().peek_padding().unwrap().to_vec();
    let mut ballots = opening.into_inner();
    let own = ballots
        .iter()
        .position(|entry| {
            let ciphertext = decode_hybrid(entry).unwrap();
            hybrid::decrypt(&ciphertext, &encryption_key(1))
                .unwrap()
                .ends_with(&padding)
        })
        .unwrap();
    ballots[own][WRAPPED_KEY_SIZE] ^= 0x01;

    // A batch the first voter really signed, with only the last voter's entry changed
    let altered = SignedBatch::sign(&mut rng(), election.voters()[0].signing_key(), ballots).unwrap();
    assert_eq!(
        election.verify_decrypt_and_sign(1, &altered).unwrap_err(),
        Error::BallotNotFound(NAMES[1].to_string())
    );
    assert_depths(&election, 1, 1);

    // The untouched envelope still goes through
    let mut untouched = altered.into_inner();
    untouched[own][WRAPPED_KEY_SIZE] ^= 0x01;
    let untouched = SignedBatch::sign(&mut rng(), election.voters()[0].signing_key(), untouched).unwrap();
    assert!(election.verify_decrypt_and_sign(1, &untouched).is_ok());
}

#[test]
fn envelopes_travel_as_bytes() {
    let n = 2;
    let mut election = election(n);
    let mut batch: Vec<Vec<u8>> = (0..n)
        .map(|i| election.prepare_ballot(i, 2).unwrap())
        .collect();
    for k in 0..n {
        batch = election.decrypt(k, &batch).unwrap();
    }

    let tag = WireTag::Signed(Box::new(WireTag::Batch));
    let send = |envelope: SignedBatch| codec::encode(&envelope.into()).unwrap();
    let receive = |bytes: &[u8]| SignedBatch::try_from(codec::decode(&tag, bytes).unwrap()).unwrap();

    let mut envelope = election.decrypt_and_sign(0, &batch).unwrap();
    for k in 1..n {
        let bytes = send(envelope);
        envelope = election.verify_decrypt_and_sign(k, &receive(&bytes)).unwrap();
    }

    let bytes = send(envelope);
    for i in 0..n {
        let received = receive(&bytes);
        let results = election.complete_voting(i, &received).unwrap();
        assert_eq!(results.votes_for(2), Some(n as u32));
    }
}
