use anyhow::{anyhow, bail, Context, Result};
use onionvote::{Candidate, Election, Voter};
use std::env::var;

const DEFAULT_VOTERS: [&str; 4] = [
    "Jasper Lambert",
    "Jonty Levine",
    "Nathaniel Middleton",
    "Nathan Bass",
];

const DEFAULT_CANDIDATES: [(i32, &str); 2] = [(1, "Ishaan Allison"), (2, "Oliver Mendez")];

const DEFAULT_CHOICES: [i32; 4] = [1, 1, 2, 1];

/// The roster, candidates and ballot choices of a demo run.
///
/// Read from the environment:
///  - `ONIONVOTE_VOTERS`: comma separated voter names
///  - `ONIONVOTE_CANDIDATES`: comma separated `id:name` pairs
///  - `ONIONVOTE_CHOICES`: comma separated candidate ids, one per voter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub voters: Vec<String>,
    pub candidates: Vec<Candidate>,
    pub choices: Vec<i32>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let voters = match var("ONIONVOTE_VOTERS") {
            Ok(val) => parse_voters(&val)?,
            Err(_e) => DEFAULT_VOTERS.iter().map(|name| name.to_string()).collect(),
        };

        let candidates = match var("ONIONVOTE_CANDIDATES") {
            Ok(val) => parse_candidates(&val)?,
            Err(_e) => DEFAULT_CANDIDATES
                .iter()
                .map(|(id, name)| Candidate::new(*id, *name))
                .collect(),
        };

        let choices = match var("ONIONVOTE_CHOICES") {
            Ok(val) => parse_choices(&val)?,
            Err(_e) => DEFAULT_CHOICES.to_vec(),
        };

        let config = Config {
            voters,
            candidates,
            choices,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.voters.is_empty() {
            bail!("at least one voter is required");
        }
        if self.choices.len() != self.voters.len() {
            bail!(
                "{} choices given for {} voters",
                self.choices.len(),
                self.voters.len()
            );
        }
        Ok(())
    }

    /// Generate fresh keys for every voter and set up an election
    pub fn election(&self) -> Result<Election> {
        let mut rng = rand::thread_rng();
        let mut voters = Vec::with_capacity(self.voters.len());
        for name in &self.voters {
            let voter = Voter::generate(&mut rng, name.as_str())
                .with_context(|| format!("unable to generate keys for {}", name))?;
            log::info!("generated keys for {}", name);
            voters.push(voter);
        }
        Ok(Election::new(self.candidates.clone(), voters))
    }
}

fn parse_voters(val: &str) -> Result<Vec<String>> {
    let voters: Vec<String> = split(val).map(|name| name.to_string()).collect();
    if voters.is_empty() {
        bail!("ONIONVOTE_VOTERS names no voters");
    }
    Ok(voters)
}

fn parse_candidates(val: &str) -> Result<Vec<Candidate>> {
    split(val)
        .map(|pair| {
            let (id, name) = pair
                .split_once(':')
                .ok_or_else(|| anyhow!("candidate {:?} is not of the form id:name", pair))?;
            let id = id
                .trim()
                .parse()
                .with_context(|| format!("invalid candidate id in {:?}", pair))?;
            Ok(Candidate::new(id, name.trim()))
        })
        .collect()
}

fn parse_choices(val: &str) -> Result<Vec<i32>> {
    split(val)
        .map(|id| {
            id.parse()
                .with_context(|| format!("invalid candidate id {:?}", id))
        })
        .collect()
}

fn split(val: &str) -> impl Iterator<Item = &str> {
    val.split(',').map(str::trim).filter(|item| !item.is_empty())
}
