use crate::Config;
use anyhow::{bail, Result};
use onionvote::*;

/// Run a vote in which the first ballot is lost after the first peel round.
///
/// The next voter must notice the short batch and stop the run.
pub fn command_exit(_matches: &clap::ArgMatches, config: &Config) -> Result<()> {
    let mut election = config.election()?;
    let outcome = run_election_with(&mut election, &config.choices, |round, batch| {
        if round == Round::Peel(0) && !batch.is_empty() {
            batch.remove(0);
            log::info!("a ballot left the run after {}", round);
        }
    });

    match outcome {
        Ok(_) => bail!("the run completed although a ballot was dropped"),
        Err(RoundFailure {
            voter,
            round,
            source: Error::MalformedRound { expected, found },
        }) => {
            println!(
                "> {} stopped the run in {}: expected {} ballots, found {}",
                election.voters()[voter].name(),
                round,
                expected,
                found
            );
            Ok(())
        }
        Err(failure) => Err(failure.into()),
    }
}
