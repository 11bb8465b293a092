use crate::Config;
use anyhow::{bail, Context, Result};
use onionvote::*;

pub fn command_vote(matches: &clap::ArgMatches, config: &Config) -> Result<()> {
    let mut election = config.election()?;
    let results = run_election(&mut election, &config.choices)?;

    let first = results.first().context("no voter produced a tally")?;
    for (voter, result) in election.voters().iter().zip(&results) {
        if result != first {
            bail!("{} disagrees with {} on the tally", voter.name(), election.voters()[0].name());
        }
    }

    println!("> All {} voters agree on the tally", results.len());

    if matches.is_present("json") {
        println!("{}", serde_json::to_string_pretty(first)?);
    } else {
        print_results(first);
    }

    Ok(())
}

pub fn print_results(results: &VotingResults) {
    println!("Tally:");
    for result in results.ranked() {
        println!("  {} got {} votes", result.candidate.name, result.votes);
    }
}
