use clap::{App, Arg, SubCommand};
use log::LevelFilter;

mod command_exit;
mod command_vote;
mod config;

use command_exit::command_exit;
use command_vote::command_vote;
use config::Config;

#[derive(PartialEq, Copy, Clone)]
enum Verbosity {
    Error,
    Warn,
    Info,
    Debug,
}

impl From<Verbosity> for LevelFilter {
    fn from(verbosity: Verbosity) -> Self {
        match verbosity {
            Verbosity::Error => LevelFilter::Error,
            Verbosity::Warn => LevelFilter::Warn,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
        }
    }
}

fn main() {
    let matches = App::new("onionvote")
        .version("0.1")
        .about("Runs an anonymous onion-encrypted vote between in-process voters")
        .after_help(
            "The roster is read from ONIONVOTE_VOTERS, ONIONVOTE_CANDIDATES and ONIONVOTE_CHOICES",
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .conflicts_with("v")
                .help("Only log errors"),
        )
        .subcommand(
            SubCommand::with_name("vote")
                .about("Run a full vote and print the tally")
                .arg(
                    Arg::with_name("json")
                        .long("json")
                        .help("Print the tally as JSON"),
                ),
        )
        .subcommand(
            SubCommand::with_name("exit")
                .about("Run a vote in which one ballot disappears after the first round"),
        )
        .get_matches();

    let verbosity = if matches.is_present("quiet") {
        Verbosity::Error
    } else {
        match matches.occurrences_of("v") {
            0 => Verbosity::Warn,
            1 => Verbosity::Info,
            _ => Verbosity::Debug,
        }
    };
    env_logger::Builder::new()
        .filter_level(verbosity.into())
        .format_timestamp(None)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("onionvote: invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let result = if let Some(matches) = matches.subcommand_matches("vote") {
        command_vote(matches, &config)
    } else if let Some(matches) = matches.subcommand_matches("exit") {
        command_exit(matches, &config)
    } else {
        eprintln!("onionvote: no subcommand given, try `onionvote vote`");
        std::process::exit(1);
    };

    if let Err(e) = result {
        eprintln!("onionvote: {:#}", e);
        std::process::exit(1);
    }
}
