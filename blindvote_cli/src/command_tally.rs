use crate::rest::{BoxClient, ClerkClient};

use log::info;
use tallystick::plurality::DefaultPluralityTally;

/// Verify every cast ballot against the clerk's key, then tally first
/// preferences. A ballot that fails verification aborts the tally: an
/// unauthorized ballot in the box means the roll cannot be trusted.
pub fn command_admin_tally(matches: &clap::ArgMatches, clerk_uri: &str, box_uri: &str) {
    let election_id = matches.value_of("election-id").unwrap();

    let clerk = ClerkClient::new(clerk_uri);
    let clerk_public = clerk.get_public_key().unwrap_or_else(|e| {
        eprintln!("blindvote admin tally: {}", e);
        std::process::exit(1);
    });

    let ballot_box = BoxClient::new(box_uri);
    let ballots = ballot_box.get_roll(election_id).unwrap_or_else(|e| {
        eprintln!("blindvote admin tally: {}", e);
        std::process::exit(1);
    });
    info!("fetched {} ballots for election {}", ballots.len(), election_id);

    if ballots.is_empty() {
        println!("no ballots cast in election {}", election_id);
        return;
    }

    let mut tally = DefaultPluralityTally::new(1);
    for ballot in &ballots {
        if let Err(e) = ballot.verify_blind_signature(&clerk_public) {
            eprintln!(
                "blindvote admin tally: ballot {} failed verification: {}",
                ballot.ballot_id, e
            );
            std::process::exit(1);
        }
        if let Some(choice) = ballot.vote.first() {
            tally.add(choice.to_string());
        }
    }

    println!(
        "{} ballots verified in election {}",
        ballots.len(),
        election_id
    );
    let winners = tally.winners().into_unranked();
    for winner in winners {
        println!("winner: {}", winner);
    }
}
