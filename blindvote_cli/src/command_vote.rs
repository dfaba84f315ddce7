use crate::rest::{BoxClient, ClerkClient};
use crate::{expand, read_did_key};

use blindvote::{Ballot, SignatureRequest};
use chrono::Utc;
use log::info;

/// Cast a ballot: blind it against the clerk's key, obtain a blind
/// signature bound to the voter's DID identity, unblind, and PUT the
/// finished ballot to the ballot box.
pub fn command_voter_vote(
    globals: &clap::ArgMatches,
    matches: &clap::ArgMatches,
    clerk_uri: &str,
    box_uri: &str,
) {
    let filename = expand(matches.value_of("INPUT").unwrap());

    let did_key = read_did_key(globals).unwrap_or_else(|| {
        eprintln!(
            "blindvote voter vote: please specify a did private key with --did-key \
             (eg: `--did-key=CC6FA0F0E191AD47A430FE04411C079F07D5C1EE47C3AA55F0E0204C8FE36D17`)"
        );
        std::process::exit(1);
    });

    let content = std::fs::read(&filename).unwrap_or_else(|e| {
        eprintln!("blindvote voter vote: unable to read {}: {}", filename, e);
        std::process::exit(1);
    });
    let mut ballot = Ballot::from_bytes(&content).unwrap_or_else(|e| {
        eprintln!("blindvote voter vote: {}", e);
        std::process::exit(1);
    });

    let clerk = ClerkClient::new(clerk_uri);

    // Confirm the target election exists, is properly sealed, and is open
    let election = clerk.get_election(&ballot.election_id).unwrap_or_else(|e| {
        eprintln!("blindvote voter vote: {}", e);
        std::process::exit(1);
    });
    election.verify_signature().unwrap_or_else(|e| {
        eprintln!("blindvote voter vote: {}", e);
        std::process::exit(1);
    });
    let now = Utc::now();
    if now < election.start.with_timezone(&Utc) {
        eprintln!(
            "blindvote voter vote: election {} has not started yet (starts {})",
            election.election_id, election.start
        );
        std::process::exit(1);
    }
    if now > election.end.with_timezone(&Utc) {
        eprintln!(
            "blindvote voter vote: election {} has closed (ended {})",
            election.election_id, election.end
        );
        std::process::exit(1);
    }

    let clerk_public = clerk.get_public_key().unwrap_or_else(|e| {
        eprintln!("blindvote voter vote: {}", e);
        std::process::exit(1);
    });
    info!("fetched clerk public key {}", clerk_public.sha256_hex());

    // Blind the ballot and ask the clerk for a signature
    let (blind_ballot, unblinder) = ballot.blind(&clerk_public).unwrap_or_else(|e| {
        eprintln!("blindvote voter vote: {}", e);
        std::process::exit(1);
    });

    let mut request =
        SignatureRequest::new(&ballot.election_id, did_key.public_key(), blind_ballot)
            .unwrap_or_else(|e| {
                eprintln!("blindvote voter vote: {}", e);
                std::process::exit(1);
            });
    request.sign(&did_key);

    let fulfilled = clerk.post_signature_request(&request).unwrap_or_else(|e| {
        eprintln!("blindvote voter vote: {}", e);
        std::process::exit(1);
    });

    // Unblind the signature and cast the finished ballot
    ballot
        .unblind(&clerk_public, fulfilled.ballot_signature, &unblinder)
        .unwrap_or_else(|e| {
            eprintln!("blindvote voter vote: {}", e);
            std::process::exit(1);
        });

    let ballot_box = BoxClient::new(box_uri);
    ballot_box.put_ballot(&ballot).unwrap_or_else(|e| {
        eprintln!("blindvote voter vote: {}", e);
        std::process::exit(1);
    });

    println!(
        "cast ballot {} in election {}",
        ballot.ballot_id, ballot.election_id
    );
}

/// Fetch a single cast ballot and check its authorization signature.
pub fn command_voter_verify(matches: &clap::ArgMatches, clerk_uri: &str, box_uri: &str) {
    let election_id = matches.value_of("election-id").unwrap();
    let ballot_id = matches.value_of("ballot-id").unwrap();

    let clerk = ClerkClient::new(clerk_uri);
    let clerk_public = clerk.get_public_key().unwrap_or_else(|e| {
        eprintln!("blindvote voter verify: {}", e);
        std::process::exit(1);
    });

    let ballot_box = BoxClient::new(box_uri);
    let ballot = ballot_box
        .get_ballot(election_id, ballot_id)
        .unwrap_or_else(|e| {
            eprintln!("blindvote voter verify: {}", e);
            std::process::exit(1);
        });

    match ballot.verify_blind_signature(&clerk_public) {
        Ok(()) => println!("ballot {} is properly authorized", ballot_id),
        Err(e) => {
            eprintln!("blindvote voter verify: {}", e);
            std::process::exit(1);
        }
    }
}
