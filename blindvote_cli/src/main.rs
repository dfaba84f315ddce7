use clap::AppSettings;
use clap::{App, Arg, SubCommand};

mod command_election;
mod command_keygen;
mod command_tally;
mod command_vote;
mod rest;

fn main() {
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stdout)
        .init();

    let mut app = App::new("blindvote")
        .version("0.1")
        .about("Anonymous voting with RSA blind signatures - command-line tool")
        .setting(AppSettings::ArgRequiredElseHelp)
        .arg(
            Arg::with_name("clerk")
                .long("clerk")
                .takes_value(true)
                .help("Election clerk URL - can also be set with BLINDVOTE_CLERK"),
        )
        .arg(
            Arg::with_name("ballotbox")
                .long("ballotbox")
                .takes_value(true)
                .help("Ballot box URL - can also be set with BLINDVOTE_BALLOTBOX"),
        )
        .arg(
            Arg::with_name("key")
                .long("key")
                .takes_value(true)
                .help("Path to an RSA private key PEM file"),
        )
        .arg(
            Arg::with_name("did-key")
                .long("did-key")
                .takes_value(true)
                .help("Hex-encoded DID private key (32-byte P-256 scalar)"),
        )
        .subcommand(
            SubCommand::with_name("keygen")
                .about("Generate keypairs")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("rsa")
                        .about("Generate an RSA keypair")
                        .arg(
                            Arg::with_name("secret")
                                .long("secret")
                                .takes_value(true)
                                .required(true)
                                .help("File location to write the private key PEM"),
                        )
                        .arg(
                            Arg::with_name("keysize")
                                .long("keysize")
                                .takes_value(true)
                                .default_value("4096")
                                .help("Length of RSA key, anything less than 2048 is insecure"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("did").about("Generate a DID keypair (P-256)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("admin")
                .about("Perform election administrative operations")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("create")
                        .about("Create a new election")
                        .arg(
                            Arg::with_name("INPUT")
                                .index(1)
                                .required(true)
                                .help("Election file to PUT to the election clerk"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("tally")
                        .about("Verify and tally election results")
                        .arg(
                            Arg::with_name("election-id")
                                .index(1)
                                .required(true)
                                .help("Election to tally"),
                        ),
                ),
        )
        .subcommand(
            SubCommand::with_name("voter")
                .about("Vote in an election")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("vote")
                        .about("Cast a ballot in an election")
                        .arg(
                            Arg::with_name("INPUT")
                                .index(1)
                                .required(true)
                                .help("Unsigned ballot file to cast"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("verify")
                        .about("Verify that a cast ballot was properly authorized")
                        .arg(
                            Arg::with_name("election-id")
                                .index(1)
                                .required(true)
                                .help("Election the ballot was cast in"),
                        )
                        .arg(
                            Arg::with_name("ballot-id")
                                .index(2)
                                .required(true)
                                .help("Ballot to verify"),
                        ),
                ),
        );

    let matches = app.clone().get_matches();

    let clerk_uri = uri_from(&matches, "clerk", "BLINDVOTE_CLERK", "http://localhost:8000");
    let box_uri = uri_from(
        &matches,
        "ballotbox",
        "BLINDVOTE_BALLOTBOX",
        "http://localhost:8002",
    );

    if let Some(matches) = matches.subcommand_matches("keygen") {
        if let Some(matches) = matches.subcommand_matches("rsa") {
            command_keygen::command_keygen_rsa(matches);
            std::process::exit(0);
        }
        if matches.subcommand_matches("did").is_some() {
            command_keygen::command_keygen_did();
            std::process::exit(0);
        }
    }

    if let Some(sub) = matches.subcommand_matches("admin") {
        if let Some(sub) = sub.subcommand_matches("create") {
            command_election::command_admin_create(&matches, sub, &clerk_uri);
            std::process::exit(0);
        }
        if let Some(sub) = sub.subcommand_matches("tally") {
            command_tally::command_admin_tally(sub, &clerk_uri, &box_uri);
            std::process::exit(0);
        }
    }

    if let Some(sub) = matches.subcommand_matches("voter") {
        if let Some(sub) = sub.subcommand_matches("vote") {
            command_vote::command_voter_vote(&matches, sub, &clerk_uri, &box_uri);
            std::process::exit(0);
        }
        if let Some(sub) = sub.subcommand_matches("verify") {
            command_vote::command_voter_verify(sub, &clerk_uri, &box_uri);
            std::process::exit(0);
        }
    }

    // No command, just print help
    app.print_help().expect("Unable to print help message");
    println!();
}

fn uri_from(matches: &clap::ArgMatches, arg: &str, env_var: &str, default: &str) -> String {
    match matches.value_of(arg) {
        Some(uri) => uri.to_string(),
        None => std::env::var(env_var).unwrap_or_else(|_| default.to_string()),
    }
}

/// Read the RSA private key named by --key, if any.
pub fn read_rsa_key(matches: &clap::ArgMatches) -> Option<blindvote::PrivateKey> {
    let path = expand(matches.value_of("key")?);
    let pem = std::fs::read_to_string(&path).unwrap_or_else(|e| {
        eprintln!("blindvote: unable to read {}: {}", path, e);
        std::process::exit(1);
    });
    let key = blindvote::PrivateKey::from_pem(&pem).unwrap_or_else(|e| {
        eprintln!("blindvote: {}", e);
        std::process::exit(1);
    });
    Some(key)
}

/// Read the DID private key named by --did-key, if any.
pub fn read_did_key(matches: &clap::ArgMatches) -> Option<blindvote::DIDPrivateKey> {
    let hex_key = matches.value_of("did-key")?;
    let key = blindvote::DIDPrivateKey::from_hex(hex_key).unwrap_or_else(|e| {
        eprintln!("blindvote: invalid --did-key: {}", e);
        std::process::exit(1);
    });
    Some(key)
}

// Performs shell expansion on filenames (mostly to handle ~)
pub fn expand(filename: &str) -> String {
    shellexpand::full(filename)
        .unwrap_or_else(|e| {
            eprintln!("blindvote: error expanding {}: {}", filename, e);
            std::process::exit(1);
        })
        .into_owned()
}
