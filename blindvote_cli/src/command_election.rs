use crate::rest::ClerkClient;
use crate::{expand, read_did_key, read_rsa_key};

use blindvote::{AdminKey, Election};

/// Create a new election: read the election file, fill in the admin key
/// and self-signature if the file does not carry them, verify, and PUT
/// the sealed election to the clerk.
pub fn command_admin_create(
    globals: &clap::ArgMatches,
    matches: &clap::ArgMatches,
    clerk_uri: &str,
) {
    let filename = expand(matches.value_of("INPUT").unwrap());

    let rsa_key = read_rsa_key(globals).unwrap_or_else(|| {
        eprintln!(
            "blindvote admin create: please specify a private key pem file with --key \
             (eg: `--key=path/to/mykey.pem`)"
        );
        std::process::exit(1);
    });
    let did_key = read_did_key(globals);

    let content = std::fs::read(&filename).unwrap_or_else(|e| {
        eprintln!("blindvote admin create: unable to read {}: {}", filename, e);
        std::process::exit(1);
    });

    // A fully sealed election posts as-is; otherwise treat the file as a
    // draft and seal it here, under the DID key when one was given
    let mut election = match Election::from_bytes(&content) {
        Ok(election) => election,
        Err(_) => {
            let admin_key = match &did_key {
                Some(did) => AdminKey::Did(did.public_key()),
                None => AdminKey::Rsa(rsa_key.public_key().unwrap_or_else(|e| {
                    eprintln!("blindvote admin create: {}", e);
                    std::process::exit(1);
                })),
            };
            Election::from_draft(&content, admin_key).unwrap_or_else(|e| {
                eprintln!("blindvote admin create: {}", e);
                std::process::exit(1);
            })
        }
    };

    if !election.has_signature() {
        match (&election.public_key, &did_key) {
            (AdminKey::Did(_), Some(did)) => election.sign_did(did),
            (AdminKey::Rsa(_), _) => {
                election.sign(&rsa_key).unwrap_or_else(|e| {
                    eprintln!("blindvote admin create: {}", e);
                    std::process::exit(1);
                });
            }
            (AdminKey::Did(_), None) => {
                eprintln!(
                    "blindvote admin create: election is sealed by a DID key, \
                     please pass --did-key"
                );
                std::process::exit(1);
            }
        }
    }

    election.verify_signature().unwrap_or_else(|e| {
        eprintln!("blindvote admin create: {}", e);
        std::process::exit(1);
    });

    let clerk = ClerkClient::new(clerk_uri);
    clerk.put_election(&election, &rsa_key).unwrap_or_else(|e| {
        eprintln!("blindvote admin create: {}", e);
        std::process::exit(1);
    });

    println!("created election {}", election.election_id);
}
