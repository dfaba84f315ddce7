use crate::expand;

use blindvote::{generate_did_keypair, generate_rsa_keypair};

pub fn command_keygen_rsa(matches: &clap::ArgMatches) {
    // Unwraps OK - required args
    let secret_location = expand(matches.value_of("secret").unwrap());
    let keysize: usize = matches
        .value_of("keysize")
        .unwrap()
        .parse()
        .unwrap_or_else(|_| {
            eprintln!("blindvote keygen: --keysize must be a number");
            std::process::exit(1);
        });

    eprintln!("Generating {} bit RSA key, this can take a while...", keysize);
    let (private_key, public_key) = generate_rsa_keypair(keysize).unwrap_or_else(|e| {
        eprintln!("blindvote keygen: {}", e);
        std::process::exit(1);
    });

    let pem = private_key.to_pem().unwrap_or_else(|e| {
        eprintln!("blindvote keygen: {}", e);
        std::process::exit(1);
    });
    std::fs::write(&secret_location, pem).unwrap_or_else(|e| {
        eprintln!(
            "blindvote keygen: unable to write {}: {}",
            secret_location, e
        );
        std::process::exit(1);
    });

    println!("{}", public_key);
}

pub fn command_keygen_did() {
    let (private_key, public_key) = generate_did_keypair();
    println!("private: {}", private_key.to_hex());
    println!("public:  {}", public_key.to_hex());
}
