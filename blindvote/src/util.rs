use crate::*;

use regex::Regex;
use sha2::{Digest, Sha256};

/// Maximum size of an election ID in bytes.
pub const MAX_ELECTION_ID_SIZE: usize = 128;

/// Maximum size of a ballot ID in bytes.
pub const MAX_BALLOT_ID_SIZE: usize = 128;

/// Maximum size of a tag key in bytes.
pub const MAX_TAG_KEY_SIZE: usize = 64;

/// Maximum size of a tag value in bytes.
pub const MAX_TAG_VALUE_SIZE: usize = 256;

/// Maximum number of tags in a tag set.
pub const MAX_TAGS: usize = 64;

/// Maximum number of choices in a vote.
pub const MAX_VOTE_CHOICES: usize = 64;

/// Maximum size of a single vote choice in bytes.
pub const MAX_VOTE_CHOICE_SIZE: usize = 256;

/// Maximum serialized size of a vote, choices plus line separators.
pub const MAX_VOTE_SIZE: usize = MAX_VOTE_CHOICES * (MAX_VOTE_CHOICE_SIZE + 1);

/// Maximum size of a raw ballot: election-id + ballot-id + vote + tags +
/// signature (base64 of a 8192-bit key modulus) + field separators.
pub const MAX_BALLOT_SIZE: usize = MAX_ELECTION_ID_SIZE
    + MAX_BALLOT_ID_SIZE
    + MAX_VOTE_SIZE
    + MAX_TAGS * (MAX_TAG_KEY_SIZE + MAX_TAG_VALUE_SIZE + 1)
    + 4 * ((1024 + 2) / 3)
    + (4 * 2 + 64 + 64);

/// Maximum size of a raw signature request: election-id + hex request-id +
/// base64 DID public key + hex blinded ballot (8192-bit key) + base64
/// signature + field separators.
pub const MAX_SIGNATURE_REQUEST_SIZE: usize =
    MAX_ELECTION_ID_SIZE + 64 + 44 + 2 * 1024 + 4 * ((1024 + 2) / 3) + 4 * 2;

lazy_static! {
    /// Valid characters for election IDs, more or less as per RFC 3986, sec 2.
    pub static ref VALID_ELECTION_ID: Regex =
        Regex::new(r"^[0-9a-zA-Z\-\.\[\]_~:/?#@!$&'()*+,;=]+$").unwrap();

    /// Valid characters for ballot IDs, same set as election IDs.
    pub static ref VALID_BALLOT_ID: Regex =
        Regex::new(r"^[0-9a-zA-Z\-\.\[\]_~:/?#@!$&'()*+,;=]+$").unwrap();

    /// Valid characters for a vote choice.
    pub static ref VALID_VOTE_CHOICE: Regex =
        Regex::new(r"^[0-9a-zA-Z\-\.\[\]_~:/?#@!$&'()*+,;= ]+$").unwrap();

    /// Valid characters for a tag key. `=` is reserved as the separator.
    pub static ref VALID_TAG_KEY: Regex =
        Regex::new(r"^[0-9a-zA-Z\-\.\[\]_~:/?#@!$&'()*+,;]+$").unwrap();

    /// Valid characters for a tag value. `=` is reserved as the separator.
    pub static ref VALID_TAG_VALUE: Regex =
        Regex::new(r"^[0-9a-zA-Z\-\.\[\]_~:/?#@!$&'()*+,; ]+$").unwrap();
}

/// Double SHA-256, used to derive request IDs from DID public keys.
pub fn sha256d(data: &[u8]) -> Vec<u8> {
    let first = Sha256::digest(data);
    Sha256::digest(first).to_vec()
}

/// Generate a new RSA keypair for signing ballots.
pub fn generate_rsa_keypair(bits: usize) -> Result<(PrivateKey, PublicKey), Error> {
    let private_key = PrivateKey::generate(bits)?;
    let public_key = private_key.public_key()?;
    Ok((private_key, public_key))
}

/// Generate a new DID keypair for authenticating voters.
pub fn generate_did_keypair() -> (DIDPrivateKey, DIDPublicKey) {
    let private_key = DIDPrivateKey::generate();
    let public_key = private_key.public_key();
    (private_key, public_key)
}
