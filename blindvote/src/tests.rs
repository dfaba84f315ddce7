use super::*;

use chrono::DateTime;

const VOTER_DID_HEX: &str =
    "cc6fa0f0e191ad47a430fe04411c079f07d5c1ee47c3aa55f0e0204c8fe36d17";

#[test]
fn basic_end_to_end_election() {
    // The election clerk's signing key
    let clerk_key = PrivateKey::generate(2048).unwrap();
    let clerk_public = clerk_key.public_key().unwrap();

    // An admin seals an election under their DID key
    let admin = DIDPrivateKey::generate();
    let mut election = Election::new(
        "gov-2024",
        DateTime::parse_from_rfc3339("2024-06-01T08:00:00Z").unwrap(),
        DateTime::parse_from_rfc3339("2024-06-01T20:00:00Z").unwrap(),
        Some(TagSet::from_bytes(b"district=7").unwrap()),
        AdminKey::Did(admin.public_key()),
    )
    .unwrap();
    election.sign_did(&admin);
    election.verify_signature().unwrap();

    // A voter prepares a ballot
    let voter = DIDPrivateKey::from_hex(VOTER_DID_HEX).unwrap();
    let mut ballot = Ballot::new(
        "gov-2024",
        "abc",
        Vote::from_choices(vec!["candidate-a", "candidate-b"]).unwrap(),
        Some(TagSet::from_bytes(b"district=7").unwrap()),
    )
    .unwrap();

    // Step 1: blind the ballot against the clerk's key
    let (blind_ballot, unblinder) = ballot.blind(&clerk_public).unwrap();

    // The voter asks for a blind signature, authenticated by their DID
    let mut request =
        SignatureRequest::new("gov-2024", voter.public_key(), blind_ballot).unwrap();
    request.sign(&voter);

    // Step 2: the clerk verifies the request and blind-signs
    let wire_request = request.to_string();
    let received = SignatureRequest::from_bytes(wire_request.as_bytes()).unwrap();
    received.verify_signature().unwrap();
    let ballot_signature = clerk_key.blind_sign(received.blind_ballot.bytes()).unwrap();
    let fulfilled = FulfilledSignatureRequest::new(received, ballot_signature);

    // Step 3: the voter unblinds the signature and installs it
    let fulfilled =
        FulfilledSignatureRequest::from_bytes(fulfilled.to_string().as_bytes()).unwrap();
    ballot
        .unblind(&clerk_public, fulfilled.ballot_signature, &unblinder)
        .unwrap();

    // The finished ballot verifies against the clerk's key, round-trips
    // through its wire form, and still verifies afterwards
    ballot.verify_blind_signature(&clerk_public).unwrap();

    let wire_ballot = ballot.to_string();
    let stored = Ballot::from_bytes(wire_ballot.as_bytes()).unwrap();
    assert_eq!(stored, ballot);
    assert_eq!(stored.to_string(), wire_ballot);
    stored.verify_blind_signature(&clerk_public).unwrap();
}

#[test]
fn corrupted_ballot_signature_is_rejected() {
    let clerk_key = PrivateKey::generate(2048).unwrap();
    let clerk_public = clerk_key.public_key().unwrap();

    let mut ballot = Ballot::new(
        "gov-2024",
        "abc",
        Vote::from_choices(vec!["candidate-a"]).unwrap(),
        None,
    )
    .unwrap();

    let (blind_ballot, unblinder) = ballot.blind(&clerk_public).unwrap();
    let blind_sig = clerk_key.blind_sign(blind_ballot.bytes()).unwrap();
    ballot.unblind(&clerk_public, blind_sig, &unblinder).unwrap();

    // Corrupt one byte of the signature segment: decoding still succeeds
    // but verification must fail
    let mut sig = ballot.signature.as_ref().unwrap().bytes().to_vec();
    sig[7] ^= 0x20;
    ballot.signature = Some(Signature::from(sig));

    let reparsed = Ballot::from_bytes(ballot.to_string().as_bytes()).unwrap();
    assert!(matches!(
        reparsed.verify_blind_signature(&clerk_public),
        Err(Error::BallotBadSig)
    ));
}

#[test]
fn two_blindings_of_the_same_ballot_differ() {
    let clerk_key = PrivateKey::generate(2048).unwrap();
    let clerk_public = clerk_key.public_key().unwrap();

    let ballot = Ballot::new(
        "gov-2024",
        "abc",
        Vote::from_choices(vec!["candidate-a"]).unwrap(),
        None,
    )
    .unwrap();

    let (first, _) = ballot.blind(&clerk_public).unwrap();
    let (second, _) = ballot.blind(&clerk_public).unwrap();
    assert_ne!(first, second);
}

#[test]
fn wrong_clerk_key_does_not_verify() {
    let clerk_key = PrivateKey::generate(2048).unwrap();
    let clerk_public = clerk_key.public_key().unwrap();
    let other_public = PrivateKey::generate(2048).unwrap().public_key().unwrap();

    let mut ballot = Ballot::new(
        "gov-2024",
        "abc",
        Vote::from_choices(vec!["candidate-a"]).unwrap(),
        None,
    )
    .unwrap();

    let (blind_ballot, unblinder) = ballot.blind(&clerk_public).unwrap();
    let blind_sig = clerk_key.blind_sign(blind_ballot.bytes()).unwrap();
    ballot.unblind(&clerk_public, blind_sig, &unblinder).unwrap();

    ballot.verify_blind_signature(&clerk_public).unwrap();
    assert!(ballot.verify_blind_signature(&other_public).is_err());
}
