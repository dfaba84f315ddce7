use crate::build_with_clerk_key;

use blindvote::{Ballot, PrivateKey, PublicKey, Signature, TagSet, Vote};
use rocket::http::{Header, Status};
use rocket::local::blocking::Client;
use tempfile::TempDir;

struct TestBox {
    client: Client,
    clerk_key: PrivateKey,
    clerk_public: PublicKey,
    _dir: TempDir,
}

fn test_box() -> TestBox {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ballotbox.db");

    let clerk_key = PrivateKey::generate(2048).unwrap();
    let clerk_public = clerk_key.public_key().unwrap();

    let figment = rocket::Config::figment()
        .merge(("electionclerk_url", "http://localhost:8000"))
        .merge(("database.url", format!("sqlite://{}", db_path.display())));

    let client =
        Client::tracked(build_with_clerk_key(figment, Some(clerk_public.clone()))).unwrap();
    TestBox {
        client,
        clerk_key,
        clerk_public,
        _dir: dir,
    }
}

fn signed_ballot(test: &TestBox, ballot_id: &str) -> Ballot {
    let mut ballot = Ballot::new(
        "gov-2024",
        ballot_id,
        Vote::from_choices(vec!["candidate-a", "candidate-b"]).unwrap(),
        Some(TagSet::from_bytes(b"district=7").unwrap()),
    )
    .unwrap();

    let (blinded, unblinder) = ballot.blind(&test.clerk_public).unwrap();
    let blind_sig = test.clerk_key.blind_sign(blinded.bytes()).unwrap();
    ballot
        .unblind(&test.clerk_public, blind_sig, &unblinder)
        .unwrap();
    ballot
}

#[test]
fn put_get_and_roll() {
    let test = test_box();

    let first = signed_ballot(&test, "abc");
    let second = signed_ballot(&test, "def");

    for ballot in [&first, &second] {
        let uri = format!("/vote/gov-2024/{}", ballot.ballot_id);
        let resp = test.client.put(uri).body(ballot.to_string()).dispatch();
        assert_eq!(resp.status(), Status::Ok);
    }

    let fetched = test
        .client
        .get("/vote/gov-2024/abc")
        .dispatch()
        .into_string()
        .unwrap();
    let stored = Ballot::from_bytes(fetched.as_bytes()).unwrap();
    assert_eq!(stored, first);
    stored.verify_blind_signature(&test.clerk_public).unwrap();

    let roll = test
        .client
        .get("/vote/gov-2024")
        .dispatch()
        .into_string()
        .unwrap();
    assert_eq!(roll, format!("{}\n\n\n{}", first, second));

    assert_eq!(
        test.client.get("/vote/gov-2024/missing").dispatch().status(),
        Status::NotFound
    );
}

#[test]
fn rejects_unauthorized_ballots() {
    let test = test_box();

    // Corrupt one byte of the signature: parses fine, fails verification
    let mut ballot = signed_ballot(&test, "abc");
    let mut sig = ballot.signature.as_ref().unwrap().bytes().to_vec();
    sig[9] ^= 0x04;
    ballot.signature = Some(Signature::from(sig));

    let resp = test
        .client
        .put("/vote/gov-2024/abc")
        .body(ballot.to_string())
        .dispatch();
    assert_eq!(resp.status(), Status::BadRequest);

    // A ballot with no signature at all
    let unsigned = Ballot::new(
        "gov-2024",
        "abc",
        Vote::from_choices(vec!["candidate-a"]).unwrap(),
        None,
    )
    .unwrap();
    let resp = test
        .client
        .put("/vote/gov-2024/abc")
        .body(unsigned.to_string())
        .dispatch();
    assert_eq!(resp.status(), Status::BadRequest);

    // IDs in the URL must match the ballot
    let ballot = signed_ballot(&test, "abc");
    let resp = test
        .client
        .put("/vote/gov-2024/other")
        .body(ballot.to_string())
        .dispatch();
    assert_eq!(resp.status(), Status::BadRequest);
}

#[test]
fn malformed_ids_are_bad_requests() {
    let test = test_box();

    // Over-length IDs are malformed input, not missing resources
    let long_id = "a".repeat(129);
    let resp = test.client.get(format!("/vote/{}", long_id)).dispatch();
    assert_eq!(resp.status(), Status::BadRequest);

    let resp = test
        .client
        .get(format!("/vote/gov-2024/{}", long_id))
        .dispatch();
    assert_eq!(resp.status(), Status::BadRequest);
}

#[test]
fn duplicate_ballot_is_refused() {
    let test = test_box();
    let ballot = signed_ballot(&test, "abc");

    let resp = test
        .client
        .put("/vote/gov-2024/abc")
        .body(ballot.to_string())
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);

    let resp = test
        .client
        .put("/vote/gov-2024/abc")
        .body(ballot.to_string())
        .dispatch();
    assert_eq!(resp.status(), Status::BadRequest);
}

#[test]
fn delete_requires_signed_headers() {
    let test = test_box();
    let ballot = signed_ballot(&test, "abc");

    let resp = test
        .client
        .put("/vote/gov-2024/abc")
        .body(ballot.to_string())
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);

    // No headers: refused
    let resp = test.client.delete("/vote/gov-2024/abc").dispatch();
    assert_eq!(resp.status(), Status::BadRequest);

    // Authenticated: the tombstone is recorded, the ballot remains
    let actor = PrivateKey::generate(2048).unwrap();
    let signature = actor
        .sign_raw(b"DELETE /vote/gov-2024/abc")
        .unwrap();
    let resp = test
        .client
        .delete("/vote/gov-2024/abc")
        .header(Header::new(
            "X-Signature-Key",
            actor.public_key().unwrap().to_string(),
        ))
        .header(Header::new("X-Signature", signature.to_string()))
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);

    assert_eq!(
        test.client.get("/vote/gov-2024/abc").dispatch().status(),
        Status::Ok
    );
}
