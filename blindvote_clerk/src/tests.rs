use crate::build;
use crate::db::{self, Db};

use blindvote::{
    AdminKey, Ballot, DIDPrivateKey, Election, FulfilledSignatureRequest, PrivateKey, PublicKey,
    Signature, SignatureRequest, TagSet, Vote,
};
use chrono::DateTime;
use rocket::http::{Header, Status};
use rocket::local::blocking::Client;
use tempfile::TempDir;

struct TestClerk {
    client: Client,
    admin_rsa: PrivateKey,
    admin_did: DIDPrivateKey,
    _dir: TempDir,
}

fn test_clerk() -> TestClerk {
    let dir = tempfile::tempdir().unwrap();

    let signing_key = PrivateKey::generate(2048).unwrap();
    let key_path = dir.path().join("clerk.pem");
    std::fs::write(&key_path, signing_key.to_pem().unwrap()).unwrap();

    let admin_rsa = PrivateKey::generate(2048).unwrap();
    let admins_path = dir.path().join("admins");
    std::fs::write(&admins_path, admin_rsa.public_key().unwrap().to_string()).unwrap();

    let readme_path = dir.path().join("README");
    std::fs::write(&readme_path, "test election clerk\n").unwrap();

    let admin_did = DIDPrivateKey::generate();
    let db_path = dir.path().join("clerk.db");

    let figment = rocket::Config::figment()
        .merge(("signing_key", key_path.to_string_lossy().to_string()))
        .merge(("admins", admins_path.to_string_lossy().to_string()))
        .merge(("readme", readme_path.to_string_lossy().to_string()))
        .merge(("did_public_key", admin_did.public_key().to_hex()))
        .merge(("database.url", format!("sqlite://{}", db_path.display())));

    let client = Client::tracked(build(figment)).unwrap();
    TestClerk {
        client,
        admin_rsa,
        admin_did,
        _dir: dir,
    }
}

fn signed_headers(key: &PrivateKey, method: &str, uri: &str) -> Vec<Header<'static>> {
    let signature = key
        .sign_raw(format!("{} {}", method, uri).as_bytes())
        .unwrap();
    vec![
        Header::new("X-Signature-Key", key.public_key().unwrap().to_string()),
        Header::new("X-Signature", signature.to_string()),
    ]
}

fn did_election(admin: &DIDPrivateKey, election_id: &str) -> Election {
    let mut election = Election::new(
        election_id,
        DateTime::parse_from_rfc3339("2024-06-01T08:00:00Z").unwrap(),
        DateTime::parse_from_rfc3339("2024-06-01T20:00:00Z").unwrap(),
        Some(TagSet::from_bytes(b"district=7").unwrap()),
        AdminKey::Did(admin.public_key()),
    )
    .unwrap();
    election.sign_did(admin);
    election
}

fn put_election(clerk: &TestClerk, election: &Election) -> Status {
    let uri = format!("/election/{}", election.election_id);
    let body = election.to_string();

    let mut req = clerk.client.put(uri.clone()).body(body);
    for header in signed_headers(&clerk.admin_rsa, "PUT", &uri) {
        req = req.header(header);
    }
    req = req.header(Header::new(
        "X-Public-Key",
        hex::encode(election.public_key.bytes()),
    ));

    req.dispatch().status()
}

#[test]
fn publish_and_fetch_election() {
    let clerk = test_clerk();

    let readme = clerk.client.get("/").dispatch().into_string().unwrap();
    assert_eq!(readme, "test election clerk\n");

    let pem = clerk
        .client
        .get("/publickey")
        .dispatch()
        .into_string()
        .unwrap();
    PublicKey::from_pem(&pem).unwrap();

    let admins = clerk
        .client
        .get("/admins")
        .dispatch()
        .into_string()
        .unwrap();
    assert_eq!(admins, clerk.admin_rsa.public_key().unwrap().to_string());

    let election = did_election(&clerk.admin_did, "gov-2024");
    assert_eq!(put_election(&clerk, &election), Status::Ok);

    let fetched = clerk
        .client
        .get("/election/gov-2024")
        .dispatch()
        .into_string()
        .unwrap();
    assert_eq!(fetched, election.to_string());

    let roll = clerk
        .client
        .get("/election")
        .dispatch()
        .into_string()
        .unwrap();
    assert_eq!(roll, election.to_string());

    assert_eq!(
        clerk.client.get("/election/no-such").dispatch().status(),
        Status::NotFound
    );
}

#[test]
fn rejects_bad_or_unauthorized_elections() {
    let clerk = test_clerk();

    // Bit-flipped self-signature
    let mut tampered = did_election(&clerk.admin_did, "gov-2024");
    let mut sig = tampered.signature.as_ref().unwrap().bytes().to_vec();
    sig[3] ^= 0x01;
    tampered.signature = Some(Signature::from(sig));
    assert_eq!(put_election(&clerk, &tampered), Status::BadRequest);

    // Sealed by a DID key that is not the configured admin
    let outsider = DIDPrivateKey::generate();
    let unauthorized = did_election(&outsider, "gov-2024");
    assert_eq!(put_election(&clerk, &unauthorized), Status::Forbidden);

    // Election ID in the URL must match the body
    let election = did_election(&clerk.admin_did, "gov-2024");
    let uri = "/election/other-election";
    let mut req = clerk.client.put(uri).body(election.to_string());
    for header in signed_headers(&clerk.admin_rsa, "PUT", uri) {
        req = req.header(header);
    }
    req = req.header(Header::new(
        "X-Public-Key",
        hex::encode(election.public_key.bytes()),
    ));
    assert_eq!(req.dispatch().status(), Status::BadRequest);

    // Missing signed-request headers
    let uri = "/election/gov-2024";
    let resp = clerk
        .client
        .put(uri)
        .body(election.to_string())
        .header(Header::new(
            "X-Public-Key",
            hex::encode(election.public_key.bytes()),
        ))
        .dispatch();
    assert_eq!(resp.status(), Status::BadRequest);
}

#[test]
fn sign_and_refuse_double_issuance() {
    let clerk = test_clerk();

    let election = did_election(&clerk.admin_did, "gov-2024");
    assert_eq!(put_election(&clerk, &election), Status::Ok);

    let pem = clerk
        .client
        .get("/publickey")
        .dispatch()
        .into_string()
        .unwrap();
    let clerk_public = PublicKey::from_pem(&pem).unwrap();

    let voter = DIDPrivateKey::generate();
    let mut ballot = Ballot::new(
        "gov-2024",
        "abc",
        Vote::from_choices(vec!["candidate-a", "candidate-b"]).unwrap(),
        None,
    )
    .unwrap();
    let (blind_ballot, unblinder) = ballot.blind(&clerk_public).unwrap();

    let mut request =
        SignatureRequest::new("gov-2024", voter.public_key(), blind_ballot).unwrap();
    request.sign(&voter);
    let body = request.to_string();

    // First request is fulfilled, and the signature actually unblinds
    let resp = clerk.client.post("/sign").body(&body).dispatch();
    assert_eq!(resp.status(), Status::Ok);
    let fulfilled =
        FulfilledSignatureRequest::from_bytes(resp.into_string().unwrap().as_bytes()).unwrap();
    ballot
        .unblind(&clerk_public, fulfilled.ballot_signature, &unblinder)
        .unwrap();
    ballot.verify_blind_signature(&clerk_public).unwrap();

    // An identical second request is refused
    let resp = clerk.client.post("/sign").body(&body).dispatch();
    assert_eq!(resp.status(), Status::BadRequest);
    assert_eq!(
        resp.into_string().unwrap(),
        "already received fulfilled signature request"
    );

    // Exactly one ledger row
    let db = clerk.client.rocket().state::<Db>().unwrap();
    let count = rocket::tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(db::count_fulfilled(db, "gov-2024"))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn sign_requires_a_known_election() {
    let clerk = test_clerk();

    let pem = clerk
        .client
        .get("/publickey")
        .dispatch()
        .into_string()
        .unwrap();
    let clerk_public = PublicKey::from_pem(&pem).unwrap();

    let voter = DIDPrivateKey::generate();
    let ballot = Ballot::new(
        "no-such-election",
        "abc",
        Vote::from_choices(vec!["candidate-a"]).unwrap(),
        None,
    )
    .unwrap();
    let (blind_ballot, _) = ballot.blind(&clerk_public).unwrap();

    let mut request =
        SignatureRequest::new("no-such-election", voter.public_key(), blind_ballot).unwrap();
    request.sign(&voter);

    let resp = clerk
        .client
        .post("/sign")
        .body(request.to_string())
        .dispatch();
    assert_eq!(resp.status(), Status::NotFound);
}
