use crate::config::ClerkState;
use crate::db::{self, Db};
use crate::error::Error;
use crate::headers::{AdminKeyHeader, SignedHeaders};

use blindvote::{
    validate_election_id, AdminKey, Election, FulfilledSignatureRequest, SignatureRequest,
};
use log::info;
use rocket::State;

#[get("/")]
pub fn readme(state: &State<ClerkState>) -> String {
    state.readme.clone()
}

/// The clerk's RSA public key, PEM encoded. Voters blind their ballots
/// against this key and the ballot box verifies against it.
#[get("/publickey")]
pub fn public_key(state: &State<ClerkState>) -> String {
    state.public_key_pem.clone()
}

#[get("/admins")]
pub fn admins(state: &State<ClerkState>) -> String {
    state.admins.to_string()
}

#[get("/election")]
pub async fn all_elections(db: &State<Db>) -> Result<String, Error> {
    let elections = db::all_elections(db).await?;
    Ok(elections.join("\n\n\n"))
}

#[get("/election/<election_id>")]
pub async fn get_election(db: &State<Db>, election_id: &str) -> Result<String, Error> {
    validate_election_id(election_id)?;

    db::get_election(db, election_id)
        .await?
        .ok_or_else(|| Error::ElectionNotFound(election_id.to_string()))
}

/// Publish an election. Admin-authenticated: the request must carry
/// valid signed-request headers, the election must verify against its
/// own embedded key, that key must match the `X-Public-Key` header, and
/// it must be on the admin allow-list (RSA user-set or the configured
/// DID admin key).
#[put("/election/<election_id>", data = "<body>")]
pub async fn put_election(
    db: &State<Db>,
    state: &State<ClerkState>,
    election_id: &str,
    _headers: SignedHeaders,
    admin_key: AdminKeyHeader,
    body: &str,
) -> Result<String, Error> {
    let election = Election::from_bytes(body.as_bytes())?;

    if election.election_id != election_id {
        return Err(Error::ElectionIdMismatch);
    }
    if !hex::encode(election.public_key.bytes()).eq_ignore_ascii_case(&admin_key.0) {
        return Err(Error::PublicKeyMismatch);
    }

    election.verify_signature()?;

    let is_admin = match &election.public_key {
        AdminKey::Rsa(pk) => state.admins.get_user(pk).is_some(),
        AdminKey::Did(dk) => state.did_public_key.as_ref() == Some(dk),
    };
    if !is_admin {
        return Err(Error::NotAdmin);
    }

    db::save_election(db, &election).await?;
    info!("published election {}", election.election_id);

    Ok(String::new())
}

/// Issue a blind signature. The ledger insert is atomic with the
/// response: a duplicate `(election, request)` loses on the unique
/// constraint and is rejected, and the row is written before the
/// fulfilled request is emitted.
#[post("/sign", data = "<body>")]
pub async fn sign(
    db: &State<Db>,
    state: &State<ClerkState>,
    body: &str,
) -> Result<String, Error> {
    let request = SignatureRequest::from_bytes(body.as_bytes())?;
    request.verify_signature()?;

    if !db::election_exists(db, &request.election_id).await? {
        return Err(Error::ElectionNotFound(request.election_id.clone()));
    }

    let ballot_signature = state.signing_key.blind_sign(request.blind_ballot.bytes())?;
    let fulfilled = FulfilledSignatureRequest::new(request, ballot_signature);

    db::try_insert_fulfilled(db, &fulfilled).await?;

    Ok(fulfilled.to_string())
}
