use crate::clerk::ClerkKey;
use crate::config::Config;
use crate::db::{self, Db};
use crate::error::Error;
use crate::headers::SignedHeaders;

use blindvote::{validate_ballot_id, validate_election_id, Ballot, MAX_BALLOT_SIZE};
use log::info;
use rocket::State;

fn validate_ids(election_id: &str, ballot_id: &str) -> Result<(), Error> {
    validate_election_id(election_id).map_err(|_| Error::InvalidId)?;
    validate_ballot_id(ballot_id).map_err(|_| Error::InvalidId)?;
    Ok(())
}

/// The full ballot roll for an election, canonical ballots separated by
/// a triple newline.
#[get("/vote/<election_id>")]
pub async fn get_roll(db: &State<Db>, election_id: &str) -> Result<String, Error> {
    validate_election_id(election_id).map_err(|_| Error::InvalidId)?;
    let ballots = db::all_ballots(db, election_id).await?;
    Ok(ballots.join("\n\n\n"))
}

#[get("/vote/<election_id>/<ballot_id>")]
pub async fn get_ballot(
    db: &State<Db>,
    election_id: &str,
    ballot_id: &str,
) -> Result<String, Error> {
    validate_ids(election_id, ballot_id)?;
    db::get_ballot(db, election_id, ballot_id)
        .await?
        .ok_or_else(|| Error::BallotNotFound(election_id.to_string(), ballot_id.to_string()))
}

/// Accept a ballot: decode it, verify its blind signature against the
/// clerk's key, and persist it under `(election_id, ballot_id)`. The
/// size cap is enforced before any cryptographic work.
#[put("/vote/<election_id>/<ballot_id>", data = "<body>")]
pub async fn put_ballot(
    db: &State<Db>,
    config: &State<Config>,
    clerk_key: &State<ClerkKey>,
    election_id: &str,
    ballot_id: &str,
    body: &str,
) -> Result<String, Error> {
    validate_ids(election_id, ballot_id)?;
    if body.len() > MAX_BALLOT_SIZE {
        return Err(blindvote::Error::BallotTooBig.into());
    }

    let ballot = Ballot::from_bytes(body.as_bytes())?;
    if ballot.election_id != election_id {
        return Err(Error::ElectionIdMismatch);
    }
    if ballot.ballot_id != ballot_id {
        return Err(Error::BallotIdMismatch);
    }

    let public_key = clerk_key.get(config).await?;
    ballot.verify_blind_signature(&public_key)?;

    db::save_ballot(db, &ballot).await?;
    info!("stored ballot {} for election {}", ballot_id, election_id);

    Ok(ballot.to_string())
}

/// Deletion is advisory: the request must be authenticated with signed
/// headers, and the actor is recorded in an audit tombstone. The ballot
/// itself is not destroyed.
#[delete("/vote/<election_id>/<ballot_id>")]
pub async fn delete_ballot(
    db: &State<Db>,
    headers: SignedHeaders,
    election_id: &str,
    ballot_id: &str,
) -> Result<String, Error> {
    validate_ids(election_id, ballot_id)?;

    if db::get_ballot(db, election_id, ballot_id).await?.is_none() {
        return Err(Error::BallotNotFound(
            election_id.to_string(),
            ballot_id.to_string(),
        ));
    }

    db::record_deletion(db, election_id, ballot_id, &headers.public_key).await?;
    info!(
        "recorded deletion request for ballot {} in election {} by {}",
        ballot_id,
        election_id,
        headers.public_key.sha256_hex()
    );

    Ok(String::new())
}
