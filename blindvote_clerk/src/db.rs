use crate::config::Config;
use crate::error::Error;

use blindvote::{Election, FulfilledSignatureRequest};
use chrono::SecondsFormat;
use log::error;
use rocket::fairing::{self, AdHoc};
use rocket::{Build, Rocket};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;

pub type Db = sqlx::SqlitePool;

async fn init_db(rocket: Rocket<Build>) -> fairing::Result {
    let config = rocket
        .state::<Config>()
        .expect("config fairing is attached first");

    let opts = match SqliteConnectOptions::from_str(&config.database.url) {
        Ok(opts) => opts.create_if_missing(true),
        Err(e) => {
            error!("Bad database url: {}", e);
            return Err(rocket);
        }
    };

    let mut pool_opts = SqlitePoolOptions::new()
        .max_lifetime(Duration::from_secs(config.database.conn_max_lifetime));
    if config.database.max_idle_connections >= 0 {
        pool_opts = pool_opts.max_connections(config.database.max_idle_connections as u32);
    }

    let db = match pool_opts.connect_with(opts).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to SQLx database: {}", e);
            return Err(rocket);
        }
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
        error!("Failed to initialize SQLx database: {}", e);
        return Err(rocket);
    }

    Ok(rocket.manage(db))
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("SQLx Stage", |rocket| async {
        rocket.attach(AdHoc::try_on_ignite("SQLx Database", init_db))
    })
}

/// Persist a validated election. The stored tags column is the
/// deduplicated last-writer-wins view.
pub async fn save_election(db: &Db, election: &Election) -> Result<(), Error> {
    let tags = match &election.tagset {
        Some(tagset) => {
            let mut lines: Vec<String> = tagset
                .map()
                .into_iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            lines.sort();
            lines.join("\n")
        }
        None => String::new(),
    };

    let result = sqlx::query(
        "INSERT INTO elections (election_id, election, startdate, enddate, tags) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&election.election_id)
    .bind(election.to_string())
    .bind(election.start.to_rfc3339_opts(SecondsFormat::Secs, true))
    .bind(election.end.to_rfc3339_opts(SecondsFormat::Secs, true))
    .bind(tags)
    .execute(db)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(Error::ElectionExists),
        Err(e) => Err(e.into()),
    }
}

pub async fn get_election(db: &Db, election_id: &str) -> Result<Option<String>, Error> {
    let row = sqlx::query("SELECT election FROM elections WHERE election_id = ?")
        .bind(election_id)
        .fetch_optional(db)
        .await?;
    Ok(row.map(|r| r.get(0)))
}

pub async fn all_elections(db: &Db) -> Result<Vec<String>, Error> {
    let rows = sqlx::query("SELECT election FROM elections ORDER BY election_id")
        .fetch_all(db)
        .await?;
    Ok(rows.into_iter().map(|r| r.get(0)).collect())
}

pub async fn election_exists(db: &Db, election_id: &str) -> Result<bool, Error> {
    let row = sqlx::query("SELECT 1 FROM elections WHERE election_id = ?")
        .bind(election_id)
        .fetch_optional(db)
        .await?;
    Ok(row.is_some())
}

/// Record a fulfilled signature request. The unique index on
/// `(election_id, request_id)` makes this a try-insert-once: a concurrent
/// duplicate loses the race inside the database, never in application
/// code, so there is no check-then-write gap.
pub async fn try_insert_fulfilled(
    db: &Db,
    fulfilled: &FulfilledSignatureRequest,
) -> Result<(), Error> {
    let request = &fulfilled.request;
    let voter_signature = match &request.signature {
        Some(sig) => sig.to_string(),
        None => String::new(),
    };

    let result = sqlx::query(
        "INSERT INTO signature_requests \
         (election_id, request_id, public_key, blind_ballot, voter_signature, ballot_signature) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&request.election_id)
    .bind(hex::encode(&request.request_id))
    .bind(request.public_key.to_string())
    .bind(request.blind_ballot.to_string())
    .bind(voter_signature)
    .bind(fulfilled.ballot_signature.to_string())
    .execute(db)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(Error::AlreadyFulfilled),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
pub async fn count_fulfilled(db: &Db, election_id: &str) -> Result<i64, Error> {
    let row = sqlx::query("SELECT COUNT(*) FROM signature_requests WHERE election_id = ?")
        .bind(election_id)
        .fetch_one(db)
        .await?;
    Ok(row.get(0))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation)
        }
        _ => false,
    }
}
