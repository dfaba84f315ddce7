use crate::config::Config;
use crate::error::Error;

use blindvote::{Ballot, PublicKey};
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

/// Persist a verified ballot keyed by `(election_id, ballot_id)`. The
/// stored tags column is the deduplicated last-writer-wins view.
pub async fn save_ballot(db: &Db, ballot: &Ballot) -> Result<(), Error> {
    let tags = match &ballot.tagset {
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
        "INSERT INTO ballots (election_id, ballot_id, ballot, tags) VALUES (?, ?, ?, ?)",
    )
    .bind(&ballot.election_id)
    .bind(&ballot.ballot_id)
    .bind(ballot.to_string())
    .bind(tags)
    .execute(db)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(Error::BallotExists),
        Err(e) => Err(e.into()),
    }
}

pub async fn get_ballot(
    db: &Db,
    election_id: &str,
    ballot_id: &str,
) -> Result<Option<String>, Error> {
    let row = sqlx::query("SELECT ballot FROM ballots WHERE election_id = ? AND ballot_id = ?")
        .bind(election_id)
        .bind(ballot_id)
        .fetch_optional(db)
        .await?;
    Ok(row.map(|r| r.get(0)))
}

pub async fn all_ballots(db: &Db, election_id: &str) -> Result<Vec<String>, Error> {
    let rows = sqlx::query("SELECT ballot FROM ballots WHERE election_id = ? ORDER BY ballot_id")
        .bind(election_id)
        .fetch_all(db)
        .await?;
    Ok(rows.into_iter().map(|r| r.get(0)).collect())
}

/// Record who asked for a deletion. The ballot row stays; the protocol
/// only requires that an authenticated actor be identifiable.
pub async fn record_deletion(
    db: &Db,
    election_id: &str,
    ballot_id: &str,
    public_key: &PublicKey,
) -> Result<(), Error> {
    sqlx::query(
        "INSERT INTO deletions (election_id, ballot_id, public_key, deleted_at) \
         VALUES (?, ?, ?, datetime('now'))",
    )
    .bind(election_id)
    .bind(ballot_id)
    .bind(public_key.to_string())
    .execute(db)
    .await?;
    Ok(())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation)
        }
        _ => false,
    }
}
