#[macro_use]
extern crate rocket;

mod clerk;
mod config;
mod db;
mod error;
mod handlers;
mod headers;

#[cfg(test)]
mod tests;

use blindvote::PublicKey;
use clerk::ClerkKey;
use rocket::data::{Limits, ToByteUnit};
use rocket::figment::Figment;
use rocket::tokio::sync::RwLock;
use rocket::{Build, Rocket};

pub fn build(figment: Figment) -> Rocket<Build> {
    build_with_clerk_key(figment, None)
}

/// Tests preload the clerk key so no clerk server needs to be running.
pub fn build_with_clerk_key(figment: Figment, clerk_key: Option<PublicKey>) -> Rocket<Build> {
    let figment = figment.merge(("limits", Limits::default().limit("string", 64.kibibytes())));

    rocket::custom(figment)
        .manage(ClerkKey(RwLock::new(clerk_key)))
        .attach(config::stage())
        .attach(db::stage())
        .mount(
            "/",
            routes![
                handlers::get_roll,
                handlers::get_ballot,
                handlers::put_ballot,
                handlers::delete_ballot,
            ],
        )
}

#[launch]
fn rocket() -> _ {
    build(rocket::Config::figment())
}
