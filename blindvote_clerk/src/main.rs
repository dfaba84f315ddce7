#[macro_use]
extern crate rocket;

mod config;
mod db;
mod error;
mod handlers;
mod headers;

#[cfg(test)]
mod tests;

use rocket::data::{Limits, ToByteUnit};
use rocket::figment::Figment;
use rocket::{Build, Rocket};

pub fn build(figment: Figment) -> Rocket<Build> {
    // Canonical bodies can exceed Rocket's default string limit once a
    // 4096-bit signature is attached
    let figment = figment.merge(("limits", Limits::default().limit("string", 64.kibibytes())));

    rocket::custom(figment)
        .attach(config::stage())
        .attach(db::stage())
        .mount(
            "/",
            routes![
                handlers::readme,
                handlers::public_key,
                handlers::admins,
                handlers::all_elections,
                handlers::get_election,
                handlers::put_election,
                handlers::sign,
            ],
        )
}

#[launch]
fn rocket() -> _ {
    build(rocket::Config::figment())
}
