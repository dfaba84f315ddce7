use log::error;
use rocket::fairing::AdHoc;
use serde::Deserialize;

/// Ballot box configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables.
#[derive(Deserialize)]
pub struct Config {
    /// URL of the election clerk, used to discover its public key
    pub electionclerk_url: String,
    pub database: DbConfig,
}

#[derive(Deserialize, Clone)]
pub struct DbConfig {
    /// Backend DSN string, opaque to the protocol core
    pub url: String,
    /// -1 means "let the driver decide"
    #[serde(default = "default_max_idle_connections")]
    pub max_idle_connections: i32,
    /// Seconds
    #[serde(default = "default_conn_max_lifetime")]
    pub conn_max_lifetime: u64,
}

fn default_max_idle_connections() -> i32 {
    -1
}

fn default_conn_max_lifetime() -> u64 {
    14440
}

pub fn stage() -> AdHoc {
    AdHoc::try_on_ignite("Ballot Box Config", |rocket| async {
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load ballot box config: {}", e);
                return Err(rocket);
            }
        };
        Ok(rocket.manage(config))
    })
}
