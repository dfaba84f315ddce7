use blindvote::{DIDPublicKey, PrivateKey, PublicKey, UserSet};
use log::{error, info};
use rocket::fairing::AdHoc;
use serde::Deserialize;

/// Clerk configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. Paths are resolved relative to the working
/// directory.
#[derive(Deserialize)]
pub struct Config {
    /// Path to the clerk's PEM private key
    pub signing_key: String,
    /// Path to the admin user-set file
    pub admins: String,
    /// Path to the human-readable service description
    pub readme: String,
    /// Hex-encoded DID admin public key: the alternate admin-auth path
    #[serde(default)]
    pub did_public_key: Option<String>,
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

/// Process-wide clerk state, initialised once at startup and read-only
/// thereafter. Handed to each request handler as managed state.
pub struct ClerkState {
    pub signing_key: PrivateKey,
    pub public_key: PublicKey,
    pub public_key_pem: String,
    pub admins: UserSet,
    pub readme: String,
    pub did_public_key: Option<DIDPublicKey>,
}

impl ClerkState {
    fn from_config(config: &Config) -> Result<ClerkState, String> {
        let pem = std::fs::read_to_string(&config.signing_key)
            .map_err(|e| format!("could not read signing key {}: {}", config.signing_key, e))?;
        let signing_key =
            PrivateKey::from_pem(&pem).map_err(|e| format!("bad signing key: {}", e))?;
        let public_key = signing_key
            .public_key()
            .map_err(|e| format!("bad signing key: {}", e))?;
        let public_key_pem = public_key
            .to_pem()
            .map_err(|e| format!("bad signing key: {}", e))?;

        let raw_admins = std::fs::read(&config.admins)
            .map_err(|e| format!("could not read admins {}: {}", config.admins, e))?;
        let admins =
            UserSet::from_bytes(&raw_admins).map_err(|e| format!("bad admins file: {}", e))?;

        let readme = std::fs::read_to_string(&config.readme)
            .map_err(|e| format!("could not read readme {}: {}", config.readme, e))?;

        let did_public_key = match &config.did_public_key {
            Some(hex_key) => Some(
                DIDPublicKey::from_hex(hex_key)
                    .map_err(|e| format!("bad did_public_key: {}", e))?,
            ),
            None => None,
        };

        Ok(ClerkState {
            signing_key,
            public_key,
            public_key_pem,
            admins,
            readme,
            did_public_key,
        })
    }
}

pub fn stage() -> AdHoc {
    AdHoc::try_on_ignite("Clerk Config", |rocket| async {
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load clerk config: {}", e);
                return Err(rocket);
            }
        };

        let state = match ClerkState::from_config(&config) {
            Ok(state) => state,
            Err(e) => {
                error!("Failed to initialise clerk state: {}", e);
                return Err(rocket);
            }
        };
        info!(
            "Loaded clerk signing key {}",
            state.public_key.sha256_hex()
        );

        Ok(rocket.manage(config).manage(state))
    })
}
