use crate::config::Config;
use crate::error::Error;

use blindvote::PublicKey;
use log::info;
use rocket::tokio::sync::RwLock;

/// The election clerk's public key, fetched once from the clerk's
/// `/publickey` endpoint and cached for the life of the process.
pub struct ClerkKey(pub RwLock<Option<PublicKey>>);

impl ClerkKey {
    pub async fn get(&self, config: &Config) -> Result<PublicKey, Error> {
        {
            let cached = self.0.read().await;
            if let Some(key) = &*cached {
                return Ok(key.clone());
            }
        }

        let url = format!("{}/publickey", config.electionclerk_url);
        let pem = reqwest::get(&url).await?.error_for_status()?.text().await?;
        let key = PublicKey::from_pem(&pem)?;
        info!("fetched clerk public key {}", key.sha256_hex());

        let mut cached = self.0.write().await;
        *cached = Some(key.clone());
        Ok(key)
    }
}
