use crate::*;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use sha2::{Digest, Sha256};
use std::fmt;

/// We cannot go lower than this since it would hinder our ability to
/// differentiate between public keys and tag sets on ballots.
pub const ABSOLUTE_MIN_PUBLIC_KEY_SIZE: usize = 2048;

/// Recommended minimum public key size in bits. Call-sites that need a
/// different policy use [`PublicKey::with_min_length`].
pub const DEFAULT_MIN_PUBLIC_KEY_SIZE: usize = 4096;

/// An RSA public key, stored as DER-encoded PKIX bytes.
///
/// The canonical string form is the standard base64 encoding of the DER
/// bytes, and the key's identity is the hex SHA-256 of that string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    /// Create a new PublicKey from a base64 encoded item, as we would get
    /// in a PUT or POST request. Rejects keys below the recommended
    /// minimum length.
    pub fn new(base64_der: &[u8]) -> Result<PublicKey, Error> {
        Self::with_min_length(base64_der, DEFAULT_MIN_PUBLIC_KEY_SIZE)
    }

    /// Create a new PublicKey from a base64 encoded item, enforcing a
    /// caller-chosen minimum key length. The minimum may not go below
    /// [`ABSOLUTE_MIN_PUBLIC_KEY_SIZE`].
    pub fn with_min_length(base64_der: &[u8], min_bits: usize) -> Result<PublicKey, Error> {
        let min = min_bits.max(ABSOLUTE_MIN_PUBLIC_KEY_SIZE);
        let der = BASE64.decode(base64_der)?;
        Self::from_der(der, min)
    }

    /// Create a new PublicKey from raw DER bytes, enforcing a minimum
    /// key length.
    pub fn from_der(der: Vec<u8>, min_bits: usize) -> Result<PublicKey, Error> {
        let pk = PublicKey(der);
        let bits = pk.key_length()?;
        if bits < min_bits {
            return Err(Error::PublicKeyTooShort {
                bits,
                min: min_bits,
            });
        }
        Ok(pk)
    }

    /// Create a new PublicKey from a PEM encoded block tagged either
    /// `RSA PUBLIC KEY` or `PUBLIC KEY`.
    pub fn from_pem(pem: &str) -> Result<PublicKey, Error> {
        let key = if pem.contains("-----BEGIN RSA PUBLIC KEY-----") {
            RsaPublicKey::from_pkcs1_pem(pem).map_err(|_| Error::PublicKeyParse)?
        } else if pem.contains("-----BEGIN PUBLIC KEY-----") {
            RsaPublicKey::from_public_key_pem(pem).map_err(|_| Error::PublicKeyParse)?
        } else {
            let found = pem
                .lines()
                .find(|l| l.starts_with("-----BEGIN"))
                .unwrap_or("no PEM block")
                .trim_matches('-')
                .trim()
                .trim_start_matches("BEGIN ")
                .to_string();
            return Err(Error::PublicKeyWrongPemType(found));
        };

        Self::from_crypto_key(&key)
    }

    /// Create a new PublicKey from an [`rsa::RsaPublicKey`].
    pub fn from_crypto_key(key: &RsaPublicKey) -> Result<PublicKey, Error> {
        let der = key
            .to_public_key_der()
            .map_err(|_| Error::PublicKeyParse)?;
        Ok(PublicKey(der.as_bytes().to_vec()))
    }

    /// The raw DER bytes of the key.
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Parse the DER bytes into an [`rsa::RsaPublicKey`], ready for
    /// crypto operations.
    pub fn crypto_key(&self) -> Result<RsaPublicKey, Error> {
        RsaPublicKey::from_public_key_der(&self.0).map_err(|_| Error::PublicKeyParse)
    }

    /// The number of bits in the key modulus.
    pub fn key_length(&self) -> Result<usize, Error> {
        Ok(self.crypto_key()?.n().bits())
    }

    /// The key's identity: the hex SHA-256 of its canonical base64 string.
    pub fn sha256_hex(&self) -> String {
        hex::encode(Sha256::digest(self.to_string().as_bytes()))
    }

    /// PEM-encode the key in PKIX form.
    pub fn to_pem(&self) -> Result<String, Error> {
        self.crypto_key()?
            .to_public_key_pem(LineEnding::LF)
            .map_err(|_| Error::PublicKeyParse)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", BASE64.encode(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_length_floor() {
        let mut rng = rand::thread_rng();

        let small = rsa::RsaPrivateKey::new(&mut rng, 1024).unwrap();
        let small_pub = PublicKey::from_crypto_key(&small.to_public_key()).unwrap();
        let b64 = small_pub.to_string();

        // 1024 bits is under the absolute floor no matter what the caller asks for
        match PublicKey::with_min_length(b64.as_bytes(), 1024) {
            Err(Error::PublicKeyTooShort { bits, min }) => {
                assert_eq!(bits, 1024);
                assert_eq!(min, ABSOLUTE_MIN_PUBLIC_KEY_SIZE);
            }
            other => panic!("expected PublicKeyTooShort, got {:?}", other),
        }

        let floor = rsa::RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let floor_pub = PublicKey::from_crypto_key(&floor.to_public_key()).unwrap();
        let b64 = floor_pub.to_string();

        // Accepted at the floor, rejected by the default minimum
        assert!(PublicKey::with_min_length(b64.as_bytes(), 2048).is_ok());
        assert!(matches!(
            PublicKey::new(b64.as_bytes()),
            Err(Error::PublicKeyTooShort { .. })
        ));
    }

    #[test]
    fn pem_round_trip() {
        let mut rng = rand::thread_rng();
        let key = rsa::RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let public = PublicKey::from_crypto_key(&key.to_public_key()).unwrap();

        let pem = public.to_pem().unwrap();
        let parsed = PublicKey::from_pem(&pem).unwrap();
        assert_eq!(public, parsed);

        assert!(matches!(
            PublicKey::from_pem("-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n"),
            Err(Error::PublicKeyWrongPemType(_))
        ));
    }
}
