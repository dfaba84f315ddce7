use crate::*;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rsa::traits::PublicKeyParts;
use rsa::Pkcs1v15Sign;
use sha2::{Digest, Sha256};
use std::fmt;

/// A cryptographic signature, transmitted as base64.
///
/// The same representation carries two interpretations: a classical
/// PKCS#1 v1.5 RSA signature over the SHA-256 of a message (`verify_raw`),
/// and an unpadded blind RSA signature over a full-domain hash
/// (`verify_blind`). DID ECDSA signatures on signature requests reuse the
/// container with DER bytes inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Create a new Signature from a base64 encoded item, as we would get
    /// in a PUT or POST request.
    pub fn new(base64_sig: &[u8]) -> Result<Signature, Error> {
        Ok(Signature(BASE64.decode(base64_sig)?))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Verify a classical PKCS#1 v1.5 signature over the SHA-256 of the
    /// given message.
    pub fn verify_raw(&self, public_key: &PublicKey, message: &[u8]) -> Result<(), Error> {
        let key = public_key.crypto_key()?;
        if self.0.len() != key.size() {
            return Err(Error::SignatureWrongSize);
        }
        let digest = Sha256::digest(message);
        key.verify(Pkcs1v15Sign::new::<Sha256>(), &digest, &self.0)?;
        Ok(())
    }

    /// Verify an unblinded blind signature over the given message. The
    /// message is hashed with a full-domain hash of half the key length;
    /// no padding is involved.
    pub fn verify_blind(&self, public_key: &PublicKey, message: &[u8]) -> Result<(), Error> {
        let key = public_key.crypto_key()?;
        let hashed = full_domain_hash(key.n().bits() / 2, message);
        verify_blind_signature(&key, &hashed, &self.0)
    }

    /// Strip the blinding factor from a blind signature returned by the
    /// signing authority.
    pub fn unblind(&self, public_key: &PublicKey, unblinder: &[u8]) -> Result<Signature, Error> {
        let key = public_key.crypto_key()?;
        if self.0.len() != key.size() {
            return Err(Error::SignatureWrongSize);
        }
        Ok(Signature(unblind(&key, &self.0, unblinder)))
    }
}

impl From<Vec<u8>> for Signature {
    fn from(bytes: Vec<u8>) -> Self {
        Signature(bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", BASE64.encode(&self.0))
    }
}

/// Verify the signed-request headers that authenticate request-level
/// actions: a base64 public key and a base64 signature over the ASCII
/// concatenation `METHOD SP REQUEST-URI`. Returns the authenticated key.
pub fn verify_signed_request(
    public_key_b64: &[u8],
    signature_b64: &[u8],
    method: &str,
    uri: &str,
) -> Result<PublicKey, Error> {
    let public_key =
        PublicKey::with_min_length(public_key_b64, ABSOLUTE_MIN_PUBLIC_KEY_SIZE)?;
    let signature = Signature::new(signature_b64)?;

    let signed = format!("{} {}", method, uri);
    signature
        .verify_raw(&public_key, signed.as_bytes())
        .map_err(|_| Error::RequestHeadersBadSig)?;

    Ok(public_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_sign_and_verify() {
        let key = PrivateKey::generate(2048).unwrap();
        let public = key.public_key().unwrap();

        let sig = key.sign_raw(b"PUT /vote/gov-2024/abc").unwrap();
        sig.verify_raw(&public, b"PUT /vote/gov-2024/abc").unwrap();
        assert!(sig.verify_raw(&public, b"PUT /vote/gov-2024/xyz").is_err());
    }

    #[test]
    fn signed_request_headers() {
        let key = PrivateKey::generate(2048).unwrap();
        let public = key.public_key().unwrap();

        let sig = key.sign_raw(b"DELETE /vote/gov-2024/abc").unwrap();
        let authed = verify_signed_request(
            public.to_string().as_bytes(),
            sig.to_string().as_bytes(),
            "DELETE",
            "/vote/gov-2024/abc",
        )
        .unwrap();
        assert_eq!(authed, public);

        assert!(matches!(
            verify_signed_request(
                public.to_string().as_bytes(),
                sig.to_string().as_bytes(),
                "DELETE",
                "/vote/gov-2024/other",
            ),
            Err(Error::RequestHeadersBadSig)
        ));
    }
}
