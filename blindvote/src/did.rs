use crate::*;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use std::fmt;

/// A voter's decentralized-identity private key: a 32-byte scalar on the
/// NIST P-256 curve. Distinct from the RSA keys used for the ballot
/// blind-signature protocol.
#[derive(Clone)]
pub struct DIDPrivateKey(SigningKey);

impl DIDPrivateKey {
    pub fn new(bytes: &[u8]) -> Result<DIDPrivateKey, Error> {
        if bytes.len() != 32 {
            return Err(Error::DidPrivateKeyInvalid);
        }
        let key = SigningKey::from_slice(bytes).map_err(|_| Error::DidPrivateKeyInvalid)?;
        Ok(DIDPrivateKey(key))
    }

    pub fn from_hex(hex_key: &str) -> Result<DIDPrivateKey, Error> {
        Self::new(&hex::decode(hex_key)?)
    }

    pub fn generate() -> DIDPrivateKey {
        let mut rng = rand::rngs::OsRng;
        DIDPrivateKey(SigningKey::random(&mut rng))
    }

    /// Derive the public key by scalar multiplication of the base point.
    pub fn public_key(&self) -> DIDPublicKey {
        DIDPublicKey(VerifyingKey::from(&self.0))
    }

    /// ECDSA-sign the message (hashed as a whole with SHA-256), producing
    /// a DER-encoded signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig: EcdsaSignature = self.0.sign(message);
        Signature::from(sig.to_der().as_bytes().to_vec())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_bytes())
    }
}

/// A voter's DID public key: a compressed SEC-1 point (33 bytes).
#[derive(Debug, Clone)]
pub struct DIDPublicKey(VerifyingKey);

impl DIDPublicKey {
    pub fn new(bytes: &[u8]) -> Result<DIDPublicKey, Error> {
        if bytes.len() != 33 {
            return Err(Error::DidPublicKeyInvalid);
        }
        let key = VerifyingKey::from_sec1_bytes(bytes).map_err(|_| Error::DidPublicKeyInvalid)?;
        Ok(DIDPublicKey(key))
    }

    pub fn from_hex(hex_key: &str) -> Result<DIDPublicKey, Error> {
        Self::new(&hex::decode(hex_key)?)
    }

    /// The compressed SEC-1 encoding of the point.
    pub fn bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(true).as_bytes().to_vec()
    }

    /// Verify a DER-encoded ECDSA signature over the message.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), Error> {
        let sig = EcdsaSignature::from_der(signature.bytes())?;
        self.0.verify(message, &sig)?;
        Ok(())
    }

    /// The deterministic request ID bound to this identity:
    /// SHA-256(SHA-256(compressed public key bytes)).
    pub fn request_id(&self) -> Vec<u8> {
        sha256d(&self.bytes())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes())
    }
}

impl PartialEq for DIDPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes() == other.bytes()
    }
}

impl Eq for DIDPublicKey {}

impl fmt::Display for DIDPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", BASE64.encode(self.bytes()))
    }
}
