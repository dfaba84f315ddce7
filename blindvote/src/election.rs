use crate::*;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use std::fmt;
use std::str::FromStr;

/// The key an election administrator seals an election with. Two admin
/// paths exist side by side: an RSA key (DER PKIX bytes) and a DID key
/// (33-byte compressed P-256 point). The wire form is the base64 of the
/// key bytes either way; a 33-byte compressed point is a DID key,
/// anything else must parse as RSA DER.
#[derive(Debug, Clone)]
pub enum AdminKey {
    Rsa(PublicKey),
    Did(DIDPublicKey),
}

impl AdminKey {
    pub fn from_base64(base64_key: &[u8]) -> Result<AdminKey, Error> {
        let bytes = BASE64.decode(base64_key)?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<AdminKey, Error> {
        if bytes.len() == 33 && (bytes[0] == 0x02 || bytes[0] == 0x03) {
            Ok(AdminKey::Did(DIDPublicKey::new(&bytes)?))
        } else {
            Ok(AdminKey::Rsa(PublicKey::from_der(
                bytes,
                ABSOLUTE_MIN_PUBLIC_KEY_SIZE,
            )?))
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        match self {
            AdminKey::Rsa(pk) => pk.bytes().to_vec(),
            AdminKey::Did(dk) => dk.bytes(),
        }
    }

    /// Verify a signature over a message, dispatching on the key kind:
    /// raw PKCS#1 v1.5 for RSA, DER ECDSA for DID.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), Error> {
        match self {
            AdminKey::Rsa(pk) => signature.verify_raw(pk, message),
            AdminKey::Did(dk) => dk.verify(message, signature),
        }
    }
}

impl PartialEq for AdminKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes() == other.bytes()
    }
}

impl Eq for AdminKey {}

impl fmt::Display for AdminKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", BASE64.encode(self.bytes()))
    }
}

/// An election descriptor, sealed by an administrator's self-signature
/// and immutable thereafter.
///
/// Canonical form: `(ElectionID, Start, End, TagSet?, PublicKey,
/// Signature)` with RFC-3339 timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Election {
    pub election_id: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub tagset: Option<TagSet>,
    pub public_key: AdminKey,
    pub signature: Option<Signature>,
}

impl Election {
    pub fn new(
        election_id: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        tagset: Option<TagSet>,
        public_key: AdminKey,
    ) -> Result<Election, Error> {
        validate_election_id(election_id)?;
        Ok(Election {
            election_id: election_id.to_string(),
            start,
            end,
            tagset,
            public_key,
            signature: None,
        })
    }

    /// Parse a canonical election, as we would get in a PUT body.
    /// Five segments are `(id, start, end, key, signature)`; six carry a
    /// tag set before the key.
    pub fn from_bytes(raw: &[u8]) -> Result<Election, Error> {
        let text = std::str::from_utf8(raw).map_err(|_| Error::MalformedElection)?;
        let parts: Vec<&str> = text.split("\n\n").collect();

        let (tags_sec, key_sec, sign_sec) = match parts.len() {
            5 => (0, 3, 4),
            6 => (3, 4, 5),
            _ => return Err(Error::MalformedElection),
        };

        let election_id = parts[0];
        validate_election_id(election_id)?;

        let start = DateTime::parse_from_rfc3339(parts[1])?;
        let end = DateTime::parse_from_rfc3339(parts[2])?;

        let tagset = if tags_sec != 0 {
            Some(TagSet::from_bytes(parts[tags_sec].as_bytes())?)
        } else {
            None
        };

        let public_key = AdminKey::from_base64(parts[key_sec].as_bytes())?;
        let signature = Some(Signature::new(parts[sign_sec].as_bytes())?);

        Ok(Election {
            election_id: election_id.to_string(),
            start,
            end,
            tagset,
            public_key,
            signature,
        })
    }

    /// Parse an unsigned election draft `(id, start, end, tagset?)` and
    /// attach the administrator's key, ready for sealing.
    pub fn from_draft(raw: &[u8], public_key: AdminKey) -> Result<Election, Error> {
        let text = std::str::from_utf8(raw).map_err(|_| Error::MalformedElection)?;
        let parts: Vec<&str> = text.split("\n\n").collect();

        let tags_sec = match parts.len() {
            3 => 0,
            4 => 3,
            _ => return Err(Error::MalformedElection),
        };

        let election_id = parts[0];
        validate_election_id(election_id)?;

        let start = DateTime::parse_from_rfc3339(parts[1])?;
        let end = DateTime::parse_from_rfc3339(parts[2])?;

        let tagset = if tags_sec != 0 {
            Some(TagSet::from_bytes(parts[tags_sec].as_bytes())?)
        } else {
            None
        };

        Election::new(election_id, start, end, tagset, public_key)
    }

    pub fn has_tagset(&self) -> bool {
        matches!(&self.tagset, Some(t) if !t.is_empty())
    }

    pub fn has_signature(&self) -> bool {
        self.signature.is_some()
    }

    /// Seal the election with an RSA admin key. The embedded public key
    /// must belong to the given private key.
    pub fn sign(&mut self, private_key: &PrivateKey) -> Result<(), Error> {
        let signature = private_key.sign_raw(self.string_without_signature().as_bytes())?;
        self.signature = Some(signature);
        Ok(())
    }

    /// Seal the election with a DID admin key.
    pub fn sign_did(&mut self, private_key: &DIDPrivateKey) {
        let signature = private_key.sign(self.string_without_signature().as_bytes());
        self.signature = Some(signature);
    }

    /// Verify the election's self-signature against its embedded key,
    /// dispatching on the admin key kind.
    pub fn verify_signature(&self) -> Result<(), Error> {
        let signature = self.signature.as_ref().ok_or(Error::ElectionSigNotFound)?;
        self.public_key
            .verify(self.string_without_signature().as_bytes(), signature)
            .map_err(|_| Error::ElectionBadSig)
    }

    /// The canonical form without the signature segment, OK for signing.
    pub fn string_without_signature(&self) -> String {
        let mut s = format!(
            "{}\n\n{}\n\n{}",
            self.election_id,
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        if let Some(tagset) = &self.tagset {
            if !tagset.is_empty() {
                s.push_str("\n\n");
                s.push_str(&tagset.to_string());
            }
        }
        s.push_str("\n\n");
        s.push_str(&self.public_key.to_string());
        s
    }
}

impl fmt::Display for Election {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.string_without_signature())?;
        if let Some(signature) = &self.signature {
            write!(f, "\n\n{}", signature)?;
        }
        Ok(())
    }
}

impl FromStr for Election {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Election::from_bytes(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DID_KEY_HEX: &str =
        "cc6fa0f0e191ad47a430fe04411c079f07d5c1ee47c3aa55f0e0204c8fe36d17";

    fn did_election() -> (Election, DIDPrivateKey) {
        let admin = DIDPrivateKey::from_hex(DID_KEY_HEX).unwrap();
        let election = Election::new(
            "gov-2024",
            DateTime::parse_from_rfc3339("2024-06-01T08:00:00Z").unwrap(),
            DateTime::parse_from_rfc3339("2024-06-01T20:00:00Z").unwrap(),
            Some(TagSet::from_bytes(b"district=7").unwrap()),
            AdminKey::Did(admin.public_key()),
        )
        .unwrap();
        (election, admin)
    }

    #[test]
    fn did_sign_round_trip() {
        let (mut election, admin) = did_election();
        election.sign_did(&admin);
        election.verify_signature().unwrap();

        let encoded = election.to_string();
        let decoded = Election::from_bytes(encoded.as_bytes()).unwrap();
        assert_eq!(election, decoded);
        assert_eq!(decoded.to_string(), encoded);
        decoded.verify_signature().unwrap();
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let (mut election, admin) = did_election();
        election.sign_did(&admin);

        let mut sig = election.signature.as_ref().unwrap().bytes().to_vec();
        sig[4] ^= 0x01;
        election.signature = Some(Signature::from(sig));
        assert!(matches!(
            election.verify_signature(),
            Err(Error::ElectionBadSig)
        ));
    }

    #[test]
    fn rsa_admin_path() {
        let key = PrivateKey::generate(2048).unwrap();
        let public = key.public_key().unwrap();

        let mut election = Election::new(
            "gov-2024",
            DateTime::parse_from_rfc3339("2024-06-01T08:00:00Z").unwrap(),
            DateTime::parse_from_rfc3339("2024-06-01T20:00:00Z").unwrap(),
            None,
            AdminKey::Rsa(public),
        )
        .unwrap();
        election.sign(&key).unwrap();
        election.verify_signature().unwrap();

        let decoded = Election::from_bytes(election.to_string().as_bytes()).unwrap();
        assert!(matches!(decoded.public_key, AdminKey::Rsa(_)));
        decoded.verify_signature().unwrap();
    }

    #[test]
    fn draft_has_no_signature() {
        let admin = DIDPrivateKey::from_hex(DID_KEY_HEX).unwrap();
        let draft = b"gov-2024\n\n2024-06-01T08:00:00Z\n\n2024-06-01T20:00:00Z";
        let election = Election::from_draft(draft, AdminKey::Did(admin.public_key())).unwrap();
        assert!(!election.has_signature());
        assert!(election.verify_signature().is_err());
    }
}
