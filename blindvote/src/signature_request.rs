use crate::*;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::fmt;
use std::str::FromStr;

/// A voter's request for a blind signature over their ballot.
///
/// The request binds the voter's DID identity to an opaque blinded
/// ballot: the clerk can authenticate the voter and record the issuance
/// without ever seeing the ballot contents. Canonical form, five
/// segments: `(ElectionID, hex RequestID, base64 DIDPublicKey, hex
/// BlindBallot, base64 Signature)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureRequest {
    pub election_id: String,
    pub request_id: Vec<u8>,
    pub public_key: DIDPublicKey,
    pub blind_ballot: BlindBallot,
    pub signature: Option<Signature>,
}

impl SignatureRequest {
    /// Build an unsigned request. The request ID is derived from the
    /// voter's DID public key so the clerk's ledger can refuse repeats.
    pub fn new(
        election_id: &str,
        public_key: DIDPublicKey,
        blind_ballot: BlindBallot,
    ) -> Result<SignatureRequest, Error> {
        validate_election_id(election_id)?;
        let request_id = public_key.request_id();
        Ok(SignatureRequest {
            election_id: election_id.to_string(),
            request_id,
            public_key,
            blind_ballot,
            signature: None,
        })
    }

    /// Parse a raw signature request, as we would get in a POST body.
    pub fn from_bytes(raw: &[u8]) -> Result<SignatureRequest, Error> {
        if raw.len() > MAX_SIGNATURE_REQUEST_SIZE {
            return Err(Error::SignatureRequestTooBig);
        }
        let text =
            std::str::from_utf8(raw).map_err(|_| Error::MalformedSignatureRequest)?;

        let parts: Vec<&str> = text.split("\n\n").collect();
        if parts.len() != 5 {
            return Err(Error::MalformedSignatureRequest);
        }

        let election_id = parts[0];
        validate_election_id(election_id)?;

        let request_id = hex::decode(parts[1])?;
        if request_id.len() != 32 {
            return Err(Error::MalformedSignatureRequest);
        }

        let public_key = DIDPublicKey::new(&BASE64.decode(parts[2])?)?;
        let blind_ballot = BlindBallot::from_hex(parts[3])?;
        let signature = Some(Signature::new(parts[4].as_bytes())?);

        Ok(SignatureRequest {
            election_id: election_id.to_string(),
            request_id,
            public_key,
            blind_ballot,
            signature,
        })
    }

    pub fn has_signature(&self) -> bool {
        self.signature.is_some()
    }

    /// Sign the request with the voter's DID private key. The key must
    /// correspond to the embedded public key.
    pub fn sign(&mut self, private_key: &DIDPrivateKey) {
        let signature = private_key.sign(self.string_without_signature().as_bytes());
        self.signature = Some(signature);
    }

    /// Verify the voter's DID signature over the unsigned canonical form,
    /// and that the request ID really is the double-SHA-256 of the
    /// embedded public key. A request with a drifting request ID would
    /// slip past the clerk's one-signature-per-identity ledger.
    pub fn verify_signature(&self) -> Result<(), Error> {
        if self.request_id != self.public_key.request_id() {
            return Err(Error::RequestIdMismatch);
        }
        let signature = self.signature.as_ref().ok_or(Error::RequestSigNotFound)?;
        self.public_key
            .verify(self.string_without_signature().as_bytes(), signature)
            .map_err(|_| Error::RequestBadSig)
    }

    /// The canonical form without the signature segment, OK for signing.
    pub fn string_without_signature(&self) -> String {
        format!(
            "{}\n\n{}\n\n{}\n\n{}",
            self.election_id,
            hex::encode(&self.request_id),
            self.public_key,
            self.blind_ballot,
        )
    }
}

impl fmt::Display for SignatureRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.string_without_signature())?;
        if let Some(signature) = &self.signature {
            write!(f, "\n\n{}", signature)?;
        }
        Ok(())
    }
}

impl FromStr for SignatureRequest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignatureRequest::from_bytes(s.as_bytes())
    }
}

/// A signature request the clerk has honored: the original request plus
/// the clerk's blind signature over the blinded ballot. Canonical form is
/// the request followed by the ballot signature.
#[derive(Debug, Clone, PartialEq)]
pub struct FulfilledSignatureRequest {
    pub request: SignatureRequest,
    pub ballot_signature: Signature,
}

impl FulfilledSignatureRequest {
    pub fn new(
        request: SignatureRequest,
        ballot_signature: Signature,
    ) -> FulfilledSignatureRequest {
        FulfilledSignatureRequest {
            request,
            ballot_signature,
        }
    }

    pub fn from_bytes(raw: &[u8]) -> Result<FulfilledSignatureRequest, Error> {
        let text =
            std::str::from_utf8(raw).map_err(|_| Error::MalformedSignatureRequest)?;

        // The last segment is the ballot signature, the rest is the request
        let (request_text, sig_text) = text
            .rsplit_once("\n\n")
            .ok_or(Error::MalformedSignatureRequest)?;

        let request = SignatureRequest::from_bytes(request_text.as_bytes())?;
        let ballot_signature = Signature::new(sig_text.as_bytes())?;

        Ok(FulfilledSignatureRequest {
            request,
            ballot_signature,
        })
    }
}

impl fmt::Display for FulfilledSignatureRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\n\n{}", self.request, self.ballot_signature)
    }
}

impl FromStr for FulfilledSignatureRequest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FulfilledSignatureRequest::from_bytes(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DID_KEY_HEX: &str =
        "cc6fa0f0e191ad47a430fe04411c079f07d5c1ee47c3aa55f0e0204c8fe36d17";

    fn signed_request() -> SignatureRequest {
        let voter = DIDPrivateKey::from_hex(DID_KEY_HEX).unwrap();
        let mut request = SignatureRequest::new(
            "gov-2024",
            voter.public_key(),
            BlindBallot::from(vec![0xAB; 256]),
        )
        .unwrap();
        request.sign(&voter);
        request
    }

    #[test]
    fn round_trip_and_verify() {
        let request = signed_request();
        request.verify_signature().unwrap();

        let encoded = request.to_string();
        let decoded = SignatureRequest::from_bytes(encoded.as_bytes()).unwrap();
        assert_eq!(request, decoded);
        assert_eq!(decoded.to_string(), encoded);
        decoded.verify_signature().unwrap();
    }

    #[test]
    fn drifting_request_id_is_rejected() {
        let mut request = signed_request();
        request.request_id[0] ^= 0xFF;
        assert!(matches!(
            request.verify_signature(),
            Err(Error::RequestIdMismatch)
        ));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let mut request = signed_request();
        request.blind_ballot = BlindBallot::from(vec![0xCD; 256]);
        assert!(matches!(
            request.verify_signature(),
            Err(Error::RequestBadSig)
        ));
    }

    #[test]
    fn fulfilled_round_trip() {
        let fulfilled = FulfilledSignatureRequest::new(
            signed_request(),
            Signature::from(vec![0x42; 512]),
        );

        let encoded = fulfilled.to_string();
        let decoded = FulfilledSignatureRequest::from_bytes(encoded.as_bytes()).unwrap();
        assert_eq!(fulfilled, decoded);
        assert_eq!(decoded.to_string(), encoded);
    }
}
