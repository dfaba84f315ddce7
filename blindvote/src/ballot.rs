use crate::*;

use std::fmt;
use std::str::FromStr;

/// A hex-encoded RSA-blinded full-domain hash of a ballot's unsigned
/// canonical form, produced by [`Ballot::blind`] and carried inside a
/// [`SignatureRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlindBallot(Vec<u8>);

impl BlindBallot {
    pub fn from_hex(hex_ballot: &str) -> Result<BlindBallot, Error> {
        Ok(BlindBallot(hex::decode(hex_ballot)?))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for BlindBallot {
    fn from(bytes: Vec<u8>) -> Self {
        BlindBallot(bytes)
    }
}

impl fmt::Display for BlindBallot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// An anonymous ballot: the record `(ElectionID, BallotID, Vote, TagSet?,
/// Signature?)`.
///
/// The ballot ID is a caller-chosen string; the ballot box treats
/// `(ElectionID, BallotID)` as the storage key. The signature, when
/// present, is the election clerk's blind signature over the ballot's
/// unsigned canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    pub election_id: String,
    pub ballot_id: String,
    pub vote: Vote,
    pub tagset: Option<TagSet>,
    pub signature: Option<Signature>,
}

impl Ballot {
    pub fn new(
        election_id: &str,
        ballot_id: &str,
        vote: Vote,
        tagset: Option<TagSet>,
    ) -> Result<Ballot, Error> {
        validate_election_id(election_id)?;
        validate_ballot_id(ballot_id)?;
        Ok(Ballot {
            election_id: election_id.to_string(),
            ballot_id: ballot_id.to_string(),
            vote,
            tagset,
            signature: None,
        })
    }

    /// Parse a raw ballot, as we would get in a PUT body.
    ///
    /// The ballot is split on double linebreaks. Three segments are
    /// `(election-id, ballot-id, vote)` and five add a tag set and a
    /// signature. Four segments are ambiguous: a segment containing a
    /// linebreak is a tag set, otherwise anything longer than the largest
    /// possible single tag must be a signature, since the smallest
    /// permitted signature is longer than the largest possible tag.
    pub fn from_bytes(raw: &[u8]) -> Result<Ballot, Error> {
        if raw.len() > MAX_BALLOT_SIZE {
            return Err(Error::BallotTooBig);
        }
        let text = std::str::from_utf8(raw).map_err(|_| Error::MalformedBallot)?;

        let parts: Vec<&str> = text.split("\n\n").collect();
        let (tags_sec, sign_sec) = match parts.len() {
            3 => (0, 0),
            4 => {
                if parts[3].contains('\n') {
                    (3, 0)
                } else if parts[3].len() > MAX_TAG_KEY_SIZE + MAX_TAG_VALUE_SIZE + 1 {
                    (0, 3)
                } else {
                    (3, 0)
                }
            }
            5 => (3, 4),
            _ => return Err(Error::MalformedBallot),
        };

        let election_id = parts[0];
        validate_election_id(election_id)?;

        let ballot_id = parts[1];
        validate_ballot_id(ballot_id)?;

        let vote = Vote::from_bytes(parts[2].as_bytes())
            .map_err(|e| Error::BallotInvalidVote(Box::new(e)))?;

        let tagset = if tags_sec != 0 {
            Some(
                TagSet::from_bytes(parts[tags_sec].as_bytes())
                    .map_err(|e| Error::BallotInvalidTagSet(Box::new(e)))?,
            )
        } else {
            None
        };

        let signature = if sign_sec != 0 {
            Some(
                Signature::new(parts[sign_sec].as_bytes())
                    .map_err(|e| Error::BallotInvalidSignature(Box::new(e)))?,
            )
        } else {
            None
        };

        Ok(Ballot {
            election_id: election_id.to_string(),
            ballot_id: ballot_id.to_string(),
            vote,
            tagset,
            signature,
        })
    }

    pub fn has_tagset(&self) -> bool {
        matches!(&self.tagset, Some(t) if !t.is_empty())
    }

    pub fn has_signature(&self) -> bool {
        self.signature.is_some()
    }

    /// Verify the ballot's signature as a classical PKCS#1 v1.5 signature.
    pub fn verify_signature(&self, public_key: &PublicKey) -> Result<(), Error> {
        let signature = self.signature.as_ref().ok_or(Error::BallotSigNotFound)?;
        signature
            .verify_raw(public_key, self.string_without_signature().as_bytes())
            .map_err(|_| Error::BallotBadSig)
    }

    /// Verify the ballot's signature as a blind signature under the
    /// election clerk's key.
    pub fn verify_blind_signature(&self, public_key: &PublicKey) -> Result<(), Error> {
        let signature = self.signature.as_ref().ok_or(Error::BallotSigNotFound)?;
        signature
            .verify_blind(public_key, self.string_without_signature().as_bytes())
            .map_err(|_| Error::BallotBadSig)
    }

    /// Blind the ballot for signing by the election clerk, using a
    /// full-domain hash of half the clerk's key length. Returns the
    /// blinded ballot and the unblinder the voter must retain.
    ///
    /// Refuses to operate on a ballot that already carries a signature:
    /// blinding a signed ballot would leak its contents to the clerk.
    pub fn blind(&self, signing_key: &PublicKey) -> Result<(BlindBallot, Vec<u8>), Error> {
        if self.has_signature() {
            return Err(Error::BallotCannotBlind(Box::new(Error::BallotHasSignature)));
        }

        let key_length = signing_key
            .key_length()
            .map_err(|e| Error::BallotCannotBlind(Box::new(e)))?;
        let hashed = full_domain_hash(
            key_length / 2,
            self.string_without_signature().as_bytes(),
        );

        let key = signing_key
            .crypto_key()
            .map_err(|e| Error::BallotCannotBlind(Box::new(e)))?;
        let (blinded, unblinder) =
            blind(&key, &hashed).map_err(|e| Error::BallotCannotBlind(Box::new(e)))?;

        Ok((BlindBallot(blinded), unblinder))
    }

    /// Unblind the clerk's blind signature and install it on the ballot,
    /// verifying on the way that it actually signs this ballot.
    pub fn unblind(
        &mut self,
        signing_key: &PublicKey,
        blind_sig: Signature,
        unblinder: &[u8],
    ) -> Result<(), Error> {
        if self.has_signature() {
            return Err(Error::BallotCannotUnblind(Box::new(
                Error::BallotHasSignature,
            )));
        }

        let signature = blind_sig
            .unblind(signing_key, unblinder)
            .map_err(|e| Error::BallotCannotUnblind(Box::new(e)))?;

        signature
            .verify_blind(signing_key, self.string_without_signature().as_bytes())
            .map_err(|e| Error::BallotCannotUnblind(Box::new(e)))?;

        self.signature = Some(signature);
        Ok(())
    }

    /// The canonical form without the signature segment, OK for signing.
    pub fn string_without_signature(&self) -> String {
        let mut s = format!(
            "{}\n\n{}\n\n{}",
            self.election_id, self.ballot_id, self.vote
        );
        if let Some(tagset) = &self.tagset {
            if !tagset.is_empty() {
                s.push_str("\n\n");
                s.push_str(&tagset.to_string());
            }
        }
        s
    }
}

impl fmt::Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.string_without_signature())?;
        if let Some(signature) = &self.signature {
            write!(f, "\n\n{}", signature)?;
        }
        Ok(())
    }
}

impl FromStr for Ballot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ballot::from_bytes(s.as_bytes())
    }
}

pub fn validate_election_id(election_id: &str) -> Result<(), Error> {
    if election_id.len() > MAX_ELECTION_ID_SIZE {
        return Err(Error::ElectionIdTooBig);
    }
    if !VALID_ELECTION_ID.is_match(election_id) {
        return Err(Error::ElectionIdInvalid);
    }
    Ok(())
}

pub fn validate_ballot_id(ballot_id: &str) -> Result<(), Error> {
    if ballot_id.len() > MAX_BALLOT_ID_SIZE {
        return Err(Error::BallotIdTooBig);
    }
    if !VALID_BALLOT_ID.is_match(ballot_id) {
        return Err(Error::BallotIdInvalid);
    }
    Ok(())
}
