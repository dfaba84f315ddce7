use crate::*;

use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("blindvote: ballot is too big - maximum ballot size is {} bytes", MAX_BALLOT_SIZE)]
    BallotTooBig,

    #[error("blindvote: invalid ballot format")]
    MalformedBallot,

    #[error("blindvote: election ID is too big - maximum size is {} bytes", MAX_ELECTION_ID_SIZE)]
    ElectionIdTooBig,

    #[error("blindvote: election ID contains illegal characters - valid characters are as per RFC 3986 section 2")]
    ElectionIdInvalid,

    #[error("blindvote: ballot ID is too big - maximum size is {} bytes", MAX_BALLOT_ID_SIZE)]
    BallotIdTooBig,

    #[error("blindvote: ballot ID contains illegal characters - valid characters are as per RFC 3986 section 2")]
    BallotIdInvalid,

    #[error("blindvote: cannot parse vote in ballot")]
    BallotInvalidVote(#[source] Box<Error>),

    #[error("blindvote: cannot parse tag set in ballot")]
    BallotInvalidTagSet(#[source] Box<Error>),

    #[error("blindvote: cannot parse ballot signature")]
    BallotInvalidSignature(#[source] Box<Error>),

    #[error("blindvote: ballot signature does not sign this ballot")]
    BallotBadSig,

    #[error("blindvote: could not verify ballot signature - signature does not exist")]
    BallotSigNotFound,

    #[error("blindvote: the ballot already has a signature")]
    BallotHasSignature,

    #[error("blindvote: could not blind ballot")]
    BallotCannotBlind(#[source] Box<Error>),

    #[error("blindvote: could not unblind ballot")]
    BallotCannotUnblind(#[source] Box<Error>),

    #[error("blindvote: vote is too big - maximum vote size is {} bytes", MAX_VOTE_SIZE)]
    VoteTooBig,

    #[error("blindvote: vote has too many choices - maximum is {}", MAX_VOTE_CHOICES)]
    VoteTooManyChoices,

    #[error("blindvote: vote choice is too big - maximum choice size is {} bytes", MAX_VOTE_CHOICE_SIZE)]
    VoteChoiceTooBig,

    #[error("blindvote: vote choice contains illegal characters")]
    VoteChoiceInvalid,

    #[error("blindvote: malformed tag - expected key=value")]
    MalformedTag,

    #[error("blindvote: tag key is too big - maximum key size is {} bytes", MAX_TAG_KEY_SIZE)]
    TagKeyTooBig,

    #[error("blindvote: tag key contains illegal characters")]
    TagKeyInvalid,

    #[error("blindvote: tag value is too big - maximum value size is {} bytes", MAX_TAG_VALUE_SIZE)]
    TagValueTooBig,

    #[error("blindvote: tag value contains illegal characters")]
    TagValueInvalid,

    #[error("blindvote: tag set has too many tags - maximum is {}", MAX_TAGS)]
    TagSetTooBig,

    #[error("blindvote: invalid public key - too short, please use at least {min} bits ({bits} given)")]
    PublicKeyTooShort { bits: usize, min: usize },

    #[error("blindvote: could not parse public key DER bytes")]
    PublicKeyParse,

    #[error("blindvote: could not find RSA PUBLIC KEY or PUBLIC KEY block (found {0})")]
    PublicKeyWrongPemType(String),

    #[error("blindvote: could not parse private key PEM")]
    PrivateKeyParse,

    #[error("blindvote: signature does not match the key modulus length")]
    SignatureWrongSize,

    #[error("blindvote: blinded message is not within the key modulus")]
    BlindedMessageOutOfRange,

    #[error("blindvote: blind signature does not verify")]
    BlindSignatureInvalid,

    #[error("blindvote: invalid election format")]
    MalformedElection,

    #[error("blindvote: could not verify election signature - signature does not exist")]
    ElectionSigNotFound,

    #[error("blindvote: election signature does not sign this election")]
    ElectionBadSig,

    #[error("blindvote: cannot parse election timestamp: {0}")]
    MalformedTimestamp(#[from] chrono::ParseError),

    #[error("blindvote: invalid signature request format")]
    MalformedSignatureRequest,

    #[error("blindvote: signature request is too big")]
    SignatureRequestTooBig,

    #[error("blindvote: request ID is not the double-SHA-256 of the public key")]
    RequestIdMismatch,

    #[error("blindvote: could not verify signature request - signature does not exist")]
    RequestSigNotFound,

    #[error("blindvote: signature request signature does not sign this request")]
    RequestBadSig,

    #[error("blindvote: invalid DID key - expected a 32 byte P-256 scalar")]
    DidPrivateKeyInvalid,

    #[error("blindvote: invalid DID public key - expected a 33 byte compressed P-256 point")]
    DidPublicKeyInvalid,

    #[error("blindvote: invalid user format")]
    MalformedUser,

    #[error("blindvote: could not read base64 encoded bytes: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("blindvote: could not read hex encoded bytes: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("blindvote: signed request headers do not sign this request")]
    RequestHeadersBadSig,

    #[error("blindvote: RSA error: {0}")]
    RsaError(#[from] rsa::Error),

    #[error("blindvote: ECDSA error: {0}")]
    EcdsaError(#[from] p256::ecdsa::Error),
}

impl Error {
    /// True when the error is a parse or size failure rather than a
    /// cryptographic verification failure.
    pub fn is_malformed(&self) -> bool {
        !matches!(
            self,
            Error::BallotBadSig
                | Error::ElectionBadSig
                | Error::RequestBadSig
                | Error::BlindSignatureInvalid
                | Error::RequestHeadersBadSig
        )
    }
}
