use crate::error::Error;

use blindvote::{verify_signed_request, PublicKey};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;

/// Signed-request headers: `X-Signature-Key` is a base64 public key and
/// `X-Signature` signs the ASCII `METHOD SP REQUEST-URI`. The guard
/// fails with 400 where an endpoint requires it; use `Option<_>` where
/// the headers are optional.
pub struct SignedHeaders {
    pub public_key: PublicKey,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SignedHeaders {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Error> {
        let key = req.headers().get_one("X-Signature-Key");
        let sig = req.headers().get_one("X-Signature");
        let (key, sig) = match (key, sig) {
            (Some(key), Some(sig)) => (key, sig),
            _ => {
                return Outcome::Error((Status::BadRequest, Error::MissingSignatureHeaders));
            }
        };

        let uri = req.uri().to_string();
        match verify_signed_request(
            key.as_bytes(),
            sig.as_bytes(),
            req.method().as_str(),
            &uri,
        ) {
            Ok(public_key) => Outcome::Success(SignedHeaders { public_key }),
            Err(e) => Outcome::Error((Status::BadRequest, e.into())),
        }
    }
}

/// The `X-Public-Key` header: the hex bytes of the admin key the caller
/// claims to be publishing an election under.
pub struct AdminKeyHeader(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminKeyHeader {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Error> {
        match req.headers().get_one("X-Public-Key") {
            Some(value) => Outcome::Success(AdminKeyHeader(value.to_string())),
            None => Outcome::Error((Status::BadRequest, Error::MissingPublicKeyHeader)),
        }
    }
}
