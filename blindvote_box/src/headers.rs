use crate::error::Error;

use blindvote::{verify_signed_request, PublicKey};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;

/// Signed-request headers: `X-Signature-Key` is a base64 public key and
/// `X-Signature` signs the ASCII `METHOD SP REQUEST-URI`. Required for
/// DELETE; other verbs ignore their absence.
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
