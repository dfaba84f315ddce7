use log::error;
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder, Response};
use rocket::Request;
use std::io::Cursor;
use thiserror::Error;

/// Clerk-side errors: protocol failures from the core plus the handful
/// of conditions the clerk itself detects. Each variant maps to one
/// protocol status code; responses carry a short text body and nothing
/// else crosses the boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Protocol(#[from] blindvote::Error),

    #[error("election ID mismatch between body and URL")]
    ElectionIdMismatch,

    #[error("public key mismatch between headers and body")]
    PublicKeyMismatch,

    #[error("X-Signature-Key and X-Signature headers are required")]
    MissingSignatureHeaders,

    #[error("X-Public-Key header is required")]
    MissingPublicKeyHeader,

    #[error("could not find admin with the provided public key")]
    NotAdmin,

    #[error("election already exists")]
    ElectionExists,

    #[error("already received fulfilled signature request")]
    AlreadyFulfilled,

    #[error("could not find election with ID {0}")]
    ElectionNotFound(String),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl Error {
    pub fn status(&self) -> Status {
        match self {
            Error::Protocol(_)
            | Error::ElectionIdMismatch
            | Error::PublicKeyMismatch
            | Error::MissingSignatureHeaders
            | Error::MissingPublicKeyHeader
            | Error::ElectionExists
            | Error::AlreadyFulfilled => Status::BadRequest,
            Error::NotAdmin => Status::Forbidden,
            Error::ElectionNotFound(_) => Status::NotFound,
            Error::Db(_) => Status::InternalServerError,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        if status == Status::InternalServerError {
            error!("{}", self);
        }

        let body = self.to_string();
        Response::build()
            .status(status)
            .header(ContentType::Plain)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}
