use log::error;
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder, Response};
use rocket::Request;
use std::io::Cursor;
use thiserror::Error;

/// Ballot-box errors. Each variant maps to one protocol status code;
/// responses carry a short text body naming the failure class.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Protocol(#[from] blindvote::Error),

    #[error("ballot ID mismatch between body and URL")]
    BallotIdMismatch,

    #[error("election ID mismatch between body and URL")]
    ElectionIdMismatch,

    #[error("X-Signature-Key and X-Signature headers are required for DELETE operations")]
    MissingSignatureHeaders,

    #[error("ballot already exists")]
    BallotExists,

    #[error("could not find ballot {1} in election {0}")]
    BallotNotFound(String, String),

    #[error("invalid election or ballot ID")]
    InvalidId,

    #[error("error fetching public key from election clerk server: {0}")]
    ClerkFetch(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl Error {
    pub fn status(&self) -> Status {
        match self {
            Error::Protocol(_)
            | Error::BallotIdMismatch
            | Error::ElectionIdMismatch
            | Error::MissingSignatureHeaders
            | Error::BallotExists
            | Error::InvalidId => Status::BadRequest,
            Error::BallotNotFound(_, _) => Status::NotFound,
            Error::ClerkFetch(_) | Error::Db(_) => Status::InternalServerError,
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
