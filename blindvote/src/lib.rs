//! Core protocol layer for anonymous voting with RSA blind signatures.
//!
//! A voter blinds the canonical bytes of their ballot, has the election
//! clerk blind-sign the result against their DID identity, unblinds the
//! returned signature, and casts the finished ballot anonymously. Anyone
//! holding the clerk's public key can later verify that every stored
//! ballot was properly authorized.
//!
//! Every aggregate in this crate has a deterministic textual wire form:
//! fields separated by `\n\n`, elements within a field separated by `\n`.
//! The same canonical bytes are fed to all hash and signature operations,
//! so `encode(decode(x)) == x` for every well-formed value.

#[macro_use]
extern crate lazy_static;

mod ballot;
mod blind;
mod did;
mod election;
mod error;
mod fdh;
mod private_key;
mod public_key;
mod signature;
mod signature_request;
mod tagset;
mod user_set;
mod util;
mod vote;

pub use ballot::*;
pub use blind::*;
pub use did::*;
pub use election::*;
pub use error::*;
pub use fdh::*;
pub use private_key::*;
pub use public_key::*;
pub use signature::*;
pub use signature_request::*;
pub use tagset::*;
pub use user_set::*;
pub use util::*;
pub use vote::*;

#[cfg(test)]
mod tests;
