use crate::*;

use num_bigint_dig::{BigUint, ModInverse, RandBigInt};
use num_traits::Zero;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{RsaPrivateKey, RsaPublicKey};

/// Blind an already-hashed message so it can be signed without being read.
///
/// Computes `blinded = hashed * r^e mod n` for a fresh random `r` in `Z_n*`
/// and returns the blinded message together with the unblinder `r^-1 mod n`.
/// The caller must keep the unblinder secret until the signature comes back.
pub fn blind(key: &RsaPublicKey, hashed: &[u8]) -> Result<(Vec<u8>, Vec<u8>), Error> {
    let n = key.n();
    let e = key.e();

    let m = BigUint::from_bytes_be(hashed);
    if &m >= n {
        return Err(Error::BlindedMessageOutOfRange);
    }

    let mut rng = rand::thread_rng();
    loop {
        let r = rng.gen_biguint_below(n);
        if r.is_zero() {
            continue;
        }
        // r must be invertible mod n, retry on the (cosmologically rare) miss
        let r_inv = match r.clone().mod_inverse(n).and_then(|i| i.to_biguint()) {
            Some(inv) => inv,
            None => continue,
        };

        let blinded = (&m * r.modpow(e, n)) % n;
        return Ok((
            to_sized_bytes(&blinded, key.size()),
            to_sized_bytes(&r_inv, key.size()),
        ));
    }
}

/// The signing authority's half of the protocol: a naked RSA private-key
/// operation over the blinded value. No padding is applied - the only
/// defence against forgery is the full-domain hash the requester applied
/// before blinding.
pub fn blind_sign(key: &RsaPrivateKey, blinded: &[u8]) -> Result<Vec<u8>, Error> {
    let m = BigUint::from_bytes_be(blinded);
    if &m >= key.n() {
        return Err(Error::BlindedMessageOutOfRange);
    }

    let s = m.modpow(key.d(), key.n());
    Ok(to_sized_bytes(&s, key.size()))
}

/// Strip the blinding factor from a blind signature: `s = s' * r^-1 mod n`.
pub fn unblind(key: &RsaPublicKey, blinded_sig: &[u8], unblinder: &[u8]) -> Vec<u8> {
    let s = BigUint::from_bytes_be(blinded_sig);
    let r_inv = BigUint::from_bytes_be(unblinder);
    let unblinded = (s * r_inv) % key.n();
    to_sized_bytes(&unblinded, key.size())
}

/// Verify an unblinded signature over a full-domain-hashed message by
/// checking `s^e = hashed mod n`.
pub fn verify_blind_signature(
    key: &RsaPublicKey,
    hashed: &[u8],
    sig: &[u8],
) -> Result<(), Error> {
    if sig.len() != key.size() {
        return Err(Error::SignatureWrongSize);
    }

    let s = BigUint::from_bytes_be(sig);
    let m = BigUint::from_bytes_be(hashed);
    if s.modpow(key.e(), key.n()) == m % key.n() {
        Ok(())
    } else {
        Err(Error::BlindSignatureInvalid)
    }
}

fn to_sized_bytes(v: &BigUint, size: usize) -> Vec<u8> {
    let bytes = v.to_bytes_be();
    let mut out = vec![0u8; size.saturating_sub(bytes.len())];
    out.extend_from_slice(&bytes);
    out
}
