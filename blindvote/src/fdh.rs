use sha2::{Digest, Sha256};

/// Full-domain hash: extends SHA-256 to an arbitrary bit length by
/// iterated hashing with a one-byte counter suffix. The blocks
/// `SHA-256(message || 0)`, `SHA-256(message || 1)`, ... are concatenated
/// and truncated to the requested length.
///
/// The blind-signature protocol always uses a digest of half the signing
/// key length, so the hashed value is guaranteed to be smaller than the
/// key modulus.
pub fn full_domain_hash(bitlen: usize, message: &[u8]) -> Vec<u8> {
    let bytelen = bitlen / 8;
    let mut sum = Vec::with_capacity(bytelen + Sha256::output_size());

    let mut counter: u8 = 0;
    while sum.len() < bytelen {
        let mut hasher = Sha256::new();
        hasher.update(message);
        hasher.update([counter]);
        sum.extend_from_slice(&hasher.finalize());
        counter = counter.wrapping_add(1);
    }

    sum.truncate(bytelen);
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fdh_is_deterministic_and_sized() {
        let a = full_domain_hash(2048, b"attack at dawn");
        let b = full_domain_hash(2048, b"attack at dawn");
        assert_eq!(a, b);
        assert_eq!(a.len(), 256);

        // The first block is plain SHA-256 with a zero suffix
        let mut hasher = Sha256::new();
        hasher.update(b"attack at dawn");
        hasher.update([0u8]);
        assert_eq!(&a[..32], hasher.finalize().as_slice());
    }

    #[test]
    fn fdh_differs_by_message() {
        let a = full_domain_hash(1024, b"attack at dawn");
        let b = full_domain_hash(1024, b"attack at dusk");
        assert_ne!(a, b);
    }
}
