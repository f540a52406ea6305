//! One-shot digests over the hash algorithms the library commits to.
//!
//! Each signature of knowledge fixes its hash at design time (SHA-256 for
//! every SPK in this crate); schemes additionally use BLAKE2b for digesting
//! auxiliary values. SHA-1 exists only so legacy transcripts can be checked.

use blake2::Blake2b512;
use digest::Digest;
use sha1::Sha1;
use sha2::Sha256;

/// The closed set of hash algorithms exposed by the library.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlg {
    /// Legacy interop only.
    Sha1,
    Sha256,
    Blake2b,
}

impl HashAlg {
    /// Digest output length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            HashAlg::Sha1 => 20,
            HashAlg::Sha256 => 32,
            HashAlg::Blake2b => 64,
        }
    }
}

/// Hashes `data` with the selected algorithm.
pub fn digest(alg: HashAlg, data: &[u8]) -> Vec<u8> {
    match alg {
        HashAlg::Sha1 => Sha1::digest(data).to_vec(),
        HashAlg::Sha256 => Sha256::digest(data).to_vec(),
        HashAlg::Blake2b => Blake2b512::digest(data).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_lengths() {
        for alg in [HashAlg::Sha1, HashAlg::Sha256, HashAlg::Blake2b] {
            assert_eq!(digest(alg, b"abc").len(), alg.output_len());
        }
    }

    #[test]
    fn sha256_vector() {
        // FIPS 180-2 "abc" vector
        let d = digest(HashAlg::Sha256, b"abc");
        assert_eq!(
            d[..4],
            [0xba, 0x78, 0x16, 0xbf],
        );
    }
}
