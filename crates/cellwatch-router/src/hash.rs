//! The router's home-grown digest scheme.
//!
//! Every hash the firmware compares against is an upper-case hex digest.
//! Login always uses SHA-256; the anti-CSRF `AD` hash uses SHA-256 on
//! new-generation firmware and MD5 on everything older.

use md5::Md5;
use sha2::{Digest, Sha256};

/// Upper-case hex SHA-256 digest of `text`.
pub fn sha256_upper(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:X}", hasher.finalize())
}

/// Upper-case hex MD5 digest of `text`.
pub fn md5_upper(text: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(text.as_bytes());
    format!("{:X}", hasher.finalize())
}

/// The login digest: `H(H(password) + LD)` where `LD` is the nonce the
/// router hands out per login attempt and `H` is upper-hex SHA-256.
pub fn login_hash(password: &str, ld_nonce: &str) -> String {
    sha256_upper(&format!("{}{ld_nonce}", sha256_upper(password)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vectors() {
        assert_eq!(
            sha256_upper(""),
            "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
        );
        assert_eq!(
            sha256_upper("abc"),
            "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
        );
    }

    #[test]
    fn md5_known_vectors() {
        assert_eq!(md5_upper(""), "D41D8CD98F00B204E9800998ECF8427E");
        assert_eq!(md5_upper("abc"), "900150983CD24FB0D6963F7D28E17F72");
    }

    #[test]
    fn login_hash_composes_sha256_twice() {
        let ld = "0123ABCD";
        assert_eq!(
            login_hash("admin1", ld),
            sha256_upper(&format!("{}{ld}", sha256_upper("admin1")))
        );
        // The nonce matters: different LD, different digest.
        assert_ne!(login_hash("admin1", "0123ABCD"), login_hash("admin1", "DCBA3210"));
    }
}
