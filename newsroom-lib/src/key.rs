//! Request key derivation.
//!
//! The Newsroom API authenticates a request by a digest of the subscriber's
//! email concatenated with the universe's shared secret. The scheme is fixed
//! by the remote service.

use sha2::{Digest, Sha256};

use crate::config::{ClientConfiguration, DigestAlgorithm};

/// Derive the request key for `email`.
///
/// With `normalize`, the email is lower-cased before hashing. The secret is
/// used verbatim. Returns the lowercase hex encoding of the digest.
///
/// # Example
///
/// ```
/// use newsroom_lib::{derive_key, DigestAlgorithm};
///
/// let a = derive_key("Test@example.com", "secret", DigestAlgorithm::Md5, true);
/// let b = derive_key("test@example.com", "secret", DigestAlgorithm::Md5, false);
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 32);
/// ```
pub fn derive_key(email: &str, secret: &str, digest: DigestAlgorithm, normalize: bool) -> String {
    let email = normalize_email(email, normalize);
    let mut material = String::with_capacity(email.len() + secret.len());
    material.push_str(&email);
    material.push_str(secret);

    match digest {
        DigestAlgorithm::Md5 => format!("{:x}", md5::compute(material.as_bytes())),
        DigestAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(material.as_bytes());
            hex::encode(hasher.finalize())
        }
    }
}

/// Derive the request key for `email` using the settings of `config`.
pub fn derive_key_for(config: &ClientConfiguration, email: &str) -> String {
    derive_key(email, &config.secret, config.digest, config.normalize_email)
}

/// Lower-case `email` when `normalize` is set, otherwise return it unchanged.
pub(crate) fn normalize_email(email: &str, normalize: bool) -> String {
    if normalize {
        email.to_lowercase()
    } else {
        email.to_string()
    }
}
