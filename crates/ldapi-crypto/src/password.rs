//! `{SCHEME}` password hashing and verification.
//!
//! The encoded form is always `{TAG}` followed by the standard base64
//! encoding of the raw digest. For `{SSHA}` the salt bytes are appended to
//! the digest before encoding, so the salt can be recovered on verify.

use aws_lc_rs::digest;
use base64::{engine::general_purpose::STANDARD, Engine};
use ::md5::{Digest, Md5};
use subtle::ConstantTimeEq;

use crate::error::{CryptoError, CryptoResult};
use crate::random::{generate_salt, DEFAULT_SALT_LEN};
use crate::scheme::PasswordScheme;

fn sha1_digest(data: &[u8]) -> Vec<u8> {
    digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, data)
        .as_ref()
        .to_vec()
}

fn md5_digest(data: &[u8]) -> Vec<u8> {
    Md5::digest(data).to_vec()
}

fn encode(scheme: PasswordScheme, raw: &[u8]) -> String {
    format!("{}{}", scheme.prefix(), STANDARD.encode(raw))
}

/// Hashes a password as `{SHA}base64(sha1(password))`.
#[must_use]
pub fn sha(password: &str) -> String {
    encode(PasswordScheme::Sha, &sha1_digest(password.as_bytes()))
}

/// Hashes a password as `{SSHA}` with a fresh random salt.
#[must_use]
pub fn ssha(password: &str) -> String {
    ssha_with_salt(password, generate_salt(DEFAULT_SALT_LEN).as_bytes())
}

/// Hashes a password as `{SSHA}base64(sha1(password || salt) || salt)`.
#[must_use]
pub fn ssha_with_salt(password: &str, salt: &[u8]) -> String {
    let mut input = Vec::with_capacity(password.len() + salt.len());
    input.extend_from_slice(password.as_bytes());
    input.extend_from_slice(salt);

    let mut raw = sha1_digest(&input);
    raw.extend_from_slice(salt);
    encode(PasswordScheme::Ssha, &raw)
}

/// Hashes a password as `{MD5}base64(md5(password))`.
#[must_use]
pub fn md5(password: &str) -> String {
    encode(PasswordScheme::Md5, &md5_digest(password.as_bytes()))
}

/// Encodes an already computed MD5 digest given as hex.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidDigest`] if `hex_digest` is not a 16-byte
/// hex string.
pub fn md5_prehashed(hex_digest: &str) -> CryptoResult<String> {
    let raw = hex::decode(hex_digest.trim())
        .map_err(|e| CryptoError::InvalidDigest(format!("not hex: {e}")))?;
    if raw.len() != PasswordScheme::Md5.digest_len() {
        return Err(CryptoError::InvalidDigest(format!(
            "expected {} bytes, got {}",
            PasswordScheme::Md5.digest_len(),
            raw.len()
        )));
    }
    Ok(encode(PasswordScheme::Md5, &raw))
}

/// Hashes a password with the given scheme.
#[must_use]
pub fn hash_password(password: &str, scheme: PasswordScheme) -> String {
    match scheme {
        PasswordScheme::Sha => sha(password),
        PasswordScheme::Ssha => ssha(password),
        PasswordScheme::Md5 => md5(password),
    }
}

/// Hashes a password given a scheme name (`sha`, `ssha`, `md5`).
///
/// When `pre_hashed` is true and the scheme is MD5, `password` is taken to
/// be the hex MD5 digest of the cleartext. The flag has no effect on the
/// SHA schemes.
///
/// # Errors
///
/// Returns an error if the scheme is unknown or the pre-hashed digest is
/// not valid hex.
pub fn ldap_password(password: &str, algo: &str, pre_hashed: bool) -> CryptoResult<String> {
    let scheme: PasswordScheme = algo.parse()?;
    match scheme {
        PasswordScheme::Md5 if pre_hashed => md5_prehashed(password),
        _ => Ok(hash_password(password, scheme)),
    }
}

/// Splits `{TAG}payload` into its scheme and decoded payload.
fn split_stored(stored: &str) -> CryptoResult<(PasswordScheme, Vec<u8>)> {
    let rest = stored
        .strip_prefix('{')
        .ok_or_else(|| CryptoError::MalformedHash("missing scheme prefix".to_string()))?;
    let (tag, payload) = rest
        .split_once('}')
        .ok_or_else(|| CryptoError::MalformedHash("unterminated scheme prefix".to_string()))?;
    let scheme: PasswordScheme = tag.parse()?;
    let raw = STANDARD
        .decode(payload.trim())
        .map_err(|e| CryptoError::MalformedHash(format!("invalid base64: {e}")))?;
    Ok((scheme, raw))
}

/// Checks a cleartext password against a stored `{SCHEME}` value.
///
/// The comparison is constant-time.
///
/// # Errors
///
/// Returns an error if `stored` is not a well-formed value of a supported
/// scheme.
pub fn verify_password(password: &str, stored: &str) -> CryptoResult<bool> {
    let (scheme, raw) = split_stored(stored)?;
    let digest_len = scheme.digest_len();
    if raw.len() < digest_len {
        return Err(CryptoError::MalformedHash(format!(
            "{scheme} digest must be {digest_len} bytes"
        )));
    }
    let (digest, salt) = raw.split_at(digest_len);

    match (scheme.is_salted(), salt.is_empty()) {
        (true, true) => {
            return Err(CryptoError::MalformedHash(format!("{scheme} value has no salt")));
        }
        (false, false) => {
            return Err(CryptoError::MalformedHash(format!(
                "{scheme} digest must be {digest_len} bytes"
            )));
        }
        _ => {}
    }

    let mut input = password.as_bytes().to_vec();
    input.extend_from_slice(salt);
    let expected = match scheme {
        PasswordScheme::Sha | PasswordScheme::Ssha => sha1_digest(&input),
        PasswordScheme::Md5 => md5_digest(&input),
    };

    Ok(expected.ct_eq(digest).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha_matches_known_value() {
        assert_eq!(sha("password"), "{SHA}W6ph5Mm5Pz8GgiULbPgzG37mj9g=");
    }

    #[test]
    fn sha_hashes_utf8_bytes() {
        assert_eq!(sha("pässword"), "{SHA}I7dElEdfX4dJgLdnbVEeI9iG2mQ=");
    }

    #[test]
    fn md5_matches_known_value() {
        assert_eq!(md5("password"), "{MD5}X03MO1qnZdYdgyfeuILPmQ==");
    }

    #[test]
    fn md5_prehashed_encodes_hex_digest() {
        let hashed = md5_prehashed("5f4dcc3b5aa765d61d8327deb882cf99").unwrap();
        assert_eq!(hashed, md5("password"));
    }

    #[test]
    fn md5_prehashed_rejects_bad_input() {
        assert!(matches!(
            md5_prehashed("not-hex"),
            Err(CryptoError::InvalidDigest(_))
        ));
        assert!(matches!(
            md5_prehashed("abcd"),
            Err(CryptoError::InvalidDigest(_))
        ));
    }

    #[test]
    fn ssha_with_fixed_salt() {
        assert_eq!(
            ssha_with_salt("secret", b"0123456789"),
            "{SSHA}Rq/t4bcGDVsz+0J9RTrnlUIGsRMwMTIzNDU2Nzg5"
        );
    }

    #[test]
    fn ssha_appends_ten_char_salt() {
        let hashed = ssha("secret");
        let raw = STANDARD.decode(hashed.trim_start_matches("{SSHA}")).unwrap();
        assert_eq!(raw.len(), 20 + DEFAULT_SALT_LEN);
        assert!(raw[20..].iter().all(u8::is_ascii_hexdigit));
    }

    #[test]
    fn ssha_salts_differ_between_calls() {
        // 16^10 possible salts
        assert_ne!(ssha("secret"), ssha("secret"));
    }

    #[test]
    fn dispatcher_selects_scheme() {
        assert_eq!(ldap_password("password", "SHA", false).unwrap(), sha("password"));
        assert!(ldap_password("password", "ssha", false)
            .unwrap()
            .starts_with("{SSHA}"));
        assert_eq!(
            ldap_password("5f4dcc3b5aa765d61d8327deb882cf99", "md5", true).unwrap(),
            "{MD5}X03MO1qnZdYdgyfeuILPmQ=="
        );
        // pre_hashed only applies to MD5
        assert_eq!(ldap_password("password", "sha", true).unwrap(), sha("password"));
    }

    #[test]
    fn dispatcher_rejects_unknown_algorithm() {
        assert_eq!(
            ldap_password("password", "bcrypt", false),
            Err(CryptoError::UnknownScheme("bcrypt".to_string()))
        );
    }

    #[test]
    fn verify_accepts_matching_passwords() {
        assert!(verify_password("password", "{SHA}W6ph5Mm5Pz8GgiULbPgzG37mj9g=").unwrap());
        assert!(verify_password("password", "{md5}X03MO1qnZdYdgyfeuILPmQ==").unwrap());
        assert!(verify_password("secret", &ssha("secret")).unwrap());
    }

    #[test]
    fn verify_rejects_wrong_password() {
        assert!(!verify_password("wrong", &sha("password")).unwrap());
        assert!(!verify_password("wrong", &ssha("password")).unwrap());
        assert!(!verify_password("wrong", &md5("password")).unwrap());
    }

    #[test]
    fn verify_rejects_malformed_values() {
        assert!(matches!(
            verify_password("x", "W6ph5Mm5Pz8GgiULbPgzG37mj9g="),
            Err(CryptoError::MalformedHash(_))
        ));
        assert!(matches!(
            verify_password("x", "{SHA}not base64!"),
            Err(CryptoError::MalformedHash(_))
        ));
        assert!(matches!(
            verify_password("x", "{SSHA}W6ph5Mm5Pz8GgiULbPgzG37mj9g="),
            Err(CryptoError::MalformedHash(_))
        ));
        // a salt on an unsalted scheme
        assert!(matches!(
            verify_password("password", "{SHA}W6ph5Mm5Pz8GgiULbPgzG37mj9gwMTIz"),
            Err(CryptoError::MalformedHash(_))
        ));
        assert!(matches!(
            verify_password("x", "{MD5}AAAA"),
            Err(CryptoError::MalformedHash(_))
        ));
        assert!(matches!(
            verify_password("x", "{CRYPT}abc"),
            Err(CryptoError::UnknownScheme(_))
        ));
    }
}
