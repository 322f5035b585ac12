//! HMAC-SHA2 message authentication with constant-time verification.

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

use crate::error::CryptoError;
use crate::hash::ShaVariant;

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

/// Compute the full-length HMAC tag of `data` under `secret`.
pub fn hmac_sign(variant: ShaVariant, secret: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    hmac_sign_parts(variant, secret, &[data])
}

/// Compute the HMAC over the concatenation of `parts` without copying them together.
pub fn hmac_sign_parts(
    variant: ShaVariant,
    secret: &[u8],
    parts: &[&[u8]],
) -> Result<Vec<u8>, CryptoError> {
    if secret.is_empty() {
        return Err(CryptoError::InvalidKeyLength {
            expected: variant.digest_len(),
            got: 0,
        });
    }

    let tag = match variant {
        ShaVariant::Sha256 => {
            let mut mac = HmacSha256::new_from_slice(secret)
                .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
            parts.iter().for_each(|p| mac.update(p));
            mac.finalize().into_bytes().to_vec()
        }
        ShaVariant::Sha384 => {
            let mut mac = HmacSha384::new_from_slice(secret)
                .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
            parts.iter().for_each(|p| mac.update(p));
            mac.finalize().into_bytes().to_vec()
        }
        ShaVariant::Sha512 => {
            let mut mac = HmacSha512::new_from_slice(secret)
                .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
            parts.iter().for_each(|p| mac.update(p));
            mac.finalize().into_bytes().to_vec()
        }
    };
    Ok(tag)
}

/// Recompute the tag and compare it against `tag` in constant time.
pub fn hmac_verify(
    variant: ShaVariant,
    secret: &[u8],
    data: &[u8],
    tag: &[u8],
) -> Result<(), CryptoError> {
    let expected = hmac_sign(variant, secret, data)?;
    constant_time_compare(&expected, tag)
}

/// Constant-time equality; a length mismatch fails without inspecting contents.
pub fn constant_time_compare(expected: &[u8], candidate: &[u8]) -> Result<(), CryptoError> {
    if expected.ct_eq(candidate).into() {
        Ok(())
    } else {
        Err(CryptoError::VerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc4231_case_2() {
        // Key "Jefe", data "what do ya want for nothing?"
        let tag = hmac_sign(ShaVariant::Sha256, b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            hex::encode(tag),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn tag_lengths_follow_variant() {
        for variant in [ShaVariant::Sha256, ShaVariant::Sha384, ShaVariant::Sha512] {
            let tag = hmac_sign(variant, b"key", b"data").unwrap();
            assert_eq!(tag.len(), variant.digest_len());
        }
    }

    #[test]
    fn verify_accepts_own_tag() {
        let tag = hmac_sign(ShaVariant::Sha384, b"secret", b"message").unwrap();
        hmac_verify(ShaVariant::Sha384, b"secret", b"message", &tag).unwrap();
    }

    #[test]
    fn verify_rejects_flipped_bit() {
        let mut tag = hmac_sign(ShaVariant::Sha512, b"secret", b"message").unwrap();
        tag[10] ^= 0x01;
        let err = hmac_verify(ShaVariant::Sha512, b"secret", b"message", &tag).unwrap_err();
        assert!(err.is_verification_failure());
    }

    #[test]
    fn verify_rejects_truncated_tag() {
        let tag = hmac_sign(ShaVariant::Sha256, b"secret", b"message").unwrap();
        assert!(hmac_verify(ShaVariant::Sha256, b"secret", b"message", &tag[..16]).is_err());
    }

    #[test]
    fn verify_rejects_wrong_variant() {
        let tag = hmac_sign(ShaVariant::Sha256, b"secret", b"message").unwrap();
        assert!(hmac_verify(ShaVariant::Sha384, b"secret", b"message", &tag).is_err());
    }

    #[test]
    fn empty_secret_is_misuse() {
        let err = hmac_sign(ShaVariant::Sha256, b"", b"data").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyLength { got: 0, .. }));
    }

    #[test]
    fn parts_match_single_buffer() {
        let joined = hmac_sign(ShaVariant::Sha256, b"k", b"abcdef").unwrap();
        let parts = hmac_sign_parts(ShaVariant::Sha256, b"k", &[b"ab", b"cd", b"ef"]).unwrap();
        assert_eq!(joined, parts);
    }
}
