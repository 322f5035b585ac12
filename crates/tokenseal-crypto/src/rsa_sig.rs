//! RSASSA-PKCS1-v1_5 and RSASSA-PSS with SHA-2.
//!
//! PSS uses MGF1 with the same digest and a salt as long as the digest output; the
//! salt length is not configurable.

use rsa::signature::{RandomizedSigner, SignatureEncoding, Signer, Verifier};
use rsa::{pkcs1v15, pss};
use sha2::{Sha256, Sha384, Sha512};

use crate::error::CryptoError;
use crate::hash::ShaVariant;
use crate::keys::RsaKeyPair;
use crate::random::CheckedRng;

/// PKCS#1 v1.5 signature over `message`.
pub fn rsa_pkcs1v15_sign(
    variant: ShaVariant,
    key: &RsaKeyPair,
    message: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let private = private_half(key)?.clone();
    let failed = |e: rsa::signature::Error| CryptoError::SigningFailed(e.to_string());

    let signature = match variant {
        ShaVariant::Sha256 => pkcs1v15::SigningKey::<Sha256>::new(private)
            .try_sign(message)
            .map_err(failed)?
            .to_vec(),
        ShaVariant::Sha384 => pkcs1v15::SigningKey::<Sha384>::new(private)
            .try_sign(message)
            .map_err(failed)?
            .to_vec(),
        ShaVariant::Sha512 => pkcs1v15::SigningKey::<Sha512>::new(private)
            .try_sign(message)
            .map_err(failed)?
            .to_vec(),
    };
    Ok(signature)
}

/// Verify a PKCS#1 v1.5 signature.
pub fn rsa_pkcs1v15_verify(
    variant: ShaVariant,
    key: &RsaKeyPair,
    message: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    check_signature_len(key, signature)?;
    let public = key.public_key().clone();
    let signature =
        pkcs1v15::Signature::try_from(signature).map_err(|_| CryptoError::VerificationFailed)?;

    let verified = match variant {
        ShaVariant::Sha256 => pkcs1v15::VerifyingKey::<Sha256>::new(public).verify(message, &signature),
        ShaVariant::Sha384 => pkcs1v15::VerifyingKey::<Sha384>::new(public).verify(message, &signature),
        ShaVariant::Sha512 => pkcs1v15::VerifyingKey::<Sha512>::new(public).verify(message, &signature),
    };
    verified.map_err(|_| CryptoError::VerificationFailed)
}

/// PSS signature over `message` with a fresh random salt.
pub fn rsa_pss_sign(
    variant: ShaVariant,
    key: &RsaKeyPair,
    message: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let private = private_half(key)?.clone();
    let mut rng = CheckedRng::default();
    let failed = |e: rsa::signature::Error| CryptoError::SigningFailed(e.to_string());

    let signature = match variant {
        ShaVariant::Sha256 => pss::BlindedSigningKey::<Sha256>::new(private)
            .try_sign_with_rng(&mut rng, message)
            .map_err(failed)?
            .to_vec(),
        ShaVariant::Sha384 => pss::BlindedSigningKey::<Sha384>::new(private)
            .try_sign_with_rng(&mut rng, message)
            .map_err(failed)?
            .to_vec(),
        ShaVariant::Sha512 => pss::BlindedSigningKey::<Sha512>::new(private)
            .try_sign_with_rng(&mut rng, message)
            .map_err(failed)?
            .to_vec(),
    };
    rng.finish()?;
    Ok(signature)
}

/// Verify a PSS signature.
pub fn rsa_pss_verify(
    variant: ShaVariant,
    key: &RsaKeyPair,
    message: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    check_signature_len(key, signature)?;
    let public = key.public_key().clone();
    let signature =
        pss::Signature::try_from(signature).map_err(|_| CryptoError::VerificationFailed)?;

    let verified = match variant {
        ShaVariant::Sha256 => pss::VerifyingKey::<Sha256>::new(public).verify(message, &signature),
        ShaVariant::Sha384 => pss::VerifyingKey::<Sha384>::new(public).verify(message, &signature),
        ShaVariant::Sha512 => pss::VerifyingKey::<Sha512>::new(public).verify(message, &signature),
    };
    verified.map_err(|_| CryptoError::VerificationFailed)
}

fn private_half(key: &RsaKeyPair) -> Result<&rsa::RsaPrivateKey, CryptoError> {
    key.private_key()
        .ok_or_else(|| CryptoError::InvalidKey("RSA signing requires a private key".to_string()))
}

// Signatures are exactly as long as the modulus.
fn check_signature_len(key: &RsaKeyPair, signature: &[u8]) -> Result<(), CryptoError> {
    if signature.len() != key.modulus_len() {
        return Err(CryptoError::VerificationFailed);
    }
    Ok(())
}
