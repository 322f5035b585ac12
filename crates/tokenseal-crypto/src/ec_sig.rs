//! ECDSA signing and verification on P-256, P-384 and P-521.
//!
//! Produces IEEE P1363 format signatures (raw r||s), not ASN.1 DER. The digest is
//! fixed by the curve: SHA-256 for P-256, SHA-384 for P-384, SHA-512 for P-521.

use ecdsa::signature::{Signer, Verifier};

use crate::error::CryptoError;
use crate::keys::{EcCurve, EcKeyPair, EcPublicKey, EcSecretKey};

/// Length of an `r||s` signature on `curve`.
pub const fn signature_len(curve: EcCurve) -> usize {
    2 * curve.coordinate_len()
}

/// Sign `message` with the private half of `key`.
///
/// # Returns
/// Fixed-length `r||s` signature (64, 96 or 132 bytes)
pub fn ecdsa_sign(key: &EcKeyPair, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let secret = key
        .secret_key()
        .ok_or_else(|| CryptoError::InvalidKey("ECDSA signing requires a private key".to_string()))?;
    let scalar = secret.to_scalar_bytes();
    let failed = |e: ecdsa::Error| CryptoError::SigningFailed(e.to_string());

    let signature = match secret {
        EcSecretKey::P256(_) => {
            let signing_key = p256::ecdsa::SigningKey::from_slice(&scalar).map_err(failed)?;
            let signature: p256::ecdsa::Signature = signing_key.try_sign(message).map_err(failed)?;
            signature.to_bytes().to_vec()
        }
        EcSecretKey::P384(_) => {
            let signing_key = p384::ecdsa::SigningKey::from_slice(&scalar).map_err(failed)?;
            let signature: p384::ecdsa::Signature = signing_key.try_sign(message).map_err(failed)?;
            signature.to_bytes().to_vec()
        }
        EcSecretKey::P521(_) => {
            let signing_key = p521::ecdsa::SigningKey::from_slice(&scalar).map_err(failed)?;
            let signature: p521::ecdsa::Signature = signing_key.try_sign(message).map_err(failed)?;
            signature.to_bytes().to_vec()
        }
    };
    Ok(signature)
}

/// Verify an `r||s` signature over `message` with the public half of `key`.
///
/// A signature of the wrong length for the curve is a verification failure, not
/// misuse: it is attacker-controlled input.
pub fn ecdsa_verify(key: &EcKeyPair, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
    let public = key.public_key();
    if signature.len() != signature_len(public.curve()) {
        return Err(CryptoError::VerificationFailed);
    }
    let point = public.to_sec1_uncompressed();
    let bad_key = |e: ecdsa::Error| CryptoError::InvalidKey(format!("ECDSA public key: {e}"));

    let verified = match public {
        EcPublicKey::P256(_) => {
            let verifying_key = p256::ecdsa::VerifyingKey::from_sec1_bytes(&point).map_err(bad_key)?;
            p256::ecdsa::Signature::from_slice(signature)
                .and_then(|sig| verifying_key.verify(message, &sig))
        }
        EcPublicKey::P384(_) => {
            let verifying_key = p384::ecdsa::VerifyingKey::from_sec1_bytes(&point).map_err(bad_key)?;
            p384::ecdsa::Signature::from_slice(signature)
                .and_then(|sig| verifying_key.verify(message, &sig))
        }
        EcPublicKey::P521(_) => {
            let verifying_key = p521::ecdsa::VerifyingKey::from_sec1_bytes(&point).map_err(bad_key)?;
            p521::ecdsa::Signature::from_slice(signature)
                .and_then(|sig| verifying_key.verify(message, &sig))
        }
    };
    verified.map_err(|_| CryptoError::VerificationFailed)
}
