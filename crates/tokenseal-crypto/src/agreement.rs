//! ECDH key agreement on P-256, P-384 and P-521.
//!
//! The sending side generates an ephemeral key pair on the recipient's curve for
//! every call; the receiving side recomputes the same shared secret Z from the
//! ephemeral public key. Z is the raw x-coordinate of the shared point.

use p256::elliptic_curve::ecdh::diffie_hellman;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::{EcKeyPair, EcPublicKey, EcSecretKey};

/// Result of the sending side of an agreement.
pub struct EphemeralAgreement {
    /// Shared secret Z; wiped when dropped.
    pub shared_secret: Zeroizing<Vec<u8>>,
    /// Ephemeral public key to transmit to the recipient.
    pub ephemeral_public: EcPublicKey,
}

/// Agree with `recipient` using a freshly generated ephemeral key.
pub fn ephemeral_agree(recipient: &EcPublicKey) -> Result<EphemeralAgreement, CryptoError> {
    let ephemeral = EcSecretKey::generate(recipient.curve())?;
    let shared_secret = static_agree(&ephemeral, recipient)?;
    Ok(EphemeralAgreement {
        shared_secret,
        ephemeral_public: ephemeral.public_key(),
    })
}

/// Compute Z between a private scalar and a peer's public point on the same curve.
pub fn static_agree(
    secret: &EcSecretKey,
    peer: &EcPublicKey,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let z = match (secret, peer) {
        (EcSecretKey::P256(s), EcPublicKey::P256(p)) => diffie_hellman(s.to_nonzero_scalar(), p.as_affine())
            .raw_secret_bytes()
            .to_vec(),
        (EcSecretKey::P384(s), EcPublicKey::P384(p)) => diffie_hellman(s.to_nonzero_scalar(), p.as_affine())
            .raw_secret_bytes()
            .to_vec(),
        (EcSecretKey::P521(s), EcPublicKey::P521(p)) => diffie_hellman(s.to_nonzero_scalar(), p.as_affine())
            .raw_secret_bytes()
            .to_vec(),
        _ => {
            return Err(CryptoError::InvalidKey(format!(
                "curve mismatch: {} private key, {} peer key",
                secret.curve(),
                peer.curve()
            )))
        }
    };
    Ok(Zeroizing::new(z))
}

/// Receiving side: recompute Z from the recipient's key pair and the sender's
/// ephemeral public key.
pub fn recipient_agree(
    recipient: &EcKeyPair,
    ephemeral_public: &EcPublicKey,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let secret = recipient.secret_key().ok_or_else(|| {
        CryptoError::InvalidKey("key agreement requires the recipient's private key".to_string())
    })?;
    static_agree(secret, ephemeral_public)
}
