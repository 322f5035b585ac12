//! RSAES-OAEP with SHA-256 and MGF1-SHA-256, for transporting a CEK.

use rsa::Oaep;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::RsaKeyPair;
use crate::random::CheckedRng;

/// Encrypt `cek` to the public half of `key`.
pub fn rsa_oaep_encrypt(key: &RsaKeyPair, cek: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut rng = CheckedRng::default();
    let encrypted = key
        .public_key()
        .encrypt(&mut rng, Oaep::new::<Sha256>(), cek)
        .map_err(|e| CryptoError::EncryptionFailed(format!("RSA-OAEP: {e}")))?;
    rng.finish()?;
    Ok(encrypted)
}

/// Decrypt an OAEP-encrypted CEK. Any decoding failure is
/// [`CryptoError::VerificationFailed`].
pub fn rsa_oaep_decrypt(key: &RsaKeyPair, encrypted: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let private = key
        .private_key()
        .ok_or_else(|| CryptoError::InvalidKey("RSA-OAEP decryption requires a private key".to_string()))?;
    if encrypted.len() != key.modulus_len() {
        return Err(CryptoError::VerificationFailed);
    }
    private
        .decrypt(Oaep::new::<Sha256>(), encrypted)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa_sig::tests::test_key;

    #[test]
    fn round_trip() {
        let key = test_key();
        let encrypted = rsa_oaep_encrypt(&key.to_public(), &[7u8; 32]).unwrap();
        assert_eq!(encrypted.len(), 256);
        assert_eq!(rsa_oaep_decrypt(key, &encrypted).unwrap().as_slice(), &[7u8; 32]);
    }

    #[test]
    fn encryption_is_randomized() {
        let key = test_key();
        let a = rsa_oaep_encrypt(key, &[1u8; 16]).unwrap();
        let b = rsa_oaep_encrypt(key, &[1u8; 16]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let key = test_key();
        let mut encrypted = rsa_oaep_encrypt(key, &[7u8; 32]).unwrap();
        encrypted[100] ^= 1;
        assert!(rsa_oaep_decrypt(key, &encrypted)
            .unwrap_err()
            .is_verification_failure());
    }

    #[test]
    fn public_only_key_cannot_decrypt() {
        let key = test_key();
        let encrypted = rsa_oaep_encrypt(key, &[7u8; 32]).unwrap();
        assert!(matches!(
            rsa_oaep_decrypt(&key.to_public(), &encrypted),
            Err(CryptoError::InvalidKey(_))
        ));
    }
}
