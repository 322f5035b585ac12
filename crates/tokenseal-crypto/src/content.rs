//! Content encryption: AES-GCM and the AES-CBC + HMAC-SHA2 composite (RFC 7518 §5.2).
//!
//! Both families expose the same detached shape: `(ciphertext, tag)` out of
//! encryption, plaintext out of decryption only after the tag has been checked.

use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, Nonce};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::hash::ShaVariant;
use crate::mac::{constant_time_compare, hmac_sign_parts};
use crate::random::random_bytes;

type Aes192Gcm = AesGcm<Aes192, U12>;

pub const GCM_IV_LENGTH: usize = 12;
pub const CBC_IV_LENGTH: usize = 16;

/// A content-encryption algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentCipher {
    A128CbcHs256,
    A192CbcHs384,
    A256CbcHs512,
    A128Gcm,
    A192Gcm,
    A256Gcm,
}

impl ContentCipher {
    /// CEK length in bytes. For CBC-HMAC this is the MAC key plus the AES key.
    pub const fn key_len(self) -> usize {
        match self {
            ContentCipher::A128Gcm => 16,
            ContentCipher::A192Gcm => 24,
            ContentCipher::A256Gcm | ContentCipher::A128CbcHs256 => 32,
            ContentCipher::A192CbcHs384 => 48,
            ContentCipher::A256CbcHs512 => 64,
        }
    }

    pub const fn iv_len(self) -> usize {
        if self.is_gcm() {
            GCM_IV_LENGTH
        } else {
            CBC_IV_LENGTH
        }
    }

    pub const fn tag_len(self) -> usize {
        match self {
            ContentCipher::A192CbcHs384 => 24,
            ContentCipher::A256CbcHs512 => 32,
            _ => 16,
        }
    }

    pub const fn is_gcm(self) -> bool {
        matches!(
            self,
            ContentCipher::A128Gcm | ContentCipher::A192Gcm | ContentCipher::A256Gcm
        )
    }

    /// Fresh random CEK of [`Self::key_len`] bytes.
    pub fn generate_key(self) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        random_bytes(self.key_len())
    }

    /// Fresh random IV of [`Self::iv_len`] bytes.
    pub fn generate_iv(self) -> Result<Vec<u8>, CryptoError> {
        Ok(random_bytes(self.iv_len())?.to_vec())
    }

    fn mac_variant(self) -> ShaVariant {
        match self {
            ContentCipher::A192CbcHs384 => ShaVariant::Sha384,
            ContentCipher::A256CbcHs512 => ShaVariant::Sha512,
            _ => ShaVariant::Sha256,
        }
    }
}

/// Encrypt `plaintext`, authenticating `aad`.
///
/// # Returns
/// `(ciphertext, tag)`
pub fn content_encrypt(
    cipher: ContentCipher,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
    check_lengths(cipher, key, iv)?;
    if cipher.is_gcm() {
        gcm_encrypt(cipher, key, iv, aad, plaintext)
    } else {
        cbc_hmac_encrypt(cipher, key, iv, aad, plaintext)
    }
}

/// Check `tag` and, only if it matches, decrypt `ciphertext`.
///
/// Any tag mismatch is [`CryptoError::VerificationFailed`] and no plaintext is
/// produced.
pub fn content_decrypt(
    cipher: ContentCipher,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    check_lengths(cipher, key, iv)?;
    if tag.len() != cipher.tag_len() {
        return Err(CryptoError::VerificationFailed);
    }
    if cipher.is_gcm() {
        gcm_decrypt(cipher, key, iv, aad, ciphertext, tag)
    } else {
        cbc_hmac_decrypt(cipher, key, iv, aad, ciphertext, tag)
    }
}

fn check_lengths(cipher: ContentCipher, key: &[u8], iv: &[u8]) -> Result<(), CryptoError> {
    if key.len() != cipher.key_len() {
        return Err(CryptoError::InvalidKeyLength {
            expected: cipher.key_len(),
            got: key.len(),
        });
    }
    if iv.len() != cipher.iv_len() {
        return Err(CryptoError::MalformedInput(format!(
            "IV must be {} bytes, got {}",
            cipher.iv_len(),
            iv.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// AES-GCM
// ---------------------------------------------------------------------------

fn gcm_encrypt(
    cipher: ContentCipher,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
    let nonce = Nonce::from_slice(iv);
    let mut buffer = plaintext.to_vec();
    let failed = |e: aes_gcm::Error| CryptoError::EncryptionFailed(e.to_string());

    let tag = match cipher {
        ContentCipher::A128Gcm => Aes128Gcm::new_from_slice(key)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?
            .encrypt_in_place_detached(nonce, aad, &mut buffer)
            .map_err(failed)?,
        ContentCipher::A192Gcm => Aes192Gcm::new_from_slice(key)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?
            .encrypt_in_place_detached(nonce, aad, &mut buffer)
            .map_err(failed)?,
        _ => Aes256Gcm::new_from_slice(key)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?
            .encrypt_in_place_detached(nonce, aad, &mut buffer)
            .map_err(failed)?,
    };
    Ok((buffer, tag.to_vec()))
}

fn gcm_decrypt(
    cipher: ContentCipher,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let nonce = Nonce::from_slice(iv);
    let tag = GenericArray::from_slice(tag);
    let mut buffer = Zeroizing::new(ciphertext.to_vec());

    let result = match cipher {
        ContentCipher::A128Gcm => Aes128Gcm::new_from_slice(key)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?
            .decrypt_in_place_detached(nonce, aad, &mut buffer, tag),
        ContentCipher::A192Gcm => Aes192Gcm::new_from_slice(key)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?
            .decrypt_in_place_detached(nonce, aad, &mut buffer, tag),
        _ => Aes256Gcm::new_from_slice(key)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?
            .decrypt_in_place_detached(nonce, aad, &mut buffer, tag),
    };
    result.map_err(|_| CryptoError::VerificationFailed)?;
    Ok(buffer)
}

// ---------------------------------------------------------------------------
// AES-CBC + HMAC-SHA2
// ---------------------------------------------------------------------------

/// HMAC over `AAD || IV || ciphertext || AL`, where AL is the AAD length in bits as
/// a 64-bit big-endian integer, truncated to the first half of the MAC output.
fn cbc_hmac_tag(
    cipher: ContentCipher,
    mac_key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let aad_bits = (aad.len() as u64).wrapping_mul(8).to_be_bytes();
    let mut tag = hmac_sign_parts(cipher.mac_variant(), mac_key, &[aad, iv, ciphertext, &aad_bits])?;
    tag.truncate(cipher.tag_len());
    Ok(tag)
}

fn cbc_hmac_encrypt(
    cipher: ContentCipher,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
    // MAC key first, encryption key second.
    let (mac_key, enc_key) = key.split_at(key.len() / 2);
    let invalid = |e: cbc::cipher::InvalidLength| CryptoError::EncryptionFailed(e.to_string());

    let ciphertext = match cipher {
        ContentCipher::A128CbcHs256 => cbc::Encryptor::<Aes128>::new_from_slices(enc_key, iv)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        ContentCipher::A192CbcHs384 => cbc::Encryptor::<Aes192>::new_from_slices(enc_key, iv)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        _ => cbc::Encryptor::<Aes256>::new_from_slices(enc_key, iv)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
    };
    let tag = cbc_hmac_tag(cipher, mac_key, iv, aad, &ciphertext)?;
    Ok((ciphertext, tag))
}

fn cbc_hmac_decrypt(
    cipher: ContentCipher,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let (mac_key, enc_key) = key.split_at(key.len() / 2);

    let expected = cbc_hmac_tag(cipher, mac_key, iv, aad, ciphertext)?;
    constant_time_compare(&expected, tag)?;

    let invalid = |e: cbc::cipher::InvalidLength| CryptoError::EncryptionFailed(e.to_string());
    let plaintext = match cipher {
        ContentCipher::A128CbcHs256 => cbc::Decryptor::<Aes128>::new_from_slices(enc_key, iv)
            .map_err(invalid)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        ContentCipher::A192CbcHs384 => cbc::Decryptor::<Aes192>::new_from_slices(enc_key, iv)
            .map_err(invalid)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        _ => cbc::Decryptor::<Aes256>::new_from_slices(enc_key, iv)
            .map_err(invalid)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
    };
    // Bad padding behind a valid tag means the sender is broken; report it as a
    // plain verification failure all the same.
    plaintext
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const ALL: [ContentCipher; 6] = [
        ContentCipher::A128CbcHs256,
        ContentCipher::A192CbcHs384,
        ContentCipher::A256CbcHs512,
        ContentCipher::A128Gcm,
        ContentCipher::A192Gcm,
        ContentCipher::A256Gcm,
    ];

    #[test]
    fn rfc7518_b1_aes_128_cbc_hmac_sha_256() {
        let key: Vec<u8> = (0u8..32).collect();
        let iv = hex!("1af38c2dc2b96ffdd86694092341bc04");
        let plaintext = b"A cipher system must not be required to be secret, and it must be able to fall into the hands of the enemy without inconvenience";
        let aad = b"The second principle of Auguste Kerckhoffs";

        let (ciphertext, tag) =
            content_encrypt(ContentCipher::A128CbcHs256, &key, &iv, aad, plaintext).unwrap();

        assert_eq!(
            hex::encode(&ciphertext),
            "c80edfa32ddf39d5ef00c0b468834279a2e46a1b8049f792f76bfe54b903a9c9\
             a94ac9b47ad2655c5f10f9aef71427e2fc6f9b3f399a221489f16362c7032336\
             09d45ac69864e3321cf82935ac4096c86e133314c54019e8ca7980dfa4b9cf1b\
             384c486f3a54c51078158ee5d79de59fbd34d848b3d69550a67646344427ade5\
             4b8851ffb598f7f80074b9473c82e2db"
        );
        assert_eq!(tag, hex!("652c3fa36b0a7c5b3219fab3a30bc1c4"));

        let decrypted =
            content_decrypt(ContentCipher::A128CbcHs256, &key, &iv, aad, &ciphertext, &tag)
                .unwrap();
        assert_eq!(decrypted.as_slice(), plaintext);
    }

    #[test]
    fn round_trip_all_ciphers() {
        for cipher in ALL {
            let key = cipher.generate_key().unwrap();
            let iv = cipher.generate_iv().unwrap();
            let (ciphertext, tag) =
                content_encrypt(cipher, &key, &iv, b"header", b"secret payload").unwrap();
            assert_eq!(tag.len(), cipher.tag_len());
            assert_ne!(ciphertext.as_slice(), b"secret payload");

            let plaintext = content_decrypt(cipher, &key, &iv, b"header", &ciphertext, &tag).unwrap();
            assert_eq!(plaintext.as_slice(), b"secret payload");
        }
    }

    #[test]
    fn empty_plaintext_round_trips() {
        for cipher in ALL {
            let key = cipher.generate_key().unwrap();
            let iv = cipher.generate_iv().unwrap();
            let (ciphertext, tag) = content_encrypt(cipher, &key, &iv, b"aad", b"").unwrap();
            let plaintext = content_decrypt(cipher, &key, &iv, b"aad", &ciphertext, &tag).unwrap();
            assert!(plaintext.is_empty());
        }
    }

    #[test]
    fn altered_aad_fails() {
        for cipher in ALL {
            let key = cipher.generate_key().unwrap();
            let iv = cipher.generate_iv().unwrap();
            let (ciphertext, tag) = content_encrypt(cipher, &key, &iv, b"header", b"data").unwrap();
            let err = content_decrypt(cipher, &key, &iv, b"HEADER", &ciphertext, &tag).unwrap_err();
            assert!(err.is_verification_failure(), "{cipher:?}");
        }
    }

    #[test]
    fn altered_ciphertext_tag_or_iv_fails() {
        for cipher in ALL {
            let key = cipher.generate_key().unwrap();
            let iv = cipher.generate_iv().unwrap();
            let (ciphertext, tag) = content_encrypt(cipher, &key, &iv, b"aad", b"data").unwrap();

            let mut bad_ct = ciphertext.clone();
            bad_ct[0] ^= 1;
            assert!(content_decrypt(cipher, &key, &iv, b"aad", &bad_ct, &tag).is_err());

            let mut bad_tag = tag.clone();
            bad_tag[tag.len() - 1] ^= 1;
            assert!(content_decrypt(cipher, &key, &iv, b"aad", &ciphertext, &bad_tag).is_err());

            let mut bad_iv = iv.clone();
            bad_iv[0] ^= 1;
            assert!(content_decrypt(cipher, &key, &bad_iv, b"aad", &ciphertext, &tag).is_err());
        }
    }

    #[test]
    fn truncated_tag_fails() {
        let cipher = ContentCipher::A256CbcHs512;
        let key = cipher.generate_key().unwrap();
        let iv = cipher.generate_iv().unwrap();
        let (ciphertext, tag) = content_encrypt(cipher, &key, &iv, b"", b"data").unwrap();
        let err = content_decrypt(cipher, &key, &iv, b"", &ciphertext, &tag[..16]).unwrap_err();
        assert!(err.is_verification_failure());
    }

    #[test]
    fn cbc_tag_is_half_of_hmac_output() {
        let key: Vec<u8> = (0u8..32).collect();
        let iv = [0u8; 16];
        let (ciphertext, tag) =
            content_encrypt(ContentCipher::A128CbcHs256, &key, &iv, b"aad", b"x").unwrap();

        let full = crate::mac::hmac_sign_parts(
            ShaVariant::Sha256,
            &key[..16],
            &[b"aad", &iv, &ciphertext, &24u64.to_be_bytes()],
        )
        .unwrap();
        assert_eq!(tag, full[..16]);
    }

    #[test]
    fn wrong_key_length_is_misuse() {
        let err = content_encrypt(ContentCipher::A256Gcm, &[0u8; 16], &[0u8; 12], b"", b"x")
            .unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidKeyLength {
                expected: 32,
                got: 16
            }
        ));
    }

    #[test]
    fn wrong_iv_length_is_misuse() {
        let err = content_encrypt(ContentCipher::A128CbcHs256, &[0u8; 32], &[0u8; 12], b"", b"x")
            .unwrap_err();
        assert!(matches!(err, CryptoError::MalformedInput(_)));
    }

    #[test]
    fn sizes() {
        assert_eq!(ContentCipher::A192CbcHs384.key_len(), 48);
        assert_eq!(ContentCipher::A192CbcHs384.tag_len(), 24);
        assert_eq!(ContentCipher::A256CbcHs512.key_len(), 64);
        assert_eq!(ContentCipher::A192Gcm.key_len(), 24);
        assert_eq!(ContentCipher::A192Gcm.iv_len(), 12);
        assert_eq!(ContentCipher::A128CbcHs256.iv_len(), 16);
    }
}
