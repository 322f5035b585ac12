//! AES Key Wrap (RFC 3394) with the default initial value `A6A6A6A6A6A6A6A6`.
//!
//! Wrapped output is always 8 bytes longer than the key data. Key data must be a
//! multiple of 8 bytes and at least 16 bytes.

use aes_kw::{KekAes128, KekAes192, KekAes256};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Integrity-check block prepended by the wrap operation.
pub const AES_KW_OVERHEAD: usize = 8;

/// Wrap `key_data` under `kek`. The KEK length (16, 24 or 32 bytes) selects AES-128,
/// AES-192 or AES-256.
pub fn aes_kw_wrap(kek: &[u8], key_data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    check_key_data(key_data.len())?;
    let mut wrapped = vec![0u8; key_data.len() + AES_KW_OVERHEAD];

    let result = match kek.len() {
        16 => KekAes128::from(to_array::<16>(kek)?).wrap(key_data, &mut wrapped),
        24 => KekAes192::from(to_array::<24>(kek)?).wrap(key_data, &mut wrapped),
        32 => KekAes256::from(to_array::<32>(kek)?).wrap(key_data, &mut wrapped),
        got => return Err(CryptoError::InvalidKeyLength { expected: 32, got }),
    };
    result.map_err(|e| CryptoError::EncryptionFailed(format!("AES-KW wrap failed: {e:?}")))?;
    Ok(wrapped)
}

/// Unwrap `wrapped` under `kek`.
///
/// A failed integrity check is [`CryptoError::VerificationFailed`]; the caller
/// learns nothing about which block differed.
pub fn aes_kw_unwrap(kek: &[u8], wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if wrapped.len() < AES_KW_OVERHEAD {
        return Err(CryptoError::MalformedInput(format!(
            "wrapped key must be at least {} bytes, got {}",
            AES_KW_OVERHEAD,
            wrapped.len()
        )));
    }
    let unwrapped_len = wrapped.len() - AES_KW_OVERHEAD;
    check_key_data(unwrapped_len)?;
    let mut key_data = Zeroizing::new(vec![0u8; unwrapped_len]);

    let result = match kek.len() {
        16 => KekAes128::from(to_array::<16>(kek)?).unwrap(wrapped, &mut key_data),
        24 => KekAes192::from(to_array::<24>(kek)?).unwrap(wrapped, &mut key_data),
        32 => KekAes256::from(to_array::<32>(kek)?).unwrap(wrapped, &mut key_data),
        got => return Err(CryptoError::InvalidKeyLength { expected: 32, got }),
    };
    result.map_err(|_| CryptoError::VerificationFailed)?;
    Ok(key_data)
}

fn check_key_data(len: usize) -> Result<(), CryptoError> {
    if len < 16 || len % 8 != 0 {
        return Err(CryptoError::MalformedInput(format!(
            "AES-KW key data must be a multiple of 8 bytes and at least 16, got {len}"
        )));
    }
    Ok(())
}

fn to_array<const N: usize>(kek: &[u8]) -> Result<[u8; N], CryptoError> {
    kek.try_into().map_err(|_| CryptoError::InvalidKeyLength {
        expected: N,
        got: kek.len(),
    })
}
