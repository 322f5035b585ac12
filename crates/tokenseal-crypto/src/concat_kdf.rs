//! Concat KDF (NIST SP 800-56A §5.8.1, single-step).
//!
//! K(i) = H(counter_i || Z || OtherInfo), counter starting at 1 as a 32-bit
//! big-endian integer; the rounds are concatenated and truncated to the requested
//! length.

use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::hash::{digest, ShaVariant};

/// Derive `key_len_bits / 8` bytes from shared secret `z`.
pub fn concat_kdf(
    variant: ShaVariant,
    z: &[u8],
    key_len_bits: usize,
    other_info: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if key_len_bits == 0 || key_len_bits % 8 != 0 {
        return Err(CryptoError::MalformedInput(format!(
            "derived key length must be a positive multiple of 8 bits, got {key_len_bits}"
        )));
    }
    let key_len = key_len_bits / 8;
    let rounds = key_len.div_ceil(variant.digest_len());
    let rounds = u32::try_from(rounds)
        .map_err(|_| CryptoError::MalformedInput("derived key length too large".to_string()))?;

    let mut derived = Zeroizing::new(Vec::with_capacity(rounds as usize * variant.digest_len()));
    for counter in 1..=rounds {
        let block = Zeroizing::new(digest(variant, &[&counter.to_be_bytes(), z, other_info]));
        derived.extend_from_slice(&block);
    }
    derived.truncate(key_len);
    Ok(derived)
}

/// JWA OtherInfo (RFC 7518 §4.6.2):
///
///   AlgorithmID = [len(alg):4 BE][alg bytes]
///   PartyUInfo  = [len(apu):4 BE][apu]
///   PartyVInfo  = [len(apv):4 BE][apv]
///   SuppPubInfo = [keydatalen:4 BE]
pub fn jwa_other_info(
    algorithm_id: &str,
    apu: &[u8],
    apv: &[u8],
    key_len_bits: u32,
) -> Result<Vec<u8>, CryptoError> {
    let mut info = Vec::with_capacity(16 + algorithm_id.len() + apu.len() + apv.len());
    for field in [algorithm_id.as_bytes(), apu, apv] {
        let len = u32::try_from(field.len())
            .map_err(|_| CryptoError::MalformedInput("OtherInfo field too long".to_string()))?;
        info.extend_from_slice(&len.to_be_bytes());
        info.extend_from_slice(field);
    }
    info.extend_from_slice(&key_len_bits.to_be_bytes());
    Ok(info)
}
