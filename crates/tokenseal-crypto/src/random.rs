//! Randomness for CEKs, IVs and salts.

use p256::elliptic_curve::rand_core::{self, CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Fill `buf` from the operating system CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    getrandom::getrandom(buf).map_err(|e| CryptoError::RngFailed(e.to_string()))
}

/// Allocate `len` fresh random bytes, zeroized when dropped.
pub fn random_bytes(len: usize) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let mut buf = Zeroizing::new(vec![0u8; len]);
    fill_random(&mut buf)?;
    Ok(buf)
}

/// OS-backed RNG for APIs that take an `RngCore`. Failures are recorded
/// instead of panicking; call [`CheckedRng::finish`] to surface them.
#[derive(Default)]
pub(crate) struct CheckedRng {
    failure: Option<getrandom::Error>,
}

impl CheckedRng {
    pub(crate) fn finish(self) -> Result<(), CryptoError> {
        match self.failure {
            Some(e) => Err(CryptoError::RngFailed(e.to_string())),
            None => Ok(()),
        }
    }
}

impl RngCore for CheckedRng {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        if let Err(e) = getrandom::getrandom(dest) {
            self.failure.get_or_insert(e);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        getrandom::getrandom(dest).map_err(|e| {
            self.failure.get_or_insert(e);
            rand_core::Error::from(e.code())
        })
    }
}

impl CryptoRng for CheckedRng {}
