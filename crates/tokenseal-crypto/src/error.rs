use thiserror::Error;

/// Errors raised by the primitives.
///
/// Everything except [`CryptoError::VerificationFailed`] signals misuse: a key of the
/// wrong size, an unsupported curve, or structurally invalid input. A failed MAC,
/// signature, tag or key-unwrap check is always the unit variant so nothing about the
/// expected value leaks to the caller.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Unsupported curve: {0}")]
    UnsupportedCurve(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Verification failed")]
    VerificationFailed,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}

impl CryptoError {
    /// True when the error reports a failed integrity check rather than misuse.
    pub fn is_verification_failure(&self) -> bool {
        matches!(self, CryptoError::VerificationFailed)
    }
}
