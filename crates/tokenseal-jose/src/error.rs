use thiserror::Error;
use tokenseal_crypto::CryptoError;

/// Errors from token construction and validation.
#[derive(Debug, Error)]
pub enum JoseError {
    /// Wrong segment count, bad base64url, or an unreadable header.
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Algorithm mismatch")]
    AlgorithmMismatch,

    #[error("Verification failed")]
    VerificationFailed,

    /// What [`JoseError::AlgorithmMismatch`] and [`JoseError::VerificationFailed`]
    /// become under [`crate::ErrorDisclosure::Opaque`].
    #[error("Invalid token")]
    InvalidToken,

    #[error("Key does not fit algorithm: {0}")]
    KeyShapeInvalid(String),

    #[error("No key available for kid {0:?}")]
    KeyNotFound(Option<String>),

    #[error("Crypto error: {0}")]
    Primitive(CryptoError),

    #[error("Invalid claims: {0}")]
    Claims(#[from] ClaimsError),

    #[error("Header serialization failed: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl JoseError {
    /// Structural problems that carry no secret-dependent information.
    pub fn is_malformed(&self) -> bool {
        matches!(self, JoseError::MalformedToken(_))
    }

    /// Cryptographic rejection in either its opaque or detailed form.
    pub fn is_invalid(&self) -> bool {
        matches!(
            self,
            JoseError::InvalidToken | JoseError::AlgorithmMismatch | JoseError::VerificationFailed
        )
    }
}

// A failed primitive check is a token verdict, not misuse.
impl From<CryptoError> for JoseError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::VerificationFailed => JoseError::VerificationFailed,
            other => JoseError::Primitive(other),
        }
    }
}

/// Errors from checking time-based claims.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimsError {
    #[error("payload is not a JSON object: {0}")]
    NotAnObject(String),

    #[error("claim {0} is not an integer NumericDate")]
    InvalidNumericDate(&'static str),

    #[error("token expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("token issued in the future")]
    IssuedInFuture,

    #[error("token too old")]
    TooOld,

    #[error("missing required claim {0}")]
    Missing(&'static str),
}
