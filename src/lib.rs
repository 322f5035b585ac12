//! tokenseal: sign, verify, encrypt and decrypt compact JOSE tokens behind an
//! algorithm allow-list.
//!
//! Primitives live in [`crypto`], the registry and engines in [`jose`]. The
//! common types are re-exported here.

pub mod offload;

pub use tokenseal_crypto as crypto;
pub use tokenseal_jose as jose;

pub use offload::OffloadError;
pub use tokenseal_crypto::{CryptoError, EcCurve, EcKeyPair, RsaKeyPair, SymmetricKey};
pub use tokenseal_jose::{
    Algorithm, AlgorithmRegistry, ClaimsConfig, ClaimsError, ClaimsValidator,
    ContentEncryptionAlgorithm, EngineConfig, ErrorDisclosure, Header, JoseError, JwsAlgorithm,
    Key, KeyManagementAlgorithm, KeyProvider, KeyPurpose, TokenEngine,
};
