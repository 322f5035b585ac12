//! Compact JWS and JWE for the tokenseal engine.
//!
//! This crate provides:
//! - The algorithm allow-list and typed JOSE identifiers
//! - Compact serialization and protected-header handling
//! - JWS signing and verification (HS*, RS*, PS*, ES*)
//! - JWE encryption and decryption (dir, AES-KW, ECDH-ES, RSA-OAEP-256)
//! - Time-claim validation for recovered payloads
//!
//! Key loading, rotation and storage are out of scope; callers hand keys in.

pub mod alg;
pub mod claims;
pub mod compact;
pub mod config;
pub mod engine;
pub mod error;
pub mod jwe;
pub mod jws;
pub mod key;
pub mod registry;

pub use alg::{
    Algorithm, ContentEncryptionAlgorithm, JwsAlgorithm, KeyManagementAlgorithm, KeyShape,
    SignatureFamily,
};
pub use claims::ClaimsValidator;
pub use compact::{parse, CompactToken, EphemeralPublicKey, Header, JweParts, JwsParts};
pub use config::{ClaimsConfig, EngineConfig, ErrorDisclosure};
pub use engine::TokenEngine;
pub use error::{ClaimsError, JoseError};
pub use jwe::{decrypt_compact, encrypt_compact};
pub use jws::{sign_compact, verify_compact};
pub use key::{Key, KeyProvider, KeyPurpose};
pub use registry::AlgorithmRegistry;
