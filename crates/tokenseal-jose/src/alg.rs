//! Closed enumerations of the JOSE algorithm identifiers this crate understands.
//!
//! Each identifier maps to exactly one primitive and one [`KeyShape`]. `none` is not
//! representable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokenseal_crypto::{ContentCipher, EcCurve, ShaVariant};

use crate::error::JoseError;

/// The key a given algorithm accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape {
    /// Symmetric key of exactly `len` bytes.
    Symmetric { len: usize },
    /// Non-empty symmetric key of any length (HMAC).
    SymmetricAnyLength,
    /// RSA key with a modulus of at least 2048 bits.
    Rsa,
    /// EC key on the given curve.
    Ec(EcCurve),
    /// EC key on any supported curve (ECDH-ES).
    EcAnyCurve,
}

impl fmt::Display for KeyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyShape::Symmetric { len } => write!(f, "{len}-byte symmetric key"),
            KeyShape::SymmetricAnyLength => f.write_str("symmetric key"),
            KeyShape::Rsa => f.write_str("RSA key"),
            KeyShape::Ec(curve) => write!(f, "EC key on {curve}"),
            KeyShape::EcAnyCurve => f.write_str("EC key"),
        }
    }
}

/// Primitive family behind a signature algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureFamily {
    Hmac,
    RsaPkcs1,
    RsaPss,
    Ecdsa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JwsAlgorithm {
    HS256,
    HS384,
    HS512,
    RS256,
    RS384,
    RS512,
    PS256,
    PS384,
    PS512,
    ES256,
    ES384,
    ES512,
}

impl JwsAlgorithm {
    pub const ALL: [JwsAlgorithm; 12] = [
        JwsAlgorithm::HS256,
        JwsAlgorithm::HS384,
        JwsAlgorithm::HS512,
        JwsAlgorithm::RS256,
        JwsAlgorithm::RS384,
        JwsAlgorithm::RS512,
        JwsAlgorithm::PS256,
        JwsAlgorithm::PS384,
        JwsAlgorithm::PS512,
        JwsAlgorithm::ES256,
        JwsAlgorithm::ES384,
        JwsAlgorithm::ES512,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            JwsAlgorithm::HS256 => "HS256",
            JwsAlgorithm::HS384 => "HS384",
            JwsAlgorithm::HS512 => "HS512",
            JwsAlgorithm::RS256 => "RS256",
            JwsAlgorithm::RS384 => "RS384",
            JwsAlgorithm::RS512 => "RS512",
            JwsAlgorithm::PS256 => "PS256",
            JwsAlgorithm::PS384 => "PS384",
            JwsAlgorithm::PS512 => "PS512",
            JwsAlgorithm::ES256 => "ES256",
            JwsAlgorithm::ES384 => "ES384",
            JwsAlgorithm::ES512 => "ES512",
        }
    }

    pub const fn family(self) -> SignatureFamily {
        match self {
            JwsAlgorithm::HS256 | JwsAlgorithm::HS384 | JwsAlgorithm::HS512 => SignatureFamily::Hmac,
            JwsAlgorithm::RS256 | JwsAlgorithm::RS384 | JwsAlgorithm::RS512 => {
                SignatureFamily::RsaPkcs1
            }
            JwsAlgorithm::PS256 | JwsAlgorithm::PS384 | JwsAlgorithm::PS512 => SignatureFamily::RsaPss,
            JwsAlgorithm::ES256 | JwsAlgorithm::ES384 | JwsAlgorithm::ES512 => SignatureFamily::Ecdsa,
        }
    }

    pub const fn sha_variant(self) -> ShaVariant {
        match self {
            JwsAlgorithm::HS256 | JwsAlgorithm::RS256 | JwsAlgorithm::PS256 | JwsAlgorithm::ES256 => {
                ShaVariant::Sha256
            }
            JwsAlgorithm::HS384 | JwsAlgorithm::RS384 | JwsAlgorithm::PS384 | JwsAlgorithm::ES384 => {
                ShaVariant::Sha384
            }
            JwsAlgorithm::HS512 | JwsAlgorithm::RS512 | JwsAlgorithm::PS512 | JwsAlgorithm::ES512 => {
                ShaVariant::Sha512
            }
        }
    }

    pub const fn key_shape(self) -> KeyShape {
        match self.family() {
            SignatureFamily::Hmac => KeyShape::SymmetricAnyLength,
            SignatureFamily::RsaPkcs1 | SignatureFamily::RsaPss => KeyShape::Rsa,
            SignatureFamily::Ecdsa => KeyShape::Ec(match self.sha_variant() {
                ShaVariant::Sha256 => EcCurve::P256,
                ShaVariant::Sha384 => EcCurve::P384,
                ShaVariant::Sha512 => EcCurve::P521,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyManagementAlgorithm {
    #[serde(rename = "dir")]
    Direct,
    A128KW,
    A192KW,
    A256KW,
    #[serde(rename = "ECDH-ES")]
    EcdhEs,
    #[serde(rename = "ECDH-ES+A128KW")]
    EcdhEsA128KW,
    #[serde(rename = "ECDH-ES+A192KW")]
    EcdhEsA192KW,
    #[serde(rename = "ECDH-ES+A256KW")]
    EcdhEsA256KW,
    #[serde(rename = "RSA-OAEP-256")]
    RsaOaep256,
}

impl KeyManagementAlgorithm {
    pub const ALL: [KeyManagementAlgorithm; 9] = [
        KeyManagementAlgorithm::Direct,
        KeyManagementAlgorithm::A128KW,
        KeyManagementAlgorithm::A192KW,
        KeyManagementAlgorithm::A256KW,
        KeyManagementAlgorithm::EcdhEs,
        KeyManagementAlgorithm::EcdhEsA128KW,
        KeyManagementAlgorithm::EcdhEsA192KW,
        KeyManagementAlgorithm::EcdhEsA256KW,
        KeyManagementAlgorithm::RsaOaep256,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            KeyManagementAlgorithm::Direct => "dir",
            KeyManagementAlgorithm::A128KW => "A128KW",
            KeyManagementAlgorithm::A192KW => "A192KW",
            KeyManagementAlgorithm::A256KW => "A256KW",
            KeyManagementAlgorithm::EcdhEs => "ECDH-ES",
            KeyManagementAlgorithm::EcdhEsA128KW => "ECDH-ES+A128KW",
            KeyManagementAlgorithm::EcdhEsA192KW => "ECDH-ES+A192KW",
            KeyManagementAlgorithm::EcdhEsA256KW => "ECDH-ES+A256KW",
            KeyManagementAlgorithm::RsaOaep256 => "RSA-OAEP-256",
        }
    }

    /// KEK length in bytes for the AES-KW step, if this algorithm wraps the CEK.
    pub const fn wrap_key_len(self) -> Option<usize> {
        match self {
            KeyManagementAlgorithm::A128KW | KeyManagementAlgorithm::EcdhEsA128KW => Some(16),
            KeyManagementAlgorithm::A192KW | KeyManagementAlgorithm::EcdhEsA192KW => Some(24),
            KeyManagementAlgorithm::A256KW | KeyManagementAlgorithm::EcdhEsA256KW => Some(32),
            _ => None,
        }
    }

    pub const fn is_key_agreement(self) -> bool {
        matches!(
            self,
            KeyManagementAlgorithm::EcdhEs
                | KeyManagementAlgorithm::EcdhEsA128KW
                | KeyManagementAlgorithm::EcdhEsA192KW
                | KeyManagementAlgorithm::EcdhEsA256KW
        )
    }

    /// True when the token carries no encrypted-key segment.
    pub const fn has_empty_encrypted_key(self) -> bool {
        matches!(
            self,
            KeyManagementAlgorithm::Direct | KeyManagementAlgorithm::EcdhEs
        )
    }

    /// Key shape for this algorithm; `dir` depends on the content cipher.
    pub const fn key_shape(self, enc: ContentEncryptionAlgorithm) -> KeyShape {
        match self {
            KeyManagementAlgorithm::Direct => KeyShape::Symmetric {
                len: enc.cipher().key_len(),
            },
            KeyManagementAlgorithm::A128KW => KeyShape::Symmetric { len: 16 },
            KeyManagementAlgorithm::A192KW => KeyShape::Symmetric { len: 24 },
            KeyManagementAlgorithm::A256KW => KeyShape::Symmetric { len: 32 },
            KeyManagementAlgorithm::RsaOaep256 => KeyShape::Rsa,
            _ => KeyShape::EcAnyCurve,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentEncryptionAlgorithm {
    #[serde(rename = "A128CBC-HS256")]
    A128CbcHs256,
    #[serde(rename = "A192CBC-HS384")]
    A192CbcHs384,
    #[serde(rename = "A256CBC-HS512")]
    A256CbcHs512,
    A128GCM,
    A192GCM,
    A256GCM,
}

impl ContentEncryptionAlgorithm {
    pub const ALL: [ContentEncryptionAlgorithm; 6] = [
        ContentEncryptionAlgorithm::A128CbcHs256,
        ContentEncryptionAlgorithm::A192CbcHs384,
        ContentEncryptionAlgorithm::A256CbcHs512,
        ContentEncryptionAlgorithm::A128GCM,
        ContentEncryptionAlgorithm::A192GCM,
        ContentEncryptionAlgorithm::A256GCM,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ContentEncryptionAlgorithm::A128CbcHs256 => "A128CBC-HS256",
            ContentEncryptionAlgorithm::A192CbcHs384 => "A192CBC-HS384",
            ContentEncryptionAlgorithm::A256CbcHs512 => "A256CBC-HS512",
            ContentEncryptionAlgorithm::A128GCM => "A128GCM",
            ContentEncryptionAlgorithm::A192GCM => "A192GCM",
            ContentEncryptionAlgorithm::A256GCM => "A256GCM",
        }
    }

    pub const fn cipher(self) -> ContentCipher {
        match self {
            ContentEncryptionAlgorithm::A128CbcHs256 => ContentCipher::A128CbcHs256,
            ContentEncryptionAlgorithm::A192CbcHs384 => ContentCipher::A192CbcHs384,
            ContentEncryptionAlgorithm::A256CbcHs512 => ContentCipher::A256CbcHs512,
            ContentEncryptionAlgorithm::A128GCM => ContentCipher::A128Gcm,
            ContentEncryptionAlgorithm::A192GCM => ContentCipher::A192Gcm,
            ContentEncryptionAlgorithm::A256GCM => ContentCipher::A256Gcm,
        }
    }
}

/// Any identifier the registry can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Signature(JwsAlgorithm),
    KeyManagement(KeyManagementAlgorithm),
    ContentEncryption(ContentEncryptionAlgorithm),
}

impl Algorithm {
    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::Signature(alg) => alg.name(),
            Algorithm::KeyManagement(alg) => alg.name(),
            Algorithm::ContentEncryption(enc) => enc.name(),
        }
    }
}

impl From<JwsAlgorithm> for Algorithm {
    fn from(alg: JwsAlgorithm) -> Self {
        Algorithm::Signature(alg)
    }
}

impl From<KeyManagementAlgorithm> for Algorithm {
    fn from(alg: KeyManagementAlgorithm) -> Self {
        Algorithm::KeyManagement(alg)
    }
}

impl From<ContentEncryptionAlgorithm> for Algorithm {
    fn from(enc: ContentEncryptionAlgorithm) -> Self {
        Algorithm::ContentEncryption(enc)
    }
}

macro_rules! identifier_traits {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = JoseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::ALL
                    .into_iter()
                    .find(|alg| alg.name() == s)
                    .ok_or_else(|| JoseError::UnsupportedAlgorithm(s.to_string()))
            }
        }
    };
}

identifier_traits!(JwsAlgorithm);
identifier_traits!(KeyManagementAlgorithm);
identifier_traits!(ContentEncryptionAlgorithm);

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = JoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(alg) = s.parse::<JwsAlgorithm>() {
            return Ok(alg.into());
        }
        if let Ok(alg) = s.parse::<KeyManagementAlgorithm>() {
            return Ok(alg.into());
        }
        s.parse::<ContentEncryptionAlgorithm>()
            .map(Algorithm::from)
    }
}
