//! Key material handed to the engine, and the seam for looking keys up by `kid`.

use std::collections::HashMap;

use tokenseal_crypto::{EcKeyPair, RsaKeyPair, SymmetricKey};

use crate::alg::{Algorithm, KeyShape};

/// Caller-owned key, borrowed by the engine for one operation.
#[derive(Debug, Clone)]
pub enum Key {
    Symmetric(SymmetricKey),
    Rsa(RsaKeyPair),
    Ec(EcKeyPair),
}

/// What the engine is about to do with a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPurpose {
    Sign,
    Verify,
    Encrypt,
    Decrypt,
}

impl KeyPurpose {
    /// Signing and decrypting need the private half of an asymmetric key.
    pub const fn needs_private(self) -> bool {
        matches!(self, KeyPurpose::Sign | KeyPurpose::Decrypt)
    }
}

impl Key {
    pub fn symmetric(bytes: impl Into<Vec<u8>>) -> Result<Self, tokenseal_crypto::CryptoError> {
        SymmetricKey::new(bytes).map(Key::Symmetric)
    }

    /// Short description used in shape errors; never includes key bytes.
    pub fn describe(&self) -> String {
        match self {
            Key::Symmetric(k) => format!("{}-byte symmetric key", k.len()),
            Key::Rsa(k) => format!("{}-bit RSA key", k.modulus_bits()),
            Key::Ec(k) => format!("EC key on {}", k.curve()),
        }
    }

    /// True when this key can serve `shape` for `purpose`.
    pub fn fits(&self, shape: KeyShape, purpose: KeyPurpose) -> bool {
        match (shape, self) {
            (KeyShape::Symmetric { len }, Key::Symmetric(k)) => k.len() == len,
            (KeyShape::SymmetricAnyLength, Key::Symmetric(k)) => !k.is_empty(),
            (KeyShape::Rsa, Key::Rsa(k)) => !purpose.needs_private() || k.has_private(),
            (KeyShape::Ec(curve), Key::Ec(k)) => {
                k.curve() == curve && (!purpose.needs_private() || k.has_private())
            }
            (KeyShape::EcAnyCurve, Key::Ec(k)) => !purpose.needs_private() || k.has_private(),
            _ => false,
        }
    }
}

impl From<SymmetricKey> for Key {
    fn from(key: SymmetricKey) -> Self {
        Key::Symmetric(key)
    }
}

impl From<RsaKeyPair> for Key {
    fn from(key: RsaKeyPair) -> Self {
        Key::Rsa(key)
    }
}

impl From<EcKeyPair> for Key {
    fn from(key: EcKeyPair) -> Self {
        Key::Ec(key)
    }
}

/// Supplies already-validated keys. Loading, rotation and storage live behind it.
pub trait KeyProvider {
    /// Key for the token's `kid` (if any) and algorithm, or `None`.
    fn key_for(&self, kid: Option<&str>, alg: Algorithm) -> Option<&Key>;
}

/// A single key answers for every `kid`.
impl KeyProvider for Key {
    fn key_for(&self, _kid: Option<&str>, _alg: Algorithm) -> Option<&Key> {
        Some(self)
    }
}

/// Keys indexed by `kid`; tokens without a `kid` find nothing.
impl KeyProvider for HashMap<String, Key> {
    fn key_for(&self, kid: Option<&str>, _alg: Algorithm) -> Option<&Key> {
        kid.and_then(|kid| self.get(kid))
    }
}
