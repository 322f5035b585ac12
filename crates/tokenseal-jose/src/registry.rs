//! The allow-list of algorithms an engine will use, built once from configuration.

use std::collections::HashSet;

use crate::alg::{Algorithm, ContentEncryptionAlgorithm, JwsAlgorithm, KeyManagementAlgorithm};
use crate::error::JoseError;
use crate::key::{Key, KeyPurpose};

/// Immutable set of allowed algorithms. Shared by reference across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmRegistry {
    allowed: HashSet<Algorithm>,
}

impl AlgorithmRegistry {
    /// Build from JOSE identifiers. An unknown identifier is a configuration error,
    /// not something to skip.
    pub fn new<I, S>(identifiers: I) -> Result<Self, JoseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = identifiers
            .into_iter()
            .map(|id| id.as_ref().parse::<Algorithm>())
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(Self { allowed })
    }

    pub fn is_allowed(&self, alg: impl Into<Algorithm>) -> bool {
        self.allowed.contains(&alg.into())
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Fail with [`JoseError::UnsupportedAlgorithm`] unless `alg` is allow-listed.
    pub fn require(&self, alg: impl Into<Algorithm>) -> Result<(), JoseError> {
        let alg = alg.into();
        if self.allowed.contains(&alg) {
            Ok(())
        } else {
            Err(JoseError::UnsupportedAlgorithm(alg.name().to_string()))
        }
    }

    pub fn resolve_jws(&self, id: &str) -> Result<JwsAlgorithm, JoseError> {
        let alg: JwsAlgorithm = id.parse()?;
        self.require(alg)?;
        Ok(alg)
    }

    pub fn resolve_key_management(&self, id: &str) -> Result<KeyManagementAlgorithm, JoseError> {
        let alg: KeyManagementAlgorithm = id.parse()?;
        self.require(alg)?;
        Ok(alg)
    }

    pub fn resolve_content(&self, id: &str) -> Result<ContentEncryptionAlgorithm, JoseError> {
        let enc: ContentEncryptionAlgorithm = id.parse()?;
        self.require(enc)?;
        Ok(enc)
    }

    /// Check that `key` has the shape `alg` requires for `purpose`.
    pub fn check_signing_key(
        &self,
        alg: JwsAlgorithm,
        key: &Key,
        purpose: KeyPurpose,
    ) -> Result<(), JoseError> {
        let shape = alg.key_shape();
        if key.fits(shape, purpose) {
            Ok(())
        } else {
            Err(shape_error(alg.into(), &shape.to_string(), key, purpose))
        }
    }

    /// Check that `key` has the shape `alg` (with content cipher `enc`) requires.
    pub fn check_encryption_key(
        &self,
        alg: KeyManagementAlgorithm,
        enc: ContentEncryptionAlgorithm,
        key: &Key,
        purpose: KeyPurpose,
    ) -> Result<(), JoseError> {
        let shape = alg.key_shape(enc);
        if key.fits(shape, purpose) {
            Ok(())
        } else {
            Err(shape_error(alg.into(), &shape.to_string(), key, purpose))
        }
    }
}

fn shape_error(alg: Algorithm, shape: &str, key: &Key, purpose: KeyPurpose) -> JoseError {
    let private = if purpose.needs_private() {
        " with private half"
    } else {
        ""
    };
    JoseError::KeyShapeInvalid(format!(
        "{alg} needs a {shape}{private}, got {}",
        key.describe()
    ))
}
