//! The caller-facing engine: registry gating, key-shape checks, error disclosure
//! and logging around the JWS and JWE operations.

use tracing::{debug, trace};

use crate::alg::{Algorithm, ContentEncryptionAlgorithm, JwsAlgorithm, KeyManagementAlgorithm};
use crate::claims::ClaimsValidator;
use crate::compact::{parse, CompactToken, Header};
use crate::config::{EngineConfig, ErrorDisclosure};
use crate::error::JoseError;
use crate::key::{Key, KeyProvider, KeyPurpose};
use crate::registry::AlgorithmRegistry;
use crate::{jwe, jws};

/// Stateless apart from its immutable configuration; share it freely across threads.
#[derive(Debug, Clone)]
pub struct TokenEngine {
    registry: AlgorithmRegistry,
    config: EngineConfig,
}

impl TokenEngine {
    pub fn new(config: EngineConfig) -> Result<Self, JoseError> {
        let registry = AlgorithmRegistry::new(&config.allowed_algorithms)?;
        if registry.is_empty() {
            return Err(JoseError::Config("no algorithms are allowed".to_string()));
        }
        Ok(Self { registry, config })
    }

    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Claims validator preconfigured from [`EngineConfig::claims`].
    pub fn claims_validator(&self) -> ClaimsValidator {
        ClaimsValidator::new(&self.config.claims)
    }

    /// Sign `payload` with the algorithm named by `header.alg`.
    pub fn sign(&self, header: &Header, payload: &[u8], key: &Key) -> Result<String, JoseError> {
        let alg = self.registry.resolve_jws(header.alg())?;
        self.registry.check_signing_key(alg, key, KeyPurpose::Sign)?;
        let token = jws::sign_compact(alg, header, payload, key)?;
        trace!(alg = alg.name(), "signed token");
        Ok(token)
    }

    /// Verify a signed token that must use `expected`, returning its payload.
    pub fn verify(&self, token: &str, expected: JwsAlgorithm, key: &Key) -> Result<Vec<u8>, JoseError> {
        self.registry.require(expected)?;
        self.registry.check_signing_key(expected, key, KeyPurpose::Verify)?;
        match jws::verify_compact(token, expected, key) {
            Ok(payload) => {
                trace!(alg = expected.name(), "verified token");
                Ok(payload)
            }
            Err(err) => Err(self.reject("verify", expected.into(), err)),
        }
    }

    /// Encrypt `payload` with the algorithms named by `header.alg` and `header.enc`.
    pub fn encrypt(&self, header: &Header, payload: &[u8], key: &Key) -> Result<String, JoseError> {
        let alg = self.registry.resolve_key_management(header.alg())?;
        let enc = header
            .enc()
            .ok_or_else(|| JoseError::Config("encryption header has no enc".to_string()))
            .and_then(|enc| self.registry.resolve_content(enc))?;
        self.registry
            .check_encryption_key(alg, enc, key, KeyPurpose::Encrypt)?;
        let token = jwe::encrypt_compact(alg, enc, header, payload, key)?;
        trace!(alg = alg.name(), enc = enc.name(), "encrypted token");
        Ok(token)
    }

    /// Decrypt a token that must use `expected_alg` and `expected_enc`.
    pub fn decrypt(
        &self,
        token: &str,
        expected_alg: KeyManagementAlgorithm,
        expected_enc: ContentEncryptionAlgorithm,
        key: &Key,
    ) -> Result<Vec<u8>, JoseError> {
        self.registry.require(expected_alg)?;
        self.registry.require(expected_enc)?;
        self.registry
            .check_encryption_key(expected_alg, expected_enc, key, KeyPurpose::Decrypt)?;
        match jwe::decrypt_compact(token, expected_alg, expected_enc, key) {
            Ok(mut plaintext) => {
                trace!(alg = expected_alg.name(), enc = expected_enc.name(), "decrypted token");
                Ok(std::mem::take(&mut *plaintext))
            }
            Err(err) => Err(self.reject("decrypt", expected_alg.into(), err)),
        }
    }

    /// [`Self::verify`] with the key looked up by the token's `kid`.
    pub fn verify_with(
        &self,
        token: &str,
        expected: JwsAlgorithm,
        keys: &impl KeyProvider,
    ) -> Result<Vec<u8>, JoseError> {
        self.registry.require(expected)?;
        let key = self.lookup(token, expected.into(), keys)?;
        self.verify(token, expected, key)
    }

    /// [`Self::decrypt`] with the key looked up by the token's `kid`.
    pub fn decrypt_with(
        &self,
        token: &str,
        expected_alg: KeyManagementAlgorithm,
        expected_enc: ContentEncryptionAlgorithm,
        keys: &impl KeyProvider,
    ) -> Result<Vec<u8>, JoseError> {
        self.registry.require(expected_alg)?;
        self.registry.require(expected_enc)?;
        let key = self.lookup(token, expected_alg.into(), keys)?;
        self.decrypt(token, expected_alg, expected_enc, key)
    }

    fn lookup<'k>(
        &self,
        token: &str,
        alg: Algorithm,
        keys: &'k impl KeyProvider,
    ) -> Result<&'k Key, JoseError> {
        let parsed = parse(token).map_err(|err| self.reject("lookup", alg, err))?;
        let header = match &parsed {
            CompactToken::Signed(parts) => &parts.header,
            CompactToken::Encrypted(parts) => &parts.header,
        };
        let kid = header.kid();
        keys.key_for(kid, alg).ok_or_else(|| {
            debug!(kid, alg = alg.name(), "no key for token");
            JoseError::KeyNotFound(kid.map(str::to_string))
        })
    }

    /// Log a rejection and apply the configured disclosure policy.
    fn reject(&self, operation: &'static str, alg: Algorithm, err: JoseError) -> JoseError {
        debug!(operation, alg = alg.name(), reason = %err, "token rejected");
        match (self.config.error_disclosure, err) {
            (ErrorDisclosure::Opaque, JoseError::AlgorithmMismatch | JoseError::VerificationFailed) => {
                JoseError::InvalidToken
            }
            (_, err) => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenseal_crypto::{EcCurve, EcKeyPair};

    fn engine(disclosure: ErrorDisclosure) -> TokenEngine {
        TokenEngine::new(
            EngineConfig::new(["HS256", "HS512", "ES256", "A128KW", "dir", "A128GCM", "A256GCM"])
                .with_error_disclosure(disclosure),
        )
        .unwrap()
    }

    #[test]
    fn empty_allow_list_is_rejected() {
        assert!(matches!(
            TokenEngine::new(EngineConfig::default()),
            Err(JoseError::Config(_))
        ));
    }

    #[test]
    fn unknown_configured_algorithm_is_rejected() {
        assert!(matches!(
            TokenEngine::new(EngineConfig::new(["HS256", "XS999"])),
            Err(JoseError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn sign_rejects_unlisted_algorithm() {
        let engine = engine(ErrorDisclosure::Opaque);
        let key = Key::symmetric(vec![1u8; 48]).unwrap();
        let err = engine
            .sign(&Header::signed(JwsAlgorithm::HS384), b"x", &key)
            .unwrap_err();
        assert!(matches!(err, JoseError::UnsupportedAlgorithm(_)));

        let err = engine.sign(&Header::new("none"), b"x", &key).unwrap_err();
        assert!(matches!(err, JoseError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn opaque_disclosure_hides_mismatch_and_bad_signature() {
        let engine = engine(ErrorDisclosure::Opaque);
        let key = Key::symmetric(vec![1u8; 64]).unwrap();
        let token = engine
            .sign(&Header::signed(JwsAlgorithm::HS256), b"x", &key)
            .unwrap();

        let mismatch = engine.verify(&token, JwsAlgorithm::HS512, &key).unwrap_err();
        let other_key = Key::symmetric(vec![2u8; 64]).unwrap();
        let bad_sig = engine.verify(&token, JwsAlgorithm::HS256, &other_key).unwrap_err();

        assert!(matches!(mismatch, JoseError::InvalidToken));
        assert!(matches!(bad_sig, JoseError::InvalidToken));
        assert_eq!(mismatch.to_string(), bad_sig.to_string());
    }

    #[test]
    fn detailed_disclosure_separates_them() {
        let engine = engine(ErrorDisclosure::Detailed);
        let key = Key::symmetric(vec![1u8; 64]).unwrap();
        let token = engine
            .sign(&Header::signed(JwsAlgorithm::HS256), b"x", &key)
            .unwrap();
        assert!(matches!(
            engine.verify(&token, JwsAlgorithm::HS512, &key),
            Err(JoseError::AlgorithmMismatch)
        ));
        assert!(matches!(
            engine.verify(&token, JwsAlgorithm::HS256, &Key::symmetric(vec![2u8; 64]).unwrap()),
            Err(JoseError::VerificationFailed)
        ));
    }

    #[test]
    fn malformed_is_reported_distinctly() {
        let engine = engine(ErrorDisclosure::Opaque);
        let key = Key::symmetric(vec![1u8; 16]).unwrap();
        let err = engine
            .decrypt("abc.def", KeyManagementAlgorithm::Direct, ContentEncryptionAlgorithm::A128GCM, &key)
            .unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn key_shape_checked_before_crypto() {
        let engine = engine(ErrorDisclosure::Opaque);
        let ec = Key::Ec(EcKeyPair::generate(EcCurve::P256).unwrap());
        let err = engine
            .sign(&Header::signed(JwsAlgorithm::HS256), b"x", &ec)
            .unwrap_err();
        assert!(matches!(err, JoseError::KeyShapeInvalid(_)));

        let public = Key::Ec(EcKeyPair::generate(EcCurve::P256).unwrap().to_public());
        let err = engine
            .sign(&Header::signed(JwsAlgorithm::ES256), b"x", &public)
            .unwrap_err();
        assert!(matches!(err, JoseError::KeyShapeInvalid(_)));
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let engine = engine(ErrorDisclosure::Opaque);
        let kek = Key::symmetric(vec![7u8; 16]).unwrap();
        let header = Header::encrypted(KeyManagementAlgorithm::A128KW, ContentEncryptionAlgorithm::A256GCM)
            .with_typ("JWT");
        let token = engine.encrypt(&header, b"claims", &kek).unwrap();
        let plaintext = engine
            .decrypt(&token, KeyManagementAlgorithm::A128KW, ContentEncryptionAlgorithm::A256GCM, &kek)
            .unwrap();
        assert_eq!(plaintext, b"claims");
    }

    #[test]
    fn encrypt_requires_enc() {
        let engine = engine(ErrorDisclosure::Opaque);
        let kek = Key::symmetric(vec![7u8; 16]).unwrap();
        assert!(matches!(
            engine.encrypt(&Header::new("A128KW"), b"x", &kek),
            Err(JoseError::Config(_))
        ));
    }

    #[test]
    fn decrypt_rejects_unlisted_content_cipher() {
        let engine = engine(ErrorDisclosure::Opaque);
        let kek = Key::symmetric(vec![7u8; 16]).unwrap();
        assert!(matches!(
            engine.decrypt("a.b.c.d.e", KeyManagementAlgorithm::A128KW, ContentEncryptionAlgorithm::A192GCM, &kek),
            Err(JoseError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn verify_with_uses_kid() {
        use std::collections::HashMap;

        let engine = engine(ErrorDisclosure::Opaque);
        let mut keys = HashMap::new();
        keys.insert("a".to_string(), Key::symmetric(vec![1u8; 32]).unwrap());
        keys.insert("b".to_string(), Key::symmetric(vec![2u8; 32]).unwrap());

        let header = Header::signed(JwsAlgorithm::HS256).with_kid("b");
        let token = engine.sign(&header, b"payload", &keys["b"]).unwrap();
        assert_eq!(engine.verify_with(&token, JwsAlgorithm::HS256, &keys).unwrap(), b"payload");

        let unknown = engine
            .sign(&Header::signed(JwsAlgorithm::HS256).with_kid("c"), b"payload", &keys["a"])
            .unwrap();
        assert!(matches!(
            engine.verify_with(&unknown, JwsAlgorithm::HS256, &keys),
            Err(JoseError::KeyNotFound(Some(ref kid))) if kid == "c"
        ));
    }

    /// Answers nothing and remembers how often it was asked.
    #[derive(Default)]
    struct CountingProvider {
        queries: std::cell::Cell<usize>,
    }

    impl KeyProvider for CountingProvider {
        fn key_for(&self, _kid: Option<&str>, _alg: Algorithm) -> Option<&Key> {
            self.queries.set(self.queries.get() + 1);
            None
        }
    }

    #[test]
    fn unlisted_algorithm_rejected_before_key_lookup() {
        let engine = engine(ErrorDisclosure::Opaque);
        let keys = CountingProvider::default();

        let signed = engine
            .sign(
                &Header::signed(JwsAlgorithm::HS256).with_kid("unknown"),
                b"payload",
                &Key::symmetric(vec![1u8; 32]).unwrap(),
            )
            .unwrap();
        assert!(matches!(
            engine.verify_with(&signed, JwsAlgorithm::HS384, &keys),
            Err(JoseError::UnsupportedAlgorithm(ref alg)) if alg == "HS384"
        ));

        let encrypted = engine
            .encrypt(
                &Header::encrypted(KeyManagementAlgorithm::Direct, ContentEncryptionAlgorithm::A128GCM)
                    .with_kid("unknown"),
                b"payload",
                &Key::symmetric(vec![3u8; 16]).unwrap(),
            )
            .unwrap();
        assert!(matches!(
            engine.decrypt_with(
                &encrypted,
                KeyManagementAlgorithm::Direct,
                ContentEncryptionAlgorithm::A192GCM,
                &keys
            ),
            Err(JoseError::UnsupportedAlgorithm(ref enc)) if enc == "A192GCM"
        ));

        assert_eq!(keys.queries.get(), 0);

        // Listed algorithms do reach the provider.
        assert!(matches!(
            engine.verify_with(&signed, JwsAlgorithm::HS256, &keys),
            Err(JoseError::KeyNotFound(_))
        ));
        assert_eq!(keys.queries.get(), 1);
    }

    #[test]
    fn decrypt_with_single_key_ignores_kid() {
        let engine = engine(ErrorDisclosure::Opaque);
        let key = Key::symmetric(vec![3u8; 16]).unwrap();
        let header = Header::encrypted(KeyManagementAlgorithm::Direct, ContentEncryptionAlgorithm::A128GCM)
            .with_kid("anything");
        let token = engine.encrypt(&header, b"direct", &key).unwrap();
        let plaintext = engine
            .decrypt_with(&token, KeyManagementAlgorithm::Direct, ContentEncryptionAlgorithm::A128GCM, &key)
            .unwrap();
        assert_eq!(plaintext, b"direct");
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TokenEngine>();
    }
}
