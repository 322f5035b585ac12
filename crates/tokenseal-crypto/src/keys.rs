//! Key material per algorithm family.
//!
//! Keys are validated when constructed and never print their contents. Secret halves
//! are wiped on drop: [`SymmetricKey`] through `ZeroizeOnDrop`, EC scalars and RSA
//! private keys through their own drop implementations.

use std::fmt;

use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::base64url::{base64url_decode, base64url_encode};
use crate::error::CryptoError;
use crate::random::{fill_random, CheckedRng};

/// Smallest RSA modulus accepted for signatures and key transport (RFC 7518 §3.3).
pub const RSA_MIN_MODULUS_BITS: usize = 2048;

/// A symmetric secret: HMAC key, AES key-encryption key, or direct CEK.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: Vec<u8>,
}

impl SymmetricKey {
    /// Wrap caller-supplied secret bytes. Empty secrets are rejected.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, CryptoError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(CryptoError::InvalidKey("symmetric key is empty".to_string()));
        }
        Ok(Self { bytes })
    }

    /// Wrap secret bytes that must be exactly `expected` bytes long.
    pub fn with_len(bytes: impl Into<Vec<u8>>, expected: usize) -> Result<Self, CryptoError> {
        let key = Self::new(bytes)?;
        if key.len() != expected {
            return Err(CryptoError::InvalidKeyLength {
                expected,
                got: key.len(),
            });
        }
        Ok(key)
    }

    /// Generate a fresh random key of `len` bytes.
    pub fn generate(len: usize) -> Result<Self, CryptoError> {
        let mut bytes = vec![0u8; len];
        fill_random(&mut bytes)?;
        Self::new(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

/// An RSA key: always the public half, optionally the private half.
#[derive(Clone)]
pub struct RsaKeyPair {
    public: RsaPublicKey,
    private: Option<RsaPrivateKey>,
}

impl RsaKeyPair {
    pub fn from_private(private: RsaPrivateKey) -> Result<Self, CryptoError> {
        check_modulus(private.size())?;
        private
            .validate()
            .map_err(|e| CryptoError::InvalidKey(format!("RSA private key: {e}")))?;
        Ok(Self {
            public: private.to_public_key(),
            private: Some(private),
        })
    }

    pub fn from_public(public: RsaPublicKey) -> Result<Self, CryptoError> {
        check_modulus(public.size())?;
        Ok(Self {
            public,
            private: None,
        })
    }

    /// Parse a PKCS#8 DER private key.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, CryptoError> {
        let private = RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| CryptoError::InvalidKey(format!("RSA PKCS#8: {e}")))?;
        Self::from_private(private)
    }

    /// Parse a PKCS#8 PEM private key.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self, CryptoError> {
        let private = RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|e| CryptoError::InvalidKey(format!("RSA PKCS#8 PEM: {e}")))?;
        Self::from_private(private)
    }

    /// Parse a SubjectPublicKeyInfo DER public key.
    pub fn from_public_key_der(der: &[u8]) -> Result<Self, CryptoError> {
        let public = RsaPublicKey::from_public_key_der(der)
            .map_err(|e| CryptoError::InvalidKey(format!("RSA SPKI: {e}")))?;
        Self::from_public(public)
    }

    /// Parse a SubjectPublicKeyInfo PEM public key.
    pub fn from_public_key_pem(pem: &str) -> Result<Self, CryptoError> {
        let public = RsaPublicKey::from_public_key_pem(pem)
            .map_err(|e| CryptoError::InvalidKey(format!("RSA SPKI PEM: {e}")))?;
        Self::from_public(public)
    }

    /// Generate a new key pair. Intended for tests and tooling; production keys come
    /// from the key provider.
    pub fn generate(bits: usize) -> Result<Self, CryptoError> {
        // Prime search never terminates on a dead RNG, so fail up front.
        fill_random(&mut [0u8; 1])?;
        let mut rng = CheckedRng::default();
        let private = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| CryptoError::InvalidKey(format!("RSA generation: {e}")))?;
        rng.finish()?;
        Self::from_private(private)
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    pub fn private_key(&self) -> Option<&RsaPrivateKey> {
        self.private.as_ref()
    }

    /// The public half alone, for handing to verifiers.
    pub fn to_public(&self) -> Self {
        Self {
            public: self.public.clone(),
            private: None,
        }
    }

    pub fn has_private(&self) -> bool {
        self.private.is_some()
    }

    pub fn modulus_bits(&self) -> usize {
        self.public.size() * 8
    }

    /// Modulus length in bytes, which is also the signature length.
    pub fn modulus_len(&self) -> usize {
        self.public.size()
    }
}

impl fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeyPair")
            .field("modulus_bits", &self.modulus_bits())
            .field("private", &self.has_private())
            .finish()
    }
}

fn check_modulus(size_bytes: usize) -> Result<(), CryptoError> {
    if size_bytes * 8 < RSA_MIN_MODULUS_BITS {
        return Err(CryptoError::InvalidKey(format!(
            "RSA modulus must be at least {RSA_MIN_MODULUS_BITS} bits, got {}",
            size_bytes * 8
        )));
    }
    Ok(())
}

/// NIST curves supported for ECDSA and ECDH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcCurve {
    P256,
    P384,
    P521,
}

impl EcCurve {
    /// JOSE `crv` name.
    pub const fn name(self) -> &'static str {
        match self {
            EcCurve::P256 => "P-256",
            EcCurve::P384 => "P-384",
            EcCurve::P521 => "P-521",
        }
    }

    /// Field element length in bytes; also the length of each of `r`, `s`, `x`, `y`.
    pub const fn coordinate_len(self) -> usize {
        match self {
            EcCurve::P256 => 32,
            EcCurve::P384 => 48,
            EcCurve::P521 => 66,
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CryptoError> {
        match name {
            "P-256" => Ok(EcCurve::P256),
            "P-384" => Ok(EcCurve::P384),
            "P-521" => Ok(EcCurve::P521),
            other => Err(CryptoError::UnsupportedCurve(other.to_string())),
        }
    }
}

impl fmt::Display for EcCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Public point on one of the supported curves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EcPublicKey {
    P256(p256::PublicKey),
    P384(p384::PublicKey),
    P521(p521::PublicKey),
}

/// Private scalar on one of the supported curves.
#[derive(Clone)]
pub enum EcSecretKey {
    P256(p256::SecretKey),
    P384(p384::SecretKey),
    P521(p521::SecretKey),
}

impl EcPublicKey {
    pub fn curve(&self) -> EcCurve {
        match self {
            EcPublicKey::P256(_) => EcCurve::P256,
            EcPublicKey::P384(_) => EcCurve::P384,
            EcPublicKey::P521(_) => EcCurve::P521,
        }
    }

    /// Parse an SEC1-encoded point (compressed or uncompressed) on `curve`.
    pub fn from_sec1_bytes(curve: EcCurve, bytes: &[u8]) -> Result<Self, CryptoError> {
        let invalid = |e: p256::elliptic_curve::Error| {
            CryptoError::InvalidKey(format!("{curve} point: {e}"))
        };
        Ok(match curve {
            EcCurve::P256 => EcPublicKey::P256(p256::PublicKey::from_sec1_bytes(bytes).map_err(invalid)?),
            EcCurve::P384 => EcPublicKey::P384(p384::PublicKey::from_sec1_bytes(bytes).map_err(invalid)?),
            EcCurve::P521 => EcPublicKey::P521(p521::PublicKey::from_sec1_bytes(bytes).map_err(invalid)?),
        })
    }

    /// Build a point from affine coordinates, left-padding coordinates that omit
    /// leading zero bytes.
    pub fn from_coordinates(curve: EcCurve, x: &[u8], y: &[u8]) -> Result<Self, CryptoError> {
        let len = curve.coordinate_len();
        if x.len() > len || y.len() > len {
            return Err(CryptoError::InvalidKey(format!(
                "{curve} coordinates must be at most {len} bytes"
            )));
        }

        // Uncompressed SEC1 point: 0x04 || x || y
        let mut uncompressed = vec![0u8; 1 + 2 * len];
        uncompressed[0] = 0x04;
        uncompressed[1 + len - x.len()..1 + len].copy_from_slice(x);
        uncompressed[1 + 2 * len - y.len()..].copy_from_slice(y);

        Self::from_sec1_bytes(curve, &uncompressed)
    }

    /// Uncompressed SEC1 encoding: `0x04 || x || y`.
    pub fn to_sec1_uncompressed(&self) -> Vec<u8> {
        match self {
            EcPublicKey::P256(k) => k.to_encoded_point(false).as_bytes().to_vec(),
            EcPublicKey::P384(k) => k.to_encoded_point(false).as_bytes().to_vec(),
            EcPublicKey::P521(k) => k.to_encoded_point(false).as_bytes().to_vec(),
        }
    }

    /// Fixed-length affine `(x, y)` coordinates.
    pub fn coordinates(&self) -> (Vec<u8>, Vec<u8>) {
        let len = self.curve().coordinate_len();
        let point = self.to_sec1_uncompressed();
        let (x, y) = point[1..].split_at(len);
        (x.to_vec(), y.to_vec())
    }
}

impl EcSecretKey {
    pub fn curve(&self) -> EcCurve {
        match self {
            EcSecretKey::P256(_) => EcCurve::P256,
            EcSecretKey::P384(_) => EcCurve::P384,
            EcSecretKey::P521(_) => EcCurve::P521,
        }
    }

    /// Parse a raw big-endian private scalar.
    pub fn from_scalar_bytes(curve: EcCurve, bytes: &[u8]) -> Result<Self, CryptoError> {
        let invalid = |e: p256::elliptic_curve::Error| {
            CryptoError::InvalidKey(format!("{curve} private scalar: {e}"))
        };
        Ok(match curve {
            EcCurve::P256 => EcSecretKey::P256(p256::SecretKey::from_slice(bytes).map_err(invalid)?),
            EcCurve::P384 => EcSecretKey::P384(p384::SecretKey::from_slice(bytes).map_err(invalid)?),
            EcCurve::P521 => EcSecretKey::P521(p521::SecretKey::from_slice(bytes).map_err(invalid)?),
        })
    }

    /// Draw a fresh scalar, rejecting zero and values at or above the curve order.
    pub fn generate(curve: EcCurve) -> Result<Self, CryptoError> {
        let mut bytes = zeroize::Zeroizing::new(vec![0u8; curve.coordinate_len()]);
        loop {
            fill_random(&mut bytes)?;
            if curve == EcCurve::P521 {
                // 521 bits in 66 bytes: only the low bit of the top byte is used.
                bytes[0] &= 0x01;
            }
            if let Ok(secret) = Self::from_scalar_bytes(curve, &bytes) {
                return Ok(secret);
            }
        }
    }

    pub fn public_key(&self) -> EcPublicKey {
        match self {
            EcSecretKey::P256(k) => EcPublicKey::P256(k.public_key()),
            EcSecretKey::P384(k) => EcPublicKey::P384(k.public_key()),
            EcSecretKey::P521(k) => EcPublicKey::P521(k.public_key()),
        }
    }

    /// Big-endian scalar, wiped when dropped.
    pub fn to_scalar_bytes(&self) -> zeroize::Zeroizing<Vec<u8>> {
        zeroize::Zeroizing::new(match self {
            EcSecretKey::P256(k) => k.to_bytes().to_vec(),
            EcSecretKey::P384(k) => k.to_bytes().to_vec(),
            EcSecretKey::P521(k) => k.to_bytes().to_vec(),
        })
    }
}

/// An EC key: always the public point, optionally the private scalar.
#[derive(Clone)]
pub struct EcKeyPair {
    public: EcPublicKey,
    secret: Option<EcSecretKey>,
}

impl EcKeyPair {
    pub fn generate(curve: EcCurve) -> Result<Self, CryptoError> {
        EcSecretKey::generate(curve).map(Self::from_secret)
    }

    pub fn from_secret(secret: EcSecretKey) -> Self {
        Self {
            public: secret.public_key(),
            secret: Some(secret),
        }
    }

    pub fn from_public(public: EcPublicKey) -> Self {
        Self {
            public,
            secret: None,
        }
    }

    /// Parse a PKCS#8 DER private key on any supported curve.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, CryptoError> {
        let secret = if let Ok(k) = p256::SecretKey::from_pkcs8_der(der) {
            EcSecretKey::P256(k)
        } else if let Ok(k) = p384::SecretKey::from_pkcs8_der(der) {
            EcSecretKey::P384(k)
        } else if let Ok(k) = p521::SecretKey::from_pkcs8_der(der) {
            EcSecretKey::P521(k)
        } else {
            return Err(CryptoError::InvalidKey(
                "not a PKCS#8 P-256, P-384 or P-521 private key".to_string(),
            ));
        };
        Ok(Self::from_secret(secret))
    }

    /// Parse a PKCS#8 PEM private key on any supported curve.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self, CryptoError> {
        let secret = if let Ok(k) = p256::SecretKey::from_pkcs8_pem(pem) {
            EcSecretKey::P256(k)
        } else if let Ok(k) = p384::SecretKey::from_pkcs8_pem(pem) {
            EcSecretKey::P384(k)
        } else if let Ok(k) = p521::SecretKey::from_pkcs8_pem(pem) {
            EcSecretKey::P521(k)
        } else {
            return Err(CryptoError::InvalidKey(
                "not a PKCS#8 PEM P-256, P-384 or P-521 private key".to_string(),
            ));
        };
        Ok(Self::from_secret(secret))
    }

    /// Parse a SubjectPublicKeyInfo DER public key on any supported curve.
    pub fn from_public_key_der(der: &[u8]) -> Result<Self, CryptoError> {
        let public = if let Ok(k) = p256::PublicKey::from_public_key_der(der) {
            EcPublicKey::P256(k)
        } else if let Ok(k) = p384::PublicKey::from_public_key_der(der) {
            EcPublicKey::P384(k)
        } else if let Ok(k) = p521::PublicKey::from_public_key_der(der) {
            EcPublicKey::P521(k)
        } else {
            return Err(CryptoError::InvalidKey(
                "not an SPKI P-256, P-384 or P-521 public key".to_string(),
            ));
        };
        Ok(Self::from_public(public))
    }

    /// Parse a SubjectPublicKeyInfo PEM public key on any supported curve.
    pub fn from_public_key_pem(pem: &str) -> Result<Self, CryptoError> {
        let public = if let Ok(k) = p256::PublicKey::from_public_key_pem(pem) {
            EcPublicKey::P256(k)
        } else if let Ok(k) = p384::PublicKey::from_public_key_pem(pem) {
            EcPublicKey::P384(k)
        } else if let Ok(k) = p521::PublicKey::from_public_key_pem(pem) {
            EcPublicKey::P521(k)
        } else {
            return Err(CryptoError::InvalidKey(
                "not an SPKI PEM P-256, P-384 or P-521 public key".to_string(),
            ));
        };
        Ok(Self::from_public(public))
    }

    /// Import from JWK members: `crv`, base64url `x` and `y`, and optionally `d`.
    ///
    /// When `d` is present the public point must match it.
    pub fn from_jwk(crv: &str, x: &str, y: &str, d: Option<&str>) -> Result<Self, CryptoError> {
        let curve = EcCurve::from_name(crv)?;
        let decode = |field: &str, value: &str| {
            base64url_decode(value)
                .map_err(|e| CryptoError::InvalidKey(format!("JWK {field}: {e}")))
        };
        let public = EcPublicKey::from_coordinates(curve, &decode("x", x)?, &decode("y", y)?)?;

        match d {
            None => Ok(Self::from_public(public)),
            Some(d) => {
                let scalar = zeroize::Zeroizing::new(decode("d", d)?);
                let secret = EcSecretKey::from_scalar_bytes(curve, &scalar)?;
                if secret.public_key() != public {
                    return Err(CryptoError::InvalidKey(
                        "JWK d does not match x/y".to_string(),
                    ));
                }
                Ok(Self::from_secret(secret))
            }
        }
    }

    /// Base64url `(x, y)` members for a public JWK.
    pub fn public_jwk_coordinates(&self) -> (String, String) {
        let (x, y) = self.public.coordinates();
        (base64url_encode(&x), base64url_encode(&y))
    }

    pub fn curve(&self) -> EcCurve {
        self.public.curve()
    }

    pub fn public_key(&self) -> &EcPublicKey {
        &self.public
    }

    pub fn secret_key(&self) -> Option<&EcSecretKey> {
        self.secret.as_ref()
    }

    pub fn has_private(&self) -> bool {
        self.secret.is_some()
    }

    /// The public half alone, for handing to verifiers and encrypting parties.
    pub fn to_public(&self) -> Self {
        Self::from_public(self.public.clone())
    }
}

impl fmt::Debug for EcKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcKeyPair")
            .field("curve", &self.curve())
            .field("private", &self.has_private())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use p256::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};

    use super::*;

    #[test]
    fn symmetric_key_rejects_empty() {
        assert!(SymmetricKey::new(Vec::new()).is_err());
    }

    #[test]
    fn symmetric_key_enforces_exact_length() {
        let err = SymmetricKey::with_len(vec![0u8; 15], 16).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidKeyLength {
                expected: 16,
                got: 15
            }
        ));
        assert_eq!(SymmetricKey::with_len(vec![0u8; 16], 16).unwrap().len(), 16);
    }

    #[test]
    fn symmetric_debug_hides_bytes() {
        let key = SymmetricKey::new(b"super-secret".to_vec()).unwrap();
        let printed = format!("{key:?}");
        assert!(!printed.contains("super"));
        assert!(printed.contains("len"));
    }

    #[test]
    fn generated_symmetric_keys_differ() {
        let a = SymmetricKey::generate(32).unwrap();
        let b = SymmetricKey::generate(32).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn curve_names_round_trip() {
        for curve in [EcCurve::P256, EcCurve::P384, EcCurve::P521] {
            assert_eq!(EcCurve::from_name(curve.name()).unwrap(), curve);
        }
        assert!(matches!(
            EcCurve::from_name("secp256k1"),
            Err(CryptoError::UnsupportedCurve(_))
        ));
    }

    #[test]
    fn ec_jwk_round_trip_all_curves() {
        for curve in [EcCurve::P256, EcCurve::P384, EcCurve::P521] {
            let pair = EcKeyPair::generate(curve).unwrap();
            let (x, y) = pair.public_jwk_coordinates();
            let d = base64url_encode(&pair.secret_key().unwrap().to_scalar_bytes());

            let public = EcKeyPair::from_jwk(curve.name(), &x, &y, None).unwrap();
            assert_eq!(public.public_key(), pair.public_key());
            assert!(!public.has_private());

            let private = EcKeyPair::from_jwk(curve.name(), &x, &y, Some(&d)).unwrap();
            assert!(private.has_private());
        }
    }

    #[test]
    fn ec_jwk_rejects_mismatched_private_scalar() {
        let a = EcKeyPair::generate(EcCurve::P256).unwrap();
        let b = EcKeyPair::generate(EcCurve::P256).unwrap();
        let (x, y) = a.public_jwk_coordinates();
        let d = base64url_encode(&b.secret_key().unwrap().to_scalar_bytes());
        assert!(EcKeyPair::from_jwk("P-256", &x, &y, Some(&d)).is_err());
    }

    #[test]
    fn ec_coordinates_are_left_padded() {
        let pair = EcKeyPair::generate(EcCurve::P256).unwrap();
        let (x, y) = pair.public_key().coordinates();
        // Strip leading zeros the way some JWK producers do.
        let trim = |v: &[u8]| v.iter().skip_while(|b| **b == 0).copied().collect::<Vec<_>>();
        let rebuilt = EcPublicKey::from_coordinates(EcCurve::P256, &trim(&x), &trim(&y)).unwrap();
        assert_eq!(&rebuilt, pair.public_key());
    }

    #[test]
    fn ec_point_not_on_curve_is_rejected() {
        let err = EcPublicKey::from_coordinates(EcCurve::P256, &[1u8; 32], &[2u8; 32]).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKey(_)));
    }

    #[test]
    fn ec_coordinate_lengths() {
        for curve in [EcCurve::P256, EcCurve::P384, EcCurve::P521] {
            let (x, y) = EcKeyPair::generate(curve).unwrap().public_key().coordinates();
            assert_eq!(x.len(), curve.coordinate_len());
            assert_eq!(y.len(), curve.coordinate_len());
        }
    }

    #[test]
    fn to_public_drops_private_half() {
        let pair = EcKeyPair::generate(EcCurve::P384).unwrap();
        assert!(pair.has_private());
        assert!(!pair.to_public().has_private());
        assert!(!format!("{pair:?}").contains("secret"));
    }

    #[test]
    fn generated_scalars_are_fresh_on_every_curve() {
        for curve in [EcCurve::P256, EcCurve::P384, EcCurve::P521] {
            let a = EcSecretKey::generate(curve).unwrap();
            let b = EcSecretKey::generate(curve).unwrap();
            assert_eq!(a.curve(), curve);
            assert_eq!(a.to_scalar_bytes().len(), curve.coordinate_len());
            assert_ne!(*a.to_scalar_bytes(), *b.to_scalar_bytes());
            let reloaded = EcSecretKey::from_scalar_bytes(curve, &a.to_scalar_bytes()).unwrap();
            assert_eq!(reloaded.public_key(), a.public_key());
        }
    }

    struct Encoded {
        pkcs8_der: Vec<u8>,
        pkcs8_pem: String,
        spki_der: Vec<u8>,
        spki_pem: String,
    }

    fn encode_ec(pair: &EcKeyPair) -> Encoded {
        fn encode<S: EncodePrivateKey, P: EncodePublicKey>(secret: &S, public: &P) -> Encoded {
            Encoded {
                pkcs8_der: secret.to_pkcs8_der().unwrap().as_bytes().to_vec(),
                pkcs8_pem: secret.to_pkcs8_pem(LineEnding::LF).unwrap().to_string(),
                spki_der: public.to_public_key_der().unwrap().as_bytes().to_vec(),
                spki_pem: public.to_public_key_pem(LineEnding::LF).unwrap(),
            }
        }
        match (pair.secret_key().unwrap(), pair.public_key()) {
            (EcSecretKey::P256(s), EcPublicKey::P256(p)) => encode(s, p),
            (EcSecretKey::P384(s), EcPublicKey::P384(p)) => encode(s, p),
            (EcSecretKey::P521(s), EcPublicKey::P521(p)) => encode(s, p),
            _ => unreachable!("pair halves share a curve"),
        }
    }

    fn encode_rsa(pair: &RsaKeyPair) -> Encoded {
        let private = pair.private_key().unwrap();
        let public = pair.public_key();
        Encoded {
            pkcs8_der: private.to_pkcs8_der().unwrap().as_bytes().to_vec(),
            pkcs8_pem: private.to_pkcs8_pem(LineEnding::LF).unwrap().to_string(),
            spki_der: public.to_public_key_der().unwrap().as_bytes().to_vec(),
            spki_pem: public.to_public_key_pem(LineEnding::LF).unwrap(),
        }
    }

    #[test]
    fn ec_loaders_detect_each_curve() {
        for curve in [EcCurve::P256, EcCurve::P384, EcCurve::P521] {
            let pair = EcKeyPair::generate(curve).unwrap();
            let encoded = encode_ec(&pair);

            for loaded in [
                EcKeyPair::from_pkcs8_der(&encoded.pkcs8_der).unwrap(),
                EcKeyPair::from_pkcs8_pem(&encoded.pkcs8_pem).unwrap(),
            ] {
                assert_eq!(loaded.curve(), curve);
                assert!(loaded.has_private());
                assert_eq!(loaded.public_key(), pair.public_key());
            }

            for loaded in [
                EcKeyPair::from_public_key_der(&encoded.spki_der).unwrap(),
                EcKeyPair::from_public_key_pem(&encoded.spki_pem).unwrap(),
            ] {
                assert_eq!(loaded.curve(), curve);
                assert!(!loaded.has_private());
                assert_eq!(loaded.public_key(), pair.public_key());
            }
        }
    }

    #[test]
    fn rsa_loaders_accept_pkcs8_and_spki() {
        let pair = crate::rsa_sig::tests::test_key();
        let encoded = encode_rsa(pair);

        for loaded in [
            RsaKeyPair::from_pkcs8_der(&encoded.pkcs8_der).unwrap(),
            RsaKeyPair::from_pkcs8_pem(&encoded.pkcs8_pem).unwrap(),
        ] {
            assert!(loaded.has_private());
            assert_eq!(loaded.public_key(), pair.public_key());
        }

        for loaded in [
            RsaKeyPair::from_public_key_der(&encoded.spki_der).unwrap(),
            RsaKeyPair::from_public_key_pem(&encoded.spki_pem).unwrap(),
        ] {
            assert!(!loaded.has_private());
            assert_eq!(loaded.modulus_len(), pair.modulus_len());
        }
    }

    #[test]
    fn loaders_refuse_the_other_family() {
        let rsa = encode_rsa(crate::rsa_sig::tests::test_key());
        assert!(matches!(EcKeyPair::from_pkcs8_der(&rsa.pkcs8_der), Err(CryptoError::InvalidKey(_))));
        assert!(matches!(EcKeyPair::from_pkcs8_pem(&rsa.pkcs8_pem), Err(CryptoError::InvalidKey(_))));
        assert!(matches!(EcKeyPair::from_public_key_der(&rsa.spki_der), Err(CryptoError::InvalidKey(_))));
        assert!(matches!(EcKeyPair::from_public_key_pem(&rsa.spki_pem), Err(CryptoError::InvalidKey(_))));

        let ec = encode_ec(&EcKeyPair::generate(EcCurve::P256).unwrap());
        assert!(matches!(RsaKeyPair::from_pkcs8_der(&ec.pkcs8_der), Err(CryptoError::InvalidKey(_))));
        assert!(matches!(RsaKeyPair::from_public_key_pem(&ec.spki_pem), Err(CryptoError::InvalidKey(_))));
    }

    #[test]
    fn rsa_loaders_refuse_short_modulus() {
        let small = RsaPrivateKey::new(&mut p256::elliptic_curve::rand_core::OsRng, 1024).unwrap();
        let pkcs8 = small.to_pkcs8_der().unwrap();
        let spki = small.to_public_key().to_public_key_pem(LineEnding::LF).unwrap();
        assert!(matches!(RsaKeyPair::from_pkcs8_der(pkcs8.as_bytes()), Err(CryptoError::InvalidKey(_))));
        assert!(matches!(RsaKeyPair::from_public_key_pem(&spki), Err(CryptoError::InvalidKey(_))));
    }
}
