//! Compact serialization: protected header and the dot-separated token form.
//!
//! A token is 3 segments (`header.payload.signature`) when its header has no `enc`
//! member and 5 (`header.encrypted_key.iv.ciphertext.tag`) when it does. Any other
//! count is malformed. The encoded header segment is kept verbatim because it is
//! the signing input prefix for JWS and the AAD for JWE.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokenseal_crypto::{base64url_decode, base64url_encode, EcCurve, EcKeyPair, EcPublicKey};

use crate::alg::{ContentEncryptionAlgorithm, JwsAlgorithm, KeyManagementAlgorithm};
use crate::error::JoseError;

/// Ephemeral public key (`epk`) of a key-agreement JWE, as a public EC JWK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EphemeralPublicKey {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
}

impl EphemeralPublicKey {
    pub fn from_public_key(key: &EcPublicKey) -> Self {
        let (x, y) = EcKeyPair::from_public(key.clone()).public_jwk_coordinates();
        Self {
            kty: "EC".to_string(),
            crv: key.curve().name().to_string(),
            x,
            y,
        }
    }

    /// Validate and decode into a point; points off the curve are rejected.
    pub fn to_public_key(&self) -> Result<EcPublicKey, JoseError> {
        if self.kty != "EC" {
            return Err(JoseError::MalformedToken(format!(
                "epk kty must be EC, got {}",
                self.kty
            )));
        }
        let malformed = |e: tokenseal_crypto::CryptoError| JoseError::MalformedToken(format!("epk: {e}"));
        let curve = EcCurve::from_name(&self.crv).map_err(malformed)?;
        let x = base64url_decode(&self.x).map_err(|e| JoseError::MalformedToken(format!("epk x: {e}")))?;
        let y = base64url_decode(&self.y).map_err(|e| JoseError::MalformedToken(format!("epk y: {e}")))?;
        EcPublicKey::from_coordinates(curve, &x, &y).map_err(malformed)
    }
}

/// Protected header. Members serialize in declaration order, followed by any extra
/// members in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    epk: Option<EphemeralPublicKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    apu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    apv: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Members this crate will not process; a header carrying one is rejected.
const REJECTED_MEMBERS: [&str; 2] = ["crit", "zip"];

/// Members with a dedicated field; they may not also appear as extras.
const FIELD_MEMBERS: [&str; 8] = ["alg", "enc", "typ", "cty", "kid", "epk", "apu", "apv"];

impl Header {
    /// Header with an arbitrary `alg` identifier. Validation happens when the engine
    /// resolves it against the registry.
    pub fn new(alg: impl Into<String>) -> Self {
        Self {
            alg: alg.into(),
            enc: None,
            typ: None,
            cty: None,
            kid: None,
            epk: None,
            apu: None,
            apv: None,
            extra: Map::new(),
        }
    }

    /// Header for a signed token.
    pub fn signed(alg: JwsAlgorithm) -> Self {
        Self::new(alg.name())
    }

    /// Header for an encrypted token.
    pub fn encrypted(alg: KeyManagementAlgorithm, enc: ContentEncryptionAlgorithm) -> Self {
        Self::new(alg.name()).with_enc(enc.name())
    }

    pub fn with_enc(mut self, enc: impl Into<String>) -> Self {
        self.enc = Some(enc.into());
        self
    }

    pub fn with_typ(mut self, typ: impl Into<String>) -> Self {
        self.typ = Some(typ.into());
        self
    }

    pub fn with_cty(mut self, cty: impl Into<String>) -> Self {
        self.cty = Some(cty.into());
        self
    }

    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// PartyUInfo for key agreement; raw bytes, stored base64url-encoded.
    pub fn with_apu(mut self, apu: &[u8]) -> Self {
        self.apu = Some(base64url_encode(apu));
        self
    }

    /// PartyVInfo for key agreement; raw bytes, stored base64url-encoded.
    pub fn with_apv(mut self, apv: &[u8]) -> Self {
        self.apv = Some(base64url_encode(apv));
        self
    }

    pub(crate) fn with_epk(mut self, epk: EphemeralPublicKey) -> Self {
        self.epk = Some(epk);
        self
    }

    /// Additional member. Names with a dedicated builder (`alg`, `kid`, ...) are
    /// refused when the header is encoded.
    pub fn with_member(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    pub fn alg(&self) -> &str {
        &self.alg
    }

    pub fn enc(&self) -> Option<&str> {
        self.enc.as_deref()
    }

    pub fn typ(&self) -> Option<&str> {
        self.typ.as_deref()
    }

    pub fn cty(&self) -> Option<&str> {
        self.cty.as_deref()
    }

    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    pub fn epk(&self) -> Option<&EphemeralPublicKey> {
        self.epk.as_ref()
    }

    pub fn member(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Decoded `apu`, empty when absent.
    pub fn party_u_info(&self) -> Result<Vec<u8>, JoseError> {
        decode_party_info("apu", self.apu.as_deref())
    }

    /// Decoded `apv`, empty when absent.
    pub fn party_v_info(&self) -> Result<Vec<u8>, JoseError> {
        decode_party_info("apv", self.apv.as_deref())
    }

    /// Serialize to compact JSON and base64url-encode.
    pub fn encode(&self) -> Result<String, JoseError> {
        self.check_members()?;
        let json = serde_json::to_vec(self).map_err(|e| JoseError::Serialization(e.to_string()))?;
        Ok(base64url_encode(&json))
    }

    /// Decode an encoded header segment.
    pub fn decode(segment: &str) -> Result<Self, JoseError> {
        let json = base64url_decode(segment)
            .map_err(|e| JoseError::MalformedToken(format!("header is not base64url: {e}")))?;
        let header: Header = serde_json::from_slice(&json)
            .map_err(|e| JoseError::MalformedToken(format!("header is not a valid JSON object: {e}")))?;
        header.check_members()?;
        Ok(header)
    }

    fn check_members(&self) -> Result<(), JoseError> {
        if let Some(name) = REJECTED_MEMBERS.iter().find(|m| self.extra.contains_key(**m)) {
            return Err(JoseError::MalformedToken(format!(
                "header member {name} is not supported"
            )));
        }
        if let Some(name) = FIELD_MEMBERS.iter().find(|m| self.extra.contains_key(**m)) {
            return Err(JoseError::MalformedToken(format!(
                "header member {name} set twice"
            )));
        }
        Ok(())
    }
}

fn decode_party_info(name: &str, value: Option<&str>) -> Result<Vec<u8>, JoseError> {
    match value {
        None => Ok(Vec::new()),
        Some(v) => base64url_decode(v)
            .map_err(|e| JoseError::MalformedToken(format!("{name} is not base64url: {e}"))),
    }
}

/// Segments of a signed token.
#[derive(Debug, Clone)]
pub struct JwsParts<'a> {
    pub header: Header,
    /// `header.payload` exactly as received.
    pub signing_input: &'a str,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Segments of an encrypted token.
#[derive(Debug, Clone)]
pub struct JweParts<'a> {
    pub header: Header,
    /// Encoded header exactly as received; the AAD.
    pub encoded_header: &'a str,
    pub encrypted_key: Vec<u8>,
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum CompactToken<'a> {
    Signed(JwsParts<'a>),
    Encrypted(JweParts<'a>),
}

/// Split and decode a compact token. The header decides how many segments are
/// required.
pub fn parse(token: &str) -> Result<CompactToken<'_>, JoseError> {
    let segments: Vec<&str> = token.split('.').collect();
    let header = Header::decode(segments[0])?;

    let expected = if header.enc.is_some() { 5 } else { 3 };
    if segments.len() != expected {
        return Err(JoseError::MalformedToken(format!(
            "expected {expected} segments, got {}",
            segments.len()
        )));
    }

    let decode = |name: &str, segment: &str| {
        base64url_decode(segment)
            .map_err(|e| JoseError::MalformedToken(format!("{name} is not base64url: {e}")))
    };

    if expected == 3 {
        let signing_input_len = segments[0].len() + 1 + segments[1].len();
        Ok(CompactToken::Signed(JwsParts {
            payload: decode("payload", segments[1])?,
            signature: decode("signature", segments[2])?,
            signing_input: &token[..signing_input_len],
            header,
        }))
    } else {
        Ok(CompactToken::Encrypted(JweParts {
            encrypted_key: decode("encrypted key", segments[1])?,
            iv: decode("iv", segments[2])?,
            ciphertext: decode("ciphertext", segments[3])?,
            tag: decode("tag", segments[4])?,
            encoded_header: segments[0],
            header,
        }))
    }
}

/// Parse a token that must be signed.
pub fn parse_jws(token: &str) -> Result<JwsParts<'_>, JoseError> {
    match parse(token)? {
        CompactToken::Signed(parts) => Ok(parts),
        CompactToken::Encrypted(_) => Err(JoseError::MalformedToken(
            "expected a signed token, got an encrypted one".to_string(),
        )),
    }
}

/// Parse a token that must be encrypted.
pub fn parse_jwe(token: &str) -> Result<JweParts<'_>, JoseError> {
    match parse(token)? {
        CompactToken::Encrypted(parts) => Ok(parts),
        CompactToken::Signed(_) => Err(JoseError::MalformedToken(
            "expected an encrypted token, got a signed one".to_string(),
        )),
    }
}

/// Join already-encoded segments.
pub fn join(segments: &[&str]) -> String {
    segments.join(".")
}
