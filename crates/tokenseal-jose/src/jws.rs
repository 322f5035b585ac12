//! Signed compact tokens.
//!
//! Signing input is `base64url(header) || '.' || base64url(payload)`. Verification
//! compares the header `alg` against the caller's expectation before any
//! cryptography runs.

use tokenseal_crypto::{
    base64url_encode, ecdsa_sign, ecdsa_verify, hmac_sign, hmac_verify, rsa_pkcs1v15_sign,
    rsa_pkcs1v15_verify, rsa_pss_sign, rsa_pss_verify,
};

use crate::alg::{JwsAlgorithm, SignatureFamily};
use crate::compact::{join, parse_jws, Header};
use crate::error::JoseError;
use crate::key::Key;

/// Sign `payload` under `header`. The header's `alg` must name `alg`.
pub fn sign_compact(
    alg: JwsAlgorithm,
    header: &Header,
    payload: &[u8],
    key: &Key,
) -> Result<String, JoseError> {
    if header.alg() != alg.name() || header.enc().is_some() {
        return Err(JoseError::Config(format!(
            "header does not describe a {alg} signature"
        )));
    }
    let encoded_header = header.encode()?;
    let encoded_payload = base64url_encode(payload);
    let signing_input = join(&[&encoded_header, &encoded_payload]);

    let signature = sign_bytes(alg, key, signing_input.as_bytes())?;
    Ok(join(&[&signing_input, &base64url_encode(&signature)]))
}

/// Verify a signed token and return its payload.
pub fn verify_compact(token: &str, expected: JwsAlgorithm, key: &Key) -> Result<Vec<u8>, JoseError> {
    let parts = parse_jws(token)?;
    if parts.header.alg() != expected.name() {
        return Err(JoseError::AlgorithmMismatch);
    }
    verify_bytes(expected, key, parts.signing_input.as_bytes(), &parts.signature)?;
    Ok(parts.payload)
}

/// Apply the signature primitive for `alg`.
pub fn sign_bytes(alg: JwsAlgorithm, key: &Key, input: &[u8]) -> Result<Vec<u8>, JoseError> {
    let variant = alg.sha_variant();
    let signature = match (alg.family(), key) {
        (SignatureFamily::Hmac, Key::Symmetric(secret)) => hmac_sign(variant, secret.as_bytes(), input)?,
        (SignatureFamily::RsaPkcs1, Key::Rsa(pair)) => rsa_pkcs1v15_sign(variant, pair, input)?,
        (SignatureFamily::RsaPss, Key::Rsa(pair)) => rsa_pss_sign(variant, pair, input)?,
        (SignatureFamily::Ecdsa, Key::Ec(pair)) => ecdsa_sign(pair, input)?,
        _ => return Err(wrong_family(alg, key)),
    };
    Ok(signature)
}

/// Check `signature` over `input` for `alg`.
pub fn verify_bytes(
    alg: JwsAlgorithm,
    key: &Key,
    input: &[u8],
    signature: &[u8],
) -> Result<(), JoseError> {
    let variant = alg.sha_variant();
    match (alg.family(), key) {
        (SignatureFamily::Hmac, Key::Symmetric(secret)) => {
            hmac_verify(variant, secret.as_bytes(), input, signature)?
        }
        (SignatureFamily::RsaPkcs1, Key::Rsa(pair)) => {
            rsa_pkcs1v15_verify(variant, pair, input, signature)?
        }
        (SignatureFamily::RsaPss, Key::Rsa(pair)) => rsa_pss_verify(variant, pair, input, signature)?,
        (SignatureFamily::Ecdsa, Key::Ec(pair)) => ecdsa_verify(pair, input, signature)?,
        _ => return Err(wrong_family(alg, key)),
    }
    Ok(())
}

fn wrong_family(alg: JwsAlgorithm, key: &Key) -> JoseError {
    JoseError::KeyShapeInvalid(format!(
        "{alg} needs a {}, got {}",
        alg.key_shape(),
        key.describe()
    ))
}
